// Copyright 2022 Parity Technologies (UK) Ltd.
//
// Permission is hereby granted, free of charge, to any person obtaining a
// copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
// OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Single-hop packet processing for Ultrix, a Sphinx-style mix network packet format.
//!
//! A relay holding a [`KxPair`] calls [`process_hop`] (or lets a [`Relay`] do it) on every
//! incoming packet to learn its routing command and the header and payload to forward. Headers
//! and payloads keep exactly the same sizes at every hop.

pub mod core;

pub use crate::core::{
	sphinx::{
		create_forward_message, encode_packet, process_hop, split_packet, Blake2ChaCha,
		BuildError, DestKey, Group, GroupElement, Header, HopError, KeyDerivation, Mac,
		MixnodeIndex, PathHop, PeerId, ProcessedHop, ReplayTag, RistrettoGroup, RoutingCommand,
		SymmetricKey, Target, DEST_KEY_SIZE, GROUP_ELEMENT_SIZE, MAC_SIZE, MAX_HOPS,
		MAX_MIXNODE_INDEX, MAX_ROUTING_LEN, PEER_ID_SIZE, REPLAY_TAG_SIZE,
	},
	Action, Config, Error, KxPair, Params, Relay, RelayConfig, ReplayFilter, DEFAULT_BODY_LEN,
	DEFAULT_MAX_LEN, MIN_MAX_LEN,
};

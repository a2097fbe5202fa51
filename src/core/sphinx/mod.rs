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

//! Ultrix hop processing.
//!
//! [`process_hop`] is the single-hop transform a relay applies to every packet: derive the hop's
//! shared secret from alpha, unblind one layer of the routing block, blind alpha for the next hop,
//! and strip one keystream layer from the payload. The transform is pure; replay detection and
//! any trust decisions belong to the caller (see [`Relay`](crate::core::Relay)).

mod build;
mod codec;
mod crypto;
mod group;
mod packet;
mod target;
mod tests;

pub use build::{create_forward_message, BuildError, PathHop, MAX_HOPS, MAX_ROUTING_LEN};
pub use codec::{parse, truncate_next_beta, unblind};
pub use crypto::{
	apply_keystream, Blake2ChaCha, BlindingSeed, KeyDerivation, MacKey, PayloadKey, ReplayTag,
	SymmetricKey, MAC_KEY_SIZE, PAYLOAD_KEY_SIZE, REPLAY_TAG_SIZE, SYMMETRIC_KEY_SIZE,
};
pub use group::{Group, GroupElement, RistrettoGroup, GROUP_ELEMENT_SIZE};
pub use packet::{
	encode_packet, split_packet, DestKey, Header, Mac, BETA_OVERHEAD, DEST_KEY_SIZE, MAC_SIZE,
};
pub use target::{
	MixnodeIndex, PeerId, RawMixnodeIndex, RoutingCommand, Target, MAX_MIXNODE_INDEX,
	PEER_ID_SIZE,
};

use crate::core::config::Params;
use subtle::ConstantTimeEq;

/// Reasons a packet is rejected by [`process_hop`]. All are fatal to the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HopError {
	/// Associated data is not exactly `assoc_len` bytes.
	#[error("associated data length mismatch")]
	LengthMismatch,
	/// Alpha is not a usable group element.
	#[error("alpha not in group")]
	InvalidGroupElement,
	/// The header (or its routing block) has the wrong size.
	#[error("malformed header")]
	MalformedHeader,
}

/// Output of [`process_hop`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedHop<E> {
	/// Replay fingerprint. The caller must check it against, and record it in, its replay set.
	pub tag: ReplayTag,
	/// Routing command for this node.
	pub routing: Vec<u8>,
	/// Header to forward to the next hop.
	pub next_header: Header<E>,
	/// Payload to forward to the next hop, or the plaintext payload at the final hop.
	pub next_delta: Vec<u8>,
	/// The payload keystream applied at this hop.
	pub mac_key: Vec<u8>,
	/// Whether the received gamma equals the MAC this hop computed over the received routing
	/// block (the outgoing gamma). Only holds where the sender placed this hop's own MAC in gamma,
	/// which is the case at the first hop. Never acted upon here.
	pub incoming_gamma_ok: bool,
}

/// Process one hop of a packet.
///
/// `secret` is this node's key-exchange secret. Fails without doing any secret-dependent work if
/// `assoc` is not `assoc_len` bytes, alpha is not in the group, or beta is not `beta_len` bytes.
///
/// The cost is fixed for a given [`Params`]: two exponentiations, one routing-block keystream,
/// two MACs, and one payload-length keystream.
pub fn process_hop<G: Group, S: KeyDerivation>(
	params: &Params<G, S>,
	secret: &G::Scalar,
	header: &Header<G::Element>,
	delta: &[u8],
	assoc: &[u8],
) -> Result<ProcessedHop<G::Element>, HopError> {
	let (group, suite) = (params.group(), params.suite());

	if assoc.len() != params.assoc_len() {
		return Err(HopError::LengthMismatch)
	}
	if !group.in_group(&header.alpha) {
		return Err(HopError::InvalidGroupElement)
	}
	if header.beta.len() != params.beta_len() {
		return Err(HopError::MalformedHeader)
	}

	// Key exchange
	let shared = group
		.expon(&header.alpha, std::slice::from_ref(secret))
		.ok_or(HopError::InvalidGroupElement)?;
	let key = suite.derive_symmetric_key(shared.as_ref());

	// Unblind our slice of the routing block along with the next hop's block
	let block = codec::unblind(params, &key, &header.beta);
	let (_length, routing, rest) = codec::parse(&block)?;

	let tag = suite.replay_tag(&key);

	let blinding_factor = group.scalar_from_wide(&suite.blind_factor(header.alpha.as_ref(), &key));
	let alpha = group
		.expon(&header.alpha, &[blinding_factor])
		.ok_or(HopError::InvalidGroupElement)?;
	let beta = codec::truncate_next_beta(params, rest)?;

	// Both MACs cover the routing block as received, not the one being forwarded
	let gamma = suite.mac(&suite.mac_key_1(&key), &header.beta);
	let gamma2 = suite.mac(&suite.mac_key_2(&key), &header.beta);
	let incoming_gamma_ok = bool::from(gamma[..].ct_eq(&header.gamma[..]));

	let payload_key = suite.derive_payload_key(&key, &gamma);
	let dest_key = suite.permute(&gamma2, &header.dest_key);
	let payload_keystream = suite.payload_keystream(&payload_key, delta.len());
	let next_delta = suite.xor(&payload_keystream, delta);

	Ok(ProcessedHop {
		tag,
		routing: routing.to_vec(),
		next_header: Header { alpha, beta, gamma, dest_key },
		next_delta,
		mac_key: payload_keystream,
		incoming_gamma_ok,
	})
}

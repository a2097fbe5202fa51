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

//! Ultrix configuration and system parameters.

use super::{
	error::Error,
	sphinx::{Blake2ChaCha, Group, KeyDerivation, RistrettoGroup, BETA_OVERHEAD, DEST_KEY_SIZE, MAC_SIZE},
};

/// Default segment length. Gives a 160-byte routing block.
pub const DEFAULT_MAX_LEN: usize = 192;

/// Default payload length in bytes.
pub const DEFAULT_BODY_LEN: usize = 1024;

/// Smallest `max_len` for which a maximal (255-byte) routing command plus the next routing block
/// always fit in one unblinded block.
pub const MIN_MAX_LEN: usize = 112;

/// The routing block is unblinded with `UNBLIND_FACTOR * max_len` bytes of keystream.
pub const UNBLIND_FACTOR: usize = 3;

/// Packet format configuration. Every node on a path must use the same values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
	/// Segment length governing header sizing. The routing block (beta) is `max_len - 32` bytes.
	pub max_len: usize,
	/// Required length of the associated data passed alongside each packet.
	pub assoc_len: usize,
	/// Length of the payload (delta) carried by every packet.
	pub body_len: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self { max_len: DEFAULT_MAX_LEN, assoc_len: 0, body_len: DEFAULT_BODY_LEN }
	}
}

/// Local relay policy. Unlike [`Config`], this need not match between nodes.
#[derive(Clone, Debug)]
pub struct RelayConfig {
	/// Target used for all log messages.
	pub log_target: &'static str,
	/// Drop packets whose gamma is not the MAC this node computes over the received routing
	/// block. Only entry relays receive such packets; the sender places the first hop's MAC in
	/// gamma, later hops receive the previous hop's MAC.
	pub verify_incoming_gamma: bool,
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self { log_target: "ultrix", verify_incoming_gamma: false }
	}
}

/// Immutable system parameters: the group, the key-derivation suite, and the validated packet
/// format. Shared read-only between all hop processing calls.
#[derive(Clone, Debug)]
pub struct Params<G, S> {
	group: G,
	suite: S,
	max_len: usize,
	assoc_len: usize,
	body_len: usize,
}

impl<G: Group, S: KeyDerivation> Params<G, S> {
	pub fn new(config: &Config, group: G, suite: S) -> Result<Self, Error> {
		if config.max_len < MIN_MAX_LEN {
			return Err(Error::InvalidConfig("max_len too small for a maximal routing command"))
		}
		if config.body_len == 0 {
			return Err(Error::InvalidConfig("body_len must be non-zero"))
		}
		Ok(Self {
			group,
			suite,
			max_len: config.max_len,
			assoc_len: config.assoc_len,
			body_len: config.body_len,
		})
	}
}

impl<G: Group, S> Params<G, S> {
	/// Size in bytes of an encoded header.
	pub fn header_size(&self) -> usize {
		self.group.element_size() + MAC_SIZE + DEST_KEY_SIZE + self.beta_len()
	}

	/// Size in bytes of an encoded packet (header followed by payload).
	pub fn packet_size(&self) -> usize {
		self.header_size() + self.body_len
	}
}

impl<G, S> Params<G, S> {
	pub fn group(&self) -> &G {
		&self.group
	}

	pub fn suite(&self) -> &S {
		&self.suite
	}

	pub fn max_len(&self) -> usize {
		self.max_len
	}

	pub fn assoc_len(&self) -> usize {
		self.assoc_len
	}

	pub fn body_len(&self) -> usize {
		self.body_len
	}

	/// Length of the routing block (beta), before and after every hop.
	pub fn beta_len(&self) -> usize {
		self.max_len - BETA_OVERHEAD
	}

	/// Length of the keystream used to unblind the routing block.
	pub fn keystream_len(&self) -> usize {
		UNBLIND_FACTOR * self.max_len
	}
}

impl Params<RistrettoGroup, Blake2ChaCha> {
	/// Parameters using Ristretto255 and the BLAKE2b/ChaCha20 suite.
	pub fn ristretto(config: &Config) -> Result<Self, Error> {
		Self::new(config, RistrettoGroup, Blake2ChaCha)
	}
}

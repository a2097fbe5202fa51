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

//! Ultrix packet format.
//!
//! Packets consist of the following, in order:
//!
//! - [`Header`]:
//!   - Group element (alpha in the Sphinx paper).
//!   - [`Mac`] (gamma).
//!   - [`DestKey`], permuted at every hop.
//!   - Routing block (beta), `max_len - 32` bytes.
//! - Payload (delta), `body_len` bytes.
//!
//! Each hop's slice of the routing block is a length byte followed by that many bytes of routing
//! command. All sizes are fixed for a given [`Params`], so nothing about a packet reveals how far
//! along its path it is.

use super::{Group, HopError};
use crate::core::config::Params;

pub const MAC_SIZE: usize = 16;
pub type Mac = [u8; MAC_SIZE];
pub const DEST_KEY_SIZE: usize = 16;
pub type DestKey = [u8; DEST_KEY_SIZE];
/// The routing block is this many bytes shorter than `max_len`.
pub const BETA_OVERHEAD: usize = 32;

/// Packet header. `beta` is always exactly [`Params::beta_len`] bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header<E> {
	pub alpha: E,
	pub beta: Vec<u8>,
	pub gamma: Mac,
	pub dest_key: DestKey,
}

impl<E: AsRef<[u8]>> Header<E> {
	/// Wire encoding: `alpha || gamma || dest_key || beta`.
	pub fn encode(&self) -> Vec<u8> {
		let alpha = self.alpha.as_ref();
		let mut out = Vec::with_capacity(alpha.len() + MAC_SIZE + DEST_KEY_SIZE + self.beta.len());
		out.extend_from_slice(alpha);
		out.extend_from_slice(&self.gamma);
		out.extend_from_slice(&self.dest_key);
		out.extend_from_slice(&self.beta);
		out
	}

	/// Decode a header of exactly [`Params::header_size`] bytes. Group membership of alpha is
	/// left to hop processing.
	pub fn decode<G: Group<Element = E>, S>(
		params: &Params<G, S>,
		bytes: &[u8],
	) -> Result<Self, HopError> {
		if bytes.len() != params.header_size() {
			return Err(HopError::MalformedHeader)
		}
		let (alpha, rest) = bytes.split_at(params.group().element_size());
		let (gamma, rest) = rest.split_at(MAC_SIZE);
		let (dest_key, beta) = rest.split_at(DEST_KEY_SIZE);
		Ok(Self {
			alpha: params.group().element_from_bytes(alpha).ok_or(HopError::MalformedHeader)?,
			beta: beta.to_vec(),
			gamma: gamma.try_into().map_err(|_| HopError::MalformedHeader)?,
			dest_key: dest_key.try_into().map_err(|_| HopError::MalformedHeader)?,
		})
	}
}

/// Split an encoded packet into its header and payload.
pub fn split_packet<'a, G: Group, S>(
	params: &Params<G, S>,
	packet: &'a [u8],
) -> Result<(Header<G::Element>, &'a [u8]), HopError> {
	if packet.len() != params.packet_size() {
		return Err(HopError::MalformedHeader)
	}
	let (header, payload) = packet.split_at(params.header_size());
	Ok((Header::decode(params, header)?, payload))
}

/// Encode a header and payload as a packet.
pub fn encode_packet<E: AsRef<[u8]>>(header: &Header<E>, payload: &[u8]) -> Vec<u8> {
	let mut packet = header.encode();
	packet.extend_from_slice(payload);
	packet
}

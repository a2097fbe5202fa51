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

//! Hop target and routing command types.
//!
//! Routing commands are the bytes each hop finds in its slice of the routing block:
//!
//! - `0x00`, then a big-endian [`RawMixnodeIndex`]: forward to that mixnode.
//! - `0x01`, then a [`PeerId`]: forward to that peer.
//! - `0x02`: this hop is the final destination.

use std::fmt;

pub const RAW_MIXNODE_INDEX_SIZE: usize = 2;
/// Raw mixnode index type, not guaranteed to be <= [`MAX_MIXNODE_INDEX`].
pub type RawMixnodeIndex = u16;
/// Maximum valid mixnode index.
pub const MAX_MIXNODE_INDEX: RawMixnodeIndex = 0xfeff;
/// Size in bytes of a [`PeerId`].
pub const PEER_ID_SIZE: usize = 32;
/// Globally unique identifier for a network peer. Treated as opaque.
pub type PeerId = [u8; PEER_ID_SIZE];

const RAW_COMMAND_FORWARD_TO_MIXNODE_INDEX: u8 = 0x00;
const RAW_COMMAND_FORWARD_TO_PEER_ID: u8 = 0x01;
const RAW_COMMAND_DELIVER: u8 = 0x02;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
/// The contained index is always <= `MAX_MIXNODE_INDEX`.
pub struct MixnodeIndex(RawMixnodeIndex);

impl MixnodeIndex {
	pub fn get(self) -> RawMixnodeIndex {
		self.0
	}
}

impl TryFrom<usize> for MixnodeIndex {
	type Error = ();

	fn try_from(index: usize) -> Result<Self, Self::Error> {
		if index <= MAX_MIXNODE_INDEX as usize {
			Ok(Self(index as RawMixnodeIndex))
		} else {
			Err(())
		}
	}
}

impl TryFrom<RawMixnodeIndex> for MixnodeIndex {
	type Error = ();

	fn try_from(index: RawMixnodeIndex) -> Result<Self, Self::Error> {
		(index as usize).try_into()
	}
}

impl fmt::Display for MixnodeIndex {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		self.0.fmt(fmt)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
	MixnodeIndex(MixnodeIndex),
	PeerId(PeerId),
}

/// What a hop should do with a packet once it has been processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutingCommand {
	/// Forward the processed packet to the given target.
	ForwardTo(Target),
	/// The processed payload is for this node.
	Deliver,
}

impl RoutingCommand {
	pub fn encode(&self) -> Vec<u8> {
		match self {
			Self::ForwardTo(Target::MixnodeIndex(index)) => {
				let mut raw = vec![RAW_COMMAND_FORWARD_TO_MIXNODE_INDEX];
				raw.extend_from_slice(&index.get().to_be_bytes());
				raw
			},
			Self::ForwardTo(Target::PeerId(peer_id)) => {
				let mut raw = vec![RAW_COMMAND_FORWARD_TO_PEER_ID];
				raw.extend_from_slice(peer_id);
				raw
			},
			Self::Deliver => vec![RAW_COMMAND_DELIVER],
		}
	}

	/// Parse a routing command. Unknown opcodes, out-of-range indices, and trailing bytes are all
	/// rejected.
	pub fn decode(raw: &[u8]) -> Option<Self> {
		let (&opcode, operand) = raw.split_first()?;
		match opcode {
			RAW_COMMAND_FORWARD_TO_MIXNODE_INDEX => {
				let raw_index: [u8; RAW_MIXNODE_INDEX_SIZE] = operand.try_into().ok()?;
				let index = RawMixnodeIndex::from_be_bytes(raw_index).try_into().ok()?;
				Some(Self::ForwardTo(Target::MixnodeIndex(index)))
			},
			RAW_COMMAND_FORWARD_TO_PEER_ID =>
				Some(Self::ForwardTo(Target::PeerId(operand.try_into().ok()?))),
			RAW_COMMAND_DELIVER if operand.is_empty() => Some(Self::Deliver),
			_ => None,
		}
	}
}

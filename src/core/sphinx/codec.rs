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

//! Routing block unblinding and slicing.
//!
//! The routing block is padded with zeroes before a single keystream is applied. That one
//! application yields this hop's length byte, its routing command, and the whole of the next
//! hop's routing block, with the zero padding turning into the fresh tail of the next block.

use super::{crypto::SymmetricKey, HopError, KeyDerivation};
use crate::core::config::Params;

/// Pad `beta` with zeroes to [`Params::keystream_len`] bytes and XOR with the hop keystream.
pub fn unblind<G, S: KeyDerivation>(
	params: &Params<G, S>,
	key: &SymmetricKey,
	beta: &[u8],
) -> Vec<u8> {
	let suite = params.suite();
	let mut padded = beta.to_vec();
	padded.resize(params.keystream_len(), 0);
	suite.xor(&suite.keystream(key, padded.len()), &padded)
}

/// Split an unblinded block into `(length, routing, rest)`. The first byte is the length of the
/// routing command that follows it.
pub fn parse(block: &[u8]) -> Result<(usize, &[u8], &[u8]), HopError> {
	let (&length, after_length) = block.split_first().ok_or(HopError::MalformedHeader)?;
	let length = length as usize;
	if after_length.len() < length {
		return Err(HopError::MalformedHeader)
	}
	let (routing, rest) = after_length.split_at(length);
	Ok((length, routing, rest))
}

/// The next hop's routing block: the first [`Params::beta_len`] bytes of `rest`. Anything after
/// that is keystream padding. A short `rest` is an error, never padded.
pub fn truncate_next_beta<G, S>(params: &Params<G, S>, rest: &[u8]) -> Result<Vec<u8>, HopError> {
	rest.get(..params.beta_len()).map(<[u8]>::to_vec).ok_or(HopError::MalformedHeader)
}

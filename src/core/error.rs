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

//! Error handling

use crate::core::sphinx::{BuildError, HopError};

/// Ultrix generic error.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// Rejected system parameters.
	#[error("Invalid configuration: {0}.")]
	InvalidConfig(&'static str),
	/// Hop processing rejected the packet.
	#[error("Hop processing error: {0}")]
	Hop(#[from] HopError),
	/// Header construction failed.
	#[error("Header construction error: {0}")]
	Build(#[from] BuildError),
	/// The packet's replay tag has been seen before.
	#[error("Packet replayed.")]
	Replayed,
	/// The routing command does not parse.
	#[error("Bad routing command.")]
	BadRoutingCommand,
	/// Gamma verification was required and failed.
	#[error("Incoming gamma does not match the routing block.")]
	GammaMismatch,
}

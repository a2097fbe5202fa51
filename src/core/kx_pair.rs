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

//! Relay key-exchange key pair.

use super::sphinx::Group;
use rand::{CryptoRng, Rng};
use zeroize::Zeroizing;

pub struct KxPair<G: Group> {
	/// Boxed to avoid leaving copies of the secret key around in memory if `KxPair` is moved.
	secret: Box<Zeroizing<G::Scalar>>,
	public: G::Element,
}

impl<G: Group> KxPair<G> {
	pub fn gen(group: &G, rng: &mut (impl Rng + CryptoRng)) -> Self {
		Self::from_secret(group, group.gen_secret(rng))
	}

	pub fn from_secret(group: &G, secret: G::Scalar) -> Self {
		// We will likely leave some copies of the secret on the stack here
		let secret = Box::new(Zeroizing::new(secret));
		let public = group.public(&secret);
		Self { secret, public }
	}

	pub fn public(&self) -> &G::Element {
		&self.public
	}

	pub fn secret(&self) -> &G::Scalar {
		&self.secret
	}
}

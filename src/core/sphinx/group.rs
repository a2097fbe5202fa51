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

//! Diffie-Hellman group abstraction and the Ristretto255 instance.

use curve25519_dalek::{
	ristretto::{CompressedRistretto, RistrettoPoint},
	scalar::Scalar,
	traits::IsIdentity,
};
use rand::{CryptoRng, Rng};
use std::fmt::Debug;
use zeroize::Zeroize;

/// Size in bytes of a [`RistrettoGroup`] element.
pub const GROUP_ELEMENT_SIZE: usize = 32;
/// Compressed Ristretto point, as carried in headers (alpha).
pub type GroupElement = [u8; GROUP_ELEMENT_SIZE];

/// A prime-order group in which the hop key exchange and alpha blinding happen.
///
/// Elements are kept in their wire encoding; an element only becomes usable for
/// exponentiation once [`in_group`](Self::in_group) has accepted it.
pub trait Group {
	type Element: Clone + Debug + PartialEq + Eq + AsRef<[u8]>;
	type Scalar: Clone + Zeroize;

	/// Size in bytes of an encoded element.
	fn element_size(&self) -> usize;

	/// Returns `true` iff `element` encodes a usable member of the group.
	fn in_group(&self, element: &Self::Element) -> bool;

	/// Raise `base` to the product of `scalars`. Returns `None` if `base` does not decode.
	/// Must run in time independent of the scalar values.
	fn expon(&self, base: &Self::Element, scalars: &[Self::Scalar]) -> Option<Self::Element>;

	/// Raise the group generator to `secret`.
	fn public(&self, secret: &Self::Scalar) -> Self::Element;

	/// Generate a uniformly random secret scalar.
	fn gen_secret(&self, rng: &mut (impl Rng + CryptoRng)) -> Self::Scalar;

	/// Reduce 512 bits of PRF output to a scalar.
	fn scalar_from_wide(&self, wide: &[u8; 64]) -> Self::Scalar;

	/// Parse an element from its encoding. Membership is not checked.
	fn element_from_bytes(&self, bytes: &[u8]) -> Option<Self::Element>;
}

/// The Ristretto255 group over Curve25519.
#[derive(Clone, Copy, Debug, Default)]
pub struct RistrettoGroup;

impl RistrettoGroup {
	fn decompress(element: &GroupElement) -> Option<RistrettoPoint> {
		CompressedRistretto(*element).decompress()
	}
}

impl Group for RistrettoGroup {
	type Element = GroupElement;
	type Scalar = Scalar;

	fn element_size(&self) -> usize {
		GROUP_ELEMENT_SIZE
	}

	fn in_group(&self, element: &GroupElement) -> bool {
		// The identity would give every hop the same shared secret
		Self::decompress(element).map_or(false, |point| !point.is_identity())
	}

	fn expon(&self, base: &GroupElement, scalars: &[Scalar]) -> Option<GroupElement> {
		let exponent = scalars.iter().fold(Scalar::ONE, |acc, scalar| acc * scalar);
		Self::decompress(base).map(|point| (point * exponent).compress().to_bytes())
	}

	fn public(&self, secret: &Scalar) -> GroupElement {
		RistrettoPoint::mul_base(secret).compress().to_bytes()
	}

	fn gen_secret(&self, rng: &mut (impl Rng + CryptoRng)) -> Scalar {
		let mut wide = [0; 64];
		rng.fill_bytes(&mut wide);
		let secret = Scalar::from_bytes_mod_order_wide(&wide);
		wide.zeroize();
		secret
	}

	fn scalar_from_wide(&self, wide: &[u8; 64]) -> Scalar {
		Scalar::from_bytes_mod_order_wide(wide)
	}

	fn element_from_bytes(&self, bytes: &[u8]) -> Option<GroupElement> {
		bytes.try_into().ok()
	}
}

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

//! Sender-side forward header construction.

use super::{
	crypto::{apply_keystream, SymmetricKey},
	DestKey, Group, Header, KeyDerivation, Mac,
};
use crate::core::config::Params;
use arrayvec::ArrayVec;
use rand::{CryptoRng, Rng};

/// Maximum number of hops a header can be built for. Sending a packet directly to the final
/// destination node counts as one hop.
pub const MAX_HOPS: usize = 8;
/// Maximum length of a single hop's routing command; its length must fit in one byte.
pub const MAX_ROUTING_LEN: usize = u8::MAX as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
	#[error("empty path")]
	EmptyPath,
	#[error("path has too many hops")]
	TooManyHops,
	#[error("routing command too long")]
	RoutingTooLong,
	#[error("routing commands do not fit in the routing block")]
	RouteTooLong,
	#[error("payload is not body_len bytes")]
	PayloadSize,
	#[error("hop public key not in group")]
	InvalidPublicKey,
}

/// One hop of a path: the node's public key and the routing command it should find.
#[derive(Clone, Debug)]
pub struct PathHop<E> {
	pub public: E,
	pub routing: Vec<u8>,
}

/// Everything the sender knows about a hop once the key exchange is done.
struct HopSecrets<E> {
	alpha: E,
	key: SymmetricKey,
	/// Routing-block keystream.
	rho: Vec<u8>,
}

fn exchange_keys<G: Group, S: KeyDerivation>(
	params: &Params<G, S>,
	rng: &mut (impl Rng + CryptoRng),
	path: &[PathHop<G::Element>],
) -> Result<ArrayVec<HopSecrets<G::Element>, MAX_HOPS>, BuildError> {
	let (group, suite) = (params.group(), params.suite());

	// Hop i sees alpha_i = g^(x*b_0*...*b_{i-1}), and shares y_i^(x*b_0*...*b_{i-1}) with us
	let mut exponents = ArrayVec::<G::Scalar, MAX_HOPS>::new();
	exponents.push(group.gen_secret(rng));
	let mut alpha = group.public(&exponents[0]);
	let mut hops = ArrayVec::new();

	for (i, hop) in path.iter().enumerate() {
		if !group.in_group(&hop.public) {
			return Err(BuildError::InvalidPublicKey)
		}
		let shared = group.expon(&hop.public, &exponents).ok_or(BuildError::InvalidPublicKey)?;
		let key = suite.derive_symmetric_key(shared.as_ref());
		let rho = suite.keystream(&key, params.keystream_len());

		let next_alpha = if i + 1 < path.len() {
			let blinding_factor =
				group.scalar_from_wide(&suite.blind_factor(alpha.as_ref(), &key));
			let next_alpha = group
				.expon(&alpha, std::slice::from_ref(&blinding_factor))
				.ok_or(BuildError::InvalidPublicKey)?;
			exponents.push(blinding_factor);
			Some(next_alpha)
		} else {
			None
		};

		hops.push(HopSecrets { alpha: alpha.clone(), key, rho });
		if let Some(next_alpha) = next_alpha {
			alpha = next_alpha;
		}
	}
	Ok(hops)
}

/// Build a forward header for `path` carrying `payload`, which must be exactly
/// [`Params::body_len`] bytes. Returns the header and payload to hand to the first hop.
///
/// After the last hop, the payload is back in the clear and the dest key is `dest_key`. The
/// header's gamma is the first hop's own MAC over its routing block, so the entry relay can verify
/// it.
pub fn create_forward_message<G: Group, S: KeyDerivation>(
	params: &Params<G, S>,
	rng: &mut (impl Rng + CryptoRng),
	path: &[PathHop<G::Element>],
	dest_key: &DestKey,
	payload: &[u8],
) -> Result<(Header<G::Element>, Vec<u8>), BuildError> {
	let suite = params.suite();
	let beta_len = params.beta_len();

	if path.is_empty() {
		return Err(BuildError::EmptyPath)
	}
	if path.len() > MAX_HOPS {
		return Err(BuildError::TooManyHops)
	}
	if payload.len() != params.body_len() {
		return Err(BuildError::PayloadSize)
	}
	if path.iter().any(|hop| hop.routing.len() > MAX_ROUTING_LEN) {
		return Err(BuildError::RoutingTooLong)
	}
	if path.iter().map(|hop| 1 + hop.routing.len()).sum::<usize>() > beta_len {
		return Err(BuildError::RouteTooLong)
	}

	let hops = exchange_keys(params, rng, path)?;

	// The filler is the tail of each routing block that is produced from keystream by earlier
	// hops rather than chosen by us
	let mut filler: Vec<u8> = Vec::new();
	for (hop, secrets) in path.iter().zip(&hops).take(path.len() - 1) {
		let start = beta_len - filler.len();
		filler.resize(filler.len() + 1 + hop.routing.len(), 0);
		apply_keystream(&mut filler, &secrets.rho[start..]);
	}

	// Build routing blocks from the last hop backwards
	let mut betas: Vec<Vec<u8>> = Vec::with_capacity(path.len());
	for (i, (hop, secrets)) in path.iter().zip(&hops).enumerate().rev() {
		let mut beta = Vec::with_capacity(beta_len);
		beta.push(hop.routing.len() as u8);
		beta.extend_from_slice(&hop.routing);
		match betas.last() {
			Some(next_beta) => {
				beta.extend_from_slice(&next_beta[..beta_len - beta.len()]);
				apply_keystream(&mut beta, &secrets.rho);
			},
			None => {
				debug_assert_eq!(i, path.len() - 1);
				let mut pad = vec![0; beta_len - filler.len() - beta.len()];
				rng.fill_bytes(&mut pad);
				beta.extend_from_slice(&pad);
				apply_keystream(&mut beta, &secrets.rho);
				beta.extend_from_slice(&filler);
			},
		}
		debug_assert_eq!(beta.len(), beta_len);
		betas.push(beta);
	}
	betas.reverse();

	// Per-hop MACs, payload layers, and dest-key permutations
	let mut gammas: ArrayVec<Mac, MAX_HOPS> = ArrayVec::new();
	let mut delta = payload.to_vec();
	let mut dest_key_params: ArrayVec<Mac, MAX_HOPS> = ArrayVec::new();
	for (secrets, beta) in hops.iter().zip(&betas) {
		let gamma = suite.mac(&suite.mac_key_1(&secrets.key), beta);
		let payload_key = suite.derive_payload_key(&secrets.key, &gamma);
		delta = suite.xor(&suite.payload_keystream(&payload_key, delta.len()), &delta);
		dest_key_params.push(suite.mac(&suite.mac_key_2(&secrets.key), beta));
		gammas.push(gamma);
	}
	let dest_key = dest_key_params
		.iter()
		.rev()
		.fold(*dest_key, |dest_key, param| suite.unpermute(param, &dest_key));

	let first = &hops[0];
	let header = Header {
		alpha: first.alpha.clone(),
		beta: betas.swap_remove(0),
		gamma: gammas[0],
		dest_key,
	};
	Ok((header, delta))
}

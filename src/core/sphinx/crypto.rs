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

//! Per-hop secret derivation, MAC computation, keystreams, and the dest-key permutation.

use super::packet::{DestKey, Mac};
use aes::{
	cipher::{generic_array::GenericArray as AesBlock, BlockDecrypt, BlockEncrypt, KeyInit},
	Aes128,
};
use arrayref::array_ref;
use blake2::{
	digest::{consts::U16, consts::U64, Mac as DigestMac},
	Blake2bMac,
};
use c2_chacha::{
	stream_cipher::{NewStreamCipher, SyncStreamCipher},
	ChaCha20,
};

const SYMMETRIC_KEY_PERSONAL: &[u8; 16] = b"ultrix-symm-key-";
const HEADER_KEYSTREAM_PERSONAL: &[u8; 16] = b"ultrix-hdr-strm-";
const REPLAY_TAG_PERSONAL: &[u8; 16] = b"ultrix-replay-tg";
const BLINDING_FACTOR_PERSONAL: &[u8; 16] = b"ultrix-blind-fac";
const MAC_KEY_1_PERSONAL: &[u8; 16] = b"ultrix-mac-key-1";
const MAC_KEY_2_PERSONAL: &[u8; 16] = b"ultrix-mac-key-2";
const PAYLOAD_KEY_PERSONAL: &[u8; 16] = b"ultrix-pl-key-k-";
const PAYLOAD_KEYSTREAM_PERSONAL: &[u8; 16] = b"ultrix-pl-stream";

/// Size in bytes of a [`SymmetricKey`].
pub const SYMMETRIC_KEY_SIZE: usize = 32;
/// Master per-hop key, derived from the key-exchange shared element.
pub type SymmetricKey = [u8; SYMMETRIC_KEY_SIZE];
pub const REPLAY_TAG_SIZE: usize = 32;
/// Per-hop replay fingerprint.
pub type ReplayTag = [u8; REPLAY_TAG_SIZE];
pub const MAC_KEY_SIZE: usize = 16;
pub type MacKey = [u8; MAC_KEY_SIZE];
pub const PAYLOAD_KEY_SIZE: usize = 32;
pub type PayloadKey = [u8; PAYLOAD_KEY_SIZE];
/// PRF output that the group reduces to a blinding scalar.
pub type BlindingSeed = [u8; 64];

/// Family of domain-separated keyed PRFs used by hop processing. Outputs for different purposes
/// must be independent even when derived from the same [`SymmetricKey`].
pub trait KeyDerivation {
	/// Derive the master per-hop key from the encoded shared group element.
	fn derive_symmetric_key(&self, shared: &[u8]) -> SymmetricKey;

	/// `len` bytes of keystream for unblinding the routing block.
	fn keystream(&self, key: &SymmetricKey, len: usize) -> Vec<u8>;

	fn replay_tag(&self, key: &SymmetricKey) -> ReplayTag;

	/// Blinding factor for `alpha`, to be reduced to a scalar by the group.
	fn blind_factor(&self, alpha: &[u8], key: &SymmetricKey) -> BlindingSeed;

	fn mac_key_1(&self, key: &SymmetricKey) -> MacKey;

	fn mac_key_2(&self, key: &SymmetricKey) -> MacKey;

	fn mac(&self, key: &MacKey, message: &[u8]) -> Mac;

	/// Constant-time check of `mac` against `message`.
	fn mac_ok(&self, key: &MacKey, message: &[u8], mac: &Mac) -> bool;

	fn derive_payload_key(&self, key: &SymmetricKey, gamma: &Mac) -> PayloadKey;

	/// Keyed permutation of the dest-key field.
	fn permute(&self, param: &Mac, field: &DestKey) -> DestKey;

	/// Inverse of [`permute`](Self::permute).
	fn unpermute(&self, param: &Mac, field: &DestKey) -> DestKey;

	/// `len` bytes of keystream for one payload layer.
	fn payload_keystream(&self, key: &PayloadKey, len: usize) -> Vec<u8>;

	fn xor(&self, keystream: &[u8], data: &[u8]) -> Vec<u8> {
		debug_assert_eq!(keystream.len(), data.len());
		let mut out = data.to_vec();
		apply_keystream(&mut out, keystream);
		out
	}
}

/// XOR `keystream` into `data`. Extra bytes in either are ignored.
pub fn apply_keystream(data: &mut [u8], keystream: &[u8]) {
	for (d, k) in data.iter_mut().zip(keystream) {
		*d ^= *k;
	}
}

////////////////////////////////////////////////////////////////////////////////
// BLAKE2b/ChaCha20 suite
////////////////////////////////////////////////////////////////////////////////

/// The default [`KeyDerivation`] suite: BLAKE2b keyed hashing with a distinct personalisation per
/// purpose, ChaCha20 keystreams, and AES-128 as the small dest-key permutation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake2ChaCha;

fn derive_secret(key: &[u8], personal: &[u8; 16], data: &[&[u8]]) -> [u8; 64] {
	let mut h = Blake2bMac::<U64>::new_with_salt_and_personal(key, b"", personal)
		.expect("Key, salt, and personalisation sizes are fixed and small enough");
	for d in data {
		h.update(d);
	}
	let mut derived = [0; 64];
	derived.copy_from_slice(&h.finalize().into_bytes());
	derived
}

fn chacha20_keystream(key: &[u8; 32], len: usize) -> Vec<u8> {
	let mut stream = vec![0; len];
	// Every derived keystream key is used once, so fine for nonce to be 0
	let mut c = ChaCha20::new(key.into(), &[0; 8].into());
	c.apply_keystream(&mut stream);
	stream
}

impl KeyDerivation for Blake2ChaCha {
	fn derive_symmetric_key(&self, shared: &[u8]) -> SymmetricKey {
		// The encoded element can be longer than a BLAKE2b key, so it goes in the message
		let derived = derive_secret(b"", SYMMETRIC_KEY_PERSONAL, &[shared]);
		*array_ref![derived, 0, SYMMETRIC_KEY_SIZE]
	}

	fn keystream(&self, key: &SymmetricKey, len: usize) -> Vec<u8> {
		let derived = derive_secret(key, HEADER_KEYSTREAM_PERSONAL, &[]);
		chacha20_keystream(array_ref![derived, 0, 32], len)
	}

	fn replay_tag(&self, key: &SymmetricKey) -> ReplayTag {
		let derived = derive_secret(key, REPLAY_TAG_PERSONAL, &[]);
		*array_ref![derived, 0, REPLAY_TAG_SIZE]
	}

	fn blind_factor(&self, alpha: &[u8], key: &SymmetricKey) -> BlindingSeed {
		derive_secret(key, BLINDING_FACTOR_PERSONAL, &[alpha])
	}

	fn mac_key_1(&self, key: &SymmetricKey) -> MacKey {
		let derived = derive_secret(key, MAC_KEY_1_PERSONAL, &[]);
		*array_ref![derived, 0, MAC_KEY_SIZE]
	}

	fn mac_key_2(&self, key: &SymmetricKey) -> MacKey {
		let derived = derive_secret(key, MAC_KEY_2_PERSONAL, &[]);
		*array_ref![derived, 0, MAC_KEY_SIZE]
	}

	fn mac(&self, key: &MacKey, message: &[u8]) -> Mac {
		let mut h = <Blake2bMac<U16> as DigestMac>::new_from_slice(key)
			.expect("Key size is fixed and small enough");
		h.update(message);
		h.finalize().into_bytes().into()
	}

	fn mac_ok(&self, key: &MacKey, message: &[u8], mac: &Mac) -> bool {
		let mut h = <Blake2bMac<U16> as DigestMac>::new_from_slice(key)
			.expect("Key size is fixed and small enough");
		h.update(message);
		h.verify(mac.into()).is_ok()
	}

	fn derive_payload_key(&self, key: &SymmetricKey, gamma: &Mac) -> PayloadKey {
		let derived = derive_secret(key, PAYLOAD_KEY_PERSONAL, &[&gamma[..]]);
		*array_ref![derived, 0, PAYLOAD_KEY_SIZE]
	}

	fn permute(&self, param: &Mac, field: &DestKey) -> DestKey {
		let mut block = AesBlock::from(*field);
		Aes128::new(param.into()).encrypt_block(&mut block);
		block.into()
	}

	fn unpermute(&self, param: &Mac, field: &DestKey) -> DestKey {
		let mut block = AesBlock::from(*field);
		Aes128::new(param.into()).decrypt_block(&mut block);
		block.into()
	}

	fn payload_keystream(&self, key: &PayloadKey, len: usize) -> Vec<u8> {
		let derived = derive_secret(key, PAYLOAD_KEYSTREAM_PERSONAL, &[]);
		chacha20_keystream(array_ref![derived, 0, 32], len)
	}
}

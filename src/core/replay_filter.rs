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

//! Relay replay filter.

use super::sphinx::ReplayTag;
use blake2::{
	digest::{consts::U8, Mac},
	Blake2bMac,
};
use rand::{CryptoRng, Rng};

// https://hur.st/bloomfilter/?n=7000000&p=&m=67108864&k=8
// The false positive rate is ~1% with 7m packets in the filter. Relay keys should be rotated well
// before that many packets have been seen.
const NUM_BITS: usize = 64 * 1024 * 1024;
const NUM_WORDS: usize = NUM_BITS / 64;
const NUM_TAG_BITS: usize = 8;

/// Bit positions of a replay tag in the filter.
#[derive(Clone, Copy)]
struct BloomTag {
	base: u32,
	inc: u32,
}

/// Bloom filter over replay tags. May report a fresh tag as seen (rarely), never the reverse.
pub struct ReplayFilter {
	key: [u8; 32],
	/// Allocated on demand.
	words: Option<Box<[u64; NUM_WORDS]>>,
}

impl ReplayFilter {
	fn new_with_key(key: [u8; 32]) -> Self {
		Self { key, words: None }
	}

	pub fn new(rng: &mut (impl Rng + CryptoRng)) -> Self {
		let mut key = [0; 32];
		rng.fill_bytes(&mut key);
		Self::new_with_key(key)
	}

	fn bloom_tag(&self, tag: &ReplayTag) -> BloomTag {
		let mut h = Blake2bMac::<U8>::new_with_salt_and_personal(&self.key, b"", b"ultrix-replay-bf")
			.expect("Key, salt, and personalisation sizes are fixed and small enough");
		h.update(tag);
		let tag = u64::from_le_bytes(h.finalize().into_bytes().into());
		BloomTag { base: tag as u32, inc: (tag >> 32) as u32 }
	}

	pub fn insert(&mut self, tag: &ReplayTag) {
		let tag = self.bloom_tag(tag);
		let mut i = tag.base;
		let words = self
			.words
			.get_or_insert_with(|| vec![0; NUM_WORDS].try_into().expect("Vec has the right size"));
		for _ in 0..NUM_TAG_BITS {
			words[((i as usize) >> 6) % NUM_WORDS] |= 1 << (i & 63);
			i = i.wrapping_add(tag.inc);
		}
	}

	pub fn contains(&self, tag: &ReplayTag) -> bool {
		match &self.words {
			None => false,
			Some(words) => {
				let tag = self.bloom_tag(tag);
				let mut i = tag.base;
				for _ in 0..NUM_TAG_BITS {
					if (words[((i as usize) >> 6) % NUM_WORDS] & (1 << (i & 63))) == 0 {
						return false
					}
					i = i.wrapping_add(tag.inc);
				}
				true
			},
		}
	}

	/// Insert `tag`, returning `false` if it was (probably) already present.
	pub fn insert_if_new(&mut self, tag: &ReplayTag) -> bool {
		if self.contains(tag) {
			return false
		}
		self.insert(tag);
		true
	}
}

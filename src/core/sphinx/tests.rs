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

//! Hop processing tests.

#![cfg(test)]

use super::*;
use crate::core::{config::Config, KxPair};
use curve25519_dalek::scalar::Scalar;
use rand::{rngs::StdRng, CryptoRng, Rng, SeedableRng};
use std::cell::Cell;

const ASSOC_LEN: usize = 4;
const ASSOC: [u8; ASSOC_LEN] = *b"v0\0\0";
const DEST_KEY: DestKey = *b"final-dest-key!!";

fn params() -> Params<RistrettoGroup, Blake2ChaCha> {
	Params::ristretto(&Config { assoc_len: ASSOC_LEN, ..Default::default() }).unwrap()
}

fn gen_nodes(rng: &mut (impl Rng + CryptoRng), num_hops: usize) -> Vec<KxPair<RistrettoGroup>> {
	(0..num_hops).map(|_i| KxPair::gen(&RistrettoGroup, &mut *rng)).collect()
}

fn gen_commands(rng: &mut impl Rng, num_hops: usize) -> Vec<RoutingCommand> {
	let peer_id_i = rng.gen_range(0..num_hops);
	(0..num_hops)
		.map(|i| {
			if i == num_hops - 1 {
				RoutingCommand::Deliver
			} else if i == peer_id_i {
				RoutingCommand::ForwardTo(Target::PeerId(rng.gen()))
			} else {
				let index = rng.gen_range(0..=MAX_MIXNODE_INDEX);
				RoutingCommand::ForwardTo(Target::MixnodeIndex(index.try_into().unwrap()))
			}
		})
		.collect()
}

fn gen_payload(rng: &mut impl Rng, len: usize) -> Vec<u8> {
	let mut payload = vec![0; len];
	rng.fill_bytes(&mut payload);
	payload
}

fn build<G: Group, S: KeyDerivation>(
	params: &Params<G, S>,
	rng: &mut (impl Rng + CryptoRng),
	publics: impl IntoIterator<Item = G::Element>,
	commands: &[RoutingCommand],
	payload: &[u8],
) -> (Header<G::Element>, Vec<u8>) {
	let path: Vec<_> = publics
		.into_iter()
		.zip(commands)
		.map(|(public, command)| PathHop { public, routing: command.encode() })
		.collect();
	create_forward_message(params, rng, &path, &DEST_KEY, payload).unwrap()
}

/// A header that is valid input for any node, but not built for one.
fn gen_header(rng: &mut (impl Rng + CryptoRng), params: &Params<RistrettoGroup, Blake2ChaCha>) -> Header<GroupElement> {
	Header {
		alpha: RistrettoGroup.public(&RistrettoGroup.gen_secret(&mut *rng)),
		beta: gen_payload(rng, params.beta_len()),
		gamma: rng.gen(),
		dest_key: rng.gen(),
	}
}

#[test]
fn basic_operation() {
	let mut rng = rand::thread_rng();
	let params = params();

	for num_hops in 1..=MAX_HOPS {
		let nodes = gen_nodes(&mut rng, num_hops);
		let commands = gen_commands(&mut rng, num_hops);
		let payload = gen_payload(&mut rng, params.body_len());
		let (mut header, mut delta) =
			build(&params, &mut rng, nodes.iter().map(|n| *n.public()), &commands, &payload);

		for (node, expected_command) in nodes.iter().zip(&commands) {
			let hop = process_hop(&params, node.secret(), &header, &delta, &ASSOC).unwrap();
			assert_eq!(RoutingCommand::decode(&hop.routing).as_ref(), Some(expected_command));
			assert_eq!(hop.next_header.beta.len(), params.beta_len());
			assert_eq!(hop.next_delta.len(), delta.len());
			assert_eq!(hop.next_header.encode().len(), params.header_size());
			header = hop.next_header;
			delta = hop.next_delta;
		}

		assert_eq!(delta, payload);
		assert_eq!(header.dest_key, DEST_KEY);
	}
}

#[test]
fn two_hop_end_to_end() {
	let mut rng = StdRng::seed_from_u64(2);
	let params = params();
	let nodes = gen_nodes(&mut rng, 2);
	let commands = [
		RoutingCommand::ForwardTo(Target::PeerId([0x11; PEER_ID_SIZE])),
		RoutingCommand::Deliver,
	];
	let payload = gen_payload(&mut rng, params.body_len());
	let (header, delta) =
		build(&params, &mut rng, nodes.iter().map(|n| *n.public()), &commands, &payload);

	let first = process_hop(&params, nodes[0].secret(), &header, &delta, &ASSOC).unwrap();
	assert_eq!(RoutingCommand::decode(&first.routing), Some(commands[0].clone()));
	// Nothing about the forwarded packet matches what came in
	assert_ne!(first.next_header.alpha, header.alpha);
	assert_ne!(first.next_header.beta, header.beta);
	assert_ne!(first.next_delta, delta);

	let second =
		process_hop(&params, nodes[1].secret(), &first.next_header, &first.next_delta, &ASSOC)
			.unwrap();
	assert_eq!(RoutingCommand::decode(&second.routing), Some(RoutingCommand::Deliver));
	assert_eq!(second.next_delta, payload);
	assert_eq!(second.next_header.dest_key, DEST_KEY);
}

#[test]
fn any_valid_input_keeps_sizes() {
	let mut rng = StdRng::seed_from_u64(3);
	let params = params();
	let node = KxPair::gen(&RistrettoGroup, &mut rng);

	for delta_len in [0, 1, params.body_len(), 4096] {
		let header = gen_header(&mut rng, &params);
		let delta = gen_payload(&mut rng, delta_len);
		let hop = process_hop(&params, node.secret(), &header, &delta, &ASSOC).unwrap();
		assert_eq!(hop.next_header.beta.len(), params.beta_len());
		assert_eq!(hop.next_delta.len(), delta_len);
		assert_eq!(hop.mac_key.len(), delta_len);
		assert!(RistrettoGroup.in_group(&hop.next_header.alpha));
	}
}

#[test]
fn deterministic() {
	let mut rng = StdRng::seed_from_u64(4);
	let params = params();
	let node = KxPair::gen(&RistrettoGroup, &mut rng);
	let header = gen_header(&mut rng, &params);
	let delta = gen_payload(&mut rng, params.body_len());

	let first = process_hop(&params, node.secret(), &header, &delta, &ASSOC).unwrap();
	let second = process_hop(&params, node.secret(), &header, &delta, &ASSOC).unwrap();
	assert_eq!(first, second);
}

#[test]
fn replay_tags() {
	let mut rng = StdRng::seed_from_u64(5);
	let params = params();
	let node = KxPair::gen(&RistrettoGroup, &mut rng);
	let header = gen_header(&mut rng, &params);
	let delta = gen_payload(&mut rng, params.body_len());
	let tag = process_hop(&params, node.secret(), &header, &delta, &ASSOC).unwrap().tag;

	// The tag only depends on alpha and the secret
	let mut altered = header.clone();
	altered.beta = gen_payload(&mut rng, params.beta_len());
	altered.gamma = rng.gen();
	let altered_delta = gen_payload(&mut rng, params.body_len());
	assert_eq!(process_hop(&params, node.secret(), &altered, &altered_delta, &ASSOC).unwrap().tag, tag);

	// Different shared secrets, different tags
	let other_node = KxPair::gen(&RistrettoGroup, &mut rng);
	assert_ne!(process_hop(&params, other_node.secret(), &header, &delta, &ASSOC).unwrap().tag, tag);
	let other_header = gen_header(&mut rng, &params);
	assert_ne!(
		process_hop(&params, node.secret(), &other_header, &delta, &ASSOC).unwrap().tag,
		tag
	);
}

#[test]
fn assoc_length_mismatch() {
	let mut rng = StdRng::seed_from_u64(6);
	let params = params();
	let node = KxPair::gen(&RistrettoGroup, &mut rng);
	let header = gen_header(&mut rng, &params);
	let delta = gen_payload(&mut rng, params.body_len());

	for assoc_len in [ASSOC_LEN - 1, ASSOC_LEN + 1, 0] {
		let assoc = vec![0; assoc_len];
		assert_eq!(
			process_hop(&params, node.secret(), &header, &delta, &assoc),
			Err(HopError::LengthMismatch)
		);
	}
}

#[test]
fn alpha_not_in_group() {
	let mut rng = StdRng::seed_from_u64(7);
	let params = params();
	let node = KxPair::gen(&RistrettoGroup, &mut rng);
	let delta = gen_payload(&mut rng, params.body_len());

	for alpha in [[0; GROUP_ELEMENT_SIZE], [0xff; GROUP_ELEMENT_SIZE]] {
		let header = Header { alpha, ..gen_header(&mut rng, &params) };
		assert_eq!(
			process_hop(&params, node.secret(), &header, &delta, &ASSOC),
			Err(HopError::InvalidGroupElement)
		);
	}
}

#[test]
fn beta_length_mismatch() {
	let mut rng = StdRng::seed_from_u64(8);
	let params = params();
	let node = KxPair::gen(&RistrettoGroup, &mut rng);
	let delta = gen_payload(&mut rng, params.body_len());

	for beta_len in [params.beta_len() - 1, params.beta_len() + 1] {
		let header = Header { beta: vec![0; beta_len], ..gen_header(&mut rng, &params) };
		assert_eq!(
			process_hop(&params, node.secret(), &header, &delta, &ASSOC),
			Err(HopError::MalformedHeader)
		);
	}
}

#[test]
fn incoming_gamma() {
	let mut rng = StdRng::seed_from_u64(9);
	let params = params();
	let nodes = gen_nodes(&mut rng, 2);
	let commands = [
		RoutingCommand::ForwardTo(Target::MixnodeIndex(MixnodeIndex::try_from(3usize).unwrap())),
		RoutingCommand::Deliver,
	];
	let payload = gen_payload(&mut rng, params.body_len());
	let (header, delta) =
		build(&params, &mut rng, nodes.iter().map(|n| *n.public()), &commands, &payload);

	let first = process_hop(&params, nodes[0].secret(), &header, &delta, &ASSOC).unwrap();
	assert!(first.incoming_gamma_ok);
	let second =
		process_hop(&params, nodes[1].secret(), &first.next_header, &first.next_delta, &ASSOC)
			.unwrap();
	// Later hops receive the previous hop's MAC
	assert!(!second.incoming_gamma_ok);

	let mut tampered = header.clone();
	tampered.beta[0] ^= 1;
	assert!(!process_hop(&params, nodes[0].secret(), &tampered, &delta, &ASSOC).unwrap().incoming_gamma_ok);
	let mut tampered = header;
	tampered.gamma[0] ^= 1;
	assert!(!process_hop(&params, nodes[0].secret(), &tampered, &delta, &ASSOC).unwrap().incoming_gamma_ok);
}

#[test]
fn tampered_beta_changes_payload_key() {
	let mut rng = StdRng::seed_from_u64(10);
	let params = params();
	let nodes = gen_nodes(&mut rng, 1);
	let payload = gen_payload(&mut rng, params.body_len());
	let (mut header, delta) = build(
		&params,
		&mut rng,
		nodes.iter().map(|n| *n.public()),
		&[RoutingCommand::Deliver],
		&payload,
	);

	// Flip a bit in the random padding: routing is unaffected, the payload is garbled
	*header.beta.last_mut().unwrap() ^= 1;
	let hop = process_hop(&params, nodes[0].secret(), &header, &delta, &ASSOC).unwrap();
	assert_eq!(RoutingCommand::decode(&hop.routing), Some(RoutingCommand::Deliver));
	assert_ne!(hop.next_delta, payload);
	assert_ne!(hop.next_header.dest_key, DEST_KEY);
}

#[test]
fn mac_key_is_payload_keystream() {
	let mut rng = StdRng::seed_from_u64(11);
	let params = params();
	let node = KxPair::gen(&RistrettoGroup, &mut rng);
	let header = gen_header(&mut rng, &params);
	let delta = gen_payload(&mut rng, params.body_len());
	let hop = process_hop(&params, node.secret(), &header, &delta, &ASSOC).unwrap();
	assert_eq!(Blake2ChaCha.xor(&hop.next_delta, &delta), hop.mac_key);
}

/// Ristretto, counting exponentiations.
#[derive(Default)]
struct CountingGroup {
	expons: Cell<usize>,
}

impl Group for CountingGroup {
	type Element = GroupElement;
	type Scalar = Scalar;

	fn element_size(&self) -> usize {
		RistrettoGroup.element_size()
	}

	fn in_group(&self, element: &GroupElement) -> bool {
		RistrettoGroup.in_group(element)
	}

	fn expon(&self, base: &GroupElement, scalars: &[Scalar]) -> Option<GroupElement> {
		self.expons.set(self.expons.get() + 1);
		RistrettoGroup.expon(base, scalars)
	}

	fn public(&self, secret: &Scalar) -> GroupElement {
		RistrettoGroup.public(secret)
	}

	fn gen_secret(&self, rng: &mut (impl Rng + CryptoRng)) -> Scalar {
		RistrettoGroup.gen_secret(rng)
	}

	fn scalar_from_wide(&self, wide: &[u8; 64]) -> Scalar {
		RistrettoGroup.scalar_from_wide(wide)
	}

	fn element_from_bytes(&self, bytes: &[u8]) -> Option<GroupElement> {
		RistrettoGroup.element_from_bytes(bytes)
	}
}

#[test]
fn two_exponentiations_per_hop() {
	let mut rng = StdRng::seed_from_u64(12);
	let params =
		Params::new(&Config { assoc_len: ASSOC_LEN, ..Default::default() }, CountingGroup::default(), Blake2ChaCha)
			.unwrap();
	let nodes = gen_nodes(&mut rng, 3);
	let commands = gen_commands(&mut rng, 3);
	let payload = gen_payload(&mut rng, params.body_len());
	let (mut header, mut delta) =
		build(&params, &mut rng, nodes.iter().map(|n| *n.public()), &commands, &payload);

	for node in &nodes {
		params.group().expons.set(0);
		let hop = process_hop(&params, node.secret(), &header, &delta, &ASSOC).unwrap();
		assert_eq!(params.group().expons.get(), 2);
		header = hop.next_header;
		delta = hop.next_delta;
	}
	assert_eq!(delta, payload);

	// Rejected packets cost no exponentiations
	params.group().expons.set(0);
	let bad_header = Header { beta: vec![0; params.beta_len() + 1], ..header };
	assert_eq!(
		process_hop(&params, nodes[0].secret(), &bad_header, &delta, &ASSOC),
		Err(HopError::MalformedHeader)
	);
	assert_eq!(params.group().expons.get(), 0);
}

#[test]
fn build_errors() {
	let mut rng = StdRng::seed_from_u64(13);
	let params = params();
	let payload = gen_payload(&mut rng, params.body_len());
	let public = *KxPair::gen(&RistrettoGroup, &mut rng).public();
	let hop = |routing: Vec<u8>| PathHop { public, routing };

	let create = |rng: &mut StdRng, path: &[PathHop<GroupElement>], payload: &[u8]| {
		create_forward_message(&params, rng, path, &DEST_KEY, payload).map(|_| ())
	};

	assert_eq!(create(&mut rng, &[], &payload), Err(BuildError::EmptyPath));
	let path = vec![hop(vec![0; 4]); MAX_HOPS + 1];
	assert_eq!(create(&mut rng, &path, &payload), Err(BuildError::TooManyHops));
	assert_eq!(
		create(&mut rng, &[hop(vec![0; MAX_ROUTING_LEN + 1])], &payload),
		Err(BuildError::RoutingTooLong)
	);
	// Each hop costs one length byte on top of its command
	assert_eq!(
		create(&mut rng, &[hop(vec![0; params.beta_len()])], &payload),
		Err(BuildError::RouteTooLong)
	);
	assert_eq!(create(&mut rng, &[hop(vec![0; params.beta_len() - 1])], &payload), Ok(()));
	assert_eq!(create(&mut rng, &[hop(vec![2])], &payload[1..]), Err(BuildError::PayloadSize));
	assert_eq!(
		create(&mut rng, &[PathHop { public: [0; GROUP_ELEMENT_SIZE], routing: vec![2] }], &payload),
		Err(BuildError::InvalidPublicKey)
	);
}

#[test]
fn full_routing_block() {
	let mut rng = StdRng::seed_from_u64(14);
	let params = params();
	let nodes = gen_nodes(&mut rng, 2);
	// Two commands that use every byte of the routing block between them
	let first_len = params.beta_len() / 2 - 1;
	let second_len = params.beta_len() - first_len - 2;
	let routings = [gen_payload(&mut rng, first_len), gen_payload(&mut rng, second_len)];
	let path: Vec<_> = nodes
		.iter()
		.zip(&routings)
		.map(|(node, routing)| PathHop { public: *node.public(), routing: routing.clone() })
		.collect();
	let payload = gen_payload(&mut rng, params.body_len());
	let (mut header, mut delta) =
		create_forward_message(&params, &mut rng, &path, &DEST_KEY, &payload).unwrap();

	for (node, routing) in nodes.iter().zip(&routings) {
		let hop = process_hop(&params, node.secret(), &header, &delta, &ASSOC).unwrap();
		assert_eq!(&hop.routing, routing);
		header = hop.next_header;
		delta = hop.next_delta;
	}
	assert_eq!(delta, payload);
}

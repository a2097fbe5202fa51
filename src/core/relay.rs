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

//! Relay: hop processing plus the state and policy around it.

use super::{
	config::{Params, RelayConfig},
	error::Error,
	kx_pair::KxPair,
	replay_filter::ReplayFilter,
	sphinx::{
		process_hop, split_packet, DestKey, Group, Header, KeyDerivation, RoutingCommand, Target,
	},
};
use parking_lot::Mutex;
use rand::{CryptoRng, Rng};
use std::sync::Arc;

/// What to do with a packet after a [`Relay`] has processed it.
#[derive(Debug, PartialEq, Eq)]
pub enum Action<E> {
	/// Forward `header` and `delta` (see [`encode_packet`](super::sphinx::encode_packet)) to
	/// `target`.
	ForwardTo { target: Target, header: Header<E>, delta: Vec<u8> },
	/// The packet was for us.
	Deliver {
		dest_key: DestKey,
		payload: Vec<u8>,
		/// Payload keystream of the final layer.
		mac_key: Vec<u8>,
	},
}

/// A mix relay. Handles packets from any number of threads; the only shared mutable state is the
/// replay filter.
pub struct Relay<G: Group, S> {
	params: Arc<Params<G, S>>,
	kx_pair: KxPair<G>,
	replay_filter: Mutex<ReplayFilter>,
	config: RelayConfig,
}

impl<G: Group, S: KeyDerivation> Relay<G, S> {
	pub fn new(
		params: Arc<Params<G, S>>,
		kx_pair: KxPair<G>,
		config: RelayConfig,
		rng: &mut (impl Rng + CryptoRng),
	) -> Self {
		Self { params, kx_pair, replay_filter: Mutex::new(ReplayFilter::new(rng)), config }
	}

	pub fn params(&self) -> &Params<G, S> {
		&self.params
	}

	/// Our key-exchange public key, for senders to build paths with.
	pub fn public(&self) -> &G::Element {
		self.kx_pair.public()
	}

	/// Handle an encoded packet (see [`Params::packet_size`]).
	pub fn handle_packet(&self, packet: &[u8], assoc: &[u8]) -> Result<Action<G::Element>, Error> {
		let (header, delta) = split_packet(self.params(), packet).map_err(|err| {
			log::debug!(target: self.config.log_target, "Dropping undecodable packet: {err}");
			err
		})?;
		self.handle(&header, delta, assoc)
	}

	/// Process one hop of a packet, reject replays, and interpret the routing command.
	pub fn handle(
		&self,
		header: &Header<G::Element>,
		delta: &[u8],
		assoc: &[u8],
	) -> Result<Action<G::Element>, Error> {
		let hop = process_hop(self.params(), self.kx_pair.secret(), header, delta, assoc)
			.map_err(|err| {
				log::debug!(target: self.config.log_target, "Dropping packet: {err}");
				err
			})?;

		if self.config.verify_incoming_gamma && !hop.incoming_gamma_ok {
			log::debug!(target: self.config.log_target, "Dropping packet with bad gamma");
			return Err(Error::GammaMismatch)
		}

		// Check and insert under one lock so concurrent copies of a packet cannot both get through
		if !self.replay_filter.lock().insert_if_new(&hop.tag) {
			log::debug!(target: self.config.log_target, "Dropping replayed packet");
			return Err(Error::Replayed)
		}

		match RoutingCommand::decode(&hop.routing) {
			Some(RoutingCommand::ForwardTo(target)) => {
				log::trace!(target: self.config.log_target, "Forwarding packet to {target:?}");
				Ok(Action::ForwardTo { target, header: hop.next_header, delta: hop.next_delta })
			},
			Some(RoutingCommand::Deliver) => {
				log::trace!(target: self.config.log_target, "Delivering packet");
				Ok(Action::Deliver {
					dest_key: hop.next_header.dest_key,
					payload: hop.next_delta,
					mac_key: hop.mac_key,
				})
			},
			None => {
				log::debug!(target: self.config.log_target, "Dropping packet with bad routing command");
				Err(Error::BadRoutingCommand)
			},
		}
	}
}

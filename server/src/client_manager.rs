//! Roster of connected quiz players
//!
//! This module tracks every client whose registration has completed:
//! - Display name and running score
//! - Outbound line channel feeding that client's socket writer
//! - Registration order, which drives broadcast and scoreboard order
//!
//! The manager itself is not synchronized. It is owned by the session, which
//! serializes every call behind a single lock so that broadcasts always see
//! a consistent roster and score updates are never lost.

use log::{debug, info};
use shared::notice;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Identifier assigned at registration, increasing with every new client
pub type ClientId = u32;

/// Channel end that hands lines to a connection's writer task
pub type LineSender = mpsc::UnboundedSender<String>;

/// A registered player
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: ClientId,
    /// Name sent as the first line of the connection
    pub name: String,
    /// Remote address, used for logging
    pub addr: SocketAddr,
    /// Points earned so far
    pub score: u32,
    /// Lines queued here are written to the client's socket in order
    sender: LineSender,
}

impl Client {
    pub fn new(id: ClientId, name: String, addr: SocketAddr, sender: LineSender) -> Self {
        Self {
            id,
            name,
            addr,
            score: 0,
            sender,
        }
    }

    /// Queues one line for delivery.
    ///
    /// A closed channel means the connection is already being torn down;
    /// its handler will unregister the client, so the line is just dropped.
    pub fn send(&self, text: &str) {
        if self.sender.send(text.to_string()).is_err() {
            debug!("Dropping line for closing client {} ({})", self.id, self.name);
        }
    }
}

/// Manages all registered clients in registration order
pub struct ClientManager {
    /// Keyed by id; ids only grow, so iteration follows registration order
    clients: BTreeMap<ClientId, Client>,
    /// Next id handed out by `add_client`
    next_client_id: ClientId,
}

impl Default for ClientManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientManager {
    pub fn new() -> Self {
        Self {
            clients: BTreeMap::new(),
            next_client_id: 1,
        }
    }

    /// Registers a client with a zero score and returns its id
    pub fn add_client(&mut self, name: String, addr: SocketAddr, sender: LineSender) -> ClientId {
        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} ({}) connected from {}", client_id, name, addr);
        self.clients
            .insert(client_id, Client::new(client_id, name, addr, sender));

        client_id
    }

    /// Removes a client, returning it if it was still registered
    pub fn remove_client(&mut self, client_id: ClientId) -> Option<Client> {
        let removed = self.clients.remove(&client_id);
        if let Some(client) = &removed {
            info!(
                "Client {} ({}) disconnected from {}",
                client.id, client.name, client.addr
            );
        }
        removed
    }

    pub fn get(&self, client_id: ClientId) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    /// Sends a line to one client only
    pub fn send_to(&self, client_id: ClientId, text: &str) {
        if let Some(client) = self.clients.get(&client_id) {
            client.send(text);
        }
    }

    /// Sends a line to every registered client
    pub fn broadcast(&self, text: &str) {
        for client in self.clients.values() {
            client.send(text);
        }
    }

    /// Sends a line to every registered client except `sender`
    pub fn broadcast_others(&self, sender: ClientId, text: &str) {
        for client in self.clients.values().filter(|c| c.id != sender) {
            client.send(text);
        }
    }

    /// Renders one `name: N pt` line per client, in registration order
    pub fn scoreboard(&self) -> String {
        self.clients
            .values()
            .map(|client| notice::score_line(&client.name, client.score))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Adds points to a client's score; returns false if the client is gone
    pub fn add_point(&mut self, client_id: ClientId, points: u32) -> bool {
        match self.clients.get_mut(&client_id) {
            Some(client) => {
                client.score += points;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

use std::collections::HashMap;

use relay_core::config::HUB_COMMAND_CAPACITY;
use relay_protocol::Envelope;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::{
    client::{Client, ClientId},
    error::HubError,
};

/// Requests consumed, one at a time, by the hub loop.
#[derive(Debug)]
pub enum HubCommand {
    Admit(Client),
    Dismiss(ClientId),
    Broadcast(String),
    Members(oneshot::Sender<usize>),
}

/// Cloneable front door to a running [`Hub`].
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub(crate) fn from_sender(tx: mpsc::Sender<HubCommand>) -> Self {
        Self { tx }
    }

    pub async fn admit(&self, client: Client) -> Result<(), HubError> {
        self.submit(HubCommand::Admit(client)).await
    }

    pub async fn dismiss(&self, id: ClientId) -> Result<(), HubError> {
        self.submit(HubCommand::Dismiss(id)).await
    }

    pub async fn broadcast(&self, payload: String) -> Result<(), HubError> {
        self.submit(HubCommand::Broadcast(payload)).await
    }

    /// Number of currently admitted clients, as seen by the hub loop.
    pub async fn member_count(&self) -> Result<usize, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(HubCommand::Members(reply_tx)).await?;
        reply_rx.await.map_err(|_| HubError::Unavailable)
    }

    async fn submit(&self, cmd: HubCommand) -> Result<(), HubError> {
        self.tx.send(cmd).await.map_err(|_| HubError::Unavailable)
    }
}

/// Sole owner of client membership. Runs as a single task; every membership
/// read and write happens inside [`Hub::run`], so no lock is needed.
pub struct Hub {
    clients: HashMap<ClientId, Client>,
    commands: mpsc::Receiver<HubCommand>,
}

impl Hub {
    pub fn new() -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(HUB_COMMAND_CAPACITY);
        let hub = Self {
            clients: HashMap::new(),
            commands: rx,
        };
        (hub, HubHandle::from_sender(tx))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn is_member(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    /// Add `client` and tell everyone else about it. The new client never
    /// hears about its own arrival.
    pub fn admit(&mut self, client: Client) {
        let id = client.id().clone();
        if self.clients.insert(id.clone(), client).is_some() {
            warn!(client_id = %id, "client admitted twice, replacing previous entry");
        }
        info!(client_id = %id, members = self.clients.len(), "client admitted");

        if let Some(notice) = encode(Envelope::connected()) {
            self.send_except(&notice, &id);
        }
    }

    /// Remove `id`, close its queue and notify the remaining members.
    /// Dismissing a non-member does nothing.
    pub fn dismiss(&mut self, id: &ClientId) {
        // dropping the Client closes its queue; the writer loop sends the close frame
        if self.clients.remove(id).is_none() {
            debug!(client_id = %id, "dismiss for non-member ignored");
            return;
        }
        info!(client_id = %id, members = self.clients.len(), "client dismissed");

        if let Some(notice) = encode(Envelope::disconnected()) {
            self.send_except(&notice, id);
        }
    }

    /// Deliver `payload` to every member.
    pub fn broadcast(&mut self, payload: &str) {
        self.deliver(payload, None);
    }

    /// Deliver `payload` to every member except `except`.
    pub fn send_except(&mut self, payload: &str, except: &ClientId) {
        self.deliver(payload, Some(except));
    }

    /// Non-blocking fan-out. A recipient whose queue is full or closed is
    /// evicted on the spot, without a "disconnected" notice.
    fn deliver(&mut self, payload: &str, except: Option<&ClientId>) {
        let mut evicted = Vec::new();
        for (id, client) in &self.clients {
            if except == Some(id) {
                continue;
            }
            if let Err(e) = client.try_deliver(payload.to_string()) {
                debug!(client_id = %id, error = %e, "outbound queue rejected frame");
                evicted.push(id.clone());
            }
        }

        for id in evicted {
            self.clients.remove(&id);
            warn!(client_id = %id, members = self.clients.len(), "slow client evicted");
        }
    }

    fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Admit(client) => self.admit(client),
            HubCommand::Dismiss(id) => self.dismiss(&id),
            HubCommand::Broadcast(payload) => self.broadcast(&payload),
            HubCommand::Members(reply) => {
                let _ = reply.send(self.clients.len());
            }
        }
    }

    /// Main event loop. Processes commands in arrival order until every
    /// [`HubHandle`] is dropped or `shutdown` broadcasts `true` (or its
    /// sender goes away). On exit every member's queue is closed.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("hub started");
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        let remaining = self.clients.len();
        self.clients.clear();
        info!(closed = remaining, "hub stopped");
    }
}

fn encode(envelope: Envelope) -> Option<String> {
    match envelope.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(error = %e, "failed to encode system notice");
            None
        }
    }
}

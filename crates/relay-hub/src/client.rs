use std::fmt;

use tokio::sync::mpsc::{self, error::TrySendError};

/// Opaque per-connection identity, generated at admission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Hub-side record of a connected client: its identity and the producing
/// end of its outbound queue.
///
/// Dropping a `Client` closes the queue, which is how the hub tells the
/// writer loop that no more frames will arrive.
#[derive(Debug)]
pub struct Client {
    id: ClientId,
    outbound: mpsc::Sender<String>,
}

impl Client {
    /// Create a client record plus the queue its writer loop drains.
    /// `capacity` is clamped to at least one slot.
    pub fn new(id: ClientId, capacity: usize) -> (Self, OutboundQueue) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { id, outbound: tx }, OutboundQueue { rx })
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    /// Enqueue without waiting. Fails when the queue is full or the writer is gone.
    pub(crate) fn try_deliver(&self, payload: String) -> Result<(), TrySendError<String>> {
        self.outbound.try_send(payload)
    }
}

/// Consuming end of a client's outbound queue, owned by its writer loop.
#[derive(Debug)]
pub struct OutboundQueue {
    rx: mpsc::Receiver<String>,
}

impl OutboundQueue {
    /// Wait for the next frame. `None` once the hub has closed the queue
    /// and every buffered frame has been drained.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    #[cfg(test)]
    pub(crate) fn try_next(&mut self) -> Result<String, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }
}

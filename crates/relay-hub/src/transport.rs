use async_trait::async_trait;

use crate::error::TransportError;

/// Read half of a client socket.
#[async_trait]
pub trait MessageSource: Send + 'static {
    /// Wait for the next application payload.
    ///
    /// Control frames (ping/pong) are handled by the implementation and never
    /// surface here. A close frame or end of stream is reported as
    /// [`TransportError::Closed`].
    async fn recv(&mut self) -> Result<String, TransportError>;
}

/// Write half of a client socket. Only the writer loop holds one.
#[async_trait]
pub trait MessageSink: Send + 'static {
    /// Send one payload as a single text frame.
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError>;

    /// Liveness probe.
    async fn send_ping(&mut self) -> Result<(), TransportError>;

    /// Protocol-level close frame.
    async fn send_close(&mut self) -> Result<(), TransportError>;

    /// Flush and shut down the underlying transport.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// A live client socket that can be split into independently owned halves,
/// so reads and writes proceed on separate tasks.
pub trait Connection: Send + 'static {
    type Source: MessageSource;
    type Sink: MessageSink;

    fn split(self) -> (Self::Source, Self::Sink);
}

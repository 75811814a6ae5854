use std::time::Duration;

use relay_core::config::HubConfig;
use tracing::info;

use crate::{
    client::{Client, ClientId},
    error::HubError,
    hub::HubHandle,
    pump::{read_loop, write_loop},
    transport::Connection,
};

/// Per-connection knobs, usually derived from [`HubConfig`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub queue_capacity: usize,
    pub max_payload_bytes: usize,
    pub heartbeat: Option<Duration>,
}

impl From<&HubConfig> for SessionOptions {
    fn from(cfg: &HubConfig) -> Self {
        Self {
            queue_capacity: cfg.queue_capacity,
            max_payload_bytes: cfg.max_payload_bytes,
            heartbeat: (cfg.heartbeat_interval_secs > 0)
                .then(|| Duration::from_secs(cfg.heartbeat_interval_secs)),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&HubConfig::default())
    }
}

/// Admit a freshly upgraded connection and start its reader and writer.
///
/// The admit request is queued before the reader starts, so the client is a
/// member by the time any of its own broadcasts reach the hub. If the hub is
/// gone the connection is dropped and nothing is spawned.
pub async fn attach<C: Connection>(
    hub: &HubHandle,
    conn: C,
    opts: &SessionOptions,
) -> Result<ClientId, HubError> {
    let id = ClientId::generate();
    let (client, queue) = Client::new(id.clone(), opts.queue_capacity);
    hub.admit(client).await?;

    let (source, sink) = conn.split();
    tokio::spawn(write_loop(
        id.clone(),
        queue,
        sink,
        hub.clone(),
        opts.heartbeat,
    ));
    tokio::spawn(read_loop(
        id.clone(),
        source,
        hub.clone(),
        opts.max_payload_bytes,
    ));

    info!(client_id = %id, "client attached");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::hub::Hub;
    use crate::transport::{MessageSink, MessageSource};
    use async_trait::async_trait;
    use relay_protocol::envelope::DISCONNECTED_NOTICE;
    use relay_protocol::Envelope;
    use tokio::sync::{mpsc, watch};

    /// In-memory socket: the test plays the remote peer through channels.
    struct PipeConnection {
        inbound: mpsc::Receiver<String>,
        outbound: mpsc::UnboundedSender<Option<String>>,
    }

    struct PipeSource(mpsc::Receiver<String>);
    struct PipeSink(mpsc::UnboundedSender<Option<String>>);

    #[async_trait]
    impl MessageSource for PipeSource {
        async fn recv(&mut self) -> Result<String, TransportError> {
            self.0.recv().await.ok_or(TransportError::Closed)
        }
    }

    #[async_trait]
    impl MessageSink for PipeSink {
        async fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
            self.0
                .send(Some(payload))
                .map_err(|_| TransportError::Closed)
        }
        async fn send_ping(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
        async fn send_close(&mut self) -> Result<(), TransportError> {
            self.0.send(None).map_err(|_| TransportError::Closed)
        }
        async fn close(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    impl Connection for PipeConnection {
        type Source = PipeSource;
        type Sink = PipeSink;

        fn split(self) -> (PipeSource, PipeSink) {
            (PipeSource(self.inbound), PipeSink(self.outbound))
        }
    }

    struct Peer {
        send: mpsc::Sender<String>,
        frames: mpsc::UnboundedReceiver<Option<String>>,
    }

    fn pipe() -> (PipeConnection, Peer) {
        let (in_tx, in_rx) = mpsc::channel(8);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        (
            PipeConnection {
                inbound: in_rx,
                outbound: out_tx,
            },
            Peer {
                send: in_tx,
                frames: out_rx,
            },
        )
    }

    async fn next_envelope(peer: &mut Peer) -> Envelope {
        let frame = peer.frames.recv().await.flatten().expect("text frame");
        serde_json::from_str(&frame).unwrap()
    }

    #[tokio::test]
    async fn attached_clients_relay_to_each_other() {
        let (hub, handle) = Hub::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(hub.run(shutdown_rx));
        let opts = SessionOptions {
            heartbeat: None,
            ..Default::default()
        };

        let (conn_a, mut peer_a) = pipe();
        let (conn_b, mut peer_b) = pipe();
        let id_a = attach(&handle, conn_a, &opts).await.unwrap();
        let _id_b = attach(&handle, conn_b, &opts).await.unwrap();

        assert!(next_envelope(&mut peer_a).await.is_system());

        peer_a.send.send("hi all".to_string()).await.unwrap();
        for peer in [&mut peer_a, &mut peer_b] {
            let env = next_envelope(peer).await;
            assert_eq!(env.sender, id_a.as_str());
            assert_eq!(env.content.text, "hi all");
        }

        // remote A hangs up: B hears about it, A's writer sends a close frame
        drop(peer_a.send);
        assert_eq!(peer_a.frames.recv().await, Some(None));
        let env = next_envelope(&mut peer_b).await;
        assert!(env.is_system());
        assert_eq!(handle.member_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn write_failure_dismisses_and_notifies_peers() {
        let (hub, handle) = Hub::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(hub.run(shutdown_rx));
        let opts = SessionOptions {
            heartbeat: None,
            ..Default::default()
        };

        let (conn_a, peer_a) = pipe();
        let (conn_b, mut peer_b) = pipe();
        attach(&handle, conn_a, &opts).await.unwrap();
        attach(&handle, conn_b, &opts).await.unwrap();

        // A's outbound side dies while its inbound side stays open, so its
        // reader never sees an error
        let Peer {
            send: _keep_a_open,
            frames,
        } = peer_a;
        drop(frames);

        peer_b.send.send("one".to_string()).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let env = next_envelope(&mut peer_b).await;
                if env.is_system() {
                    assert_eq!(env.content.text, DISCONNECTED_NOTICE);
                    break;
                }
            }
        })
        .await
        .expect("remaining peer was never told");
        assert_eq!(handle.member_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn attach_fails_when_hub_is_gone() {
        let (hub, handle) = Hub::new();
        drop(hub);
        let (conn, _peer) = pipe();

        let result = attach(&handle, conn, &SessionOptions::default()).await;
        assert!(matches!(result, Err(HubError::Unavailable)));
    }
}

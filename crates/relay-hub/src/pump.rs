//! Per-client reader and writer tasks.
//!
//! The reader turns inbound frames into broadcast requests; the writer is the
//! only task that ever writes to a given socket.

use std::time::Duration;

use relay_protocol::Envelope;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::{
    client::{ClientId, OutboundQueue},
    error::TransportError,
    hub::HubHandle,
    transport::{MessageSink, MessageSource},
};

/// Pull payloads from `source` and submit them as USER broadcasts.
///
/// The first read failure ends the loop: the client is dismissed exactly
/// once and the read half is dropped. No read is attempted after an error.
pub async fn read_loop<S: MessageSource>(
    id: ClientId,
    mut source: S,
    hub: HubHandle,
    max_payload_bytes: usize,
) {
    loop {
        let text = match source.recv().await.and_then(|t| within_limit(t, max_payload_bytes)) {
            Ok(text) => text,
            Err(TransportError::Closed) => {
                debug!(client_id = %id, "peer closed connection");
                break;
            }
            Err(e) => {
                warn!(client_id = %id, error = %e, "read failed");
                break;
            }
        };

        let payload = match Envelope::user(id.as_str(), text).to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(client_id = %id, error = %e, "failed to encode envelope");
                continue;
            }
        };

        if hub.broadcast(payload).await.is_err() {
            debug!(client_id = %id, "hub stopped, reader exiting");
            return;
        }
    }

    if hub.dismiss(id.clone()).await.is_err() {
        debug!(client_id = %id, "hub stopped before dismiss");
    }
    drop(source);
    debug!(client_id = %id, "reader stopped");
}

fn within_limit(text: String, max: usize) -> Result<String, TransportError> {
    if text.len() > max {
        return Err(TransportError::PayloadTooLarge {
            size: text.len(),
            max,
        });
    }
    Ok(text)
}

/// Drain `queue` into `sink` until the queue closes or a write fails.
///
/// A closed queue (dismissal, eviction or hub shutdown) gets a close frame
/// before the sink is shut down. A failed write dismisses the client so the
/// remaining members hear about it. With `heartbeat` set, a ping goes out at
/// that cadence; a failed ping counts as a write failure.
pub async fn write_loop<K: MessageSink>(
    id: ClientId,
    mut queue: OutboundQueue,
    mut sink: K,
    hub: HubHandle,
    heartbeat: Option<Duration>,
) {
    let mut ticker = heartbeat.map(|period| {
        let mut t = tokio::time::interval_at(Instant::now() + period, period);
        t.set_missed_tick_behavior(MissedTickBehavior::Skip);
        t
    });

    let mut failed = false;
    loop {
        tokio::select! {
            item = queue.next() => match item {
                Some(payload) => {
                    if let Err(e) = sink.send_text(payload).await {
                        warn!(client_id = %id, error = %e, "write failed");
                        failed = true;
                        break;
                    }
                }
                None => {
                    debug!(client_id = %id, "outbound queue closed");
                    if let Err(e) = sink.send_close().await {
                        debug!(client_id = %id, error = %e, "close frame not delivered");
                    }
                    break;
                }
            },
            _ = next_tick(&mut ticker) => {
                if let Err(e) = sink.send_ping().await {
                    warn!(client_id = %id, error = %e, "heartbeat failed");
                    failed = true;
                    break;
                }
            }
        }
    }

    // the reader may still be parked on a half-open socket; dismiss is idempotent
    if failed && hub.dismiss(id.clone()).await.is_err() {
        debug!(client_id = %id, "hub stopped before dismiss");
    }
    drop(queue);

    if let Err(e) = sink.close().await {
        debug!(client_id = %id, error = %e, "error while closing socket");
    }
    debug!(client_id = %id, "writer stopped");
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// ── Session send primitive ──
//
// Entities talk to the device through exactly one operation: send a
// message and wait until the device acknowledges it or the session
// gives up. The connection task that owns the socket sits behind the
// `Session` trait.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::error::Error;
use crate::message::Message;

const DEFAULT_QUEUE_CAPACITY: usize = 32;
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// The outbound half of a device session.
#[async_trait]
pub trait Session: Send + Sync {
    /// Send `message` and wait for the device's response.
    ///
    /// Returns the response on acknowledgement. Does not retry.
    async fn send_sync(&self, message: Message) -> Result<Message, Error>;
}

// ── SessionConfig ────────────────────────────────────────────────────

/// Tuning for [`ChannelSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long `send_sync` may take, queueing included. Default: 10s.
    pub send_timeout: Duration,

    /// Requests buffered ahead of the connection task. Default: 32.
    pub queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

// ── Outbound ─────────────────────────────────────────────────────────

/// A request queued for the connection task, with its responder.
#[derive(Debug)]
pub struct Outbound {
    pub message: Message,
    pub response_tx: oneshot::Sender<Result<Message, Error>>,
}

impl Outbound {
    /// Deliver the outcome of this request to the waiting caller.
    pub fn respond(self, result: Result<Message, Error>) {
        if self.response_tx.send(result).is_err() {
            tracing::debug!(
                resource = %self.message.resource,
                "Requester went away before the response arrived"
            );
        }
    }
}

// ── ChannelSession ───────────────────────────────────────────────────

/// [`Session`] backed by an `mpsc` queue drained by a connection task.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct ChannelSession {
    tx: mpsc::Sender<Outbound>,
    send_timeout: Duration,
}

impl ChannelSession {
    /// Create the session handle and the receiver the connection task reads.
    pub fn new(config: &SessionConfig) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let session = Self {
            tx,
            send_timeout: config.send_timeout,
        };
        (session, rx)
    }

    /// Returns `true` once the connection task has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl Session for ChannelSession {
    async fn send_sync(&self, message: Message) -> Result<Message, Error> {
        let resource = message.resource.clone();
        let (response_tx, response_rx) = oneshot::channel();

        // One deadline for queueing and for the response.
        let exchange = async {
            self.tx
                .send(Outbound {
                    message,
                    response_tx,
                })
                .await
                .map_err(|_| Error::SessionClosed)?;

            response_rx.await.map_err(|_| Error::Cancelled {
                resource: resource.clone(),
            })?
        };

        let response = match tokio::time::timeout(self.send_timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::Timeout {
                    resource,
                    timeout_ms: u64::try_from(self.send_timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
        };

        if let Some(code) = response.code {
            return Err(Error::Rejected { resource, code });
        }

        Ok(response)
    }
}

//! Outbound payload delivery.
//!
//! `ChannelBroadcaster` is the non-blocking side used on the simulation tick:
//! it only enqueues. A separate delivery task drains the queue and fans each
//! payload out to the per-player client channels held by `ClientConnections`.
//!
//! Clients receive JSON text frames. Each payload is encoded once no matter
//! how many recipients it has.

use dashmap::DashMap;
use parties_domain::{ClientPayload, PlayerId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::ports::{NetworkBroadcaster, Outbound};

/// Enqueues payloads for the delivery task.
pub struct ChannelBroadcaster {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ChannelBroadcaster {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NetworkBroadcaster for ChannelBroadcaster {
    fn broadcast(&self, recipients: Vec<PlayerId>, payload: ClientPayload) {
        if recipients.is_empty() {
            return;
        }
        if self.tx.send(Outbound::new(recipients, payload)).is_err() {
            tracing::warn!("Delivery task stopped; dropping outbound payload");
        }
    }
}

/// Per-player client channels.
///
/// The host's network layer registers a bounded sender when a player connects
/// and unregisters it on disconnect.
#[derive(Default)]
pub struct ClientConnections {
    senders: DashMap<PlayerId, mpsc::Sender<String>>,
}

impl ClientConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, player: PlayerId, sender: mpsc::Sender<String>) {
        self.senders.insert(player, sender);
        tracing::debug!(player_id = %player, "Client channel registered");
    }

    pub fn unregister(&self, player: PlayerId) {
        if self.senders.remove(&player).is_some() {
            tracing::debug!(player_id = %player, "Client channel unregistered");
        }
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Hand one payload to every connected recipient. Full or closed
    /// channels drop the payload for that player only.
    pub fn deliver(&self, outbound: Outbound) {
        let frame = match serde_json::to_string(&outbound.payload) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode payload");
                return;
            }
        };
        for player in &outbound.recipients {
            let Some(sender) = self.senders.get(player) else {
                continue;
            };
            if let Err(e) = sender.try_send(frame.clone()) {
                tracing::warn!(
                    player_id = %player,
                    error = %e,
                    "Failed to deliver payload"
                );
            }
        }
    }
}

/// Drain `rx` into `connections` until cancelled or every broadcaster is gone.
pub fn spawn_delivery(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    connections: std::sync::Arc<ClientConnections>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Delivery task cancelled");
                    break;
                }
                next = rx.recv() => {
                    let Some(outbound) = next else {
                        tracing::debug!("All broadcasters dropped; delivery task exiting");
                        break;
                    };
                    connections.deliver(outbound);
                }
            }
        }
    })
}

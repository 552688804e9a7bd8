//! The conversation sync engine
//!
//! One spawned task per open conversation. The task owns the
//! [`MessageStore`] and drives the poll loop; callers interact through a
//! cheap cloneable [`ConversationSync`] handle (commands in, snapshots and
//! events out).

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use warta_api::{ApiClient, ApiError};
use warta_core::{Message, NewMessageRequest, User};

use crate::config::SyncConfig;
use crate::store::{MessageStore, StoreSnapshot};

/// Capacity of the command and event channels
const CHANNEL_CAPACITY: usize = 32;

/// Errors surfaced by the sync engine
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The backend could not tell us who we are
    #[error("failed to resolve own identity: {0}")]
    Identity(#[source] ApiError),

    /// A message post was rejected
    #[error("failed to send message: {0}")]
    Send(#[source] ApiError),

    /// Empty or whitespace-only message text
    #[error("message text is empty")]
    EmptyMessage,

    /// The engine task has shut down
    #[error("sync engine is closed")]
    Closed,
}

/// Notifications emitted by the engine task.
///
/// Events are best-effort wake-ups, not a durable log: they are emitted
/// with `try_send` so a lagging consumer can never stall the poll loop, and
/// may be dropped when the channel is full. State always lives in the
/// snapshot ([`ConversationSync::snapshot`] / [`ConversationSync::subscribe`]);
/// a send failure is additionally returned from [`ConversationSync::send`]
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The rendered list changed; `revision` matches the new snapshot
    Refreshed { revision: u64 },
    /// A poll cycle failed; the last known-good list is still shown
    FetchFailed { error: String },
    /// A send failed after the backend accepted the conversation
    SendFailed { error: String },
}

enum Command {
    Send {
        text: String,
        reply: oneshot::Sender<Result<Message, SyncError>>,
    },
    Shutdown,
}

/// Handle to a running conversation sync task
#[derive(Debug, Clone)]
pub struct ConversationSync {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<StoreSnapshot>,
    local: User,
    peer: String,
}

impl ConversationSync {
    /// Open a conversation with `peer` and start polling.
    ///
    /// Resolves the local identity from the backend first, so the sender
    /// key is authoritative rather than whatever the caller had cached.
    /// The first fetch fires immediately, then every
    /// [`SyncConfig::poll_interval`].
    pub async fn spawn(
        client: ApiClient,
        peer: impl Into<String>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>), SyncError> {
        let peer = peer.into();
        let local = client.current_user().await.map_err(SyncError::Identity)?;

        let (commands, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (events_tx, events) = mpsc::channel(CHANNEL_CAPACITY);
        let (snapshot_tx, snapshots) = watch::channel(StoreSnapshot::default());

        tokio::spawn(sync_task(
            client,
            local.clone(),
            peer.clone(),
            config,
            command_rx,
            events_tx,
            snapshot_tx,
        ));

        tracing::info!(peer = %peer, user = %local.email, "conversation sync started");

        Ok((
            Self {
                commands,
                snapshots,
                local,
                peer,
            },
            events,
        ))
    }

    /// The identity the backend resolved for this session
    #[inline]
    #[must_use]
    pub fn local_user(&self) -> &User {
        &self.local
    }

    /// The conversation partner's key
    #[inline]
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Current rendered state
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot updates
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshots.clone()
    }

    /// Send a message to the peer.
    ///
    /// Posts to the backend first; on success an optimistic record appears
    /// in the snapshot immediately and is returned. Empty or whitespace-only
    /// text is rejected without a network round trip.
    pub async fn send(&self, text: impl Into<String>) -> Result<Message, SyncError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SyncError::EmptyMessage);
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Send {
                text,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SyncError::Closed)?;
        reply_rx.await.map_err(|_| SyncError::Closed)?
    }

    /// Stop the poll loop. Idempotent; pending sends resolve with
    /// [`SyncError::Closed`] once the task exits.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

/// The engine task: fetch on an interval, serve send commands in between.
///
/// Fetches are awaited inline, so at most one is in flight; ticks that
/// elapse while a fetch is still running are skipped rather than queued.
/// Event emission is `try_send` throughout (see [`SyncEvent`]): the loop
/// never blocks on a consumer.
async fn sync_task(
    client: ApiClient,
    local: User,
    peer: String,
    config: SyncConfig,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<SyncEvent>,
    snapshots: watch::Sender<StoreSnapshot>,
) {
    let mut store = MessageStore::new();
    let mut seq: u64 = 0;

    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                seq += 1;
                match client.list_messages(&local.email, &peer).await {
                    Ok(list) => {
                        if store.apply_fetch(seq, list) {
                            let snapshot = store.snapshot();
                            let revision = snapshot.revision;
                            let _ = snapshots.send(snapshot);
                            let _ = events.try_send(SyncEvent::Refreshed { revision });
                        }
                    }
                    Err(error) => {
                        tracing::warn!(peer = %peer, %error, "fetch failed, keeping last known good list");
                        let _ = events.try_send(SyncEvent::FetchFailed {
                            error: error.to_string(),
                        });
                    }
                }
            }

            command = commands.recv() => {
                match command {
                    Some(Command::Send { text, reply }) => {
                        let request = NewMessageRequest {
                            sender: local.email.clone(),
                            to: peer.clone(),
                            message: text,
                        };
                        match client.post_message(&request).await {
                            Ok(()) => {
                                let message = store.append_optimistic(&request);
                                let _ = snapshots.send(store.snapshot());
                                let _ = reply.send(Ok(message));
                            }
                            Err(error) => {
                                tracing::warn!(peer = %peer, %error, "message post rejected");
                                let _ = events.try_send(SyncEvent::SendFailed {
                                    error: error.to_string(),
                                });
                                let _ = reply.send(Err(SyncError::Send(error)));
                            }
                        }
                    }
                    Some(Command::Shutdown) | None => break,
                }
            }
        }
    }

    tracing::debug!(peer = %peer, "conversation sync stopped");
}

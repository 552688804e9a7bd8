//! The message store
//!
//! Owned by a single conversation task: the last known-good authoritative
//! list plus the optimistic suffix of messages sent locally but not yet
//! confirmed by a fetch. The merge policy is the source's whole-list
//! serialized-equality check, with two corrections layered on top:
//!
//! - A fetch replaces state only when it *succeeds*; callers simply do not
//!   call [`MessageStore::apply_fetch`] on error, so the view never
//!   regresses to empty on a transient failure.
//! - Every applied fetch carries a poll sequence number; a result for a
//!   superseded sequence is discarded, so a stale response can never
//!   overwrite a newer one.

use std::collections::HashMap;

use warta_core::{now_timestamp, ClientMsgId, Message, NewMessageRequest};

/// What the view renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Authoritative list followed by unreconciled optimistic records
    pub messages: Vec<Message>,
    /// Bumped only when the rendered list actually changed; the view's
    /// auto-scroll trigger
    pub revision: u64,
}

impl StoreSnapshot {
    /// Whether there is anything to render ("No messages yet")
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// In-memory message list for one conversation
#[derive(Debug)]
pub struct MessageStore {
    authoritative: Vec<Message>,
    /// Serialized form of `authoritative`, cached for the equality check
    serialized: String,
    /// Optimistic records awaiting authoritative confirmation; their ids are
    /// [`ClientMsgId`] placeholders
    pending: Vec<Message>,
    revision: u64,
    last_seq: u64,
}

impl MessageStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            authoritative: Vec::new(),
            serialized: "[]".to_string(),
            pending: Vec::new(),
            revision: 0,
            last_seq: 0,
        }
    }

    /// Apply a successful fetch result.
    ///
    /// Sorts ascending by `created_at` (stable), reconciles the optimistic
    /// suffix, and replaces the authoritative list only when its serialized
    /// form differs from the current one. Returns whether the rendered list
    /// changed (and the revision was bumped).
    ///
    /// `seq` is the poll sequence the fetch was issued under; results for a
    /// sequence at or below the last applied one are discarded.
    pub fn apply_fetch(&mut self, seq: u64, mut list: Vec<Message>) -> bool {
        if seq <= self.last_seq {
            tracing::debug!(seq, last_seq = self.last_seq, "discarding stale fetch result");
            return false;
        }
        self.last_seq = seq;

        Message::sort_chronological(&mut list);
        let serialized = serde_json::to_string(&list).unwrap_or_default();
        if serialized == self.serialized {
            return false;
        }

        // Drop optimistic records the server now echoes back. Matching is
        // count-aware: one authoritative record confirms at most one pending
        // record, so duplicate sends of the same text each need their own
        // echo before they stop rendering as pending.
        let mut echoes: HashMap<(String, String, String), usize> = HashMap::new();
        for m in &list {
            *echoes
                .entry((m.sender.clone(), m.to.clone(), m.message.clone()))
                .or_default() += 1;
        }
        self.pending.retain(|p| {
            match echoes.get_mut(&(p.sender.clone(), p.to.clone(), p.message.clone())) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    false
                }
                _ => true,
            }
        });

        self.authoritative = list;
        self.serialized = serialized;
        self.revision += 1;
        true
    }

    /// Append an optimistic record for a message the backend just accepted.
    ///
    /// The record carries a fresh [`ClientMsgId`] as its placeholder id and
    /// the local clock as `created_at`; it renders after the authoritative
    /// list until a refresh reconciles it.
    pub fn append_optimistic(&mut self, request: &NewMessageRequest) -> Message {
        let message = Message {
            id: ClientMsgId::new().to_string(),
            sender: request.sender.clone(),
            to: request.to.clone(),
            message: request.message.clone(),
            created_at: now_timestamp(),
        };
        self.pending.push(message.clone());
        self.revision += 1;
        message
    }

    /// Current rendered state
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut messages = self.authoritative.clone();
        messages.extend(self.pending.iter().cloned());
        StoreSnapshot {
            messages,
            revision: self.revision,
        }
    }

    /// Current revision
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of optimistic records not yet confirmed
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn message(id: &str, body: &str, created_at: &str) -> Message {
        Message {
            id: id.to_string(),
            sender: "a@x.com".to_string(),
            to: "b@x.com".to_string(),
            message: body.to_string(),
            created_at: created_at.to_string(),
        }
    }

    fn request(body: &str) -> NewMessageRequest {
        NewMessageRequest {
            sender: "a@x.com".to_string(),
            to: "b@x.com".to_string(),
            message: body.to_string(),
        }
    }

    #[test]
    fn apply_fetch_sorts_and_bumps_revision() {
        let mut store = MessageStore::new();
        let changed = store.apply_fetch(
            1,
            vec![
                message("2", "later", "2025-01-02T00:00:00.000Z"),
                message("1", "earlier", "2025-01-01T00:00:00.000Z"),
            ],
        );
        assert!(changed);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.messages[0].id, "1");
        assert_eq!(snapshot.messages[1].id, "2");
    }

    #[test]
    fn identical_fetch_does_not_bump_revision() {
        let mut store = MessageStore::new();
        let list = vec![message("1", "hi", "2025-01-01T00:00:00.000Z")];

        assert!(store.apply_fetch(1, list.clone()));
        assert!(!store.apply_fetch(2, list));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn empty_fetch_on_empty_store_changes_nothing() {
        let mut store = MessageStore::new();
        assert!(!store.apply_fetch(1, Vec::new()));
        assert_eq!(store.revision(), 0);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn stale_sequence_is_discarded() {
        let mut store = MessageStore::new();
        assert!(store.apply_fetch(2, vec![message("1", "new", "2025-01-02T00:00:00.000Z")]));

        // A slower fetch issued earlier resolves late: ignored
        let changed = store.apply_fetch(1, vec![message("0", "old", "2025-01-01T00:00:00.000Z")]);
        assert!(!changed);
        assert_eq!(store.snapshot().messages[0].id, "1");

        // Same sequence applied twice: also ignored
        assert!(!store.apply_fetch(2, Vec::new()));
    }

    #[test]
    fn optimistic_record_renders_after_authoritative_list() {
        let mut store = MessageStore::new();
        store.apply_fetch(1, vec![message("1", "hi", "2025-01-01T00:00:00.000Z")]);

        let optimistic = store.append_optimistic(&request("hello"));
        assert_eq!(optimistic.message, "hello");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].message, "hello");
        assert_eq!(store.pending_len(), 1);
    }

    #[test]
    fn refresh_reconciles_optimistic_record() {
        let mut store = MessageStore::new();
        store.append_optimistic(&request("hello"));

        // The next authoritative fetch echoes the message back
        let changed = store.apply_fetch(1, vec![message("7", "hello", "2025-01-01T00:00:00.000Z")]);
        assert!(changed);
        assert_eq!(store.pending_len(), 0);

        // Exactly one copy survives, with the server id
        let snapshot = store.snapshot();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].id, "7");
    }

    #[test]
    fn duplicate_sends_reconcile_one_echo_at_a_time() {
        let mut store = MessageStore::new();
        store.append_optimistic(&request("ok"));
        store.append_optimistic(&request("ok"));

        // The server has persisted only the first send so far; the second
        // must keep rendering as pending
        store.apply_fetch(1, vec![message("7", "ok", "2025-01-01T00:00:00.000Z")]);
        assert_eq!(store.pending_len(), 1);
        assert_eq!(store.snapshot().messages.len(), 2);

        // Both echoed: nothing pending, both render authoritatively
        store.apply_fetch(
            2,
            vec![
                message("7", "ok", "2025-01-01T00:00:00.000Z"),
                message("8", "ok", "2025-01-01T00:00:01.000Z"),
            ],
        );
        assert_eq!(store.pending_len(), 0);
        assert_eq!(store.snapshot().messages.len(), 2);
    }

    #[test]
    fn unconfirmed_optimistic_record_survives_refreshes() {
        let mut store = MessageStore::new();
        store.append_optimistic(&request("hello"));

        // Server write is slow: fetches keep missing the message
        store.apply_fetch(1, vec![message("1", "other", "2025-01-01T00:00:00.000Z")]);
        store.apply_fetch(2, vec![message("1", "other", "2025-01-01T00:00:00.000Z")]);

        let snapshot = store.snapshot();
        assert_eq!(store.pending_len(), 1);
        assert_eq!(snapshot.messages.last().unwrap().message, "hello");
    }

    proptest! {
        #[test]
        fn applied_fetch_is_always_sorted(seconds in proptest::collection::vec(0u32..86_400, 0..40)) {
            let list: Vec<Message> = seconds
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let created_at = format!(
                        "2025-01-01T{:02}:{:02}:{:02}.000Z",
                        s / 3600,
                        (s % 3600) / 60,
                        s % 60
                    );
                    message(&i.to_string(), "body", &created_at)
                })
                .collect();

            let mut store = MessageStore::new();
            store.apply_fetch(1, list);

            let snapshot = store.snapshot();
            prop_assert!(snapshot
                .messages
                .windows(2)
                .all(|w| w[0].created_at <= w[1].created_at));
        }
    }
}

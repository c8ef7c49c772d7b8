//! Single-use reply channels for host-initiated questions.
//!
//! The host allocates one or two fresh channel names, pushes them to a
//! window, and waits. The first `reply` on either name settles the call and
//! tears down both names. A slot also dies on timeout, or when its owning
//! window is disposed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kiln_common::{new_id, CorrelationIds, WindowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

/// Channel names a window answers on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyChannels {
    pub confirm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Confirm,
    Cancel,
    /// No reply arrived within the timeout.
    TimedOut,
    /// The slot was disposed with its owner before anyone answered.
    Dropped,
}

impl ReplyOutcome {
    /// Only an explicit confirmation counts; everything else vetoes.
    pub fn is_confirmed(self) -> bool {
        self == ReplyOutcome::Confirm
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Confirm,
    Cancel,
}

struct Slot {
    owner: WindowId,
    names: Vec<String>,
    sender: oneshot::Sender<ReplyOutcome>,
}

#[derive(Default)]
struct Inner {
    slots: HashMap<u64, Slot>,
    by_name: HashMap<String, (u64, Role)>,
}

impl Inner {
    fn remove(&mut self, id: u64) -> Option<Slot> {
        let slot = self.slots.remove(&id)?;
        for name in &slot.names {
            self.by_name.remove(name);
        }
        Some(slot)
    }
}

/// Table of outstanding reply slots. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct PendingReplies {
    inner: Arc<Mutex<Inner>>,
    ids: Arc<CorrelationIds>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a slot owned by `owner`.
    ///
    /// With `two_channels` the window gets separate confirm and cancel
    /// names; otherwise it answers on `confirm` with a boolean.
    pub fn open(&self, owner: WindowId, two_channels: bool) -> (ReplyChannels, PendingReply) {
        let id = self.ids.next();
        // Names are unguessable so one window cannot answer for another.
        let nonce = new_id();
        let confirm = format!("reply-{nonce}-confirm");
        let cancel = two_channels.then(|| format!("reply-{nonce}-cancel"));
        let (sender, receiver) = oneshot::channel();

        if let Ok(mut inner) = self.inner.lock() {
            let mut names = vec![confirm.clone()];
            inner.by_name.insert(confirm.clone(), (id, Role::Confirm));
            if let Some(cancel) = &cancel {
                inner.by_name.insert(cancel.clone(), (id, Role::Cancel));
                names.push(cancel.clone());
            }
            inner.slots.insert(id, Slot { owner, names, sender });
        }

        tracing::debug!(id, window_id = %owner, two_channels, "reply slot opened");

        (
            ReplyChannels { confirm, cancel },
            PendingReply {
                id,
                receiver,
                replies: self.clone(),
            },
        )
    }

    /// Settle the slot listening on `channel`. Returns `false` when no slot
    /// owns that name (already settled, timed out, or never allocated).
    ///
    /// On a confirm channel, a literal `false` reads as a cancel so
    /// single-channel questions can still be declined.
    pub fn resolve(&self, channel: &str, value: &Value) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        let Some(&(id, role)) = inner.by_name.get(channel) else {
            tracing::debug!(channel, "reply on unknown channel ignored");
            return false;
        };
        let Some(slot) = inner.remove(id) else {
            return false;
        };
        drop(inner);

        let outcome = match role {
            Role::Cancel => ReplyOutcome::Cancel,
            Role::Confirm if value == &Value::Bool(false) => ReplyOutcome::Cancel,
            Role::Confirm => ReplyOutcome::Confirm,
        };
        // The waiter may already have given up; that is fine.
        let _ = slot.sender.send(outcome);
        true
    }

    /// Drop every slot owned by a window that is going away.
    pub fn dispose_owner(&self, owner: WindowId) -> usize {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        let ids: Vec<u64> = inner
            .slots
            .iter()
            .filter(|(_, slot)| slot.owner == owner)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            inner.remove(*id);
        }
        ids.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn forget(&self, id: u64) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.remove(id);
        }
    }
}

/// The waiting half of a reply slot.
pub struct PendingReply {
    id: u64,
    receiver: oneshot::Receiver<ReplyOutcome>,
    replies: PendingReplies,
}

impl PendingReply {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the answer, giving up after `timeout`.
    pub async fn wait(self, timeout: Duration) -> ReplyOutcome {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => ReplyOutcome::Dropped,
            Err(_) => {
                self.replies.forget(self.id);
                tracing::warn!(id = self.id, timeout_ms = timeout.as_millis() as u64, "reply slot timed out");
                ReplyOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WAIT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn confirm_channel_resolves() {
        let replies = PendingReplies::new();
        let (channels, pending) = replies.open(WindowId(1), true);

        assert!(replies.resolve(&channels.confirm, &Value::Null));
        assert_eq!(pending.wait(WAIT).await, ReplyOutcome::Confirm);
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn first_reply_wins_and_tears_down_both_names() {
        let replies = PendingReplies::new();
        let (channels, pending) = replies.open(WindowId(1), true);
        let cancel = channels.cancel.clone().unwrap();

        assert!(replies.resolve(&cancel, &Value::Null));
        assert!(!replies.resolve(&channels.confirm, &Value::Null));
        assert_eq!(pending.wait(WAIT).await, ReplyOutcome::Cancel);
    }

    #[tokio::test]
    async fn single_channel_false_means_cancel() {
        let replies = PendingReplies::new();
        let (channels, pending) = replies.open(WindowId(2), false);
        assert!(channels.cancel.is_none());

        replies.resolve(&channels.confirm, &json!(false));
        assert_eq!(pending.wait(WAIT).await, ReplyOutcome::Cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_removes_slot() {
        let replies = PendingReplies::new();
        let (channels, pending) = replies.open(WindowId(1), true);

        let outcome = pending.wait(Duration::from_millis(500)).await;
        assert_eq!(outcome, ReplyOutcome::TimedOut);
        assert!(!outcome.is_confirmed());
        assert!(replies.is_empty());
        assert!(!replies.resolve(&channels.confirm, &Value::Null));
    }

    #[tokio::test]
    async fn disposing_owner_drops_only_its_slots() {
        let replies = PendingReplies::new();
        let (_, mine) = replies.open(WindowId(1), true);
        let (theirs_channels, theirs) = replies.open(WindowId(2), false);

        assert_eq!(replies.dispose_owner(WindowId(1)), 1);
        assert_eq!(mine.wait(WAIT).await, ReplyOutcome::Dropped);

        assert_eq!(replies.len(), 1);
        replies.resolve(&theirs_channels.confirm, &json!(true));
        assert_eq!(theirs.wait(WAIT).await, ReplyOutcome::Confirm);
    }

    #[test]
    fn channel_names_are_never_reused() {
        let replies = PendingReplies::new();
        let (a, _a) = replies.open(WindowId(1), false);
        let (b, _b) = replies.open(WindowId(1), false);
        assert_ne!(a.confirm, b.confirm);
    }
}

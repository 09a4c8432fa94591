// Notification bus - fire-and-forget state-change announcements
//
// Every committed mutation publishes one Notification for external
// subscribers (audit logs, indexers). Publishing never blocks and never
// fails the operation that raised it.

use crate::identity::Did;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel before lagging subscribers
/// start dropping notifications
const DEFAULT_CAPACITY: usize = 256;

/// A state change committed by the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A new event was recorded
    EventRecorded {
        id: u64,
        owner: Did,
        event_type: String,
        at: DateTime<Utc>,
    },
    /// An event was attested to by a verifier
    EventVerified {
        id: u64,
        verifier: Did,
        at: DateTime<Utc>,
    },
    /// The admin enrolled a new verifier
    VerifierAdded { identity: Did, at: DateTime<Utc> },
    /// The admin removed a verifier
    VerifierRemoved { identity: Did, at: DateTime<Utc> },
}

/// Broadcast channel for ledger notifications
///
/// Subscribers attach at any time and see notifications committed after
/// they subscribed. Sending with no subscribers is a no-op.
#[derive(Clone, Debug)]
pub struct NotificationBus {
    tx: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a bus with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with an explicit capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Attach a new subscriber
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Publish a notification. Fire-and-forget: a send with no live
    /// receivers is not an error.
    pub fn publish(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }

    /// Number of currently attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

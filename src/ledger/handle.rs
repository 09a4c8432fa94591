// Ledger handle - the thread-safe front door to the state machine
//
// One mutex serializes every operation, reads included, so the id counter,
// owner index, and verifier set are never corrupted by interleaved writes
// and no caller ever observes a half-written event. Notifications are
// published after the mutation commits and the lock is released.

use crate::identity::Did;
use crate::ledger::event::Event;
use crate::ledger::notify::{Notification, NotificationBus};
use crate::ledger::state::{LedgerError, LedgerState, LedgerStats};
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

/// Shared, lock-guarded ledger
pub struct Ledger {
    state: Mutex<LedgerState>,
    bus: NotificationBus,
}

impl Ledger {
    /// Create a fresh ledger administered by `admin`
    pub fn new(admin: Did) -> Self {
        Self::from_state(LedgerState::new(admin))
    }

    /// Wrap an existing state, e.g. one loaded from storage
    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
            bus: NotificationBus::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // A poisoned lock cannot hold a torn write: every mutation either
        // fully commits or leaves the state untouched.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Attach a notification subscriber
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.bus.subscribe()
    }

    /// Record a new event owned by `caller`; returns the assigned id
    pub fn record_event(
        &self,
        caller: &Did,
        event_type: &str,
        description: &str,
        document_ref: &str,
    ) -> Result<u64, LedgerError> {
        let (id, at) = {
            let mut state = self.lock();
            let id = state.record_event(caller, event_type, description, document_ref)?;
            let at = state
                .event(id)
                .map(Event::created_at)
                .unwrap_or_else(|_| Utc::now());
            (id, at)
        };

        self.bus.publish(Notification::EventRecorded {
            id,
            owner: caller.clone(),
            event_type: event_type.to_string(),
            at,
        });
        Ok(id)
    }

    /// Attest to an existing event as `caller`
    pub fn verify_event(&self, caller: &Did, id: u64) -> Result<(), LedgerError> {
        self.lock().verify_event(caller, id)?;

        self.bus.publish(Notification::EventVerified {
            id,
            verifier: caller.clone(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Event ids recorded by `identity`, in creation order
    pub fn timeline(&self, identity: &Did) -> Vec<u64> {
        self.lock().timeline(identity)
    }

    /// Full event data for one id
    pub fn event(&self, id: u64) -> Result<Event, LedgerError> {
        self.lock().event(id).cloned()
    }

    /// Enroll a new verifier. Admin only.
    pub fn add_verifier(&self, caller: &Did, identity: &Did) -> Result<(), LedgerError> {
        self.lock().add_verifier(caller, identity)?;

        self.bus.publish(Notification::VerifierAdded {
            identity: identity.clone(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Strip an identity of the verifier role. Admin only.
    pub fn remove_verifier(&self, caller: &Did, identity: &Did) -> Result<(), LedgerError> {
        self.lock().remove_verifier(caller, identity)?;

        self.bus.publish(Notification::VerifierRemoved {
            identity: identity.clone(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Number of events ever recorded
    pub fn total_events(&self) -> u64 {
        self.lock().total_events()
    }

    /// Check whether an identity may verify events
    pub fn is_verifier(&self, identity: &Did) -> bool {
        self.lock().is_verifier(identity)
    }

    /// The admin identity
    pub fn admin(&self) -> Did {
        self.lock().admin().clone()
    }

    /// Aggregate counts over the ledger
    pub fn stats(&self) -> LedgerStats {
        self.lock().stats()
    }

    /// All current verifiers, admin included
    pub fn verifiers(&self) -> Vec<Did> {
        self.lock().verifiers().cloned().collect()
    }

    /// Clone the current state, e.g. for persistence
    pub fn snapshot(&self) -> LedgerState {
        self.lock().clone()
    }
}

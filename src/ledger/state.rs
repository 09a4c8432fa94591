// Ledger state - the record-and-verify state machine
//
// Owns everything: the event table, per-owner timelines, the verifier set,
// and the admin identity. Every precondition is checked before any field is
// touched, so a failed call leaves the state exactly as it was.

use crate::identity::{Did, DidError};
use crate::ledger::event::Event;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::info;

/// Errors surfaced by ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Event {0} does not exist")]
    NotFound(u64),

    #[error("Caller lacks the required role")]
    Unauthorized,

    #[error("Event {0} is already verified")]
    AlreadyVerified(u64),

    #[error("An owner cannot verify their own event")]
    SelfVerificationForbidden,

    #[error("Identity is already a verifier")]
    AlreadyVerifier,

    #[error("Identity is not a verifier")]
    NotAVerifier,

    #[error("The admin cannot be removed from the verifier set")]
    CannotRemoveAdmin,
}

impl From<DidError> for LedgerError {
    fn from(err: DidError) -> Self {
        LedgerError::InvalidInput(err.to_string())
    }
}

/// Aggregate counts over the ledger
#[derive(Clone, Debug)]
pub struct LedgerStats {
    pub total_events: u64,
    pub verified_events: u64,
    pub unique_owners: usize,
    pub verifier_count: usize,
}

/// The append-only event ledger
///
/// Ids are assigned monotonically starting at 1; id 0 is reserved as
/// "does not exist". Events are never removed and, once verified, never
/// change again. The admin is enrolled as a verifier at construction and
/// can never be removed from the set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerState {
    /// Next id to assign; advances only on successful commit
    next_id: u64,
    /// All events ever recorded, keyed by id
    events: BTreeMap<u64, Event>,
    /// Index: owner DID -> event ids in creation order
    #[serde(skip)]
    owner_index: HashMap<Did, Vec<u64>>,
    /// Identities authorized to verify events
    verifiers: HashSet<Did>,
    /// The identity that created the ledger; permanently a verifier
    admin: Did,
}

impl LedgerState {
    /// Create a fresh ledger administered by `admin`
    pub fn new(admin: Did) -> Self {
        let mut verifiers = HashSet::new();
        verifiers.insert(admin.clone());

        Self {
            next_id: 1,
            events: BTreeMap::new(),
            owner_index: HashMap::new(),
            verifiers,
            admin,
        }
    }

    /// Get the admin identity
    pub fn admin(&self) -> &Did {
        &self.admin
    }

    /// Number of events ever recorded
    pub fn total_events(&self) -> u64 {
        self.next_id - 1
    }

    /// Check whether an identity may verify events
    pub fn is_verifier(&self, identity: &Did) -> bool {
        self.verifiers.contains(identity)
    }

    /// Record a new event owned by `caller`
    ///
    /// Self-service: any identity may record events for itself, no role
    /// required. Returns the freshly assigned id. The id counter does not
    /// advance on a failed call.
    pub fn record_event(
        &mut self,
        caller: &Did,
        event_type: &str,
        description: &str,
        document_ref: &str,
    ) -> Result<u64, LedgerError> {
        if event_type.is_empty() {
            return Err(LedgerError::InvalidInput(
                "event type cannot be empty".into(),
            ));
        }
        if description.is_empty() {
            return Err(LedgerError::InvalidInput(
                "description cannot be empty".into(),
            ));
        }

        let id = self.next_id;
        let event = Event::new(
            id,
            caller.clone(),
            event_type.to_string(),
            description.to_string(),
            document_ref.to_string(),
            Utc::now(),
        );

        self.events.insert(id, event);
        self.owner_index
            .entry(caller.clone())
            .or_insert_with(Vec::new)
            .push(id);
        self.next_id += 1;

        info!(id, owner = %caller, event_type, "event recorded");
        Ok(id)
    }

    /// Attest to an existing event
    ///
    /// Guard order: role, existence, verified-state, ownership. A caller
    /// without the verifier role learns nothing about whether the id exists.
    pub fn verify_event(&mut self, caller: &Did, id: u64) -> Result<(), LedgerError> {
        if !self.verifiers.contains(caller) {
            return Err(LedgerError::Unauthorized);
        }

        let event = self.events.get_mut(&id).ok_or(LedgerError::NotFound(id))?;

        if event.verified() {
            return Err(LedgerError::AlreadyVerified(id));
        }
        if event.owner() == caller {
            return Err(LedgerError::SelfVerificationForbidden);
        }

        event.mark_verified(caller.clone());
        info!(id, verifier = %caller, "event verified");
        Ok(())
    }

    /// Event ids recorded by `identity`, in creation order
    ///
    /// An identity that has never recorded anything gets an empty timeline.
    pub fn timeline(&self, identity: &Did) -> Vec<u64> {
        self.owner_index
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }

    /// Look up a single event by id
    pub fn event(&self, id: u64) -> Result<&Event, LedgerError> {
        self.events.get(&id).ok_or(LedgerError::NotFound(id))
    }

    /// Enroll a new verifier. Admin only.
    pub fn add_verifier(&mut self, caller: &Did, identity: &Did) -> Result<(), LedgerError> {
        if caller != &self.admin {
            return Err(LedgerError::Unauthorized);
        }
        if self.verifiers.contains(identity) {
            return Err(LedgerError::AlreadyVerifier);
        }

        self.verifiers.insert(identity.clone());
        info!(identity = %identity, "verifier added");
        Ok(())
    }

    /// Strip an identity of the verifier role. Admin only; the admin
    /// itself can never be removed.
    pub fn remove_verifier(&mut self, caller: &Did, identity: &Did) -> Result<(), LedgerError> {
        if caller != &self.admin {
            return Err(LedgerError::Unauthorized);
        }
        if identity == &self.admin {
            return Err(LedgerError::CannotRemoveAdmin);
        }
        if !self.verifiers.contains(identity) {
            return Err(LedgerError::NotAVerifier);
        }

        self.verifiers.remove(identity);
        info!(identity = %identity, "verifier removed");
        Ok(())
    }

    /// All current verifiers, admin included
    pub fn verifiers(&self) -> impl Iterator<Item = &Did> {
        self.verifiers.iter()
    }

    /// Aggregate counts over the ledger
    pub fn stats(&self) -> LedgerStats {
        let verified_events = self.events.values().filter(|e| e.verified()).count() as u64;

        LedgerStats {
            total_events: self.total_events(),
            verified_events,
            unique_owners: self.owner_index.len(),
            verifier_count: self.verifiers.len(),
        }
    }

    /// Serialize to bytes for persistence
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Deserialize from bytes, rebuilding the owner index
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        let mut state: LedgerState = postcard::from_bytes(bytes)?;
        state.rebuild_owner_index();
        Ok(state)
    }

    /// Rebuild the per-owner index from the event table (after
    /// deserialization). Iterating the table in id order reproduces
    /// creation order, since ids are assigned monotonically.
    fn rebuild_owner_index(&mut self) {
        self.owner_index.clear();
        for (id, event) in &self.events {
            self.owner_index
                .entry(event.owner().clone())
                .or_insert_with(Vec::new)
                .push(*id);
        }
    }
}

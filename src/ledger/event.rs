use crate::identity::Did;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded life event - immutable after creation except for the
/// one-shot verification flip
///
/// Fields are private and only readable through getters: an `Event` is
/// constructed exactly once by the ledger, and the sole permitted mutation
/// afterwards is `mark_verified`, which flips `verified` and sets
/// `verifier` in a single step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: u64,
    owner: Did,
    event_type: String,
    description: String,
    created_at: DateTime<Utc>,
    verified: bool,
    verifier: Option<Did>,
    document_ref: String,
}

impl Event {
    /// Construct a fresh, unverified event. Ledger-internal: id assignment
    /// and input validation happen in the state machine.
    pub(crate) fn new(
        id: u64,
        owner: Did,
        event_type: String,
        description: String,
        document_ref: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            event_type,
            description,
            created_at,
            verified: false,
            verifier: None,
            document_ref,
        }
    }

    /// Flip the event to verified. Must only be called once, on an
    /// unverified event; the state machine checks that before calling.
    pub(crate) fn mark_verified(&mut self, verifier: Did) {
        self.verified = true;
        self.verifier = Some(verifier);
    }

    /// Get the event id (positive, assigned in creation order)
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the identity that recorded the event
    pub fn owner(&self) -> &Did {
        &self.owner
    }

    /// Get the event classification (e.g. "birth", "marriage")
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Get the free-text description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether a verifier has attested to this event
    pub fn verified(&self) -> bool {
        self.verified
    }

    /// The attesting verifier, if any
    pub fn verifier(&self) -> Option<&Did> {
        self.verifier.as_ref()
    }

    /// Opaque reference to an external supporting document (may be empty)
    pub fn document_ref(&self) -> &str {
        &self.document_ref
    }
}

// lifeledger - append-only life-event ledger with verifier attestation
//
// Any identity may record timestamped life events for itself; a restricted
// set of verifiers may attest to events they do not own. Events are
// immutable once recorded, except for the one-shot verification flip.

pub mod identity;
pub mod ledger;
pub mod storage;

pub use identity::{Did, DidError, Keypair, KeypairError, PublicKey};
pub use ledger::{Event, Ledger, LedgerError, LedgerState, LedgerStats, Notification};
pub use storage::{LedgerStore, StoreError};

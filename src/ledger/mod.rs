// Ledger module - THE RECORD OF EVENTS
// Append-only event table, per-owner timelines, and verifier attestation

mod event;
mod handle;
mod notify;
mod state;

pub use event::Event;
pub use handle::Ledger;
pub use notify::{Notification, NotificationBus};
pub use state::{LedgerError, LedgerState, LedgerStats};

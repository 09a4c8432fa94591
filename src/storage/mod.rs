// Storage module - sled-backed persistence for ledger state and identity

mod store;

pub use store::{LedgerStore, StoreError};

// LedgerStore - Persistent storage using sled
//
// Provides typed access for storing:
// - The ledger state (events, verifier set, id counter)
// - The local actor's keypair

use crate::identity::Keypair;
use crate::ledger::LedgerState;
use std::path::Path;
use thiserror::Error;

/// Key prefixes for organizing data
mod keys {
    pub const LEDGER_STATE: &[u8] = b"ledger:state";
    pub const IDENTITY_KEYPAIR: &[u8] = b"identity:keypair";
    pub const IDENTITY_KEYPAIR_PREFIX: &[u8] = b"identity:keypair:";
}

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Persistent store for ledger data
///
/// Uses sled for crash-safe, embedded storage. The whole ledger state is
/// saved as one value, so id monotonicity and the verifier set survive
/// restarts together.
pub struct LedgerStore {
    db: sled::Db,
}

impl LedgerStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db })
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.db.is_empty())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    /// Put raw bytes
    pub fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    /// Get raw bytes
    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    // ========================================================================
    // LEDGER STATE PERSISTENCE
    // ========================================================================

    /// Save the ledger state
    pub fn save_state(&self, state: &LedgerState) -> Result<(), StoreError> {
        let bytes = state
            .to_bytes()
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.put_raw(keys::LEDGER_STATE, &bytes)
    }

    /// Load the ledger state
    pub fn load_state(&self) -> Result<Option<LedgerState>, StoreError> {
        match self.get_raw(keys::LEDGER_STATE)? {
            Some(bytes) => {
                let state = LedgerState::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // IDENTITY PERSISTENCE
    // ========================================================================

    /// Save the primary keypair
    pub fn save_keypair(&self, keypair: &Keypair) -> Result<(), StoreError> {
        let bytes = keypair.to_bytes();
        self.put_raw(keys::IDENTITY_KEYPAIR, &bytes)
    }

    /// Load the primary keypair
    pub fn load_keypair(&self) -> Result<Option<Keypair>, StoreError> {
        match self.get_raw(keys::IDENTITY_KEYPAIR)? {
            Some(bytes) => {
                let keypair = Keypair::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(keypair))
            }
            None => Ok(None),
        }
    }

    /// Save a keypair with a label
    pub fn save_keypair_with_label(&self, keypair: &Keypair, label: &str) -> Result<(), StoreError> {
        let key = [keys::IDENTITY_KEYPAIR_PREFIX, label.as_bytes()].concat();
        self.put_raw(&key, &keypair.to_bytes())
    }

    /// Load a keypair by label
    pub fn load_keypair_with_label(&self, label: &str) -> Result<Option<Keypair>, StoreError> {
        let key = [keys::IDENTITY_KEYPAIR_PREFIX, label.as_bytes()].concat();
        match self.get_raw(&key)? {
            Some(bytes) => {
                let keypair = Keypair::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(keypair))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Did, Keypair};
    use tempfile::TempDir;

    fn test_did() -> Did {
        Did::from_public_key(&Keypair::generate().public_key())
    }

    #[test]
    fn test_store_basic() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::open(temp_dir.path()).unwrap();
        assert!(store.is_empty().unwrap());

        store.put_raw(b"test", b"value").unwrap();
        let result = store.get_raw(b"test").unwrap();

        assert_eq!(result, Some(b"value".to_vec()));
    }

    #[test]
    fn test_state_persistence_roundtrip() {
        let temp_dir = TempDir::new().unwrap();

        let admin = test_did();
        let owner = test_did();

        {
            let store = LedgerStore::open(temp_dir.path()).unwrap();
            let mut state = LedgerState::new(admin.clone());
            state.record_event(&owner, "birth", "desc", "").unwrap();
            store.save_state(&state).unwrap();
            store.flush().unwrap();
        }

        {
            let store = LedgerStore::open(temp_dir.path()).unwrap();
            let state = store.load_state().unwrap().unwrap();
            assert_eq!(state.admin(), &admin);
            assert_eq!(state.total_events(), 1);
            assert_eq!(state.timeline(&owner), vec![1]);
        }
    }

    #[test]
    fn test_missing_state_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::open(temp_dir.path()).unwrap();
        assert!(store.load_state().unwrap().is_none());
    }

    #[test]
    fn test_keypair_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::open(temp_dir.path()).unwrap();

        let kp = Keypair::generate();
        store.save_keypair(&kp).unwrap();

        let loaded = store.load_keypair().unwrap().unwrap();
        assert_eq!(kp.public_key(), loaded.public_key());

        let labeled = Keypair::generate();
        store.save_keypair_with_label(&labeled, "verifier").unwrap();
        let loaded = store.load_keypair_with_label("verifier").unwrap().unwrap();
        assert_eq!(labeled.public_key(), loaded.public_key());
        assert!(store.load_keypair_with_label("missing").unwrap().is_none());
    }
}

use crate::identity::{KeypairError, PublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

const DID_PREFIX: &str = "did:life:";

#[derive(Error, Debug)]
pub enum DidError {
    #[error("Invalid DID format: {0}")]
    InvalidFormat(String),

    #[error("Invalid DID method: expected 'life', got '{0}'")]
    InvalidMethod(String),

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(#[from] KeypairError),
}

/// Ledger identity in the format: did:life:<base58_public_key>
///
/// Every caller of the ledger - event owners, verifiers, the admin - is
/// one of these. Equality and hashing go through the base58 key part, so
/// a DID is stable and comparable for the whole process lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Did {
    /// The base58-encoded public key
    key_part: String,
}

impl Did {
    /// Create a DID from a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let key_part = bs58::encode(public_key.as_bytes()).into_string();
        Self { key_part }
    }

    /// Parse a DID from a string
    pub fn parse(s: &str) -> Result<Self, DidError> {
        if s.is_empty() {
            return Err(DidError::InvalidFormat("DID cannot be empty".into()));
        }

        let parts: Vec<&str> = s.split(':').collect();

        if parts.len() != 3 {
            return Err(DidError::InvalidFormat(format!(
                "Expected 3 parts separated by ':', got {}",
                parts.len()
            )));
        }

        if parts[0] != "did" {
            return Err(DidError::InvalidFormat(format!(
                "Expected 'did' scheme, got '{}'",
                parts[0]
            )));
        }

        if parts[1] != "life" {
            return Err(DidError::InvalidMethod(parts[1].to_string()));
        }

        if parts[2].is_empty() {
            return Err(DidError::InvalidFormat("Key part cannot be empty".into()));
        }

        // Validate base58 encoding by attempting to decode
        let key_part = parts[2].to_string();
        bs58::decode(&key_part)
            .into_vec()
            .map_err(|e| DidError::InvalidBase58(e.to_string()))?;

        Ok(Self { key_part })
    }

    /// Extract the public key from this DID
    pub fn public_key(&self) -> Result<PublicKey, DidError> {
        let bytes = bs58::decode(&self.key_part)
            .into_vec()
            .map_err(|e| DidError::InvalidBase58(e.to_string()))?;

        PublicKey::from_bytes(&bytes).map_err(DidError::InvalidPublicKey)
    }

    /// Get the key part of the DID (base58 encoded)
    pub fn key_part(&self) -> &str {
        &self.key_part
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", DID_PREFIX, self.key_part)
    }
}

impl PartialEq for Did {
    fn eq(&self, other: &Self) -> bool {
        self.key_part == other.key_part
    }
}

impl Eq for Did {}

impl Hash for Did {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_part.hash(state);
    }
}

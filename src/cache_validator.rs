use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Checksummed envelope for values kept in the local candidate store.
///
/// The local store is the copy that must survive when the remote store is
/// down, so every read verifies the SHA-256 of the payload before trusting it.
/// A mismatching or unreadable entry is reported as corrupted and the caller
/// treats it as missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedCacheEntry {
    /// JSON payload.
    pub data: String,
    /// Hex SHA-256 of `data`.
    pub checksum: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum EntryState {
    Unreadable,
    ChecksumMismatch,
}

impl ValidatedCacheEntry {
    pub fn new(data: String) -> Self {
        let checksum = Self::compute_checksum(&data);
        Self { data, checksum }
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.data) == self.checksum
    }

    /// Serialize `value` and wrap it with its checksum, ready for storage.
    pub fn seal<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
        let entry = Self::new(serde_json::to_string(value)?);
        serde_json::to_string(&entry)
    }

    /// Verify and decode a stored envelope.
    pub fn open<T: DeserializeOwned>(stored: &str) -> Result<T, EntryState> {
        let entry: ValidatedCacheEntry = serde_json::from_str(stored).map_err(|_| EntryState::Unreadable)?;

        if !entry.is_valid() {
            tracing::warn!(
                "Local entry failed validation: checksum mismatch. Expected: {}, Data length: {}",
                entry.checksum,
                entry.data.len()
            );
            return Err(EntryState::ChecksumMismatch);
        }

        serde_json::from_str(&entry.data).map_err(|_| EntryState::Unreadable)
    }
}

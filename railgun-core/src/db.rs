//! Key-value storage abstraction.
//!
//! The engine consumes an abstract store with range scans; production
//! backends plug in behind [`Database`]. Keys are arrays of lowercase hex
//! components, each left-padded to 64 characters; the on-disk key is the
//! colon-join of the components. Values are msgpack.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::crypto::aes;
use crate::error::StorageError;

/// Key-component helpers.
pub mod key {
    use crate::crypto::{field_to_be_bytes, Field};

    /// Hex component from an integer.
    #[must_use]
    pub fn from_u64(value: u64) -> String {
        format!("{value:064x}")
    }

    /// Hex component from raw bytes (at most 32).
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> String {
        format!("{:0>64}", hex::encode(bytes))
    }

    /// Hex component from a UTF-8 label such as a namespace name.
    #[must_use]
    pub fn from_label(label: &str) -> String {
        from_bytes(label.as_bytes())
    }

    /// Hex component from a field element.
    #[must_use]
    pub fn from_field(element: &Field) -> String {
        hex::encode(field_to_be_bytes(element))
    }

    /// The on-disk form of a component array.
    #[must_use]
    pub fn join(components: &[String]) -> String {
        components.join(":")
    }
}

/// One operation of an atomic write batch.
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Store `value` at `key`.
    Put {
        /// Key components.
        key: Vec<String>,
        /// Encoded value.
        value: Vec<u8>,
    },
    /// Remove the value at `key`.
    Delete {
        /// Key components.
        key: Vec<String>,
    },
}

/// Abstract key-value store with namespace scans.
///
/// All methods suspend; storage I/O is the engine's only suspension surface
/// besides the chain event source.
#[allow(async_fn_in_trait)]
pub trait Database: Send + Sync {
    /// Reads the value at `key`. [`StorageError::NotFound`] when absent.
    async fn get(&self, key: &[String]) -> Result<Vec<u8>, StorageError>;

    /// Stores `value` at `key`, overwriting.
    async fn put(&self, key: &[String], value: &[u8]) -> Result<(), StorageError>;

    /// Applies a batch of operations atomically.
    async fn batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError>;

    /// Number of keys strictly inside the namespace `prefix`.
    async fn count_namespace(&self, prefix: &[String]) -> Result<u64, StorageError>;

    /// All keys strictly inside the namespace `prefix`, in ascending order.
    async fn stream_namespace(&self, prefix: &[String]) -> Result<Vec<Vec<String>>, StorageError>;

    /// Reads and opens a value sealed with [`Database::put_encrypted`].
    async fn get_encrypted(
        &self,
        key: &[String],
        encryption_key: &[u8; 32],
    ) -> Result<Vec<u8>, StorageError> {
        let raw = self.get(key).await?;
        let ciphertext: aes::Ciphertext = rmp_serde::from_slice(&raw)?;
        Ok(aes::decrypt(&ciphertext, encryption_key)?.concat())
    }

    /// Seals `value` under `encryption_key` and stores it at `key`.
    async fn put_encrypted(
        &self,
        key: &[String],
        encryption_key: &[u8; 32],
        value: &[u8],
    ) -> Result<(), StorageError> {
        let ciphertext = aes::encrypt(&[value], encryption_key)?;
        self.put(key, &rmp_serde::to_vec(&ciphertext)?).await
    }
}

/// Encodes a value to its stored msgpack form.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    Ok(rmp_serde::to_vec(value)?)
}

/// Decodes a value from its stored msgpack form.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// In-memory [`Database`]. The reference implementation for tests and
/// ephemeral wallets.
#[derive(Debug, Default)]
pub struct MemDatabase {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemDatabase {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        MemDatabase::default()
    }
}

impl Database for MemDatabase {
    async fn get(&self, key: &[String]) -> Result<Vec<u8>, StorageError> {
        self.entries
            .read()
            .await
            .get(&key::join(key))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn put(&self, key: &[String], value: &[u8]) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key::join(key), value.to_vec());
        Ok(())
    }

    async fn batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    entries.insert(key::join(&key), value);
                }
                BatchOp::Delete { key } => {
                    entries.remove(&key::join(&key));
                }
            }
        }
        Ok(())
    }

    async fn count_namespace(&self, prefix: &[String]) -> Result<u64, StorageError> {
        Ok(self.stream_namespace(prefix).await?.len() as u64)
    }

    async fn stream_namespace(&self, prefix: &[String]) -> Result<Vec<Vec<String>>, StorageError> {
        let start = format!("{}:", key::join(prefix));
        let entries = self.entries.read().await;
        Ok(entries
            .range(start.clone()..)
            .take_while(|(stored, _)| stored.starts_with(&start))
            .map(|(stored, _)| stored.split(':').map(str::to_string).collect())
            .collect())
    }
}

//! Core error module

/// Errors from the cryptographic primitives.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Poseidon hash error.
    #[error("poseidon hash failed. {0}")]
    Poseidon(#[from] light_poseidon::PoseidonError),
    /// Public key bytes do not decode to a valid curve point.
    #[error("invalid public key")]
    InvalidPublicKey,
    /// AES-256-GCM encryption failure.
    #[error("encryption failed")]
    Encryption,
    /// AES-256-GCM decryption failure. The key is wrong or the ciphertext
    /// was tampered with.
    #[error("decryption failed")]
    Decryption,
    /// Blinding scalar reduced to zero and cannot be inverted.
    #[error("blinding scalar is not invertible")]
    NonInvertibleBlind,
}

/// Errors surfaced by [`crate::db::Database`] implementations and value
/// codecs.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No value stored under the requested key.
    #[error("key not found")]
    NotFound,
    /// Value encoding failed.
    #[error("value encoding failed. {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    /// Value decoding failed.
    #[error("value decoding failed. {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    /// Encrypted-value crypto failure.
    #[error("stored value crypto failure. {0}")]
    Crypto(#[from] CryptoError),
    /// Backend-specific failure.
    #[error("store backend failure. {0}")]
    Backend(String),
}

/// Errors from note construction, encryption and decryption.
///
/// A decryption failure during scanning is expected (the note is simply not
/// addressed to this wallet) and must never be treated as fatal.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// Crypto primitive failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// Decrypted plaintext does not have the note chunk layout.
    #[error("ciphertext does not contain a well-formed note")]
    MalformedPlaintext,
    /// Token ids are 20 bytes.
    #[error("token id must fit in 20 bytes, found {0}")]
    InvalidTokenLength(usize),
    /// Note randomness is 16 bytes.
    #[error("note random must fit in 16 bytes, found {0}")]
    InvalidRandomLength(usize),
}

/// Errors from the commitment merkle tree.
#[derive(Debug, thiserror::Error)]
pub enum MerkleTreeError {
    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Crypto primitive failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// Computed root does not match the root reported on chain. Scanning of
    /// this tree must not advance past an invalid root.
    #[error("tree {tree} root mismatch. expected {expected}, found {found}")]
    InvalidRoot {
        /// Tree number.
        tree: u32,
        /// Root reported on chain.
        expected: String,
        /// Root computed from stored nodes.
        found: String,
    },
}

/// Errors from the shielded address codec.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// Not a well-formed bech32 string.
    #[error("failed to decode address. {0}")]
    Bech32(String),
    /// Human-readable prefix is not a known chain family.
    #[error("unknown address prefix {0}")]
    UnknownPrefix(String),
    /// Payload is the 64-byte master public key and viewing public key.
    #[error("address payload must be 64 bytes, found {0}")]
    InvalidPayloadLength(usize),
}

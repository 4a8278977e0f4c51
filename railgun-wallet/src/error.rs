//! Wallet error module

use railgun_core::error::{CryptoError, MerkleTreeError, NoteError, StorageError};

/// Errors from key derivation.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Derivation path segment is not a hardened child index.
    #[error("invalid derivation path segment. {0}")]
    InvalidPathSegment(String),
    /// Mnemonic phrase failed to parse.
    #[error("invalid mnemonic phrase. {0}")]
    InvalidMnemonic(String),
    /// Crypto primitive failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Top level error for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Storage failure.
    #[error("storage error. {0}")]
    Storage(#[from] StorageError),
    /// Key derivation failure.
    #[error("key error. {0}")]
    Key(#[from] KeyError),
    /// Merkle tree failure.
    #[error("merkle tree error. {0}")]
    MerkleTree(#[from] MerkleTreeError),
    /// Note algebra failure.
    #[error("note error. {0}")]
    Note(#[from] NoteError),
    /// Crypto primitive failure.
    #[error("crypto error. {0}")]
    Crypto(#[from] CryptoError),
    /// No merkle tree registered for the requested chain.
    #[error("no merkle tree loaded for chain {0}")]
    MerkleTreeNotLoaded(u64),
}

/// Errors from the spending-solution planner.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SolutionError {
    /// The outputs cannot be satisfied from the remaining unspent outputs.
    #[error(
        "Please consolidate balances before multi-sending. Too many spending solutions would be required to satisfy this transaction."
    )]
    ConsolidateBalances,
    /// The request needs a circuit shape the protocol does not offer.
    #[error(
        "This transaction requires a complex circuit for multi-sending, which is not supported. Send to a single address or consolidate balances first."
    )]
    ComplexCircuitUnsupported,
    /// A solution batch landed on a nullifier count the circuit rejects.
    /// Indicates protocol misuse or data corruption.
    #[error("Invalid nullifier count")]
    InvalidNullifierCount,
}

#![warn(missing_docs)]
#![doc = r#"
# Railgun Core

Protocol engine for a shielded-pool token system on account-based chains.
Balances are hidden inside an append-only Poseidon commitment tree; spends
reveal deterministic nullifiers instead of public outputs. This crate provides
the pieces a wallet builds on:

- Crypto primitives: Poseidon over the SNARK scalar field, EdDSA-Poseidon on
  BabyJubJub, Ed25519 signing with strict key parsing, X25519 shared-key
  derivation, ephemeral-key blinding, chunked AES-256-GCM.
- The note model: commitment and nullifier algebra, payload encryption, and
  the persisted note shape.
- The commitment merkle tree: queued batch insertion with a write cache,
  cached tree lengths, persisted leaf payloads and the on-chain nullifier
  index.
- A key-value storage abstraction consumed by the tree and by wallets, with
  an in-memory reference implementation.
- The shielded address codec.

## Terminology
- Commitment - an on-chain field element hiding a note; a merkle tree leaf.
- Nullifier - a deterministic tag revealed on spend to prevent double-spends.
- Note public key - `poseidon(master_public_key, random)`.
- Master public key - spending identity derived from the BabyJubJub spending
  key and the nullifying key.
- Viewing key - Ed25519 keypair used to detect and decrypt incoming notes.
"#]

pub mod address;
pub mod chain;
pub mod commitment;
pub mod crypto;
pub mod db;
pub mod error;
pub mod merkle_tree;
pub mod note;
pub mod serialization;

pub use chain::Chain;
pub use crypto::Field;
pub use db::Database;
pub use merkle_tree::MerkleTree;
pub use note::{Note, TokenId, TxId};

#![warn(missing_docs)]
#![doc = r#"
# Railgun Wallet

Wallet layer over the shielded-pool protocol engine, providing the following
features:
- Key derivation, from a mnemonic and account index to the BabyJubJub
  spending keypair, the Ed25519 viewing keypair, the nullifying key and the
  master public key.
- An incremental scan engine that walks new commitment tree leaves, trial
  decrypts them with the viewing key and persists discovered outputs.
- A balance view over unspent outputs, checked against the on-chain
  nullifier index, aggregated per token and partitioned per tree.
- A spending-solution planner that groups inputs into the nullifier counts
  accepted by the proving circuit.

## Scanning
1. A scan is per chain and guarded by a per-chain lock; a concurrent scan on
   the same chain is a no-op.
2. Trees are walked in ascending order. For each tree, every leaf from the
   stored scanned height to the tree length is fetched and trial decrypted.
3. A decryption failure means the note is not addressed to this wallet and
   is never fatal.
4. Discovered outputs are written in a batch keyed by `(tree, position)`,
   making rescans idempotent, and scan progress is persisted after each tree
   so a restart resumes safely.
5. Balance queries refresh spend status from the nullifier index; once an
   output is marked spent the spending transaction is sticky.
"#]

pub mod error;
pub mod keys;
pub mod solutions;
pub mod wallet;

pub use keys::WalletKeys;
pub use wallet::{Wallet, WalletDetails};

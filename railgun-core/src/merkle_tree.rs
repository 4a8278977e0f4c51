//! Append-only Poseidon commitment tree.
//!
//! Leaves arrive from the chain event source in batches tagged with a tree
//! number and a starting position. Batches are queued and applied only when
//! the tree's length reaches their starting position, so out-of-order
//! delivery is held rather than dropped. Nodes are written once and never
//! updated.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use sha3::{Digest, Keccak256};
use tokio::sync::Mutex;

use crate::chain::Chain;
use crate::commitment::Commitment;
use crate::crypto::{field_from_be_bytes, field_to_be_bytes, field_to_hex, hash_left_right, Field};
use crate::db::{self, key, BatchOp, Database};
use crate::error::{CryptoError, MerkleTreeError, StorageError};
use crate::note::TxId;

/// Fixed depth of every commitment tree.
pub const TREE_DEPTH: usize = 16;

/// Leaf capacity of one tree.
pub const TREE_MAX_LEAVES: u64 = 1 << TREE_DEPTH;

const DATA_LABEL: &str = "data";
const NULLIFIERS_LABEL: &str = "nullifiers";

/// The level-0 zero value: `keccak256("Railgun")` reduced into the SNARK
/// scalar field.
#[must_use]
pub fn merkle_zero_value() -> Field {
    field_from_be_bytes(&Keccak256::digest(b"Railgun"))
}

/// Append-only commitment tree over a [`Database`].
///
/// One instance manages every tree of a `(chain, purpose)` pair; trees fill
/// to [`TREE_MAX_LEAVES`] and continue in the next tree number.
pub struct MerkleTree<D: Database> {
    db: Arc<D>,
    chain: Chain,
    namespace: String,
    zeros: Vec<Field>,
    lengths: Mutex<HashMap<u32, u64>>,
    queue: Mutex<BTreeMap<u32, BTreeMap<u64, Vec<Commitment>>>>,
    update_lock: Mutex<()>,
}

impl<D: Database> MerkleTree<D> {
    /// Creates a tree handle for `chain` with a purpose tag such as
    /// `"erc20"`. The purpose scopes the storage namespace.
    pub fn new(db: Arc<D>, chain: Chain, purpose: &str) -> Result<Self, MerkleTreeError> {
        let mut zeros = Vec::with_capacity(TREE_DEPTH + 1);
        let mut level_zero = merkle_zero_value();
        for _ in 0..=TREE_DEPTH {
            zeros.push(level_zero);
            level_zero = hash_left_right(level_zero, level_zero)?;
        }
        Ok(MerkleTree {
            db,
            chain,
            namespace: format!("merkletree-{purpose}"),
            zeros,
            lengths: Mutex::new(HashMap::new()),
            queue: Mutex::new(BTreeMap::new()),
            update_lock: Mutex::new(()),
        })
    }

    /// `poseidon(left, right)`, the node function.
    pub fn hash_left_right(left: Field, right: Field) -> Result<Field, CryptoError> {
        hash_left_right(left, right)
    }

    /// Zero value for nodes at `level`.
    #[must_use]
    pub fn zero_value(&self, level: usize) -> Field {
        self.zeros[level]
    }

    fn prefix(&self, tree: u32) -> Vec<String> {
        vec![
            key::from_u64(self.chain.id),
            key::from_label(&self.namespace),
            key::from_u64(u64::from(tree)),
        ]
    }

    fn node_key(&self, tree: u32, level: usize, index: u64) -> Vec<String> {
        let mut components = self.prefix(tree);
        components.push(key::from_u64(level as u64));
        components.push(key::from_u64(index));
        components
    }

    fn data_prefix(&self, tree: u32) -> Vec<String> {
        let mut components = self.prefix(tree);
        components.push(key::from_label(DATA_LABEL));
        components
    }

    fn data_key(&self, tree: u32, index: u64) -> Vec<String> {
        let mut components = self.data_prefix(tree);
        components.push(key::from_u64(index));
        components
    }

    fn nullifier_key(&self, tree: u32, nullifier: &Field) -> Vec<String> {
        let mut components = self.prefix(tree);
        components.push(key::from_label(NULLIFIERS_LABEL));
        components.push(key::from_field(nullifier));
        components
    }

    /// Returns the persisted node at `(tree, level, index)`, or the level's
    /// zero value when absent.
    pub async fn get_node(
        &self,
        tree: u32,
        level: usize,
        index: u64,
    ) -> Result<Field, MerkleTreeError> {
        match self.db.get(&self.node_key(tree, level, index)).await {
            Ok(bytes) => Ok(field_from_be_bytes(&bytes)),
            Err(StorageError::NotFound) => Ok(self.zeros[level]),
            Err(e) => Err(e.into()),
        }
    }

    /// Root of `tree`: the node at `(depth, 0)`.
    pub async fn get_root(&self, tree: u32) -> Result<Field, MerkleTreeError> {
        self.get_node(tree, TREE_DEPTH, 0).await
    }

    /// Number of leaves in `tree`. Cached; the first call per tree counts
    /// the persisted leaf payloads.
    pub async fn get_tree_length(&self, tree: u32) -> Result<u64, MerkleTreeError> {
        let mut lengths = self.lengths.lock().await;
        if let Some(&length) = lengths.get(&tree) {
            return Ok(length);
        }
        let length = self.db.count_namespace(&self.data_prefix(tree)).await?;
        lengths.insert(tree, length);
        Ok(length)
    }

    /// Highest tree number with any leaves. Trees fill contiguously from 0.
    pub async fn latest_tree(&self) -> Result<u32, MerkleTreeError> {
        let mut tree = 0u32;
        while self.get_tree_length(tree).await? > 0 {
            tree += 1;
        }
        Ok(tree.saturating_sub(1))
    }

    /// Persisted commitment payload for the leaf at `(tree, index)`.
    pub async fn get_commitment(&self, tree: u32, index: u64) -> Result<Commitment, MerkleTreeError> {
        let bytes = self.db.get(&self.data_key(tree, index)).await?;
        Ok(db::decode(&bytes)?)
    }

    /// Looks up the spending transaction of `nullifier`, if it has been
    /// burned on chain.
    pub async fn get_nullified(
        &self,
        tree: u32,
        nullifier: &Field,
    ) -> Result<Option<TxId>, MerkleTreeError> {
        match self.db.get(&self.nullifier_key(tree, nullifier)).await {
            Ok(bytes) => Ok(Some(db::decode(&bytes)?)),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Records burned nullifiers delivered by the chain event source.
    pub async fn insert_nullifiers(
        &self,
        tree: u32,
        nullifiers: &[(Field, TxId)],
    ) -> Result<(), MerkleTreeError> {
        let ops = nullifiers
            .iter()
            .map(|(nullifier, txid)| {
                Ok(BatchOp::Put {
                    key: self.nullifier_key(tree, nullifier),
                    value: db::encode(txid)?,
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        Ok(self.db.batch(ops).await?)
    }

    /// Checks the stored root of `tree` against a root reported on chain.
    pub async fn validate_root(&self, tree: u32, expected: Field) -> Result<(), MerkleTreeError> {
        let found = self.get_root(tree).await?;
        if found == expected {
            Ok(())
        } else {
            Err(MerkleTreeError::InvalidRoot {
                tree,
                expected: field_to_hex(&expected),
                found: field_to_hex(&found),
            })
        }
    }

    /// Enqueues a leaf batch starting at `start_index` and triggers an
    /// update pass. Batches ahead of the tree's length are held until the
    /// tree catches up.
    pub async fn queue_leaves(
        &self,
        tree: u32,
        start_index: u64,
        leaves: Vec<Commitment>,
    ) -> Result<(), MerkleTreeError> {
        if leaves.is_empty() {
            return Ok(());
        }
        {
            let mut queue = self.queue.lock().await;
            queue.entry(tree).or_default().insert(start_index, leaves);
        }
        self.update_trees().await
    }

    /// Applies every queue entry that has become current. A single lock
    /// serializes update passes; a call that loses the race deposits its
    /// work in the queue and returns, leaving it to the pass already
    /// running.
    async fn update_trees(&self) -> Result<(), MerkleTreeError> {
        let Ok(_guard) = self.update_lock.try_lock() else {
            return Ok(());
        };
        loop {
            let trees: Vec<u32> = self.queue.lock().await.keys().copied().collect();
            let mut inserted = false;
            for tree in trees {
                let length = self.get_tree_length(tree).await?;
                let batch = {
                    let mut queue = self.queue.lock().await;
                    if let Some(tree_queue) = queue.get_mut(&tree) {
                        // Entries behind the tree are stale duplicates.
                        tree_queue.retain(|&start, _| start >= length);
                        let batch = tree_queue.remove(&length);
                        if tree_queue.is_empty() {
                            queue.remove(&tree);
                        }
                        batch
                    } else {
                        None
                    }
                };
                if let Some(leaves) = batch {
                    self.insert_leaves(tree, length, leaves).await?;
                    inserted = true;
                }
            }
            if !inserted {
                return Ok(());
            }
        }
    }

    /// Inserts `leaves` contiguously at `start_index`, recomputes all
    /// ancestors through a sparse write cache and commits everything in one
    /// batched write.
    pub async fn insert_leaves(
        &self,
        tree: u32,
        start_index: u64,
        leaves: Vec<Commitment>,
    ) -> Result<(), MerkleTreeError> {
        if leaves.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            tree,
            start_index,
            count = leaves.len(),
            "inserting leaves into commitment tree"
        );

        let mut write_cache: HashMap<(usize, u64), Field> = HashMap::new();
        let mut ops = Vec::with_capacity(leaves.len() * 2);
        for (offset, commitment) in leaves.iter().enumerate() {
            let index = start_index + offset as u64;
            write_cache.insert((0, index), commitment.hash());
            ops.push(BatchOp::Put {
                key: self.data_key(tree, index),
                value: db::encode(commitment)?,
            });
        }

        let mut start = start_index;
        let mut end = start_index + leaves.len() as u64 - 1;
        for level in 0..TREE_DEPTH {
            start >>= 1;
            end >>= 1;
            for parent in start..=end {
                let left_index = parent * 2;
                let left = match write_cache.get(&(level, left_index)) {
                    Some(&node) => node,
                    None => self.get_node(tree, level, left_index).await?,
                };
                let right = match write_cache.get(&(level, left_index + 1)) {
                    Some(&node) => node,
                    None => self.get_node(tree, level, left_index + 1).await?,
                };
                write_cache.insert((level + 1, parent), hash_left_right(left, right)?);
            }
        }

        for (&(level, index), node) in &write_cache {
            ops.push(BatchOp::Put {
                key: self.node_key(tree, level, index),
                value: field_to_be_bytes(node).to_vec(),
            });
        }
        self.db.batch(ops).await?;

        let mut lengths = self.lengths.lock().await;
        let length = lengths.entry(tree).or_insert(0);
        *length = (*length).max(start_index + leaves.len() as u64);
        Ok(())
    }
}

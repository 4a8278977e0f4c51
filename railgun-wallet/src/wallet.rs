//! Core module, containing [`Wallet`] with methods for scanning, output
//! persistence and the balance view.

use std::collections::HashMap;
use std::sync::Arc;

use bip0039::Mnemonic;
use ruint::aliases::U256;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, RwLock};

use railgun_core::address::AddressData;
use railgun_core::chain::Chain;
use railgun_core::commitment::Commitment;
use railgun_core::crypto::{ed25519, field_to_be_bytes, Field};
use railgun_core::db::{self, key, BatchOp, Database};
use railgun_core::error::{MerkleTreeError, StorageError};
use railgun_core::merkle_tree::MerkleTree;
use railgun_core::note::{Note, SerializedNote, TokenId, TxId};
use railgun_core::serialization::field_hex;

use crate::error::{KeyError, WalletError};
use crate::keys::{self, WalletKeys};

const WALLET_LABEL: &str = "wallet";

/// Scan progress per chain: the highest scanned leaf index for each tree.
/// Persisted encrypted under the wallet's master public key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDetails {
    /// Indexed by tree number.
    pub tree_scanned_heights: Vec<u32>,
}

/// On-disk wallet record, encrypted under the user's encryption key.
#[derive(Debug, Serialize, Deserialize)]
struct WalletRecord {
    mnemonic: String,
    index: u32,
}

/// Persisted form of a discovered output, keyed by `(chain, tree, position)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTxo {
    /// Transaction that created the commitment.
    pub txid: TxId,
    /// Transaction that spent this output, once its nullifier is observed.
    pub spend_txid: Option<TxId>,
    /// Nullifier this wallet would reveal to spend the output.
    #[serde(with = "field_hex")]
    pub nullifier: Field,
    /// The decrypted note.
    pub note: SerializedNote,
}

/// A discovered output with its tree location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Txo {
    /// Tree holding the commitment.
    pub tree: u32,
    /// Leaf index inside the tree.
    pub position: u64,
    /// Transaction that created the commitment.
    pub txid: TxId,
    /// Transaction that spent this output, if any.
    pub spend_txid: Option<TxId>,
    /// Nullifier for this output.
    pub nullifier: Field,
    /// The decrypted note.
    pub note: SerializedNote,
}

impl Txo {
    /// Note value.
    #[must_use]
    pub fn value(&self) -> u128 {
        self.note.value
    }

    /// Token the note holds.
    #[must_use]
    pub fn token(&self) -> TokenId {
        self.note.token
    }
}

/// Unspent value in one tree for one token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeBalance {
    /// Sum of unspent output values.
    pub balance: U256,
    /// The unspent outputs themselves.
    pub utxos: Vec<Txo>,
}

/// A shielded wallet bound to a [`Database`].
pub struct Wallet<D: Database> {
    db: Arc<D>,
    id: String,
    keys: WalletKeys,
    mnemonic: Mnemonic,
    index: u32,
    merkle_trees: RwLock<HashMap<u64, Arc<MerkleTree<D>>>>,
    scan_locks: RwLock<HashMap<u64, Arc<Mutex<()>>>>,
    scanned_events: broadcast::Sender<Chain>,
}

impl<D: Database> Wallet<D> {
    /// Creates a wallet for the account at `index` and writes its encrypted
    /// record.
    pub async fn new(
        db: Arc<D>,
        encryption_key: &[u8; 32],
        mnemonic: Mnemonic,
        index: u32,
    ) -> Result<Self, WalletError> {
        let keys = WalletKeys::from_mnemonic(&mnemonic, index)?;
        let id = keys::wallet_id(&mnemonic, index);
        let (scanned_events, _) = broadcast::channel(16);
        let wallet = Wallet {
            db,
            id,
            keys,
            mnemonic,
            index,
            merkle_trees: RwLock::new(HashMap::new()),
            scan_locks: RwLock::new(HashMap::new()),
            scanned_events,
        };
        wallet.write(encryption_key).await?;
        Ok(wallet)
    }

    /// Creates a wallet from a mnemonic phrase.
    pub async fn from_mnemonic(
        db: Arc<D>,
        encryption_key: &[u8; 32],
        phrase: &str,
        index: u32,
    ) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::from_phrase(phrase.to_string())
            .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
        Self::new(db, encryption_key, mnemonic, index).await
    }

    /// Loads a wallet from its stored record.
    pub async fn load(db: Arc<D>, encryption_key: &[u8; 32], id: &str) -> Result<Self, WalletError> {
        let raw = db
            .get_encrypted(&wallet_key(id), encryption_key)
            .await?;
        let record: WalletRecord = db::decode(&raw)?;
        let mnemonic = Mnemonic::from_phrase(record.mnemonic.clone())
            .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;
        Self::new(db, encryption_key, mnemonic, record.index).await
    }

    /// Canonical write of the wallet record at `("wallet", id)`.
    async fn write(&self, encryption_key: &[u8; 32]) -> Result<(), WalletError> {
        let record = WalletRecord {
            mnemonic: self.mnemonic.phrase().to_string(),
            index: self.index,
        };
        self.db
            .put_encrypted(&wallet_key(&self.id), encryption_key, &db::encode(&record)?)
            .await?;
        Ok(())
    }

    /// Wallet identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key material for this wallet.
    #[must_use]
    pub fn keys(&self) -> &WalletKeys {
        &self.keys
    }

    /// Shielded address, optionally bound to a chain.
    #[must_use]
    pub fn address(&self, chain: Option<Chain>) -> AddressData {
        self.keys.address(chain)
    }

    /// Registers the commitment tree to scan for `chain`.
    pub async fn load_merkle_tree(&self, chain: Chain, merkle_tree: Arc<MerkleTree<D>>) {
        self.merkle_trees.write().await.insert(chain.id, merkle_tree);
    }

    /// Subscribes to per-chain scan-completion events.
    #[must_use]
    pub fn subscribe_scans(&self) -> broadcast::Receiver<Chain> {
        self.scanned_events.subscribe()
    }

    async fn merkle_tree(&self, chain: Chain) -> Result<Arc<MerkleTree<D>>, WalletError> {
        self.merkle_trees
            .read()
            .await
            .get(&chain.id)
            .cloned()
            .ok_or(WalletError::MerkleTreeNotLoaded(chain.id))
    }

    fn chain_key(&self, chain: Chain) -> Vec<String> {
        vec![
            key::from_label(WALLET_LABEL),
            self.id.clone(),
            key::from_u64(chain.id),
        ]
    }

    fn txo_key(&self, chain: Chain, tree: u32, position: u64) -> Vec<String> {
        let mut components = self.chain_key(chain);
        components.push(key::from_u64(u64::from(tree)));
        components.push(key::from_u64(position));
        components
    }

    fn details_encryption_key(&self) -> [u8; 32] {
        field_to_be_bytes(&self.keys.master_public_key())
    }

    /// Reads scan progress for `chain`; a wallet that has never scanned gets
    /// empty details.
    pub async fn get_wallet_details(&self, chain: Chain) -> Result<WalletDetails, WalletError> {
        match self
            .db
            .get_encrypted(&self.chain_key(chain), &self.details_encryption_key())
            .await
        {
            Ok(raw) => Ok(db::decode(&raw)?),
            Err(StorageError::NotFound) => Ok(WalletDetails::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn put_wallet_details(
        &self,
        chain: Chain,
        details: &WalletDetails,
    ) -> Result<(), WalletError> {
        self.db
            .put_encrypted(
                &self.chain_key(chain),
                &self.details_encryption_key(),
                &db::encode(details)?,
            )
            .await?;
        Ok(())
    }

    /// Trial decrypts `leaves` and persists every output addressed to this
    /// wallet. `start_position` is the tree position of the first leaf.
    /// Returns whether any leaf was claimed.
    pub async fn scan_leaves(
        &self,
        leaves: &[Commitment],
        tree: u32,
        chain: Chain,
        start_position: u64,
    ) -> Result<bool, WalletError> {
        let viewing_private_key = self.keys.viewing_private_key();
        let nullifying_key = self.keys.nullifying_key();
        let mut ops = Vec::new();

        for (offset, leaf) in leaves.iter().enumerate() {
            let position = start_position + offset as u64;
            let decrypted = match leaf {
                Commitment::Encrypted(commitment) => {
                    let shared = ed25519::shared_key_from_ephemeral(
                        self.keys.viewing_keypair(),
                        &commitment.ephemeral_keys[0],
                    );
                    match Note::decrypt(&commitment.ciphertext, &shared) {
                        Ok(partial) => {
                            let note = partial.attach_viewing_key(self.keys.viewing_public_key());
                            Some(note.serialize(&viewing_private_key)?)
                        }
                        Err(e) => {
                            tracing::debug!(tree, position, "leaf not addressed to us. {e}");
                            None
                        }
                    }
                }
                Commitment::Preimage(commitment) => {
                    let serialized = SerializedNote {
                        npk: commitment.preimage.npk,
                        token: commitment.preimage.token,
                        value: commitment.preimage.value,
                        encrypted_random: commitment.encrypted_random.clone(),
                    };
                    match serialized.decrypt_random(&viewing_private_key) {
                        Ok(_) => Some(serialized),
                        Err(e) => {
                            tracing::debug!(tree, position, "leaf not addressed to us. {e}");
                            None
                        }
                    }
                }
            };

            if let Some(note) = decrypted {
                let stored = StoredTxo {
                    txid: leaf.txid(),
                    spend_txid: None,
                    nullifier: Note::nullifier(&nullifying_key, position)?,
                    note,
                };
                ops.push(BatchOp::Put {
                    key: self.txo_key(chain, tree, position),
                    value: db::encode(&stored)?,
                });
            }
        }

        let claimed = !ops.is_empty();
        if claimed {
            self.db.batch(ops).await?;
        }
        Ok(claimed)
    }

    /// All discovered outputs on `chain`, refreshing spend status against
    /// the tree's nullifier index. A nullifier hit persists the spending
    /// transaction; once set it never changes.
    pub async fn txos(&self, chain: Chain) -> Result<Vec<Txo>, WalletError> {
        let merkle_tree = self.merkle_tree(chain).await?;
        let mut txos = Vec::new();
        for key_components in self.db.stream_namespace(&self.chain_key(chain)).await? {
            let Some((tree, position)) = txo_location(&key_components) else {
                continue;
            };
            let raw = self.db.get(&key_components).await?;
            let mut stored: StoredTxo = db::decode(&raw)?;
            if stored.spend_txid.is_none() {
                if let Some(spend_txid) = merkle_tree.get_nullified(tree, &stored.nullifier).await? {
                    stored.spend_txid = Some(spend_txid);
                    self.db.put(&key_components, &db::encode(&stored)?).await?;
                }
            }
            txos.push(Txo {
                tree,
                position,
                txid: stored.txid,
                spend_txid: stored.spend_txid,
                nullifier: stored.nullifier,
                note: stored.note,
            });
        }
        Ok(txos)
    }

    /// Unspent value per token across every tree on `chain`.
    pub async fn balances(&self, chain: Chain) -> Result<HashMap<TokenId, TreeBalance>, WalletError> {
        let mut balances: HashMap<TokenId, TreeBalance> = HashMap::new();
        for txo in self.txos(chain).await? {
            if txo.spend_txid.is_some() {
                continue;
            }
            let entry = balances.entry(txo.token()).or_default();
            entry.balance += U256::from(txo.value());
            entry.utxos.push(txo);
        }
        Ok(balances)
    }

    /// Unspent value per token, partitioned by tree. The vector for each
    /// token is indexed by tree number; trees without outputs hold empty
    /// balances.
    pub async fn balances_by_tree(
        &self,
        chain: Chain,
    ) -> Result<HashMap<TokenId, Vec<TreeBalance>>, WalletError> {
        let mut balances: HashMap<TokenId, Vec<TreeBalance>> = HashMap::new();
        for txo in self.txos(chain).await? {
            if txo.spend_txid.is_some() {
                continue;
            }
            let trees = balances.entry(txo.token()).or_default();
            let tree = txo.tree as usize;
            if trees.len() <= tree {
                trees.resize(tree + 1, TreeBalance::default());
            }
            trees[tree].balance += U256::from(txo.value());
            trees[tree].utxos.push(txo);
        }
        Ok(balances)
    }

    /// Scans every tree on `chain` for new leaves. A scan already running on
    /// the same chain makes this call a no-op. Scan progress is persisted
    /// after each tree batch, so an interrupted scan resumes safely.
    pub async fn scan(&self, chain: Chain) -> Result<(), WalletError> {
        let scan_lock = {
            let mut locks = self.scan_locks.write().await;
            locks
                .entry(chain.id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let Ok(_guard) = scan_lock.try_lock() else {
            tracing::debug!(chain = chain.id, "scan already in progress");
            return Ok(());
        };
        tracing::info!(chain = chain.id, "scanning wallet");

        let merkle_tree = self.merkle_tree(chain).await?;
        let mut details = self.get_wallet_details(chain).await?;
        let latest_tree = merkle_tree.latest_tree().await?;

        for tree in 0..=latest_tree {
            if details.tree_scanned_heights.len() <= tree as usize {
                details.tree_scanned_heights.resize(tree as usize + 1, 0);
            }
            let scanned_height = u64::from(details.tree_scanned_heights[tree as usize]);
            let length = merkle_tree.get_tree_length(tree).await?;

            let mut leaves = Vec::new();
            for position in scanned_height..length {
                match merkle_tree.get_commitment(tree, position).await {
                    Ok(commitment) => leaves.push(commitment),
                    Err(MerkleTreeError::Storage(StorageError::NotFound)) => {
                        tracing::warn!(tree, position, "missing leaf payload, stopping tree scan");
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            if leaves.is_empty() {
                continue;
            }

            self.scan_leaves(&leaves, tree, chain, scanned_height).await?;
            details.tree_scanned_heights[tree as usize] = leaves.len().saturating_sub(1) as u32;
            self.put_wallet_details(chain, &details).await?;
        }

        let _ = self.scanned_events.send(chain);
        tracing::info!(chain = chain.id, "wallet scan complete");
        Ok(())
    }
}

fn wallet_key(id: &str) -> Vec<String> {
    vec![key::from_label(WALLET_LABEL), id.to_string()]
}

/// Extracts `(tree, position)` from a stored output key, rejecting keys of
/// any other shape in the namespace.
fn txo_location(key_components: &[String]) -> Option<(u32, u64)> {
    if key_components.len() != 5 {
        return None;
    }
    let tree = u64::from_str_radix(&key_components[3], 16).ok()?;
    let position = u64::from_str_radix(&key_components[4], 16).ok()?;
    Some((u32::try_from(tree).ok()?, position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use railgun_core::commitment::{
        CommitmentPreimage, EncryptedCommitment, PreimageCommitment,
    };
    use railgun_core::crypto::aes;
    use railgun_core::db::MemDatabase;
    use railgun_core::note::NoteRandom;

    const PHRASE: &str = "test test test test test test test test test test test junk";
    const ENCRYPTION_KEY: [u8; 32] = [1u8; 32];

    fn chain() -> Chain {
        Chain::new(1)
    }

    async fn wallet_with_tree() -> (Arc<MemDatabase>, Wallet<MemDatabase>, Arc<MerkleTree<MemDatabase>>) {
        let db = Arc::new(MemDatabase::new());
        let wallet = Wallet::from_mnemonic(db.clone(), &ENCRYPTION_KEY, PHRASE, 0)
            .await
            .unwrap();
        let merkle_tree = Arc::new(MerkleTree::new(db.clone(), chain(), "erc20").unwrap());
        wallet.load_merkle_tree(chain(), merkle_tree.clone()).await;
        (db, wallet, merkle_tree)
    }

    /// Builds the commitment a sender would put on chain for `note`.
    fn transfer_commitment(note: &Note, sender_seed: u8, txid: TxId) -> Commitment {
        let sender = ed25519::signing_key(&[sender_seed; 32]);
        let sender_public = sender.verifying_key().to_bytes();
        let (blinded_sender, blinded_receiver) = ed25519::blind_ephemeral_keys(
            &sender_public,
            &note.viewing_public_key(),
            &note.random().0,
        )
        .unwrap();
        let shared = ed25519::shared_key_from_ephemeral(&sender, &blinded_receiver);
        Commitment::Encrypted(EncryptedCommitment {
            hash: note.hash().unwrap(),
            txid,
            ciphertext: note.encrypt(&shared).unwrap(),
            ephemeral_keys: [blinded_sender, blinded_receiver],
            sender_public_key: sender_public,
        })
    }

    /// Builds the preimage commitment of a self-shield for `note`.
    fn shield_commitment(note: &Note, viewing_private_key: &[u8; 32], txid: TxId) -> Commitment {
        Commitment::Preimage(PreimageCommitment {
            hash: note.hash().unwrap(),
            txid,
            preimage: CommitmentPreimage::from(note),
            encrypted_random: aes::encrypt(&[&note.random().0], viewing_private_key).unwrap(),
        })
    }

    fn note_to(wallet: &Wallet<MemDatabase>, value: u128, random: u8) -> Note {
        Note::new(
            &wallet.address(Some(chain())),
            NoteRandom([random; 16]),
            value,
            TokenId([0xEE; 20]),
        )
    }

    #[tokio::test]
    async fn wallet_record_round_trips() {
        let db = Arc::new(MemDatabase::new());
        let wallet = Wallet::from_mnemonic(db.clone(), &ENCRYPTION_KEY, PHRASE, 3)
            .await
            .unwrap();
        let loaded = Wallet::load(db, &ENCRYPTION_KEY, wallet.id()).await.unwrap();
        assert_eq!(loaded.id(), wallet.id());
        assert_eq!(
            loaded.keys().master_public_key(),
            wallet.keys().master_public_key()
        );
    }

    #[tokio::test]
    async fn scan_claims_transfer_and_shield_leaves() {
        let (_db, wallet, merkle_tree) = wallet_with_tree().await;
        let ours = note_to(&wallet, 100, 1);
        let shielded = note_to(&wallet, 50, 2);
        let viewing_private_key = wallet.keys().viewing_private_key();

        // A note addressed to someone else sits between ours.
        let stranger = Wallet::from_mnemonic(
            Arc::new(MemDatabase::new()),
            &ENCRYPTION_KEY,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
            0,
        )
        .await
        .unwrap();
        let theirs = Note::new(
            &stranger.address(Some(chain())),
            NoteRandom([9; 16]),
            1000,
            TokenId([0xEE; 20]),
        );

        merkle_tree
            .queue_leaves(
                0,
                0,
                vec![
                    transfer_commitment(&ours, 42, TxId([1; 32])),
                    transfer_commitment(&theirs, 42, TxId([2; 32])),
                    shield_commitment(&shielded, &viewing_private_key, TxId([3; 32])),
                ],
            )
            .await
            .unwrap();

        wallet.scan(chain()).await.unwrap();

        let txos = wallet.txos(chain()).await.unwrap();
        assert_eq!(txos.len(), 2);
        assert_eq!(txos[0].position, 0);
        assert_eq!(txos[0].value(), 100);
        assert_eq!(txos[0].txid, TxId([1; 32]));
        assert_eq!(txos[1].position, 2);
        assert_eq!(txos[1].value(), 50);

        let balances = wallet.balances(chain()).await.unwrap();
        let balance = &balances[&TokenId([0xEE; 20])];
        assert_eq!(balance.balance, U256::from(150u64));
        assert_eq!(balance.utxos.len(), 2);
    }

    #[tokio::test]
    async fn rescan_is_idempotent() {
        let (_db, wallet, merkle_tree) = wallet_with_tree().await;
        let ours = note_to(&wallet, 100, 1);
        merkle_tree
            .queue_leaves(0, 0, vec![transfer_commitment(&ours, 42, TxId([1; 32]))])
            .await
            .unwrap();

        wallet.scan(chain()).await.unwrap();
        wallet.scan(chain()).await.unwrap();
        let txos = wallet.txos(chain()).await.unwrap();
        assert_eq!(txos.len(), 1);

        let balances = wallet.balances(chain()).await.unwrap();
        assert_eq!(
            balances[&TokenId([0xEE; 20])].balance,
            U256::from(100u64)
        );
    }

    #[tokio::test]
    async fn nullifier_hit_marks_txo_spent() {
        let (_db, wallet, merkle_tree) = wallet_with_tree().await;
        let ours = note_to(&wallet, 100, 1);
        merkle_tree
            .queue_leaves(0, 0, vec![transfer_commitment(&ours, 42, TxId([1; 32]))])
            .await
            .unwrap();
        wallet.scan(chain()).await.unwrap();

        let nullifier = wallet.txos(chain()).await.unwrap()[0].nullifier;
        merkle_tree
            .insert_nullifiers(0, &[(nullifier, TxId([0xFF; 32]))])
            .await
            .unwrap();

        let txos = wallet.txos(chain()).await.unwrap();
        assert_eq!(txos[0].spend_txid, Some(TxId([0xFF; 32])));
        assert!(wallet.balances(chain()).await.unwrap().is_empty());

        // The spend marking is persistent across calls.
        let txos = wallet.txos(chain()).await.unwrap();
        assert_eq!(txos[0].spend_txid, Some(TxId([0xFF; 32])));
    }

    #[tokio::test]
    async fn balances_partition_by_tree() {
        let (_db, wallet, merkle_tree) = wallet_with_tree().await;
        let in_tree_zero = note_to(&wallet, 20, 1);
        let in_tree_one = note_to(&wallet, 30, 2);
        merkle_tree
            .queue_leaves(0, 0, vec![transfer_commitment(&in_tree_zero, 42, TxId([1; 32]))])
            .await
            .unwrap();
        merkle_tree
            .queue_leaves(1, 0, vec![transfer_commitment(&in_tree_one, 42, TxId([2; 32]))])
            .await
            .unwrap();

        wallet.scan(chain()).await.unwrap();

        let by_tree = wallet.balances_by_tree(chain()).await.unwrap();
        let trees = &by_tree[&TokenId([0xEE; 20])];
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].balance, U256::from(20u64));
        assert_eq!(trees[1].balance, U256::from(30u64));
    }

    #[tokio::test]
    async fn scan_progress_records_batch_height() {
        let (_db, wallet, merkle_tree) = wallet_with_tree().await;
        let notes: Vec<Note> = (0..4).map(|i| note_to(&wallet, 10, i)).collect();
        let leaves: Vec<Commitment> = notes
            .iter()
            .enumerate()
            .map(|(i, note)| transfer_commitment(note, 42, TxId([i as u8; 32])))
            .collect();
        merkle_tree.queue_leaves(0, 0, leaves).await.unwrap();

        wallet.scan(chain()).await.unwrap();
        let details = wallet.get_wallet_details(chain()).await.unwrap();
        // Heights record the last index of the scanned batch.
        assert_eq!(details.tree_scanned_heights, vec![3]);

        // A later scan re-examines from the stored height without
        // duplicating records.
        wallet.scan(chain()).await.unwrap();
        assert_eq!(wallet.txos(chain()).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn scan_emits_scanned_event() {
        let (_db, wallet, merkle_tree) = wallet_with_tree().await;
        let mut events = wallet.subscribe_scans();
        let ours = note_to(&wallet, 100, 1);
        merkle_tree
            .queue_leaves(0, 0, vec![transfer_commitment(&ours, 42, TxId([1; 32]))])
            .await
            .unwrap();
        wallet.scan(chain()).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), chain());
    }

    #[tokio::test]
    async fn scan_without_tree_fails() {
        let db = Arc::new(MemDatabase::new());
        let wallet = Wallet::from_mnemonic(db, &ENCRYPTION_KEY, PHRASE, 0)
            .await
            .unwrap();
        assert!(matches!(
            wallet.scan(chain()).await,
            Err(WalletError::MerkleTreeNotLoaded(1))
        ));
    }
}

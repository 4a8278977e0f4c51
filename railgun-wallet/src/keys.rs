//! Wallet key derivation.
//!
//! Two hardened HD subtrees hang off the mnemonic seed: the spending subtree
//! yields a BabyJubJub keypair, the viewing subtree an Ed25519 keypair. The
//! nullifying key is the Poseidon image of the viewing private key and the
//! master public key binds the spending public key to the nullifying key.

use bip0039::Mnemonic;
use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

use railgun_core::address::AddressData;
use railgun_core::chain::Chain;
use railgun_core::crypto::babyjubjub::{Point, SpendingKeypair};
use railgun_core::crypto::{field_from_be_bytes, poseidon, Field};

use crate::error::KeyError;

/// Derivation prefix of the spending subtree.
pub const SPENDING_KEY_DERIVATION_PATH: &str = "m/44'/1984'/0'/0'";

/// Derivation prefix of the viewing subtree.
pub const VIEWING_KEY_DERIVATION_PATH: &str = "m/420'/1984'/0'/0'";

const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Hardened-only HD node: HMAC-SHA512 chain over the seed.
struct HdNode {
    chain_code: [u8; 32],
    key: [u8; 32],
}

impl HdNode {
    fn from_seed(seed: &[u8]) -> Self {
        let mut mac = Hmac::<Sha512>::new_from_slice(b"ed25519 seed")
            .expect("hmac accepts keys of any length");
        mac.update(seed);
        Self::split(&mac.finalize().into_bytes())
    }

    fn derive_hardened(&self, index: u32) -> Self {
        let mut mac = Hmac::<Sha512>::new_from_slice(&self.chain_code)
            .expect("hmac accepts keys of any length");
        mac.update(&[0]);
        mac.update(&self.key);
        mac.update(&(index | HARDENED_OFFSET).to_be_bytes());
        Self::split(&mac.finalize().into_bytes())
    }

    fn derive_path(&self, path: &str) -> Result<Self, KeyError> {
        let mut segments = path.split('/');
        if segments.next() != Some("m") {
            return Err(KeyError::InvalidPathSegment(path.to_string()));
        }
        let mut node = HdNode {
            chain_code: self.chain_code,
            key: self.key,
        };
        for segment in segments {
            let index = segment
                .strip_suffix('\'')
                .and_then(|raw| raw.parse::<u32>().ok())
                .ok_or_else(|| KeyError::InvalidPathSegment(segment.to_string()))?;
            node = node.derive_hardened(index);
        }
        Ok(node)
    }

    fn split(bytes: &[u8]) -> Self {
        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&bytes[..32]);
        chain_code.copy_from_slice(&bytes[32..64]);
        HdNode { chain_code, key }
    }
}

/// Key material for one wallet account.
pub struct WalletKeys {
    spending: SpendingKeypair,
    viewing: SigningKey,
    nullifying_key: Field,
    master_public_key: Field,
}

impl WalletKeys {
    /// Derives the account at `index` from a mnemonic.
    pub fn from_mnemonic(mnemonic: &Mnemonic, index: u32) -> Result<Self, KeyError> {
        let seed = mnemonic.to_seed("");
        let master = HdNode::from_seed(&seed);
        let spending_node =
            master.derive_path(&format!("{SPENDING_KEY_DERIVATION_PATH}/{index}'"))?;
        let viewing_node = master.derive_path(&format!("{VIEWING_KEY_DERIVATION_PATH}/{index}'"))?;

        let spending = SpendingKeypair::from_seed(&spending_node.key);
        let viewing = SigningKey::from_bytes(&viewing_node.key);
        let nullifying_key = poseidon(&[field_from_be_bytes(&viewing_node.key)])?;
        let (spend_x, spend_y) = spending.public_key();
        let master_public_key = poseidon(&[spend_x, spend_y, nullifying_key])?;

        Ok(WalletKeys {
            spending,
            viewing,
            nullifying_key,
            master_public_key,
        })
    }

    /// BabyJubJub spending keypair.
    #[must_use]
    pub fn spending_keypair(&self) -> &SpendingKeypair {
        &self.spending
    }

    /// Spending public key coordinates.
    #[must_use]
    pub fn spending_public_key(&self) -> Point {
        self.spending.public_key()
    }

    /// Ed25519 viewing keypair.
    #[must_use]
    pub fn viewing_keypair(&self) -> &SigningKey {
        &self.viewing
    }

    /// Viewing private key bytes. Decrypts stored note randomness and
    /// derives shared keys.
    #[must_use]
    pub fn viewing_private_key(&self) -> [u8; 32] {
        self.viewing.to_bytes()
    }

    /// Viewing public key bytes, as carried in addresses.
    #[must_use]
    pub fn viewing_public_key(&self) -> [u8; 32] {
        self.viewing.verifying_key().to_bytes()
    }

    /// `poseidon(viewing_private_key)`.
    #[must_use]
    pub fn nullifying_key(&self) -> Field {
        self.nullifying_key
    }

    /// Spending identity: `poseidon(spend_pk.x, spend_pk.y, nullifying_key)`.
    #[must_use]
    pub fn master_public_key(&self) -> Field {
        self.master_public_key
    }

    /// Shielded address for this account, optionally bound to a chain.
    #[must_use]
    pub fn address(&self, chain: Option<Chain>) -> AddressData {
        AddressData {
            master_public_key: self.master_public_key,
            viewing_public_key: self.viewing_public_key(),
            chain,
        }
    }
}

/// Wallet identifier: `sha256(seed ‖ hex(index))`, lowercase hex.
#[must_use]
pub fn wallet_id(mnemonic: &Mnemonic, index: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(mnemonic.to_seed(""));
    hasher.update(format!("{index:x}").as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "test test test test test test test test test test test junk";

    fn mnemonic() -> Mnemonic {
        Mnemonic::from_phrase(PHRASE.to_string()).unwrap()
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = WalletKeys::from_mnemonic(&mnemonic(), 0).unwrap();
        let b = WalletKeys::from_mnemonic(&mnemonic(), 0).unwrap();
        assert_eq!(a.master_public_key(), b.master_public_key());
        assert_eq!(a.viewing_public_key(), b.viewing_public_key());
        assert_eq!(a.spending_public_key(), b.spending_public_key());
    }

    #[test]
    fn accounts_are_independent() {
        let zero = WalletKeys::from_mnemonic(&mnemonic(), 0).unwrap();
        let one = WalletKeys::from_mnemonic(&mnemonic(), 1).unwrap();
        assert_ne!(zero.master_public_key(), one.master_public_key());
        assert_ne!(zero.viewing_public_key(), one.viewing_public_key());
        assert_ne!(zero.nullifying_key(), one.nullifying_key());
    }

    #[test]
    fn spending_and_viewing_subtrees_differ() {
        let keys = WalletKeys::from_mnemonic(&mnemonic(), 0).unwrap();
        let (spend_x, _) = keys.spending_public_key();
        assert_ne!(
            spend_x,
            field_from_be_bytes(&keys.viewing_public_key())
        );
    }

    #[test]
    fn wallet_ids_are_stable_and_distinct() {
        assert_eq!(wallet_id(&mnemonic(), 0), wallet_id(&mnemonic(), 0));
        assert_ne!(wallet_id(&mnemonic(), 0), wallet_id(&mnemonic(), 1));
        assert_eq!(wallet_id(&mnemonic(), 0).len(), 64);
    }

    #[test]
    fn malformed_path_is_rejected() {
        let seed = mnemonic().to_seed("");
        let master = HdNode::from_seed(&seed);
        assert!(master.derive_path("m/44/0'").is_err());
        assert!(master.derive_path("x/44'").is_err());
    }

    #[test]
    fn address_carries_account_identity() {
        let keys = WalletKeys::from_mnemonic(&mnemonic(), 0).unwrap();
        let address = keys.address(Some(Chain::new(1)));
        assert_eq!(address.master_public_key, keys.master_public_key());
        assert_eq!(address.viewing_public_key, keys.viewing_public_key());
    }
}

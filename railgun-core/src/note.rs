//! The note model: commitment and nullifier algebra, payload encryption and
//! the persisted note shape.

use serde::{Deserialize, Serialize};

use crate::address::AddressData;
use crate::crypto::aes::{self, Ciphertext};
use crate::crypto::{field_from_be_bytes, field_to_be_bytes, poseidon, Field};
use crate::error::{CryptoError, NoteError};
use crate::serialization::{field_hex, u128_hex};

/// 20-byte token identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenId(pub [u8; 20]);

impl TokenId {
    /// Normalizes a byte string to a 20-byte token id. Longer inputs are
    /// accepted when the extra leading bytes are zero padding.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, NoteError> {
        let stripped = strip_leading_zeros(bytes);
        if stripped.len() > 20 {
            return Err(NoteError::InvalidTokenLength(bytes.len()));
        }
        let mut id = [0u8; 20];
        id[20 - stripped.len()..].copy_from_slice(stripped);
        Ok(TokenId(id))
    }

    /// Token id as a field element.
    #[must_use]
    pub fn to_field(&self) -> Field {
        field_from_be_bytes(&self.0)
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// 16 bytes of note randomness. Blinds the note public key and derives the
/// ephemeral-key blinding scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRandom(pub [u8; 16]);

impl NoteRandom {
    /// Normalizes a byte string to 16 bytes of randomness, mirroring
    /// [`TokenId::from_slice`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, NoteError> {
        let stripped = strip_leading_zeros(bytes);
        if stripped.len() > 16 {
            return Err(NoteError::InvalidRandomLength(bytes.len()));
        }
        let mut random = [0u8; 16];
        random[16 - stripped.len()..].copy_from_slice(stripped);
        Ok(NoteRandom(random))
    }

    /// Fresh randomness from the system RNG.
    #[must_use]
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut random = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut random);
        NoteRandom(random)
    }

    /// Randomness as a field element.
    #[must_use]
    pub fn to_field(&self) -> Field {
        field_from_be_bytes(&self.0)
    }
}

/// 32-byte transaction hash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TxId(pub [u8; 32]);

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&byte| byte != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// A plaintext note. Its Poseidon hash is the on-chain commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    master_public_key: Field,
    viewing_public_key: [u8; 32],
    token: TokenId,
    random: NoteRandom,
    value: u128,
}

impl Note {
    /// Creates a note addressed to `address`.
    #[must_use]
    pub fn new(address: &AddressData, random: NoteRandom, value: u128, token: TokenId) -> Self {
        Note {
            master_public_key: address.master_public_key,
            viewing_public_key: address.viewing_public_key,
            token,
            random,
            value,
        }
    }

    /// Recipient's master public key.
    #[must_use]
    pub fn master_public_key(&self) -> Field {
        self.master_public_key
    }

    /// Recipient's viewing public key.
    #[must_use]
    pub fn viewing_public_key(&self) -> [u8; 32] {
        self.viewing_public_key
    }

    /// Token this note holds.
    #[must_use]
    pub fn token(&self) -> TokenId {
        self.token
    }

    /// Note randomness.
    #[must_use]
    pub fn random(&self) -> NoteRandom {
        self.random
    }

    /// Note value.
    #[must_use]
    pub fn value(&self) -> u128 {
        self.value
    }

    /// Clone of this note carrying `value` instead of the original value.
    #[must_use]
    pub fn with_value(&self, value: u128) -> Self {
        Note { value, ..self.clone() }
    }

    /// `poseidon(master_public_key, random)`.
    pub fn note_public_key(&self) -> Result<Field, CryptoError> {
        poseidon(&[self.master_public_key, self.random.to_field()])
    }

    /// The on-chain commitment: `poseidon(npk, token, value)`.
    pub fn hash(&self) -> Result<Field, CryptoError> {
        let npk = self.note_public_key()?;
        poseidon(&[npk, self.token.to_field(), Field::from(self.value)])
    }

    /// Nullifier for a note at `leaf_index`:
    /// `poseidon(nullifying_key, leaf_index)`.
    pub fn nullifier(nullifying_key: &Field, leaf_index: u64) -> Result<Field, CryptoError> {
        poseidon(&[*nullifying_key, Field::from(leaf_index)])
    }

    /// Encrypts the note payload under a shared key as three chunks:
    /// master public key (32B), token (20B), random‖value (16B‖16B).
    pub fn encrypt(&self, shared_key: &[u8; 32]) -> Result<Ciphertext, NoteError> {
        let mpk = field_to_be_bytes(&self.master_public_key);
        let mut random_value = [0u8; 32];
        random_value[..16].copy_from_slice(&self.random.0);
        random_value[16..].copy_from_slice(&self.value.to_be_bytes());
        Ok(aes::encrypt(&[&mpk, &self.token.0, &random_value], shared_key)?)
    }

    /// Attempts to decrypt a note payload. The viewing public key is not
    /// transmitted, so success yields a [`PartialNote`]; the caller rebinds
    /// the recipient identity with [`PartialNote::attach_viewing_key`].
    pub fn decrypt(ciphertext: &Ciphertext, shared_key: &[u8; 32]) -> Result<PartialNote, NoteError> {
        let chunks = aes::decrypt(ciphertext, shared_key)?;
        let [mpk, token, random_value] = chunks.as_slice() else {
            return Err(NoteError::MalformedPlaintext);
        };
        if mpk.len() != 32 || token.len() != 20 || random_value.len() != 32 {
            return Err(NoteError::MalformedPlaintext);
        }
        let value_bytes: [u8; 16] = random_value[16..]
            .try_into()
            .expect("slice is 16 bytes");
        Ok(PartialNote {
            master_public_key: field_from_be_bytes(mpk),
            token: TokenId::from_slice(token)?,
            random: NoteRandom::from_slice(&random_value[..16])?,
            value: u128::from_be_bytes(value_bytes),
        })
    }

    /// Persisted form of the note. The randomness is sealed under the
    /// owner's viewing private key so only the owner can reconstruct the
    /// spendable note.
    pub fn serialize(&self, viewing_private_key: &[u8; 32]) -> Result<SerializedNote, NoteError> {
        let encrypted_random = aes::encrypt(&[&self.random.0], viewing_private_key)?;
        Ok(SerializedNote {
            npk: self.note_public_key()?,
            token: self.token,
            value: self.value,
            encrypted_random,
        })
    }
}

/// A decrypted note before the recipient identity is rebound. Produced by
/// [`Note::decrypt`]; cannot be used for output creation until a viewing
/// public key is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialNote {
    /// Recipient's master public key.
    pub master_public_key: Field,
    /// Token the note holds.
    pub token: TokenId,
    /// Note randomness.
    pub random: NoteRandom,
    /// Note value.
    pub value: u128,
}

impl PartialNote {
    /// Rebinds the recipient identity, completing the note.
    #[must_use]
    pub fn attach_viewing_key(self, viewing_public_key: [u8; 32]) -> Note {
        Note {
            master_public_key: self.master_public_key,
            viewing_public_key,
            token: self.token,
            random: self.random,
            value: self.value,
        }
    }
}

/// Persisted note shape: `{npk, token, value, encrypted_random}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedNote {
    /// Note public key.
    #[serde(with = "field_hex")]
    pub npk: Field,
    /// Token the note holds.
    pub token: TokenId,
    /// Note value.
    #[serde(with = "u128_hex")]
    pub value: u128,
    /// Note randomness sealed under the owner's viewing private key.
    pub encrypted_random: Ciphertext,
}

impl SerializedNote {
    /// Recovers the note randomness. Fails unless `viewing_private_key` is
    /// the key the randomness was sealed under.
    pub fn decrypt_random(&self, viewing_private_key: &[u8; 32]) -> Result<NoteRandom, NoteError> {
        let chunks = aes::decrypt(&self.encrypted_random, viewing_private_key)?;
        let [random] = chunks.as_slice() else {
            return Err(NoteError::MalformedPlaintext);
        };
        NoteRandom::from_slice(random)
    }

    /// Reconstructs the full note for the owning wallet. The master and
    /// viewing public keys are the owner's own identity, which is not part
    /// of the persisted shape.
    pub fn deserialize(
        &self,
        viewing_private_key: &[u8; 32],
        master_public_key: Field,
        viewing_public_key: [u8; 32],
    ) -> Result<Note, NoteError> {
        let random = self.decrypt_random(viewing_private_key)?;
        Ok(Note {
            master_public_key,
            viewing_public_key,
            token: self.token,
            random,
            value: self.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ed25519;

    fn address(seed: u8) -> AddressData {
        AddressData {
            master_public_key: Field::from(seed as u64 + 1000),
            viewing_public_key: ed25519::signing_key(&[seed; 32])
                .verifying_key()
                .to_bytes(),
            chain: None,
        }
    }

    fn note(seed: u8, value: u128) -> Note {
        Note::new(
            &address(seed),
            NoteRandom([seed; 16]),
            value,
            TokenId([0xAA; 20]),
        )
    }

    #[test]
    fn token_id_normalization() {
        let mut padded = [0u8; 32];
        padded[12..].copy_from_slice(&[0xBB; 20]);
        assert_eq!(TokenId::from_slice(&padded).unwrap(), TokenId([0xBB; 20]));
        assert_eq!(
            TokenId::from_slice(&[0x01, 0x02]).unwrap().0[18..],
            [0x01, 0x02]
        );
        assert!(matches!(
            TokenId::from_slice(&[1u8; 21]),
            Err(NoteError::InvalidTokenLength(21))
        ));
    }

    #[test]
    fn hash_binds_every_note_component() {
        let base = note(1, 100);
        let hash = base.hash().unwrap();
        assert_ne!(base.with_value(101).hash().unwrap(), hash);

        let other_random = Note::new(
            &address(1),
            NoteRandom([2; 16]),
            100,
            TokenId([0xAA; 20]),
        );
        assert_ne!(other_random.hash().unwrap(), hash);

        let other_token =
            Note::new(&address(1), NoteRandom([1; 16]), 100, TokenId([0xAB; 20]));
        assert_ne!(other_token.hash().unwrap(), hash);
    }

    #[test]
    fn encrypt_decrypt_round_trips_through_ecdh() {
        let sender = ed25519::signing_key(&[9; 32]);
        let receiver = ed25519::signing_key(&[2; 32]);
        let receiver_public = receiver.verifying_key().to_bytes();
        let original = note(2, 12345);

        let shared = ed25519::shared_key(&sender, &receiver_public).unwrap();
        let ciphertext = original.encrypt(&shared).unwrap();

        let receiver_shared = ed25519::shared_key(
            &receiver,
            &sender.verifying_key().to_bytes(),
        )
        .unwrap();
        let partial = Note::decrypt(&ciphertext, &receiver_shared).unwrap();
        assert_eq!(partial.master_public_key, original.master_public_key());
        assert_eq!(partial.token, original.token());
        assert_eq!(partial.random, original.random());
        assert_eq!(partial.value, original.value());

        let rebound = partial.attach_viewing_key(receiver_public);
        assert_eq!(rebound, original);
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let sender = ed25519::signing_key(&[9; 32]);
        let receiver_public = ed25519::signing_key(&[2; 32]).verifying_key().to_bytes();
        let shared = ed25519::shared_key(&sender, &receiver_public).unwrap();
        let ciphertext = note(2, 1).encrypt(&shared).unwrap();
        assert!(Note::decrypt(&ciphertext, &[0u8; 32]).is_err());
    }

    #[test]
    fn serialized_note_round_trips() {
        let original = note(3, 777);
        let viewing_private_key = [3u8; 32];
        let serialized = original.serialize(&viewing_private_key).unwrap();
        assert_eq!(serialized.npk, original.note_public_key().unwrap());
        assert_eq!(serialized.value, 777);

        let bytes = rmp_serde::to_vec(&serialized).unwrap();
        let decoded: SerializedNote = rmp_serde::from_slice(&bytes).unwrap();
        let rebuilt = decoded
            .deserialize(
                &viewing_private_key,
                original.master_public_key(),
                original.viewing_public_key(),
            )
            .unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn encrypted_random_rejects_other_keys() {
        let serialized = note(3, 777).serialize(&[3u8; 32]).unwrap();
        assert!(serialized.decrypt_random(&[4u8; 32]).is_err());
    }

    #[test]
    fn nullifiers_are_position_bound() {
        let nullifying_key = Field::from(555u64);
        let at_zero = Note::nullifier(&nullifying_key, 0).unwrap();
        let at_one = Note::nullifier(&nullifying_key, 1).unwrap();
        assert_ne!(at_zero, at_one);
        assert_eq!(Note::nullifier(&nullifying_key, 0).unwrap(), at_zero);
    }
}

//! On-chain commitment events, as delivered by the chain event source and
//! persisted by the merkle tree for the scanner.

use serde::{Deserialize, Serialize};

use crate::crypto::aes::Ciphertext;
use crate::crypto::Field;
use crate::error::CryptoError;
use crate::note::{Note, TokenId, TxId};
use crate::serialization::{field_hex, u128_hex};

/// A commitment leaf. Transfers arrive encrypted; shields arrive as an open
/// preimage with only the randomness sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Commitment {
    /// Ciphertext commitment from a shielded transfer.
    Encrypted(EncryptedCommitment),
    /// Preimage commitment from a shield.
    Preimage(PreimageCommitment),
}

impl Commitment {
    /// The leaf value inserted into the commitment tree.
    #[must_use]
    pub fn hash(&self) -> Field {
        match self {
            Commitment::Encrypted(commitment) => commitment.hash,
            Commitment::Preimage(commitment) => commitment.hash,
        }
    }

    /// Hash of the transaction that created this commitment.
    #[must_use]
    pub fn txid(&self) -> TxId {
        match self {
            Commitment::Encrypted(commitment) => commitment.txid,
            Commitment::Preimage(commitment) => commitment.txid,
        }
    }
}

/// Commitment whose note payload is sealed under an ECDH shared key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedCommitment {
    /// Leaf value.
    #[serde(with = "field_hex")]
    pub hash: Field,
    /// Creating transaction.
    pub txid: TxId,
    /// Sealed note payload.
    pub ciphertext: Ciphertext,
    /// Blinded sender and receiver viewing keys, in that order.
    pub ephemeral_keys: [[u8; 32]; 2],
    /// Sender's public key, for outgoing history.
    pub sender_public_key: [u8; 32],
}

/// Commitment whose preimage is public; only the randomness is sealed under
/// the owner's viewing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreimageCommitment {
    /// Leaf value.
    #[serde(with = "field_hex")]
    pub hash: Field,
    /// Creating transaction.
    pub txid: TxId,
    /// Open note preimage.
    pub preimage: CommitmentPreimage,
    /// Note randomness sealed under the owner's viewing private key.
    pub encrypted_random: Ciphertext,
}

/// The public part of a shield commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentPreimage {
    /// Note public key.
    #[serde(with = "field_hex")]
    pub npk: Field,
    /// Token the note holds.
    pub token: TokenId,
    /// Note value.
    #[serde(with = "u128_hex")]
    pub value: u128,
}

impl CommitmentPreimage {
    /// Computes the commitment hash of this preimage.
    pub fn hash(&self) -> Result<Field, CryptoError> {
        crate::crypto::poseidon(&[self.npk, self.token.to_field(), Field::from(self.value)])
    }
}

impl From<&Note> for CommitmentPreimage {
    fn from(note: &Note) -> Self {
        CommitmentPreimage {
            npk: note
                .note_public_key()
                .expect("two-input poseidon parameters exist"),
            token: note.token(),
            value: note.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressData;
    use crate::crypto::aes;
    use crate::note::NoteRandom;

    #[test]
    fn preimage_hash_matches_note_hash() {
        let address = AddressData {
            master_public_key: Field::from(5u64),
            viewing_public_key: [1u8; 32],
            chain: None,
        };
        let note = Note::new(&address, NoteRandom([2; 16]), 42, TokenId([3; 20]));
        let preimage = CommitmentPreimage::from(&note);
        assert_eq!(preimage.hash().unwrap(), note.hash().unwrap());
    }

    #[test]
    fn commitment_serde_round_trips() {
        let commitment = Commitment::Preimage(PreimageCommitment {
            hash: Field::from(9u64),
            txid: TxId([7; 32]),
            preimage: CommitmentPreimage {
                npk: Field::from(8u64),
                token: TokenId([1; 20]),
                value: 31337,
            },
            encrypted_random: aes::encrypt(&[&[5u8; 16]], &[6u8; 32]).unwrap(),
        });
        let bytes = rmp_serde::to_vec(&commitment).unwrap();
        let decoded: Commitment = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, commitment);
        assert_eq!(decoded.hash(), Field::from(9u64));
        assert_eq!(decoded.txid(), TxId([7; 32]));
    }
}

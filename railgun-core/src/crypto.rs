//! Cryptographic primitives shared by the note model, the commitment tree
//! and wallets.
//!
//! All field arithmetic runs in the SNARK scalar field (BN254). Field
//! elements serialize big-endian to 32 bytes and stringify as lowercase hex.

use ark_ff::{BigInteger, PrimeField};
use ark_std::UniformRand;
use light_poseidon::{Poseidon, PoseidonHasher};

use crate::error::CryptoError;

pub mod aes;
pub mod babyjubjub;
pub mod ed25519;

/// Element of the SNARK scalar field. Every commitment, nullifier and tree
/// node is one of these.
pub type Field = ark_bn254::Fr;

/// Poseidon hash with circuit-compatible parameters, selected by input
/// arity (1 through 12 inputs).
pub fn poseidon(inputs: &[Field]) -> Result<Field, CryptoError> {
    let mut hasher = Poseidon::<Field>::new_circom(inputs.len())?;
    Ok(hasher.hash(inputs)?)
}

/// `poseidon(left, right)`, the merkle tree node function.
pub fn hash_left_right(left: Field, right: Field) -> Result<Field, CryptoError> {
    poseidon(&[left, right])
}

/// Serializes a field element big-endian into 32 bytes.
#[must_use]
pub fn field_to_be_bytes(element: &Field) -> [u8; 32] {
    let bytes = element.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Interprets big-endian bytes as a field element, reducing modulo the SNARK
/// prime.
#[must_use]
pub fn field_from_be_bytes(bytes: &[u8]) -> Field {
    Field::from_be_bytes_mod_order(bytes)
}

/// Lowercase hex form of a field element, 64 characters.
#[must_use]
pub fn field_to_hex(element: &Field) -> String {
    hex::encode(field_to_be_bytes(element))
}

/// Parses the lowercase hex form produced by [`field_to_hex`].
pub fn field_from_hex(hex_str: &str) -> Result<Field, hex::FromHexError> {
    Ok(field_from_be_bytes(&hex::decode(hex_str)?))
}

/// Uniformly random element of the SNARK scalar field.
#[must_use]
pub fn random_scalar() -> Field {
    Field::rand(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poseidon_matches_circuit_parameters() {
        // Reference value for poseidon(1, 2) with the circom parameter set.
        let hash = poseidon(&[Field::from(1u64), Field::from(2u64)]).unwrap();
        let expected: Field =
            "7853200120776062878684798364095072458815029376092732009249414926327459813530"
                .parse()
                .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn poseidon_arity_changes_output() {
        let one = Field::from(1u64);
        assert_ne!(
            poseidon(&[one]).unwrap(),
            poseidon(&[one, one]).unwrap()
        );
    }

    #[test]
    fn field_bytes_round_trip() {
        let element = random_scalar();
        assert_eq!(field_from_be_bytes(&field_to_be_bytes(&element)), element);
        assert_eq!(field_from_hex(&field_to_hex(&element)).unwrap(), element);
    }

    #[test]
    fn field_hex_is_lowercase_and_padded() {
        let hex_str = field_to_hex(&Field::from(0xABu64));
        assert_eq!(hex_str.len(), 64);
        assert!(hex_str.ends_with("ab"));
        assert_eq!(hex_str, hex_str.to_lowercase());
    }

    #[test]
    fn random_scalars_are_distinct() {
        assert_ne!(random_scalar(), random_scalar());
    }
}

//! EdDSA-Poseidon over BabyJubJub, the spending-key signature scheme.
//!
//! BabyJubJub is an Edwards curve whose base field is the SNARK scalar
//! field, so public keys and signature points are directly consumable by the
//! proving circuit.

use ark_ec::{CurveGroup, PrimeGroup};
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective, Fr as SubgroupScalar};
use ark_ff::{BigInteger, PrimeField};
use sha2::{Digest, Sha512};

use super::{field_to_be_bytes, poseidon, Field};
use crate::error::CryptoError;

/// A BabyJubJub point as affine coordinates in the SNARK scalar field.
pub type Point = (Field, Field);

/// EdDSA-Poseidon signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Nonce commitment `r · G`.
    pub r8: Point,
    /// Response scalar, modulo the subgroup order.
    pub s: SubgroupScalar,
}

/// BabyJubJub spending keypair.
#[derive(Debug, Clone)]
pub struct SpendingKeypair {
    secret: SubgroupScalar,
    public: EdwardsAffine,
}

impl SpendingKeypair {
    /// Derives a keypair from 32 seed bytes. The seed is expanded with
    /// SHA-512 and reduced into the prime-order subgroup.
    #[must_use]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let digest = Sha512::digest(seed);
        let secret = SubgroupScalar::from_be_bytes_mod_order(&digest);
        let public = (EdwardsProjective::generator() * secret).into_affine();
        SpendingKeypair { secret, public }
    }

    /// Public key coordinates.
    #[must_use]
    pub fn public_key(&self) -> Point {
        (self.public.x, self.public.y)
    }

    /// Signs a field-element message with a deterministic nonce.
    pub fn sign(&self, message: &[Field]) -> Result<Signature, CryptoError> {
        let mut hasher = Sha512::new();
        hasher.update(self.secret.into_bigint().to_bytes_be());
        for element in message {
            hasher.update(field_to_be_bytes(element));
        }
        let nonce = SubgroupScalar::from_be_bytes_mod_order(&hasher.finalize());

        let r8 = (EdwardsProjective::generator() * nonce).into_affine();
        let challenge = challenge(&r8, &self.public, message)?;
        let s = nonce + challenge * self.secret;
        Ok(Signature {
            r8: (r8.x, r8.y),
            s,
        })
    }
}

/// Verifies `signature` over `message` for `public_key`. Returns `Ok(false)`
/// for a well-formed but incorrect signature and an error for points that
/// are not on the curve.
pub fn verify(
    public_key: Point,
    message: &[Field],
    signature: &Signature,
) -> Result<bool, CryptoError> {
    let public = decode_point(public_key)?;
    let r8 = decode_point(signature.r8)?;
    let challenge = challenge(&r8, &public, message)?;
    let lhs = EdwardsProjective::generator() * signature.s;
    let rhs = EdwardsProjective::from(r8) + EdwardsProjective::from(public) * challenge;
    Ok(lhs == rhs)
}

/// Poseidon challenge over the nonce commitment, public key and message.
fn challenge(
    r8: &EdwardsAffine,
    public: &EdwardsAffine,
    message: &[Field],
) -> Result<SubgroupScalar, CryptoError> {
    let mut inputs = vec![r8.x, r8.y, public.x, public.y];
    inputs.extend_from_slice(message);
    let digest = poseidon(&inputs)?;
    Ok(SubgroupScalar::from_be_bytes_mod_order(&field_to_be_bytes(
        &digest,
    )))
}

fn decode_point(point: Point) -> Result<EdwardsAffine, CryptoError> {
    let affine = EdwardsAffine::new_unchecked(point.0, point.1);
    if !affine.is_on_curve() || !affine.is_in_correct_subgroup_assuming_on_curve() {
        return Err(CryptoError::InvalidPublicKey);
    }
    Ok(affine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let keypair = SpendingKeypair::from_seed(&[42u8; 32]);
        let message = [Field::from(7u64), Field::from(11u64)];
        let signature = keypair.sign(&message).unwrap();
        assert!(verify(keypair.public_key(), &message, &signature).unwrap());
    }

    #[test]
    fn wrong_message_rejected() {
        let keypair = SpendingKeypair::from_seed(&[42u8; 32]);
        let signature = keypair.sign(&[Field::from(7u64)]).unwrap();
        assert!(!verify(keypair.public_key(), &[Field::from(8u64)], &signature).unwrap());
    }

    #[test]
    fn wrong_key_rejected() {
        let keypair = SpendingKeypair::from_seed(&[42u8; 32]);
        let other = SpendingKeypair::from_seed(&[43u8; 32]);
        let message = [Field::from(7u64)];
        let signature = keypair.sign(&message).unwrap();
        assert!(!verify(other.public_key(), &message, &signature).unwrap());
    }

    #[test]
    fn off_curve_key_rejected() {
        let keypair = SpendingKeypair::from_seed(&[1u8; 32]);
        let signature = keypair.sign(&[Field::from(1u64)]).unwrap();
        let bogus = (Field::from(3u64), Field::from(4u64));
        assert!(matches!(
            verify(bogus, &[Field::from(1u64)], &signature),
            Err(CryptoError::InvalidPublicKey)
        ));
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = SpendingKeypair::from_seed(&[9u8; 32]);
        let b = SpendingKeypair::from_seed(&[9u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
    }
}

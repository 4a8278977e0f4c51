//! Viewing-key operations: Ed25519 signing, X25519 shared-key derivation and
//! ephemeral-key blinding.
//!
//! Viewing keypairs are Ed25519. Shared keys multiply the signer's scalar
//! into the counterparty's Montgomery point; blinded ephemeral keys live in
//! Montgomery form so unblinding is a scalar-inverse multiplication.

use curve25519_dalek::{MontgomeryPoint, Scalar};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// Builds a signing key from 32 seed bytes.
#[must_use]
pub fn signing_key(seed: &[u8; 32]) -> SigningKey {
    SigningKey::from_bytes(seed)
}

/// Signs `message`, returning the 64-byte signature.
#[must_use]
pub fn sign(key: &SigningKey, message: &[u8]) -> [u8; 64] {
    key.sign(message).to_bytes()
}

/// Verifies a signature. Malformed public keys are rejected with
/// [`CryptoError::InvalidPublicKey`]; a well-formed key with a bad signature
/// returns `Ok(false)`.
pub fn verify(
    public_key: &[u8; 32],
    message: &[u8],
    signature: &[u8; 64],
) -> Result<bool, CryptoError> {
    let key = VerifyingKey::from_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    Ok(key.verify(message, &Signature::from_bytes(signature)).is_ok())
}

/// Converts an Ed25519 public key to its Montgomery form for shared-key
/// derivation and blinding.
pub fn ecdh_public_key(public_key: &[u8; 32]) -> Result<[u8; 32], CryptoError> {
    let key = VerifyingKey::from_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    Ok(key.to_montgomery().to_bytes())
}

/// Shared key with a peer identified by an Ed25519 public key:
/// `own_scalar · peer_point`. Symmetric between the two parties.
pub fn shared_key(key: &SigningKey, peer_public_key: &[u8; 32]) -> Result<[u8; 32], CryptoError> {
    let peer = MontgomeryPoint(ecdh_public_key(peer_public_key)?);
    Ok((peer * key.to_scalar()).to_bytes())
}

/// Shared key with a counterparty through a blinded ephemeral key (already
/// in Montgomery form): `own_scalar · ephemeral_point`.
#[must_use]
pub fn shared_key_from_ephemeral(key: &SigningKey, ephemeral_key: &[u8; 32]) -> [u8; 32] {
    (MontgomeryPoint(*ephemeral_key) * key.to_scalar()).to_bytes()
}

/// Blinds the sender and receiver viewing public keys with a scalar derived
/// from the note randomness, returning `(r·A, r·B)` in Montgomery form.
pub fn blind_ephemeral_keys(
    sender_public_key: &[u8; 32],
    receiver_public_key: &[u8; 32],
    random: &[u8; 16],
) -> Result<([u8; 32], [u8; 32]), CryptoError> {
    let blind = blinding_scalar(random)?;
    let sender = MontgomeryPoint(ecdh_public_key(sender_public_key)?);
    let receiver = MontgomeryPoint(ecdh_public_key(receiver_public_key)?);
    Ok(((sender * blind).to_bytes(), (receiver * blind).to_bytes()))
}

/// Inverse of [`blind_ephemeral_keys`] for one key: multiplies by the
/// inverted blinding scalar, recovering the Montgomery form of the original
/// public key.
pub fn unblind_ephemeral_key(
    blinded_key: &[u8; 32],
    random: &[u8; 16],
) -> Result<[u8; 32], CryptoError> {
    let blind = blinding_scalar(random)?;
    Ok((MontgomeryPoint(*blinded_key) * blind.invert()).to_bytes())
}

fn blinding_scalar(random: &[u8; 16]) -> Result<Scalar, CryptoError> {
    let scalar = Scalar::from_bytes_mod_order(Sha256::digest(random).into());
    if scalar == Scalar::ZERO {
        return Err(CryptoError::NonInvertibleBlind);
    }
    Ok(scalar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair(seed: u8) -> (SigningKey, [u8; 32]) {
        let key = signing_key(&[seed; 32]);
        let public = key.verifying_key().to_bytes();
        (key, public)
    }

    #[test]
    fn sign_verify_round_trip() {
        let (key, public) = keypair(1);
        let signature = sign(&key, b"message");
        assert!(verify(&public, b"message", &signature).unwrap());
        assert!(!verify(&public, b"other", &signature).unwrap());
    }

    #[test]
    fn malformed_public_key_rejected() {
        let (key, _) = keypair(1);
        let signature = sign(&key, b"message");
        // Not a valid compressed Edwards point.
        let bogus = [0xffu8; 32];
        assert!(matches!(
            verify(&bogus, b"message", &signature),
            Err(CryptoError::InvalidPublicKey)
        ));
    }

    #[test]
    fn shared_keys_are_symmetric() {
        let (alice, alice_public) = keypair(3);
        let (bob, bob_public) = keypair(4);
        assert_eq!(
            shared_key(&alice, &bob_public).unwrap(),
            shared_key(&bob, &alice_public).unwrap()
        );
    }

    #[test]
    fn blind_unblind_round_trip() {
        let (_, alice_public) = keypair(5);
        let (_, bob_public) = keypair(6);
        let random = [7u8; 16];
        let (blinded_a, blinded_b) =
            blind_ephemeral_keys(&alice_public, &bob_public, &random).unwrap();
        assert_eq!(
            unblind_ephemeral_key(&blinded_a, &random).unwrap(),
            ecdh_public_key(&alice_public).unwrap()
        );
        assert_eq!(
            unblind_ephemeral_key(&blinded_b, &random).unwrap(),
            ecdh_public_key(&bob_public).unwrap()
        );
    }

    #[test]
    fn blinded_shared_keys_agree() {
        let (sender, sender_public) = keypair(8);
        let (receiver, receiver_public) = keypair(9);
        let random = [1u8; 16];
        let (blinded_sender, blinded_receiver) =
            blind_ephemeral_keys(&sender_public, &receiver_public, &random).unwrap();

        // Each side multiplies its own scalar into the other party's blinded
        // key.
        let sender_shared = shared_key_from_ephemeral(&sender, &blinded_receiver);
        let receiver_shared = shared_key_from_ephemeral(&receiver, &blinded_sender);
        assert_eq!(sender_shared, receiver_shared);
    }
}

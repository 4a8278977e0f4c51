//! Chunked AES-256-GCM.
//!
//! Note payloads are encrypted as a list of plaintext chunks sealed in a
//! single GCM stream; chunk boundaries are preserved so callers get the same
//! list shape back on decryption.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Sealed chunk list. `data` holds one ciphertext segment per plaintext
/// chunk; the tag authenticates the whole stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    /// GCM nonce.
    pub iv: [u8; 12],
    /// GCM authentication tag.
    pub tag: [u8; 16],
    /// Ciphertext segments, same lengths as the plaintext chunks.
    pub data: Vec<Vec<u8>>,
}

/// Encrypts `chunks` under `key` with a random nonce.
pub fn encrypt(chunks: &[&[u8]], key: &[u8; 32]) -> Result<Ciphertext, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut iv = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut iv);

    let plaintext = chunks.concat();
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_slice())
        .map_err(|_| CryptoError::Encryption)?;
    let tag_offset = sealed.len() - 16;
    let tag: [u8; 16] = sealed[tag_offset..]
        .try_into()
        .expect("gcm tag is 16 bytes");
    sealed.truncate(tag_offset);

    let mut data = Vec::with_capacity(chunks.len());
    let mut cursor = 0;
    for chunk in chunks {
        data.push(sealed[cursor..cursor + chunk.len()].to_vec());
        cursor += chunk.len();
    }
    Ok(Ciphertext { iv, tag, data })
}

/// Decrypts a [`Ciphertext`] under `key`, returning the original chunk list.
/// Fails if the key is wrong or any segment was altered.
pub fn decrypt(ciphertext: &Ciphertext, key: &[u8; 32]) -> Result<Vec<Vec<u8>>, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut sealed = ciphertext.data.concat();
    sealed.extend_from_slice(&ciphertext.tag);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&ciphertext.iv), sealed.as_slice())
        .map_err(|_| CryptoError::Decryption)?;

    let mut chunks = Vec::with_capacity(ciphertext.data.len());
    let mut cursor = 0;
    for segment in &ciphertext.data {
        chunks.push(plaintext[cursor..cursor + segment.len()].to_vec());
        cursor += segment.len();
    }
    Ok(chunks)
}

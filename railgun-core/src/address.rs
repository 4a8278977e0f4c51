//! Shielded address codec.
//!
//! Addresses are bech32m strings whose human-readable prefix names the chain
//! family and whose payload is the 64-byte concatenation of the master
//! public key and the viewing public key.

use bech32::{Bech32m, Hrp};

use crate::chain::{Chain, ChainFamily};
use crate::crypto::{field_from_be_bytes, field_to_be_bytes, Field};
use crate::error::AddressError;

/// The identity a note can be addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressData {
    /// Spending identity.
    pub master_public_key: Field,
    /// Ed25519 viewing public key.
    pub viewing_public_key: [u8; 32],
    /// Chain binding; `None` encodes with the `rgany` prefix.
    pub chain: Option<Chain>,
}

impl AddressData {
    /// Encodes to the human-readable address string.
    pub fn encode(&self) -> Result<String, AddressError> {
        let prefix = ChainFamily::from_chain(self.chain).address_prefix();
        let hrp = Hrp::parse(prefix).expect("static prefixes are valid hrps");
        let mut payload = field_to_be_bytes(&self.master_public_key).to_vec();
        payload.extend_from_slice(&self.viewing_public_key);
        bech32::encode::<Bech32m>(hrp, &payload).map_err(|e| AddressError::Bech32(e.to_string()))
    }

    /// Decodes an address string, validating prefix and payload length.
    pub fn decode(address: &str) -> Result<Self, AddressError> {
        let (hrp, payload) =
            bech32::decode(address).map_err(|e| AddressError::Bech32(e.to_string()))?;
        let prefix = hrp.to_string().to_lowercase();
        let family = ChainFamily::from_prefix(&prefix)
            .ok_or(AddressError::UnknownPrefix(prefix))?;
        if payload.len() != 64 {
            return Err(AddressError::InvalidPayloadLength(payload.len()));
        }
        Ok(AddressData {
            master_public_key: field_from_be_bytes(&payload[..32]),
            viewing_public_key: payload[32..]
                .try_into()
                .expect("payload length checked above"),
            chain: family.chain(),
        })
    }
}

impl std::fmt::Display for AddressData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.encode() {
            Ok(encoded) => write!(f, "{encoded}"),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

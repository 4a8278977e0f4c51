//! Serde helpers for field elements and wide integers inside persisted
//! values. Both serialize as lowercase hex strings.

/// Serializes a [`crate::crypto::Field`] as a 64-character lowercase hex
/// string. Use with `#[serde(with = "...")]`.
pub mod field_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::crypto::{field_from_hex, field_to_hex, Field};

    /// Serializes `element` as hex.
    pub fn serialize<S: Serializer>(element: &Field, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&field_to_hex(element))
    }

    /// Deserializes a hex string into a field element.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Field, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        field_from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// Serializes a `u128` value as a minimal lowercase hex string.
/// MessagePack has no 128-bit integer representation.
pub mod u128_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes `value` as hex.
    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:x}"))
    }

    /// Deserializes a hex string into a `u128`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        u128::from_str_radix(&hex_str, 16).map_err(serde::de::Error::custom)
    }
}

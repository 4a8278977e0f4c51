//! Chain identity and the address-family prefix table.

use serde::{Deserialize, Serialize};

/// Identifies the chain a wallet or tree is bound to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Chain {
    /// Chain id as reported by the chain itself.
    pub id: u64,
}

impl Chain {
    /// Creates a `Chain` from a raw chain id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Chain { id }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Closed set of address families. Each family owns one human-readable
/// address prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFamily {
    /// Ethereum mainnet.
    Ethereum,
    /// Binance Smart Chain.
    BinanceSmartChain,
    /// Not bound to any particular chain.
    Any,
}

impl ChainFamily {
    /// Maps a chain binding to its address family. Unknown ids fall back to
    /// [`ChainFamily::Any`].
    #[must_use]
    pub fn from_chain(chain: Option<Chain>) -> Self {
        match chain.map(|chain| chain.id) {
            Some(1) => ChainFamily::Ethereum,
            Some(56) => ChainFamily::BinanceSmartChain,
            _ => ChainFamily::Any,
        }
    }

    /// Human-readable address prefix for this family.
    #[must_use]
    pub fn address_prefix(&self) -> &'static str {
        match self {
            ChainFamily::Ethereum => "rgeth",
            ChainFamily::BinanceSmartChain => "rgbsc",
            ChainFamily::Any => "rgany",
        }
    }

    /// Inverse of [`ChainFamily::address_prefix`].
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "rgeth" => Some(ChainFamily::Ethereum),
            "rgbsc" => Some(ChainFamily::BinanceSmartChain),
            "rgany" => Some(ChainFamily::Any),
            _ => None,
        }
    }

    /// Representative chain binding for this family. The payload does not
    /// carry the exact id, so decoding recovers the family representative.
    #[must_use]
    pub fn chain(&self) -> Option<Chain> {
        match self {
            ChainFamily::Ethereum => Some(Chain::new(1)),
            ChainFamily::BinanceSmartChain => Some(Chain::new(56)),
            ChainFamily::Any => None,
        }
    }
}

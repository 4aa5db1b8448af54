use {
    super::TokenAddress,
    alloy::primitives::{address, Address},
};

/// The well-known sentinel address used by metadata and routing services to
/// denote a chain's native asset.
pub const NATIVE_SENTINEL: Address = Address::repeat_byte(0xee);

/// A supported EVM chain ID.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChainId {
    Mainnet = 1,
    Optimism = 10,
    Polygon = 137,
    Base = 8453,
    ArbitrumOne = 42161,
}

impl ChainId {
    pub fn new(value: u64) -> Result<Self, UnsupportedChain> {
        match value {
            1 => Ok(Self::Mainnet),
            10 => Ok(Self::Optimism),
            137 => Ok(Self::Polygon),
            8453 => Ok(Self::Base),
            42161 => Ok(Self::ArbitrumOne),
            _ => Err(UnsupportedChain(value)),
        }
    }

    /// Returns the chain ID as a numeric value.
    pub fn value(self) -> u64 {
        self as u64
    }

    /// Returns the symbol of the chain's native asset.
    pub fn native_symbol(self) -> &'static str {
        match self {
            Self::Polygon => "POL",
            _ => "ETH",
        }
    }

    /// Returns the number of decimals of the chain's native asset.
    pub fn native_decimals(self) -> u8 {
        18
    }

    /// Returns the address of the canonical wrapped-native ERC20 token for
    /// the chain.
    pub fn wrapped_native(self) -> TokenAddress {
        TokenAddress(match self {
            Self::Mainnet => address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            Self::Optimism | Self::Base => address!("0x4200000000000000000000000000000000000006"),
            Self::Polygon => address!("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
            Self::ArbitrumOne => address!("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported chain {0}")]
pub struct UnsupportedChain(pub u64);

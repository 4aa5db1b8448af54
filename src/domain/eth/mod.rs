mod chain;

pub use {
    self::chain::{ChainId, UnsupportedChain, NATIVE_SENTINEL},
    alloy::primitives::{Address, U256},
};

use crate::util;

/// A contract address.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContractAddress(pub Address);

/// An ERC20 token address.
///
/// https://eips.ethereum.org/EIPS/eip-20
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TokenAddress(pub Address);

/// An amount of the chain's native asset in its smallest unit.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ether(pub U256);

/// Gas amount in gas units.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Gas(pub U256);

/// An on-chain call prepared for an external executor. The engine only builds
/// and sequences these, it never submits them.
#[derive(Clone, Eq, PartialEq)]
pub struct Call {
    /// The address that gets called on-chain.
    pub to: ContractAddress,
    /// The native value sent along with the call.
    pub value: Ether,
    /// The associated calldata for the on-chain call.
    pub calldata: Vec<u8>,
}

impl std::fmt::Debug for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Call")
            .field("to", &self.to)
            .field("value", &self.value)
            .field("calldata", &util::fmt::Hex(&self.calldata))
            .finish()
    }
}

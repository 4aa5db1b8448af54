//! Slippage tolerance computation. The automatic tolerance is a configurable
//! policy over route characteristics; a user-set custom tolerance always wins
//! unconditionally.

use {
    crate::{domain::trade, util::conv},
    bigdecimal::{BigDecimal, ToPrimitive},
    num::{BigUint, Integer, Zero},
    serde::Deserialize,
    std::cmp,
};

/// A relative slippage tolerance. Valid values are fractions in `[0, 1]`.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct Slippage(BigDecimal);

impl Slippage {
    /// Creates a new tolerance. Returns `None` if the value is outside the
    /// valid range.
    pub fn new(value: BigDecimal) -> Option<Self> {
        (value >= Zero::zero() && value <= BigDecimal::from(1)).then_some(Self(value))
    }

    pub fn one_percent() -> Self {
        Self("0.01".parse().unwrap())
    }

    /// Adds the tolerance to the specified token amount, saturating.
    pub fn add(&self, amount: alloy::primitives::U256) -> alloy::primitives::U256 {
        amount.saturating_add(self.abs(&amount))
    }

    /// Subtracts the tolerance from the specified token amount, saturating.
    pub fn sub(&self, amount: alloy::primitives::U256) -> alloy::primitives::U256 {
        amount.saturating_sub(self.abs(&amount))
    }

    /// Returns the absolute tolerance amount, rounding up.
    fn abs(&self, amount: &alloy::primitives::U256) -> alloy::primitives::U256 {
        let amount = conv::u256_to_biguint(amount);
        let (int, exp) = self.0.as_bigint_and_exponent();

        let numer = amount * int.to_biguint().expect("non-negative by construction");
        let denom = BigUint::from(10_u8).pow(exp.unsigned_abs().try_into().unwrap_or(u32::MAX));

        let abs = numer.div_ceil(&denom);
        conv::biguint_to_u256(&abs).unwrap_or(alloy::primitives::U256::MAX)
    }

    /// Converts the tolerance factor into basis points.
    pub fn as_bps(&self) -> Option<u16> {
        (&self.0 * BigDecimal::from(10000)).to_u16()
    }
}

/// The policy for computing an automatic slippage tolerance from a trade's
/// route characteristics. The exact formula is deliberately configuration,
/// not a constant: single-hop routes get the base tolerance, every additional
/// hop widens it by a fixed increment, and the result is capped.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct AutoSlippage {
    /// Base tolerance applied to single-hop routes.
    base: BigDecimal,
    /// Additional tolerance per route hop beyond the first.
    per_hop: BigDecimal,
    /// Upper bound on the automatic tolerance.
    max: BigDecimal,
}

impl Default for AutoSlippage {
    fn default() -> Self {
        Self {
            base: "0.005".parse().unwrap(),
            per_hop: "0.0025".parse().unwrap(),
            max: "0.025".parse().unwrap(),
        }
    }
}

impl AutoSlippage {
    pub fn new(base: BigDecimal, per_hop: BigDecimal, max: BigDecimal) -> Option<Self> {
        (base >= Zero::zero() && per_hop >= Zero::zero() && max >= base).then_some(Self {
            base,
            per_hop,
            max,
        })
    }

    /// Computes the tolerance to use for the given trade.
    pub fn for_trade(&self, trade: &trade::Trade) -> Slippage {
        let extra_hops = trade.route.len().saturating_sub(1);
        let value = &self.base + &self.per_hop * BigDecimal::from(extra_hops as u64);
        Slippage(cmp::min(value, self.max.clone()))
    }

    /// The tolerance used while no trade is available.
    pub fn base(&self) -> Slippage {
        Slippage(self.base.clone())
    }
}

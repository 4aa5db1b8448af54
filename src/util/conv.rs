//! Conversion utilities between on-chain integer amounts and exact decimal
//! representations.

use {
    alloy::primitives::U256,
    bigdecimal::{num_bigint::ToBigInt, BigDecimal},
    num::{BigInt, BigUint},
};

pub fn biguint_to_u256(i: &BigUint) -> Option<U256> {
    let bytes = i.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }
    Some(U256::from_be_slice(&bytes))
}

pub fn u256_to_biguint(i: &U256) -> BigUint {
    BigUint::from_bytes_be(&i.to_be_bytes::<32>())
}

pub fn bigint_to_u256(i: &BigInt) -> Option<U256> {
    if i.sign() == num::bigint::Sign::Minus {
        return None;
    }
    biguint_to_u256(i.magnitude())
}

/// Converts a raw token amount in its smallest unit into a decimal value in
/// whole token units.
pub fn amount_to_decimal(amount: &U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(u256_to_biguint(amount).into(), i64::from(decimals))
}

/// Converts a decimal value in whole token units into a raw amount in the
/// token's smallest unit. Fractional dust beyond the token's precision is
/// truncated. Returns `None` for negative values or amounts that overflow a
/// `U256`.
pub fn decimal_to_amount(value: &BigDecimal, decimals: u8) -> Option<U256> {
    let scaled = value * BigDecimal::new(BigInt::from(1), -i64::from(decimals));
    bigint_to_u256(&scaled.to_bigint()?)
}

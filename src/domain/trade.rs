//! The normalized trade object produced from a raw routing-API quote. A trade
//! supersedes any previous trade wholesale; it is never patched in place.

use {
    crate::domain::{
        currency::{Currency, CurrencyAmount},
        eth,
    },
    bigdecimal::BigDecimal,
    num::{One, Zero},
};

/// The trade direction: which side of the swap the user specified exactly.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TradeType {
    /// A fixed input amount and a derived output amount.
    ExactInput,
    /// A fixed output amount and a derived input amount.
    ExactOutput,
}

/// A single pool hop of a route.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Leg {
    pub pool: eth::ContractAddress,
    pub token_in: eth::TokenAddress,
    pub token_out: eth::TokenAddress,
    /// The pool's pre-trade spot price of the output token in terms of the
    /// input token, in whole token units.
    pub spot_price: BigDecimal,
}

/// A normalized trade derived from a routing-API quote. Immutable once
/// constructed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trade {
    pub trade_type: TradeType,
    pub input: CurrencyAmount,
    pub output: CurrencyAmount,
    /// The ordered pool legs of the primary route path.
    pub route: Vec<Leg>,
    /// Fractional degradation of the execution price versus the route's
    /// pre-trade midpoint price. `0.03` means 3%.
    pub price_impact: BigDecimal,
    /// Indicative gas estimate in gas units for executing the swap.
    pub gas: eth::Gas,
    /// The prepared router call, when the quote included one. Absent while a
    /// refreshed quote is still being finalized.
    pub swap_call: Option<eth::Call>,
}

impl Trade {
    /// Returns the amount of the trade corresponding to the given side.
    pub fn amount_of(&self, currency: &Currency) -> Option<&CurrencyAmount> {
        [&self.input, &self.output]
            .into_iter()
            .find(|amount| amount.currency.same_as(currency))
    }
}

/// A failed quote, categorized. This is the tagged surface the warning
/// evaluator matches on; raw transport errors never escape the quote client.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("no route found for the requested pair")]
    NoRoute,
    #[error("rate limited by the routing service")]
    RateLimited,
    #[error("routing service error: {0}")]
    Other(String),
}

/// Computes the price impact of a trade as `1 - execution_price / mid_price`.
/// The mid price is the product of the route legs' spot prices. Returns zero
/// when the route carries no usable price information or the amounts are
/// degenerate, so that missing reference data never blocks a swap.
pub fn price_impact(input: &CurrencyAmount, output: &CurrencyAmount, route: &[Leg]) -> BigDecimal {
    let amount_in = input.to_decimal();
    let amount_out = output.to_decimal();
    if amount_in.is_zero() || amount_out.is_zero() || route.is_empty() {
        return BigDecimal::zero();
    }

    let mid_price = route
        .iter()
        .fold(BigDecimal::one(), |acc, leg| acc * leg.spot_price.clone());
    if mid_price.is_zero() {
        return BigDecimal::zero();
    }

    let execution_price = amount_out / amount_in;
    BigDecimal::one() - execution_price / mid_price
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{currency::Safety, eth::ChainId},
        alloy::primitives::{Address, U256},
    };

    fn currency(decimals: u8, last_byte: u8) -> Currency {
        Currency {
            chain: ChainId::Mainnet,
            address: Some(eth::TokenAddress(Address::with_last_byte(last_byte))),
            decimals,
            symbol: format!("T{last_byte}"),
            safety: Safety::Unknown,
        }
    }

    fn leg(spot_price: &str) -> Leg {
        Leg {
            pool: eth::ContractAddress(Address::with_last_byte(0xff)),
            token_in: eth::TokenAddress(Address::with_last_byte(1)),
            token_out: eth::TokenAddress(Address::with_last_byte(2)),
            spot_price: spot_price.parse().unwrap(),
        }
    }

    #[test]
    fn price_impact_against_midpoint() {
        // Mid price 2000, execution price 1900: impact of 5%.
        let input = CurrencyAmount::new(currency(18, 1), U256::from(10).pow(U256::from(18)));
        let output = CurrencyAmount::new(currency(6, 2), U256::from(1_900_000_000_u64));

        let impact = price_impact(&input, &output, &[leg("2000")]);
        assert_eq!(impact, "0.05".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn price_impact_multiplies_leg_prices() {
        // Two legs at 40 and 50 give a mid price of 2000.
        let input = CurrencyAmount::new(currency(18, 1), U256::from(10).pow(U256::from(18)));
        let output = CurrencyAmount::new(currency(6, 2), U256::from(1_940_000_000_u64));

        let impact = price_impact(&input, &output, &[leg("40"), leg("50")]);
        assert_eq!(impact, "0.03".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn degenerate_inputs_have_no_impact() {
        let input = CurrencyAmount::new(currency(18, 1), U256::ZERO);
        let output = CurrencyAmount::new(currency(6, 2), U256::from(1_000_000_u64));

        assert_eq!(price_impact(&input, &output, &[leg("2000")]), BigDecimal::zero());
        let input = CurrencyAmount::new(currency(18, 1), U256::from(1));
        assert_eq!(price_impact(&input, &output, &[]), BigDecimal::zero());
    }
}

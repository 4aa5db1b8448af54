//! Currency descriptors and decimal-aware token amounts. A currency is either
//! a chain's native asset or an ERC20 token; both sides of a swap form are
//! addressed through the [`CurrencyField`] of the form they occupy.

use {
    crate::{domain::eth, util::conv},
    bigdecimal::BigDecimal,
};

/// The two sides of a swap form. Exactly one of them is "exact" at any time,
/// meaning its amount was entered by the user; the other side is always
/// derived.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CurrencyField {
    Input,
    Output,
}

impl CurrencyField {
    /// Returns the opposite side of the form.
    pub fn other(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// A pair of values indexed by [`CurrencyField`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pair<T> {
    pub input: T,
    pub output: T,
}

impl<T> Pair<T> {
    pub fn new(input: T, output: T) -> Self {
        Self { input, output }
    }

    pub fn get(&self, field: CurrencyField) -> &T {
        match field {
            CurrencyField::Input => &self.input,
            CurrencyField::Output => &self.output,
        }
    }

    pub fn get_mut(&mut self, field: CurrencyField) -> &mut T {
        match field {
            CurrencyField::Input => &mut self.input,
            CurrencyField::Output => &mut self.output,
        }
    }

    /// Swaps the input and output values in place.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.input, &mut self.output);
    }
}

/// Uniquely identifies a currency for resolution and caching. `None` for the
/// address denotes the chain's native asset.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CurrencyId {
    pub chain: eth::ChainId,
    pub address: Option<eth::TokenAddress>,
}

impl CurrencyId {
    pub fn native(chain: eth::ChainId) -> Self {
        Self {
            chain,
            address: None,
        }
    }

    pub fn token(chain: eth::ChainId, address: eth::TokenAddress) -> Self {
        Self {
            chain,
            address: Some(address),
        }
    }
}

/// Trading safety classification of a currency, as reported by an external
/// token protection service.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Safety {
    Blocked,
    Trusted,
    #[default]
    Unknown,
}

/// An immutable currency descriptor resolved from reference data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Currency {
    pub chain: eth::ChainId,
    /// `None` for the chain's native asset.
    pub address: Option<eth::TokenAddress>,
    pub decimals: u8,
    pub symbol: String,
    pub safety: Safety,
}

impl Currency {
    /// Creates the descriptor for a chain's native asset.
    pub fn native(chain: eth::ChainId) -> Self {
        Self {
            chain,
            address: None,
            decimals: chain.native_decimals(),
            symbol: chain.native_symbol().to_string(),
            safety: Safety::Trusted,
        }
    }

    pub fn id(&self) -> CurrencyId {
        CurrencyId {
            chain: self.chain,
            address: self.address,
        }
    }

    pub fn is_native(&self) -> bool {
        self.address.is_none()
    }

    /// Returns `true` if this is the canonical wrapped-native token of its
    /// chain.
    pub fn is_wrapped_native(&self) -> bool {
        self.address == Some(self.chain.wrapped_native())
    }

    /// Returns `true` if both descriptors denote the same currency. Metadata
    /// differences are irrelevant for identity.
    pub fn same_as(&self, other: &Currency) -> bool {
        self.chain == other.chain && self.address == other.address
    }
}

/// An amount of a particular currency in its smallest unit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CurrencyAmount {
    pub currency: Currency,
    pub amount: eth::U256,
}

impl CurrencyAmount {
    pub fn new(currency: Currency, amount: eth::U256) -> Self {
        Self { currency, amount }
    }

    /// Parses a human-entered decimal string into an amount of the given
    /// currency. Returns `None` for empty, malformed or negative input, and
    /// for values that overflow the currency's representable range. Excess
    /// fractional digits are truncated.
    pub fn parse(value: &str, currency: &Currency) -> Option<Self> {
        let value: BigDecimal = value.trim().parse().ok()?;
        let amount = conv::decimal_to_amount(&value, currency.decimals)?;
        Some(Self {
            currency: currency.clone(),
            amount,
        })
    }

    /// Returns the amount in whole currency units.
    pub fn to_decimal(&self) -> BigDecimal {
        conv::amount_to_decimal(&self.amount, self.currency.decimals)
    }

    /// Mirrors this amount onto another currency at a 1:1 ratio, adjusting
    /// only for a difference in decimals. This is how wrap and unwrap amounts
    /// are derived without a price lookup.
    pub fn mirror(&self, currency: &Currency) -> Option<Self> {
        let amount = conv::decimal_to_amount(&self.to_decimal(), currency.decimals)?;
        Some(Self {
            currency: currency.clone(),
            amount,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

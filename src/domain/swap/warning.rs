//! Validation and warning evaluation over a derived swap state. A pure list
//! build per call: warnings are never persisted or incrementally updated, and
//! all applicable warnings are returned together.

use {
    crate::domain::{currency::Safety, eth, swap::DerivedSwapInfo, trade::QuoteError},
    bigdecimal::BigDecimal,
    serde::Deserialize,
};

/// The kind of a swap warning.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    NetworkError,
    InsufficientFunds,
    InsufficientGasFunds,
    LowLiquidity,
    RateLimit,
    SwapRouterError,
    FormIncomplete,
    PriceImpactMedium,
    PriceImpactHigh,
    BlockedToken,
}

/// How strongly the warning should be surfaced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    None,
    Medium,
    High,
}

/// What the consuming UI should do about the warning. The engine classifies,
/// it makes no UI decisions itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Submission must be blocked while the warning applies.
    DisableReview,
    /// The user may proceed but must be cautioned first.
    WarnBeforeSubmit,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Warning {
    pub kind: Kind,
    pub severity: Severity,
    pub action: Action,
    pub title: String,
    pub message: String,
}

/// Price impact thresholds as fractions. High supersedes medium.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct PriceImpactThresholds {
    pub medium: BigDecimal,
    pub high: BigDecimal,
}

impl Default for PriceImpactThresholds {
    fn default() -> Self {
        Self {
            medium: "0.03".parse().unwrap(),
            high: "0.05".parse().unwrap(),
        }
    }
}

/// Evaluates all applicable warnings for a derived swap state, in a stable
/// order. `gas_fee` is the estimated network fee in the chain's native unit,
/// when known.
pub fn evaluate(
    info: &DerivedSwapInfo,
    is_offline: bool,
    gas_fee: Option<eth::Ether>,
    thresholds: &PriceImpactThresholds,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if is_offline {
        warnings.push(Warning {
            kind: Kind::NetworkError,
            severity: Severity::Medium,
            action: Action::DisableReview,
            title: "You're offline".to_string(),
            message: "Check your internet connection and try again.".to_string(),
        });
    }

    // An unknown balance must not trigger the warning; only a known balance
    // lower than the required amount does. For exact-output trades the
    // required input amount is the trade-derived one.
    let required = info.currency_amounts.input.as_ref();
    if let (Some(required), Some(balance)) = (required, &info.currency_balances.input) {
        if balance.amount < required.amount {
            warnings.push(Warning {
                kind: Kind::InsufficientFunds,
                severity: Severity::None,
                action: Action::DisableReview,
                title: format!("Not enough {}", required.currency.symbol),
                message: format!(
                    "Your {} balance is lower than the amount you entered.",
                    required.currency.symbol,
                ),
            });
        }
    }

    // Gas is paid in the native asset regardless of the traded pair. Only
    // flag it when the native balance is actually known.
    if let (Some(fee), Some(balance)) = (gas_fee, native_balance(info)) {
        let required_native = match &info.currency_amounts.input {
            Some(amount) if amount.currency.is_native() => amount.amount,
            _ => eth::U256::ZERO,
        };
        if balance < required_native.saturating_add(fee.0) {
            warnings.push(Warning {
                kind: Kind::InsufficientGasFunds,
                severity: Severity::None,
                action: Action::DisableReview,
                title: "Not enough gas".to_string(),
                message: "You don't have enough of the network token to cover the network fee."
                    .to_string(),
            });
        }
    }

    // At most one trade-error warning, picked by the quote error category.
    if let Some(error) = info.trade.error() {
        let (kind, title) = match error {
            QuoteError::NoRoute => (Kind::LowLiquidity, "Not enough liquidity"),
            QuoteError::RateLimited => (Kind::RateLimit, "Too many requests"),
            QuoteError::Other(_) => (Kind::SwapRouterError, "Something went wrong"),
        };
        warnings.push(Warning {
            kind,
            severity: Severity::Medium,
            action: Action::DisableReview,
            title: title.to_string(),
            message: error.to_string(),
        });
    }

    // Incomplete-form and insufficient-balance warnings can coexist; a
    // partially filled form catches both.
    let form_complete = info.currencies.input.is_some()
        && info.currencies.output.is_some()
        && info.exact_amount().is_some();
    if !form_complete {
        warnings.push(Warning {
            kind: Kind::FormIncomplete,
            severity: Severity::None,
            action: Action::DisableReview,
            title: "Incomplete form".to_string(),
            message: "Select both currencies and enter an amount.".to_string(),
        });
    }

    if let Some(trade) = info.trade.trade() {
        // High supersedes medium; the two are mutually exclusive. The high
        // threshold is inclusive, the medium one is not.
        if trade.price_impact >= thresholds.high {
            warnings.push(Warning {
                kind: Kind::PriceImpactHigh,
                severity: Severity::High,
                action: Action::WarnBeforeSubmit,
                title: "Very high price impact".to_string(),
                message: "This trade moves the market price significantly.".to_string(),
            });
        } else if trade.price_impact > thresholds.medium {
            warnings.push(Warning {
                kind: Kind::PriceImpactMedium,
                severity: Severity::Medium,
                action: Action::WarnBeforeSubmit,
                title: "High price impact".to_string(),
                message: "This trade will noticeably move the market price.".to_string(),
            });
        }
    }

    for currency in [&info.currencies.input, &info.currencies.output]
        .into_iter()
        .flatten()
    {
        if currency.safety == Safety::Blocked {
            warnings.push(Warning {
                kind: Kind::BlockedToken,
                severity: Severity::Medium,
                action: Action::DisableReview,
                title: format!("{} is not available", currency.symbol),
                message: format!("{} can't be traded through this app.", currency.symbol),
            });
        }
    }

    warnings
}

fn native_balance(info: &DerivedSwapInfo) -> Option<eth::U256> {
    [&info.currency_balances.input, &info.currency_balances.output]
        .into_iter()
        .flatten()
        .find(|balance| balance.currency.is_native())
        .map(|balance| balance.amount)
}

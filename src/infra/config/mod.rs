//! Engine configuration, loaded once at startup.

use {
    crate::{
        domain::swap::{slippage::AutoSlippage, warning::PriceImpactThresholds},
        infra::{balance, router, tokens},
    },
    std::{path::Path, time::Duration},
};

pub mod file;

pub struct Config {
    pub router: router::Config,
    pub tokens: tokens::Config,
    pub balances: balance::Config,
    pub quote_debounce: Duration,
    pub auto_slippage: AutoSlippage,
    pub price_impact: PriceImpactThresholds,
}

/// Loads the engine configuration from a TOML file.
///
/// # Panics
///
/// Panics if the file cannot be read or parsed.
pub fn load(path: &Path) -> Config {
    let config: file::Config = file::load(path);
    Config {
        router: router::Config {
            endpoint: config.router.endpoint,
            api_key: config.router.api_key,
        },
        tokens: tokens::Config {
            endpoint: config.tokens.endpoint,
            cache_size: config.tokens.cache_size,
        },
        balances: balance::Config {
            endpoint: config.balances.endpoint,
        },
        quote_debounce: config.quote_debounce,
        auto_slippage: config.auto_slippage,
        price_impact: config.price_impact,
    }
}

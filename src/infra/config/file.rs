//! On-disk configuration format.

use {
    crate::domain::swap::{slippage::AutoSlippage, warning::PriceImpactThresholds},
    serde::{de::DeserializeOwned, Deserialize},
    serde_with::serde_as,
    std::{path::Path, time::Duration},
};

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub router: Router,
    pub tokens: Tokens,
    pub balances: Balances,

    /// How long to wait after the last form change before issuing a quote
    /// request.
    #[serde(with = "humantime_serde", default = "default_quote_debounce")]
    pub quote_debounce: Duration,

    #[serde(default)]
    pub auto_slippage: AutoSlippage,

    #[serde(default)]
    pub price_impact: PriceImpactThresholds,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Router {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub endpoint: reqwest::Url,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Tokens {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub endpoint: reqwest::Url,
    #[serde(default = "default_token_cache_size")]
    pub cache_size: u64,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Balances {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub endpoint: reqwest::Url,
}

fn default_quote_debounce() -> Duration {
    Duration::from_millis(250)
}

fn default_token_cache_size() -> u64 {
    10_000
}

/// Loads the configuration from a TOML file. Panics on any error, since a
/// broken configuration means the process should not start at all.
pub fn load<T: DeserializeOwned>(path: &Path) -> T {
    let data = std::fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read configuration file {path:?}: {err}"));
    toml::de::from_str(&data)
        .unwrap_or_else(|err| panic!("failed to parse configuration file {path:?}: {err}"))
}

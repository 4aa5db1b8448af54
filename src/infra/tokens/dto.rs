//! DTOs for the token reference-data service.

use {
    alloy::primitives::Address,
    serde::Deserialize,
    serde_with::serde_as,
};

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    /// The service's protection verdict for the token. Absent for tokens the
    /// service has no opinion on.
    #[serde(default)]
    pub safety_level: Option<SafetyLevel>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyLevel {
    Blocked,
    Verified,
    MediumWarning,
    StrongWarning,
}

//! Resolution of currency identifiers into full [`Currency`] descriptors
//! using an external token reference-data service. Descriptors are immutable,
//! so resolved tokens are cached aggressively.

use {
    crate::{
        domain::{
            currency::{Currency, CurrencyId, Safety},
            eth,
        },
        util,
    },
    moka::future::Cache,
    reqwest::StatusCode,
    std::time::Duration,
};

pub mod dto;

pub struct Config {
    /// The base URL of the token reference-data service.
    pub endpoint: reqwest::Url,

    /// The maximum number of resolved descriptors to keep cached.
    pub cache_size: u64,
}

/// A token reference-data client with an in-memory cache. Native assets are
/// resolved locally from chain metadata and never hit the network.
pub struct Registry {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    cache: Cache<CurrencyId, Option<Currency>>,
}

impl Registry {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint,
            cache: Cache::builder()
                .max_capacity(config.cache_size)
                // Unknown tokens can get listed later, so entries must not
                // live forever.
                .time_to_idle(Duration::from_secs(60 * 60))
                .build(),
        }
    }

    /// Resolves a currency identifier. Returns `Ok(None)` when the service
    /// does not know the token.
    pub async fn resolve(&self, id: &CurrencyId) -> Result<Option<Currency>, Error> {
        let Some(address) = id.address else {
            return Ok(Some(Currency::native(id.chain)));
        };

        if let Some(cached) = self.cache.get(id).await {
            return Ok(cached);
        }

        let resolved = self.fetch(id.chain, address).await?;
        self.cache.insert(*id, resolved.clone()).await;
        Ok(resolved)
    }

    async fn fetch(
        &self,
        chain: eth::ChainId,
        address: eth::TokenAddress,
    ) -> Result<Option<Currency>, Error> {
        let path = format!("tokens/{}/{:#x}", chain.value(), address.0);
        let response = self
            .client
            .get(util::url::join(&self.endpoint, &path))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let token: dto::Token = response.error_for_status()?.json().await?;
        tracing::trace!(?token, "resolved token");

        Ok(Some(Currency {
            chain,
            address: Some(eth::TokenAddress(token.address)),
            decimals: token.decimals,
            symbol: token.symbol,
            safety: safety(token.safety_level),
        }))
    }
}

/// Maps the service's protection verdict onto the internal classification.
/// Warning levels are deliberately collapsed into [`Safety::Unknown`], only a
/// hard block disables trading.
fn safety(level: Option<dto::SafetyLevel>) -> Safety {
    match level {
        Some(dto::SafetyLevel::Blocked) => Safety::Blocked,
        Some(dto::SafetyLevel::Verified) => Safety::Trusted,
        Some(dto::SafetyLevel::MediumWarning | dto::SafetyLevel::StrongWarning) | None => {
            Safety::Unknown
        }
    }
}

/// A seam for the swap session so tests can resolve currencies without a
/// network.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TokenInfoSource: Send + Sync {
    /// Resolves a currency identifier. `Ok(None)` means the token is unknown
    /// to the reference-data service.
    async fn resolve(&self, id: &CurrencyId) -> Result<Option<Currency>, Error>;
}

#[async_trait::async_trait]
impl TokenInfoSource for Registry {
    async fn resolve(&self, id: &CurrencyId) -> Result<Option<Currency>, Error> {
        Registry::resolve(self, id).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_collapses_warnings() {
        assert_eq!(safety(Some(dto::SafetyLevel::Blocked)), Safety::Blocked);
        assert_eq!(safety(Some(dto::SafetyLevel::Verified)), Safety::Trusted);
        assert_eq!(safety(Some(dto::SafetyLevel::MediumWarning)), Safety::Unknown);
        assert_eq!(safety(Some(dto::SafetyLevel::StrongWarning)), Safety::Unknown);
        assert_eq!(safety(None), Safety::Unknown);
    }

    #[tokio::test]
    async fn native_assets_resolve_locally() {
        let registry = Registry::new(Config {
            // Unroutable endpoint: native resolution must not hit it.
            endpoint: "http://0.0.0.0:1".parse().unwrap(),
            cache_size: 10,
        });

        let id = CurrencyId::native(eth::ChainId::Polygon);
        let currency = registry.resolve(&id).await.unwrap().unwrap();
        assert_eq!(currency.symbol, "POL");
        assert_eq!(currency.decimals, 18);
        assert!(currency.is_native());
    }
}

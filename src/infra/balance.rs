//! Account balance lookups through an external balance service. Balances are
//! point-in-time observations; the session treats a failed lookup as an
//! unknown balance, never as zero.

use {
    crate::{
        domain::{
            currency::{Currency, CurrencyAmount},
            eth,
        },
        util::{self, serialize},
    },
    serde::Deserialize,
    serde_with::serde_as,
};

pub struct Config {
    /// The base URL of the balance service.
    pub endpoint: reqwest::Url,
}

pub struct Balances {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl Balances {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint,
        }
    }

    /// Fetches the account's balance of the given currency, in the currency's
    /// smallest unit.
    pub async fn balance(
        &self,
        account: eth::Address,
        currency: &Currency,
    ) -> Result<CurrencyAmount, Error> {
        let path = match currency.address {
            Some(token) => format!(
                "balances/{}/{:#x}/{:#x}",
                currency.chain.value(),
                account,
                token.0,
            ),
            None => format!("balances/{}/{:#x}/native", currency.chain.value(), account),
        };
        let balance: dto::Balance = self
            .client
            .get(util::url::join(&self.endpoint, &path))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::trace!(?balance, "fetched balance");

        Ok(CurrencyAmount::new(currency.clone(), balance.quantity))
    }
}

mod dto {
    use super::*;

    #[serde_as]
    #[derive(Clone, Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Balance {
        #[serde_as(as = "serialize::U256")]
        pub quantity: eth::U256,
    }
}

/// A seam for the swap session so tests can control balances without a
/// network.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance(
        &self,
        account: eth::Address,
        currency: &Currency,
    ) -> Result<CurrencyAmount, Error>;
}

#[async_trait::async_trait]
impl BalanceSource for Balances {
    async fn balance(
        &self,
        account: eth::Address,
        currency: &Currency,
    ) -> Result<CurrencyAmount, Error> {
        Balances::balance(self, account, currency).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

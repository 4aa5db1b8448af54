//! Client for the external routing/quote service and the transformation of
//! its raw quotes into normalized [`trade::Trade`] objects. Requests are pure
//! request/response from the caller's perspective; retrying and debouncing
//! happen in the swap session, never here.

use {
    crate::{
        domain::{
            currency::{Currency, CurrencyAmount},
            eth, trade,
        },
        util,
    },
    reqwest::StatusCode,
    std::sync::atomic::{self, AtomicU64},
    tracing::Instrument,
};

pub mod dto;

/// The routing service speaks in basis points.
const MAX_SLIPPAGE_BPS: u16 = 10_000;

pub struct Config {
    /// The base URL of the routing service.
    pub endpoint: reqwest::Url,

    /// Optional API key sent as a request header.
    pub api_key: Option<String>,
}

/// Bindings to the external routing API.
pub struct Router {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl Router {
    pub fn new(config: Config) -> Result<Self, CreationError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let mut key = reqwest::header::HeaderValue::from_str(api_key)?;
            key.set_sensitive(true);
            headers.insert("x-api-key", key);
        }
        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }

    /// Requests a quote for the given parameters. Expected failures are
    /// returned as categorized [`Error`] values.
    pub async fn quote(&self, request: &dto::Request) -> Result<dto::Quote, Error> {
        // Tracing span with a unique ID to make debugging of API requests
        // easier.
        static ID: AtomicU64 = AtomicU64::new(0);
        let id = ID.fetch_add(1, atomic::Ordering::Relaxed);
        self.quote_inner(request)
            .instrument(tracing::trace_span!("quote", id = %id))
            .await
    }

    async fn quote_inner(&self, request: &dto::Request) -> Result<dto::Quote, Error> {
        tracing::trace!(?request, "requesting quote");
        let response = self
            .client
            .post(util::url::join(&self.endpoint, "quote"))
            .json(request)
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(Error::RateLimited),
            status if status.is_server_error() => {
                return Err(Error::Api {
                    code: status.to_string(),
                    reason: response.text().await.unwrap_or_default(),
                })
            }
            _ => (),
        }

        let body = response.text().await?;
        tracing::trace!(%body, "quote response");
        let response: dto::Response =
            serde_json::from_str(&body).map_err(|err| Error::Api {
                code: "MALFORMED_RESPONSE".to_string(),
                reason: err.to_string(),
            })?;
        response.into_result().map_err(Into::into)
    }
}

/// Converts a raw quote into a normalized trade. Returns `None` when the
/// quote is structurally valid but contains no usable route; this is a
/// successful-but-empty result, distinct from an [`Error`].
pub fn transform(
    quote: &dto::Quote,
    request: &dto::Request,
    trade_type: trade::TradeType,
    input: &Currency,
    output: &Currency,
) -> Option<trade::Trade> {
    let path = quote.route.iter().find(|path| !path.is_empty())?;
    let route = path
        .iter()
        .map(|pool| trade::Leg {
            pool: eth::ContractAddress(pool.address),
            token_in: eth::TokenAddress(pool.token_in.address),
            token_out: eth::TokenAddress(pool.token_out.address),
            spot_price: pool.spot_price.clone(),
        })
        .collect::<Vec<_>>();

    let (input_amount, output_amount) = match trade_type {
        trade::TradeType::ExactInput => (request.amount, quote.quote),
        trade::TradeType::ExactOutput => (quote.quote, request.amount),
    };
    let input = CurrencyAmount::new(input.clone(), input_amount);
    let output = CurrencyAmount::new(output.clone(), output_amount);

    let price_impact = trade::price_impact(&input, &output, &route);
    let swap_call = quote.method_parameters.as_ref().map(|params| eth::Call {
        to: eth::ContractAddress(params.to),
        value: eth::Ether(params.value),
        calldata: params.calldata.clone(),
    });

    Some(trade::Trade {
        trade_type,
        input,
        output,
        route,
        price_impact,
        gas: eth::Gas(quote.gas_use_estimate.unwrap_or_default()),
        swap_call,
    })
}

/// Converts a slippage tolerance into the basis points hint the service
/// accepts.
pub fn slippage_bps(slippage: &crate::domain::swap::Slippage) -> Option<u16> {
    slippage.as_bps().filter(|bps| *bps <= MAX_SLIPPAGE_BPS)
}

/// A seam for the swap session so tests can drive quoting without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, request: &dto::Request) -> Result<dto::Quote, Error>;
}

#[async_trait::async_trait]
impl QuoteSource for Router {
    async fn quote(&self, request: &dto::Request) -> Result<dto::Quote, Error> {
        Router::quote(self, request).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreationError {
    #[error(transparent)]
    Header(#[from] reqwest::header::InvalidHeaderValue),
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// A categorized error from the routing service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no route found")]
    NoRoute,
    #[error("rate limited")]
    RateLimited,
    #[error("api error {code}: {reason}")]
    Api { code: String, reason: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Maps the infrastructure error onto the tagged category the warning
    /// evaluator matches on.
    pub fn categorize(&self) -> trade::QuoteError {
        match self {
            Self::NoRoute => trade::QuoteError::NoRoute,
            Self::RateLimited => trade::QuoteError::RateLimited,
            Self::Api { code, .. } => trade::QuoteError::Other(code.clone()),
            Self::Http(err) => trade::QuoteError::Other(err.to_string()),
        }
    }
}

impl From<dto::Error> for Error {
    fn from(err: dto::Error) -> Self {
        // These codes are what the routing service has been observed to
        // return; anything unrecognized surfaces as a generic API error.
        match err.error_code.as_str() {
            "NO_QUOTE_DATA" | "NO_ROUTE" => Self::NoRoute,
            "RATE_LIMITED" | "TOO_MANY_REQUESTS" => Self::RateLimited,
            _ => Self::Api {
                code: err.error_code,
                reason: err.detail,
            },
        }
    }
}

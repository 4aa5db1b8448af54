//! DTOs for the external routing/quote service. The service performs the
//! actual pathfinding; this crate only issues requests and normalizes the
//! responses.

use {
    crate::{
        domain::{currency::CurrencyId, eth, trade},
        util::serialize,
    },
    alloy::primitives::{Address, U256},
    bigdecimal::BigDecimal,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
};

/// A quote request. Also serves as the staleness key for in-flight requests:
/// a response only applies while the current derivation inputs still map to
/// an identical request.
#[serde_as]
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Token address, or the native sentinel address.
    pub token_in_address: Address,
    #[serde_as(as = "serialize::ChainId")]
    pub token_in_chain_id: eth::ChainId,
    pub token_out_address: Address,
    #[serde_as(as = "serialize::ChainId")]
    pub token_out_chain_id: eth::ChainId,
    /// The exact amount, in the exact token's smallest unit.
    #[serde_as(as = "serialize::U256")]
    pub amount: U256,
    #[serde(rename = "type")]
    pub swap_type: Type,
    /// Slippage tolerance hint in basis points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slippage_tolerance: Option<u16>,
}

impl Request {
    pub fn new(
        token_in: &CurrencyId,
        token_out: &CurrencyId,
        amount: U256,
        trade_type: trade::TradeType,
        slippage_tolerance: Option<u16>,
    ) -> Self {
        let address = |id: &CurrencyId| match id.address {
            Some(token) => token.0,
            None => eth::NATIVE_SENTINEL,
        };
        Self {
            token_in_address: address(token_in),
            token_in_chain_id: token_in.chain,
            token_out_address: address(token_out),
            token_out_chain_id: token_out.chain,
            amount,
            swap_type: match trade_type {
                trade::TradeType::ExactInput => Type::ExactIn,
                trade::TradeType::ExactOutput => Type::ExactOut,
            },
            slippage_tolerance,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Type {
    #[serde(rename = "exactIn")]
    ExactIn,
    #[serde(rename = "exactOut")]
    ExactOut,
}

/// A successful quote response.
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// The derived-side amount: the output amount for exact-in requests and
    /// the input amount for exact-out requests.
    #[serde_as(as = "serialize::U256")]
    pub quote: U256,

    /// The split route paths; each path is an ordered list of pool hops.
    pub route: Vec<Vec<Pool>>,

    #[serde_as(as = "Option<serialize::U256>")]
    #[serde(default)]
    pub gas_use_estimate: Option<U256>,

    /// The prepared router call. Absent while the service is still
    /// finalizing calldata for the route.
    #[serde(default)]
    pub method_parameters: Option<MethodParameters>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub address: Address,
    pub token_in: Token,
    pub token_out: Token,
    /// The pool's pre-trade spot price of its output token in terms of its
    /// input token.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub spot_price: BigDecimal,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: Address,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodParameters {
    pub to: Address,
    #[serde_as(as = "serialize::Hex")]
    pub calldata: Vec<u8>,
    #[serde_as(as = "serialize::U256")]
    #[serde(default)]
    pub value: U256,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum Response {
    Err(Error),
    Ok(Quote),
}

impl Response {
    /// Turns the API response into a [`std::result::Result`].
    pub fn into_result(self) -> Result<Quote, Error> {
        match self {
            Response::Ok(quote) => Ok(quote),
            Response::Err(err) => Err(err),
        }
    }
}

/// The service's error envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    pub error_code: String,
    #[serde(default)]
    pub detail: String,
}

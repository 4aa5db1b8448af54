//! Tests for the routing service client.

use {
    crate::{
        domain::{
            currency::{Currency, CurrencyId, Safety},
            eth::{self, ChainId},
            trade,
        },
        infra::router::{self, dto},
        tests::mock::{
            self,
            http::{Expectation, RequestBody},
        },
    },
    alloy::primitives::{address, U256},
    axum::http::StatusCode,
    serde_json::json,
};

fn weth() -> Currency {
    Currency {
        chain: ChainId::Mainnet,
        address: Some(ChainId::Mainnet.wrapped_native()),
        decimals: 18,
        symbol: "WETH".to_string(),
        safety: Safety::Trusted,
    }
}

fn usdc() -> Currency {
    Currency {
        chain: ChainId::Mainnet,
        address: Some(eth::TokenAddress(address!(
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
        ))),
        decimals: 6,
        symbol: "USDC".to_string(),
        safety: Safety::Trusted,
    }
}

fn request() -> dto::Request {
    dto::Request::new(
        &weth().id(),
        &usdc().id(),
        U256::from(10).pow(U256::from(18)),
        trade::TradeType::ExactInput,
        Some(50),
    )
}

fn client(server: &mock::http::ServerHandle) -> router::Router {
    router::Router::new(router::Config {
        endpoint: server.url(),
        api_key: None,
    })
    .unwrap()
}

#[tokio::test]
async fn quotes_and_transforms() {
    let server = mock::http::setup(vec![Expectation::Post {
        path: "quote".to_string(),
        req: RequestBody::Exact(json!({
            "tokenInAddress": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "tokenInChainId": 1,
            "tokenOutAddress": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "tokenOutChainId": 1,
            "amount": "1000000000000000000",
            "type": "exactIn",
            "slippageTolerance": 50,
        })),
        status: StatusCode::OK,
        res: json!({
            "quote": "1990000000",
            "route": [[{
                "address": "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640",
                "tokenIn": {
                    "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                },
                "tokenOut": {
                    "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                },
                "spotPrice": "2000",
            }]],
            "gasUseEstimate": "150000",
            "methodParameters": {
                "to": "0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad",
                "calldata": "0x24856bc3",
                "value": "1000000000000000000",
            },
        }),
    }])
    .await;

    let request = request();
    let quote = client(&server).quote(&request).await.unwrap();
    let trade = router::transform(
        &quote,
        &request,
        trade::TradeType::ExactInput,
        &weth(),
        &usdc(),
    )
    .unwrap();

    assert_eq!(trade.output.amount, U256::from(1_990_000_000_u64));
    assert_eq!(trade.price_impact, "0.005".parse().unwrap());
    let call = trade.swap_call.unwrap();
    assert_eq!(call.calldata, vec![0x24, 0x85, 0x6b, 0xc3]);
    assert_eq!(call.value.0, U256::from(10).pow(U256::from(18)));
}

#[tokio::test]
async fn no_quote_data_reads_as_no_route() {
    let server = mock::http::setup(vec![Expectation::Post {
        path: "quote".to_string(),
        req: RequestBody::Any,
        status: StatusCode::OK,
        res: json!({
            "errorCode": "NO_QUOTE_DATA",
            "detail": "no route found",
        }),
    }])
    .await;

    let error = client(&server).quote(&request()).await.unwrap_err();
    assert_eq!(error.categorize(), trade::QuoteError::NoRoute);
}

#[tokio::test]
async fn rate_limiting_is_categorized() {
    let server = mock::http::setup(vec![Expectation::Post {
        path: "quote".to_string(),
        req: RequestBody::Any,
        status: StatusCode::TOO_MANY_REQUESTS,
        res: json!(null),
    }])
    .await;

    let error = client(&server).quote(&request()).await.unwrap_err();
    assert_eq!(error.categorize(), trade::QuoteError::RateLimited);
}

#[tokio::test]
async fn native_requests_send_the_sentinel() {
    let server = mock::http::setup(vec![Expectation::Post {
        path: "quote".to_string(),
        req: RequestBody::Exact(json!({
            "tokenInAddress": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
            "tokenInChainId": 1,
            "tokenOutAddress": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "tokenOutChainId": 1,
            "amount": "500000000000000000",
            "type": "exactIn",
        })),
        status: StatusCode::OK,
        res: json!({
            "quote": "995000000",
            "route": [[]],
        }),
    }])
    .await;

    let request = dto::Request::new(
        &CurrencyId::native(ChainId::Mainnet),
        &usdc().id(),
        U256::from(500_000_000_000_000_000_u128),
        trade::TradeType::ExactInput,
        None,
    );
    let quote = client(&server).quote(&request).await.unwrap();
    // A valid response without a usable route transforms to no trade.
    assert!(router::transform(
        &quote,
        &request,
        trade::TradeType::ExactInput,
        &Currency::native(ChainId::Mainnet),
        &usdc(),
    )
    .is_none());
}

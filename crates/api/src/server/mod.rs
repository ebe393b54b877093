//! HTTP server: routes, shared state and error mapping.
//!
//! Every route is a POST with a JSON body naming the target network. Handlers
//! open a fresh [`forkooor_chain::ForkSession`] per request, so concurrent
//! requests against different forks never share a binding.

pub mod automation;
pub mod error;
pub mod positions;
pub mod requests;
pub mod state;
pub mod utils;

use anyhow::Context;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

pub use error::{ApiError, ApiResult, FieldError};
pub use state::AppState;

/// Build the router.
pub fn router(state: AppState) -> Router {
    let utils = Router::new()
        .route("/set-token-balance", post(utils::set_token_balance))
        .route("/set-eth-balance", post(utils::set_eth_balance))
        .route("/token-balance", post(utils::token_balance))
        .route("/approve", post(utils::approve))
        .route("/time-travel", post(utils::time_travel))
        .route("/set-timestamp", post(utils::set_timestamp));

    let automation = Router::new()
        .route("/bundle", post(automation::bundle))
        .route("/subscribe", post(automation::subscribe));

    Router::new()
        .route("/health", get(health))
        .nest("/utils", utils)
        .nest("/automation", automation)
        .route("/aavev3/position", post(positions::aave_v3))
        .route("/spark/position", post(positions::spark))
        .route("/compoundV3/position", post(positions::compound_v3))
        .route("/morpho-blue/position", post(positions::morpho_blue))
        .route("/liquity/position", post(positions::liquity))
        .route("/liquity-v2/position", post(positions::liquity_v2))
        .route("/curveusd/position", post(positions::curveusd))
        .route("/maker/position", post(positions::maker))
        .route("/fluid/position", post(positions::fluid))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Serve until Ctrl-C.
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, U256};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use forkooor_core::{
        ChainConfig, ConfigRegistry, LoadedConfig, ServiceConfig, StorageSlotTable, StrategyTable,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

    const MAINNET: &str = include_str!("../../../../config/chains/mainnet.toml");
    const SLOTS: &str = include_str!("../../../../config/storage_slots.json");
    const BUNDLES: &str = include_str!("../../../../config/bundles.toml");

    fn state() -> AppState {
        let mut mainnet = toml::from_str::<ChainConfig>(MAINNET).unwrap();
        mainnet.expand_env_vars();
        mainnet.validate().unwrap();

        let mut chains = ConfigRegistry::new();
        chains.insert(mainnet);
        AppState::new(LoadedConfig {
            service: ServiceConfig::default(),
            chains,
            slots: StorageSlotTable::from_json(SLOTS).unwrap(),
            bundles: StrategyTable::from_toml(BUNDLES).unwrap(),
        })
    }

    /// Minimal fork node: answers `balanceOf` with a fixed balance, reverts
    /// every other `eth_call` and acknowledges everything else.
    struct ForkNode {
        balance: U256,
    }

    impl Respond for ForkNode {
        fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
            let text = String::from_utf8_lossy(&request.body);
            let mut reply = match body["method"].as_str() {
                Some("eth_call") if text.contains("70a08231") => {
                    json!({ "result": B256::from(self.balance) })
                }
                Some("eth_call") => {
                    json!({ "error": { "code": 3, "message": "execution reverted" } })
                }
                _ => json!({ "result": "0x0" }),
            };
            reply["jsonrpc"] = json!("2.0");
            reply["id"] = body["id"].clone();
            ResponseTemplate::new(200).set_body_json(reply)
        }
    }

    async fn fork_node(balance: U256) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ForkNode { balance })
            .mount(&server)
            .await;
        server
    }

    async fn post_json(path: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let response = router(state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_empty_body_lists_every_field() {
        let (status, body) = post_json("/utils/set-token-balance", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["vnetUrl", "token", "account", "amount"]);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (status, body) = post_json("/utils/time-travel", "{ not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "body");
    }

    #[tokio::test]
    async fn test_invalid_amount_rejected_before_network() {
        // Nothing listens on this URL; a 400 proves no call was attempted
        let (status, body) = post_json(
            "/utils/set-eth-balance",
            json!({
                "vnetUrl": "http://127.0.0.1:1",
                "account": "0x1111111111111111111111111111111111111111",
                "amount": "-5",
            })
            .to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "amount");
    }

    #[tokio::test]
    async fn test_bundle_lookup() {
        let (status, body) = post_json(
            "/automation/bundle",
            json!({ "protocol": "aavev3", "operation": "boost" }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bundleId"], 1);
        // repay, boost, close-on-price
        assert_eq!(body["operations"].as_array().unwrap().len(), 3);

        let (status, body) = post_json(
            "/automation/bundle",
            json!({ "protocol": "spark", "chainId": 8453, "operation": "repay" }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("8453"));
    }

    #[tokio::test]
    async fn test_bundle_unknown_protocol() {
        let (status, body) = post_json(
            "/automation/bundle",
            json!({ "protocol": "nope", "operation": "repay" }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "protocol");
    }

    #[tokio::test]
    async fn test_set_token_balance_end_to_end() {
        let node = fork_node(U256::from(1_000_000_000u64)).await;
        let (status, body) = post_json(
            "/utils/set-token-balance",
            json!({
                "vnetUrl": node.uri(),
                "token": "USDC",
                "account": "0x1111111111111111111111111111111111111111",
                "amount": "1000",
            })
            .to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["balance"], "1000");
        assert_eq!(body["rawBalance"], "1000000000");

        let methods: Vec<String> = node
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .filter_map(|b| b["method"].as_str().map(str::to_string))
            .collect();
        assert!(methods.iter().any(|m| m == "tenderly_setStorageAt"));
        assert!(methods.iter().any(|m| m == "evm_mine"));
    }

    #[tokio::test]
    async fn test_id_keyed_positions_need_position_id() {
        let (status, body) = post_json(
            "/maker/position",
            json!({
                "vnetUrl": "http://127.0.0.1:1",
                "user": "0x1111111111111111111111111111111111111111",
            })
            .to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "positionId");

        let (status, body) = post_json(
            "/curveusd/position",
            json!({
                "vnetUrl": "http://127.0.0.1:1",
                "user": "0x1111111111111111111111111111111111111111",
            })
            .to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "market");
    }

    #[tokio::test]
    async fn test_curveusd_position_end_to_end() {
        use alloy::sol_types::SolValue;

        // loan_exists(address) answers false, so only one eth_call is made
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(move |request: &wiremock::Request| {
                let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
                ResponseTemplate::new(200).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": body["id"].clone(),
                    "result": alloy::primitives::Bytes::from(false.abi_encode()),
                }))
            })
            .mount(&server)
            .await;

        let (status, body) = post_json(
            "/curveusd/position",
            json!({
                "vnetUrl": server.uri(),
                "user": "0x1111111111111111111111111111111111111111",
                "market": "wstETH",
            })
            .to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["protocol"], "curveusd");
        assert_eq!(body["loanExists"], false);
        assert_eq!(
            body["controller"].as_str().unwrap().to_lowercase(),
            "0x100daa78fc509db39ef7d04de0c1abd299f4c6ce"
        );
    }

    #[tokio::test]
    async fn test_listed_amount_checked_before_session() {
        // No [tenderly] section, so opening a vnetId session would fail with 500
        let (status, body) = post_json(
            "/utils/set-token-balance",
            json!({
                "vnetId": "abc",
                "token": "USDC",
                "account": "0x1111111111111111111111111111111111111111",
                "amount": "0.0000001",
            })
            .to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["errors"][0]["field"], "amount");

        let (status, body) = post_json(
            "/utils/approve",
            json!({
                "vnetId": "abc",
                "token": "USDC",
                "owner": "0x1111111111111111111111111111111111111111",
                "spender": "0x2222222222222222222222222222222222222222",
                "amount": "1.1234567",
            })
            .to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["errors"][0]["field"], "amount");
    }

    #[tokio::test]
    async fn test_unlisted_slot_is_server_error() {
        let node = fork_node(U256::ZERO).await;
        let (status, body) = post_json(
            "/utils/set-token-balance",
            json!({
                "vnetUrl": node.uri(),
                "token": "LUSD",
                "account": "0x1111111111111111111111111111111111111111",
                "amount": 1,
            })
            .to_string(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());

        let writes = node
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| String::from_utf8_lossy(&r.body).contains("setStorageAt"))
            .count();
        assert_eq!(writes, 0);
    }
}

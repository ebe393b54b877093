//! JSON-RPC mocking helpers for unit tests.

use alloy::primitives::Bytes;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Responds with a fixed JSON-RPC result, echoing the request id.
pub(crate) struct RpcResult(pub serde_json::Value);

impl Respond for RpcResult {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": request_id(request),
            "result": self.0,
        }))
    }
}

/// Responds with an `execution reverted` JSON-RPC error.
pub(crate) struct RpcRevert;

impl Respond for RpcRevert {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": request_id(request),
            "error": { "code": 3, "message": "execution reverted" },
        }))
    }
}

fn request_id(request: &Request) -> serde_json::Value {
    serde_json::from_slice::<serde_json::Value>(&request.body)
        .ok()
        .and_then(|body| body.get("id").cloned())
        .unwrap_or(serde_json::Value::from(0))
}

fn method_matcher(name: &str) -> wiremock::matchers::BodyContainsMatcher {
    body_string_contains(format!("\"method\":\"{name}\""))
}

/// Mount a result for every call of an RPC method.
pub(crate) async fn mock_rpc(server: &MockServer, name: &str, result: serde_json::Value) {
    Mock::given(method("POST"))
        .and(method_matcher(name))
        .respond_with(RpcResult(result))
        .mount(server)
        .await;
}

/// Mount an ABI-encoded result for `eth_call`s whose calldata starts with `selector`.
pub(crate) async fn mock_call(server: &MockServer, selector: [u8; 4], output: impl Into<Bytes>) {
    Mock::given(method("POST"))
        .and(method_matcher("eth_call"))
        .and(body_string_contains(hex::encode(selector)))
        .respond_with(RpcResult(serde_json::json!(output.into())))
        .mount(server)
        .await;
}

/// Make `eth_call`s with `selector` revert.
pub(crate) async fn mock_call_revert(server: &MockServer, selector: [u8; 4]) {
    Mock::given(method("POST"))
        .and(method_matcher("eth_call"))
        .and(body_string_contains(hex::encode(selector)))
        .respond_with(RpcRevert)
        .mount(server)
        .await;
}

/// Methods received by the server, in order.
pub(crate) async fn rpc_methods(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).ok())
        .filter_map(|body| body["method"].as_str().map(str::to_string))
        .collect()
}

/// Params of every received call of `name`.
pub(crate) async fn rpc_params(server: &MockServer, name: &str) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).ok())
        .filter(|body| body["method"] == name)
        .map(|body| body["params"].clone())
        .collect()
}

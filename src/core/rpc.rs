/// JSON-RPC 2.0 Surface
///
/// Request/response structures and the method routing shared by the stdio and
/// HTTP transports. Both transports hand an `RpcRequest` plus references to
/// the immutable server config and tool registry to `handle_request` and relay
/// the returned response unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::config::ServerConfig;
use crate::core::dispatch::{DispatchError, ToolRegistry};

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 error codes used by this server.
pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC 2.0 request.
///
/// `id` is `None` for notifications, which expect no response.
#[derive(Deserialize, Debug)]
pub struct RpcRequest {
    #[allow(dead_code)]
    pub(crate) jsonrpc: String,
    pub(crate) id: Option<Value>,
    pub(crate) method: String,
    pub(crate) params: Option<Value>,
}

/// JSON-RPC 2.0 response. Exactly one of `result` and `error` is present.
#[derive(Serialize, Debug)]
pub struct RpcResponse {
    pub(crate) jsonrpc: String,
    pub(crate) id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<RpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Debug)]
pub struct RpcError {
    pub(crate) code: i32,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<Value>,
}

impl RpcResponse {
    pub fn result(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// Route one request to its method handler and produce the response.
pub fn handle_request(
    config: &ServerConfig,
    registry: &ToolRegistry,
    req: &RpcRequest,
) -> RpcResponse {
    match req.method.as_str() {
        "initialize" => handle_initialize(config, req.id.clone()),
        "tools/list" => handle_tools_list(registry, req.id.clone()),
        "tools/call" => handle_tools_call(registry, req.id.clone(), req.params.as_ref()),
        _ => RpcResponse::error(
            req.id.clone(),
            METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    }
}

/// `initialize`: protocol handshake with server identity and capabilities.
fn handle_initialize(config: &ServerConfig, id: Option<Value>) -> RpcResponse {
    RpcResponse::result(
        id,
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": config.name,
                "version": config.version
            }
        }),
    )
}

/// `tools/list`: the registered descriptors, verbatim.
fn handle_tools_list(registry: &ToolRegistry, id: Option<Value>) -> RpcResponse {
    RpcResponse::result(
        id,
        serde_json::json!({
            "tools": registry.list()
        }),
    )
}

/// `tools/call`: validate and execute one tool.
///
/// Params carry `{ name, arguments? }`; the argument bag is forwarded to the
/// dispatcher as-is so an absent bag stays absent. Dispatch failures map onto
/// JSON-RPC error objects via their error codes, except internal handler
/// failures, which are logged and reported generically.
fn handle_tools_call(
    registry: &ToolRegistry,
    id: Option<Value>,
    params: Option<&Value>,
) -> RpcResponse {
    let Some(params) = params else {
        return RpcResponse::error(id, INVALID_PARAMS, "Invalid params");
    };

    let name = params.get("name").and_then(Value::as_str).unwrap_or("");
    let arguments = params.get("arguments");

    match registry.dispatch(name, arguments) {
        Ok(output) => RpcResponse::result(
            id,
            serde_json::json!({
                "content": output.content,
                "isError": false
            }),
        ),
        Err(err) => {
            let message = match &err {
                DispatchError::Internal(detail) => {
                    tracing::error!(tool = name, error = %detail, "tool handler failed");
                    "Internal error".to_string()
                }
                _ => err.to_string(),
            };
            RpcResponse::error(id, err.code(), message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::build_registry;
    use serde_json::json;

    fn request(method: &str, params: Option<Value>) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn initialize_reports_identity_and_capabilities() {
        let config = ServerConfig::for_tests();
        let registry = build_registry();
        let response = handle_request(&config, &registry, &request("initialize", None));
        let result = response.result.expect("initialize succeeds");
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], config.name.as_str());
        assert_eq!(result["serverInfo"]["version"], config.version.as_str());
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[test]
    fn tools_list_returns_all_descriptors() {
        let config = ServerConfig::for_tests();
        let registry = build_registry();
        let response = handle_request(&config, &registry, &request("tools/list", None));
        let result = response.result.expect("tools/list succeeds");
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[0]["name"], "echo");
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[test]
    fn tools_call_success_wraps_content() {
        let config = ServerConfig::for_tests();
        let registry = build_registry();
        let params = json!({ "name": "echo", "arguments": { "message": "hi" } });
        let response = handle_request(&config, &registry, &request("tools/call", Some(params)));
        let result = response.result.expect("echo succeeds");
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "Echo: hi");
    }

    #[test]
    fn tools_call_without_params_is_invalid_params() {
        let config = ServerConfig::for_tests();
        let registry = build_registry();
        let response = handle_request(&config, &registry, &request("tools/call", None));
        let error = response.error.expect("missing params is rejected");
        assert_eq!(error.code, INVALID_PARAMS);
    }

    #[test]
    fn tools_call_without_arguments_is_invalid_params() {
        let config = ServerConfig::for_tests();
        let registry = build_registry();
        let params = json!({ "name": "echo" });
        let response = handle_request(&config, &registry, &request("tools/call", Some(params)));
        let error = response.error.expect("missing arguments is rejected");
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.message, "Missing arguments");
    }

    #[test]
    fn tools_call_unknown_tool_is_method_not_found() {
        let config = ServerConfig::for_tests();
        let registry = build_registry();
        let params = json!({ "name": "bogus", "arguments": {} });
        let response = handle_request(&config, &registry, &request("tools/call", Some(params)));
        let error = response.error.expect("unknown tool is rejected");
        assert_eq!(error.code, METHOD_NOT_FOUND);
        assert_eq!(error.message, "Unknown tool: bogus");
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let config = ServerConfig::for_tests();
        let registry = build_registry();
        let response = handle_request(&config, &registry, &request("resources/list", None));
        let error = response.error.expect("unknown method is rejected");
        assert_eq!(error.code, METHOD_NOT_FOUND);
        assert_eq!(error.message, "Method not found: resources/list");
    }

    #[test]
    fn error_responses_omit_result_in_serialized_form() {
        let response = RpcResponse::error(Some(json!(7)), INVALID_PARAMS, "Invalid params");
        let serialized = serde_json::to_value(&response).unwrap();
        assert!(serialized.get("result").is_none());
        assert_eq!(serialized["error"]["code"], INVALID_PARAMS);
        assert_eq!(serialized["id"], 7);
    }
}

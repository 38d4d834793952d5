#![forbid(unsafe_code)]

use crate::McpServer;
use crate::support::ai::ai_error;
use crate::support::jsonrpc::{json_rpc_error, json_rpc_response, tool_text_content};
use serde_json::{Value, json};
use std::path::PathBuf;

impl McpServer {
    pub(crate) fn new(root_dir: PathBuf) -> Self {
        Self {
            initialized: false,
            root_dir,
        }
    }

    pub(crate) fn handle(&mut self, request: crate::JsonRpcRequest) -> Option<Value> {
        let method = request.method.as_str();

        if method == "initialize" {
            return Some(json_rpc_response(
                request.id,
                json!({
                    "protocolVersion": crate::MCP_VERSION,
                    "serverInfo": {
                        "name": crate::SERVER_NAME,
                        "version": crate::SERVER_VERSION,
                        "build": crate::support::build_info::build_fingerprint()
                    },
                    "capabilities": { "tools": {} }
                }),
            ));
        }

        if !self.initialized && method != "notifications/initialized" {
            return Some(json_rpc_error(request.id, -32002, "Server not initialized"));
        }

        if method == "notifications/initialized" {
            self.initialized = true;
            return None;
        }

        if method == "ping" {
            return Some(json_rpc_response(request.id, json!({})));
        }

        // Some clients probe the optional resources methods by default; an
        // empty set keeps them quiet without advertising anything.
        if method == "resources/list" {
            return Some(json_rpc_response(request.id, json!({ "resources": [] })));
        }
        if method == "resources/read" {
            return Some(json_rpc_response(request.id, json!({ "contents": [] })));
        }

        if method == "tools/list" {
            return Some(json_rpc_response(
                request.id,
                json!({ "tools": crate::tools::tool_definitions() }),
            ));
        }

        if method == "tools/call" {
            let Some(params_obj) = request.params.as_ref().and_then(|v| v.as_object()) else {
                return Some(json_rpc_error(request.id, -32602, "params must be an object"));
            };
            let tool_name = params_obj
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let args = params_obj
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));
            let response_body = self.call_tool(tool_name, &args);

            return Some(json_rpc_response(
                request.id,
                json!({
                    "content": [tool_text_content(&response_body)],
                    "isError": !response_body
                        .get("success")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false)
                }),
            ));
        }

        Some(json_rpc_error(
            request.id,
            -32601,
            &format!("Method not found: {method}"),
        ))
    }

    pub(crate) fn call_tool(&self, name: &str, args: &Value) -> Value {
        match crate::tools::dispatch_tool(self, name, args) {
            Some(resp) => resp,
            None => ai_error("UNKNOWN_TOOL", &format!("Unknown tool: {name}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonRpcRequest;

    fn request(method: &str, id: u64, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            _jsonrpc: Some("2.0".to_string()),
            method: method.to_string(),
            id: Some(json!(id)),
            params: Some(params),
        }
    }

    fn test_server() -> McpServer {
        let dir = std::env::temp_dir().join(format!(
            "ns_mcp_server_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        ));
        McpServer::new(dir)
    }

    #[test]
    fn initialize_before_anything_else() {
        let mut server = test_server();
        let resp = server
            .handle(request("tools/list", 1, json!({})))
            .expect("response");
        assert_eq!(resp["error"]["code"], json!(-32002));

        let resp = server
            .handle(request("initialize", 2, json!({})))
            .expect("response");
        assert_eq!(resp["result"]["protocolVersion"], json!(crate::MCP_VERSION));

        assert!(
            server
                .handle(request("notifications/initialized", 3, json!({})))
                .is_none()
        );

        let resp = server
            .handle(request("tools/list", 4, json!({})))
            .expect("response");
        assert!(resp["result"]["tools"].as_array().is_some_and(|t| !t.is_empty()));
    }

    #[test]
    fn unknown_method_is_not_found() {
        let mut server = test_server();
        let _ = server.handle(request("initialize", 1, json!({})));
        let _ = server.handle(request("notifications/initialized", 2, json!({})));
        let resp = server
            .handle(request("nope/nope", 3, json!({})))
            .expect("response");
        assert_eq!(resp["error"]["code"], json!(-32601));
    }

    #[test]
    fn unknown_tool_is_flagged_as_error_content() {
        let mut server = test_server();
        let _ = server.handle(request("initialize", 1, json!({})));
        let _ = server.handle(request("notifications/initialized", 2, json!({})));
        let resp = server
            .handle(request(
                "tools/call",
                3,
                json!({ "name": "bogus", "arguments": {} }),
            ))
            .expect("response");
        assert_eq!(resp["result"]["isError"], json!(true));
    }
}

mod deps;
mod hash;
mod jwt;
mod units;
mod uuid;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "webtools".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result)
        .map_err(|e| JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, format!("Internal error: {e}")))
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = vec![
        Tool {
            name: "units_convert".to_string(),
            description: "Convert a value between units of length, mass, time, data size or temperature. Accepts unit symbols (km, lb, GiB, F) or names. When 'to' is omitted, returns the value expressed in every unit of the same category.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "value": {
                        "type": "string",
                        "description": "Numeric value to convert (e.g., '12.5', '1_000', '-40')"
                    },
                    "from": {
                        "type": "string",
                        "description": "Source unit symbol or name (e.g., 'km', 'pound')"
                    },
                    "to": {
                        "type": "string",
                        "description": "Target unit symbol or name (optional)"
                    }
                },
                "required": ["value", "from"]
            }),
        },
        Tool {
            name: "jwt_decode".to_string(),
            description: "Decode a JSON Web Token without checking its signature. Returns the header, payload, raw signature segment and the iat/nbf/exp claims rendered as RFC 3339 timestamps with expiry flags.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "token": {
                        "type": "string",
                        "description": "Compact JWT (header.payload.signature)"
                    }
                },
                "required": ["token"]
            }),
        },
        Tool {
            name: "jwt_verify".to_string(),
            description: "Verify the HMAC signature (HS256, HS384, HS512) of a JSON Web Token against a shared secret. Returns whether the signature is valid and the algorithm from the header.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "token": {
                        "type": "string",
                        "description": "Compact JWT (header.payload.signature)"
                    },
                    "secret": {
                        "type": "string",
                        "description": "Shared HMAC secret"
                    }
                },
                "required": ["token", "secret"]
            }),
        },
        Tool {
            name: "hash_identify".to_string(),
            description: "Guess which hash algorithms could have produced a digest, based on its exact length and character set. Returns every matching candidate.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "hash": {
                        "type": "string",
                        "description": "Digest to analyze"
                    }
                },
                "required": ["hash"]
            }),
        },
        Tool {
            name: "uuid_inspect".to_string(),
            description: "Parse a UUID in hyphenated, simple, braced or URN form and report its version, variant and, for time-based versions, the embedded timestamp.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "uuid": {
                        "type": "string",
                        "description": "UUID to inspect"
                    }
                },
                "required": ["uuid"]
            }),
        },
        Tool {
            name: "deps_check".to_string(),
            description: "Check the dependencies and devDependencies of a package.json against the latest versions published on the npm registry. Registry answers are cached for 24 hours. Uses NPM_REGISTRY_URL and WEBTOOLS_CACHE_DIR when set.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "manifest": {
                        "type": "string",
                        "description": "Path to package.json (default: package.json)"
                    },
                    "refresh": {
                        "type": "boolean",
                        "description": "Ignore cached versions (default: false)"
                    }
                },
                "required": []
            }),
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result)
        .map_err(|e| JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, format!("Internal error: {e}")))
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::new(JsonRpcError::INVALID_PARAMS, format!("Invalid params: {e}")))?;

    match params.name.as_str() {
        "units_convert" => units::handle_units_convert(params.arguments, global),
        "jwt_decode" => jwt::handle_jwt_decode(params.arguments, global),
        "jwt_verify" => jwt::handle_jwt_verify(params.arguments, global),
        "hash_identify" => hash::handle_hash_identify(params.arguments, global),
        "uuid_inspect" => uuid::handle_uuid_inspect(params.arguments, global),
        "deps_check" => deps::handle_deps_check(params.arguments, global).await,
        _ => Err(JsonRpcError::new(
            JsonRpcError::INVALID_PARAMS,
            format!("Unknown tool: {}", params.name),
        )),
    }
}

/// Deserialize tool arguments, mapping failures to `-32602`.
fn parse_args<T: DeserializeOwned>(arguments: Option<serde_json::Value>) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::new(JsonRpcError::INVALID_PARAMS, format!("Invalid arguments: {e}")))
}

/// Wrap a tool's output as pretty JSON text content.
fn to_call_result<T: Serialize>(
    output: color_eyre::Result<T>,
) -> Result<serde_json::Value, JsonRpcError> {
    let output = output.map_err(|e| {
        JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, format!("Tool execution error: {e}"))
    })?;

    let json_string = serde_json::to_string_pretty(&output).map_err(|e| {
        JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, format!("Serialization error: {e}"))
    })?;

    let result = CallToolResult {
        content: vec![Content::Text { text: json_string }],
        is_error: None,
    };

    serde_json::to_value(result)
        .map_err(|e| JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, format!("Internal error: {e}")))
}

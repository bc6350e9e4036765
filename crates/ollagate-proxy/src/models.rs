//! Cloud-dialect (OpenAI API) data models.
//!
//! The inbound chat request is the OpenAI shape plus the local extras
//! `options` and `keep_alive`. Everything this module does not model
//! explicitly is carried through `extra` so it reaches the backend intact.

use axum::http::StatusCode;
use ollagate_core::KeepAlive;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Chat Completion Request Types
// =============================================================================

/// Request received on `/v1/chat/completions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model name to use.
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    /// Array of chat messages.
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ChatMessage>,
    /// Whether to stream the response.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stream: bool,
    /// Maximum tokens to generate.
    #[serde(default)]
    pub max_tokens: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub seed: Option<i64>,
    /// Stop sequences, either a single string or a list.
    #[serde(default)]
    pub stop: Option<Value>,
    #[serde(default)]
    pub presence_penalty: Option<f64>,
    #[serde(default)]
    pub frequency_penalty: Option<f64>,

    /// Local-dialect generation options. Never forwarded.
    #[serde(default)]
    pub options: Option<Map<String, Value>>,
    /// Local-dialect keep-alive. Never forwarded.
    #[serde(default)]
    pub keep_alive: Option<KeepAlive>,

    /// Any other top-level field (tools, `response_format`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", "assistant", or "tool".
    pub role: String,
    /// Text or an array of content parts.
    #[serde(default)]
    pub content: Value,
    /// Tool calls, names, tool call ids and so on.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request sent to the backend's `/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct CloudChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Models Endpoint Types
// =============================================================================

/// Response from the backend's `/models` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<CloudModel>,
}

/// A single backend model record.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudModel {
    pub id: String,
    /// Creation time in Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: i64,
}

// =============================================================================
// Error Response Types
// =============================================================================

/// Error response matching OpenAI format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub param: Option<String>,
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create an error response whose type follows from the status code.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: error_type_for(status).to_string(),
                param: None,
                code: None,
            },
        }
    }
}

/// OpenAI error type for an HTTP status.
pub fn error_type_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "invalid_request_error",
        StatusCode::NOT_FOUND => "not_found_error",
        _ => "api_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_extras_are_captured() {
        let req: ChatCompletionRequest = serde_json::from_value(json!({
            "model": "gpt-4.1-mini",
            "messages": [{"role": "user", "content": "hi", "name": "bob"}],
            "stream": true,
            "options": {"temperature": 0.2},
            "keep_alive": "10m",
            "tools": [{"type": "function"}],
            "response_format": {"type": "json_object"}
        }))
        .unwrap();

        assert!(req.stream);
        assert_eq!(req.options.unwrap()["temperature"], json!(0.2));
        assert_eq!(req.keep_alive.unwrap().to_string(), "10m0s");
        assert!(req.extra.contains_key("tools"));
        assert!(req.extra.contains_key("response_format"));
        assert!(!req.extra.contains_key("options"));
        assert_eq!(req.messages[0].extra["name"], json!("bob"));
    }

    #[test]
    fn test_null_fields_read_as_missing() {
        let req: ChatCompletionRequest = serde_json::from_value(json!({
            "model": "gpt-4.1-mini",
            "messages": null,
            "stream": null
        }))
        .unwrap();
        assert!(!req.stream);
        assert!(req.messages.is_empty());
        assert!(req.extra.is_empty());

        let list: ModelList =
            serde_json::from_value(json!({"data": [{"id": "a", "created": null}]})).unwrap();
        assert_eq!(list.data[0].created, 0);
    }

    #[test]
    fn test_invalid_keep_alive_is_rejected() {
        let result = serde_json::from_value::<ChatCompletionRequest>(json!({
            "model": "m",
            "messages": [],
            "keep_alive": "soon"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_shape() {
        let body = serde_json::to_value(ErrorResponse::new(
            StatusCode::BAD_REQUEST,
            "Request body is empty",
        ))
        .unwrap();
        assert_eq!(
            body,
            json!({"error": {
                "message": "Request body is empty",
                "type": "invalid_request_error",
                "param": null,
                "code": null
            }})
        );
        assert_eq!(error_type_for(StatusCode::NOT_FOUND), "not_found_error");
        assert_eq!(error_type_for(StatusCode::BAD_GATEWAY), "api_error");
    }
}

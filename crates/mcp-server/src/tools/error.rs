use rmcp::model::{CallToolResult, Content};
use rulebook_protocol::ErrorEnvelope;
use serde_json::json;

pub(super) fn tool_error_envelope(error: ErrorEnvelope) -> CallToolResult {
    let mut result = CallToolResult::error(vec![Content::text(error.message.clone())]);
    result.structured_content = Some(json!({ "error": error }));
    result
}

pub(super) fn unknown_key(key: &str, message: impl Into<String>) -> CallToolResult {
    tool_error_envelope(ErrorEnvelope {
        code: "unknown_key".to_string(),
        message: message.into(),
        details: Some(json!({ "key": key })),
        hint: Some("Call list_rules to see the available keys, or use ALL.".to_string()),
    })
}

pub(super) fn invalid_request(message: impl Into<String>) -> CallToolResult {
    tool_error_envelope(ErrorEnvelope {
        code: "invalid_request".to_string(),
        message: message.into(),
        details: None,
        hint: None,
    })
}

pub(super) fn internal_error(message: impl Into<String>) -> CallToolResult {
    tool_error_envelope(ErrorEnvelope {
        code: "internal".to_string(),
        message: message.into(),
        details: None,
        hint: None,
    })
}

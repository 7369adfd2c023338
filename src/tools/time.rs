/// Current Time Tool
///
/// Reports the current UTC time as an RFC 3339 timestamp with millisecond
/// precision. Takes no arguments; extra keys in the argument bag are ignored.

use crate::core::dispatch::{ToolHandler, ToolOutput, ToolRegistry, ToolSpec};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// Current UTC time, millisecond precision, trailing `Z`.
/// Shared with the HTTP handlers that stamp their responses.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn register(registry: &mut ToolRegistry) {
    let spec = ToolSpec {
        name: "get_time".to_string(),
        description: "Get the current time".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    };

    let handler: ToolHandler = Box::new(|_args: &Value| {
        Ok(ToolOutput::text(format!("Current time: {}", now_rfc3339())))
    });

    registry.register(spec, handler);
}

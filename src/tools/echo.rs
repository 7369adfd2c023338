/// Echo Tool
///
/// Returns the provided message prefixed with "Echo: ". Demonstrates the
/// registration pattern every tool in this module follows: a descriptor with
/// a JSON Schema plus a handler that validates its own required keys inline.

use crate::core::dispatch::{DispatchError, ToolHandler, ToolOutput, ToolRegistry, ToolSpec};
use serde_json::Value;

pub fn register(registry: &mut ToolRegistry) {
    let spec = ToolSpec {
        name: "echo".to_string(),
        description: "Echo back the provided message".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to echo back"
                }
            },
            "required": ["message"]
        }),
    };

    let handler: ToolHandler = Box::new(|args: &Value| {
        // An empty message is rejected the same as a missing one.
        let message = args
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .ok_or_else(|| DispatchError::invalid_params("Missing message parameter"))?;

        Ok(ToolOutput::text(format!("Echo: {message}")))
    });

    registry.register(spec, handler);
}

/// Arithmetic Tool
///
/// Applies one of four operations to a pair of numbers and reports the
/// equation as text. All validation failures are parameter errors: the
/// operands must be numbers, the operation must be one of the declared
/// enum values, and dividing by zero is rejected before evaluation.

use crate::core::dispatch::{DispatchError, ToolHandler, ToolOutput, ToolRegistry, ToolSpec};
use serde_json::Value;

pub fn register(registry: &mut ToolRegistry) {
    let spec = ToolSpec {
        name: "calculate".to_string(),
        description: "Perform basic arithmetic calculations".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["add", "subtract", "multiply", "divide"],
                    "description": "The arithmetic operation to perform"
                },
                "a": {
                    "type": "number",
                    "description": "First number"
                },
                "b": {
                    "type": "number",
                    "description": "Second number"
                }
            },
            "required": ["operation", "a", "b"]
        }),
    };

    let handler: ToolHandler = Box::new(|args: &Value| {
        let operation = args.get("operation").and_then(Value::as_str);
        let a = args.get("a").and_then(Value::as_f64);
        let b = args.get("b").and_then(Value::as_f64);

        let (Some(operation), Some(a), Some(b)) = (operation, a, b) else {
            return Err(DispatchError::invalid_params(
                "Missing or invalid parameters for calculation",
            ));
        };

        let result = match operation {
            "add" => a + b,
            "subtract" => a - b,
            "multiply" => a * b,
            "divide" => {
                if b == 0.0 {
                    return Err(DispatchError::invalid_params("Cannot divide by zero"));
                }
                a / b
            }
            other => {
                return Err(DispatchError::invalid_params(format!(
                    "Unknown operation: {other}"
                )));
            }
        };

        // f64 Display renders the shortest round-trip form, so whole numbers
        // print without a trailing ".0".
        Ok(ToolOutput::text(format!("{a} {operation} {b} = {result}")))
    });

    registry.register(spec, handler);
}

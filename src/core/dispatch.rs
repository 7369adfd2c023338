/// Tool Dispatch Core
///
/// This module contains the validated command-dispatch core shared by every
/// transport:
/// - Tool descriptors (name, description, input schema)
/// - The tool registry, built once at startup and read-only afterwards
/// - The dispatch entry point that validates arguments and runs one handler
/// - The dispatch error taxonomy mapped onto JSON-RPC error codes

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure modes of a dispatch call.
///
/// Both caller-visible variants are recovered at the RPC boundary and turned
/// into structured error responses; neither is fatal to the process.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Caller-supplied arguments are missing, mistyped, or semantically
    /// illegal (e.g. divide by zero).
    #[error("{0}")]
    InvalidParams(String),
    /// The requested tool name is not present in the registry.
    #[error("Unknown tool: {0}")]
    MethodNotFound(String),
    /// Unexpected handler failure. Logged at the RPC boundary and surfaced
    /// to the caller as a generic failure.
    #[allow(dead_code)]
    #[error("{0}")]
    Internal(String),
}

impl DispatchError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        DispatchError::InvalidParams(message.into())
    }

    /// JSON-RPC 2.0 error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            DispatchError::InvalidParams(_) => -32602,
            DispatchError::MethodNotFound(_) => -32601,
            DispatchError::Internal(_) => -32603,
        }
    }
}

/// One entry in a tool result payload. Only text content exists today.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Successful outcome of a tool call: an ordered sequence of content items.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: Vec<ContentItem>,
}

impl ToolOutput {
    /// Single text item, the shape every built-in tool produces.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
        }
    }
}

/// Tool descriptor as reported by `tools/list`.
///
/// Created once during registry construction and never mutated.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Unique tool identifier (e.g. "echo", "calculate")
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema describing the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool handler function type.
///
/// Handlers are pure functions of their argument bag: they validate their own
/// required keys (presence, then type) before any domain logic, and must be
/// `Send + Sync` so the registry can be shared across worker threads.
pub type ToolHandler = Box<dyn Fn(&Value) -> Result<ToolOutput, DispatchError> + Send + Sync>;

/// Registry of available tools.
///
/// Holds an ordered list of descriptors for discovery and a map of names to
/// handler functions for execution. Built once at startup; dispatch only ever
/// takes `&self`, so concurrent callers need no coordination.
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a tool. Startup only; names must be unique.
    pub fn register(&mut self, spec: ToolSpec, handler: ToolHandler) {
        debug_assert!(
            !self.handlers.contains_key(&spec.name),
            "duplicate tool name: {}",
            spec.name
        );
        let name = spec.name.clone();
        self.tools.push(spec);
        self.handlers.insert(name, handler);
    }

    /// The full descriptor sequence, verbatim and in registration order.
    pub fn list(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Validate and execute a single tool call.
    ///
    /// `args` is the raw argument bag from the request; `None` or JSON null is
    /// rejected before any lookup. Exactly one handler runs per invocation.
    pub fn dispatch(&self, name: &str, args: Option<&Value>) -> Result<ToolOutput, DispatchError> {
        let args = match args {
            Some(value) if !value.is_null() => value,
            _ => return Err(DispatchError::invalid_params("Missing arguments")),
        };

        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| DispatchError::MethodNotFound(name.to_string()))?;

        handler(args)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::build_registry;
    use serde_json::json;

    fn text_of(output: &ToolOutput) -> &str {
        &output.content[0].text
    }

    #[test]
    fn echo_returns_prefixed_message() {
        let registry = build_registry();
        let args = json!({ "message": "hi" });
        let output = registry.dispatch("echo", Some(&args)).unwrap();
        assert_eq!(text_of(&output), "Echo: hi");
    }

    #[test]
    fn echo_without_message_is_invalid_params() {
        let registry = build_registry();
        let args = json!({});
        let err = registry.dispatch("echo", Some(&args)).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParams(_)));
        assert_eq!(err.to_string(), "Missing message parameter");
    }

    #[test]
    fn echo_with_empty_message_is_invalid_params() {
        // Present-but-empty is rejected exactly like an absent message.
        let registry = build_registry();
        let args = json!({ "message": "" });
        let err = registry.dispatch("echo", Some(&args)).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParams(_)));
    }

    #[test]
    fn echo_with_non_string_message_is_invalid_params() {
        let registry = build_registry();
        let args = json!({ "message": 42 });
        let err = registry.dispatch("echo", Some(&args)).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParams(_)));
    }

    #[test]
    fn get_time_returns_parseable_utc_timestamp() {
        let registry = build_registry();
        let args = json!({});
        let output = registry.dispatch("get_time", Some(&args)).unwrap();
        let text = text_of(&output);
        let stamp = text
            .strip_prefix("Current time: ")
            .expect("response starts with 'Current time: '");
        assert!(stamp.ends_with('Z'));
        chrono::DateTime::parse_from_rfc3339(stamp).expect("timestamp parses as RFC 3339");
    }

    #[test]
    fn calculate_covers_all_operations() {
        let registry = build_registry();
        let cases = [
            ("add", 2.0, 3.0, "2 add 3 = 5"),
            ("subtract", 10.0, 4.0, "10 subtract 4 = 6"),
            ("multiply", 2.5, 4.0, "2.5 multiply 4 = 10"),
            ("divide", 7.0, 2.0, "7 divide 2 = 3.5"),
        ];
        for (operation, a, b, expected) in cases {
            let args = json!({ "operation": operation, "a": a, "b": b });
            let output = registry.dispatch("calculate", Some(&args)).unwrap();
            assert_eq!(text_of(&output), expected);
        }
    }

    #[test]
    fn calculate_divide_by_zero_is_invalid_params() {
        let registry = build_registry();
        let args = json!({ "operation": "divide", "a": 1, "b": 0 });
        let err = registry.dispatch("calculate", Some(&args)).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParams(_)));
        assert_eq!(err.to_string(), "Cannot divide by zero");
    }

    #[test]
    fn calculate_unknown_operation_names_the_operation() {
        let registry = build_registry();
        let args = json!({ "operation": "mod", "a": 1, "b": 2 });
        let err = registry.dispatch("calculate", Some(&args)).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParams(_)));
        assert_eq!(err.to_string(), "Unknown operation: mod");
    }

    #[test]
    fn calculate_with_missing_or_mistyped_operands_is_invalid_params() {
        let registry = build_registry();
        for args in [
            json!({ "operation": "add", "a": 2 }),
            json!({ "operation": "add", "a": "2", "b": 3 }),
            json!({ "a": 2, "b": 3 }),
            json!({ "operation": 7, "a": 2, "b": 3 }),
        ] {
            let err = registry.dispatch("calculate", Some(&args)).unwrap_err();
            assert!(matches!(err, DispatchError::InvalidParams(_)), "args: {args}");
            assert_eq!(
                err.to_string(),
                "Missing or invalid parameters for calculation"
            );
        }
    }

    #[test]
    fn unknown_tool_is_method_not_found() {
        let registry = build_registry();
        let args = json!({});
        let err = registry.dispatch("bogus", Some(&args)).unwrap_err();
        assert!(matches!(err, DispatchError::MethodNotFound(_)));
        assert_eq!(err.to_string(), "Unknown tool: bogus");
    }

    #[test]
    fn absent_or_null_arguments_are_invalid_params() {
        let registry = build_registry();
        let err = registry.dispatch("echo", None).unwrap_err();
        assert_eq!(err.to_string(), "Missing arguments");

        let null = Value::Null;
        let err = registry.dispatch("echo", Some(&null)).unwrap_err();
        assert_eq!(err.to_string(), "Missing arguments");
    }

    #[test]
    fn list_is_stable_and_complete() {
        let registry = build_registry();
        let first: Vec<ToolSpec> = registry.list().to_vec();
        assert_eq!(first.len(), 3);
        for spec in &first {
            assert!(!spec.name.is_empty());
            assert!(!spec.description.is_empty());
        }
        let names: Vec<&str> = first.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["echo", "get_time", "calculate"]);

        // Dispatching does not mutate the registry.
        let args = json!({ "message": "hi" });
        registry.dispatch("echo", Some(&args)).unwrap();
        assert_eq!(registry.list(), first.as_slice());
    }

    #[test]
    fn error_codes_match_json_rpc() {
        assert_eq!(DispatchError::invalid_params("x").code(), -32602);
        assert_eq!(DispatchError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(DispatchError::Internal("x".into()).code(), -32603);
    }
}

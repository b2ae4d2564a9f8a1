//! Built-in task processors

mod annotation;
mod introspection;
mod reflection;

pub use annotation::AnnotationProcessor;
pub use introspection::{IntrospectionProcessor, MemoryDiagnostic, MemoryEntry};
pub use reflection::{ReflectionProcessor, ValidationResult, ValidationStatus};

use aethero_core::{Payload, TaskFailure};
use serde_json::Value;

/// Borrow a required string field from the task
pub(crate) fn required_str<'a>(task: &'a Payload, key: &str) -> Result<&'a str, TaskFailure> {
    match task.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(TaskFailure::validation(format!(
            "field '{key}' must be a string, got {}",
            type_name(other)
        ))),
        None => Err(TaskFailure::validation(format!("missing field '{key}'"))),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serialize a value that is known to be an object into a payload
pub(crate) fn to_payload<T: serde::Serialize>(value: &T) -> Result<Payload, TaskFailure> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TaskFailure::internal(format!(
            "expected an object, serialized to {}",
            type_name(&other)
        ))),
        Err(e) => Err(TaskFailure::internal(format!("serialization failed: {e}"))),
    }
}

//! Pluggable structural validation for decoded request bodies.
//!
//! A router owns at most one [`Validator`] (see [`Router::validator`]); every
//! [`Request`](crate::Request) it builds carries it, and
//! [`Request::body`](crate::Request::body) runs it after a successful decode.
//! Without one, bodies are accepted as decoded.
//!
//! Validators see the decoded value as a [`serde_json::Value`] tree, whatever
//! the wire format was, so one validator covers JSON and XML bodies alike.
//!
//! [`Router::validator`]: crate::Router::validator

use serde_json::Value;

/// Validation failure. Its message becomes the `detail` of the error envelope.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Checks a decoded body.
///
/// Implemented for plain functions and closures too:
///
/// ```rust
/// use restful::{Router, ValidationError};
/// use serde_json::Value;
///
/// let router = Router::new().validator(|body: &Value| {
///     match body.get("name") {
///         Some(Value::String(s)) if !s.is_empty() => Ok(()),
///         _ => Err(ValidationError::new("name is required")),
///     }
/// });
/// ```
pub trait Validator: Send + Sync + 'static {
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
{
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self(value)
    }
}

/// Accepts everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Permissive;

impl Validator for Permissive {
    fn validate(&self, _value: &Value) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Validates bodies against a JSON Schema document.
///
/// All violations are reported, joined with `"; "`.
pub struct SchemaValidator {
    schema: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compiles `schema`. Fails if the schema itself is invalid.
    pub fn new(schema: &Value) -> Result<Self, ValidationError> {
        let schema = jsonschema::validator_for(schema)
            .map_err(|e| ValidationError::new(format!("invalid schema: {e}")))?;
        Ok(Self { schema })
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let violations: Vec<String> = self
            .schema
            .iter_errors(value)
            .map(|e| e.to_string())
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations.join("; ")))
        }
    }
}

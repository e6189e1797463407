//! HTTP handlers for the camp and speaker resources.

pub mod camps;
pub mod speakers;

pub use camps::*;
pub use speakers::*;

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

fn body_to_object(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Deserialize an already validated body into its wire model.
fn parse_model<T: DeserializeOwned>(body: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(body)).map_err(|e| AppError::BadRequest(e.to_string()))
}

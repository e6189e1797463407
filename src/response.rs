//! Response helpers shared by the resource handlers.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

/// 201 with a `Location` header pointing at the new resource.
pub fn created<T: Serialize>(location: &str, data: T) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::CREATED, [(header::LOCATION, value)], Json(data)).into_response(),
        Err(_) => {
            tracing::warn!(location, "location is not a valid header value; omitting");
            (StatusCode::CREATED, Json(data)).into_response()
        }
    }
}

pub fn error_body(code: &str, message: String, details: Option<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": code,
            "message": message,
            "details": details
        }
    })
}

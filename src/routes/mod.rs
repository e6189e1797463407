//! Router assembly. Resource routes live under [`API_PREFIX`]; the link templates
//! registered in [`route_table`] must stay in step with them.

mod common;

pub use common::common_routes;

use crate::error::AppError;
use crate::handlers::{
    create_camp, create_speaker, delete_camp, delete_speaker, get_camp, get_speaker, list_camps,
    list_speakers, patch_camp, patch_speaker, replace_camp, replace_speaker,
};
use crate::mapping::{RouteTable, CAMP_GET, SPEAKER_GET};
use crate::response::error_body;
use crate::state::AppState;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

pub const API_PREFIX: &str = "/api";
pub const CAMPS_PATH: &str = "/camps";
pub const CAMP_PATH: &str = "/camps/:moniker";
pub const SPEAKERS_PATH: &str = "/camps/:moniker/speakers";
pub const SPEAKER_PATH: &str = "/camps/:moniker/speakers/:id";

/// Named routes the mapper builds resource links from.
pub fn route_table() -> RouteTable {
    RouteTable::new()
        .register(CAMP_GET, format!("{}{}", API_PREFIX, CAMP_PATH))
        .register(SPEAKER_GET, format!("{}{}", API_PREFIX, SPEAKER_PATH))
}

pub fn camp_routes(state: AppState) -> Router {
    Router::new()
        .route(CAMPS_PATH, get(list_camps).post(create_camp))
        .route(
            CAMP_PATH,
            get(get_camp).put(replace_camp).patch(patch_camp).delete(delete_camp),
        )
        .route(SPEAKERS_PATH, get(list_speakers).post(create_speaker))
        .route(
            SPEAKER_PATH,
            get(get_speaker)
                .put(replace_speaker)
                .patch(patch_speaker)
                .delete(delete_speaker),
        )
        .with_state(state)
}

/// Unexpected failures inside a handler surface as a generic 400, never a dropped connection.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error_body("bad_request", "request could not be processed".into(), None)),
    )
        .into_response()
}

async fn fallback() -> AppError {
    AppError::NotFound("no such route".into())
}

/// The complete application: common routes plus the resource API, with tracing,
/// a request body limit and panic recovery.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(API_PREFIX, camp_routes(state))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

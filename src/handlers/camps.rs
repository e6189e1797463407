//! Camp resource handlers: list, get, create, update (PUT/PATCH), delete.

use crate::error::AppError;
use crate::extractors::RoutingContext;
use crate::handlers::{body_to_object, parse_model};
use crate::mapping::CAMP_GET;
use crate::model::{Camp, CampModel};
use crate::response::{created, ok};
use crate::service::{camp_rules, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampQuery {
    #[serde(default)]
    pub include_speakers: bool,
}

async fn find_camp(state: &AppState, moniker: &str, include_speakers: bool) -> Result<Camp, AppError> {
    state
        .repo
        .camp_by_moniker(moniker, include_speakers)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("camp {} was not found", moniker)))
}

/// GET /api/camps
pub async fn list_camps(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
) -> Result<impl IntoResponse, AppError> {
    let camps = state.repo.all_camps().await?;
    let links = state.mapper.resolver(ctx.as_ref());
    Ok(ok(state.mapper.camps_to_models(&camps, &links)?))
}

/// GET /api/camps/:moniker?includeSpeakers=bool
pub async fn get_camp(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<CampQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(moniker) = path?;
    let Query(query) = query?;
    let camp = find_camp(&state, &moniker, query.include_speakers).await?;
    let links = state.mapper.resolver(ctx.as_ref());
    Ok(ok(state.mapper.camp_to_model(&camp, &links)?))
}

/// POST /api/camps
pub async fn create_camp(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let body = body_to_object(body)?;
    if let Err(e) = RequestValidator::validate(&body, camp_rules()) {
        tracing::info!(error = %e, "received invalid camp");
        return Err(e);
    }
    let model: CampModel = parse_model(body)?;
    if let (Some(start), Some(end)) = (model.start_date, model.end_date) {
        RequestValidator::check_date_span(start, end)?;
    }

    tracing::info!(moniker = ?model.moniker, "creating a new camp");
    let camp = state.mapper.model_to_camp(&model);
    RequestValidator::check_length_span(camp.event_date, camp.length)?;
    let saved = state.repo.add_camp(camp).await?;

    let links = state.mapper.resolver(ctx.as_ref());
    let location = links.resolve(&saved, CAMP_GET)?;
    tracing::info!(moniker = %saved.moniker, url = %location, "camp created");
    Ok(created(&location, state.mapper.camp_to_model(&saved, &links)?))
}

/// PUT /api/camps/:moniker (every required field must be present)
pub async fn replace_camp(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(moniker) = path?;
    let Json(body) = body?;
    update_camp(&state, ctx, &moniker, body, false).await
}

/// PATCH /api/camps/:moniker (only the fields sent are validated and applied)
pub async fn patch_camp(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(moniker) = path?;
    let Json(body) = body?;
    update_camp(&state, ctx, &moniker, body, true).await
}

async fn update_camp(
    state: &AppState,
    ctx: Option<crate::mapping::RequestContext>,
    moniker: &str,
    body: Value,
    partial: bool,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_object(body)?;
    if partial {
        RequestValidator::validate_partial(&body, camp_rules())?;
    } else {
        RequestValidator::validate(&body, camp_rules())?;
    }
    let model: CampModel = parse_model(body)?;

    let mut camp = find_camp(state, moniker, false).await?;
    if let Some(end) = model.end_date {
        RequestValidator::check_date_span(model.start_date.unwrap_or(camp.event_date), end)?;
    }
    state.mapper.merge_camp(&model, &mut camp);
    RequestValidator::check_length_span(camp.event_date, camp.length)?;
    let saved = state.repo.update_camp(&camp).await?;
    tracing::info!(moniker = %moniker, new_moniker = %saved.moniker, "camp updated");

    let links = state.mapper.resolver(ctx.as_ref());
    Ok(ok(state.mapper.camp_to_model(&saved, &links)?))
}

/// DELETE /api/camps/:moniker
pub async fn delete_camp(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(moniker) = path?;
    let camp = find_camp(&state, &moniker, false).await?;
    if !state.repo.delete_camp(camp.id).await? {
        return Err(AppError::NotFound(format!("camp {} was not found", moniker)));
    }
    tracing::info!(moniker = %moniker, "camp deleted");
    Ok(StatusCode::OK)
}

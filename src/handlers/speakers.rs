//! Speaker handlers, nested under a camp: every speaker route checks that the speaker
//! belongs to the camp named in the path.

use crate::error::AppError;
use crate::extractors::RoutingContext;
use crate::handlers::{body_to_object, parse_model};
use crate::mapping::{RequestContext, SPEAKER_GET};
use crate::model::{Speaker, SpeakerModel};
use crate::response::{created, ok};
use crate::service::{speaker_rules, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

/// Load speaker `id` and make sure it is one of `moniker`'s speakers.
async fn find_owned_speaker(state: &AppState, moniker: &str, id: i64) -> Result<Speaker, AppError> {
    let speaker = state
        .repo
        .speaker(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("speaker #{} was not found", id)))?;
    if speaker.camp.moniker != moniker {
        tracing::info!(id, moniker, owner = %speaker.camp.moniker, "speaker requested under the wrong camp");
        return Err(AppError::Mismatch(format!(
            "speaker #{} doesn't belong to camp {}",
            id, moniker
        )));
    }
    Ok(speaker)
}

/// GET /api/camps/:moniker/speakers
pub async fn list_speakers(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(moniker) = path?;
    let speakers = state.repo.speakers_by_moniker(&moniker).await?;
    let links = state.mapper.resolver(ctx.as_ref());
    Ok(ok(state.mapper.speakers_to_models(&speakers, &links)?))
}

/// GET /api/camps/:moniker/speakers/:id
pub async fn get_speaker(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((moniker, id)) = path?;
    let speaker = find_owned_speaker(&state, &moniker, id).await?;
    let links = state.mapper.resolver(ctx.as_ref());
    Ok(ok(state.mapper.speaker_to_model(&speaker, &links)?))
}

/// POST /api/camps/:moniker/speakers
pub async fn create_speaker(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(moniker) = path?;
    let Json(body) = body?;
    let body = body_to_object(body)?;
    RequestValidator::validate(&body, speaker_rules())?;
    let model: SpeakerModel = parse_model(body)?;

    // The wire model carries no camp; the path names it.
    let camp = state
        .repo
        .camp_by_moniker(&moniker, false)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("could not find camp \"{}\"", moniker)))?;
    let profile = state.mapper.model_to_speaker_profile(&model);
    let saved = state.repo.add_speaker(&camp.camp_ref(), profile).await?;

    let links = state.mapper.resolver(ctx.as_ref());
    let location = links.resolve(&saved, SPEAKER_GET)?;
    tracing::info!(moniker = %moniker, id = saved.id, url = %location, "speaker added");
    Ok(created(&location, state.mapper.speaker_to_model(&saved, &links)?))
}

/// PUT /api/camps/:moniker/speakers/:id
pub async fn replace_speaker(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    path: Result<Path<(String, i64)>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((moniker, id)) = path?;
    let Json(body) = body?;
    update_speaker(&state, ctx, &moniker, id, body, false).await
}

/// PATCH /api/camps/:moniker/speakers/:id
pub async fn patch_speaker(
    State(state): State<AppState>,
    RoutingContext(ctx): RoutingContext,
    path: Result<Path<(String, i64)>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((moniker, id)) = path?;
    let Json(body) = body?;
    update_speaker(&state, ctx, &moniker, id, body, true).await
}

async fn update_speaker(
    state: &AppState,
    ctx: Option<RequestContext>,
    moniker: &str,
    id: i64,
    body: Value,
    partial: bool,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_object(body)?;
    if partial {
        RequestValidator::validate_partial(&body, speaker_rules())?;
    } else {
        RequestValidator::validate(&body, speaker_rules())?;
    }
    let model: SpeakerModel = parse_model(body)?;

    let mut speaker = find_owned_speaker(state, moniker, id).await?;
    state.mapper.merge_speaker(&model, &mut speaker);
    let saved = state.repo.update_speaker(&speaker).await?;
    tracing::info!(moniker = %moniker, id, "speaker updated");

    let links = state.mapper.resolver(ctx.as_ref());
    Ok(ok(state.mapper.speaker_to_model(&saved, &links)?))
}

/// DELETE /api/camps/:moniker/speakers/:id
pub async fn delete_speaker(
    State(state): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((moniker, id)) = path?;
    let speaker = find_owned_speaker(&state, &moniker, id).await?;
    if !state.repo.delete_speaker(speaker.id).await? {
        return Err(AppError::NotFound(format!("speaker #{} was not found", id)));
    }
    tracing::info!(moniker = %moniker, id, "speaker deleted");
    Ok(StatusCode::OK)
}

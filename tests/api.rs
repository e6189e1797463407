//! End-to-end tests against the full router backed by the in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use camp_api::{app, AppState, InMemoryCampRepository};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const HOST: &str = "localhost:5000";

fn test_app() -> Router {
    let state = AppState::new(Arc::new(InMemoryCampRepository::default()));
    app(state, 64 * 1024)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
    let mut req = Request::builder().method(method).uri(uri).header(header::HOST, HOST);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let location = res
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, location, json)
}

fn arc2024() -> Value {
    json!({
        "moniker": "ARC2024",
        "name": "Atlanta Regional Code Camp",
        "startDate": "2024-06-01",
        "endDate": "2024-06-03",
        "description": "Three days of sessions for developers in the region.",
        "locationCityTown": "Atlanta",
        "locationCountry": "USA"
    })
}

async fn create_ada(app: &Router) -> Value {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/camps/ARC2024/speakers",
        Some(json!({ "name": "Ada", "companyName": "Analytical Engines" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn create_camp_computes_length_and_location() {
    let app = test_app();
    let (status, location, body) = send(&app, Method::POST, "/api/camps", Some(arc2024())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(location.as_deref(), Some("http://localhost:5000/api/camps/ARC2024"));
    assert_eq!(body["length"], 3);
    assert_eq!(body["startDate"], "2024-06-01");
    assert_eq!(body["endDate"], "2024-06-03");
    assert!(body["url"].as_str().unwrap().ends_with("/camps/ARC2024"));
    assert_eq!(body["locationCityTown"], "Atlanta");

    let (status, _, list) = send(&app, Method::GET, "/api/camps", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn speaker_url_names_its_camp() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    let ada = create_ada(&app).await;

    let id = ada["id"].as_i64().unwrap();
    assert_eq!(
        ada["url"],
        format!("http://localhost:5000/api/camps/ARC2024/speakers/{}", id)
    );
    assert_eq!(ada["companyName"], "Analytical Engines");

    let (status, _, fetched) = send(&app, Method::GET, &format!("/api/camps/ARC2024/speakers/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Ada");
}

#[tokio::test]
async fn speaker_under_another_camp_is_a_mismatch() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    let mut other = arc2024();
    other["moniker"] = json!("OTHER");
    send(&app, Method::POST, "/api/camps", Some(other)).await;
    let ada = create_ada(&app).await;
    let id = ada["id"].as_i64().unwrap();

    let (status, _, body) = send(&app, Method::GET, &format!("/api/camps/OTHER/speakers/{}", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "mismatch");

    let (status, _, _) = send(&app, Method::DELETE, &format!("/api/camps/OTHER/speakers/{}", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_moniker_is_not_found() {
    let app = test_app();
    let (status, _, body) = send(&app, Method::GET, "/api/camps/NOPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, _, _) = send(&app, Method::GET, "/api/camps/NOPE/speakers/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn short_moniker_fails_validation() {
    let app = test_app();
    let mut body = arc2024();
    body["moniker"] = json!("AB");
    let (status, location, err) = send(&app, Method::POST, "/api/camps", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(location.is_none());
    assert_eq!(err["error"]["code"], "validation_error");
    let fields: Vec<&str> = err["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"moniker"));
}

#[tokio::test]
async fn end_before_start_is_rejected() {
    let app = test_app();
    let mut body = arc2024();
    body["endDate"] = json!("2024-05-01");
    let (status, _, _) = send(&app, Method::POST, "/api/camps", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_moniker_is_a_persistence_error() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    let (status, _, body) = send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "persistence_error");
}

#[tokio::test]
async fn patch_changes_only_sent_fields() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;

    let (status, _, body) = send(
        &app,
        Method::PATCH,
        "/api/camps/ARC2024",
        Some(json!({ "name": "Atlanta Code Camp 2024" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Atlanta Code Camp 2024");
    assert_eq!(body["length"], 3);
    assert_eq!(body["locationCityTown"], "Atlanta");

    // A new end date recomputes the length from the stored start.
    let (_, _, body) = send(&app, Method::PATCH, "/api/camps/ARC2024", Some(json!({ "endDate": "2024-06-01" }))).await;
    assert_eq!(body["length"], 1);
}

#[tokio::test]
async fn put_requires_the_full_camp() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;

    let (status, _, _) = send(&app, Method::PUT, "/api/camps/ARC2024", Some(json!({ "name": "Renamed camp" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut full = arc2024();
    full["name"] = json!("Renamed camp");
    let (status, _, body) = send(&app, Method::PUT, "/api/camps/ARC2024", Some(full)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed camp");
}

#[tokio::test]
async fn include_speakers_embeds_them() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    create_ada(&app).await;

    let (_, _, plain) = send(&app, Method::GET, "/api/camps/ARC2024", None).await;
    assert!(plain.get("speakers").is_none());

    let (status, _, full) = send(&app, Method::GET, "/api/camps/ARC2024?includeSpeakers=true", None).await;
    assert_eq!(status, StatusCode::OK);
    let speakers = full["speakers"].as_array().unwrap();
    assert_eq!(speakers.len(), 1);
    assert_eq!(speakers[0]["name"], "Ada");
    assert!(speakers[0]["url"].as_str().unwrap().contains("/camps/ARC2024/speakers/"));
}

#[tokio::test]
async fn speaker_for_unknown_camp_is_rejected() {
    let app = test_app();
    let (status, _, body) = send(&app, Method::POST, "/api/camps/NOPE/speakers", Some(json!({ "name": "Ada" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn deleting_a_camp_removes_its_speakers() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    let ada = create_ada(&app).await;
    let id = ada["id"].as_i64().unwrap();

    let (status, _, _) = send(&app, Method::DELETE, "/api/camps/ARC2024", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, Method::GET, "/api/camps/ARC2024", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, Method::GET, &format!("/api/camps/ARC2024/speakers/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, Method::DELETE, "/api/camps/ARC2024", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn speaker_update_and_delete() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    let ada = create_ada(&app).await;
    let uri = format!("/api/camps/ARC2024/speakers/{}", ada["id"].as_i64().unwrap());

    let (status, _, body) = send(&app, Method::PATCH, &uri, Some(json!({ "bio": "First programmer" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "First programmer");
    assert_eq!(body["companyName"], "Analytical Engines");

    let (status, _, body) = send(&app, Method::PUT, &uri, Some(json!({ "name": "Ada Lovelace" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada Lovelace");

    let (status, _, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, list) = send(&app, Method::GET, "/api/camps/ARC2024/speakers", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = test_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/camps")
        .header(header::HOST, HOST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_ready() {
    let app = test_app();
    let (status, _, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, _, _) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn length_that_ends_past_the_calendar_is_rejected() {
    let app = test_app();
    let mut body = arc2024();
    body.as_object_mut().unwrap().remove("endDate");
    body["length"] = json!(i32::MAX);
    let (status, location, err) = send(&app, Method::POST, "/api/camps", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(location.is_none());
    assert_eq!(err["error"]["code"], "validation_error");
    assert_eq!(err["error"]["details"][0]["field"], "length");

    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    let (status, _, _) = send(&app, Method::PATCH, "/api/camps/ARC2024", Some(json!({ "length": i32::MAX }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, _, stored) = send(&app, Method::GET, "/api/camps/ARC2024", None).await;
    assert_eq!(stored["length"], 3);
}

#[tokio::test]
async fn stated_length_round_trips_through_end_date() {
    let app = test_app();
    let mut body = arc2024();
    body.as_object_mut().unwrap().remove("endDate");
    body["length"] = json!(400);
    let (status, _, created) = send(&app, Method::POST, "/api/camps", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["endDate"], "2025-07-05");

    // Sending the response back unchanged keeps the same span.
    let (status, _, replaced) = send(&app, Method::PUT, "/api/camps/ARC2024", Some(created.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["length"], 400);
    assert_eq!(replaced["endDate"], created["endDate"]);
}

#[tokio::test]
async fn updating_a_speaker_under_another_camp_is_a_mismatch() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;
    let mut other = arc2024();
    other["moniker"] = json!("OTHER");
    send(&app, Method::POST, "/api/camps", Some(other)).await;
    let ada = create_ada(&app).await;
    let id = ada["id"].as_i64().unwrap();
    let wrong = format!("/api/camps/OTHER/speakers/{}", id);

    let (status, _, body) = send(&app, Method::PUT, &wrong, Some(json!({ "name": "Mallory" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "mismatch");

    let (status, _, body) = send(&app, Method::PATCH, &wrong, Some(json!({ "bio": "rewritten" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "mismatch");

    let (_, _, stored) = send(&app, Method::GET, &format!("/api/camps/ARC2024/speakers/{}", id), None).await;
    assert_eq!(stored, ada);
}

#[tokio::test]
async fn bad_path_or_query_uses_the_error_envelope() {
    let app = test_app();
    send(&app, Method::POST, "/api/camps", Some(arc2024())).await;

    let (status, _, body) = send(&app, Method::GET, "/api/camps/ARC2024?includeSpeakers=yes", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _, body) = send(&app, Method::GET, "/api/camps/ARC2024/speakers/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! every endpoint using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use project_timeline::api::{create_app, DashboardState};
use project_timeline::config::TimelineConfig;
use project_timeline::table::TimelineTable;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

const TABLE: &str = "\
Last Updated Date,Category,Department,Location,Type,Task,Phase,Tier,PM,PML,DM,PM1,PM2,Start,Finish
01-May-24,Project,FUPP,Terminals,Building,Pier A,Stage 3,1,Lara,Lara,,,,01-Jan-24,31-Mar-24
01-May-24,Project,FUPP,Terminals,Building,Pier A,Stage 5,1,Dora,,Dora,,,01-Jun-24,31-Dec-24
01-May-24,Project,SOF,Airfield,Civil,\"Runway 10/28, east\",Stage 5,2,,,,,,01-Jun-23,31-Dec-25
01-May-24,Strategies and Plans,FUPP,Landside,Strategies and Plans,Master plan,Strategies and Plans,3,Jon,,,Jon,,01-Jan-24,31-Dec-24
";

fn create_test_app() -> Router {
    let table = TimelineTable::parse(TABLE, "xx").unwrap();
    create_app(DashboardState::new(table, &TimelineConfig::default()))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let resp = create_test_app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn post(uri: &str, body: &Value) -> (StatusCode, Value) {
    let resp = create_test_app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn bar_tasks(v: &Value) -> Vec<String> {
    v["data"]["bars"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["task"].as_str().unwrap().to_string())
        .collect()
}

/// /health answers bare with the record count.
#[tokio::test]
async fn test_health_reports_record_count() {
    let (status, v) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");
    assert_eq!(v["records"], 4);
    assert!(v.get("meta").is_none());
}

#[tokio::test]
async fn test_meta_lists_table_options() {
    let (status, v) = get("/api/v1/meta").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["meta"]["version"], "1");

    let data = &v["data"];
    assert_eq!(data["last_updated"], "01-May-24");
    assert_eq!(data["options"]["departments"], json!(["FUPP", "SOF"]));
    assert_eq!(
        data["options"]["phases"],
        json!(["Stage 3", "Stage 5", "Strategies and Plans"])
    );
    assert_eq!(data["options"]["pms"], json!(["Dora", "Jon", "Lara", "Unknown PM"]));
    assert_eq!(
        data["options"]["projects"],
        json!(["Master plan", "Pier A", "Runway 10/28, east"])
    );
    assert_eq!(data["options"]["tiers"], json!([1, 2, 3]));
    assert_eq!(
        data["options"]["categories"],
        json!(["Project", "Strategies and Plans"])
    );
    assert_eq!(data["defaults"]["selection"]["types"], json!(["Building", "Civil"]));
}

#[tokio::test]
async fn test_timeline_tier_filter() {
    let (status, v) = post("/api/v1/timeline", &json!({"selection": {"tiers": [1]}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["kind"], "timeline");
    assert_eq!(bar_tasks(&v), ["Pier A", "Pier A"]);
    assert!(v["data"]["bars"]
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["tier"] == 1));
}

#[tokio::test]
async fn test_timeline_unknown_pm_selection() {
    let body = json!({"selection": {"pms": ["Lara", "Unknown PM"]}});
    let (status, v) = post("/api/v1/timeline", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bar_tasks(&v), ["Runway 10/28, east"]);
    assert_eq!(v["data"]["bars"][0]["pm"], "xx");
}

#[tokio::test]
async fn test_timeline_pm_mode_and_slider() {
    let body = json!({"color_mode": "PM", "slider_clicks": 3, "sort": "Task"});
    let (status, v) = post("/api/v1/timeline", &body).await;
    assert_eq!(status, StatusCode::OK);

    let data = &v["data"];
    assert_eq!(data["color_mode"], "PM");
    assert_eq!(data["range_slider"], true);
    assert_eq!(data["height_px"], 850);
    let legend: Vec<&str> = data["legend"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["label"].as_str().unwrap())
        .collect();
    assert_eq!(legend, ["Dora", "Jon", "Lara", "xx"]);
    // Task descending, axis reversed
    assert_eq!(
        data["task_order"],
        json!(["Master plan", "Pier A", "Runway 10/28, east"])
    );
}

#[tokio::test]
async fn test_timeline_no_data_placeholder() {
    let body = json!({"selection": {"departments": ["Nowhere"]}});
    let (status, v) = post("/api/v1/timeline", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["kind"], "no_data");
    assert_eq!(v["data"]["title"], "No Data to Display");
}

#[tokio::test]
async fn test_timeline_is_idempotent() {
    let body = json!({"selection": {"departments": ["FUPP"]}, "sort": "Stage_5_Start"});
    let (_, first) = post("/api/v1/timeline", &body).await;
    let (_, second) = post("/api/v1/timeline", &body).await;
    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn test_project_options() {
    let (status, v) = post(
        "/api/v1/options/projects",
        &json!({"departments": ["FUPP"], "projects": ["Pier A"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"], json!(["Master plan", "Pier A"]));
}

#[tokio::test]
async fn test_project_options_empty_is_no_content() {
    let (status, v) = post("/api/v1/options/projects", &json!({"tiers": [3], "pms": ["Lara"]})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(v, Value::Null);
}

#[tokio::test]
async fn test_pm_options_ignore_pm_pick() {
    let (status, v) = post(
        "/api/v1/options/pms",
        &json!({"departments": ["FUPP"], "pms": ["Jon"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"], json!(["Dora", "Jon", "Lara"]));

    let (_, v) = post("/api/v1/options/pms", &json!({"departments": ["SOF"]})).await;
    assert_eq!(v["data"], json!(["Unknown PM"]));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let resp = create_test_app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/timeline")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["error"]["code"], "BAD_REQUEST");

    let (status, _) = post("/api/v1/options/pms", &json!({"tiers": ["one"]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (status, v) = get("/api/v2/live").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"]["code"], "NOT_FOUND");
    assert_eq!(v["error"]["message"], "no such endpoint: /api/v2/live");
}

/// Every enveloped answer names the table snapshot it was computed from.
#[tokio::test]
async fn test_answers_are_stamped_with_snapshot() {
    let (_, meta) = get("/api/v1/meta").await;
    let (_, timeline) = post("/api/v1/timeline", &json!({})).await;
    let (_, pms) = post("/api/v1/options/pms", &json!({})).await;
    for v in [meta, timeline, pms] {
        assert_eq!(v["meta"]["snapshot"], "01-May-24");
        assert_eq!(v["meta"]["records"], 4);
    }
}

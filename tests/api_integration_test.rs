// API integration tests that verify HTTP endpoints
// Tests the actual Axum router with real HTTP requests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use groundwater_insight::api::create_router;
use groundwater_insight::app::Application;
use groundwater_insight::config::Config;
use http_body_util::BodyExt; // For `.collect()`
use serde_json::{json, Value};
use tower::ServiceExt; // For `oneshot`

/// Test fixture module for API tests
mod api_test_fixtures {
    use super::*;

    pub const TEST_STATION: &str = "5724";
    pub const TEST_STATION_MISSING: &str = "9999";

    pub fn router() -> axum::Router {
        let state = Application::app_state(&Config::default()).expect("Failed to build app state");
        create_router(state)
    }

    pub async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

use api_test_fixtures::*;

#[tokio::test]
async fn test_health_endpoint() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_overview_endpoint() {
    let body = json!({
        "stations": {
            TEST_STATION: [
                { "date": "20250101", "elevation": "100.0" },
                { "date": "20250102", "elevation": 99.5 }
            ]
        },
        "expectedStations": [TEST_STATION_MISSING]
    });

    let (status, json) = post_json("/api/v1/observations/overview", body).await;
    assert_eq!(status, StatusCode::OK);

    let rows = json["table"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["values"][TEST_STATION], json!([100.0, null]));
    assert_eq!(rows[1]["values"][TEST_STATION], json!([99.5]));
    assert_eq!(rows[1]["values"][TEST_STATION_MISSING], json!([]));

    let diff_rows = json["table"]["diffRows"].as_array().unwrap();
    assert_eq!(diff_rows[0]["values"][TEST_STATION], Value::Null);
    assert_eq!(diff_rows[1]["values"][TEST_STATION], 0.5);

    assert_eq!(json["geomap"][TEST_STATION]["elevMean1"], 99.5);
    assert_eq!(json["geomap"][TEST_STATION]["elevMean7"], 99.75);
    assert_eq!(json["geomap"][TEST_STATION_MISSING]["elevMean30"], Value::Null);

    assert_eq!(json["trend"][TEST_STATION]["position"], 0.0);
    assert_eq!(json["trend"][TEST_STATION]["latestYmd"], "20250102");
    assert_eq!(json["trend"][TEST_STATION_MISSING]["position"], Value::Null);

    assert_eq!(json["missingStations"], json!([TEST_STATION_MISSING]));
}

#[tokio::test]
async fn test_verification_endpoint() {
    let body = json!({
        "records": [
            { "station_id": TEST_STATION, "yyyymm": 202401, "observed": 100.0, "predicted": 100.0 },
            { "station_id": TEST_STATION, "yyyymm": 202402, "observed": 100.0, "predicted": 100.0 },
            { "station_id": TEST_STATION, "yyyymm": 202403, "observed": 100.0, "predicted": 100.0 }
        ]
    });

    let (status, json) = post_json("/api/v1/forecasts/verification", body).await;
    assert_eq!(status, StatusCode::OK);

    let year = &json["years"][0];
    assert_eq!(year["year"], 2024);
    assert_eq!(year["rmse"], 0.0);
    assert_eq!(year["nse"], 1.0);
    assert_eq!(year["kge"], 1.0);
    assert_eq!(year["r2"], 0.0);

    let heatmap = json["heatmap"][0]["values"].as_array().unwrap();
    assert_eq!(heatmap.len(), 12);
    assert_eq!(heatmap[0], 0.0);
    assert_eq!(heatmap[11], Value::Null);
}

#[tokio::test]
async fn test_verification_rejects_malformed_body() {
    let body = json!({ "records": [{ "yyyymm": "not-a-number" }] });
    let (status, _) = post_json("/api/v1/forecasts/verification", body).await;
    assert!(status.is_client_error(), "Expected 4xx, got {}", status);
}

#[tokio::test]
async fn test_sensitivity_endpoint() {
    let body = json!({
        "stations": [
            { "station_id": "A", "increase_if_rainfall": 0.50, "decrease_if_drought": 0.20, "range_variation": 0.70 },
            { "station_id": "B", "increase_if_rainfall": 0.10, "decrease_if_drought": 0.40 },
            { "station_id": "C", "increase_if_rainfall": 0.30, "decrease_if_drought": 0.28 }
        ]
    });

    let (status, json) = post_json("/api/v1/sensitivity", body).await;
    assert_eq!(status, StatusCode::OK);

    let stations = json["stations"].as_array().unwrap();
    assert_eq!(stations[0]["sensitive_type"], "강수형");
    assert_eq!(stations[0]["range_variation"], 0.7);
    assert_eq!(stations[1]["sensitive_type"], "가뭄형");
    assert_eq!(stations[2]["sensitive_type"], "복합형");
}

#[tokio::test]
async fn test_status_endpoint() {
    let body = json!({
        "stations": [
            {
                "stationId": TEST_STATION,
                "value": 107.0,
                "percentiles": { "p10": 90.0, "p25": 95.0, "p75": 105.0, "p90": 110.0 }
            },
            { "stationId": TEST_STATION_MISSING, "value": 100.0 }
        ]
    });

    let (status, json) = post_json("/api/v1/status", body).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["stations"][0]["band5"], "high");
    assert_eq!(json["stations"][0]["band3"], "warning");
    assert_eq!(json["stations"][1]["band5"], "no-data");
    assert_eq!(json["stations"][1]["band3"], "no-data");
    assert_eq!(json["bandCounts"]["high"], 1);
    assert_eq!(json["bandCounts"]["noData"], 1);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/readings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

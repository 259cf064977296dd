use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, body_partial_json};
use uuid::Uuid;

use hospital_cell::router::hospital_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{TestConfig, MockStoreResponses};

async fn create_test_app(config: AppConfig) -> Router {
    hospital_routes(Arc::new(config))
}

#[tokio::test]
async fn test_list_hospitals() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(json!({ "collection": "hospitals" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                MockStoreResponses::hospital_doc(&Uuid::new_v4().to_string(), "Harborview Medical Center", 47.6040, -122.3233),
                MockStoreResponses::hospital_doc(&Uuid::new_v4().to_string(), "Swedish Medical Center", 47.6097, -122.3210)
            ]
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK, "body: {}", json_response);
    let hospitals = json_response.as_array().unwrap();
    assert_eq!(hospitals.len(), 2);
    assert_eq!(hospitals[0]["name"], json!("Harborview Medical Center"));
    assert_eq!(hospitals[0]["services"]["beds"], json!(120));
}

#[tokio::test]
async fn test_search_hospitals_with_distance() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(json!({ "collection": "hospitals" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                // Tacoma General is roughly 25 miles from downtown Seattle
                MockStoreResponses::hospital_doc(&Uuid::new_v4().to_string(), "Tacoma General", 47.2529, -122.4443),
                MockStoreResponses::hospital_doc(&Uuid::new_v4().to_string(), "Harborview Medical Center", 47.6040, -122.3233)
            ]
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/search?lat=47.6050&lon=-122.3226&maxDistance=10")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK, "body: {}", json_response);
    let results = json_response.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], json!("Harborview Medical Center"));
    assert!(results[0]["distanceMiles"].as_f64().unwrap() < 10.0);
}

#[tokio::test]
async fn test_search_hospitals_max_distance_requires_origin() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config).await;

    let request = Request::builder()
        .method("GET")
        .uri("/search?maxDistance=10")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_response["error"], json!("maxDistance requires lat and lon"));
}

#[tokio::test]
async fn test_get_hospital_by_id() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let hospital_id = Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "hospitals" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": MockStoreResponses::hospital_doc(&hospital_id, "Harborview Medical Center", 47.6040, -122.3233)
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(&format!("/{}", hospital_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK, "body: {}", json_response);
    assert_eq!(json_response["_id"], json!(hospital_id));
    assert_eq!(json_response["acceptsInsurance"], json!(["Aetna", "BlueCross", "Medicare"]));
}

#[tokio::test]
async fn test_get_hospital_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "hospitals" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "document": null })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(&format!("/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_response["error"], json!("Hospital not found"));
}

#[tokio::test]
async fn test_get_hospital_invalid_id() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config).await;

    let request = Request::builder()
        .method("GET")
        .uri("/not-a-uuid")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_hospital() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "hospitals" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "insertedId": Uuid::new_v4().to_string()
        })))
        .mount(&mock_server)
        .await;

    let request_body = json!({
        "name": "Overlake Medical Center",
        "address": "1035 116th Ave NE, Bellevue, WA 98004",
        "phone": "+1-425-688-5000",
        "email": "info@overlakehospital.org",
        "lat": 47.6169,
        "lon": -122.1896,
        "specialties": ["general", "cardiology"],
        "services": {
            "beds": 349,
            "injections": ["flu"],
            "other": ["emergency room"]
        },
        "acceptsInsurance": ["Aetna", "Premera"]
    });

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(request_body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::CREATED, "body: {}", json_response);
    assert_eq!(json_response["name"], json!("Overlake Medical Center"));
    assert!(json_response["_id"].is_string());
    assert_eq!(json_response["services"]["beds"], json!(349));
}

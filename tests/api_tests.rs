use std::sync::Arc;

use axum::http::{HeaderName, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinesense_api::api::{create_router, AppState};
use cinesense_api::db::CatalogStore;
use cinesense_api::models::{CatalogItem, ContentType};
use cinesense_api::services::{EngineConfig, RecommendationEngine};

fn item(
    title: &str,
    content_type: ContentType,
    cluster_id: i32,
    rating: f64,
    embedding: &[f32],
) -> CatalogItem {
    CatalogItem {
        title: title.to_string(),
        content_type,
        genre: "Sci-Fi".to_string(),
        description: String::new(),
        rating,
        popularity: 50.0,
        year: 2005,
        cluster_id,
        embedding: embedding.to_vec(),
    }
}

fn create_test_server() -> TestServer {
    let catalog = CatalogStore::new(vec![
        item("The Matrix", ContentType::Movie, 1, 8.7, &[1.0, 0.0, 0.0]),
        item("The Matrix Reloaded", ContentType::Movie, 1, 7.2, &[0.98, 0.05, 0.0]),
        item("Dark City", ContentType::Movie, 1, 7.6, &[0.9, 0.2, 0.0]),
        item("Equilibrium", ContentType::Movie, 1, 7.4, &[0.85, 0.3, 0.0]),
        item("Westworld", ContentType::Series, 2, 8.5, &[0.6, 0.6, 0.0]),
        item("Ghost in the Shell", ContentType::Anime, 3, 8.0, &[0.7, 0.0, 0.7]),
    ])
    .unwrap();

    let engine = Arc::new(RecommendationEngine::new(catalog, EngineConfig::default()));
    let app = create_router(AppState::new(engine));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["catalog_size"], 6);
}

#[tokio::test]
async fn test_recommend_found() {
    let server = create_test_server();

    let response = server
        .post("/api/recommend")
        .json(&json!({ "title": "the matrix", "top_n": 5 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["query"], "the matrix");
    assert_eq!(body["matched_title"], "The Matrix");
    assert_eq!(body["type"], "movie");
    assert_eq!(body["tier"], "cluster");

    let results = body["results"].as_array().unwrap();
    let titles: Vec<&str> = results.iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Dark City", "Equilibrium"]);
    assert!(results[0]["final_score"].as_f64().unwrap() >= results[1]["final_score"].as_f64().unwrap());
    assert!(results[0].get("metadata").is_none());
}

#[tokio::test]
async fn test_recommend_with_type_override() {
    let server = create_test_server();

    let response = server
        .post("/api/recommend")
        .json(&json!({ "title": "Dark City", "type": "tv" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["type"], "series");
    assert_eq!(body["tier"], "type_only");
    assert_eq!(body["results"][0]["title"], "Westworld");
}

#[tokio::test]
async fn test_recommend_not_found() {
    let server = create_test_server();

    let response = server
        .post("/api/recommend")
        .json(&json!({ "title": "Qwxyz Plorf" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["error"], "'Qwxyz Plorf' not found in dataset.");
    assert_eq!(body["suggestion"], "Try another similar title.");
    assert!(body["fallback"].is_null());
}

#[tokio::test]
async fn test_recommend_rejects_invalid_requests() {
    let server = create_test_server();

    for body in [
        json!({ "title": "" }),
        json!({ "title": "The Matrix", "type": "podcast" }),
        json!({ "title": "The Matrix", "top_n": 0 }),
        json!({ "title": "The Matrix", "top_n": 500 }),
        json!({ "title": "The Matrix", "weights": { "sim": -0.5, "rating": 0.25, "pop": 0.15, "recency": 0.1 } }),
    ] {
        let response = server.post("/api/recommend").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert!(error["error"].is_string(), "missing error for {}", body);
    }
}

#[tokio::test]
async fn test_browse_by_type() {
    let server = create_test_server();

    let response = server.get("/api/browse/movie").add_query_param("limit", 2).await;
    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "The Matrix");
    assert!(items.iter().all(|i| i["type"] == "movie"));
    assert!(items[0].get("embedding").is_none());

    let response = server.get("/api/browse/all").await;
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 6);

    let response = server.get("/api/browse/podcasts").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cluster_sample() {
    let server = create_test_server();

    let response = server.get("/api/clusters/1").await;
    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|i| i["cluster_id"] == 1));

    let response = server.get("/api/clusters/99").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let response = server.get("/health").await;
    assert!(!response.header(HeaderName::from_static("x-request-id")).is_empty());
}

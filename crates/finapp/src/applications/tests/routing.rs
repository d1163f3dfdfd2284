use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::applications::domain::ApplicationPayload;
use crate::applications::memory::InMemoryApplicationStorage;
use crate::applications::repository::ApplicationStorage;
use crate::applications::router::{read_handler, storage_router, ReadQuery};

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn create_returns_the_new_id() {
    let storage = Arc::new(InMemoryApplicationStorage::new());
    let payload = serde_json::to_value(ApplicationPayload::from_draft(&complete_draft()))
        .expect("payload serializes");

    let response = storage_router(Arc::clone(&storage))
        .oneshot(json_request("POST", "/create-app", payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body, json!({ "_id": "app-000001" }));
    assert_eq!(storage.len(), 1);
}

#[tokio::test]
async fn read_by_email_returns_matching_records() {
    let storage = Arc::new(InMemoryApplicationStorage::new());
    storage
        .create_application(ApplicationPayload::from_draft(&complete_draft()))
        .await
        .expect("created");

    let response = storage_router(Arc::clone(&storage))
        .oneshot(empty_request("GET", "/read-apps?email=JANE%40x.com"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let records = body.as_array().expect("array body");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["_id"], "app-000001");
    assert_eq!(records[0]["personalDetails"]["name"], "Jane");
}

#[tokio::test]
async fn read_without_a_filter_is_a_bad_request() {
    let storage = Arc::new(InMemoryApplicationStorage::new());
    let response = read_handler::<InMemoryApplicationStorage>(
        State(storage),
        Query(ReadQuery::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_wraps_the_record_in_data() {
    let storage = Arc::new(InMemoryApplicationStorage::new());
    let created = storage
        .create_application(ApplicationPayload::from_draft(&complete_draft()))
        .await
        .expect("created");

    let mut changed = ApplicationPayload::from_draft(&complete_draft());
    changed.personal_details.name = "Jane Doe".to_string();
    let body = json!({ "id": created.id, "updateData": changed });

    let response = storage_router(Arc::clone(&storage))
        .oneshot(json_request("PUT", "/update-apps", body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["personalDetails"]["name"], "Jane Doe");
    assert_eq!(body["data"]["_id"], "app-000001");
}

#[tokio::test]
async fn missing_records_map_to_not_found() {
    let storage = Arc::new(InMemoryApplicationStorage::new());
    let router = storage_router(storage);

    let read = router
        .clone()
        .oneshot(empty_request("GET", "/read-apps?id=nope"))
        .await
        .expect("router responds");
    assert_eq!(read.status(), StatusCode::NOT_FOUND);

    let delete = router
        .oneshot(empty_request("DELETE", "/delete-app?id=nope"))
        .await
        .expect("router responds");
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn backend_outage_maps_to_bad_gateway() {
    let storage = Arc::new(UnavailableStorage::default());
    let response = storage_router(storage)
        .oneshot(empty_request("DELETE", "/delete-app?id=app-000001"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error string")
        .contains("connection refused"));
}

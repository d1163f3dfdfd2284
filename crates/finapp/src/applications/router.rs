use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::domain::{ApplicationId, ApplicationPayload};
use super::remote::{UpdateRequest, UpdateResponse};
use super::repository::{ApplicationStorage, StorageError};

/// Router speaking the storage backend wire format over any [`ApplicationStorage`].
pub fn storage_router<S>(storage: Arc<S>) -> Router
where
    S: ApplicationStorage + 'static,
{
    Router::new()
        .route("/create-app", post(create_handler::<S>))
        .route("/read-apps", get(read_handler::<S>))
        .route("/update-apps", put(update_handler::<S>))
        .route("/delete-app", delete(delete_handler::<S>))
        .with_state(storage)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReadQuery {
    pub(crate) id: Option<String>,
    pub(crate) email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdQuery {
    pub(crate) id: String,
}

pub(crate) async fn create_handler<S>(
    State(storage): State<Arc<S>>,
    Json(payload): Json<ApplicationPayload>,
) -> Response
where
    S: ApplicationStorage + 'static,
{
    match storage.create_application(payload).await {
        Ok(created) => {
            info!(application_id = %created.id, "application created");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn read_handler<S>(
    State(storage): State<Arc<S>>,
    Query(query): Query<ReadQuery>,
) -> Response
where
    S: ApplicationStorage + 'static,
{
    match (query.id, query.email) {
        (Some(id), _) => match storage.get_application(&ApplicationId(id)).await {
            Ok(record) => (StatusCode::OK, Json(record)).into_response(),
            Err(err) => error_response(err),
        },
        (None, Some(email)) => match storage.list_applications(&email).await {
            Ok(records) => (StatusCode::OK, Json(records)).into_response(),
            Err(err) => error_response(err),
        },
        (None, None) => {
            let payload = json!({ "error": "either id or email is required" });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn update_handler<S>(
    State(storage): State<Arc<S>>,
    Json(request): Json<UpdateRequest>,
) -> Response
where
    S: ApplicationStorage + 'static,
{
    match storage
        .update_application(&request.id, request.update_data)
        .await
    {
        Ok(data) => (StatusCode::OK, Json(UpdateResponse { data })).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<S>(
    State(storage): State<Arc<S>>,
    Query(query): Query<IdQuery>,
) -> Response
where
    S: ApplicationStorage + 'static,
{
    let id = ApplicationId(query.id);
    match storage.delete_application(&id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "deleted": id }))).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: StorageError) -> Response {
    let status = match err {
        StorageError::NotFound => StatusCode::NOT_FOUND,
        StorageError::Rejected { status, .. } => {
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        StorageError::Network(_) | StorageError::Decode(_) => StatusCode::BAD_GATEWAY,
        StorageError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}

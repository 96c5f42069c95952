//! Route handlers and JSON response shapes.

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::AppState;
use crate::error::Error;
use crate::model::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct HashForm {
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateResponse {
    pub request_id: RequestId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub error: String,
}

/// Totals are rendered as decimal strings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatsResponse {
    pub total: String,
    pub average: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShutdownResponse {
    pub status: String,
}

/// A core error on its way out as an HTTP response.
pub(super) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            Error::NotFound(id) => Self::new(
                StatusCode::NOT_FOUND,
                format!(
                    "Hash password not found for {id}. Please check the id or retry after the processing delay."
                ),
            ),
            Error::ShuttingDown => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, Error::ShuttingDown.to_string())
            }
            other => {
                error!(error = %other, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// `POST /hash` with a `password` form field, in the body or the query string.
pub(super) async fn create_hash(
    State(state): State<AppState>,
    Query(query): Query<HashForm>,
    form: Result<Form<HashForm>, FormRejection>,
) -> Result<Json<CreateResponse>, ApiError> {
    let password = form
        .ok()
        .and_then(|Form(body)| body.password)
        .or(query.password)
        .unwrap_or_default();

    let request_id = state.service.submit(&password)?;
    Ok(Json(CreateResponse { request_id }))
}

/// `GET /hash/{id}`: the digest as a JSON string.
pub(super) async fn get_hash(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<String>, ApiError> {
    Ok(Json(state.service.lookup_str(&id)?))
}

/// `GET /stats`
pub(super) async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.service.stats();
    Json(StatsResponse {
        total: snapshot.count.to_string(),
        average: snapshot.average_micros.to_string(),
    })
}

/// `GET|POST /shutdown`: drain the queue, then stop the listener.
pub(super) async fn shutdown(
    State(state): State<AppState>,
) -> Result<Json<ShutdownResponse>, ApiError> {
    info!("shutdown requested over HTTP");
    state.shutdown.drain_and_stop().await?;
    Ok(Json(ShutdownResponse {
        status: "stopped".to_string(),
    }))
}

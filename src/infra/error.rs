//! Types for reporting errors that happened during a request.
//!
//! If your function interacts with the database or validates user input,
//! you likely want to return a [`ApiResult`].

use super::extract::Json;
use crate::feature::item::item_service::InvalidItem;
use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::ResponseForPanic;
use utoipa::ToSchema;

/// A standard error response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// A machine readable error code, only set for domain errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 101)]
    code: Option<u16>,
    /// A description of the error.
    #[schema(example = "No name specified")]
    message: String,
}

impl ErrorBody {
    pub(crate) fn new(message: String) -> Self {
        Self {
            code: None,
            message,
        }
    }

    pub(crate) fn with_code(code: u16, message: String) -> Self {
        Self {
            code: Some(code),
            message,
        }
    }

    /// The error code.
    pub fn code(&self) -> Option<u16> {
        self.code
    }

    /// The error message.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }
}

/// An error from our API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An error caused by the client.
    #[error("{0}")]
    ClientError(#[from] ClientError),
    /// An internal error.
    #[error("{0}")]
    InternalError(#[from] InternalError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::ClientError(e) => e.into_response(),
            ApiError::InternalError(e) => {
                tracing::error!("internal error: {}", e);
                e.into_response()
            }
        }
    }
}

/// The result of calling API-related functions.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::InternalError(InternalError::SqlxError(e))
    }
}

impl From<InvalidItem> for ApiError {
    fn from(e: InvalidItem) -> Self {
        ApiError::ClientError(ClientError::InvalidItem(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::ClientError(ClientError::from(e))
    }
}

/// Errors caused by the client.
/// The client can do something to fix these.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The submitted item broke a business rule.
    #[error("{0}")]
    InvalidItem(#[from] InvalidItem),
    /// The request could not be read, e.g. a malformed body.
    #[error("{1}")]
    Custom(StatusCode, String),
}

impl From<JsonRejection> for ClientError {
    fn from(value: JsonRejection) -> Self {
        ClientError::Custom(value.status(), value.body_text())
    }
}

impl IntoResponse for ClientError {
    fn into_response(self) -> axum::response::Response {
        let msg = self.to_string();
        match self {
            Self::InvalidItem(_) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::with_code(InvalidItem::CODE, msg)),
            )
                .into_response(),
            Self::Custom(status, _) => (status, Json(ErrorBody::new(msg))).into_response(),
        }
    }
}

/// An internal error.
/// The client cannot do anything about this.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    /// An [`sqlx`] error.
    #[error("{0}")]
    SqlxError(#[from] sqlx::Error),
    /// Other miscellaneous errors.
    #[error("{0}")]
    Other(String),
}

impl IntoResponse for InternalError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("internal error".to_string())),
        )
            .into_response();
        response
            .headers_mut()
            .insert("Retry-After", HeaderValue::from_static("5"));
        response
    }
}

/// A handler for converting panics into proper responses for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanicHandler;

impl ResponseForPanic for PanicHandler {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(
        &mut self,
        _: Box<dyn std::any::Any + Send + 'static>,
    ) -> http::Response<Self::ResponseBody> {
        ApiError::InternalError(InternalError::Other("Panic".to_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn into_parts(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn invalid_item_is_a_bad_request_with_code() {
        let (status, body) = into_parts(InvalidItem::MissingPrice.into()).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(
            serde_json::json!({ "code": 101, "message": "No price specified" }),
            body
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let error = ApiError::from(sqlx::Error::PoolTimedOut);
        let response = error.into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        assert_eq!("5", response.headers()["Retry-After"]);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(None, body.code());
        assert_eq!("internal error", body.message());
    }

    #[tokio::test]
    async fn custom_client_errors_keep_their_status() {
        let error = ClientError::Custom(StatusCode::UNPROCESSABLE_ENTITY, "bad".to_string());
        let (status, body) = into_parts(error.into()).await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, status);
        assert_eq!(serde_json::json!({ "message": "bad" }), body);
    }
}

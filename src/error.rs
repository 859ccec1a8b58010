use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::{debug, error};

#[derive(Debug, ThisError)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Extractor rejection; keeps axum's status (413, 415, ...).
    #[error("{1}")]
    Rejected(StatusCode, String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl GatewayError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // Duplicates surface as 400, the same as any other rejected input.
            GatewayError::BadRequest(_) | GatewayError::Conflict(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Rejected(status, _) => *status,
            GatewayError::DatabaseError(_)
            | GatewayError::Io(_)
            | GatewayError::Archive(_)
            | GatewayError::Token(_)
            | GatewayError::Config(_)
            | GatewayError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<figment::Error> for GatewayError {
    fn from(e: figment::Error) -> Self {
        GatewayError::Config(Box::new(e))
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for GatewayError {
                fn from(rejection: $rejection) -> Self {
                    GatewayError::Rejected(rejection.status(), rejection.body_text())
                }
            }
        )+
    };
}

impl_from_rejection!(
    JsonRejection,
    QueryRejection,
    PathRejection,
    MultipartRejection,
    MultipartError,
);

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let msg = if status.is_server_error() {
            error!(error = %self, "request failed");
            "An internal server error occurred.".to_string()
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
            self.to_string()
        };
        (status, Json(ApiMessage::new(msg))).into_response()
    }
}

/// `{"msg": ...}` body shared by success and error responses.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub msg: String,
}

impl ApiMessage {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

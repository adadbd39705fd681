mod init;
pub mod data_models;
pub mod routes;
pub mod state;
pub mod utils;

pub use init::{init_router, RouterArgs};

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::server::data_models::ErrorResponse;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Internal server error: `{0}`")]
    InternalError(#[from] anyhow::Error),

    #[error(transparent)]
    Jobs(#[from] adgen::Error),

    #[error("Missing form field `{0}`")]
    MissingField(&'static str),

    #[error("Malformed form data: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    TaskFailed(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Jobs(adgen::Error::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Jobs(err) if err.is_admission() => StatusCode::BAD_REQUEST,
            ServerError::Jobs(adgen::Error::QueueClosed) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Multipart(err) => err.status(),
            ServerError::MissingField(_) => StatusCode::BAD_REQUEST,
            ServerError::Jobs(_) | ServerError::InternalError(_) | ServerError::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;
use strum_macros::AsRefStr;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("invalid submission: {}", .0.join("; "))]
    InvalidSubmission(Vec<String>),

    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::Error),

    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl Error {
    /// The only place internal errors are translated for the client.
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::InvalidSubmission(errors) => {
                (StatusCode::BAD_REQUEST, InvalidInput(errors.clone()))
            }
            Error::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, StorageError),
            Error::Unexpected(_) => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Received invalid input")]
    InvalidInput(Vec<String>),
    #[display("Storage error")]
    StorageError,
    #[display("Server error")]
    ServiceError,
}

impl ClientError {
    /// The JSON body sent to the client.
    pub fn body(&self) -> Value {
        match self {
            ClientError::InvalidInput(errors) => json!({ "ok": false, "errors": errors }),
            _ => json!({ "ok": false, "error": self.to_string() }),
        }
    }
}

use crate::{engine::EngineError, messages::ErrorBody};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Reasons an `image` field could not be turned into pixels.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The `image` field holds a JSON value other than a string.
    #[error("image must be a data URL string")]
    NotAString,
    /// The data URL has no comma between descriptor and payload.
    #[error("image data URL has no ',' separator")]
    MissingSeparator,
    /// The payload is not valid standard base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded bytes are not an image format we can read.
    #[error("cannot identify image file: {0}")]
    Image(#[from] image::ImageError),
}

/// Everything a request to the detection endpoint can fail with.
///
/// Zero or several faces are not errors; they are answered with a regular
/// classification response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body has no `image` field; answered with 400.
    #[error("No image provided")]
    MissingImage,
    /// The `image` field could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The detection engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The blocking decode task was cancelled or panicked.
    #[error("internal task failure: {0}")]
    Internal(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// HTTP status this error is answered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage => StatusCode::BAD_REQUEST,
            ApiError::Decode(_) | ApiError::Engine(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Face detection failed: {}", self);
        } else {
            log::warn!("Rejected detection request: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

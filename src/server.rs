use crate::{
    decode,
    engine::DetectionEngine,
    error::{ApiError, DecodeError},
    messages::{self, DetectFaceResponse, StatusResponse},
    outcome::FaceCheck,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Plain-text body of `GET /`.
pub const HOME_MESSAGE: &str = "Face Detection Server is running successfully!";

/// Router-level settings that do not affect detection.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

/// Builds the application router around a running engine.
pub fn router(engine: Arc<DetectionEngine>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/detect_face", post(detect_face))
        .route("/status", get(status))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer())
        .with_state(engine)
}

/// Lets browser front ends on any origin call the service.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false)
}

async fn home() -> &'static str {
    HOME_MESSAGE
}

async fn status(State(engine): State<Arc<DetectionEngine>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: engine.state().as_str().to_string(),
        detections: engine.detections(),
        failures: engine.failures(),
    })
}

async fn detect_face(State(engine): State<Arc<DetectionEngine>>, body: Bytes) -> Response {
    let Some(image) = messages::image_field(&body) else {
        return ApiError::MissingImage.into_response();
    };

    match check_faces(&engine, image).await {
        Ok(check) => Json(DetectFaceResponse::from(check)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn check_faces(engine: &DetectionEngine, image: Value) -> Result<FaceCheck, ApiError> {
    let Value::String(data_url) = image else {
        return Err(DecodeError::NotAString.into());
    };

    // image decoding is CPU bound, keep it off the async workers
    let gray = tokio::task::spawn_blocking(move || decode::decode_payload(&data_url)).await??;
    let (width, height) = gray.dimensions();

    let response = engine.detect(gray).await?;
    let check = FaceCheck::from_count(response.regions.len());

    log::info!(
        "Detection #{} on {}x{} image {}: {} face(s) in {:?} (queued {:?})",
        response.id,
        width,
        height,
        if check.is_success() { "accepted" } else { "rejected" },
        check.face_count(),
        response.duration,
        response.queue_time
    );

    Ok(check)
}

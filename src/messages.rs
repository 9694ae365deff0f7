use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a `POST /detect_face` request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectFaceRequest {
    /// Data URL: `<descriptor>,<base64 image bytes>`.
    pub image: String,
}

/// Extracts the `image` field from a raw request body.
///
/// Returns `None` when the body is not a JSON object or has no `image` key.
/// The value is returned as-is; it is checked to be a string later.
pub fn image_field(body: &[u8]) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut map)) => map.remove("image"),
        _ => None,
    }
}

/// Reason a classification answer has `success: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceErrorType {
    /// Serialized as `"no_face"`.
    NoFace,
    /// Serialized as `"multiple_faces"`.
    MultipleFaces,
}

/// Classification answer of the detection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DetectFaceResponse {
    /// True only when exactly one face was found.
    pub success: bool,
    /// Set when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<FaceErrorType>,
    /// Human-readable explanation, set when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set to `true` when `success` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_detected: Option<bool>,
    /// Number of faces the detector reported.
    pub face_count: usize,
}

/// Body of every 4xx/5xx reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorBody {
    /// Description of the failure.
    pub error: String,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusResponse {
    /// Engine state, `"idle"` or `"processing"`.
    pub status: String,
    /// Detections completed since startup.
    pub detections: u64,
    /// Detections that failed or panicked since startup.
    pub failures: u64,
}

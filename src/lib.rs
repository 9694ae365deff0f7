//! Single-endpoint HTTP service that checks whether exactly one face is
//! present in a base64-encoded image.
//!
//! The detector itself is an external capability behind [`FaceDetector`]; the
//! [`DetectionEngine`] owns one instance for the whole process and the
//! [`server`] module exposes it over HTTP.

pub mod backends;
pub mod config;
pub mod decode;
pub mod detector;
pub mod engine;
pub mod error;
pub mod messages;
pub mod outcome;
pub mod server;

pub use detector::{DetectionParams, FaceDetector, Region};
pub use engine::{DetectionEngine, EngineError, EngineResponse, EngineState};
pub use error::{ApiError, DecodeError};
pub use messages::{DetectFaceRequest, DetectFaceResponse, ErrorBody, FaceErrorType};
pub use outcome::FaceCheck;

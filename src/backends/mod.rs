//! Bindings of [`FaceDetector`](crate::detector::FaceDetector) to real
//! computer-vision libraries.
//!
//! `rustface` (SeetaFace) is always available. Building with the `opencv`
//! feature adds the OpenCV Haar cascade and makes it the default.

use std::path::PathBuf;

mod seeta;
pub use seeta::SeetaFaceDetector;

#[cfg(feature = "opencv")]
mod haar;
#[cfg(feature = "opencv")]
pub use haar::HaarCascadeDetector;

#[cfg(feature = "opencv")]
pub type DefaultDetector = HaarCascadeDetector;
#[cfg(not(feature = "opencv"))]
pub type DefaultDetector = SeetaFaceDetector;

/// Model file loaded when none is given on the command line.
#[cfg(feature = "opencv")]
pub const DEFAULT_MODEL_PATH: &str = haar::DEFAULT_CASCADE;
#[cfg(not(feature = "opencv"))]
pub const DEFAULT_MODEL_PATH: &str = seeta::DEFAULT_MODEL;

/// Failures of the detector bindings.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The model file could not be read or parsed.
    #[error("failed to load model {path}: {source}")]
    Load {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The backend library only takes UTF-8 paths.
    #[error("model path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
    /// OpenCV loaded nothing from the cascade file.
    #[error("cascade file {0} is empty or unreadable")]
    EmptyCascade(PathBuf),
    /// Error raised inside OpenCV.
    #[cfg(feature = "opencv")]
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

use crate::messages::{DetectFaceResponse, FaceErrorType};

/// Message sent when no face was found.
pub const NO_FACE_MESSAGE: &str = "No face detected";
/// Message sent when more than one face was found.
pub const MULTIPLE_FACES_MESSAGE: &str = "Multiple faces detected. Only one person allowed.";

/// Classification of a detection result by face count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceCheck {
    /// No face region was detected.
    NoFace,
    /// Exactly one face region was detected.
    SingleFace,
    /// Two or more face regions; carries the detected count.
    MultipleFaces(usize),
}

impl FaceCheck {
    /// Classifies the number of regions the detector returned.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => FaceCheck::NoFace,
            1 => FaceCheck::SingleFace,
            n => FaceCheck::MultipleFaces(n),
        }
    }

    /// Number of faces behind this classification.
    pub fn face_count(&self) -> usize {
        match self {
            FaceCheck::NoFace => 0,
            FaceCheck::SingleFace => 1,
            FaceCheck::MultipleFaces(n) => *n,
        }
    }

    /// Whether the image passes the exactly-one-face check.
    pub fn is_success(&self) -> bool {
        matches!(self, FaceCheck::SingleFace)
    }
}

impl From<FaceCheck> for DetectFaceResponse {
    fn from(check: FaceCheck) -> Self {
        match check {
            FaceCheck::NoFace => DetectFaceResponse {
                success: false,
                error_type: Some(FaceErrorType::NoFace),
                message: Some(NO_FACE_MESSAGE.to_string()),
                face_detected: None,
                face_count: 0,
            },
            FaceCheck::SingleFace => DetectFaceResponse {
                success: true,
                error_type: None,
                message: None,
                face_detected: Some(true),
                face_count: 1,
            },
            FaceCheck::MultipleFaces(n) => DetectFaceResponse {
                success: false,
                error_type: Some(FaceErrorType::MultipleFaces),
                message: Some(MULTIPLE_FACES_MESSAGE.to_string()),
                face_detected: None,
                face_count: n,
            },
        }
    }
}

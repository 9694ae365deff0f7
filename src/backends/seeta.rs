use super::BackendError;
use crate::detector::{DetectionParams, FaceDetector, Region};
use image::GrayImage;
use rustface::{Detector, ImageData};
use std::path::Path;

pub const DEFAULT_MODEL: &str = "seeta_fd_frontal_v1.0.bin";

/// Classifier score below which a window is not a face.
const SCORE_THRESHOLD: f64 = 2.0;

/// Sliding-window step in pixels, both axes.
const WINDOW_STEP: u32 = 4;

/// Smallest face size the SeetaFace funnel accepts.
const SEETA_MIN_FACE: u32 = 20;

/// SeetaFace funnel-structured cascade, via `rustface`.
///
/// The pyramid step is the inverse of the scale factor. SeetaFace merges
/// overlapping windows itself and exposes no neighbour count, so
/// `min_neighbors` has no effect on this backend.
pub struct SeetaFaceDetector {
    detector: Box<dyn Detector>,
}

impl SeetaFaceDetector {
    /// Loads a SeetaFace frontal face model.
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::NonUtf8Path(path.to_path_buf()))?;

        let detector = rustface::create_detector(path_str).map_err(|source| BackendError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loaded SeetaFace model from {}", path.display());
        Ok(Self { detector })
    }

    fn configure(&mut self, params: &DetectionParams) {
        self.detector.set_min_face_size(min_face_size(params));
        self.detector.set_pyramid_scale_factor(pyramid_step(params));
        self.detector.set_score_thresh(SCORE_THRESHOLD);
        self.detector.set_slide_window_step(WINDOW_STEP, WINDOW_STEP);
    }
}

impl FaceDetector for SeetaFaceDetector {
    type Error = BackendError;

    fn detect(
        &mut self,
        image: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<Region>, Self::Error> {
        self.configure(params);

        let mut data = ImageData::new(image.as_raw(), image.width(), image.height());
        let faces = self.detector.detect(&mut data);

        Ok(keep_min_size(
            faces.iter().map(|face| {
                let bbox = face.bbox();
                Region::new(bbox.x(), bbox.y(), bbox.width(), bbox.height())
            }),
            params,
        ))
    }
}

/// Smallest face SeetaFace scans for: the shorter side of the minimum size,
/// but never below what the funnel supports.
fn min_face_size(params: &DetectionParams) -> u32 {
    params.min_size.0.min(params.min_size.1).max(SEETA_MIN_FACE)
}

/// SeetaFace shrinks the image by this ratio per pyramid level, the inverse
/// of the window growth ratio. Its setter panics outside 0.01..=0.99.
fn pyramid_step(params: &DetectionParams) -> f32 {
    (1.0 / params.scale_factor).clamp(0.01, 0.99) as f32
}

/// SeetaFace only bounds the shorter side; drop anything under the full
/// minimum size.
fn keep_min_size(
    regions: impl IntoIterator<Item = Region>,
    params: &DetectionParams,
) -> Vec<Region> {
    regions
        .into_iter()
        .filter(|region| params.accepts(region))
        .collect()
}

use super::BackendError;
use crate::detector::{DetectionParams, FaceDetector, Region};
use image::GrayImage;
use opencv::{
    core::{Mat, Rect, Size, Vector},
    objdetect::CascadeClassifier,
    prelude::*,
};
use std::path::Path;

pub const DEFAULT_CASCADE: &str = "haarcascade_frontalface_default.xml";

/// OpenCV Haar cascade, called through `detectMultiScale`.
pub struct HaarCascadeDetector {
    classifier: CascadeClassifier,
}

impl HaarCascadeDetector {
    /// Loads a cascade XML file such as `haarcascade_frontalface_default.xml`.
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::NonUtf8Path(path.to_path_buf()))?;

        let classifier = CascadeClassifier::new(path_str)?;
        if classifier.empty()? {
            return Err(BackendError::EmptyCascade(path.to_path_buf()));
        }

        log::info!("Loaded Haar cascade from {}", path.display());
        Ok(Self { classifier })
    }
}

impl FaceDetector for HaarCascadeDetector {
    type Error = BackendError;

    fn detect(
        &mut self,
        image: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<Region>, Self::Error> {
        let gray = Mat::from_slice_rows_cols(
            image.as_raw(),
            image.height() as usize,
            image.width() as usize,
        )?
        .try_clone()?;

        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &gray,
            &mut faces,
            params.scale_factor,
            params.min_neighbors as i32,
            0,
            Size::new(params.min_size.0 as i32, params.min_size.1 as i32),
            Size::default(),
        )?;

        Ok(faces
            .iter()
            .map(|r| Region::new(r.x, r.y, r.width.max(0) as u32, r.height.max(0) as u32))
            .collect())
    }
}

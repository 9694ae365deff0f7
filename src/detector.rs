use image::GrayImage;

/// Growth ratio of the search window between two detection passes.
pub const SCALE_FACTOR: f64 = 1.1;

/// Overlapping raw hits needed before a region is confirmed.
pub const MIN_NEIGHBORS: u32 = 5;

/// Smallest face, in pixels, the detector reports.
pub const MIN_FACE_SIZE: (u32, u32) = (60, 60);

/// Tuning parameters handed to every detection call.
///
/// Changing any of these changes detection sensitivity, so clients observe
/// them as part of the service contract. [`DetectionParams::default`] returns
/// the values the service runs with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: u32,
    pub min_size: (u32, u32),
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: SCALE_FACTOR,
            min_neighbors: MIN_NEIGHBORS,
            min_size: MIN_FACE_SIZE,
        }
    }
}

impl DetectionParams {
    /// Whether a `width` x `height` image can hold a face of the minimum size.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        width >= self.min_size.0 && height >= self.min_size.1
    }

    /// Whether a detected region is at least the minimum size.
    pub fn accepts(&self, region: &Region) -> bool {
        self.fits(region.width, region.height)
    }
}

/// A rectangular face region in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Interface to a pre-trained face detection capability.
///
/// Implementations bind to an external computer-vision library. They may keep
/// scratch buffers between calls, hence `&mut self`; the engine guarantees a
/// single caller at a time.
pub trait FaceDetector {
    /// The error type that can be returned during detection.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs detection on a single-channel image and returns every face region found.
    fn detect(
        &mut self,
        image: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<Region>, Self::Error>;
}

use crate::detector::{DetectionParams, FaceDetector, Region};
use image::GrayImage;
use std::{
    fmt::Display,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};
use tokio::sync::oneshot;

/// Errors reported by the detection engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The detector could not be constructed.
    #[error("failed to initialize face detector: {0}")]
    Init(String),
    /// The detector returned an error for this image.
    #[error("face detection failed: {0}")]
    Detection(String),
    /// The detector panicked while processing this image.
    #[error("face detector panicked: {0}")]
    Panicked(String),
    /// The worker thread is gone.
    #[error("detection engine is not running")]
    Stopped,
}

/// Represents the current state of the detection engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// The engine is waiting for work.
    Idle,
    /// The engine is running the detector.
    Processing,
}

impl EngineState {
    /// Returns the state as a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Processing => "processing",
        }
    }
}

/// Result of one detection, with telemetry.
#[derive(Debug)]
pub struct EngineResponse {
    /// Identifier assigned when the request was submitted.
    pub id: u64,
    /// Time the request waited in the queue before the detector picked it up.
    pub queue_time: Duration,
    /// Time spent inside the detector.
    pub duration: Duration,
    /// Face regions found in the image.
    pub regions: Vec<Region>,
}

struct EngineRequest {
    id: u64,
    image: GrayImage,
    submitted: Instant,
    reply: oneshot::Sender<Result<EngineResponse, EngineError>>,
}

#[derive(Default)]
struct EngineStats {
    processing: AtomicBool,
    detections: AtomicU64,
    failures: AtomicU64,
}

/// Owns the process-wide face detector on a dedicated worker thread.
///
/// The detector is built once, on the worker itself, so backends that are not
/// `Send` can be used. Requests are served one at a time in submission order;
/// each caller awaits its own reply.
pub struct DetectionEngine {
    params: DetectionParams,
    stats: Arc<EngineStats>,
    req_tx: Option<mpsc::Sender<EngineRequest>>,
    worker_handle: Option<JoinHandle<()>>,
    id_counter: AtomicU64,
}

impl DetectionEngine {
    /// Starts the worker thread and builds the detector on it.
    ///
    /// Blocks until `factory` has returned, so a missing or corrupt model is
    /// reported here rather than on the first request.
    ///
    /// # Arguments
    /// * `params` - Tuning parameters passed to every detection
    /// * `factory` - Builds the detector; runs on the worker thread
    pub fn spawn<D, E, F>(params: DetectionParams, factory: F) -> Result<Self, EngineError>
    where
        D: FaceDetector + 'static,
        E: Display,
        F: FnOnce() -> Result<D, E> + Send + 'static,
    {
        let (req_tx, req_rx) = mpsc::channel::<EngineRequest>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), EngineError>>();
        let stats = Arc::new(EngineStats::default());

        let worker_handle = std::thread::Builder::new()
            .name("face-detector".to_string())
            .spawn({
                let stats = stats.clone();
                move || {
                    let mut detector = match factory() {
                        Ok(detector) => {
                            let _ = ready_tx.send(Ok(()));
                            detector
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(EngineError::Init(e.to_string())));
                            return;
                        }
                    };

                    while let Ok(req) = req_rx.recv() {
                        if req.reply.is_closed() {
                            log::debug!("Skipping detection #{}, caller went away", req.id);
                            continue;
                        }
                        log::debug!("Running detection #{}", req.id);

                        stats.processing.store(true, Ordering::SeqCst);
                        let start_time = Instant::now();
                        let queue_time = start_time.duration_since(req.submitted);
                        let result = run_detector(&mut detector, &req.image, &params);
                        let duration = start_time.elapsed();
                        stats.processing.store(false, Ordering::SeqCst);

                        let result = match result {
                            Ok(regions) => {
                                stats.detections.fetch_add(1, Ordering::Relaxed);
                                log::debug!(
                                    "Detection #{} found {} region(s) in {:?}",
                                    req.id,
                                    regions.len(),
                                    duration
                                );
                                Ok(EngineResponse {
                                    id: req.id,
                                    queue_time,
                                    duration,
                                    regions,
                                })
                            }
                            Err(e) => {
                                stats.failures.fetch_add(1, Ordering::Relaxed);
                                log::error!("Detection #{} failed: {}", req.id, e);
                                Err(e)
                            }
                        };

                        // the caller may have gone away; nothing to do then
                        let _ = req.reply.send(result);
                    }
                    log::debug!("Detection worker exiting");
                }
            })
            .map_err(|e| EngineError::Init(e.to_string()))?;

        // a closed channel means the factory panicked
        let ready = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(EngineError::Init("detector factory panicked".to_string())));

        let mut engine = Self {
            params,
            stats,
            req_tx: Some(req_tx),
            worker_handle: Some(worker_handle),
            id_counter: AtomicU64::new(0),
        };

        match ready {
            Ok(()) => Ok(engine),
            Err(e) => {
                engine.stop();
                Err(e)
            }
        }
    }

    /// Returns the parameters every detection runs with.
    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Returns the current state of the engine.
    pub fn state(&self) -> EngineState {
        if self.stats.processing.load(Ordering::SeqCst) {
            EngineState::Processing
        } else {
            EngineState::Idle
        }
    }

    /// Number of detections completed successfully.
    pub fn detections(&self) -> u64 {
        self.stats.detections.load(Ordering::Relaxed)
    }

    /// Number of detections that ended in an error or a panic.
    pub fn failures(&self) -> u64 {
        self.stats.failures.load(Ordering::Relaxed)
    }

    /// Submits a grayscale image and waits for the detector's answer.
    pub async fn detect(&self, image: GrayImage) -> Result<EngineResponse, EngineError> {
        let tx = self.req_tx.as_ref().ok_or(EngineError::Stopped)?;
        let id = self.id_counter.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();

        tx.send(EngineRequest {
            id,
            image,
            submitted: Instant::now(),
            reply,
        })
            .map_err(|_| EngineError::Stopped)?;

        rx.await.map_err(|_| EngineError::Stopped)?
    }

    /// Stops the engine and joins the worker thread.
    ///
    /// Requests already queued are still answered before the worker exits.
    pub fn stop(&mut self) {
        self.req_tx.take();
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DetectionEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_detector<D: FaceDetector>(
    detector: &mut D,
    image: &GrayImage,
    params: &DetectionParams,
) -> Result<Vec<Region>, EngineError> {
    // no face of the minimum size fits, skip the scan
    if !params.fits(image.width(), image.height()) {
        return Ok(Vec::new());
    }

    match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(image, params))) {
        Ok(Ok(regions)) => Ok(regions),
        Ok(Err(e)) => Err(EngineError::Detection(e.to_string())),
        Err(payload) => Err(EngineError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

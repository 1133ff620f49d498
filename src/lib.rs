mod utils;
mod error;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod output;
pub mod provisioning;

use std::path::Path;
use std::time::Instant;
use crate::common::{ModelConfig, RcnnImage};
use crate::data::{ClassDetections, ConfigRcnn};
use crate::detection_runners::{DetectionOutput, InferenceEngine, OrtEngine, OrtIoNames, RcnnDetector};
use crate::output::{format_json, Draw, JsonDetection};

pub use error::DetectError;

pub type Result<T, E = DetectError> = std::result::Result<T, E>;

/// Provisions weights and builds an ONNX Runtime backed detector.
///
/// A failed download is only logged: loading then fails with
/// [`DetectError::ModelNotFound`] unless the weights are already on disk.
pub fn init_detector(model_details: &ModelConfig, config: ConfigRcnn) -> Result<RcnnDetector<OrtEngine>> {
    log::debug!("init_detector\n{}", model_details.to_string());
    if let Err(err) = provisioning::provision(model_details) {
        log::warn!("{}", err);
    }

    log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
    let engine = OrtEngine::new(
        &model_details.weights_path(),
        model_details.inference_device,
        model_details.ort_lib_path.as_deref(),
        OrtIoNames::from(&config),
    )?;
    RcnnDetector::new(engine, config)
}

/// Runs one image through the detector and logs the per-class results.
pub fn run_detection<E: InferenceEngine>(detector: &mut RcnnDetector<E>, image: &RcnnImage) -> Result<DetectionOutput> {
    let now = Instant::now();
    let output = detector.detect(&image.to_dynamic())?;
    output.detections.log_summary();
    log::debug!("Processing time: {:?}", now.elapsed());
    Ok(output)
}

/// What [`detect`] should produce.
pub enum OutputMode<'a> {
    /// Top-1 per class as JSON records.
    Json,
    /// Annotated image saved next to the source.
    Visualize(&'a Draw),
}

#[derive(Debug)]
pub enum DetectOutcome {
    Json(Vec<JsonDetection>),
    Visualized {
        path: std::path::PathBuf,
        detections: ClassDetections,
    },
}

/// Detects objects in the image at `image_path`.
///
/// The path is checked before anything else runs; a missing file gives
/// [`DetectError::ImageNotFound`] without touching the engine.
pub fn detect<E: InferenceEngine>(
    image_path: &Path,
    detector: &mut RcnnDetector<E>,
    mode: OutputMode<'_>,
) -> Result<DetectOutcome> {
    let image = RcnnImage::open(image_path)?;
    let output = run_detection(detector, &image)?;

    match mode {
        OutputMode::Json => Ok(DetectOutcome::Json(format_json(&output.detections))),
        OutputMode::Visualize(draw) => {
            let path = draw.save_visualization(&output, detector.pixel_means(), image_path)?;
            Ok(DetectOutcome::Visualized {
                path,
                detections: output.detections,
            })
        }
    }
}

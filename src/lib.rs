//! Real-time webcam object detection with YOLO models on ONNX Runtime.
//!
//! Frames are read from a capture device, run through the detector,
//! filtered to a fixed set of classes, annotated with boxes, labels and the
//! frame rate, then shown until the stream ends or the quit key is pressed.

mod utils;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod model_hub;
pub mod pipeline;

use std::time::Instant;
use image::RgbImage;
use crate::common::{Detection, ModelConfig};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYOLO;

pub use crate::pipeline::{ObjectDetection, RunSummary, StopReason};

/// Loads the model described by `model_details`, ready for [`run_detection`].
pub fn init_detector(model_details: &ModelConfig) -> anyhow::Result<OrtYOLO> {
    log::info!("Initializing detector\n{}", model_details.to_string());
    model_hub::load(&model_details.model_identifier, model_details)
}

/// Detects objects in a single image, all classes kept.
pub fn run_detection(yolo: &mut OrtYOLO, image: &RgbImage, model_details: &ModelConfig) -> anyhow::Result<Vec<Detection>> {
    let now = Instant::now();

    let ys = yolo.forward(std::slice::from_ref(image), &[model_details.conf_threshold], false)?;
    let detections = ys.into_iter().next().map(|y| y.into_detections()).unwrap_or_default();

    log::debug!("Processing time: {:?}", now.elapsed());

    Ok(detections)
}

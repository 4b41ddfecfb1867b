use std::time::Instant;

use anyhow::Result;
use image::{Rgb, RgbImage};

use crate::common::{ClassCatalog, Detection, ModelConfig};
use crate::data::Y;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYOLO;
use crate::model_hub;
use crate::pipeline::annotate::{self, FramePainter, Painter};
use crate::pipeline::filter::{self, TargetClassSet};
use crate::pipeline::io::{CaptureBackend, CaptureDevice, DisplaySurface, LoopConfig};
use crate::pipeline::palette;

/// A model that turns one frame into detections.
pub trait FrameDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;

    fn class_catalog(&self) -> &ClassCatalog;
}

impl FrameDetector for OrtYOLO {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let ys = self.forward(std::slice::from_ref(frame), &[], false)?;
        Ok(ys.into_iter().next().map(Y::into_detections).unwrap_or_default())
    }

    fn class_catalog(&self) -> &ClassCatalog {
        self.names()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The camera could not be opened; the loop never started.
    DeviceUnavailable,
    /// A frame read failed or returned nothing.
    EndOfStream,
    /// The operator pressed the quit key.
    QuitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames_displayed: usize,
    pub stop: StopReason,
    /// Wall-clock rate of the processing loop, in frames per second.
    pub measured_fps: f64,
}

/// Releases the camera and closes the windows when the loop is left, however it is left.
struct OpenedCapture<'a, C: CaptureDevice, D: DisplaySurface> {
    device: C,
    display: &'a mut D,
}

impl<C: CaptureDevice, D: DisplaySurface> Drop for OpenedCapture<'_, C, D> {
    fn drop(&mut self) {
        self.device.release();
        self.display.close_all();
    }
}

/// Webcam detection pipeline: capture, detect, filter, annotate, display.
pub struct ObjectDetection<M, P = FramePainter> {
    model: M,
    target_classes: TargetClassSet,
    painter: P,
    config: LoopConfig,
}

impl ObjectDetection<OrtYOLO> {
    /// Loads `model_identifier` (e.g. [`crate::common::DEFAULT_MODEL`]) with default settings.
    pub fn new(model_identifier: &str) -> Result<Self> {
        Self::with_model_config(&ModelConfig::new(model_identifier))
    }

    pub fn with_model_config(config: &ModelConfig) -> Result<Self> {
        let model = model_hub::load(&config.model_identifier, config)?;
        Ok(Self::from_model(model))
    }
}

impl<M: FrameDetector> ObjectDetection<M> {
    pub fn from_model(model: M) -> Self {
        Self {
            model,
            target_classes: TargetClassSet::default(),
            painter: FramePainter::default(),
            config: LoopConfig::default(),
        }
    }
}

impl<M: FrameDetector, P: Painter> ObjectDetection<M, P> {
    pub fn with_target_classes(mut self, target_classes: TargetClassSet) -> Self {
        self.target_classes = target_classes;
        self
    }

    pub fn with_painter<Q: Painter>(self, painter: Q) -> ObjectDetection<M, Q> {
        ObjectDetection {
            model: self.model,
            target_classes: self.target_classes,
            painter,
            config: self.config,
        }
    }

    pub fn with_loop_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn painter(&self) -> &P {
        &self.painter
    }

    pub fn target_classes(&self) -> &TargetClassSet {
        &self.target_classes
    }

    pub fn loop_config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn get_color(&self, class_id: usize) -> Rgb<u8> {
        palette::get_color(class_id)
    }

    pub fn filter_results(&self, detections: &[Detection]) -> Vec<Detection> {
        filter::filter_results(detections, self.model.class_catalog(), &self.target_classes)
    }

    pub fn annotate_frame(&mut self, frame: RgbImage, detections: &[Detection]) -> RgbImage {
        annotate::annotate_frame(&mut self.painter, self.model.class_catalog(), frame, detections)
    }

    /// Runs until the stream ends or the quit key is pressed.
    ///
    /// A camera that fails to open is logged and reported as
    /// [`StopReason::DeviceUnavailable`]; the display is not touched.
    /// Once the camera is open it is released, and the windows closed,
    /// exactly once on every exit path including inference errors.
    pub fn run<B, D>(&mut self, backend: &mut B, display: &mut D) -> Result<RunSummary>
    where
        B: CaptureBackend,
        D: DisplaySurface,
    {
        let device = match backend.open(self.config.camera_index) {
            Ok(device) => device,
            Err(e) => {
                log::error!("Failed to open camera #{}: {:#}", self.config.camera_index, e);
                return Ok(RunSummary {
                    frames_displayed: 0,
                    stop: StopReason::DeviceUnavailable,
                    measured_fps: 0.,
                });
            }
        };
        let mut capture = OpenedCapture { device, display };
        log::info!(
            "Camera #{} opened ({:.2} fps reported), press '{}' to quit",
            self.config.camera_index,
            capture.device.frame_rate(),
            self.config.quit_key,
        );

        let started = Instant::now();
        let mut frames_displayed = 0;

        let stop = loop {
            let frame = match capture.device.read() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::EndOfStream,
                Err(e) => {
                    log::warn!("Frame read failed: {:#}", e);
                    break StopReason::EndOfStream;
                }
            };

            let detections = self.model.detect(&frame)?;
            let detections = self.filter_results(&detections);
            let mut frame = self.annotate_frame(frame, &detections);
            annotate::draw_fps(&mut self.painter, &mut frame, capture.device.frame_rate());

            capture.display.show(&self.config.window_name, &frame)?;
            frames_displayed += 1;

            if let Some(key) = capture.display.poll_key(self.config.key_wait_ms) {
                if self.config.is_quit(key) {
                    break StopReason::QuitRequested;
                }
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        let measured_fps = if elapsed > 0. { frames_displayed as f64 / elapsed } else { 0. };
        log::info!(
            "Stopped ({:?}) after {} frames, {:.2} fps measured",
            stop,
            frames_displayed,
            measured_fps,
        );

        Ok(RunSummary { frames_displayed, stop, measured_fps })
    }
}

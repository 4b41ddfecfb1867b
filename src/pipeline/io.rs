//! Capture and display seams of the pipeline.

use anyhow::Result;
use image::RgbImage;

/// An opened video source.
pub trait CaptureDevice {
    /// Next frame, `Ok(None)` once the stream has ended.
    fn read(&mut self) -> Result<Option<RgbImage>>;

    /// Frame rate reported by the device, 0.0 when unknown.
    fn frame_rate(&self) -> f64;

    fn release(&mut self);
}

/// Opens capture devices by index.
pub trait CaptureBackend {
    type Device: CaptureDevice;

    fn open(&mut self, index: i32) -> Result<Self::Device>;
}

/// Window system showing annotated frames.
pub trait DisplaySurface {
    fn show(&mut self, window: &str, frame: &RgbImage) -> Result<()>;

    /// Waits up to `wait_ms` for a key press.
    fn poll_key(&mut self, wait_ms: i32) -> Option<i32>;

    fn close_all(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub camera_index: i32,
    pub window_name: String,
    pub quit_key: char,
    pub key_wait_ms: i32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            window_name: "Web Camera".to_string(),
            quit_key: 'q',
            key_wait_ms: 1,
        }
    }
}

impl LoopConfig {
    /// True when the low byte of `key` is the quit key.
    pub fn is_quit(&self, key: i32) -> bool {
        key >= 0 && (key & 0xFF) == self.quit_key as i32
    }
}

//! OpenCV camera and HighGUI window backends.

use anyhow::{Context, Result};
use image::RgbImage;
use opencv::{
    core::{self, Mat},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};

use crate::pipeline::io::{CaptureBackend, CaptureDevice, DisplaySurface};

#[derive(Debug, Default)]
pub struct OpenCvBackend;

impl CaptureBackend for OpenCvBackend {
    type Device = OpenCvCamera;

    fn open(&mut self, index: i32) -> Result<OpenCvCamera> {
        let cap = VideoCapture::new(index, videoio::CAP_ANY)
            .with_context(|| format!("open video device #{index}"))?;
        if !cap.is_opened()? {
            anyhow::bail!("Video device #{} could not be opened", index);
        }
        Ok(OpenCvCamera { cap, frame: Mat::default(), rgb: Mat::default() })
    }
}

pub struct OpenCvCamera {
    cap: VideoCapture,
    frame: Mat,
    rgb: Mat,
}

impl CaptureDevice for OpenCvCamera {
    fn read(&mut self) -> Result<Option<RgbImage>> {
        if !self.cap.read(&mut self.frame)? || self.frame.empty() {
            return Ok(None);
        }

        imgproc::cvt_color(
            &self.frame,
            &mut self.rgb,
            imgproc::COLOR_BGR2RGB,
            0,
            core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )?;

        let width = self.rgb.cols() as u32;
        let height = self.rgb.rows() as u32;
        let data = self.rgb.data_bytes()?.to_vec();
        let image = RgbImage::from_vec(width, height, data)
            .ok_or_else(|| anyhow::anyhow!("Frame buffer does not match {}x{} RGB", width, height))?;

        Ok(Some(image))
    }

    fn frame_rate(&self) -> f64 {
        self.cap.get(videoio::CAP_PROP_FPS).unwrap_or(0.)
    }

    fn release(&mut self) {
        if let Err(e) = self.cap.release() {
            log::warn!("Failed to release video device: {}", e);
        }
    }
}

#[derive(Debug, Default)]
pub struct HighGuiDisplay {
    bgr: Mat,
}

impl DisplaySurface for HighGuiDisplay {
    fn show(&mut self, window: &str, frame: &RgbImage) -> Result<()> {
        let rgb = unsafe {
            // `frame` outlives the borrowed Mat; only read by cvt_color below.
            Mat::new_rows_cols_with_data_unsafe(
                frame.height() as i32,
                frame.width() as i32,
                core::CV_8UC3,
                frame.as_raw().as_ptr() as *mut _,
                core::Mat_AUTO_STEP,
            )
        }?;

        imgproc::cvt_color(
            &rgb,
            &mut self.bgr,
            imgproc::COLOR_RGB2BGR,
            0,
            core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )?;

        highgui::imshow(window, &self.bgr)?;
        Ok(())
    }

    fn poll_key(&mut self, wait_ms: i32) -> Option<i32> {
        match highgui::wait_key(wait_ms) {
            Ok(-1) => None,
            Ok(key) => Some(key),
            Err(e) => {
                log::warn!("wait_key failed: {}", e);
                None
            }
        }
    }

    fn close_all(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            log::warn!("Failed to close windows: {}", e);
        }
    }
}

//! Drawing detections onto frames.

use std::fs;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::common::{ClassCatalog, Detection};
use crate::pipeline::filter::class_name;
use crate::pipeline::palette::get_color;

pub const BOX_THICKNESS: u32 = 2;
pub const LABEL_SCALE: f32 = 0.9;
/// Vertical gap between a box's top edge and its label baseline.
pub const LABEL_OFFSET: i32 = 10;

pub const FPS_ORIGIN: (i32, i32) = (10, 30);
pub const FPS_SCALE: f32 = 1.0;
pub const FPS_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Glyph height in pixels for a text scale of 1.0.
const BASE_TEXT_HEIGHT: f32 = 24.0;

/// DejaVu Sans, bundled so labels render without system fonts.
const DEFAULT_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Drawing primitives used by the pipeline.
///
/// Text origins are the bottom-left corner of the text baseline.
pub trait Painter {
    fn draw_rectangle(
        &mut self,
        frame: &mut RgbImage,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Rgb<u8>,
        thickness: u32,
    );

    fn draw_text(
        &mut self,
        frame: &mut RgbImage,
        text: &str,
        origin: (i32, i32),
        scale: f32,
        color: Rgb<u8>,
        thickness: u32,
    );
}

/// [`Painter`] backed by `imageproc` and a TrueType font.
pub struct FramePainter {
    font: Option<FontArc>,
    warned: bool,
}

impl std::fmt::Debug for FramePainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePainter")
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Default for FramePainter {
    /// Draws text with the bundled DejaVu Sans.
    fn default() -> Self {
        let font = match FontArc::try_from_slice(DEFAULT_FONT) {
            Ok(font) => Some(font),
            Err(e) => {
                log::error!("Bundled font is unreadable: {}", e);
                None
            }
        };
        Self { font, warned: false }
    }
}

impl FramePainter {
    pub fn with_font_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let font = Self::read_font(path.as_ref())?;
        Ok(Self { font: Some(font), warned: false })
    }

    pub fn without_font() -> Self {
        Self { font: None, warned: false }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn read_font(path: &Path) -> Result<FontArc> {
        let bytes = fs::read(path).with_context(|| format!("read font {}", path.display()))?;
        FontArc::try_from_vec(bytes).map_err(|e| anyhow::anyhow!("Invalid font {}: {}", path.display(), e))
    }
}

impl Painter for FramePainter {
    fn draw_rectangle(
        &mut self,
        frame: &mut RgbImage,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Rgb<u8>,
        thickness: u32,
    ) {
        let (x1, y1) = (top_left.0.min(bottom_right.0), top_left.1.min(bottom_right.1));
        let (x2, y2) = (top_left.0.max(bottom_right.0), top_left.1.max(bottom_right.1));

        // nested outlines from the outer edge inwards
        for t in 0..thickness.max(1) as i32 {
            let w = x2 - x1 + 1 - 2 * t;
            let h = y2 - y1 + 1 - 2 * t;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(x1 + t, y1 + t).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(frame, rect, color);
        }
    }

    fn draw_text(
        &mut self,
        frame: &mut RgbImage,
        text: &str,
        origin: (i32, i32),
        scale: f32,
        color: Rgb<u8>,
        thickness: u32,
    ) {
        let Some(font) = &self.font else {
            if !self.warned {
                log::warn!("No font available, skipping text overlays");
                self.warned = true;
            }
            return;
        };

        let height = BASE_TEXT_HEIGHT * scale;
        let px = PxScale::from(height);
        let top = origin.1 - height.round() as i32;
        for dx in 0..thickness.max(1) as i32 {
            draw_text_mut(frame, color, origin.0 + dx, top, px, font, text);
        }
    }
}

/// Text drawn next to a detection's box, e.g. `person 0.91`.
pub fn label_text(detection: &Detection, catalog: &ClassCatalog) -> String {
    let name = class_name(detection, catalog).unwrap_or("Unknown");
    format!("{} {:.2}", name, detection.confidence)
}

/// Draws every detection onto `frame` and returns it.
pub fn annotate_frame<P: Painter + ?Sized>(
    painter: &mut P,
    catalog: &ClassCatalog,
    mut frame: RgbImage,
    detections: &[Detection],
) -> RgbImage {
    for detection in detections {
        let (x1, y1, x2, y2) = detection.bbox.as_x1y1_x2y2_i32();
        let color = get_color(detection.class_id);
        painter.draw_rectangle(&mut frame, (x1, y1), (x2, y2), color, BOX_THICKNESS);
        painter.draw_text(
            &mut frame,
            &label_text(detection, catalog),
            (x1, y1 - LABEL_OFFSET),
            LABEL_SCALE,
            color,
            BOX_THICKNESS,
        );
    }
    frame
}

/// Overlays the frame rate in the top-left corner.
pub fn draw_fps<P: Painter + ?Sized>(painter: &mut P, frame: &mut RgbImage, rate: f64) {
    painter.draw_text(
        frame,
        &format!("FPS: {:.2}", rate),
        FPS_ORIGIN,
        FPS_SCALE,
        FPS_COLOR,
        BOX_THICKNESS,
    );
}

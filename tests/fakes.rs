#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use image::{Rgb, RgbImage};
use cam_detect::common::{ClassCatalog, Detection};
use cam_detect::pipeline::{CaptureBackend, CaptureDevice, DisplaySurface, FrameDetector, Painter};

pub fn detection(class_id: usize, confidence: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
    Detection::default()
        .with_x1y1_x2y2(x1, y1, x2, y2)
        .with_confidence(confidence)
        .with_class_id(class_id)
}

/// Returns the same detections for every frame.
pub struct ScriptedDetector {
    pub catalog: ClassCatalog,
    pub detections: Vec<Detection>,
    pub fail: bool,
    pub calls: usize,
}

impl ScriptedDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { catalog: ClassCatalog::coco(), detections, fail: false, calls: 0 }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new(vec![]) }
    }
}

impl FrameDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        self.calls += 1;
        if self.fail {
            anyhow::bail!("inference failed");
        }
        Ok(self.detections.clone())
    }

    fn class_catalog(&self) -> &ClassCatalog {
        &self.catalog
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnRect {
    pub top_left: (i32, i32),
    pub bottom_right: (i32, i32),
    pub color: Rgb<u8>,
    pub thickness: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnText {
    pub text: String,
    pub origin: (i32, i32),
    pub color: Rgb<u8>,
}

#[derive(Debug, Default)]
pub struct RecordingPainter {
    pub rects: Vec<DrawnRect>,
    pub texts: Vec<DrawnText>,
}

impl Painter for RecordingPainter {
    fn draw_rectangle(&mut self, _frame: &mut RgbImage, top_left: (i32, i32), bottom_right: (i32, i32), color: Rgb<u8>, thickness: u32) {
        self.rects.push(DrawnRect { top_left, bottom_right, color, thickness });
    }

    fn draw_text(&mut self, _frame: &mut RgbImage, text: &str, origin: (i32, i32), _scale: f32, color: Rgb<u8>, _thickness: u32) {
        self.texts.push(DrawnText { text: text.to_string(), origin, color });
    }
}

/// Everything the fakes observed, in order.
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn count(log: &EventLog, event: &str) -> usize {
    log.borrow().iter().filter(|e| e.as_str() == event).count()
}

pub enum Read {
    Frame(RgbImage),
    End,
    Fail,
}

pub struct FakeBackend {
    pub log: EventLog,
    pub open_fails: bool,
    pub reads: Vec<Read>,
    pub fps: f64,
}

impl FakeBackend {
    pub fn new(log: &EventLog, reads: Vec<Read>) -> Self {
        Self { log: log.clone(), open_fails: false, reads, fps: 30. }
    }

    pub fn frames(log: &EventLog, n: usize) -> Self {
        Self::new(log, (0..n).map(|_| Read::Frame(RgbImage::new(64, 48))).collect())
    }
}

impl CaptureBackend for FakeBackend {
    type Device = FakeCamera;

    fn open(&mut self, index: i32) -> anyhow::Result<FakeCamera> {
        self.log.borrow_mut().push(format!("open {index}"));
        if self.open_fails {
            anyhow::bail!("no such device");
        }
        Ok(FakeCamera {
            log: self.log.clone(),
            reads: std::mem::take(&mut self.reads).into(),
            fps: self.fps,
        })
    }
}

pub struct FakeCamera {
    log: EventLog,
    reads: VecDeque<Read>,
    fps: f64,
}

impl CaptureDevice for FakeCamera {
    fn read(&mut self) -> anyhow::Result<Option<RgbImage>> {
        self.log.borrow_mut().push("read".to_string());
        match self.reads.pop_front() {
            Some(Read::Frame(frame)) => Ok(Some(frame)),
            Some(Read::Fail) => anyhow::bail!("device unplugged"),
            Some(Read::End) | None => Ok(None),
        }
    }

    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn release(&mut self) {
        self.log.borrow_mut().push("release".to_string());
    }
}

pub struct FakeDisplay {
    pub log: EventLog,
    pub keys: VecDeque<Option<i32>>,
    pub shown: Vec<RgbImage>,
    pub windows: Vec<String>,
}

impl FakeDisplay {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone(), keys: VecDeque::new(), shown: vec![], windows: vec![] }
    }

    pub fn with_keys(mut self, keys: &[Option<i32>]) -> Self {
        self.keys = keys.iter().copied().collect();
        self
    }
}

impl DisplaySurface for FakeDisplay {
    fn show(&mut self, window: &str, frame: &RgbImage) -> anyhow::Result<()> {
        self.log.borrow_mut().push("show".to_string());
        self.windows.push(window.to_string());
        self.shown.push(frame.clone());
        Ok(())
    }

    fn poll_key(&mut self, wait_ms: i32) -> Option<i32> {
        self.log.borrow_mut().push(format!("poll {wait_ms}"));
        self.keys.pop_front().flatten()
    }

    fn close_all(&mut self) {
        self.log.borrow_mut().push("close".to_string());
    }
}

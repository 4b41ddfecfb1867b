use serde::{Deserialize, Serialize};
use crate::common::BoundingBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// One recognized object in a single frame.
///
/// Produced fresh by every inference call and dropped once the frame has
/// been displayed. Nothing is tracked across frames.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: usize,
    pub bbox: BoundingBox,
    pub label: Option<String>,
    pub confidence: f32,
}

impl Nms for Detection {
    /// Computes the intersection over union (IoU) between this bounding box and another.
    fn iou(&self, other: &Self) -> f32 {
        let union = self.union(other);
        if union <= 0. {
            return 0.;
        }
        self.intersect(other) / union
    }

    /// Returns the confidence score of the bounding box.
    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn class_id(&self) -> usize {
        self.class_id
    }
}

impl Detection {
    pub fn new(class_id: usize, bbox: BoundingBox, label: Option<String>, confidence: f32) -> Self {
        Self {
            class_id,
            bbox,
            label,
            confidence,
        }
    }

    /// Sets the bounding box's coordinates using `(x1, y1, x2, y2)` and calculates width and height.
    ///
    /// # Arguments
    ///
    /// * `x1` - The x-coordinate of the top-left corner.
    /// * `y1` - The y-coordinate of the top-left corner.
    /// * `x2` - The x-coordinate of the bottom-right corner.
    /// * `y2` - The y-coordinate of the bottom-right corner.
    ///
    /// # Returns
    ///
    /// A `Detection` instance with updated coordinates and dimensions.
    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = BoundingBox::default().with_x1y1_x2y2(x1, y1, x2, y2);
        self
    }

    /// Sets the bounding box's coordinates and dimensions using `(x, y, w, h)`.
    pub fn with_x1y1_wh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = BoundingBox::default().with_x1y1_wh(x, y, w, h);
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = bbox;
        self
    }

    /// Sets the confidence score of the detection.
    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    /// Sets the class ID of the detection.
    pub fn with_class_id(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    /// Sets the optional name of the detection.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn get_label(&self) -> String {
        self.label.clone().unwrap_or("Unknown".to_string())
    }

    /// Computes the intersection area between this detection and another.
    pub fn intersect(&self, other: &Detection) -> f32 {
        self.bbox.intersect(&other.bbox)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &Detection) -> f32 {
        self.bbox.union(&other.bbox)
    }
}

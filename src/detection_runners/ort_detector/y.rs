use crate::common::Detection;
use crate::detection_runners::ort_detector::nms::Nms;

/// Container for the inference results of one image.
#[derive(Clone, PartialEq, Default)]
pub struct Y {
    detections: Option<Vec<Detection>>,
}

impl std::fmt::Debug for Y {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut f = f.debug_struct("Y");
        if let Some(x) = &self.detections {
            if !x.is_empty() {
                f.field("Detections", &x);
            }
        }
        f.finish()
    }
}

impl Y {
    /// Sets the `detections` field with the provided vector of detections.
    pub fn with_detections(mut self, detections: &[Detection]) -> Self {
        self.detections = Some(detections.to_vec());
        self
    }

    ///
    /// # Returns
    ///
    /// * `Option<&Vec<Detection>>` - A reference to the vector of detections, or `None` if it is not set.
    pub fn detections(&self) -> Option<&Vec<Detection>> {
        self.detections.as_ref()
    }

    pub fn into_detections(self) -> Vec<Detection> {
        self.detections.unwrap_or_default()
    }

    pub fn apply_nms(mut self, iou_threshold: f32) -> Self {
        if let Some(ref mut bboxes) = self.detections {
            Self::nms(bboxes, iou_threshold);
        }
        self
    }

    /// Greedy per-class suppression, highest confidence first. Survivors stay sorted by confidence.
    pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
        boxes.sort_by(|b1, b2| {
            b2.confidence()
                .partial_cmp(&b1.confidence())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut current_index = 0;
        for index in 0..boxes.len() {
            let mut drop = false;
            for prev_index in 0..current_index {
                if boxes[prev_index].class_id() != boxes[index].class_id() {
                    continue;
                }
                let iou = boxes[prev_index].iou(&boxes[index]);
                if iou > iou_threshold {
                    drop = true;
                    break;
                }
            }
            if !drop {
                boxes.swap(current_index, index);
                current_index += 1;
            }
        }
        boxes.truncate(current_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, conf: f32) -> Detection {
        Detection::default()
            .with_x1y1_x2y2(x1, 0., x1 + 10., 10.)
            .with_confidence(conf)
    }

    #[test]
    fn nms_keeps_best_of_overlapping() {
        let y = Y::default()
            .with_detections(&[det(0., 0.5), det(1., 0.9), det(100., 0.3)])
            .apply_nms(0.45);
        let kept = y.into_detections();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].confidence, 0.3);
    }

    #[test]
    fn nms_keeps_overlapping_boxes_of_other_classes() {
        let keyboard = Detection::default()
            .with_x1y1_x2y2(0., 0., 100., 100.)
            .with_confidence(0.9)
            .with_class_id(66);
        let laptop = Detection::default()
            .with_x1y1_x2y2(5., 5., 100., 100.)
            .with_confidence(0.8)
            .with_class_id(63);
        let laptop_dup = laptop.clone().with_confidence(0.7);

        let kept = Y::default()
            .with_detections(&[laptop_dup, keyboard, laptop])
            .apply_nms(0.45)
            .into_detections();

        let ids: Vec<usize> = kept.iter().map(|d| d.class_id).collect();
        assert_eq!(ids, vec![66, 63]);
        assert_eq!(kept[1].confidence, 0.8);
    }
}

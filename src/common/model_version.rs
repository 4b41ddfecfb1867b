//! YOLO families and the layout of their raw prediction tensors.

use ndarray::{ArrayView, Axis, IxDyn};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ModelVersion {
    #[default] YoloV5,
    YoloV6,
    YoloV7,
    YoloV8,
    YoloV9,
    YoloV10,
    YoloV11,
}

impl ModelVersion {
    pub fn name(&self) -> String {
        match self {
            Self::YoloV5 => "YoloV5".to_string(),
            Self::YoloV6 => "YoloV6".to_string(),
            Self::YoloV7 => "YoloV7".to_string(),
            Self::YoloV8 => "YoloV8".to_string(),
            Self::YoloV9 => "YoloV9".to_string(),
            Self::YoloV10 => "YoloV10".to_string(),
            Self::YoloV11 => "YoloV11".to_string(),
        }
    }

    /// Guesses the family from a checkpoint identifier such as `yolov5s` or `yolo11n`.
    pub fn from_identifier(identifier: &str) -> Option<ModelVersion> {
        let stem = std::path::Path::new(identifier)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(identifier)
            .to_lowercase();

        // longest prefixes first so "yolov10" is not read as "yolov1"
        let table = [
            ("yolov10", ModelVersion::YoloV10),
            ("yolov11", ModelVersion::YoloV11),
            ("yolo11", ModelVersion::YoloV11),
            ("yolov5", ModelVersion::YoloV5),
            ("yolov6", ModelVersion::YoloV6),
            ("yolov7", ModelVersion::YoloV7),
            ("yolov8", ModelVersion::YoloV8),
            ("yolov9", ModelVersion::YoloV9),
        ];
        table
            .iter()
            .find(|(prefix, _)| stem.starts_with(prefix))
            .map(|(_, version)| *version)
    }

    /// Output layout emitted by this family's ONNX export.
    pub fn preds(&self) -> YoloPreds {
        match self {
            ModelVersion::YoloV5 | ModelVersion::YoloV6 | ModelVersion::YoloV7 => YoloPreds::n_a_cxcywh_confclss(),
            ModelVersion::YoloV8 | ModelVersion::YoloV9 | ModelVersion::YoloV11 => YoloPreds::n_cxcywh_clss_a(),
            ModelVersion::YoloV10 => YoloPreds::n_a_xyxy_confcls().apply_nms(false),
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum BoxType {
    /// Center x, center y, width, height
    Cxcywh,

    /// Top-left and bottom-right corners
    Xyxy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClssType {
    /// Per-class scores only
    Clss,
    /// Best score then class id
    ConfCls,
    /// Objectness then per-class scores
    ConfClss,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnchorsPosition {
    Before,
    After,
}

/// Slices of one image's predictions, split by meaning.
pub struct PredSlices<'a> {
    pub bboxes: ArrayView<'a, f32, IxDyn>,
    pub ids: Option<ArrayView<'a, f32, IxDyn>>,
    pub clss: ArrayView<'a, f32, IxDyn>,
    pub confs: Option<ArrayView<'a, f32, IxDyn>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YoloPreds {
    pub clss: ClssType,
    pub bbox: BoxType,
    pub anchors: AnchorsPosition,
    pub apply_nms: bool,
}

impl Default for YoloPreds {
    fn default() -> Self {
        Self::n_a_cxcywh_confclss()
    }
}

impl YoloPreds {
    pub fn apply_nms(mut self, x: bool) -> Self {
        self.apply_nms = x;
        self
    }

    pub fn n_a_cxcywh_confclss() -> Self {
        // YOLOv5 | YOLOv6 | YOLOv7 : NACxcywhConfClss
        Self {
            bbox: BoxType::Cxcywh,
            clss: ClssType::ConfClss,
            anchors: AnchorsPosition::Before,
            apply_nms: true,
        }
    }

    pub fn n_cxcywh_clss_a() -> Self {
        // YOLOv8 | YOLOv9 | YOLO11 : NCxcywhClssA
        Self {
            bbox: BoxType::Cxcywh,
            clss: ClssType::Clss,
            anchors: AnchorsPosition::After,
            apply_nms: true,
        }
    }

    pub fn n_a_xyxy_confcls() -> Self {
        // YOLOv10 : NAXyxyConfCls
        Self {
            bbox: BoxType::Xyxy,
            clss: ClssType::ConfCls,
            anchors: AnchorsPosition::Before,
            apply_nms: true,
        }
    }

    pub fn is_anchors_first(&self) -> bool {
        matches!(self.anchors, AnchorsPosition::Before)
    }

    /// Splits one image's `[anchors, values]` (or `[values, anchors]`) predictions.
    pub fn parse_preds<'a>(&self, x: ArrayView<'a, f32, IxDyn>, nc: usize) -> anyhow::Result<PredSlices<'a>> {
        let x = if self.is_anchors_first() {
            x
        } else {
            x.reversed_axes()
        };

        if x.ndim() != 2 {
            anyhow::bail!("Expected 2D predictions per image, got shape {:?}", x.shape());
        }
        let width = x.shape()[1];
        let needed = match self.clss {
            ClssType::ConfClss => 5 + nc,
            ClssType::Clss => 4 + nc,
            ClssType::ConfCls => 6,
        };
        if width < needed {
            anyhow::bail!("Predictions have {} values per anchor, layout {:?} needs {}", width, self.clss, needed);
        }

        let (bboxes, xs) = x.split_at(Axis(1), 4);

        let slices = match self.clss {
            ClssType::ConfClss => {
                let (confs, xs) = xs.split_at(Axis(1), 1);
                let (clss, _) = xs.split_at(Axis(1), nc);
                PredSlices { bboxes, ids: None, clss, confs: Some(confs) }
            }
            ClssType::ConfCls => {
                let (clss, xs) = xs.split_at(Axis(1), 1);
                let (ids, _) = xs.split_at(Axis(1), 1);
                PredSlices { bboxes, ids: Some(ids), clss, confs: None }
            }
            ClssType::Clss => {
                let (clss, _) = xs.split_at(Axis(1), nc);
                PredSlices { bboxes, ids: None, clss, confs: None }
            }
        };

        Ok(slices)
    }
}

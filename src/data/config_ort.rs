//! Options for building the ONNX Runtime detector.

use anyhow::Result;
use crate::common::{ClassCatalog, InferenceDevice, ModelVersion, YoloPreds};

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: String,
    pub ort_lib_path: String,
    pub device: InferenceDevice,
    pub model_width: u32,
    pub model_height: u32,
    pub profile: bool,
    pub num_dry_run: usize,

    // trt related
    pub trt_engine_cache_enable: bool,
    pub trt_fp16_enable: bool,

    pub nc: Option<usize>,
    pub confs: Vec<f32>,
    pub iou: Option<f32>,
    pub names: Option<ClassCatalog>,
    pub yolo_version: Option<ModelVersion>,
    pub yolo_preds: Option<YoloPreds>,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: String::new(),
            ort_lib_path: String::new(),
            device: InferenceDevice::CPU,
            profile: false,
            model_height: 640,
            model_width: 640,
            num_dry_run: 1,

            trt_engine_cache_enable: true,
            trt_fp16_enable: false,

            nc: Some(80), // Default COCO class number
            confs: vec![0.25f32],
            iou: None,
            names: None,
            yolo_version: None,
            yolo_preds: None,
        }
    }
}

#[allow(dead_code)]
impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model(mut self, onnx_path: &str) -> Result<Self> {
        if !std::path::Path::new(onnx_path).is_file() {
            anyhow::bail!("ONNX model not found: {}", onnx_path);
        }
        self.onnx_path = onnx_path.to_string();
        Ok(self)
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Self {
        self.ort_lib_path = ort_lib_path.to_string();
        self
    }

    pub fn with_model_width(mut self, n: u32) -> Self {
        self.model_width = n;
        self
    }

    pub fn with_model_height(mut self, n: u32) -> Self {
        self.model_height = n;
        self
    }

    pub fn with_dry_run(mut self, n: usize) -> Self {
        self.num_dry_run = n;
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_trt_fp16(mut self, x: bool) -> Self {
        self.trt_fp16_enable = x;
        self
    }

    pub fn with_trt_engine_cache(mut self, x: bool) -> Self {
        self.trt_engine_cache_enable = x;
        self
    }

    pub fn with_yolo_version(mut self, x: ModelVersion) -> Self {
        self.yolo_version = Some(x);
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_names(mut self, names: ClassCatalog) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_yolo_preds(mut self, x: YoloPreds) -> Self {
        self.yolo_preds = Some(x);
        self
    }

    pub fn with_nc(mut self, nc: usize) -> Self {
        self.nc = Some(nc);
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou = Some(x);
        self
    }

    pub fn with_confs(mut self, x: &[f32]) -> Self {
        self.confs = x.to_vec();
        self
    }
}

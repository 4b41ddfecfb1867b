use crate::common::inference_device::InferenceDevice;
use crate::common::model_version::ModelVersion;

/// Small pretrained checkpoint used when the caller names none.
pub const DEFAULT_MODEL: &str = "yolov5s";

/// Release page the default checkpoints are fetched from.
///
/// Ultralytics releases mostly ship PyTorch weights; when `<id>.onnx` is not
/// published there, point `CAM_DETECT_HUB_URL` at a mirror of ONNX exports or
/// place the exported file in the model cache.
pub const DEFAULT_HUB_URL: &str = "https://github.com/ultralytics/yolov5/releases/download/v7.0";

/// Environment variable overriding [`DEFAULT_HUB_URL`].
pub const HUB_URL_ENV: &str = "CAM_DETECT_HUB_URL";

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_identifier: String,
    /// Explicit ONNX file, bypasses identifier resolution when set.
    pub weights_path: Option<String>,
    /// ONNX Runtime shared library. Empty means `ort`'s default discovery.
    pub ort_lib_path: String,
    pub labels_path: Option<String>,
    pub inference_device: InferenceDevice,
    /// Inferred from the identifier when `None`.
    pub model_version: Option<ModelVersion>,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub width: u32,
    pub height: u32,
    pub hub_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_identifier: DEFAULT_MODEL.to_string(),
            weights_path: None,
            ort_lib_path: String::new(),
            labels_path: None,
            inference_device: InferenceDevice::CPU,
            model_version: None,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            width: 640,
            height: 640,
            hub_url: std::env::var(HUB_URL_ENV).unwrap_or_else(|_| DEFAULT_HUB_URL.to_string()),
        }
    }
}

impl ModelConfig {
    pub fn new(model_identifier: &str) -> Self {
        Self {
            model_identifier: model_identifier.to_string(),
            ..Default::default()
        }
    }

    pub fn set_device_type(&mut self, device_type: InferenceDevice) {
        self.inference_device = device_type;
    }

    /// Explicit version, else the one implied by the identifier, else YOLOv5.
    pub fn resolved_version(&self) -> ModelVersion {
        self.model_version
            .or_else(|| ModelVersion::from_identifier(&self.model_identifier))
            .unwrap_or_default()
    }

    pub fn to_string(&self) -> String {
        format!("Model: {}\n\
        Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Version: {:?}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {}\n\
        IoU Threshold: {}",
                self.model_identifier,
                self.weights_path.as_deref().unwrap_or("-"),
                self.labels_path.as_deref().unwrap_or("-"),
                self.ort_lib_path,
                self.inference_device, self.resolved_version(),
                self.width, self.height, self.conf_threshold, self.iou_threshold)
    }
}

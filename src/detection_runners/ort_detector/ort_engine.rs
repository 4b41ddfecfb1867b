//! ONNX Runtime session wrapper.

use anyhow::Result;
use half::{bf16, f16};
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{ExecutionProvider,
                          CPUExecutionProvider,
                          CUDAExecutionProvider,
                          TensorRTExecutionProvider,
                          CoreMLExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::Session,
    tensor::TensorElementType,
    value::{DynValue, Tensor},
};
use crate::common::InferenceDevice;
use crate::data::{ConfigOrt, TimeCalc, Xs, X, CROSS_MARK};

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    input_names: Vec<String>,
    input_dtypes: Vec<TensorElementType>,
    output_names: Vec<String>,
    model_width: u32,
    model_height: u32,
    profile: bool,
    pub infer_time: TimeCalc,
}

#[allow(dead_code)]
impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if !config.ort_lib_path.is_empty() {
            if let Err(e) = ort::init_from(config.ort_lib_path.as_str()).commit() {
                return Err(anyhow::anyhow!("Failed to commit ORT from {}: {:?}", config.ort_lib_path, e));
            }
        }

        let mut builder = Session::builder()?;

        let mut device = config.device.to_owned();
        match device {
            InferenceDevice::TensorRT(device_id) => {
                Self::build_trt(
                    &mut builder,
                    device_id,
                    config.trt_fp16_enable,
                    config.trt_engine_cache_enable,
                )?;
            }
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CoreML(_) => Self::build_coreml(&mut builder).unwrap_or_else(|err| {
                log::warn!("{err}, Using cpu");
                device = InferenceDevice::CPU;
            }),
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let input_names: Vec<String> = session.inputs.iter().map(|x| x.name.to_string()).collect();
        let input_dtypes: Vec<TensorElementType> = session
            .inputs
            .iter()
            .map(|x| x.input_type.tensor_type().unwrap_or(TensorElementType::Float32))
            .collect();
        let output_names: Vec<String> = session.outputs.iter().map(|x| x.name.to_string()).collect();

        if input_names.is_empty() || output_names.is_empty() {
            anyhow::bail!("{CROSS_MARK} Model {} has no inputs or no outputs", config.onnx_path);
        }

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {}x{} | Inputs: {:?} | Outputs: {:?}",
            device,
            config.model_width,
            config.model_height,
            input_names,
            output_names,
        );

        Ok(Self {
            session,
            device,
            input_names,
            input_dtypes,
            output_names,
            model_width: config.model_width,
            model_height: config.model_height,
            profile: config.profile,
            infer_time: TimeCalc::default(),
        })
    }

    fn build_trt(
        builder: &mut SessionBuilder,
        device_id: usize,
        fp16_enable: bool,
        engine_cache_enable: bool,
    ) -> Result<()> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(fp16_enable)
            .with_engine_cache(engine_cache_enable)
            .with_engine_cache_path("trt-cache")
            .with_timing_cache(false);
        if trt.is_available()? {
            match trt.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} TensorRT initialization failed: {:?}", err) }
            }
            log::info!("Initial model serialization with TensorRT may take some time...");
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} TensorRT execution provider not available")
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default()
            .with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_coreml(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CoreMLExecutionProvider::default()
            .with_subgraphs(false);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CoreML initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CoreML execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn tensor_preprocess(x: &X, dtype: &TensorElementType) -> Result<DynValue> {
        let x = match dtype {
            TensorElementType::Float16 => Tensor::from_array(x.mapv(f16::from_f32))?.into_dyn(),
            TensorElementType::Bfloat16 => Tensor::from_array(x.mapv(bf16::from_f32))?.into_dyn(),
            TensorElementType::Float32 => Tensor::from_array(x.0.clone())?.into_dyn(),
            _ => anyhow::bail!("Unsupported model input type: {:?}", dtype),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue) -> Result<Array<f32, IxDyn>> {
        if let Ok(y) = x.try_extract_array::<f32>() {
            return Ok(y.view().to_owned());
        }
        if let Ok(y) = x.try_extract_array::<f16>() {
            return Ok(y.view().mapv(f16::to_f32));
        }
        if let Ok(y) = x.try_extract_array::<i64>() {
            return Ok(y.view().mapv(|v| v as f32));
        }
        anyhow::bail!("Unsupported ort output tensor type: {:?}", x.dtype())
    }

    /// Runs the session. Inputs are matched to the model inputs by position.
    pub fn run(&mut self, xs: Xs) -> Result<Xs> {
        let t_pre = std::time::Instant::now();
        let mut xs_ = Vec::with_capacity(xs.len());
        for ((name, dtype), x) in self.input_names.iter().zip(self.input_dtypes.iter()).zip(xs.iter()) {
            xs_.push((name.to_string(), Self::tensor_preprocess(x, dtype)?));
        }
        let t_pre = t_pre.elapsed();
        self.infer_time.add_or_push(0, t_pre);

        let t_run = std::time::Instant::now();
        let outputs = self.session.run(xs_)?;
        let t_run = t_run.elapsed();
        self.infer_time.add_or_push(1, t_run);

        let t_post = std::time::Instant::now();
        let mut ys = Xs::new();
        for name in self.output_names.iter() {
            let y = Self::tensor_postprocess(&outputs[name.as_str()])?;
            ys.push_kv(name.as_str(), X::from(y))?;
        }
        drop(outputs);
        let t_post = t_post.elapsed();
        self.infer_time.add_or_push(2, t_post);

        if self.profile {
            log::info!("[Profile] {:?} ({:?} avg) [alignment: {:?} | inference: {:?} | to_f32: {:?}]",
                t_pre + t_run + t_post,
                self.infer_time.avg(),
                t_pre,
                t_run,
                t_post,
            );
        }
        Ok(ys)
    }

    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }

    pub fn in_names(&self) -> &Vec<String> {
        &self.input_names
    }

    pub fn out_names(&self) -> &Vec<String> {
        &self.output_names
    }

    pub fn device(&self) -> &InferenceDevice {
        &self.device
    }

    pub fn model_width(&self) -> u32 { self.model_width }

    pub fn model_height(&self) -> u32 { self.model_height }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ts(&self) -> &TimeCalc {
        &self.infer_time
    }
}

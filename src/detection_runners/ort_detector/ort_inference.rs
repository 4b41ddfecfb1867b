use anyhow::Result;
use image::RgbImage;
use ndarray::{s, Axis};
use rayon::prelude::*;

use crate::common::{BoundingBox, BoxType, ClassCatalog, Detection, ModelVersion, YoloPreds};
use crate::data::{ConfigOrt, DynConf, Xs, Y};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::ort_detector::image_ops::{self, letterbox_ratio};
use crate::detection_runners::ort_detector::OrtEngine;

#[derive(Debug)]
pub struct OrtYOLO {
    engine: OrtEngine,
    nc: usize,
    height: u32,
    width: u32,
    confs: DynConf,
    iou: f32,
    names: ClassCatalog,
    layout: YoloPreds,
    version: Option<ModelVersion>,
}

impl InferenceProcess for OrtYOLO {
    type Input = RgbImage;
    type Thresholds = f32;

    fn new(options: ConfigOrt) -> Result<Self> {
        let engine = OrtEngine::new(&options)?;
        let (height, width) = (engine.model_height(), engine.model_width());

        // YOLO Outputs Format
        let (version, layout) = match options.yolo_version {
            Some(ver) => (Some(ver), ver.preds()),
            None => match options.yolo_preds {
                None => anyhow::bail!("No clear YOLO version or YOLO Format specified."),
                Some(fmt) => (None, fmt),
            }
        };

        // Class names: user-defined.or(parsed)
        let names_parsed = engine.try_fetch("names").and_then(|x| ClassCatalog::from_metadata(&x));
        let names = match names_parsed {
            Some(names_parsed) => match options.names {
                Some(names) => {
                    if names.len() == names_parsed.len() {
                        Some(names)
                    } else {
                        anyhow::bail!(
                            "The lengths of parsed class names: {} and user-defined class names: {} do not match.",
                            names_parsed.len(),
                            names.len(),
                        );
                    }
                }
                None => Some(names_parsed),
            },
            None => options.names,
        };

        // nc: names.len().or(options.nc)
        let nc = match &names {
            Some(names) => names.len(),
            None => match options.nc {
                Some(nc) => nc,
                None => anyhow::bail!(
                    "Unable to obtain the number of classes. Please specify them explicitly using `options.with_nc(usize)` or `options.with_names(..)`."
                ),
            }
        };

        let names = match names {
            None if nc == 80 => ClassCatalog::coco(),
            None => ClassCatalog::numbered(nc),
            Some(names) => names,
        };

        let confs = DynConf::new(&options.confs, nc);
        let iou = options.iou.unwrap_or(0.45);

        log::info!("YOLO Version: {:?} | Classes: {}", version, nc);

        let mut yolo = Self {
            engine,
            confs,
            iou,
            nc,
            height,
            width,
            names,
            layout,
            version,
        };

        for _ in 0..options.num_dry_run {
            yolo.run(&[RgbImage::new(width, height)], &[])?;
        }
        if options.num_dry_run > 0 {
            log::info!("Warm-up done ({} run(s))", options.num_dry_run);
        }

        Ok(yolo)
    }

    fn preprocess(&self, xs: &[Self::Input]) -> Result<Xs> {
        let x = image_ops::preprocess(xs, self.height, self.width)?;
        Ok(Xs::from(x))
    }

    fn inference(&mut self, xs: Xs) -> Result<Xs> {
        self.engine.run(xs)
    }

    fn postprocess(&self, xs: Xs, xs0: &[Self::Input], thresh: &[Self::Thresholds]) -> Result<Vec<Y>> {
        if xs.is_empty() {
            anyhow::bail!("Model produced no outputs");
        }
        let preds = &xs[0];
        if preds.ndim() != 3 {
            anyhow::bail!("Expected a 3D prediction tensor, got shape {:?}", preds.shape());
        }

        preds
            .axis_iter(Axis(0))
            .into_par_iter()
            .enumerate()
            .map(|(idx, preds)| {
                let slices = self.layout.parse_preds(preds, self.nc)?;

                let image_width = xs0[idx].width() as f32;
                let image_height = xs0[idx].height() as f32;
                let ratio = letterbox_ratio(xs0[idx].width(), xs0[idx].height(), self.width, self.height);
                let floor = thresh.get(idx).copied();

                let detections = slices.bboxes
                    .axis_iter(Axis(0))
                    .into_par_iter()
                    .enumerate()
                    .filter_map(|(i, bbox)| {
                        // confidence & class_id
                        let (class_id, confidence) = match &slices.ids {
                            Some(ids) => (ids[[i, 0]] as usize, slices.clss[[i, 0]]),
                            None => {
                                let (class_id, &confidence) = slices.clss
                                    .slice(s![i, ..])
                                    .into_iter()
                                    .enumerate()
                                    .max_by(|a, b| a.1.total_cmp(b.1))?;

                                match &slices.confs {
                                    None => (class_id, confidence),
                                    Some(confs) => (class_id, confidence * confs[[i, 0]]),
                                }
                            }
                        };

                        // filtering low scores
                        if class_id >= self.nc || confidence < self.confs[class_id] {
                            return None;
                        }
                        if floor.is_some_and(|t| confidence < t) {
                            return None;
                        }

                        let bbox = bbox.mapv(|x| x / ratio);
                        let (x1, y1, x2, y2) = match self.layout.bbox {
                            BoxType::Cxcywh => {
                                let (cx, cy, w, h) = (bbox[0], bbox[1], bbox[2], bbox[3]);
                                (cx - w / 2., cy - h / 2., cx + w / 2., cy + h / 2.)
                            }
                            BoxType::Xyxy => (bbox[0], bbox[1], bbox[2], bbox[3]),
                        };
                        let bbox = BoundingBox::new(x1, y1, x2, y2).clamp_to(image_width, image_height);

                        let mut detection = Detection::default()
                            .with_bbox(bbox)
                            .with_confidence(confidence)
                            .with_class_id(class_id);
                        if let Some(name) = self.names.name(class_id) {
                            detection = detection.with_label(name);
                        }

                        Some(detection)
                    })
                    .collect::<Vec<_>>();

                let mut y = Y::default();
                if !detections.is_empty() {
                    y = y.with_detections(&detections);
                    if self.layout.apply_nms {
                        y = y.apply_nms(self.iou);
                    }
                }

                Ok(y)
            })
            .collect()
    }

    fn print_time(&self) {
        log::info!("Avg: {:?}", self.engine.infer_time.avg());
    }
}

#[allow(dead_code)]
impl OrtYOLO {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn version(&self) -> Option<&ModelVersion> {
        self.version.as_ref()
    }

    pub fn layout(&self) -> &YoloPreds {
        &self.layout
    }

    pub fn names(&self) -> &ClassCatalog {
        &self.names
    }

    pub fn engine(&self) -> &OrtEngine {
        &self.engine
    }
}

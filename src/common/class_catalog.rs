use std::path::Path;
use anyhow::Result;
use regex::Regex;
use crate::utils;

/// The 80 COCO classes, in the order the pretrained YOLO checkpoints emit them.
pub const COCO_NAMES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Class identifier to name table, fixed once the model is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCatalog {
    names: Vec<String>,
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::coco()
    }
}

impl ClassCatalog {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn coco() -> Self {
        Self::from(&COCO_NAMES[..])
    }

    /// Parses the `names` entry that Ultralytics exporters write into the ONNX metadata.
    ///
    /// String format: `{0: 'person', 1: 'bicycle', 2: 'sports ball', ..., 27: "yellow_lady's_slipper"}`
    pub fn from_metadata(names: &str) -> Option<Self> {
        let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#).ok()?;
        let parsed: Vec<String> = re
            .captures_iter(names)
            .map(|x| {
                let (_, [_, name, _]) = x.extract();
                name.to_string()
            })
            .collect();

        if parsed.is_empty() {
            None
        } else {
            Some(Self::new(parsed))
        }
    }

    /// Loads class names from a labels file.
    ///
    /// `.json` files hold an array of names; anything else is read as one name per line.
    pub fn from_labels_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let names: Vec<String> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("Failed to parse labels file {}: {}", path.display(), e))?
            }
            _ => utils::file_to_vec(path)?
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        };

        if names.is_empty() {
            anyhow::bail!("Labels file {} contains no class names", path.display());
        }
        Ok(Self::new(names))
    }

    /// Placeholder names for models that carry no class table.
    pub fn numbered(n: usize) -> Self {
        Self::new((0..n).map(|x| format!("# {}", x)).collect())
    }

    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl From<&[&str]> for ClassCatalog {
    fn from(names: &[&str]) -> Self {
        Self::new(names.iter().map(|x| x.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ultralytics_metadata() {
        let catalog = ClassCatalog::from_metadata("{0: 'person', 1: 'bicycle', 2: 'sports ball'}").unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.name(2), Some("sports ball"));
        assert_eq!(catalog.name(3), None);
    }

    #[test]
    fn rejects_metadata_without_names() {
        assert!(ClassCatalog::from_metadata("{}").is_none());
    }

    #[test]
    fn coco_ids_match_pretrained_order() {
        let catalog = ClassCatalog::coco();
        assert_eq!(catalog.len(), 80);
        assert_eq!(catalog.name(0), Some("person"));
        assert_eq!(catalog.name(63), Some("laptop"));
        assert_eq!(catalog.name(64), Some("mouse"));
    }
}

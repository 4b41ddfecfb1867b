//! Resolves model identifiers to local ONNX files and loads them.
//!
//! An identifier is either a path to an existing `.onnx` file or the name of
//! a published checkpoint (`yolov5s`, `yolov5m`, ...). Named checkpoints are
//! cached under the user cache directory and fetched from the hub on first use.

use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::common::{ClassCatalog, ModelConfig, ModelVersion, HUB_URL_ENV};
use crate::data::{ConfigOrt, FsAccess};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtYOLO;

/// True when `identifier` can name a hub checkpoint.
pub fn is_valid_identifier(identifier: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$")
        .is_ok_and(|re| re.is_match(identifier))
        && !identifier.contains("..")
}

/// Finds the ONNX file for `identifier`, downloading it into the cache if needed.
pub fn resolve(identifier: &str, config: &ModelConfig) -> Result<PathBuf> {
    if let Some(path) = existing_file(identifier) {
        return Ok(path);
    }
    let cache_dir = FsAccess::Cache.path_with_subs(&["models"])?;
    resolve_in(identifier, &cache_dir, &config.hub_url)
}

/// Same as [`resolve`] with an explicit cache directory.
pub fn resolve_in(identifier: &str, cache_dir: &Path, hub_url: &str) -> Result<PathBuf> {
    if let Some(path) = existing_file(identifier) {
        return Ok(path);
    }
    if !is_valid_identifier(identifier) {
        anyhow::bail!("Unknown model identifier: {:?}", identifier);
    }

    let file_name = if identifier.ends_with(".onnx") {
        identifier.to_string()
    } else {
        format!("{identifier}.onnx")
    };
    let cached = cache_dir.join(&file_name);
    if cached.is_file() {
        log::info!("Using cached model {}", cached.display());
        return Ok(cached);
    }

    let url = format!("{}/{}", hub_url.trim_end_matches('/'), file_name);
    download(&url, &cached).map_err(|e| match e {
        DownloadError::NotFound => anyhow::anyhow!(
            "Unknown model identifier: {:?} ({} not found). Export it to ONNX and place it at {}, or set {} to a host serving ONNX exports",
            identifier,
            url,
            cached.display(),
            HUB_URL_ENV,
        ),
        DownloadError::Unreachable(e) => anyhow::anyhow!("Model source unreachable: {}: {}", url, e),
        DownloadError::Io(e) => anyhow::anyhow!("Failed to store model {}: {}", cached.display(), e),
    })?;

    Ok(cached)
}

/// Loads the detector and its class catalog for `identifier`.
pub fn load(identifier: &str, config: &ModelConfig) -> Result<OrtYOLO> {
    let onnx_path = match &config.weights_path {
        Some(path) => PathBuf::from(path),
        None => resolve(identifier, config)?,
    };

    let onnx_path = onnx_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Model path is not valid UTF-8: {}", onnx_path.display()))?
        .to_string();

    let mut options = ConfigOrt::new()
        .with_model(&onnx_path)?
        .with_ort_lib_path(&config.ort_lib_path)
        .with_device(config.inference_device)
        .with_yolo_version(
            config.model_version
                .or_else(|| ModelVersion::from_identifier(identifier))
                .unwrap_or_default(),
        )
        .with_model_width(config.width)
        .with_model_height(config.height)
        .with_confs(&[config.conf_threshold])
        .with_iou(config.iou_threshold)
        .with_dry_run(1);

    if let Some(labels) = &config.labels_path {
        let names = ClassCatalog::from_labels_file(labels)
            .with_context(|| format!("load labels {}", labels))?;
        options = options.with_nc(names.len()).with_names(names);
    }

    log::info!("Loading model {} from {}", identifier, onnx_path);
    OrtYOLO::new(options)
}

fn existing_file(identifier: &str) -> Option<PathBuf> {
    let path = Path::new(identifier);
    if path.is_file() {
        Some(path.to_path_buf())
    } else {
        None
    }
}

#[derive(Debug)]
enum DownloadError {
    NotFound,
    Unreachable(String),
    Io(io::Error),
}

fn download(url: &str, dest: &Path) -> std::result::Result<(), DownloadError> {
    log::info!("Downloading {} -> {}", url, dest.display());
    let response = match ureq::get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(404, _)) => return Err(DownloadError::NotFound),
        Err(ureq::Error::Status(code, _)) => return Err(DownloadError::Unreachable(format!("HTTP {code}"))),
        Err(e) => return Err(DownloadError::Unreachable(e.to_string())),
    };

    let part = dest.with_extension("onnx.part");
    let written = (|| -> io::Result<u64> {
        let mut out = BufWriter::new(fs::File::create(&part)?);
        let n = io::copy(&mut response.into_reader(), &mut out)?;
        out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(n)
    })();

    match written {
        Ok(0) => {
            let _ = fs::remove_file(&part);
            Err(DownloadError::Unreachable("empty response body".to_string()))
        }
        Ok(n) => {
            fs::rename(&part, dest).map_err(DownloadError::Io)?;
            log::info!("Downloaded {} bytes", n);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&part);
            Err(DownloadError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_plain_names() {
        assert!(is_valid_identifier("yolov5s"));
        assert!(is_valid_identifier("yolo11n.onnx"));
        assert!(!is_valid_identifier("../etc/passwd"));
        assert!(!is_valid_identifier("a/b"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn bad_identifier_fails_before_any_download() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_in("not a model!", dir.path(), "http://127.0.0.1:9").unwrap_err();
        assert!(err.to_string().contains("Unknown model identifier"));
    }

    #[test]
    fn cached_checkpoint_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("yolov5s.onnx");
        fs::write(&cached, b"onnx").unwrap();
        let path = resolve_in("yolov5s", dir.path(), "http://127.0.0.1:9").unwrap();
        assert_eq!(path, cached);
    }

    #[test]
    fn existing_path_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("custom.onnx");
        fs::write(&model, b"onnx").unwrap();
        let path = resolve_in(model.to_str().unwrap(), Path::new("/nonexistent"), "http://127.0.0.1:9").unwrap();
        assert_eq!(path, model);
    }

    /// Serves a single 404 response on a local port.
    fn missing_asset_server() -> String {
        use std::io::{Read, Write};
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn missing_hub_asset_explains_how_to_seed_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_in("yolov5s", dir.path(), &missing_asset_server()).unwrap_err().to_string();
        assert!(err.contains("Unknown model identifier"));
        assert!(err.contains(&dir.path().join("yolov5s.onnx").display().to_string()));
        assert!(err.contains(HUB_URL_ENV));
        assert!(!dir.path().join("yolov5s.onnx.part").exists());
    }

    #[test]
    fn unreachable_hub_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_in("yolov5s", dir.path(), "http://127.0.0.1:9").unwrap_err();
        assert!(err.to_string().contains("unreachable"));
        assert!(!dir.path().join("yolov5s.onnx").exists());
    }
}

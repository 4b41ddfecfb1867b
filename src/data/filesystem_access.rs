//! Represents various directories on the system, including Cache, Config, and current directory.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "cam_detect";

#[derive(Debug)]
pub enum FsAccess {
    Cache,
    Config,
    Current,
}

impl FsAccess {
    /// Retrieves the base path for the specified directory type, optionally appending the `cam_detect` subdirectory.
    ///
    /// # Arguments
    /// * `raw` - If `true`, returns the base path without adding the `cam_detect` subdirectory.
    fn get_path(&self, raw: bool) -> anyhow::Result<PathBuf> {
        let base_path = match self {
            FsAccess::Cache => dirs::cache_dir(),
            FsAccess::Config => dirs::config_dir(),
            FsAccess::Current => std::env::current_dir().ok(),
        };

        let mut path = base_path.ok_or_else(|| {
            anyhow::anyhow!("Unsupported operating system. Supported OS: Linux, MacOS, Windows.")
        })?;

        if !raw {
            path.push(APP_DIR);
        }
        Ok(path)
    }

    /// Returns the default path for the `cam_detect` directory, creating it automatically if it does not exist.
    ///
    /// Examples:
    /// `~/.cache/cam_detect`, `~/.config/cam_detect`.
    pub fn path(&self) -> anyhow::Result<PathBuf> {
        let d = self.get_path(false)?;
        Self::create_directory(&d)?;
        Ok(d)
    }

    /// Constructs a path to the `cam_detect` directory with the provided subdirectories, creating it automatically.
    ///
    /// Examples:
    /// `~/.cache/cam_detect/models`.
    pub fn path_with_subs(&self, subs: &[&str]) -> anyhow::Result<PathBuf> {
        let mut d = self.get_path(false)?;
        for sub in subs {
            d.push(sub);
        }
        Self::create_directory(&d)?;
        Ok(d)
    }

    /// Creates the specified directory if it does not exist.
    fn create_directory(path: &Path) -> anyhow::Result<()> {
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        Ok(())
    }
}

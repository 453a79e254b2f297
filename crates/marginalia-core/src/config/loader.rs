//! Configuration file discovery and loading

use super::settings::MarginaliaConfig;
use crate::error::MarginaliaError;
use crate::result::Result;
use std::path::{Path, PathBuf};

/// File names searched in every directory, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 3] = [".marginaliarc.toml", ".marginaliarc.json", "marginalia.toml"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Find the nearest config file, starting at `start_path` and walking up
    /// to the filesystem root.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|err| MarginaliaError::io_error(start_path, err))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let candidate = current.join(filename);
                if candidate.is_file() {
                    tracing::debug!("Found config: {}", candidate.display());
                    return Ok(Some(candidate));
                }
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok(None),
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<MarginaliaConfig> {
        MarginaliaConfig::load(path).map_err(|err| match err {
            MarginaliaError::Config { message } => MarginaliaError::config_error(format!(
                "Failed to load config from '{}': {message}",
                path.display()
            )),
            other => other,
        })
    }

    /// Load an explicit config file, or the nearest discovered one.
    ///
    /// Without either, the defaults apply.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<MarginaliaConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(MarginaliaError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(MarginaliaConfig::default()),
        }
    }
}

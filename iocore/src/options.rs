use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a TOML file with [`ExecutorOptions`].
pub const CONFIG_ENV: &str = "IOCORE_CONFIG";

const DEFAULT_JPEG_QUALITY: u8 = 90;

/// What the executor does with the source bytes.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Decode the source and re-encode it in the destination's format.
    #[default]
    Transcode,
    /// Copy the source verbatim.
    Copy,
}

/// Tunables for the job executor.
///
/// ```toml
/// transform = "transcode"
/// overwrite = true
/// jpeg_quality = 90
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorOptions {
    /// Transformation applied to every job.
    pub transform: Transform,
    /// Replace an existing destination instead of failing.
    pub overwrite: bool,
    /// JPEG encoder quality, 1..=100.
    pub jpeg_quality: u8,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            overwrite: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Errors raised while loading [`ExecutorOptions`].
#[derive(Error, Debug)]
pub enum OptionsError {
    /// Options file could not be read.
    #[error("Cannot read options file {path}: {source}")]
    Read {
        /// Options file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Options file is not valid TOML for this schema.
    #[error("Cannot parse options: {0}")]
    Parse(#[from] toml::de::Error),

    /// JPEG quality outside 1..=100.
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    JpegQuality(u8),
}

impl ExecutorOptions {
    /// Parses options from a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, OptionsError> {
        let options: ExecutorOptions = toml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Reads options from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Loads options from the file named by `IOCORE_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, OptionsError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), OptionsError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(OptionsError::JpegQuality(self.jpeg_quality));
        }
        Ok(())
    }
}

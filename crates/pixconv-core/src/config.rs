//! JSON configuration for hosts and tools.
//!
//! The engine itself takes no configuration: everything it needs arrives through
//! `set_formats` and the context capability snapshot. Tools use this file to describe the
//! context they want to simulate and how chatty logging should be.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ConvertError;

const COLORIMETRY_NAMES: &[&str] = &["auto", "bt601", "bt709", "bt2020", "srgb"];
const API_NAMES: &[&str] = &["gl", "gl3", "gles2"];

/// Reads `path` and deserializes it as `T`.
pub fn load_typed_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConvertError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConvertError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// A GL context described in JSON, used when no live context is around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextProfile {
    /// `"gl"` (legacy desktop), `"gl3"` (core profile) or `"gles2"` (any GLES).
    pub api: String,
    pub major: u32,
    #[serde(default)]
    pub minor: u32,
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Overrides the version-derived draw buffers support.
    #[serde(default)]
    pub draw_buffers: Option<bool>,
    /// Overrides the version-derived set of texture storage formats (`"RG8"`, `"R16"`, ...).
    #[serde(default)]
    pub texture_formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixconvConfig {
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default = "default_colorimetry")]
    pub default_colorimetry: String,

    /// Absent means "negotiate without a context".
    #[serde(default)]
    pub context: Option<ContextProfile>,
}

fn default_log_filter() -> String {
    "warn".to_string()
}
fn default_colorimetry() -> String {
    "auto".to_string()
}

impl Default for PixconvConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            default_colorimetry: default_colorimetry(),
            context: None,
        }
    }
}

impl PixconvConfig {
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let cfg: PixconvConfig = load_typed_json(path)?;
        cfg.validate(path)?;
        Ok(cfg)
    }

    pub fn validate(&self, path: &Path) -> Result<(), ConvertError> {
        let invalid = |msg: String| ConvertError::InvalidConfig {
            path: PathBuf::from(path),
            msg,
        };

        if !COLORIMETRY_NAMES.contains(&self.default_colorimetry.as_str()) {
            return Err(invalid(format!(
                "unknown colorimetry '{}' (expected one of {})",
                self.default_colorimetry,
                COLORIMETRY_NAMES.join(", ")
            )));
        }
        if let Some(ctx) = &self.context {
            if !API_NAMES.contains(&ctx.api.as_str()) {
                return Err(invalid(format!(
                    "unknown context api '{}' (expected one of {})",
                    ctx.api,
                    API_NAMES.join(", ")
                )));
            }
            if ctx.major == 0 {
                return Err(invalid("context major version must be > 0".into()));
            }
        }
        Ok(())
    }
}

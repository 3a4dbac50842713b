use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "postura")
}

pub static CONFIG_PATH: Lazy<PathBuf> = Lazy::new(|| match option_env!("POSTURA_CONFIG_PATH") {
    Some(path) => PathBuf::from(path),
    None => project_dirs()
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("postura.toml")),
});

pub static DEFAULT_MODEL_PATH: Lazy<PathBuf> = Lazy::new(|| {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from("models"))
        .join("pose_landmark_full.onnx")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ONNX pose landmark model
    pub model_path: PathBuf,
    pub camera: String,
    /// Minimum pose presence score for a detection to count
    pub presence_threshold: f32,
    /// Reports with a used landmark below this visibility are flagged
    pub visibility_threshold: f64,
    pub default_height_cm: f64,
    /// Frames dropped before a camera snapshot
    pub warmup_frames: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.clone(),
            camera: "/dev/video0".to_string(),
            presence_threshold: 0.5,
            visibility_threshold: 0.5,
            default_height_cm: 175.0,
            warmup_frames: 10,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(CONFIG_PATH.as_path());
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(CONFIG_PATH.as_path());
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data).with_context(|| format!("writing config {}", path.display()))
}

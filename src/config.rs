use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::estimate::EstimatorSettings;
use crate::frame::{DEFAULT_INFERENCE_HEIGHT, DEFAULT_INFERENCE_WIDTH};
use crate::gesture::{DEFAULT_REQUIRED_FIST_FRAMES, DEFAULT_REQUIRED_NO_FIST_FRAMES};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8765";
const DEFAULT_ESTIMATOR_BACKEND: &str = "stub";
const DEFAULT_ESTIMATOR_COMMAND: &str = "python3";

#[derive(Debug, Deserialize, Default)]
struct GesturedConfigFile {
    listen_addr: Option<String>,
    estimator: Option<EstimatorConfigFile>,
    inference: Option<InferenceConfigFile>,
    stabilizer: Option<StabilizerConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct EstimatorConfigFile {
    backend: Option<String>,
    command: Option<String>,
    script: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct InferenceConfigFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct StabilizerConfigFile {
    required_fist_frames: Option<u32>,
    required_no_fist_frames: Option<u32>,
}

/// Daemon configuration: defaults, overlaid by an optional JSON config
/// file (`GESTURED_CONFIG`), overlaid by `GESTURED_*` env vars.
#[derive(Debug, Clone)]
pub struct GesturedConfig {
    pub listen_addr: String,
    pub estimator: EstimatorSettings,
    pub inference: InferenceSettings,
    pub stabilizer: StabilizerSettings,
}

#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct StabilizerSettings {
    pub required_fist_frames: u32,
    pub required_no_fist_frames: u32,
}

impl GesturedConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("GESTURED_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: GesturedConfigFile) -> Self {
        let listen_addr = file
            .listen_addr
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let estimator = EstimatorSettings {
            backend: file
                .estimator
                .as_ref()
                .and_then(|estimator| estimator.backend.clone())
                .unwrap_or_else(|| DEFAULT_ESTIMATOR_BACKEND.to_string()),
            command: file
                .estimator
                .as_ref()
                .and_then(|estimator| estimator.command.clone())
                .unwrap_or_else(|| DEFAULT_ESTIMATOR_COMMAND.to_string()),
            script: file.estimator.and_then(|estimator| estimator.script),
        };
        let inference = InferenceSettings {
            width: file
                .inference
                .as_ref()
                .and_then(|inference| inference.width)
                .unwrap_or(DEFAULT_INFERENCE_WIDTH),
            height: file
                .inference
                .as_ref()
                .and_then(|inference| inference.height)
                .unwrap_or(DEFAULT_INFERENCE_HEIGHT),
        };
        let stabilizer = StabilizerSettings {
            required_fist_frames: file
                .stabilizer
                .as_ref()
                .and_then(|stabilizer| stabilizer.required_fist_frames)
                .unwrap_or(DEFAULT_REQUIRED_FIST_FRAMES),
            required_no_fist_frames: file
                .stabilizer
                .and_then(|stabilizer| stabilizer.required_no_fist_frames)
                .unwrap_or(DEFAULT_REQUIRED_NO_FIST_FRAMES),
        };
        Self {
            listen_addr,
            estimator,
            inference,
            stabilizer,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("GESTURED_LISTEN_ADDR") {
            if !addr.trim().is_empty() {
                self.listen_addr = addr;
            }
        }
        if let Ok(backend) = std::env::var("GESTURED_ESTIMATOR") {
            if !backend.trim().is_empty() {
                self.estimator.backend = backend;
            }
        }
        if let Ok(script) = std::env::var("GESTURED_ESTIMATOR_SCRIPT") {
            if !script.trim().is_empty() {
                self.estimator.script = Some(PathBuf::from(script));
            }
        }
        if let Ok(frames) = std::env::var("GESTURED_STABILITY_FRAMES") {
            let frames: u32 = frames
                .parse()
                .map_err(|_| anyhow!("GESTURED_STABILITY_FRAMES must be an integer"))?;
            self.stabilizer.required_fist_frames = frames;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.inference.width == 0 || self.inference.height == 0 {
            return Err(anyhow!("inference resolution must be non-zero"));
        }
        if self.stabilizer.required_fist_frames == 0 {
            return Err(anyhow!("required_fist_frames must be >= 1"));
        }
        if self.stabilizer.required_no_fist_frames == 0 {
            return Err(anyhow!("required_no_fist_frames must be >= 1"));
        }
        Ok(())
    }
}

impl Default for GesturedConfig {
    fn default() -> Self {
        Self::from_file(GesturedConfigFile::default())
    }
}

fn read_config_file(path: &Path) -> Result<GesturedConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

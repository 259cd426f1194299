// src/config/settings.rs
//
// TOML-backed settings. Every field has a default, so a partial (or absent)
// file is always valid input.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::batch::BatchOptions;
use crate::core::dsp::WindowType;
use crate::core::lazy::VisibilityPolicy;
use crate::core::pipeline::PipelineConfig;
use crate::core::spectrogram::{Normalization, SpectrogramConfig};
use crate::error::{Result, VizError};

pub const LOCAL_CONFIG_FILE: &str = "avrviz.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    #[serde(default)]
    pub spectrogram: SpectrogramSettings,
    #[serde(default)]
    pub waveform: WaveformSettings,
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub lazy: LazySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramSettings {
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Defaults to `frame_size / 4` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_size: Option<usize>,
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,
    #[serde(default)]
    pub window: WindowType,
    #[serde(default)]
    pub normalization: Normalization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformSettings {
    #[serde(default = "default_width")]
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSettings {
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    #[serde(default = "default_vibration_dir")]
    pub vibration_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    #[serde(default = "default_yield_ms")]
    pub yield_ms: u64,
    #[serde(default = "default_artifacts_file")]
    pub artifacts_file: String,
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LazySettings {
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_lookahead")]
    pub lookahead: f32,
}

impl Default for SpectrogramSettings {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            hop_size: None,
            max_frames: default_max_frames(),
            window: WindowType::default(),
            normalization: Normalization::default(),
        }
    }
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            vibration_dir: default_vibration_dir(),
            output_dir: default_output_dir(),
            progress_interval: default_progress_interval(),
            yield_ms: default_yield_ms(),
            artifacts_file: default_artifacts_file(),
            summary_file: default_summary_file(),
        }
    }
}

impl Default for LazySettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            lookahead: default_lookahead(),
        }
    }
}

fn default_frame_size() -> usize { crate::core::spectrogram::DEFAULT_FRAME_SIZE }
fn default_max_frames() -> usize { crate::core::spectrogram::DEFAULT_MAX_FRAMES }
fn default_width() -> usize { crate::core::waveform::DEFAULT_WIDTH }
fn default_audio_dir() -> PathBuf { BatchOptions::default().audio_dir }
fn default_vibration_dir() -> PathBuf { BatchOptions::default().vibration_dir }
fn default_output_dir() -> PathBuf { BatchOptions::default().output_dir }
fn default_progress_interval() -> usize { 50 }
fn default_yield_ms() -> u64 { 10 }
fn default_artifacts_file() -> String { BatchOptions::default().artifacts_file }
fn default_summary_file() -> String { BatchOptions::default().summary_file }
fn default_threshold() -> f32 { crate::core::lazy::DEFAULT_THRESHOLD }
fn default_lookahead() -> f32 { crate::core::lazy::DEFAULT_LOOKAHEAD }

impl VizConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VizError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VizError::Config(e.to_string()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Explicit path, else `./avrviz.toml`, else the user config directory.
    /// No file at all means defaults; an explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        for candidate in Self::search_paths() {
            if candidate.is_file() {
                return Self::load_from(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("avrviz").join("config.toml"));
        }
        paths
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.spectrogram;
        if s.frame_size < 2 || !s.frame_size.is_power_of_two() {
            return Err(VizError::Config(format!(
                "frame_size must be a power of two >= 2, got {}",
                s.frame_size
            )));
        }
        if s.hop_size == Some(0) {
            return Err(VizError::Config("hop_size must be positive".into()));
        }
        if s.max_frames == 0 {
            return Err(VizError::Config("max_frames must be positive".into()));
        }
        if self.waveform.width == 0 {
            return Err(VizError::Config("waveform width must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.lazy.threshold) {
            return Err(VizError::Config(format!(
                "visibility threshold must be in [0, 1], got {}",
                self.lazy.threshold
            )));
        }
        if self.lazy.lookahead < 0.0 {
            return Err(VizError::Config("lookahead must not be negative".into()));
        }
        Ok(())
    }

    pub fn spectrogram_config(&self) -> SpectrogramConfig {
        let s = &self.spectrogram;
        let mut config = SpectrogramConfig::with_frame_size(s.frame_size);
        if let Some(hop) = s.hop_size {
            config.hop_size = hop;
        }
        config.max_frames = s.max_frames;
        config.window = s.window;
        config.normalization = s.normalization;
        config
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            spectrogram: self.spectrogram_config(),
            waveform_width: self.waveform.width,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        let b = &self.batch;
        BatchOptions {
            audio_dir: b.audio_dir.clone(),
            vibration_dir: b.vibration_dir.clone(),
            output_dir: b.output_dir.clone(),
            progress_interval: b.progress_interval,
            yield_ms: b.yield_ms,
            artifacts_file: b.artifacts_file.clone(),
            summary_file: b.summary_file.clone(),
        }
    }

    pub fn visibility_policy(&self) -> VisibilityPolicy {
        VisibilityPolicy {
            threshold: self.lazy.threshold,
            lookahead: self.lazy.lookahead,
        }
    }
}

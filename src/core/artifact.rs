// src/core/artifact.rs
//
// Per-clip visualization artifacts and the batch summary record.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::spectrogram::Spectrogram;
use crate::error::Result;

/// Envelope, spectrogram and duration of one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationArtifact {
    pub clip_id: String,
    pub waveform: Vec<f32>,
    pub spectrogram: Spectrogram,
    /// Clip duration in seconds
    pub duration: f64,
}

/// Serialized form: `{ waveform, spectrogram: frames × bins, duration }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub waveform: Vec<f32>,
    pub spectrogram: Vec<Vec<f32>>,
    pub duration: f64,
}

impl From<&VisualizationArtifact> for ArtifactRecord {
    fn from(artifact: &VisualizationArtifact) -> Self {
        Self {
            waveform: artifact.waveform.clone(),
            spectrogram: artifact.spectrogram.frames.clone(),
            duration: artifact.duration,
        }
    }
}

/// Flat clip-id → record mapping, ordered by clip id.
pub type ArtifactMap = BTreeMap<String, ArtifactRecord>;

/// Aggregate counts written next to the artifact mapping.
///
/// Counts are per mapping entry: a clip id produced by several files is
/// counted once, under the collection of the file that owns the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_files: usize,
    pub audio_files: usize,
    pub vibration_files: usize,
    pub failed_files: usize,
    pub generated_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn new(audio_files: usize, vibration_files: usize, failed_files: usize) -> Self {
        Self {
            total_files: audio_files + vibration_files,
            audio_files,
            vibration_files,
            failed_files,
            generated_at: Utc::now(),
        }
    }
}

/// Write any serializable value as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn read_artifacts(path: &Path) -> Result<ArtifactMap> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn read_summary(path: &Path) -> Result<BatchSummary> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

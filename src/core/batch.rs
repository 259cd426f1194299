// src/core/batch.rs
//
// Offline artifact generation over the audio and vibration collections.
// Per-file failures are logged and skipped; the run always completes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use walkdir::WalkDir;

use super::artifact::{write_json, ArtifactMap, ArtifactRecord, BatchSummary};
use super::pipeline::ClipPipeline;
use crate::error::Result;

/// Which collection a clip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Audio,
    Vibration,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Audio => "audio",
            Collection::Vibration => "vibration",
        }
    }
}

/// One input file and the id its artifact is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipFile {
    pub path: PathBuf,
    /// File name without extension
    pub clip_id: String,
    pub collection: Collection,
}

/// Events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Input files enumerated.
    Started { total: usize },
    ClipDone {
        index: usize,
        total: usize,
        clip_id: String,
    },
    ClipFailed { clip_id: String, message: String },
    /// Emitted every `progress_interval` files.
    Progress { processed: usize, total: usize },
    /// Outputs written.
    Finished(BatchSummary),
}

/// Observer for batch progress. Implement this for progress bars, logging, etc.
pub trait BatchListener {
    fn on_event(&mut self, event: BatchEvent);
}

/// Ignores every event.
pub struct NoOpListener;

impl BatchListener for NoOpListener {
    #[inline(always)]
    fn on_event(&mut self, _event: BatchEvent) {}
}

/// Reports start, periodic progress and the final summary through `log`.
pub struct LogListener;

impl BatchListener for LogListener {
    fn on_event(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Started { total } => log::info!("Processing {} files", total),
            BatchEvent::Progress { processed, total } => {
                log::info!("Processed {}/{} files", processed, total)
            }
            BatchEvent::Finished(summary) => log::info!(
                "Done: {} audio, {} vibration, {} failed",
                summary.audio_files,
                summary.vibration_files,
                summary.failed_files
            ),
            BatchEvent::ClipDone { .. } | BatchEvent::ClipFailed { .. } => {}
        }
    }
}

/// Inputs, outputs and pacing of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub audio_dir: PathBuf,
    pub vibration_dir: PathBuf,
    pub output_dir: PathBuf,
    pub progress_interval: usize,
    /// Pause after each clip, in milliseconds
    pub yield_ms: u64,
    pub artifacts_file: String,
    pub summary_file: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("audio_vibration/audio"),
            vibration_dir: PathBuf::from("audio_vibration/vibration"),
            output_dir: PathBuf::from("public"),
            progress_interval: 50,
            yield_ms: 10,
            artifacts_file: "visualizations.json".to_string(),
            summary_file: "visualization-summary.json".to_string(),
        }
    }
}

impl BatchOptions {
    pub fn artifacts_path(&self) -> PathBuf {
        self.output_dir.join(&self.artifacts_file)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_file)
    }
}

/// Result of a run: the artifact mapping, summary and per-file failures.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub artifacts: ArtifactMap,
    pub summary: BatchSummary,
    /// (clip id, message) for every skipped file
    pub failures: Vec<(String, String)>,
}

pub struct BatchArtifactPipeline {
    pipeline: ClipPipeline,
    options: BatchOptions,
}

impl BatchArtifactPipeline {
    pub fn new(pipeline: ClipPipeline, options: BatchOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Audio clips first, then vibration clips, each sorted by file name.
    pub fn collect_files(&self) -> Vec<ClipFile> {
        let mut files = list_wav_files(&self.options.audio_dir, Collection::Audio);
        files.extend(list_wav_files(&self.options.vibration_dir, Collection::Vibration));
        files
    }

    /// Process every collected file and persist the mapping and summary.
    pub fn run(&self, listener: &mut impl BatchListener) -> Result<BatchReport> {
        let files = self.collect_files();
        let report = self.process(&files, listener);

        write_json(&report.artifacts, &self.options.artifacts_path())?;
        write_json(&report.summary, &self.options.summary_path())?;
        log::info!(
            "Wrote {} artifacts to {}",
            report.artifacts.len(),
            self.options.artifacts_path().display()
        );

        listener.on_event(BatchEvent::Finished(report.summary.clone()));
        Ok(report)
    }

    /// Process `files` in order without writing anything.
    pub fn process(&self, files: &[ClipFile], listener: &mut impl BatchListener) -> BatchReport {
        let total = files.len();
        listener.on_event(BatchEvent::Started { total });

        let mut artifacts = ArtifactMap::new();
        let mut failures = Vec::new();
        // Collection of the file each mapping entry came from
        let mut owners: HashMap<String, Collection> = HashMap::new();

        for (index, file) in files.iter().enumerate() {
            match self.process_file(file) {
                Ok(record) => {
                    if artifacts.insert(file.clip_id.clone(), record).is_some() {
                        log::warn!("Duplicate clip id {}, keeping {}", file.clip_id, file.path.display());
                    }
                    owners.insert(file.clip_id.clone(), file.collection);
                    listener.on_event(BatchEvent::ClipDone {
                        index,
                        total,
                        clip_id: file.clip_id.clone(),
                    });
                }
                Err(e) => {
                    log::warn!("Error processing {}: {}", file.path.display(), e);
                    let message = e.to_string();
                    failures.push((file.clip_id.clone(), message.clone()));
                    listener.on_event(BatchEvent::ClipFailed {
                        clip_id: file.clip_id.clone(),
                        message,
                    });
                }
            }

            let processed = index + 1;
            if self.options.progress_interval > 0 && processed % self.options.progress_interval == 0 {
                listener.on_event(BatchEvent::Progress { processed, total });
            }
            if self.options.yield_ms > 0 {
                thread::sleep(Duration::from_millis(self.options.yield_ms));
            }
        }

        let audio_files = owners.values().filter(|c| **c == Collection::Audio).count();
        let vibration_files = owners.len() - audio_files;
        let summary = BatchSummary::new(audio_files, vibration_files, failures.len());
        BatchReport {
            artifacts,
            summary,
            failures,
        }
    }

    fn process_file(&self, file: &ClipFile) -> Result<ArtifactRecord> {
        let bytes = std::fs::read(&file.path)?;
        let artifact = self.pipeline.process_bytes(&file.clip_id, &bytes)?;
        Ok(ArtifactRecord::from(&artifact))
    }
}

/// `.wav` files directly inside `dir`, sorted by name. A missing directory is empty.
pub fn list_wav_files(dir: &Path, collection: Collection) -> Vec<ClipFile> {
    if !dir.is_dir() {
        log::debug!("{} directory {} not found", collection.name(), dir.display());
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|entry| {
            let path = entry.path();
            let ext = path.extension()?.to_str()?.to_lowercase();
            if ext != "wav" {
                return None;
            }
            let clip_id = path.file_stem()?.to_str()?.to_string();
            Some(ClipFile {
                path: path.to_path_buf(),
                clip_id,
                collection,
            })
        })
        .collect()
}

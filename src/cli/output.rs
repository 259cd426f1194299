//! Output formatting for CLI results

use colorful::Colorful;
use serde::Serialize;
use std::path::Path;

use crate::core::artifact::{BatchSummary, VisualizationArtifact};
use crate::core::decoder::AudioClip;
use crate::core::dsp::stats::peak_amplitude;

/// Metadata and artifact shape of one decoded clip.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipInfo {
    pub file: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration: f64,
    pub frames: usize,
    /// Largest absolute sample value across all channels
    pub peak: f32,
    pub envelope_len: usize,
    pub spectrogram_frames: usize,
    pub spectrogram_bins: usize,
    pub min_db: f32,
    pub max_db: f32,
    /// Frequency of the loudest bin across all frames, in Hz
    pub dominant_frequency: Option<f32>,
}

impl ClipInfo {
    pub fn new(path: &Path, clip: &AudioClip, artifact: &VisualizationArtifact) -> Self {
        let spec = &artifact.spectrogram;
        let (min_db, max_db) = spec.value_range();

        // Loudest frame by raw peak, then its loudest bin
        let dominant_frequency = spec
            .frame_peaks
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .and_then(|(t, _)| spec.peak_bin(t))
            .map(|bin| spec.bin_frequency(bin));

        Self {
            file: path.display().to_string(),
            sample_rate: clip.sample_rate(),
            channels: clip.channel_count(),
            bits_per_sample: clip.bits_per_sample(),
            duration: clip.duration_secs(),
            frames: clip.frames(),
            peak: peak_amplitude(clip.samples()),
            envelope_len: artifact.waveform.len(),
            spectrogram_frames: spec.num_frames(),
            spectrogram_bins: spec.num_bins(),
            min_db,
            max_db,
            dominant_frequency,
        }
    }
}

pub fn print_clip_info(info: &ClipInfo) {
    println!("{}", info.file.clone().cyan());
    println!("  Sample Rate: {} Hz", info.sample_rate);
    println!("  Channels: {}", info.channels);
    println!("  Bit Depth: {} bit", info.bits_per_sample);
    println!("  Duration: {:.2}s ({} frames)", info.duration, info.frames);
    println!("  Peak: {:.3}", info.peak);
    println!("  Envelope: {} points", info.envelope_len);
    println!(
        "  Spectrogram: {} frames x {} bins, {:.1}..{:.1} dB",
        info.spectrogram_frames, info.spectrogram_bins, info.min_db, info.max_db
    );
    match info.dominant_frequency {
        Some(freq) => println!("  Dominant Frequency: {:.0} Hz", freq),
        None => println!("  Dominant Frequency: {}", "n/a (clip shorter than one frame)".yellow()),
    }
}

pub fn print_summary(summary: &BatchSummary, artifacts_path: &Path, summary_path: &Path) {
    println!();
    println!("{}", "Batch complete".green().bold());
    println!("  Audio clips:     {}", summary.audio_files);
    println!("  Vibration clips: {}", summary.vibration_files);
    println!("  Total:           {}", summary.total_files);
    if summary.failed_files > 0 {
        println!(
            "  Failed:          {}",
            summary.failed_files.to_string().red()
        );
    }
    println!("  Artifacts: {}", artifacts_path.display());
    println!("  Summary:   {}", summary_path.display());
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::VizConfig;
use crate::core::dsp::WindowType;
use crate::core::spectrogram::Normalization;

#[derive(Parser, Debug)]
#[command(name = "avrviz")]
#[command(version)]
#[command(about = "Waveform envelopes and spectrograms for audio/vibration clip collections")]
pub struct Cli {
    /// Configuration file (default: ./avrviz.toml, then the user config dir)
    #[arg(short, long, global = true, env = "AVRVIZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate artifacts for every clip in the audio and vibration directories
    Batch(BatchArgs),

    /// Decode one clip and print its metadata and artifact shape
    Inspect {
        file: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Print the full artifact as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write spectrogram (and optionally waveform) bitmaps for one clip
    Render(RenderArgs),
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    #[arg(long)]
    pub audio_dir: Option<PathBuf>,

    #[arg(long)]
    pub vibration_dir: Option<PathBuf>,

    /// Directory receiving the artifact mapping and summary
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Pause after each clip, in milliseconds
    #[arg(long)]
    pub yield_ms: Option<u64>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    pub file: PathBuf,

    /// Spectrogram PNG
    #[arg(short, long)]
    pub output: PathBuf,

    /// Waveform PNG
    #[arg(long)]
    pub waveform: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value = "800")]
    pub image_width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "256")]
    pub image_height: u32,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Overrides for the per-clip computation.
#[derive(Args, Debug, Default)]
pub struct PipelineArgs {
    /// FFT frame size (power of two)
    #[arg(long)]
    pub frame_size: Option<usize>,

    /// Window function: hann, hamming, blackman, rectangular
    #[arg(long, value_parser = parse_window)]
    pub window: Option<WindowType>,

    /// Spectrogram normalization: per_frame or global
    #[arg(long, value_parser = parse_normalization)]
    pub normalization: Option<Normalization>,

    /// Envelope width
    #[arg(long)]
    pub width: Option<usize>,
}

impl PipelineArgs {
    pub fn apply(&self, config: &mut VizConfig) {
        if let Some(frame_size) = self.frame_size {
            config.spectrogram.frame_size = frame_size;
            config.spectrogram.hop_size = None;
        }
        if let Some(window) = self.window {
            config.spectrogram.window = window;
        }
        if let Some(normalization) = self.normalization {
            config.spectrogram.normalization = normalization;
        }
        if let Some(width) = self.width {
            config.waveform.width = width;
        }
    }
}

impl BatchArgs {
    pub fn apply(&self, config: &mut VizConfig) {
        if let Some(dir) = &self.audio_dir {
            config.batch.audio_dir = dir.clone();
        }
        if let Some(dir) = &self.vibration_dir {
            config.batch.vibration_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.batch.output_dir = dir.clone();
        }
        if let Some(ms) = self.yield_ms {
            config.batch.yield_ms = ms;
        }
        self.pipeline.apply(config);
    }
}

fn parse_window(s: &str) -> Result<WindowType, String> {
    WindowType::from_name(s).ok_or_else(|| format!("Unknown window: {}", s))
}

fn parse_normalization(s: &str) -> Result<Normalization, String> {
    Normalization::from_name(s).ok_or_else(|| format!("Unknown normalization: {}", s))
}

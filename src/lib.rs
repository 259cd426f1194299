//! avrviz - Waveform envelopes and spectrograms for audio/vibration clips
//!
//! Turns 16-bit PCM WAV recordings into the two visual summaries a clip
//! browser needs: a fixed-width amplitude envelope and a short-time Fourier
//! spectrogram in dB. The same per-clip computation backs an offline batch
//! run over whole collections and on-demand loading for individual UI
//! elements.
//!
//! ## Features
//!
//! - **Chunk-scanning RIFF decoder**: locates `fmt ` and `data` by walking chunk headers
//! - **In-house radix-2 FFT**: iterative, in place, no planner
//! - **Configurable STFT**: frame size, hop, window kind, per-frame or global normalization
//! - **Batch generation**: JSON artifact mapping plus a summary record, per-file failure isolation
//! - **Lazy loading**: visibility-gated state machine with retry and cancellation
//! - **Shared cache**: at most one computation per (clip, configuration)
//!
//! ## Module Structure
//!
//! - `core` - Decoding, DSP, artifacts and orchestration
//! - `cli` - Command-line interface
//! - `config` - TOML configuration
//! - `error` - Library error type
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use avrviz::core::{ClipPipeline, PipelineConfig};
//!
//! let pipeline = ClipPipeline::new(PipelineConfig::default())?;
//! let artifact = pipeline.process_bytes("1-100-A-4", &bytes)?;
//!
//! println!("{} envelope points, {} frames", artifact.waveform.len(),
//!          artifact.spectrogram.num_frames());
//! ```
//!
//! ## Defaults
//!
//! | Setting        | Value      |
//! |----------------|------------|
//! | Frame size     | 512        |
//! | Hop size       | frame / 4  |
//! | Max frames     | 100        |
//! | Window         | Hann       |
//! | Normalization  | per frame  |
//! | Envelope width | 120        |

// Decoding, transform and orchestration
pub mod core;

// Command-line interface
pub mod cli;

// Configuration
pub mod config;

pub mod error;

pub use config::VizConfig;
pub use error::{Result, VizError};
pub use core::{
    AudioClip, ArtifactCache, BatchArtifactPipeline, ClipPipeline, LazyClip, LoadState,
    PipelineConfig, Spectrogram, SpectrogramConfig, VisualizationArtifact,
};

// src/core/spectrogram.rs
//
// Short-time Fourier transform with per-frame or clip-global dB scaling.
// One parameterized generator serves the batch pipeline and every on-demand
// caller.

use serde::{Deserialize, Serialize};

use super::dsp::fft::{fft_real, magnitudes};
use super::dsp::stats::{magnitudes_to_db, max_value};
use super::dsp::windows::{apply_window, create_window, WindowType};
use crate::error::{Result, VizError};

pub const DEFAULT_FRAME_SIZE: usize = 512;
pub const DEFAULT_MAX_FRAMES: usize = 100;

/// Reference used when converting magnitudes to dB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Each frame relative to its own peak.
    #[default]
    PerFrame,
    /// Every frame relative to the loudest bin of the clip.
    Global,
}

impl Normalization {
    pub fn name(&self) -> &'static str {
        match self {
            Normalization::PerFrame => "per_frame",
            Normalization::Global => "global",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('-', "_").as_str() {
            "per_frame" | "frame" => Some(Normalization::PerFrame),
            "global" | "clip" => Some(Normalization::Global),
            _ => None,
        }
    }
}

/// Spectrogram configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpectrogramConfig {
    pub frame_size: usize,
    pub hop_size: usize,
    pub max_frames: usize,
    pub window: WindowType,
    pub normalization: Normalization,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self::with_frame_size(DEFAULT_FRAME_SIZE)
    }
}

impl SpectrogramConfig {
    /// Defaults with the given frame size and a hop of a quarter frame.
    pub fn with_frame_size(frame_size: usize) -> Self {
        Self {
            frame_size,
            hop_size: (frame_size / 4).max(1),
            max_frames: DEFAULT_MAX_FRAMES,
            window: WindowType::Hann,
            normalization: Normalization::PerFrame,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_size == 0 || !self.frame_size.is_power_of_two() {
            return Err(VizError::InvalidLength(self.frame_size));
        }
        if self.hop_size == 0 {
            return Err(VizError::Config("hop size must be positive".into()));
        }
        Ok(())
    }

    /// Number of frames produced for `sample_count` samples:
    /// `min(max_frames, ⌊(sample_count − frame_size) / hop_size⌋)`, 0 for short clips.
    pub fn frame_count(&self, sample_count: usize) -> usize {
        if self.hop_size == 0 || sample_count < self.frame_size {
            return 0;
        }
        ((sample_count - self.frame_size) / self.hop_size).min(self.max_frames)
    }

    pub fn bins(&self) -> usize {
        self.frame_size / 2
    }
}

/// A time-ordered sequence of dB frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrogram {
    /// `frames[t][bin]`, each value ≥ 0
    pub frames: Vec<Vec<f32>>,
    pub frame_size: usize,
    pub hop_size: usize,
    pub sample_rate: u32,
    /// Un-normalized peak magnitude of every frame, for cross-frame loudness comparison
    pub frame_peaks: Vec<f32>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn num_bins(&self) -> usize {
        self.frame_size / 2
    }

    /// Global minimum and maximum across every frame, `(0, 0)` when empty.
    pub fn value_range(&self) -> (f32, f32) {
        super::dsp::stats::min_max(self.frames.iter().flatten())
    }

    /// Center frequency of a bin in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.frame_size as f32
    }

    /// Bin with the largest value in frame `t`.
    pub fn peak_bin(&self, t: usize) -> Option<usize> {
        let frame = self.frames.get(t)?;
        frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }
}

/// Precomputes the window once and reuses it for every frame of a clip.
#[derive(Debug, Clone)]
pub struct SpectrogramGenerator {
    config: SpectrogramConfig,
    window: Vec<f32>,
}

impl SpectrogramGenerator {
    pub fn new(config: SpectrogramConfig) -> Result<Self> {
        config.validate()?;
        let window = create_window(config.frame_size, config.window);
        Ok(Self { config, window })
    }

    pub fn config(&self) -> &SpectrogramConfig {
        &self.config
    }

    /// Linear magnitudes of the positive-frequency bins of frame `index`.
    pub fn frame_magnitudes(&self, samples: &[f32], index: usize) -> Result<Vec<f32>> {
        let size = self.config.frame_size;
        let start = index * self.config.hop_size;

        // Zero-pad when the clip ends mid-frame.
        let mut frame = vec![0.0f32; size];
        if start < samples.len() {
            let end = (start + size).min(samples.len());
            frame[..end - start].copy_from_slice(&samples[start..end]);
        }
        apply_window(&mut frame, &self.window);

        let spectrum = fft_real(&frame)?;
        Ok(magnitudes(&spectrum, self.config.bins()))
    }

    /// Compute the full spectrogram for one channel.
    pub fn compute(&self, samples: &[f32], sample_rate: u32) -> Result<Spectrogram> {
        let count = self.config.frame_count(samples.len());

        let mut linear = Vec::with_capacity(count);
        for index in 0..count {
            linear.push(self.frame_magnitudes(samples, index)?);
        }
        let frame_peaks: Vec<f32> = linear.iter().map(|m| max_value(m)).collect();

        let frames = match self.config.normalization {
            Normalization::PerFrame => linear
                .iter()
                .zip(&frame_peaks)
                .map(|(mags, &peak)| magnitudes_to_db(mags, peak))
                .collect(),
            Normalization::Global => {
                let global_peak = max_value(&frame_peaks);
                linear
                    .iter()
                    .map(|mags| magnitudes_to_db(mags, global_peak))
                    .collect()
            }
        };

        Ok(Spectrogram {
            frames,
            frame_size: self.config.frame_size,
            hop_size: self.config.hop_size,
            sample_rate,
            frame_peaks,
        })
    }
}

/// One-shot helper with a throwaway generator.
pub fn compute_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    config: &SpectrogramConfig,
) -> Result<Spectrogram> {
    SpectrogramGenerator::new(config.clone())?.compute(samples, sample_rate)
}

// src/core/pipeline.rs
//
// The per-clip computation shared by the batch and lazy paths:
// decode → window → transform → magnitude → scale, plus the envelope.

use serde::{Deserialize, Serialize};

use super::artifact::VisualizationArtifact;
use super::decoder::{decode_wav, AudioClip};
use super::spectrogram::{SpectrogramConfig, SpectrogramGenerator};
use super::waveform::{downsample, DEFAULT_WIDTH};
use crate::error::{Result, VizError};

/// Everything that shapes a clip's artifact. Part of the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub spectrogram: SpectrogramConfig,
    pub waveform_width: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            spectrogram: SpectrogramConfig::default(),
            waveform_width: DEFAULT_WIDTH,
        }
    }
}

impl PipelineConfig {
    /// Stable digest of the configuration.
    pub fn fingerprint(&self) -> String {
        let s = &self.spectrogram;
        let canonical = format!(
            "frame={};hop={};max={};window={};norm={};width={}",
            s.frame_size,
            s.hop_size,
            s.max_frames,
            s.window.name(),
            s.normalization.name(),
            self.waveform_width
        );
        format!("{:x}", md5::compute(canonical.as_bytes()))
    }
}

/// Synchronous decode + compute for one clip at a time.
#[derive(Debug, Clone)]
pub struct ClipPipeline {
    config: PipelineConfig,
    generator: SpectrogramGenerator,
}

impl ClipPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        if config.waveform_width == 0 {
            return Err(VizError::Config("waveform width must be positive".into()));
        }
        let generator = SpectrogramGenerator::new(config.spectrogram.clone())?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Envelope and spectrogram of the clip's first channel.
    pub fn compute(&self, clip_id: &str, clip: &AudioClip) -> Result<VisualizationArtifact> {
        let samples = clip.primary_channel();
        let waveform = downsample(&samples, self.config.waveform_width);
        let spectrogram = self.generator.compute(&samples, clip.sample_rate())?;

        Ok(VisualizationArtifact {
            clip_id: clip_id.to_string(),
            waveform,
            spectrogram,
            duration: clip.duration_secs(),
        })
    }

    /// Decode raw container bytes, then compute.
    pub fn process_bytes(&self, clip_id: &str, bytes: &[u8]) -> Result<VisualizationArtifact> {
        let clip = decode_wav(bytes)?;
        self.compute(clip_id, &clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decoder::tests::wav_bytes;
    use crate::core::spectrogram::Normalization;

    #[test]
    fn test_process_bytes() {
        let samples: Vec<i16> = (0..8000).map(|i| ((i % 100) as i16 - 50) * 200).collect();
        let bytes = wav_bytes(&samples, 8000, 1);
        let pipeline = ClipPipeline::new(PipelineConfig::default()).unwrap();
        let artifact = pipeline.process_bytes("clip", &bytes).unwrap();
        assert_eq!(artifact.clip_id, "clip");
        assert!((artifact.duration - 1.0).abs() < 1e-9);
        assert_eq!(artifact.waveform.len(), 8000usize.div_ceil(8000 / 120));
        assert_eq!(artifact.spectrogram.num_frames(), (8000 - 512) / 128);
    }

    #[test]
    fn test_stereo_uses_first_channel() {
        // left silent, right loud
        let samples: Vec<i16> = (0..2000).flat_map(|_| [0i16, 20000]).collect();
        let bytes = wav_bytes(&samples, 8000, 2);
        let pipeline = ClipPipeline::new(PipelineConfig::default()).unwrap();
        let artifact = pipeline.process_bytes("stereo", &bytes).unwrap();
        assert!(artifact.waveform.iter().all(|&v| v == 0.0));
        assert!((artifact.duration - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_fingerprint_tracks_config() {
        let a = PipelineConfig::default();
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.spectrogram.normalization = Normalization::Global;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 32);
    }

    #[test]
    fn test_rejects_zero_width() {
        let config = PipelineConfig {
            waveform_width: 0,
            ..Default::default()
        };
        assert!(matches!(ClipPipeline::new(config), Err(VizError::Config(_))));
    }
}

// src/core/waveform.rs
//
// Fixed-width amplitude envelope for compact waveform rendering.

use super::dsp::stats::max_value;

pub const DEFAULT_WIDTH: usize = 120;

/// Samples averaged into each envelope point: `max(1, ⌊sample_count / width⌋)`.
pub fn downsample_factor(sample_count: usize, width: usize) -> usize {
    if width == 0 {
        return sample_count.max(1);
    }
    (sample_count / width).max(1)
}

/// Mean absolute amplitude per block, peak-normalized to [0, 1].
///
/// Output length is `⌈sample_count / factor⌉`; the last block may hold fewer
/// samples. A silent clip yields all zeros.
pub fn downsample(samples: &[f32], width: usize) -> Vec<f32> {
    let factor = downsample_factor(samples.len(), width);

    let averages: Vec<f32> = samples
        .chunks(factor)
        .map(|block| block.iter().map(|s| s.abs()).sum::<f32>() / block.len() as f32)
        .collect();

    let peak = max_value(&averages);
    if peak <= 0.0 {
        return vec![0.0; averages.len()];
    }
    averages.iter().map(|&a| a / peak).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor() {
        assert_eq!(downsample_factor(12000, 120), 100);
        assert_eq!(downsample_factor(50, 120), 1);
        assert_eq!(downsample_factor(0, 120), 1);
    }

    #[test]
    fn test_length_and_range() {
        let samples: Vec<f32> = (0..12_345).map(|i| ((i as f32) * 0.01).sin()).collect();
        let env = downsample(&samples, 120);
        let factor = downsample_factor(samples.len(), 120);
        assert_eq!(env.len(), samples.len().div_ceil(factor));
        assert!(env.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(env.iter().any(|&v| v == 1.0));
    }

    #[test]
    fn test_tail_block_averages_fewer_samples() {
        // factor = 2 for 5 samples at width 2 → blocks [1,1], [0.5,0.5], [1]
        let env = downsample(&[1.0, -1.0, 0.5, -0.5, 1.0], 2);
        assert_eq!(env, vec![1.0, 0.5, 1.0]);
    }

    #[test]
    fn test_silence() {
        let env = downsample(&vec![0.0; 1000], 120);
        assert_eq!(env.len(), 1000usize.div_ceil(8));
        assert!(env.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_clip() {
        assert!(downsample(&[], 120).is_empty());
    }
}

//! Iterative radix-2 decimation-in-time FFT
//!
//! Output is an interleaved complex buffer `[re0, im0, re1, im1, ...]` of
//! length `2n`. No planner state is kept between calls.

use std::f64::consts::PI;

use crate::error::{Result, VizError};

/// Transform a real-valued frame whose length is a power of two.
pub fn fft_real(frame: &[f32]) -> Result<Vec<f32>> {
    let n = frame.len();
    if n == 0 || !n.is_power_of_two() {
        return Err(VizError::InvalidLength(n));
    }

    let mut buffer = vec![0.0f32; 2 * n];
    let bits = n.trailing_zeros();

    // Bit-reversal permutation into the interleaved buffer; imaginary parts stay zero.
    for (i, &sample) in frame.iter().enumerate() {
        let j = reverse_bits(i, bits);
        buffer[2 * j] = sample;
    }

    let mut step = 2;
    while step <= n {
        let half = step / 2;
        for start in (0..n).step_by(step) {
            for k in 0..half {
                let angle = -PI * k as f64 / half as f64;
                let (w_re, w_im) = (angle.cos() as f32, angle.sin() as f32);

                let even = start + k;
                let odd = even + half;
                let (o_re, o_im) = (buffer[2 * odd], buffer[2 * odd + 1]);
                let t_re = w_re * o_re - w_im * o_im;
                let t_im = w_re * o_im + w_im * o_re;

                let (e_re, e_im) = (buffer[2 * even], buffer[2 * even + 1]);
                buffer[2 * even] = e_re + t_re;
                buffer[2 * even + 1] = e_im + t_im;
                buffer[2 * odd] = e_re - t_re;
                buffer[2 * odd + 1] = e_im - t_im;
            }
        }
        step *= 2;
    }

    Ok(buffer)
}

/// Magnitudes `sqrt(re² + im²)` of the first `bins` entries of an interleaved buffer.
pub fn magnitudes(interleaved: &[f32], bins: usize) -> Vec<f32> {
    interleaved
        .chunks_exact(2)
        .take(bins)
        .map(|c| (c[0] * c[0] + c[1] * c[1]).sqrt())
        .collect()
}

fn reverse_bits(mut index: usize, bits: u32) -> usize {
    let mut reversed = 0;
    for _ in 0..bits {
        reversed = (reversed << 1) | (index & 1);
        index >>= 1;
    }
    reversed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(matches!(fft_real(&[0.0; 6]), Err(VizError::InvalidLength(6))));
        assert!(matches!(fft_real(&[]), Err(VizError::InvalidLength(0))));
        assert!(matches!(fft_real(&[0.0; 511]), Err(VizError::InvalidLength(511))));
    }

    #[test]
    fn test_single_sample() {
        let out = fft_real(&[0.75]).unwrap();
        assert_eq!(out, vec![0.75, 0.0]);
    }

    #[test]
    fn test_impulse_is_flat() {
        let mut frame = vec![0.0f32; 64];
        frame[0] = 1.0;
        let out = fft_real(&frame).unwrap();
        assert_eq!(out.len(), 128);
        for mag in magnitudes(&out, 64) {
            assert!((mag - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_dc_concentrates_in_bin_zero() {
        let frame = vec![1.0f32; 16];
        let mags = magnitudes(&fft_real(&frame).unwrap(), 16);
        assert!((mags[0] - 16.0).abs() < 1e-4);
        assert!(mags[1..].iter().all(|&m| m < 1e-4));
    }

    #[test]
    fn test_cosine_lands_in_its_bin() {
        let n = 32;
        let frame: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 4.0 * i as f32 / n as f32).cos())
            .collect();
        let out = fft_real(&frame).unwrap();
        // cos at bin 4 → re = n/2 at bins 4 and n-4
        assert!((out[2 * 4] - 16.0).abs() < 1e-3);
        assert!((out[2 * (n - 4)] - 16.0).abs() < 1e-3);
        assert!(out[2 * 4 + 1].abs() < 1e-3);
    }

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(1, 3), 4);
        assert_eq!(reverse_bits(3, 3), 6);
        assert_eq!(reverse_bits(0, 0), 0);
    }
}

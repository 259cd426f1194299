//! Peak and level helpers shared by the waveform and spectrogram stages

/// Offset added before the logarithm so a zero bin stays finite.
pub const LOG_EPSILON: f32 = 1e-10;

/// dB offset applied after `20·log10`, placing a unit-normalized peak at +60.
pub const DB_OFFSET: f32 = 60.0;

/// Compute peak amplitude
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Largest value in a slice of non-negative values, 0 when empty.
pub fn max_value(values: &[f32]) -> f32 {
    values.iter().copied().fold(0.0f32, f32::max)
}

/// Minimum and maximum of a slice, `(0, 0)` when empty.
pub fn min_max<'a, I>(values: I) -> (f32, f32)
where
    I: IntoIterator<Item = &'a f32>,
{
    let mut iter = values.into_iter();
    let Some(&first) = iter.next() else {
        return (0.0, 0.0);
    };
    iter.fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Map a magnitude already divided by its reference peak to the clamped dB scale:
/// `max(0, 20·log10(normalized + 1e-10) + 60)`.
pub fn normalized_to_db(normalized: f32) -> f32 {
    (20.0 * (normalized + LOG_EPSILON).log10() + DB_OFFSET).max(0.0)
}

/// Scale `magnitudes` against `reference`; a non-positive reference yields all zeros.
pub fn magnitudes_to_db(magnitudes: &[f32], reference: f32) -> Vec<f32> {
    if reference <= 0.0 {
        return vec![0.0; magnitudes.len()];
    }
    magnitudes
        .iter()
        .map(|&m| normalized_to_db(m / reference))
        .collect()
}

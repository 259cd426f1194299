//! Window function implementations

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Window function types. All are symmetric (denominator `size - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    #[default]
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl WindowType {
    pub fn name(&self) -> &'static str {
        match self {
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::Rectangular => "rectangular",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Some(WindowType::Hann),
            "hamming" => Some(WindowType::Hamming),
            "blackman" => Some(WindowType::Blackman),
            "rectangular" | "rect" | "none" => Some(WindowType::Rectangular),
            _ => None,
        }
    }
}

/// Create window function
pub fn create_window(size: usize, window_type: WindowType) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f32;
    (0..size)
        .map(|i| {
            let x = i as f32 / denom;
            match window_type {
                WindowType::Hann => 0.5 * (1.0 - (2.0 * PI * x).cos()),
                WindowType::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
                WindowType::Blackman => {
                    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                }
                WindowType::Rectangular => 1.0,
            }
        })
        .collect()
}

/// Hann window of length `size`: `0.5 × (1 − cos(2π·i/(size−1)))`.
pub fn hann_window(size: usize) -> Vec<f32> {
    create_window(size, WindowType::Hann)
}

/// Multiply `frame` elementwise by `window` in place.
pub fn apply_window(frame: &mut [f32], window: &[f32]) {
    frame
        .iter_mut()
        .zip(window.iter())
        .for_each(|(x, w)| *x *= w);
}

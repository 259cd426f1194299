//! Digital Signal Processing utilities
//!
//! The transform is planner-free: frames are a fixed
//! power-of-two size and every call is a pure function of its input.

pub mod fft;
pub mod stats;
pub mod windows;

pub use fft::{fft_real, magnitudes};
pub use windows::{apply_window, create_window, hann_window, WindowType};

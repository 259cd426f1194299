//! Visualization tools for audio analysis
//!
//! Color mapping and bitmap rendering of spectrograms and waveform
//! envelopes.

pub mod colormap;
pub mod render;

pub use colormap::{map_color, normalized_color};
pub use render::{
    draw_spectrogram, draw_waveform, render_spectrogram, render_waveform, save_png, Surface,
};

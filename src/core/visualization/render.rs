// src/core/visualization/render.rs
//
// Bitmap rendering of spectrograms and envelopes through discrete
// filled-rectangle draw calls.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use super::colormap::map_color;
use crate::core::spectrogram::Spectrogram;
use crate::error::Result;

const BACKGROUND: Rgb<u8> = Rgb([12, 12, 20]);
const WAVEFORM_COLOR: Rgb<u8> = Rgb([90, 170, 255]);

/// A 2D surface that accepts filled rectangles.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>);
}

impl Surface for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let (img_w, img_h) = self.dimensions();
        let x_end = x.saturating_add(w).min(img_w);
        let y_end = y.saturating_add(h).min(img_h);
        for py in y.min(img_h)..y_end {
            for px in x.min(img_w)..x_end {
                self.put_pixel(px, py, color);
            }
        }
    }
}

/// Draw every frame×bin cell, low frequencies at the bottom, colored against
/// the spectrogram's global min/max.
pub fn draw_spectrogram<S: Surface>(surface: &mut S, spec: &Spectrogram) {
    let (width, height) = (surface.width(), surface.height());
    surface.fill_rect(0, 0, width, height, BACKGROUND);

    let frames = spec.num_frames();
    let bins = spec.num_bins();
    if frames == 0 || bins == 0 || width == 0 || height == 0 {
        return;
    }

    let (min, max) = spec.value_range();

    for (t, frame) in spec.frames.iter().enumerate() {
        let x0 = edge(t, frames, width);
        let x1 = edge(t + 1, frames, width);
        for (bin, &value) in frame.iter().enumerate() {
            // Flip Y for display (low frequencies at bottom)
            let y0 = height - edge(bin + 1, bins, height);
            let y1 = height - edge(bin, bins, height);
            if x1 > x0 && y1 > y0 {
                surface.fill_rect(x0, y0, x1 - x0, y1 - y0, map_color(value, min, max));
            }
        }
    }
}

/// Draw an envelope as vertical bars centred on the horizontal midline.
pub fn draw_waveform<S: Surface>(surface: &mut S, envelope: &[f32]) {
    let (width, height) = (surface.width(), surface.height());
    surface.fill_rect(0, 0, width, height, BACKGROUND);
    if envelope.is_empty() || width == 0 || height == 0 {
        return;
    }

    let mid = height / 2;
    for (i, &value) in envelope.iter().enumerate() {
        let x0 = edge(i, envelope.len(), width);
        let x1 = edge(i + 1, envelope.len(), width);
        let half = ((value.clamp(0.0, 1.0) * height as f32) / 2.0).round() as u32;
        let bar = (half * 2).max(1);
        if x1 > x0 {
            surface.fill_rect(x0, mid.saturating_sub(half), x1 - x0, bar, WAVEFORM_COLOR);
        }
    }
}

/// Render a spectrogram into a new image.
pub fn render_spectrogram(spec: &Spectrogram, width: u32, height: u32) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(width, height);
    draw_spectrogram(&mut img, spec);
    img
}

/// Render an envelope into a new image.
pub fn render_waveform(envelope: &[f32], width: u32, height: u32) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(width, height);
    draw_waveform(&mut img, envelope);
    img
}

/// Save a rendered image, creating parent directories as needed.
pub fn save_png(img: &RgbImage, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    img.save(output_path)?;
    Ok(())
}

/// Pixel edge of cell `i` when `count` cells span `extent` pixels.
fn edge(i: usize, count: usize, extent: u32) -> u32 {
    ((i as u64 * extent as u64) / count as u64) as u32
}

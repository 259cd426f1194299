//! Scalar → RGB mapping used when shading spectrogram cells
//!
//! Five linear segments over the normalized range:
//! dark blue → light blue → green → yellow → orange → red.

use image::Rgb;

/// Segment endpoints, evenly spaced over [0, 1].
const STOPS: [[f32; 3]; 6] = [
    [0.0, 0.0, 139.0],   // dark blue
    [0.0, 170.0, 255.0], // light blue
    [0.0, 200.0, 0.0],   // green
    [255.0, 255.0, 0.0], // yellow
    [255.0, 140.0, 0.0], // orange
    [220.0, 0.0, 0.0],   // red
];

/// Map `value` to a color given the global `min`/`max` of the data it belongs to.
///
/// Values outside the range are clamped; a flat range maps everything to the
/// first stop.
pub fn map_color(value: f32, min: f32, max: f32) -> Rgb<u8> {
    let range = max - min;
    let t = if range > 0.0 && value.is_finite() {
        ((value - min) / range).clamp(0.0, 1.0)
    } else {
        0.0
    };
    normalized_color(t)
}

/// Color for an already-normalized position in [0, 1].
pub fn normalized_color(t: f32) -> Rgb<u8> {
    let segments = (STOPS.len() - 1) as f32;
    let scaled = t.clamp(0.0, 1.0) * segments;
    let index = (scaled.floor() as usize).min(STOPS.len() - 2);
    let frac = scaled - index as f32;

    let (from, to) = (STOPS[index], STOPS[index + 1]);
    let lerp = |c: usize| (from[c] + (to[c] - from[c]) * frac).round() as u8;
    Rgb([lerp(0), lerp(1), lerp(2)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(map_color(0.0, 0.0, 60.0), Rgb([0, 0, 139]));
        assert_eq!(map_color(60.0, 0.0, 60.0), Rgb([220, 0, 0]));
    }

    #[test]
    fn test_segment_boundaries() {
        assert_eq!(normalized_color(0.2), Rgb([0, 170, 255]));
        assert_eq!(normalized_color(0.4), Rgb([0, 200, 0]));
        assert_eq!(normalized_color(0.6), Rgb([255, 255, 0]));
        assert_eq!(normalized_color(0.8), Rgb([255, 140, 0]));
    }

    #[test]
    fn test_midpoint_of_first_segment() {
        // halfway between dark blue and light blue
        assert_eq!(normalized_color(0.1), Rgb([0, 85, 197]));
    }

    #[test]
    fn test_clamping_and_flat_range() {
        assert_eq!(map_color(-10.0, 0.0, 1.0), normalized_color(0.0));
        assert_eq!(map_color(10.0, 0.0, 1.0), normalized_color(1.0));
        assert_eq!(map_color(5.0, 5.0, 5.0), normalized_color(0.0));
        assert_eq!(map_color(f32::NAN, 0.0, 1.0), normalized_color(0.0));
    }
}

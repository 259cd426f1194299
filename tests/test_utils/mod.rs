// tests/test_utils/mod.rs
//
// Shared fixtures: synthetic WAV clips written with hound and unique
// scratch directories.

#![allow(dead_code)]

use std::f32::consts::PI;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use uuid::Uuid;

pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_avrviz"))
}

pub fn run_avrviz<I, S>(args: I) -> std::process::Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(get_binary_path())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute avrviz")
}

/// Fresh directory under the system temp dir, removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("avrviz-{}-{}", prefix, Uuid::new_v4()));
        fs::create_dir_all(&path).expect("Failed to create scratch dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn spec(sample_rate: u32, channels: u16) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode interleaved 16-bit samples as an in-memory WAV file.
pub fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec(sample_rate, channels))
            .expect("Failed to create WAV writer");
        for &s in samples {
            writer.write_sample(s).expect("Failed to write sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
    }
    cursor.into_inner()
}

pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture dir");
    }
    let mut writer = hound::WavWriter::create(path, spec(sample_rate, channels))
        .expect("Failed to create WAV file");
    for &s in samples {
        writer.write_sample(s).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

pub fn tone_samples(freq: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            ((2.0 * PI * freq * t).sin() * amplitude * i16::MAX as f32) as i16
        })
        .collect()
}

pub fn impulse_samples(len: usize, at: usize) -> Vec<i16> {
    let mut samples = vec![0i16; len];
    if at < len {
        samples[at] = i16::MAX;
    }
    samples
}

pub fn write_tone(path: &Path, freq: f32, sample_rate: u32, len: usize) {
    write_wav(path, &tone_samples(freq, sample_rate, len, 0.5), sample_rate, 1);
}

pub fn write_silence(path: &Path, sample_rate: u32, len: usize) {
    write_wav(path, &vec![0i16; len], sample_rate, 1);
}

/// Offset of the `data` chunk header and its declared body size.
pub fn find_data_chunk(bytes: &[u8]) -> Option<(usize, usize)> {
    let offset = bytes[12..].windows(4).position(|w| w == b"data")? + 12;
    let size = u32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().ok()?) as usize;
    Some((offset, size))
}

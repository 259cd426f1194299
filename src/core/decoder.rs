// src/core/decoder.rs
//
// Linear-PCM RIFF/WAVE decoding. Every sub-chunk (format and data) is found
// by walking chunk headers from offset 12; no fixed offsets are assumed.

use std::fs;
use std::path::Path;

use crate::error::{Result, VizError};

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WAVE_FORM: &[u8; 4] = b"WAVE";
const FMT_ID: &[u8; 4] = b"fmt ";
const DATA_ID: &[u8; 4] = b"data";
const CHUNK_HEADER_LEN: usize = 8;
const FIRST_CHUNK_OFFSET: usize = 12;

const FORMAT_PCM: u16 = 1;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;
const SUPPORTED_BITS: u16 = 16;

/// Scale applied to signed 16-bit samples.
const PCM16_SCALE: f32 = 32768.0;

/// Decoded audio and its format metadata. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Interleaved samples normalized to [-1.0, 1.0]
    samples: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Number of interleaved channels
    channels: u16,
    /// Bits per sample from the format chunk
    bits_per_sample: u16,
}

impl AudioClip {
    /// Build a clip from already-normalized interleaved samples.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(VizError::format("sample rate must be positive"));
        }
        if channels == 0 {
            return Err(VizError::format("channel count must be at least 1"));
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
            bits_per_sample: SUPPORTED_BITS,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channels
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// All decoded samples, interleaved.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// De-interleave one channel. Out-of-range indices yield an empty buffer.
    pub fn channel(&self, index: usize) -> Vec<f32> {
        let stride = self.channels as usize;
        if index >= stride {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(index)
            .step_by(stride)
            .copied()
            .collect()
    }

    /// The channel consumed by the envelope and spectrogram stages.
    pub fn primary_channel(&self) -> Vec<f32> {
        if self.channels == 1 {
            self.samples.clone()
        } else {
            self.channel(0)
        }
    }
}

/// Format fields read from the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PcmFormat {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// One chunk header found while scanning the container body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkRef {
    id: [u8; 4],
    /// Offset of the chunk body
    offset: usize,
    /// Declared body size, clamped to the bytes actually present
    len: usize,
}

/// Decode a RIFF/WAVE buffer holding 16-bit linear PCM.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioClip> {
    if bytes.len() < 4 || &bytes[0..4] != RIFF_MAGIC {
        return Err(VizError::format("missing RIFF magic"));
    }
    if bytes.len() < FIRST_CHUNK_OFFSET || &bytes[8..12] != WAVE_FORM {
        return Err(VizError::format("RIFF form type is not WAVE"));
    }

    let mut format: Option<PcmFormat> = None;
    let mut data: Option<ChunkRef> = None;

    for chunk in ChunkIter::new(bytes) {
        let chunk = chunk?;
        match &chunk.id {
            id if id == FMT_ID => {
                format = Some(parse_format(&bytes[chunk.offset..chunk.offset + chunk.len])?);
            }
            id if id == DATA_ID => {
                data = Some(chunk);
                break;
            }
            _ => {}
        }
    }

    let format = format.ok_or_else(|| VizError::format("no fmt chunk before data"))?;
    let data = data.ok_or_else(|| VizError::format("no data chunk"))?;
    validate_format(&format)?;

    let payload = &bytes[data.offset..data.offset + data.len];
    let samples = pcm16_to_f32(payload);

    log::debug!(
        "Decoded {} samples: {} Hz, {} ch, {} bit",
        samples.len(),
        format.sample_rate,
        format.channels,
        format.bits_per_sample
    );

    Ok(AudioClip {
        samples,
        sample_rate: format.sample_rate,
        channels: format.channels,
        bits_per_sample: format.bits_per_sample,
    })
}

/// Read a file from disk and decode it.
pub fn decode_file(path: &Path) -> Result<AudioClip> {
    let bytes = fs::read(path)?;
    decode_wav(&bytes)
}

/// Walks chunk headers sequentially from offset 12, advancing by each
/// declared size. Headers are read on demand, so bytes after the chunk the
/// caller stops at are never inspected.
struct ChunkIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> ChunkIter<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: FIRST_CHUNK_OFFSET,
            done: false,
        }
    }
}

impl Iterator for ChunkIter<'_> {
    type Item = Result<ChunkRef>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.bytes.len() {
            return None;
        }
        let pos = self.pos;
        if pos + CHUNK_HEADER_LEN > self.bytes.len() {
            self.done = true;
            return Some(Err(VizError::format(format!(
                "truncated chunk header at offset {}",
                pos
            ))));
        }
        let id = [
            self.bytes[pos],
            self.bytes[pos + 1],
            self.bytes[pos + 2],
            self.bytes[pos + 3],
        ];
        let declared = read_u32(self.bytes, pos + 4) as usize;
        let offset = pos + CHUNK_HEADER_LEN;
        let available = self.bytes.len() - offset;
        let len = declared.min(available);

        if declared > available {
            // Truncated recording: nothing can follow this chunk.
            self.done = true;
        } else {
            // RIFF chunks are word-aligned.
            self.pos = offset + declared + (declared & 1);
        }
        Some(Ok(ChunkRef { id, offset, len }))
    }
}

fn parse_format(body: &[u8]) -> Result<PcmFormat> {
    if body.len() < 16 {
        return Err(VizError::format(format!(
            "fmt chunk too short: {} bytes",
            body.len()
        )));
    }
    Ok(PcmFormat {
        format_tag: read_u16(body, 0),
        channels: read_u16(body, 2),
        sample_rate: read_u32(body, 4),
        bits_per_sample: read_u16(body, 14),
    })
}

fn validate_format(format: &PcmFormat) -> Result<()> {
    if format.format_tag != FORMAT_PCM && format.format_tag != FORMAT_EXTENSIBLE {
        return Err(VizError::format(format!(
            "unsupported format tag {:#06x} (linear PCM only)",
            format.format_tag
        )));
    }
    if format.channels == 0 {
        return Err(VizError::format("fmt chunk reports 0 channels"));
    }
    if format.sample_rate == 0 {
        return Err(VizError::format("fmt chunk reports 0 Hz sample rate"));
    }
    if format.bits_per_sample != SUPPORTED_BITS {
        return Err(VizError::format(format!(
            "unsupported bit depth {} (16-bit only)",
            format.bits_per_sample
        )));
    }
    Ok(())
}

fn pcm16_to_f32(payload: &[u8]) -> Vec<f32> {
    payload
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / PCM16_SCALE)
        .collect()
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal canonical WAV writer for unit tests.
    pub(crate) fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        wav_bytes_with_extra(samples, sample_rate, channels, &[])
    }

    /// Same, with arbitrary chunks inserted between `fmt ` and `data`.
    pub(crate) fn wav_bytes_with_extra(
        samples: &[i16],
        sample_rate: u32,
        channels: u16,
        extra: &[(&[u8; 4], &[u8])],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(WAVE_FORM);

        body.extend_from_slice(FMT_ID);
        body.extend_from_slice(&16u32.to_le_bytes());
        body.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        body.extend_from_slice(&channels.to_le_bytes());
        body.extend_from_slice(&sample_rate.to_le_bytes());
        let block_align = channels * 2;
        body.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&16u16.to_le_bytes());

        for (id, payload) in extra {
            body.extend_from_slice(*id);
            body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            body.extend_from_slice(payload);
            if payload.len() % 2 == 1 {
                body.push(0);
            }
        }

        body.extend_from_slice(DATA_ID);
        body.extend_from_slice(&((samples.len() * 2) as u32).to_le_bytes());
        for s in samples {
            body.extend_from_slice(&s.to_le_bytes());
        }

        let mut out = Vec::with_capacity(body.len() + 8);
        out.extend_from_slice(RIFF_MAGIC);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_decode_canonical() {
        let bytes = wav_bytes(&[0, 16384, -32768, 32767], 8000, 1);
        let clip = decode_wav(&bytes).unwrap();
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.channel_count(), 1);
        assert_eq!(clip.samples(), &[0.0, 0.5, -1.0, 32767.0 / 32768.0]);
        assert!((clip.duration_secs() - 4.0 / 8000.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = wav_bytes(&[1, 2, 3], 8000, 1);
        bytes[0..4].copy_from_slice(b"RIFX");
        assert!(matches!(decode_wav(&bytes), Err(VizError::Format(_))));
        assert!(matches!(decode_wav(b"RI"), Err(VizError::Format(_))));
    }

    #[test]
    fn test_rejects_non_wave_form() {
        let mut bytes = wav_bytes(&[1, 2, 3], 8000, 1);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(decode_wav(&bytes), Err(VizError::Format(_))));
    }

    #[test]
    fn test_scans_past_extra_chunks() {
        // LIST chunk with odd length exercises the pad byte.
        let bytes = wav_bytes_with_extra(
            &[100, -100],
            22050,
            1,
            &[(b"LIST", b"INFOabc"), (b"fact", &[0, 0, 0, 0])],
        );
        let clip = decode_wav(&bytes).unwrap();
        assert_eq!(clip.sample_rate(), 22050);
        assert_eq!(clip.samples().len(), 2);
        assert!((clip.samples()[0] - 100.0 / 32768.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_data_chunk() {
        let mut bytes = wav_bytes(&[], 8000, 1);
        // Drop the empty data chunk header entirely.
        bytes.truncate(bytes.len() - 8);
        assert!(matches!(decode_wav(&bytes), Err(VizError::Format(_))));
    }

    #[test]
    fn test_ignores_bytes_after_data() {
        let samples: Vec<i16> = (0..1000).map(|i| ((i * 37) % 2000 - 1000) as i16).collect();
        let plain = decode_wav(&wav_bytes(&samples, 8000, 1)).unwrap();

        // Stray padding shorter than a chunk header
        let mut padded = wav_bytes(&samples, 8000, 1);
        padded.extend_from_slice(&[0, 0, 0]);
        assert_eq!(decode_wav(&padded).unwrap().samples(), plain.samples());

        // Trailing tag chunk cut off inside its header
        let mut tagged = wav_bytes(&samples, 8000, 1);
        tagged.extend_from_slice(b"id3 ");
        assert_eq!(decode_wav(&tagged).unwrap().samples(), plain.samples());
    }

    #[test]
    fn test_truncated_header_before_data_is_rejected() {
        let bytes = wav_bytes(&[1, 2, 3], 8000, 1);
        // RIFF header, fmt chunk, then half of the data header
        let cut = &bytes[..FIRST_CHUNK_OFFSET + CHUNK_HEADER_LEN + 16 + 4];
        assert!(matches!(decode_wav(cut), Err(VizError::Format(_))));
    }

    #[test]
    fn test_truncated_data_is_clamped() {
        let mut bytes = wav_bytes(&[1000, 2000, 3000, 4000], 8000, 1);
        bytes.truncate(bytes.len() - 3); // one full sample plus half of another gone
        let clip = decode_wav(&bytes).unwrap();
        assert_eq!(clip.samples().len(), 2);
    }

    #[test]
    fn test_rejects_24_bit() {
        let mut bytes = wav_bytes(&[0, 0], 8000, 1);
        // bits_per_sample sits at fmt body offset 14 → file offset 20 + 14
        bytes[34..36].copy_from_slice(&24u16.to_le_bytes());
        assert!(matches!(decode_wav(&bytes), Err(VizError::Format(_))));
    }

    #[test]
    fn test_channel_access() {
        let bytes = wav_bytes(&[100, -100, 200, -200, 300, -300], 44100, 2);
        let clip = decode_wav(&bytes).unwrap();
        assert_eq!(clip.frames(), 3);
        assert_eq!(clip.channel(0).len(), 3);
        assert!(clip.channel(1).iter().all(|&s| s < 0.0));
        assert_eq!(clip.primary_channel(), clip.channel(0));
        assert!(clip.channel(2).is_empty());
    }
}

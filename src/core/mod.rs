//! Decoding, transform and orchestration for clip visualizations

pub mod artifact;
pub mod batch;
pub mod cache;
pub mod decoder;
pub mod dsp;
pub mod lazy;
pub mod pipeline;
pub mod source;
pub mod spectrogram;
pub mod visualization;
pub mod waveform;

pub use artifact::{ArtifactMap, ArtifactRecord, BatchSummary, VisualizationArtifact};
pub use batch::{
    BatchArtifactPipeline, BatchEvent, BatchListener, BatchOptions, BatchReport, ClipFile,
    Collection, LogListener, NoOpListener,
};
pub use cache::{cache_key, ArtifactCache};
pub use decoder::{decode_file, decode_wav, AudioClip};
pub use lazy::{LazyClip, LoadState, Span, VisibilityPolicy};
pub use pipeline::{ClipPipeline, PipelineConfig};
pub use source::{ByteSource, FallbackSource, FileSource, MemorySource};
#[cfg(feature = "remote")]
pub use source::HttpSource;
pub use spectrogram::{
    compute_spectrogram, Normalization, Spectrogram, SpectrogramConfig, SpectrogramGenerator,
};
pub use waveform::downsample;

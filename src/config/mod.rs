//! Configuration for avrviz

mod settings;

pub use settings::{
    BatchSettings, LazySettings, SpectrogramSettings, VizConfig, WaveformSettings,
    LOCAL_CONFIG_FILE,
};

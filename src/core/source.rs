// src/core/source.rs
//
// Where raw clip bytes come from. The remote-then-local fallback is resolved
// here, before any decoding starts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VizError};

/// A byte source addressed by clip reference (a relative path or object key).
pub trait ByteSource: Send + Sync {
    fn fetch(&self, clip_ref: &str) -> Result<Vec<u8>>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Reads clips from a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ByteSource for FileSource {
    fn fetch(&self, clip_ref: &str) -> Result<Vec<u8>> {
        let path = self.root.join(clip_ref);
        fs::read(&path).map_err(|e| VizError::load(path.display().to_string(), e.to_string()))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.root.display())
    }
}

/// Fetches clips over HTTP from `{base_url}/{clip_ref}`.
#[cfg(feature = "remote")]
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "remote")]
impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn url_for(&self, clip_ref: &str) -> String {
        format!("{}/{}", self.base_url, clip_ref.trim_start_matches('/'))
    }
}

#[cfg(feature = "remote")]
impl ByteSource for HttpSource {
    fn fetch(&self, clip_ref: &str) -> Result<Vec<u8>> {
        let url = self.url_for(clip_ref);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| VizError::load(url.clone(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VizError::load(url, format!("HTTP {}", status)));
        }
        let body = response
            .bytes()
            .map_err(|e| VizError::load(url.clone(), e.to_string()))?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Tries `primary` first and falls back to `secondary` on any load failure.
pub struct FallbackSource {
    primary: Box<dyn ByteSource>,
    secondary: Box<dyn ByteSource>,
}

impl FallbackSource {
    pub fn new(primary: Box<dyn ByteSource>, secondary: Box<dyn ByteSource>) -> Self {
        Self { primary, secondary }
    }
}

impl ByteSource for FallbackSource {
    fn fetch(&self, clip_ref: &str) -> Result<Vec<u8>> {
        match self.primary.fetch(clip_ref) {
            Ok(bytes) => Ok(bytes),
            Err(primary_err) => {
                log::debug!(
                    "{} failed for {} ({}), trying {}",
                    self.primary.describe(),
                    clip_ref,
                    primary_err,
                    self.secondary.describe()
                );
                self.secondary.fetch(clip_ref)
            }
        }
    }

    fn describe(&self) -> String {
        format!("{} -> {}", self.primary.describe(), self.secondary.describe())
    }
}

/// In-memory clips, keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    clips: std::collections::HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, clip_ref: impl Into<String>, bytes: Vec<u8>) {
        self.clips.insert(clip_ref.into(), bytes);
    }
}

impl ByteSource for MemorySource {
    fn fetch(&self, clip_ref: &str) -> Result<Vec<u8>> {
        self.clips
            .get(clip_ref)
            .cloned()
            .ok_or_else(|| VizError::load(clip_ref, "not found"))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

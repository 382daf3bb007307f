//! Typed manifests exchanged between the pipeline steps.
//!
//! Two JSON artifacts travel between the stages:
//!
//! | Artifact | Producer | Consumer |
//! |----------|----------|----------|
//! | `SourceManifest` | chunker (Step A) | voice-conversion stage |
//! | `ConvertedManifest` | voice-conversion stage | stitcher (Step C) |
//!
//! Both carry the same chunk-object shape; `chunk_id`/`start`/`end` are
//! the join key from a converted chunk back to its original timing.
//! Neither artifact is mutated in place; every transformation produces
//! a new manifest.
//!
//! Parsing is deliberately tolerant: metadata fields fall back to
//! documented defaults instead of failing the load. `chunk_seconds` and
//! `overlap_seconds` default to `0.0`, which consumers must read as
//! "unknown"; the values affect no computation once chunks exist.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CantusError, Result};

/// One silence-trimmed segment of a source waveform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Opaque unique id, assigned at creation and never reused.
    pub chunk_id: String,
    /// Absolute start sample offset in the original waveform.
    pub start: u64,
    /// Absolute end sample offset (exclusive) in the original waveform.
    pub end: u64,
    /// Seconds of audio in the encoded payload. May legitimately differ
    /// from `(end - start) / sample_rate` when trimming altered content.
    #[serde(default)]
    pub duration: f64,
    /// Base64 of a lossless WAV buffer carrying its own sample rate.
    pub audio_b64: String,
}

/// Pre-conversion manifest: the chunk layout of one source recording.
///
/// Created once by the chunker and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceManifest {
    /// Rate all chunks were nominally produced at (Hz).
    pub sample_rate: u32,
    /// Provenance of the source recording (path or identifier).
    #[serde(default)]
    pub source: String,
    /// Window length the chunker used, in seconds. `0.0` means the
    /// producer did not record it.
    #[serde(default)]
    pub chunk_seconds: f64,
    /// Preceding-context overlap the chunker used, in seconds.
    #[serde(default)]
    pub overlap_seconds: f64,
    /// RFC 3339 creation timestamp.
    #[serde(default = "default_created_at")]
    pub created_at: String,
    /// Chunk records. Not guaranteed sorted by `start`; consumers must
    /// sort before stitching.
    #[serde(default)]
    pub chunks: Vec<ChunkRecord>,
}

/// Post-conversion manifest consumed exactly once by the stitcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedManifest {
    /// Declared rate of the converted chunks (Hz). Individual payloads
    /// may disagree; the stitcher resamples per chunk.
    pub sample_rate: u32,
    /// Converted chunk records, ids and offsets carried over unchanged
    /// from their pre-conversion counterparts.
    #[serde(default)]
    pub converted_chunks: Vec<ChunkRecord>,
}

fn default_created_at() -> String {
    Utc::now().to_rfc3339()
}

impl SourceManifest {
    /// Write pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(path.as_ref(), self)?;
        debug!(chunks = self.chunks.len(), "source manifest written");
        Ok(())
    }

    /// Load a source manifest from disk.
    ///
    /// A converted manifest passed here is still accepted: its
    /// `converted_chunks` are exposed as `chunks`, with the file path
    /// as provenance and the windowing parameters left unknown, so
    /// inspection tooling can read either artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = read_json(path)?;

        if value.get("converted_chunks").is_some() && value.get("chunks").is_none() {
            let converted: ConvertedManifest = from_value(value, path)?;
            return Ok(Self {
                sample_rate: converted.sample_rate,
                source: path.display().to_string(),
                chunk_seconds: 0.0,
                overlap_seconds: 0.0,
                created_at: String::new(),
                chunks: converted.converted_chunks,
            });
        }

        from_value(value, path)
    }
}

impl ConvertedManifest {
    /// Write pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(path.as_ref(), self)?;
        debug!(chunks = self.converted_chunks.len(), "converted manifest written");
        Ok(())
    }

    /// Load a converted manifest from disk.
    ///
    /// Unlike `SourceManifest::load` this is strict about shape: a
    /// manifest without `converted_chunks` is rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = read_json(path)?;

        if value.get("converted_chunks").is_none() {
            return Err(CantusError::InvalidManifest(format!(
                "{}: expected a converted manifest with 'converted_chunks'",
                path.display()
            )));
        }
        from_value(value, path)
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| CantusError::InvalidManifest(format!("{}: {e}", path.display())))
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value, path: &Path) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| CantusError::InvalidManifest(format!("{}: {e}", path.display())))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CantusError::InvalidManifest(e.to_string()))?;
    fs::write(path, text)?;
    Ok(())
}

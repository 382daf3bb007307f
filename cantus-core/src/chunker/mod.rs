//! Step A — split a source waveform into silence-trimmed chunk records.
//!
//! ## Pipeline position
//!
//! ```text
//! source WAV ──► chunk() ──► SourceManifest ──► [voice conversion] ──► stitcher
//! ```
//!
//! ## Algorithm (per window)
//!
//! ```text
//! 1. window = samples[max(cursor - overlap, 0) .. min(cursor + chunk_size, total)]
//! 2. trim = SilenceDetector::trim_bounds(window)
//! 3. no audible span, or trimmed span < min_chunk_seconds → discard
//! 4. otherwise emit a ChunkRecord at the absolute trimmed offsets
//! 5. cursor += chunk_size in either branch
//! ```
//!
//! The overlap only adds preceding context for trimming; the cursor
//! always advances by the full window, so no samples are emitted twice
//! verbatim. The stitcher's crossfade reconciles whatever audio the
//! windows re-read near boundaries.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::audio::{codec, io, resample};
use crate::error::{CantusError, Result};
use crate::manifest::{ChunkRecord, SourceManifest};
use crate::silence::SilenceDetector;

/// Windowing and trimming parameters for Step A.
///
/// Passed by reference into each call; there are no module-level
/// defaults to mutate.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Rate chunks are produced at (Hz). Default: 16000.
    pub sample_rate: u32,
    /// Window length in seconds. Default: 12.0.
    pub chunk_seconds: f64,
    /// Preceding context included in each window, in seconds.
    /// Default: 1.5.
    pub overlap_seconds: f64,
    /// Frames this far below the loudest frame count as silence (dB).
    /// Default: -40.0.
    pub silence_threshold_db: f32,
    /// Trimmed spans shorter than this are dropped, in seconds.
    /// Default: 0.15.
    pub min_chunk_seconds: f64,
    /// Silence-analysis frame length in samples. Default: 1024.
    pub frame_length: usize,
    /// Silence-analysis hop in samples. Default: 256.
    pub hop_length: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            chunk_seconds: 12.0,
            overlap_seconds: 1.5,
            silence_threshold_db: -40.0,
            min_chunk_seconds: 0.15,
            frame_length: 1024,
            hop_length: 256,
        }
    }
}

impl ChunkerConfig {
    fn chunk_samples(&self) -> usize {
        (self.chunk_seconds * self.sample_rate as f64).round() as usize
    }

    fn overlap_samples(&self) -> usize {
        (self.overlap_seconds * self.sample_rate as f64).round() as usize
    }

    fn min_samples(&self) -> usize {
        (self.min_chunk_seconds * self.sample_rate as f64).round() as usize
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(CantusError::InvalidConfig("sample_rate must be non-zero".into()));
        }
        if self.chunk_samples() == 0 {
            return Err(CantusError::InvalidConfig(
                "chunk_seconds must cover at least one sample".into(),
            ));
        }
        if self.frame_length == 0 || self.hop_length == 0 {
            return Err(CantusError::InvalidConfig(
                "frame_length and hop_length must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Split `samples` (at `cfg.sample_rate`) into ordered chunk records.
///
/// A single forward pass; no backtracking. An empty waveform yields an
/// empty list, not an error. Windows that trim to nothing, or to less
/// than `min_chunk_seconds`, are silently dropped; that is policy, not
/// a fault.
pub fn chunk(samples: &[f32], cfg: &ChunkerConfig) -> Result<Vec<ChunkRecord>> {
    cfg.validate()?;

    let chunk_size = cfg.chunk_samples();
    let overlap = cfg.overlap_samples();
    let min_len = cfg.min_samples();
    let detector = SilenceDetector::new(cfg.silence_threshold_db, cfg.frame_length, cfg.hop_length);

    let total = samples.len();
    let mut records = Vec::new();
    let mut discarded = 0usize;
    let mut cursor = 0usize;

    while cursor < total {
        let window_offset = cursor.saturating_sub(overlap);
        let window_end = (cursor + chunk_size).min(total);
        let window = &samples[window_offset..window_end];

        let Some((trim_start, trim_end)) = detector.trim_bounds(window) else {
            debug!(cursor, "window is silent — discarded");
            discarded += 1;
            cursor += chunk_size;
            continue;
        };

        let trimmed = &window[trim_start..trim_end];
        if trimmed.len() < min_len {
            debug!(
                cursor,
                trimmed = trimmed.len(),
                min_len,
                "trimmed span below minimum — discarded"
            );
            discarded += 1;
            cursor += chunk_size;
            continue;
        }

        let abs_start = window_offset + trim_start;
        let abs_end = window_offset + trim_end;
        let record = ChunkRecord {
            chunk_id: Uuid::new_v4().simple().to_string(),
            start: abs_start as u64,
            end: abs_end as u64,
            duration: trimmed.len() as f64 / cfg.sample_rate as f64,
            audio_b64: codec::encode_base64_wav(trimmed, cfg.sample_rate)?,
        };
        debug!(
            chunk_id = %record.chunk_id,
            start = abs_start,
            end = abs_end,
            "chunk emitted"
        );
        records.push(record);

        cursor += chunk_size;
    }

    info!(
        chunks = records.len(),
        discarded,
        total_samples = total,
        "chunking complete"
    );
    Ok(records)
}

/// Run Step A over an in-memory waveform and wrap the result in a
/// manifest. `source` records provenance only.
pub fn chunk_to_manifest(
    samples: &[f32],
    source: &str,
    cfg: &ChunkerConfig,
) -> Result<SourceManifest> {
    let chunks = chunk(samples, cfg)?;
    Ok(SourceManifest {
        sample_rate: cfg.sample_rate,
        source: source.to_string(),
        chunk_seconds: cfg.chunk_seconds,
        overlap_seconds: cfg.overlap_seconds,
        created_at: Utc::now().to_rfc3339(),
        chunks,
    })
}

/// Load a WAV file, bring it to the configured rate, chunk it, and
/// write the manifest to `manifest_path`.
pub fn chunk_file(
    audio_path: impl AsRef<Path>,
    manifest_path: impl AsRef<Path>,
    cfg: &ChunkerConfig,
) -> Result<SourceManifest> {
    let audio_path = audio_path.as_ref();
    let clip = io::load_wav(audio_path)?;
    let samples = resample::resample(&clip.samples, clip.sample_rate, cfg.sample_rate)?;

    let source = audio_path
        .canonicalize()
        .unwrap_or_else(|_| audio_path.to_path_buf());
    let manifest = chunk_to_manifest(&samples, &source.display().to_string(), cfg)?;
    manifest.save(manifest_path)?;
    Ok(manifest)
}

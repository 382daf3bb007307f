//! WAV file loading and saving.
//!
//! The chunker and stitcher operate on in-memory buffers only; these
//! helpers own the file boundary for callers that start from (or end
//! at) a WAV on disk. Multi-channel files are averaged down to mono on
//! load.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::audio::{codec, AudioClip};
use crate::error::{CantusError, Result};

/// Load a WAV file as mono f32 at its native rate.
pub fn load_wav(path: impl AsRef<Path>) -> Result<AudioClip> {
    let path = path.as_ref();
    let reader = WavReader::open(path)
        .map_err(|e| CantusError::Codec(format!("{}: {e}", path.display())))?;
    let clip = codec::clip_from_reader(reader)?;

    debug!(
        path = %path.display(),
        samples = clip.len(),
        sample_rate = clip.sample_rate,
        "wav loaded"
    );
    Ok(clip)
}

/// Write mono f32 samples as a 32-bit float WAV, creating parent
/// directories as needed.
pub fn save_wav(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer =
        WavWriter::create(path, spec).map_err(|e| CantusError::Codec(e.to_string()))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| CantusError::Codec(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| CantusError::Codec(e.to_string()))?;

    debug!(path = %path.display(), samples = samples.len(), sample_rate, "wav written");
    Ok(())
}

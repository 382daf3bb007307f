//! Voice-conversion seam between Step A and Step C.
//!
//! The conversion model is an external collaborator: it receives one
//! decoded chunk and hands back converted samples at whatever rate it
//! prefers. The `VoiceConverter` trait keeps that boundary synchronous
//! and opaque; job submission, transport, and retries live outside
//! this crate.

use tracing::debug;

use crate::audio::{codec, AudioClip};
use crate::error::Result;
use crate::manifest::{ChunkRecord, ConvertedManifest, SourceManifest};

/// Contract for voice-conversion backends.
///
/// `&mut self` expresses that converters are typically stateful (model
/// sessions, caches). The reference voice sample and model identifier
/// a backend needs are construction-time configuration, not call
/// arguments. Implementations may return audio at any sample rate; the
/// stitcher resamples to its target.
pub trait VoiceConverter {
    /// Convert one decoded chunk into the target voice.
    fn convert(&mut self, clip: &AudioClip) -> Result<AudioClip>;
}

/// Pass-through converter: returns the input unchanged.
///
/// Lets the full chunk → manifest → stitch path be exercised
/// end-to-end without a model.
#[derive(Debug, Default)]
pub struct IdentityConverter;

impl VoiceConverter for IdentityConverter {
    fn convert(&mut self, clip: &AudioClip) -> Result<AudioClip> {
        Ok(clip.clone())
    }
}

/// Run every chunk of `manifest` through `converter`, producing a new
/// converted manifest.
///
/// `chunk_id`, `start`, and `end` carry over unchanged: they are the
/// join key back to original timing. `duration` is re-derived from the
/// converted payload, which the record's sample count must agree with.
pub fn convert_manifest(
    manifest: &SourceManifest,
    converter: &mut dyn VoiceConverter,
) -> Result<ConvertedManifest> {
    let mut converted_chunks = Vec::with_capacity(manifest.chunks.len());
    for record in &manifest.chunks {
        let clip = codec::decode_chunk(record)?;
        let converted = converter.convert(&clip)?;
        debug!(
            chunk_id = %record.chunk_id,
            in_samples = clip.len(),
            out_samples = converted.len(),
            out_rate = converted.sample_rate,
            "chunk converted"
        );

        converted_chunks.push(ChunkRecord {
            chunk_id: record.chunk_id.clone(),
            start: record.start,
            end: record.end,
            duration: converted.duration_secs(),
            audio_b64: codec::encode_base64_wav(&converted.samples, converted.sample_rate)?,
        });
    }

    Ok(ConvertedManifest {
        sample_rate: manifest.sample_rate,
        converted_chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::{chunk_to_manifest, ChunkerConfig};

    /// Converter that halves the sample rate without touching samples,
    /// mimicking a model that emits at its own native rate.
    struct HalfRateConverter;

    impl VoiceConverter for HalfRateConverter {
        fn convert(&mut self, clip: &AudioClip) -> Result<AudioClip> {
            Ok(AudioClip::new(clip.samples.clone(), clip.sample_rate / 2))
        }
    }

    fn small_manifest() -> SourceManifest {
        let cfg = ChunkerConfig {
            chunk_seconds: 1.0,
            ..ChunkerConfig::default()
        };
        chunk_to_manifest(&vec![0.25f32; 32_000], "test.wav", &cfg).unwrap()
    }

    #[test]
    fn identity_conversion_preserves_join_key_and_audio() {
        let manifest = small_manifest();
        let converted = convert_manifest(&manifest, &mut IdentityConverter).unwrap();

        assert_eq!(converted.sample_rate, manifest.sample_rate);
        assert_eq!(converted.converted_chunks.len(), manifest.chunks.len());

        for (before, after) in manifest.chunks.iter().zip(&converted.converted_chunks) {
            assert_eq!(before.chunk_id, after.chunk_id);
            assert_eq!(before.start, after.start);
            assert_eq!(before.end, after.end);

            let original = codec::decode_chunk(before).unwrap();
            let round_trip = codec::decode_chunk(after).unwrap();
            assert_eq!(original.samples, round_trip.samples);
        }
    }

    #[test]
    fn converted_duration_follows_the_new_payload() {
        let manifest = small_manifest();
        let converted = convert_manifest(&manifest, &mut HalfRateConverter).unwrap();

        for (before, after) in manifest.chunks.iter().zip(&converted.converted_chunks) {
            // Same sample count at half the rate → double the duration.
            assert!((after.duration - before.duration * 2.0).abs() < 1e-9);
            let clip = codec::decode_chunk(after).unwrap();
            assert_eq!(clip.sample_rate, manifest.sample_rate / 2);
        }
    }
}

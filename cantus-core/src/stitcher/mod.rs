//! Step C — overlay converted chunks into one continuous waveform.
//!
//! ## Algorithm
//!
//! ```text
//! 1. Sort records by start (stable — equal starts keep manifest order)
//! 2. Per record: decode the payload, resample to the target rate if
//!    its native rate differs
//! 3. Grow the output with trailing zeros to fit, then place:
//!      overlap = min(crossfade, chunk_len, pre_growth_len - start), ≥ 0
//!      [start, start + overlap)  linear crossfade, old 1→0 / new 0→1
//!      [start + overlap, end)    hard overwrite
//! ```
//!
//! The overlap is measured against the buffer as it was before this
//! chunk grew it, so the fade never reads the zero-fill this chunk
//! just created and never reaches before index 0.

use std::path::Path;

use tracing::{debug, info};

use crate::audio::{codec, io, resample};
use crate::error::Result;
use crate::manifest::{ChunkRecord, ConvertedManifest};

/// Placement parameters for Step C.
#[derive(Debug, Clone)]
pub struct StitchConfig {
    /// Target timeline rate (Hz). Default: 16000.
    pub sample_rate: u32,
    /// Width of the boundary crossfade, in seconds. Default: 1.5.
    pub crossfade_seconds: f64,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            crossfade_seconds: 1.5,
        }
    }
}

/// Stitch `records` into one waveform at `cfg.sample_rate`.
///
/// Fails on the first undecodable payload, naming the chunk: either
/// every listed chunk decodes and is placed, or the whole call errors.
pub fn stitch_chunks(records: &[ChunkRecord], cfg: &StitchConfig) -> Result<Vec<f32>> {
    let mut ordered: Vec<&ChunkRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.start);

    let crossfade = (cfg.crossfade_seconds * cfg.sample_rate as f64).round() as usize;

    // Single-sample seed; growth is purely demand-driven.
    let mut buffer = vec![0.0f32; 1];
    for record in ordered {
        let clip = codec::decode_chunk(record)?;
        let samples = resample::resample(&clip.samples, clip.sample_rate, cfg.sample_rate)?;
        place_chunk(&mut buffer, &samples, record.start as usize, crossfade);
        debug!(
            chunk_id = %record.chunk_id,
            start = record.start,
            samples = samples.len(),
            "chunk placed"
        );
    }

    info!(
        chunks = records.len(),
        samples = buffer.len(),
        sample_rate = cfg.sample_rate,
        "stitch complete"
    );
    Ok(buffer)
}

/// Load a converted manifest and write the stitched waveform as WAV.
pub fn stitch_to_file(
    manifest_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    cfg: &StitchConfig,
) -> Result<()> {
    let manifest = ConvertedManifest::load(manifest_path.as_ref())?;
    let audio = stitch_chunks(&manifest.converted_chunks, cfg)?;
    io::save_wav(output_path.as_ref(), &audio, cfg.sample_rate)
}

/// Overlay `chunk` at `start`, crossfading into previously written
/// content.
fn place_chunk(buffer: &mut Vec<f32>, chunk: &[f32], start: usize, crossfade: usize) {
    if chunk.is_empty() {
        return;
    }

    let existing_len = buffer.len();
    let end = start + chunk.len();
    if end > buffer.len() {
        buffer.resize(end, 0.0);
    }

    let overlap = crossfade
        .min(chunk.len())
        .min(existing_len.saturating_sub(start));

    for (i, &sample) in chunk.iter().take(overlap).enumerate() {
        // Inclusive 0..=1 sweep: first blended sample is pure old,
        // last is pure new.
        let fade = if overlap > 1 {
            i as f32 / (overlap - 1) as f32
        } else {
            0.0
        };
        buffer[start + i] = buffer[start + i] * (1.0 - fade) + sample * fade;
    }

    buffer[start + overlap..end].copy_from_slice(&chunk[overlap..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::codec::encode_base64_wav;
    use crate::error::CantusError;
    use approx::assert_abs_diff_eq;

    fn record(id: &str, start: u64, samples: &[f32], sample_rate: u32) -> ChunkRecord {
        ChunkRecord {
            chunk_id: id.into(),
            start,
            end: start + samples.len() as u64,
            duration: samples.len() as f64 / sample_rate as f64,
            audio_b64: encode_base64_wav(samples, sample_rate).unwrap(),
        }
    }

    fn sine(len: usize, sample_rate: u32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sample_rate as f32).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn single_chunk_at_zero_reproduces_decoded_samples() {
        let samples = sine(8_000, 16_000);
        let records = vec![record("only", 0, &samples, 16_000)];

        let out = stitch_chunks(&records, &StitchConfig::default()).unwrap();

        // Only the 1-sample seed can blend, and the sine starts at 0.
        assert_eq!(out, samples);
    }

    #[test]
    fn empty_record_list_yields_the_seed_buffer() {
        let out = stitch_chunks(&[], &StitchConfig::default()).unwrap();
        assert_eq!(out, vec![0.0]);
    }

    #[test]
    fn crossfade_weights_ramp_linearly() {
        // 100-sample crossfade at 100 Hz. Old chunk is constant 1.0
        // over [0, 200); new chunk is constant 0.0 over [100, 250).
        // The blended region [100, 200) must read old*(1-fade).
        let cfg = StitchConfig {
            sample_rate: 100,
            crossfade_seconds: 1.0,
        };
        let records = vec![
            record("old", 0, &vec![1.0f32; 200], 100),
            record("new", 100, &vec![0.0f32; 150], 100),
        ];

        let out = stitch_chunks(&records, &cfg).unwrap();
        assert_eq!(out.len(), 250);

        // First overlap sample: pure old.
        assert_abs_diff_eq!(out[100], 1.0, epsilon = 1e-6);
        // Last overlap sample: pure new.
        assert_abs_diff_eq!(out[199], 0.0, epsilon = 1e-6);
        // Midpoint and monotonic descent in between.
        assert_abs_diff_eq!(out[150], 1.0 - 50.0 / 99.0, epsilon = 1e-4);
        for i in 100..199 {
            assert!(out[i] >= out[i + 1], "fade must be monotonic at {i}");
        }
        // Past the overlap: hard overwrite.
        for &s in &out[200..250] {
            assert_eq!(s, 0.0);
        }
    }

    #[test]
    fn unsorted_records_are_placed_in_start_order() {
        let cfg = StitchConfig {
            sample_rate: 100,
            crossfade_seconds: 0.0,
        };
        let records = vec![
            record("late", 100, &vec![0.5f32; 100], 100),
            record("early", 0, &vec![-0.5f32; 100], 100),
        ];

        let out = stitch_chunks(&records, &cfg).unwrap();
        assert_eq!(out.len(), 200);
        assert!(out[..100].iter().all(|&s| s == -0.5));
        assert!(out[100..].iter().all(|&s| s == 0.5));
    }

    #[test]
    fn equal_starts_keep_manifest_order() {
        // With no crossfade the later record in manifest order wins.
        let cfg = StitchConfig {
            sample_rate: 100,
            crossfade_seconds: 0.0,
        };
        let records = vec![
            record("first", 0, &vec![0.25f32; 100], 100),
            record("second", 0, &vec![0.75f32; 100], 100),
        ];

        let out = stitch_chunks(&records, &cfg).unwrap();
        assert!(out.iter().all(|&s| s == 0.75));
    }

    #[test]
    fn gap_between_chunks_is_zero_filled() {
        let cfg = StitchConfig {
            sample_rate: 100,
            crossfade_seconds: 1.0,
        };
        let records = vec![
            record("a", 0, &vec![0.5f32; 50], 100),
            record("b", 150, &vec![0.5f32; 50], 100),
        ];

        let out = stitch_chunks(&records, &cfg).unwrap();
        assert_eq!(out.len(), 200);
        assert!(out[50..150].iter().all(|&s| s == 0.0));
        // No prior content at 150, so it is placed verbatim with no fade-in.
        assert_eq!(out[150], 0.5);
    }

    #[test]
    fn zero_length_chunk_contributes_nothing() {
        let cfg = StitchConfig {
            sample_rate: 100,
            crossfade_seconds: 1.0,
        };
        let samples = vec![0.5f32; 100];
        let records = vec![
            record("real", 0, &samples, 100),
            record("empty", 40, &[], 100),
        ];

        let out = stitch_chunks(&records, &cfg).unwrap();
        let alone = stitch_chunks(&records[..1], &cfg).unwrap();
        assert_eq!(out, alone);
    }

    #[test]
    fn chunk_at_foreign_rate_is_resampled_onto_the_timeline() {
        let cfg = StitchConfig {
            sample_rate: 16_000,
            crossfade_seconds: 0.0,
        };
        // 0.1 s of DC at 8 kHz → 1600 samples once on the timeline.
        let records = vec![record("dc", 0, &vec![0.5f32; 800], 8_000)];

        let out = stitch_chunks(&records, &cfg).unwrap();
        assert_eq!(out.len(), 1_600);
        for &s in &out[200..1_400] {
            assert_abs_diff_eq!(s, 0.5, epsilon = 1e-2);
        }
    }

    #[test]
    fn undecodable_payload_aborts_the_stitch_with_chunk_id() {
        let records = vec![
            record("good", 0, &vec![0.5f32; 100], 16_000),
            ChunkRecord {
                chunk_id: "broken".into(),
                start: 50,
                end: 150,
                duration: 0.0,
                audio_b64: "bm90IGEgd2F2".into(),
            },
        ];

        match stitch_chunks(&records, &StitchConfig::default()) {
            Err(CantusError::ChunkDecode { chunk_id, .. }) => assert_eq!(chunk_id, "broken"),
            other => panic!("expected ChunkDecode, got {other:?}"),
        }
    }
}

//! Offline sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! ## Design
//!
//! Converted chunks come back from the voice-conversion stage at
//! whatever rate its model emits (commonly 22.05 kHz), while the
//! stitcher places everything on one target timeline. Unlike a
//! streaming converter this one sees the whole buffer at once: it feeds
//! fixed-size blocks, flushes the interpolator tail with silence, and
//! trims the output to the duration-proportional length.
//!
//! When the rates already match, the input is returned unchanged.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

use crate::error::{CantusError, Result};

/// Input frame count per rubato process call.
const BLOCK: usize = 1024;

/// Convert mono f32 samples from `from_rate` to `to_rate`.
///
/// The output holds exactly `round(len * to_rate / from_rate)` samples,
/// so duration is preserved proportionally.
///
/// # Errors
/// Returns `CantusError::Resample` when either rate is zero or rubato
/// fails to initialise.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        return Err(CantusError::Resample(format!(
            "invalid rate pair {from_rate} -> {to_rate}"
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;

    let mut resampler =
        FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Cubic, BLOCK, 1)
            .map_err(|e| CantusError::Resample(format!("init: {e}")))?;

    let delay = resampler.output_delay();
    let mut output_buf = vec![vec![0f32; resampler.output_frames_max()]; 1];
    let mut out: Vec<f32> = Vec::with_capacity(expected + BLOCK);

    // Feed full blocks; once the input runs out, keep pushing silence
    // until the interpolator has flushed `delay + expected` frames.
    let mut block = vec![0f32; BLOCK];
    let mut cursor = 0usize;
    while out.len() < delay + expected {
        block.fill(0.0);
        if cursor < samples.len() {
            let take = BLOCK.min(samples.len() - cursor);
            block[..take].copy_from_slice(&samples[cursor..cursor + take]);
            cursor += take;
        }

        let input_slice = &block[..];
        let (_consumed, produced) = resampler
            .process_into_buffer(&[input_slice], &mut output_buf, None)
            .map_err(|e| CantusError::Resample(e.to_string()))?;
        out.extend_from_slice(&output_buf[0][..produced]);
    }

    debug!(
        from_rate,
        to_rate,
        input = samples.len(),
        output = expected,
        "resampled clip"
    );

    Ok(out[delay..delay + expected].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn passthrough_identity() {
        let samples: Vec<f32> = (0..480).map(|i| i as f32 * 0.001).collect();
        let out = resample(&samples, 16_000, 16_000).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn empty_input_stays_empty() {
        let out = resample(&[], 48_000, 16_000).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn zero_rate_is_rejected() {
        let err = resample(&[0.0; 100], 0, 16_000).unwrap_err();
        assert!(matches!(err, CantusError::Resample(_)));
    }

    #[test]
    fn downsample_length_is_proportional() {
        let samples = vec![0.5f32; 4_800];
        let out = resample(&samples, 48_000, 16_000).unwrap();
        assert_eq!(out.len(), 1_600);
    }

    #[test]
    fn upsample_length_is_proportional() {
        let samples = vec![0.5f32; 1_600];
        let out = resample(&samples, 16_000, 48_000).unwrap();
        assert_eq!(out.len(), 4_800);
    }

    #[test]
    fn dc_level_survives_conversion() {
        let samples = vec![0.5f32; 22_050];
        let out = resample(&samples, 22_050, 16_000).unwrap();
        assert_eq!(out.len(), 16_000);
        // Interior samples should sit at the DC level; edges may ring.
        for &s in &out[1_000..15_000] {
            assert_abs_diff_eq!(s, 0.5, epsilon = 1e-2);
        }
    }
}

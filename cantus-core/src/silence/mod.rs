//! Silence trimming via short-time RMS energy.
//!
//! ## Algorithm
//!
//! 1. Slide `frame_length`-sample frames over the segment at
//!    `hop_length` stride. Frames are centered: the segment is
//!    zero-padded by `frame_length / 2` on both ends so edge samples
//!    are covered by at least one frame.
//! 2. Convert each frame's RMS to decibels relative to the loudest
//!    frame in the segment.
//! 3. A frame is audible when its level is strictly above
//!    `threshold_db`.
//! 4. Map the first and last audible frame back to sample coordinates.
//!
//! A segment shorter than one frame still produces exactly one frame
//! thanks to the padding.

/// Computes the tightest audible sample range inside a window.
#[derive(Debug, Clone)]
pub struct SilenceDetector {
    /// Level relative to the loudest frame (dB, negative) above which a
    /// frame counts as audible. Typical: -40.0.
    threshold_db: f32,
    /// Analysis frame length in samples.
    frame_length: usize,
    /// Hop between successive frames in samples.
    hop_length: usize,
}

impl SilenceDetector {
    /// Create a new detector. `frame_length` and `hop_length` must be
    /// non-zero.
    pub fn new(threshold_db: f32, frame_length: usize, hop_length: usize) -> Self {
        debug_assert!(frame_length > 0 && hop_length > 0);
        Self {
            threshold_db,
            frame_length,
            hop_length,
        }
    }

    /// Half-open `[start, end)` sample range of the audible span, or
    /// `None` when the whole segment is indistinguishable from silence.
    pub fn trim_bounds(&self, samples: &[f32]) -> Option<(usize, usize)> {
        if samples.is_empty() {
            return None;
        }

        let rms = self.frame_rms(samples);
        let peak = rms.iter().fold(0.0f32, |acc, &v| acc.max(v));
        if peak <= 0.0 {
            return None;
        }

        let mut first = None;
        let mut last = None;
        for (idx, &energy) in rms.iter().enumerate() {
            // energy == 0 gives -inf here, which a strict > never passes.
            let db = 20.0 * (energy / peak).log10();
            if db > self.threshold_db {
                if first.is_none() {
                    first = Some(idx);
                }
                last = Some(idx);
            }
        }
        let (first, last) = (first?, last?);

        let start = (first * self.hop_length).min(samples.len());
        let end = (last * self.hop_length + self.frame_length).min(samples.len());
        Some((start, end))
    }

    /// Short-time RMS over centered frames.
    ///
    /// The mean is taken over the full `frame_length` including any
    /// zero padding, so edge frames read quieter than interior ones.
    fn frame_rms(&self, samples: &[f32]) -> Vec<f32> {
        let pad = self.frame_length / 2;
        let padded_len = samples.len() + 2 * pad;
        let frames = if padded_len >= self.frame_length {
            (padded_len - self.frame_length) / self.hop_length + 1
        } else {
            1
        };

        let mut rms = Vec::with_capacity(frames);
        for i in 0..frames {
            let frame_start = (i * self.hop_length) as isize - pad as isize;
            let lo = frame_start.max(0) as usize;
            let hi = ((frame_start + self.frame_length as isize).max(0) as usize)
                .min(samples.len());
            let sum_sq: f32 = samples[lo.min(hi)..hi].iter().map(|s| s * s).sum();
            rms.push((sum_sq / self.frame_length as f32).sqrt());
        }
        rms
    }
}

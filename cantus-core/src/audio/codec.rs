//! Lossless payload codec for manifest transport.
//!
//! Chunks travel inside manifests as base64 text wrapping a mono 32-bit
//! float WAV. The container carries its own sample rate, so a payload
//! stays decodable even when the manifest's declared rate and the
//! audio's actual rate disagree; the voice-conversion stage is free to
//! return chunks at whatever rate its model produces.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::audio::AudioClip;
use crate::error::{CantusError, Result};
use crate::manifest::ChunkRecord;

/// Encode mono f32 samples as a base64 WAV payload.
pub fn encode_base64_wav(samples: &[f32], sample_rate: u32) -> Result<String> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        WavWriter::new(&mut cursor, spec).map_err(|e| CantusError::Codec(e.to_string()))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| CantusError::Codec(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| CantusError::Codec(e.to_string()))?;

    Ok(BASE64.encode(cursor.into_inner()))
}

/// Decode a base64 WAV payload into samples plus their native rate.
///
/// Accepts float and integer PCM; multi-channel payloads are averaged
/// down to mono.
pub fn decode_base64_wav(payload: &str) -> Result<AudioClip> {
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| CantusError::Codec(format!("base64: {e}")))?;
    let reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| CantusError::Codec(e.to_string()))?;
    clip_from_reader(reader)
}

/// Decode a chunk record's payload, tagging failures with the chunk id.
pub fn decode_chunk(record: &ChunkRecord) -> Result<AudioClip> {
    decode_base64_wav(&record.audio_b64).map_err(|e| match e {
        CantusError::Codec(reason) => CantusError::ChunkDecode {
            chunk_id: record.chunk_id.clone(),
            reason,
        },
        other => other,
    })
}

/// Read all samples from an open WAV stream as mono f32.
pub(crate) fn clip_from_reader<R: std::io::Read>(reader: WavReader<R>) -> Result<AudioClip> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let sample_rate = spec.sample_rate;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| CantusError::Codec(e.to_string()))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| CantusError::Codec(e.to_string()))?
        }
    };

    let samples = if channels > 1 {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        interleaved
    };

    Ok(AudioClip::new(samples, sample_rate))
}

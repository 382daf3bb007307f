//! # cantus-core
//!
//! Chunk/stitch engine for the Cantus voice-conversion pipeline.
//!
//! ## Architecture
//!
//! ```text
//! source WAV → Chunker ──► SourceManifest (trimmed chunks + absolute offsets)
//!                               │
//!                        VoiceConverter (opaque, external)
//!                               │
//!             ConvertedManifest ▼
//!                        Stitcher ──► continuous waveform
//! ```
//!
//! Chunk boundaries are absolute sample offsets into the original
//! timeline. Each chunker window reaches back by a configurable overlap
//! for silence-trimming context; the stitcher's linear crossfade
//! reconciles whatever audio neighbouring chunks share near boundaries.
//!
//! Everything is synchronous and purely functional; the `*_file`
//! helpers are the only functions that touch the filesystem.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod chunker;
pub mod convert;
pub mod error;
pub mod manifest;
pub mod silence;
pub mod stitcher;

// Convenience re-exports for downstream crates
pub use audio::AudioClip;
pub use chunker::{chunk, chunk_file, chunk_to_manifest, ChunkerConfig};
pub use convert::{convert_manifest, IdentityConverter, VoiceConverter};
pub use error::CantusError;
pub use manifest::{ChunkRecord, ConvertedManifest, SourceManifest};
pub use silence::SilenceDetector;
pub use stitcher::{stitch_chunks, stitch_to_file, StitchConfig};

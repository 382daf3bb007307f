use thiserror::Error;

/// All errors produced by cantus-core.
#[derive(Debug, Error)]
pub enum CantusError {
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("chunk {chunk_id}: cannot decode audio payload: {reason}")]
    ChunkDecode { chunk_id: String, reason: String },

    #[error("audio codec error: {0}")]
    Codec(String),

    #[error("resampler error: {0}")]
    Resample(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CantusError>;

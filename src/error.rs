use ndarray_npy::WriteNpyError;
use rayon::ThreadPoolBuildError;
use thiserror::Error;

/// Errors raised by the embedding pipeline and its outer surface.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("token '{token}' is not in the vocabulary")]
    UnknownToken { token: String },

    #[error("position {position} is out of range for a sentence of length {len}")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("dimension {dim} exceeds the {rank} available embedding columns")]
    DimensionOutOfRange { dim: usize, rank: usize },

    #[error("non-finite value in matrix at ({row}, {col})")]
    NonFiniteValue { row: usize, col: usize },

    #[error("SVD failed to converge after {sweeps} sweeps")]
    SvdNotConverged { sweeps: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Npy(#[from] WriteNpyError),

    #[error(transparent)]
    ThreadPool(#[from] ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;

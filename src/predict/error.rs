use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Propagator returned {got} elevations for {expected} timestamps")]
    Misaligned { expected: usize, got: usize },
}

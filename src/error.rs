use thiserror::Error;

#[derive(Error, Debug)]
pub enum FisherPrepError {
    #[error("Audio decoding failed: {0}")]
    Decode(String),

    #[error("Clip extraction failed: {0}")]
    ClipExtraction(String),

    #[error("Transcript parsing failed: {0}")]
    Transcript(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FisherPrepError>;

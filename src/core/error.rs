use thiserror::Error;

#[derive(Error, Debug)]
pub enum FmgError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Range starting at id {first} overlaps or precedes range ending at id {previous_last}")]
    RangeOverlap { previous_last: i32, first: i32 },

    #[error("Truncated input: {0}")]
    TruncatedInput(String),

    #[error("Invalid text: {0}")]
    InvalidText(String),

    #[error("Invalid review notation: {0}")]
    InvalidNotation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FmgError {
    /// Convert a reader error, reporting a short read as truncation
    pub(crate) fn from_read(err: std::io::Error, what: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            FmgError::TruncatedInput(format!("unexpected end of data while reading {}", what))
        } else {
            FmgError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, FmgError>;

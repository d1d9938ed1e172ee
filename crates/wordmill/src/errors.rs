//! # Error Types

/// Errors from wordmill operations.
#[derive(Debug, thiserror::Error)]
pub enum WordmillError {
    /// Vocab size is below the minimum (256, the u8 space).
    #[error("vocab size ({size}) must be >= 256")]
    VocabSizeTooSmall {
        /// The vocab size that was too small.
        size: usize,
    },

    /// A configuration value is outside its legal range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The corpus yielded zero non-empty sentences.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Parse error while loading a model or vocab file.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for wordmill operations.
pub type WmResult<T> = core::result::Result<T, WordmillError>;

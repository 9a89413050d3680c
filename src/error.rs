//! Failures of loading an emotion checkpoint and classifying text.
//!
//! Every fallible call returns [`Result<T>`]. Loading fails on the Hub, the
//! checkpoint files, or the device. Classifying fails on the tokenizer or on
//! scores that cannot be ranked.

use thiserror::Error;

/// Shorthand for `Result<T, PipelineError>`.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Why a checkpoint could not be loaded or a message could not be classified.
///
/// # Example
///
/// ```rust,no_run
/// use friday_mood::emotion::{EmotionCheckpoint, EmotionPipelineBuilder};
/// use friday_mood::error::PipelineError;
///
/// let checkpoint = EmotionCheckpoint::Repo("my-org/not-a-classifier".into());
/// match EmotionPipelineBuilder::checkpoint(checkpoint).build() {
///     Ok(_) => {}
///     // config.json has no id2label, or its ids skip a number
///     Err(PipelineError::Config(msg)) => eprintln!("not an emotion classifier: {msg}"),
///     // vocab.txt without [CLS] or [SEP]
///     Err(PipelineError::Tokenization(msg)) => eprintln!("unusable tokenizer: {msg}"),
///     Err(e) => eprintln!("load failed: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// A checkpoint file could not be fetched from the Hub or its cache.
    #[error("{0}")]
    Download(String),

    /// The vocabulary lacks `[CLS]`/`[SEP]`, or a message could not be encoded.
    #[error("{0}")]
    Tokenization(String),

    /// The requested CUDA device could not be opened.
    #[error("{0}")]
    Device(String),

    /// `config.json` is malformed or has a missing or non-contiguous
    /// `id2label`, or the builder was asked for zero emotions.
    #[error("{0}")]
    Config(String),

    /// A score was NaN or infinite, or the top label was empty.
    #[error("{0}")]
    InvalidPrediction(String),

    /// Tensor or file-system failure while running the model.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Config(format!("Malformed model config: {value}"))
    }
}

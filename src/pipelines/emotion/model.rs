use super::pipeline::EmotionScore;
use crate::error::Result;
use crate::pipelines::cache::ModelOptions;
use tokenizers::Tokenizer;

/// A text classifier with a fixed emotion label vocabulary.
///
/// Implemented by [`EmotionBertModel`](crate::models::EmotionBertModel); any
/// other scorer can be plugged into [`EmotionPipelineBuilder::new`](super::EmotionPipelineBuilder::new).
pub trait EmotionClassificationModel: Send + Sync + 'static {
    /// Identifies the checkpoint to load; also the cache key.
    type Options: ModelOptions + std::fmt::Debug + Clone;

    /// Loads the model onto `device`.
    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// One score per label, in the model's label order.
    fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<EmotionScore>>;

    /// The label vocabulary, in label-id order.
    fn labels(&self) -> &[String];

    /// Loads the tokenizer matching `options`.
    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    /// Device the model runs on.
    fn device(&self) -> &candle_core::Device;
}

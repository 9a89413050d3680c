use std::sync::Arc;

use super::model::EmotionClassificationModel;
use super::pipeline::EmotionPipeline;
use crate::error::{PipelineError, Result};
use crate::models::{EmotionBertModel, EmotionCheckpoint};
use crate::pipelines::utils::{BasePipelineBuilder, DeviceRequest, StandardPipelineBuilder};
use tokenizers::Tokenizer;

crate::pipelines::utils::impl_device_methods!(delegated inner: EmotionPipelineBuilder<M: EmotionClassificationModel>);

/// Number of emotions a pipeline reports unless told otherwise.
pub const DEFAULT_TOP_K: usize = 3;

/// Builder for creating [`EmotionPipeline`] instances.
///
/// Use [`Self::go_emotion`] or [`Self::checkpoint`] as the entry point.
///
/// # Examples
///
/// ```rust,no_run
/// # use friday_mood::emotion::EmotionPipelineBuilder;
/// # fn main() -> friday_mood::error::Result<()> {
/// let pipeline = EmotionPipelineBuilder::go_emotion()
///     .cuda(0)
///     .top_k(5)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct EmotionPipelineBuilder<M: EmotionClassificationModel> {
    inner: StandardPipelineBuilder<M::Options>,
    top_k: usize,
}

impl<M: EmotionClassificationModel> EmotionPipelineBuilder<M> {
    /// Creates a builder for any [`EmotionClassificationModel`].
    pub fn new(options: M::Options) -> Self {
        Self {
            inner: StandardPipelineBuilder::new(options),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// How many emotions each run returns (default 3).
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `top_k` is zero, or if model loading or device
    /// initialization fails.
    pub fn build(self) -> Result<EmotionPipeline<M>> {
        if self.top_k == 0 {
            return Err(PipelineError::Config("top_k must be at least 1".into()));
        }
        BasePipelineBuilder::build(self)
    }
}

impl<M: EmotionClassificationModel> BasePipelineBuilder<M> for EmotionPipelineBuilder<M> {
    type Pipeline = EmotionPipeline<M>;
    type Options = M::Options;

    fn options(&self) -> &Self::Options {
        &self.inner.options
    }

    fn device_request(&self) -> &DeviceRequest {
        &self.inner.device_request
    }

    fn create_model(options: Self::Options, device: candle_core::Device) -> Result<M> {
        M::new(options, device)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        M::get_tokenizer(options)
    }

    fn construct_pipeline(
        &self,
        model: Arc<M>,
        tokenizer: Arc<Tokenizer>,
    ) -> Result<Self::Pipeline> {
        Ok(EmotionPipeline {
            model,
            tokenizer,
            top_k: self.top_k,
        })
    }
}

impl EmotionPipelineBuilder<EmotionBertModel> {
    /// Creates a builder for `bhadresh-savani/bert-base-go-emotion`.
    pub fn go_emotion() -> Self {
        Self::new(EmotionCheckpoint::GoEmotion)
    }

    /// Creates a builder for any BERT emotion checkpoint.
    pub fn checkpoint(checkpoint: EmotionCheckpoint) -> Self {
        Self::new(checkpoint)
    }
}

use std::sync::Arc;

use super::{build_cache_key, tokenizer_cache_key, DeviceRequest};
use crate::error::Result;
use crate::pipelines::cache::{global_cache, ModelOptions};
use tokenizers::Tokenizer;
use tracing::info;

pub trait BasePipelineBuilder<M>: Sized
where
    M: Send + Sync + 'static,
{
    type Pipeline;

    type Options: ModelOptions + Clone;

    fn options(&self) -> &Self::Options;

    fn device_request(&self) -> &DeviceRequest;

    fn create_model(options: Self::Options, device: candle_core::Device) -> Result<M>;

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    fn construct_pipeline(&self, model: Arc<M>, tokenizer: Arc<Tokenizer>)
        -> Result<Self::Pipeline>;

    /// Resolves the device, then loads model and tokenizer through the global
    /// cache. Only the first build for a given checkpoint and device loads the model;
    /// the tokenizer is shared across devices.
    fn build(self) -> Result<Self::Pipeline> {
        let device = self.device_request().clone().resolve()?;

        let key = build_cache_key(self.options(), &device);

        let model = global_cache().get_or_create(&key, || {
            info!(model = %key, "loading model");
            Self::create_model(self.options().clone(), device.clone())
        })?;

        let tokenizer_key = tokenizer_cache_key::<M, _>(self.options());
        let tokenizer = global_cache().get_or_create(&tokenizer_key, || {
            Self::get_tokenizer(self.options().clone())
        })?;

        self.construct_pipeline(model, tokenizer)
    }
}

pub struct StandardPipelineBuilder<Opts> {
    pub(crate) options: Opts,
    pub(crate) device_request: DeviceRequest,
}

impl<Opts> StandardPipelineBuilder<Opts> {
    pub fn new(options: Opts) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Cpu,
        }
    }
}

impl<Opts> StandardPipelineBuilder<Opts> {
    pub(crate) fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

//! FRIDAY mood predictor.
//!
//! Classifies the emotion of a line of text with a pretrained BERT model run
//! locally through [Candle](https://github.com/huggingface/candle), then answers
//! with a canned reply for the strongest emotion.
//!
//! ```rust,no_run
//! use friday_mood::emotion::EmotionPipelineBuilder;
//! use friday_mood::reply::ReplyTable;
//!
//! # fn main() -> friday_mood::error::Result<()> {
//! let pipeline = EmotionPipelineBuilder::go_emotion().build()?;
//! let output = pipeline.run("I am so happy today 😄")?;
//!
//! if let Some(top) = output.top() {
//!     println!("{}", ReplyTable::friday().respond(top));
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;
pub mod normalize;
pub mod reply;
pub mod shell;

pub use pipelines::emotion;

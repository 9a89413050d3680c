//! Emotion classification pipeline.
//!
//! Scores text against the emotion vocabulary of a pretrained classifier and
//! returns the best labels with confidence scores. Emoji are rewritten as words
//! before the model sees the text.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use friday_mood::emotion::EmotionPipelineBuilder;
//!
//! # fn main() -> friday_mood::error::Result<()> {
//! let pipeline = EmotionPipelineBuilder::go_emotion().build()?;
//!
//! let output = pipeline.run("I am so happy today 😄")?;
//! // joy: 0.95, excitement: 0.02, ...
//! for e in &output.emotions {
//!     println!("{}: {:.2}", e.label, e.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! | Model | Labels | Builder Method |
//! |-------|--------|----------------|
//! | `bhadresh-savani/bert-base-go-emotion` | 28 GoEmotions labels | [`EmotionPipelineBuilder::go_emotion`] |
//! | any BERT classifier repo | from its `id2label` | [`EmotionPipelineBuilder::checkpoint`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::{EmotionBertModel, EmotionCheckpoint};
pub use crate::pipelines::cache::ModelOptions;
pub use crate::pipelines::stats::PipelineStats;
pub use builder::{EmotionPipelineBuilder, DEFAULT_TOP_K};
pub use model::EmotionClassificationModel;
pub use pipeline::{rank_top_k, EmotionPipeline, EmotionScore, Output};

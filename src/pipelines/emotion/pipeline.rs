use std::sync::Arc;

use super::model::EmotionClassificationModel;
use crate::error::{PipelineError, Result};
use crate::normalize::normalize;
use crate::pipelines::stats::PipelineStats;
use tokenizers::Tokenizer;
use tracing::debug;

// ============ Output types ============

/// One label of the model vocabulary with its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionScore {
    /// Emotion label (e.g., "joy", "sadness", "anger").
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// Output from [`EmotionPipeline::run`].
#[derive(Debug)]
pub struct Output {
    /// The text the model actually saw, after emoji normalization.
    pub text: String,
    /// Highest-scoring emotions, best first.
    pub emotions: Vec<EmotionScore>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

impl Output {
    /// The best emotion. `None` only for a model with an empty vocabulary.
    pub fn top(&self) -> Option<&EmotionScore> {
        self.emotions.first()
    }
}

/// Stable descending sort by score, truncated to `k`.
///
/// Equal scores keep the classifier's output order. NaN or infinite scores
/// and an empty top label are rejected instead of ranked.
pub fn rank_top_k(mut scores: Vec<EmotionScore>, k: usize) -> Result<Vec<EmotionScore>> {
    if let Some(bad) = scores.iter().find(|s| !s.score.is_finite()) {
        return Err(PipelineError::InvalidPrediction(format!(
            "Model returned non-finite score {} for label '{}'",
            bad.score, bad.label
        )));
    }

    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores.truncate(k);

    if scores.first().is_some_and(|top| top.label.is_empty()) {
        return Err(PipelineError::InvalidPrediction(
            "Model returned an empty top label".into(),
        ));
    }

    Ok(scores)
}

// ============ Pipeline ============

/// Emoji-aware emotion classification.
///
/// Construct with [`EmotionPipelineBuilder`](super::EmotionPipelineBuilder).
///
/// # Examples
///
/// ```rust,no_run
/// # use friday_mood::emotion::EmotionPipelineBuilder;
/// # fn main() -> friday_mood::error::Result<()> {
/// let pipeline = EmotionPipelineBuilder::go_emotion().build()?;
///
/// let output = pipeline.run("I am so happy today 😄")?;
/// for e in &output.emotions {
///     println!("{}: {:.2}", e.label, e.score);
/// }
/// # Ok(())
/// # }
/// ```
pub struct EmotionPipeline<M: EmotionClassificationModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Arc<Tokenizer>,
    pub(crate) top_k: usize,
}

impl<M: EmotionClassificationModel> EmotionPipeline<M> {
    /// Normalizes `text`, scores it once and returns the top emotions.
    pub fn run(&self, text: &str) -> Result<Output> {
        let stats_builder = PipelineStats::start();

        let text = normalize(text);
        debug!(normalized = %text, "classifying");

        let scores = self.model.predict_scores(&self.tokenizer, &text)?;
        let emotions = rank_top_k(scores, self.top_k)?;

        let stats = stats_builder.finish(1);
        debug!(elapsed = ?stats.total_time, "classified");

        Ok(Output {
            text,
            emotions,
            stats,
        })
    }

    /// How many emotions [`run`](Self::run) returns at most.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The model's full label vocabulary.
    pub fn labels(&self) -> &[String] {
        self.model.labels()
    }

    /// The shared model behind this pipeline.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f32)]) -> Vec<EmotionScore> {
        pairs
            .iter()
            .map(|(label, score)| EmotionScore {
                label: label.to_string(),
                score: *score,
            })
            .collect()
    }

    fn labels(ranked: &[EmotionScore]) -> Vec<&str> {
        ranked.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let ranked = rank_top_k(
            scores(&[
                ("anger", 0.05),
                ("joy", 0.7),
                ("neutral", 0.1),
                ("love", 0.15),
            ]),
            3,
        )
        .unwrap();
        assert_eq!(labels(&ranked), vec!["joy", "love", "neutral"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn ties_keep_model_order() {
        let ranked = rank_top_k(
            scores(&[("fear", 0.2), ("sadness", 0.4), ("anger", 0.2), ("joy", 0.2)]),
            3,
        )
        .unwrap();
        assert_eq!(labels(&ranked), vec!["sadness", "fear", "anger"]);
    }

    #[test]
    fn small_vocabulary_returns_fewer() {
        let ranked = rank_top_k(scores(&[("neg", 0.3), ("pos", 0.7)]), 3).unwrap();
        assert_eq!(labels(&ranked), vec!["pos", "neg"]);
    }

    #[test]
    fn nan_scores_are_rejected() {
        let err = rank_top_k(scores(&[("joy", f32::NAN), ("anger", 0.5)]), 3).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPrediction(_)));
    }

    #[test]
    fn empty_top_label_is_rejected() {
        let err = rank_top_k(scores(&[("", 0.9), ("anger", 0.1)]), 3).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPrediction(_)));
    }

    #[test]
    fn empty_label_below_top_is_kept() {
        let ranked = rank_top_k(scores(&[("joy", 0.9), ("", 0.1)]), 3).unwrap();
        assert_eq!(ranked.len(), 2);
    }
}

use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{linear, ops::sigmoid, ops::softmax, Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use std::collections::HashMap;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::loaders::{HfLoader, TokenizerLoader};
use crate::models::EmotionCheckpoint;
use crate::pipelines::emotion::pipeline::EmotionScore;

/// How logits become per-label scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFunction {
    /// Mutually exclusive labels; scores sum to 1.
    Softmax,
    /// Independent per-label probabilities.
    Sigmoid,
}

impl ScoreFunction {
    /// Same rule as the Transformers text-classification pipeline.
    pub fn from_config(problem_type: Option<&str>, num_labels: usize) -> Self {
        if problem_type == Some("multi_label_classification") || num_labels == 1 {
            ScoreFunction::Sigmoid
        } else {
            ScoreFunction::Softmax
        }
    }
}

/// BERT encoder with pooler and linear head (`BertForSequenceClassification`).
pub struct EmotionBertModel {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    labels: Vec<String>,
    score_fn: ScoreFunction,
    device: Device,
}

impl EmotionBertModel {
    /// Downloads (or reuses the hub cache for) `checkpoint` and loads it onto `device`.
    pub fn new(checkpoint: EmotionCheckpoint, device: Device) -> Result<Self> {
        let repo_id = checkpoint.repo_id();
        let (config, class_cfg, vb) = load_classifier_model(repo_id, &device)?;
        let model = Self::from_parts(&config, class_cfg, vb, device)?;

        info!(
            model = repo_id,
            labels = model.labels.len(),
            score_fn = ?model.score_fn,
            device = ?model.device.location(),
            "emotion model loaded"
        );

        Ok(model)
    }

    fn from_parts(
        config: &Config,
        class_cfg: ClassifierConfigJson,
        vb: VarBuilder,
        device: Device,
    ) -> Result<Self> {
        let labels = labels_from_id2label(&class_cfg.id2label)?;
        let score_fn = ScoreFunction::from_config(class_cfg.problem_type.as_deref(), labels.len());

        let bert = BertModel::load(vb.pp("bert"), config)?;
        let pooler = linear(
            class_cfg.hidden_size,
            class_cfg.hidden_size,
            vb.pp("bert.pooler.dense"),
        )?;
        let classifier = linear(class_cfg.hidden_size, labels.len(), vb.pp("classifier"))?;

        Ok(Self {
            bert,
            pooler,
            classifier,
            labels,
            score_fn,
            device,
        })
    }

    /// Device the weights live on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Label vocabulary from `id2label`, in id order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Scores every label, in label-id order.
    pub fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<EmotionScore>> {
        let tokens = tokenizer.encode(text, true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                &text.chars().take(50).collect::<String>(),
                e
            ))
        })?;

        let input_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .bert
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;

        let probs = match self.score_fn {
            ScoreFunction::Softmax => softmax(&logits, D::Minus1)?,
            ScoreFunction::Sigmoid => sigmoid(&logits)?,
        };
        let probs_vec = probs.squeeze(0)?.to_vec1::<f32>()?;

        if probs_vec.len() != self.labels.len() {
            return Err(PipelineError::Unexpected(format!(
                "Model returned {} scores for {} labels",
                probs_vec.len(),
                self.labels.len()
            )));
        }
        debug!(tokens = tokens.len(), "scored text");

        Ok(self
            .labels
            .iter()
            .zip(probs_vec)
            .map(|(label, score)| EmotionScore {
                label: label.clone(),
                score,
            })
            .collect())
    }

    /// Tokenizer for `checkpoint`, truncating to its position limit.
    pub fn get_tokenizer(checkpoint: EmotionCheckpoint) -> Result<Tokenizer> {
        let repo_id = checkpoint.repo_id();
        let class_cfg = load_classifier_config(repo_id)?;
        TokenizerLoader::new(repo_id, class_cfg.max_position_embeddings).load()
    }
}

impl crate::pipelines::emotion::model::EmotionClassificationModel for EmotionBertModel {
    type Options = EmotionCheckpoint;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        EmotionBertModel::new(options, device)
    }

    fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<EmotionScore>> {
        self.predict_scores(tokenizer, text)
    }

    fn labels(&self) -> &[String] {
        self.labels()
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        Self::get_tokenizer(options)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

#[derive(Debug, Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
    #[serde(default)]
    problem_type: Option<String>,
    hidden_size: usize,
    #[serde(default = "default_max_positions")]
    max_position_embeddings: usize,
}

fn default_max_positions() -> usize {
    512
}

fn load_classifier_config(repo_id: &str) -> Result<ClassifierConfigJson> {
    let config_path = HfLoader::new(repo_id, "config.json").load()?;
    let config_str = std::fs::read_to_string(&config_path)?;
    Ok(serde_json::from_str(&config_str)?)
}

/// Orders `id2label` by id; ids must cover `0..n` exactly.
fn labels_from_id2label(id2label: &HashMap<String, String>) -> Result<Vec<String>> {
    if id2label.is_empty() {
        return Err(PipelineError::Config(
            "Model config has no id2label; not a classification checkpoint".into(),
        ));
    }

    let mut labels: Vec<Option<String>> = vec![None; id2label.len()];
    for (id, label) in id2label {
        let idx = id
            .parse::<usize>()
            .ok()
            .filter(|&idx| idx < id2label.len())
            .ok_or_else(|| {
                PipelineError::Config(format!(
                    "id2label key '{id}' is not an index below {}",
                    id2label.len()
                ))
            })?;
        labels[idx] = Some(label.clone());
    }

    labels
        .into_iter()
        .enumerate()
        .map(|(idx, label)| {
            label.ok_or_else(|| PipelineError::Config(format!("id2label is missing id {idx}")))
        })
        .collect()
}

fn load_classifier_model(
    repo_id: &str,
    device: &Device,
) -> Result<(Config, ClassifierConfigJson, VarBuilder<'static>)> {
    let config_path = HfLoader::new(repo_id, "config.json").load()?;
    let weights_path = HfLoader::new(repo_id, "model.safetensors")
        .load()
        .or_else(|_| HfLoader::new(repo_id, "pytorch_model.bin").load())?;

    let config_str = std::fs::read_to_string(&config_path)?;
    let config: Config = serde_json::from_str(&config_str)?;
    let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_str)?;

    let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
    } else {
        VarBuilder::from_pth(&weights_path, DType::F32, device)?
    };

    Ok((config, class_cfg, vb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::tests::{tokenizer_from_vocab, write_vocab};

    const MAX_POSITIONS: usize = 16;

    /// One-layer BERT with every weight zero: logits are all 0, so the score
    /// function alone decides the output.
    fn zero_model(id2label: &str, problem_type: Option<&str>) -> EmotionBertModel {
        let problem_type = problem_type.map_or("null".to_string(), |p| format!("\"{p}\""));
        let config_str = format!(
            r#"{{
                "vocab_size": 8,
                "hidden_size": 4,
                "num_hidden_layers": 1,
                "num_attention_heads": 2,
                "intermediate_size": 8,
                "hidden_act": "gelu",
                "hidden_dropout_prob": 0.1,
                "max_position_embeddings": {MAX_POSITIONS},
                "type_vocab_size": 2,
                "initializer_range": 0.02,
                "layer_norm_eps": 1e-12,
                "pad_token_id": 0,
                "problem_type": {problem_type},
                "id2label": {id2label}
            }}"#
        );
        let config: Config = serde_json::from_str(&config_str).unwrap();
        let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_str).unwrap();

        let device = Device::Cpu;
        let vb = VarBuilder::zeros(DType::F32, &device);
        EmotionBertModel::from_parts(&config, class_cfg, vb, device).unwrap()
    }

    fn tiny_tokenizer(name: &str) -> Tokenizer {
        let vocab = write_vocab(
            name,
            &["[PAD]", "[UNK]", "[CLS]", "[SEP]", "i", "am", "happy", "la"],
        );
        tokenizer_from_vocab(&vocab, MAX_POSITIONS)
    }

    const FIVE_LABELS: &str =
        r#"{"0": "anger", "1": "fear", "2": "joy", "3": "sadness", "4": "neutral"}"#;

    #[test]
    fn softmax_scores_cover_every_label_and_sum_to_one() {
        let model = zero_model(FIVE_LABELS, None);
        let scores = model
            .predict_scores(&tiny_tokenizer("softmax"), "i am happy")
            .unwrap();

        assert_eq!(scores.len(), model.labels().len());
        let labels: Vec<&str> = scores.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["anger", "fear", "joy", "sadness", "neutral"]);

        let sum: f32 = scores.iter().map(|s| s.score).sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum = {sum}");
        assert!(scores.iter().all(|s| (s.score - 0.2).abs() < 1e-5));
    }

    #[test]
    fn multi_label_checkpoint_uses_sigmoid() {
        let model = zero_model(FIVE_LABELS, Some("multi_label_classification"));
        let scores = model
            .predict_scores(&tiny_tokenizer("sigmoid"), "i am happy")
            .unwrap();

        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| (s.score - 0.5).abs() < 1e-5));
    }

    #[test]
    fn single_label_checkpoint_uses_sigmoid() {
        let model = zero_model(r#"{"0": "joy"}"#, None);
        let scores = model
            .predict_scores(&tiny_tokenizer("single"), "i am happy")
            .unwrap();

        assert_eq!(scores.len(), 1);
        assert!((scores[0].score - 0.5).abs() < 1e-5);
    }

    #[test]
    fn input_longer_than_position_limit_is_truncated() {
        let model = zero_model(FIVE_LABELS, None);
        let scores = model
            .predict_scores(&tiny_tokenizer("long"), &"la ".repeat(200))
            .unwrap();

        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| s.score.is_finite()));
    }

    fn id2label(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, label)| (id.to_string(), label.to_string()))
            .collect()
    }

    #[test]
    fn labels_follow_id_order() {
        let map = id2label(&[("2", "joy"), ("0", "admiration"), ("1", "anger")]);
        let labels = labels_from_id2label(&map).unwrap();
        assert_eq!(labels, vec!["admiration", "anger", "joy"]);
    }

    #[test]
    fn gaps_in_ids_are_rejected() {
        let map = id2label(&[("0", "joy"), ("2", "anger")]);
        assert!(matches!(
            labels_from_id2label(&map),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        let map = id2label(&[("zero", "joy")]);
        assert!(labels_from_id2label(&map).is_err());
    }

    #[test]
    fn empty_id2label_is_not_a_classifier() {
        assert!(labels_from_id2label(&HashMap::new()).is_err());
    }

    #[test]
    fn score_function_matches_problem_type() {
        assert_eq!(ScoreFunction::from_config(None, 28), ScoreFunction::Softmax);
        assert_eq!(
            ScoreFunction::from_config(Some("single_label_classification"), 28),
            ScoreFunction::Softmax
        );
        assert_eq!(
            ScoreFunction::from_config(Some("multi_label_classification"), 28),
            ScoreFunction::Sigmoid
        );
        assert_eq!(ScoreFunction::from_config(None, 1), ScoreFunction::Sigmoid);
    }

    #[test]
    fn classifier_config_defaults() {
        let cfg: ClassifierConfigJson =
            serde_json::from_str(r#"{"hidden_size": 768, "id2label": {"0": "joy"}}"#).unwrap();
        assert_eq!(cfg.max_position_embeddings, 512);
        assert!(cfg.problem_type.is_none());
        assert_eq!(cfg.id2label.len(), 1);
    }
}

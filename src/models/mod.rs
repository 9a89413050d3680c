pub mod bert;

pub use bert::EmotionBertModel;

/// Pretrained emotion checkpoints on the Hugging Face Hub.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EmotionCheckpoint {
    /// `bhadresh-savani/bert-base-go-emotion`: BERT base fine-tuned on GoEmotions (28 labels).
    #[default]
    GoEmotion,
    /// Any BERT sequence-classification repo that ships `id2label` in its config.
    Repo(String),
}

impl EmotionCheckpoint {
    /// Hub repository id.
    pub fn repo_id(&self) -> &str {
        match self {
            EmotionCheckpoint::GoEmotion => "bhadresh-savani/bert-base-go-emotion",
            EmotionCheckpoint::Repo(repo) => repo,
        }
    }
}

impl std::fmt::Display for EmotionCheckpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.repo_id())
    }
}

impl crate::pipelines::cache::ModelOptions for EmotionCheckpoint {
    fn cache_key(&self) -> String {
        self.repo_id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::cache::ModelOptions;

    #[test]
    fn go_emotion_is_default() {
        assert_eq!(EmotionCheckpoint::default(), EmotionCheckpoint::GoEmotion);
        assert_eq!(
            EmotionCheckpoint::GoEmotion.to_string(),
            "bhadresh-savani/bert-base-go-emotion"
        );
    }

    #[test]
    fn custom_repo_keys_by_repo_id() {
        let checkpoint = EmotionCheckpoint::Repo("org/emotion-bert".into());
        assert_eq!(checkpoint.cache_key(), "org/emotion-bert");
    }
}

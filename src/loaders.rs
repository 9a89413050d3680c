use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};

const MAX_ATTEMPTS: u32 = 3;

/// Fetches one file of a Hub model repo, reusing the local cache when present.
#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(true)
            .build()
            .map_err(|e| {
                PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
            })?;
        let hf_api = hf_api.model(self.repo.clone());

        let path = self.fetch_with_retry(|| hf_api.get(self.filename.as_str()))?;
        debug!(repo = %self.repo, file = %self.filename, path = %path.display(), "resolved hub file");
        Ok(path)
    }

    /// Runs `fetch` until it succeeds, fails for a reason other than hub cache
    /// lock contention, or has been tried `MAX_ATTEMPTS` times.
    fn fetch_with_retry<T, E, F>(&self, mut fetch: F) -> Result<T>
    where
        E: std::fmt::Display,
        F: FnMut() -> std::result::Result<T, E>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let error_msg = match fetch() {
                Ok(value) => return Ok(value),
                Err(e) => e.to_string(),
            };

            if !error_msg.contains("Lock acquisition failed") || attempt == MAX_ATTEMPTS {
                return Err(PipelineError::Download(format!(
                    "Failed to download '{}' from '{}' after {} attempt(s): {}",
                    self.filename, self.repo, attempt, error_msg
                )));
            }

            let wait_time = Duration::from_millis(100 * (1 << (attempt - 1)));
            warn!(
                repo = %self.repo,
                file = %self.filename,
                ?wait_time,
                "hub cache locked, retrying"
            );
            std::thread::sleep(wait_time);
        }
    }
}

#[derive(Deserialize)]
struct TokenizerConfigJson {
    #[serde(default = "default_lowercase")]
    do_lower_case: bool,
}

fn default_lowercase() -> bool {
    true
}

/// Loads the tokenizer of a BERT checkpoint.
///
/// Prefers `tokenizer.json`. Older checkpoints only ship `vocab.txt`, in which
/// case an equivalent WordPiece tokenizer is assembled from it.
#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub repo: String,
    pub max_length: usize,
}

impl TokenizerLoader {
    pub fn new(repo: &str, max_length: usize) -> Self {
        Self {
            repo: repo.into(),
            max_length,
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let mut tokenizer = match HfLoader::new(&self.repo, "tokenizer.json").load() {
            Ok(path) => {
                let path_str = path.display().to_string();
                Tokenizer::from_file(&path).map_err(|e| {
                    PipelineError::Tokenization(format!(
                        "Failed to load tokenizer from '{}': {}",
                        path_str, e
                    ))
                })?
            }
            Err(e) => {
                debug!(repo = %self.repo, error = %e, "no tokenizer.json, building from vocab.txt");
                self.load_wordpiece()?
            }
        };

        truncate_to(&mut tokenizer, self.max_length)?;

        info!(repo = %self.repo, max_length = self.max_length, "tokenizer ready");
        Ok(tokenizer)
    }

    fn load_wordpiece(&self) -> Result<Tokenizer> {
        let vocab_path = HfLoader::new(&self.repo, "vocab.txt").load()?;
        let lowercase = HfLoader::new(&self.repo, "tokenizer_config.json")
            .load()
            .ok()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|content| serde_json::from_str::<TokenizerConfigJson>(&content).ok())
            .map_or(true, |config| config.do_lower_case);

        let vocab = vocab_path.to_str().ok_or_else(|| {
            PipelineError::Tokenization(format!(
                "Vocabulary path is not valid UTF-8: {}",
                vocab_path.display()
            ))
        })?;
        let wordpiece = wordpiece_from_file(vocab)?;
        bert_tokenizer(wordpiece, lowercase)
    }
}

pub(crate) fn wordpiece_from_file(vocab: &str) -> Result<WordPiece> {
    WordPiece::from_file(vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| {
            PipelineError::Tokenization(format!(
                "Failed to load WordPiece vocabulary from '{vocab}': {e}"
            ))
        })
}

/// Wraps `wordpiece` in the normalizer, pre-tokenizer and `[CLS] .. [SEP]`
/// template that `BertTokenizer` applies.
pub(crate) fn bert_tokenizer(wordpiece: WordPiece, lowercase: bool) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::new(wordpiece);
    let cls = special_token_id(&tokenizer, "[CLS]")?;
    let sep = special_token_id(&tokenizer, "[SEP]")?;

    tokenizer
        .with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase)))
        .with_pre_tokenizer(Some(BertPreTokenizer))
        .with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), sep),
            ("[CLS]".to_string(), cls),
        )));

    Ok(tokenizer)
}

/// Longer inputs are cut to `max_length` tokens, special tokens included.
pub(crate) fn truncate_to(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| PipelineError::Tokenization(format!("Failed to configure truncation: {e}")))?;
    Ok(())
}

fn special_token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32> {
    tokenizer.token_to_id(token).ok_or_else(|| {
        PipelineError::Tokenization(format!("Vocabulary is missing the {token} token"))
    })
}

//! `friday`: interactive mood prompt.
//!
//! ```text
//! friday                          # GoEmotions BERT on CPU
//! friday --cuda 0 --top-k 5 -v
//! friday --model org/other-emotion-bert
//! ```

use std::io;

use anyhow::Context;
use clap::Parser;
use friday_mood::emotion::{
    EmotionBertModel, EmotionCheckpoint, EmotionPipeline, EmotionPipelineBuilder, DEFAULT_TOP_K,
};
use friday_mood::shell::Shell;
use once_cell::unsync::OnceCell;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// FRIDAY mood predictor: type a message, get its top emotions and a reply.
#[derive(Parser)]
#[command(name = "friday")]
#[command(version)]
#[command(about = "Detect the mood of what you type")]
struct Cli {
    /// Hugging Face repo of a BERT emotion classifier
    #[arg(long, default_value = "bhadresh-savani/bert-base-go-emotion")]
    model: String,

    /// Run on this CUDA device instead of the CPU
    #[arg(long, value_name = "ORDINAL")]
    cuda: Option<usize>,

    /// Number of emotions to show
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn checkpoint(&self) -> EmotionCheckpoint {
        if self.model == EmotionCheckpoint::GoEmotion.repo_id() {
            EmotionCheckpoint::GoEmotion
        } else {
            EmotionCheckpoint::Repo(self.model.clone())
        }
    }

    fn builder(&self) -> EmotionPipelineBuilder<EmotionBertModel> {
        let builder = EmotionPipelineBuilder::checkpoint(self.checkpoint()).top_k(self.top_k);
        match self.cuda {
            Some(index) => builder.cuda(index),
            None => builder.cpu(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .init();

    // Loaded on the first non-blank message, then reused for the whole session.
    let pipeline: OnceCell<EmotionPipeline<EmotionBertModel>> = OnceCell::new();

    let mut shell = Shell::new(io::stdin().lock(), io::stdout().lock());
    shell.banner()?;
    shell
        .run(|text| {
            let pipeline = pipeline.get_or_try_init(|| {
                info!(model = %cli.model, "loading emotion pipeline");
                cli.builder().build()
            })?;
            pipeline.run(text)
        })
        .with_context(|| format!("mood analysis with '{}' failed", cli.model))?;

    Ok(())
}

//! Line-oriented mood prompt.
//!
//! Each turn reads one line. Pressing Enter is the trigger; blank lines are
//! ignored and never reach the classifier.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::emotion::{EmotionScore, Output};
use crate::error::Result;
use crate::reply::{capitalize, ReplyTable};

/// Page title shown once at startup.
pub const TITLE: &str = "🤖 FRIDAY Mood Predictor (Text Edition)";
/// Prompt shown before every turn.
pub const PROMPT: &str = "Type your message here:";

const EXIT_COMMANDS: &[&str] = &["quit", "exit"];

/// Where the shell is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    /// Between turns.
    Idle,
    /// Prompt shown, waiting for a line.
    AwaitingAction,
    /// The last line was classified and rendered.
    Analyzed,
}

/// Result of a single [`Shell::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Blank line; nothing was classified.
    Skipped,
    /// A line was classified and rendered.
    Analyzed,
    /// End of input or an exit command.
    Finished,
}

/// The most recent analyzed turn.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Line as typed.
    pub input: String,
    /// Text the classifier saw.
    pub normalized: String,
    /// Ranked emotions, best first.
    pub emotions: Vec<EmotionScore>,
}

/// Interactive prompt over any reader/writer pair.
pub struct Shell<R, W> {
    input: R,
    output: W,
    replies: &'static ReplyTable,
    state: ShellState,
    last_turn: Option<Turn>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// A shell answering with FRIDAY's reply table.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            replies: ReplyTable::friday(),
            state: ShellState::Idle,
            last_turn: None,
        }
    }

    /// Swaps the reply table.
    pub fn with_replies(mut self, replies: &'static ReplyTable) -> Self {
        self.replies = replies;
        self
    }

    /// Current turn state.
    pub fn state(&self) -> ShellState {
        self.state
    }

    /// The last analyzed turn, if any.
    pub fn last_turn(&self) -> Option<&Turn> {
        self.last_turn.as_ref()
    }

    /// Writes the title and a one-line usage hint.
    pub fn banner(&mut self) -> Result<()> {
        writeln!(self.output, "{TITLE}")?;
        writeln!(
            self.output,
            "Type your message or command below and FRIDAY will detect your mood!"
        )?;
        writeln!(self.output, "(press Enter to analyze, `quit` to leave)")?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Runs turns until end of input or an exit command.
    ///
    /// The first error from `analyze` or the writer ends the session.
    pub fn run<F>(&mut self, mut analyze: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<Output>,
    {
        while self.step(&mut analyze)? != Step::Finished {}
        Ok(())
    }

    /// Prompts, reads one line and, unless it is blank, analyzes and renders it.
    pub fn step<F>(&mut self, analyze: &mut F) -> Result<Step>
    where
        F: FnMut(&str) -> Result<Output>,
    {
        self.state = ShellState::AwaitingAction;
        write!(self.output, "{PROMPT} ")?;
        self.output.flush()?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            writeln!(self.output)?;
            self.state = ShellState::Idle;
            return Ok(Step::Finished);
        }

        // Invalid UTF-8 becomes U+FFFD instead of ending the session.
        let line = String::from_utf8_lossy(&buf);
        let text = line.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            self.state = ShellState::Idle;
            return Ok(Step::Skipped);
        }
        if EXIT_COMMANDS.contains(&text.trim()) {
            self.state = ShellState::Idle;
            return Ok(Step::Finished);
        }

        let output = analyze(text)?;
        debug!(elapsed = ?output.stats.total_time, "turn analyzed");

        write!(self.output, "{}", render(&output.emotions, self.replies))?;
        self.output.flush()?;

        self.last_turn = Some(Turn {
            input: text.to_string(),
            normalized: output.text,
            emotions: output.emotions,
        });
        self.state = ShellState::Analyzed;
        Ok(Step::Analyzed)
    }
}

/// Renders the ranked emotions followed by FRIDAY's reply to the top one.
pub fn render(emotions: &[EmotionScore], replies: &ReplyTable) -> String {
    let mut out = String::from("\nTop Emotions\n");
    for e in emotions {
        out.push_str(&format!(
            "{} — Confidence: {:.2}\n",
            capitalize(&e.label),
            e.score
        ));
    }
    if let Some(top) = emotions.first() {
        out.push_str("---\n");
        out.push_str(&replies.respond(top));
        out.push('\n');
    }
    out.push('\n');
    out
}

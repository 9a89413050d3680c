//! FRIDAY's canned replies, keyed by emotion label.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::emotion::EmotionScore;

const FRIDAY_REPLIES: &[(&str, &str)] = &[
    ("joy", "You sound happy today 😄! Let's keep the energy up!"),
    ("sadness", "You seem a bit down 😢. Want me to play something relaxing?"),
    ("anger", "Whoa, you sound upset 😤. Let's calm down together."),
    ("love", "Aww ❤️ love is in the air!"),
    ("excitement", "That's awesome 🔥 You're pumped up!"),
    ("fear", "You sound worried 😟 — wanna talk about it?"),
    ("neutral", "Alright, staying balanced as always 😌."),
    ("optimism", "I like your positive vibe 🌞!"),
    ("remorse", "Hmm… sounds like regret 😔 — wanna move past it?"),
    ("nervousness", "Feeling anxious 😬? I got you, we'll handle it."),
];

static FRIDAY: Lazy<ReplyTable> = Lazy::new(|| ReplyTable::from_entries(FRIDAY_REPLIES));

/// Immutable label → reply map with a fallback for unknown labels.
#[derive(Debug, Clone, Default)]
pub struct ReplyTable {
    replies: HashMap<&'static str, &'static str>,
}

impl ReplyTable {
    /// FRIDAY's built-in table, built on first use.
    pub fn friday() -> &'static ReplyTable {
        &FRIDAY
    }

    /// Builds a table from `(label, reply)` pairs. Later duplicates win.
    pub fn from_entries(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            replies: entries.iter().copied().collect(),
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, label: &str) -> Option<&'static str> {
        self.replies.get(label).copied()
    }

    /// The table entry for `label`, or `I sense {label} 🧠`.
    pub fn reply_for<'a>(&self, label: &'a str) -> Cow<'a, str> {
        match self.get(label) {
            Some(reply) => Cow::Borrowed(reply),
            None => Cow::Owned(format!("I sense {label} 🧠")),
        }
    }

    /// Formats the two-line response for the top emotion.
    ///
    /// ```rust
    /// use friday_mood::emotion::EmotionScore;
    /// use friday_mood::reply::ReplyTable;
    ///
    /// let top = EmotionScore { label: "love".into(), score: 0.914 };
    /// assert_eq!(
    ///     ReplyTable::friday().respond(&top),
    ///     "Detected Emotion: Love (0.91)\nFRIDAY: Aww ❤️ love is in the air!"
    /// );
    /// ```
    pub fn respond(&self, top: &EmotionScore) -> String {
        format!(
            "Detected Emotion: {} ({:.2})\nFRIDAY: {}",
            capitalize(&top.label),
            top.score,
            self.reply_for(&top.label)
        )
    }

    /// Number of labels with a dedicated reply.
    pub fn len(&self) -> usize {
        self.replies.len()
    }

    /// True when every label falls back.
    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

/// First character uppercased, the rest lowercased.
pub(crate) fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(label: &str, score: f32) -> EmotionScore {
        EmotionScore {
            label: label.into(),
            score,
        }
    }

    #[test]
    fn joy_gets_its_table_reply() {
        let out = ReplyTable::friday().respond(&top("joy", 0.9731));
        assert_eq!(
            out,
            "Detected Emotion: Joy (0.97)\nFRIDAY: You sound happy today 😄! Let's keep the energy up!"
        );
    }

    #[test]
    fn every_table_reply_is_used_verbatim() {
        for (label, reply) in FRIDAY_REPLIES {
            let out = ReplyTable::friday().respond(&top(label, 0.5));
            assert!(out.ends_with(&format!("FRIDAY: {reply}")), "{label}");
        }
    }

    #[test]
    fn unknown_label_falls_back_with_its_name() {
        let out = ReplyTable::friday().respond(&top("surprise", 0.456));
        assert_eq!(
            out,
            "Detected Emotion: Surprise (0.46)\nFRIDAY: I sense surprise 🧠"
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(ReplyTable::friday().get("Joy").is_none());
        assert_eq!(ReplyTable::friday().reply_for("Joy"), "I sense Joy 🧠");
    }

    #[test]
    fn friday_table_has_ten_replies() {
        assert_eq!(ReplyTable::friday().len(), 10);
        assert!(ReplyTable::default().is_empty());
    }

    #[test]
    fn capitalize_matches_title_case_of_labels() {
        assert_eq!(capitalize("joy"), "Joy");
        assert_eq!(capitalize("NERVOUSNESS"), "Nervousness");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclair"), "Éclair");
    }

    #[test]
    fn score_renders_with_two_decimals() {
        let out = ReplyTable::friday().respond(&top("neutral", 1.0));
        assert!(out.starts_with("Detected Emotion: Neutral (1.00)\n"));
    }
}

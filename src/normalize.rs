//! Emoji-aware text cleanup applied before classification.
//!
//! The classifier was trained on plain text, so emoji glyphs are rewritten as
//! their CLDR names (`😄` → `grinning face with smiling eyes`).
//!
//! ```rust
//! use friday_mood::normalize::{demojize, normalize};
//!
//! assert_eq!(demojize("hi 😄"), "hi :grinning_face_with_smiling_eyes:");
//! assert_eq!(normalize(" hi 😄 "), "hi  grinning face with smiling eyes");
//! ```

use emojis::Emoji;

// Longest RGI sequences (families, kiss/couple with skin tones) are 10 code points.
const MAX_SEQUENCE_CHARS: usize = 16;

/// Replaces every emoji with a colon-delimited shortcode such as `:red_heart:`.
pub fn demojize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    replace_emoji(text, &mut out, |out, emoji| {
        out.push(':');
        out.push_str(&shortcode(emoji));
        out.push(':');
    });
    out
}

/// Demojizes `text`, turns the shortcode delimiters into spaces and trims.
///
/// Text without emoji comes back trimmed and otherwise unchanged. Never fails;
/// empty or whitespace-only input yields an empty string.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    replace_emoji(text, &mut out, |out, emoji| {
        let token = format!(":{}:", shortcode(emoji));
        out.push_str(&token.replace([':', '_'], " "));
    });
    out.trim().to_string()
}

fn replace_emoji(text: &str, out: &mut String, mut emit: impl FnMut(&mut String, &Emoji)) {
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        if let Some((emoji, len)) = match_emoji(rest) {
            emit(out, emoji);
            rest = &rest[len..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
}

/// Longest emoji at the start of `s`, with its byte length.
fn match_emoji(s: &str) -> Option<(&'static Emoji, usize)> {
    let first = s.chars().next()?;
    // ASCII only starts an emoji as a keycap base ("1\u{fe0f}\u{20e3}").
    if first.is_ascii() && !matches!(first, '#' | '*' | '0'..='9') {
        return None;
    }

    let ends: Vec<usize> = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take(MAX_SEQUENCE_CHARS)
        .collect();

    ends.into_iter()
        .rev()
        .filter(|&end| !first.is_ascii() || end > 1)
        .find_map(|end| emojis::get(&s[..end]).map(|emoji| (emoji, end)))
}

fn shortcode(emoji: &Emoji) -> String {
    emoji
        .name()
        .chars()
        .filter(|c| !matches!(c, ':' | ','))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

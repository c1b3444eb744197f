//! Inline markup – the small markdown subset accepted in free text.
//!
//! Two conventions are supported:
//! - `**bold**` spans become emphasized [`Run`]s
//! - a blank line (`\n\n`) separates paragraphs
//!
//! Both transforms are total: malformed markup (an unmatched `**`, an empty
//! `****`) is kept as literal text.

use serde::{Deserialize, Serialize};

/// A piece of inline text with a single emphasis state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strong: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: false,
        }
    }

    pub fn strong(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strong: true,
        }
    }
}

/// Split `text` into plain and emphasized runs.
///
/// A bold span is `**` + at least one non-`*` character + `**`. Adjacent
/// plain text is merged into a single run, and empty input yields no runs.
pub fn expand_bold(text: &str) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let close = match after_open.find("**") {
            Some(c) => c,
            None => break,
        };
        let inner = &after_open[..close];
        if inner.is_empty() || inner.contains('*') {
            // Not a valid span: keep the opening marker literally and move on.
            push_plain(&mut runs, &rest[..open + 2]);
            rest = after_open;
            continue;
        }
        push_plain(&mut runs, &rest[..open]);
        runs.push(Run::strong(inner));
        rest = &after_open[close + 2..];
    }
    push_plain(&mut runs, rest);
    runs
}

fn push_plain(runs: &mut Vec<Run>, text: &str) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if !last.strong => last.text.push_str(text),
        _ => runs.push(Run::plain(text)),
    }
}

/// Plain text of a run sequence, markers removed.
pub fn plain_text(runs: &[Run]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Split on blank-line paragraph markers, trimming and dropping empties.
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Like [`paragraphs`], but falls back to single newlines when the text has
/// no blank-line markers.
pub fn paragraphs_lenient(text: &str) -> Vec<&str> {
    if text.contains("\n\n") {
        return paragraphs(text);
    }
    text.lines()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_spans_become_strong_runs() {
        let runs = expand_bold("Deals **2d6** fire damage");
        assert_eq!(
            runs,
            vec![
                Run::plain("Deals "),
                Run::strong("2d6"),
                Run::plain(" fire damage"),
            ]
        );
    }

    #[test]
    fn unmatched_marker_is_literal() {
        let runs = expand_bold("a ** b");
        assert_eq!(runs, vec![Run::plain("a ** b")]);
    }

    #[test]
    fn empty_span_is_literal() {
        assert_eq!(plain_text(&expand_bold("x****y")), "x****y");
    }

    #[test]
    fn leading_and_trailing_bold() {
        let runs = expand_bold("**Sneak Attack** and **Cunning Action**");
        assert_eq!(runs.len(), 3);
        assert!(runs[0].strong);
        assert!(!runs[1].strong);
        assert!(runs[2].strong);
    }

    #[test]
    fn empty_input_has_no_runs() {
        assert!(expand_bold("").is_empty());
    }

    #[test]
    fn splits_paragraphs_on_blank_lines() {
        let text = "First part.\n\n  Second part.\n\n\n\nThird.";
        assert_eq!(paragraphs(text), vec!["First part.", "Second part.", "Third."]);
    }

    #[test]
    fn lenient_paragraphs_fall_back_to_lines() {
        assert_eq!(paragraphs_lenient("one\ntwo\n"), vec!["one", "two"]);
        assert_eq!(paragraphs_lenient("one\ntwo\n\nthree"), vec!["one\ntwo", "three"]);
    }
}

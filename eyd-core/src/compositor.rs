//! # Text compositor
//!
//! Pure functions turning a source text and a [`CorrectionBatch`] into the
//! two derived texts shown to the user:
//!
//! - the *final* text, with only accepted corrections applied, and
//! - the *preview* markup, with every suggestion marked regardless of the
//!   decision on it.
//!
//! Corrections are applied strictly in batch order, each one replacing the
//! first occurrence of its `original` in the text as already modified by the
//! corrections before it. A correction whose `original` no longer occurs is
//! skipped and logged at debug level.

use crate::correction::{Correction, CorrectionBatch};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Default CSS class wrapped around suggestions in the preview.
pub const DEFAULT_SUGGESTION_CLASS: &str = "suggestion";

/// Default markup substituted for line breaks in the preview.
pub const DEFAULT_LINE_BREAK: &str = "<br/>";

/// Markup settings for [`compose_preview_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewOptions {
    /// Class of the `<span>` wrapped around each suggestion
    pub suggestion_class: String,
    /// Markup that replaces each `\n` of the source
    pub line_break: String,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            suggestion_class: DEFAULT_SUGGESTION_CLASS.to_string(),
            line_break: DEFAULT_LINE_BREAK.to_string(),
        }
    }
}

/// Entity for a markup-significant character, if `ch` is one.
fn entity(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#039;"),
        _ => None,
    }
}

/// Escape the five markup-significant characters of `text`.
///
/// # Example
///
/// ```rust
/// use eyd_core::compositor::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">'&'</a>"#),
///            "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut out = Markup::default();
    out.push_escaped(text);
    out.text
}

/// Preview text under construction.
///
/// `atoms` are the byte ranges that a match must never split: entities
/// produced by escaping and the tags wrapped around suggestions. They are
/// disjoint and kept sorted by start.
#[derive(Debug, Default)]
struct Markup {
    text: String,
    atoms: Vec<Range<usize>>,
}

impl Markup {
    fn push_escaped(&mut self, raw: &str) {
        for ch in raw.chars() {
            match entity(ch) {
                Some(escaped) => self.push_atom(escaped),
                None => self.text.push(ch),
            }
        }
    }

    fn push_atom(&mut self, atom: &str) {
        let start = self.text.len();
        self.text.push_str(atom);
        self.atoms.push(start..self.text.len());
    }

    /// Whether `pos` lies strictly inside an atom.
    fn inside_atom(&self, pos: usize) -> bool {
        let next = self.atoms.partition_point(|r| r.start < pos);
        next > 0 && pos < self.atoms[next - 1].end
    }

    fn splits_atom(&self, start: usize, end: usize) -> bool {
        self.inside_atom(start) || self.inside_atom(end)
    }

    /// First occurrence of `needle` that does not cut through an atom.
    fn find(&self, needle: &str) -> Option<usize> {
        let mut from = 0;
        while let Some(offset) = self.text[from..].find(needle) {
            let start = from + offset;
            if !self.splits_atom(start, start + needle.len()) {
                return Some(start);
            }
            from = start + self.text[start..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }

    /// Replace `start..end` with `fragment`, keeping atom ranges in step.
    fn splice(&mut self, start: usize, end: usize, fragment: Markup) {
        let inserted = fragment.text.len();
        self.text.replace_range(start..end, &fragment.text);
        self.atoms.retain(|r| r.end <= start || r.start >= end);
        for r in &mut self.atoms {
            if r.start >= end {
                *r = r.start - (end - start) + inserted..r.end - (end - start) + inserted;
            }
        }
        let at = self.atoms.partition_point(|r| r.start < start);
        self.atoms.splice(
            at..at,
            fragment.atoms.into_iter().map(|r| r.start + start..r.end + start),
        );
    }
}

/// Replace the first occurrence of `needle` in `text`.
///
/// Returns `false`, leaving `text` as is, when `needle` is empty or absent.
fn replace_first(text: &mut String, needle: &str, replacement: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    match text.find(needle) {
        Some(start) => {
            text.replace_range(start..start + needle.len(), replacement);
            true
        }
        None => false,
    }
}

fn log_skip(correction: &Correction, view: &'static str) {
    debug!(
        id = correction.id,
        rule = %correction.rule,
        original = %correction.original,
        view,
        "Correction target not found in running text, skipping"
    );
}

/// Apply the accepted corrections of `batch` to `source`.
///
/// # Example
///
/// ```rust
/// use eyd_core::compositor::compose_final;
/// use eyd_core::correction::{CorrectionBatch, CorrectionCandidate};
///
/// let batch = CorrectionBatch::from_candidates(vec![
///     CorrectionCandidate::new("yg", "yang", "abbreviation"),
/// ]);
/// let text = "Ini adalah contoh yg salah.";
/// assert_eq!(compose_final(text, &batch), text);
///
/// let accepted = batch.with_decision(0, true)?;
/// assert_eq!(compose_final(text, &accepted), "Ini adalah contoh yang salah.");
/// # Ok::<(), eyd_core::Error>(())
/// ```
pub fn compose_final(source: &str, batch: &CorrectionBatch) -> String {
    let mut out = source.to_string();
    for correction in batch.iter().filter(|c| c.accepted) {
        if !replace_first(&mut out, &correction.original, &correction.suggested) {
            log_skip(correction, "final");
        }
    }
    out
}

/// Render `source` as HTML with every suggestion of `batch` marked.
///
/// Uses the default `suggestion` class and `<br/>` line breaks.
///
/// # Example
///
/// ```rust
/// use eyd_core::compositor::compose_preview;
/// use eyd_core::correction::{CorrectionBatch, CorrectionCandidate};
///
/// let batch = CorrectionBatch::from_candidates(vec![
///     CorrectionCandidate::new("yg", "yang", "abbreviation"),
/// ]);
/// assert_eq!(
///     compose_preview("Ini adalah contoh yg salah.", &batch),
///     r#"Ini adalah contoh <span class="suggestion">yang</span> salah."#
/// );
/// ```
pub fn compose_preview(source: &str, batch: &CorrectionBatch) -> String {
    compose_preview_with(source, batch, &PreviewOptions::default())
}

/// Render `source` as HTML with every suggestion of `batch` marked, using
/// the given markup options.
///
/// Both the source and each correction's `original`/`suggested` are escaped
/// before matching, so the search runs entirely on escaped text. A match
/// never cuts through an entity or a generated tag; an occurrence that would
/// is passed over in favour of the next one. Line breaks are converted last.
pub fn compose_preview_with(
    source: &str,
    batch: &CorrectionBatch,
    options: &PreviewOptions,
) -> String {
    let class = escape_html(&options.suggestion_class);
    let mut out = Markup::default();
    out.push_escaped(source);

    for correction in batch {
        let needle = escape_html(&correction.original);
        let found = if needle.is_empty() { None } else { out.find(&needle) };
        match found {
            Some(start) => {
                let mut marked = Markup::default();
                marked.push_atom(&format!("<span class=\"{}\">", class));
                marked.push_escaped(&correction.suggested);
                marked.push_atom("</span>");
                out.splice(start, start + needle.len(), marked);
            }
            None => log_skip(correction, "preview"),
        }
    }

    out.text.replace('\n', &options.line_break)
}

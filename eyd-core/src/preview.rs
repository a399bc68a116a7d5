//! # Preview documents
//!
//! Wraps the compositor's preview markup into a standalone HTML page so a
//! review can be exported and opened in a browser. The page shows the
//! original text next to the marked-up preview and highlights suggestions
//! through the configured CSS class.

use crate::compositor::{compose_preview_with, escape_html, PreviewOptions};
use crate::correction::CorrectionBatch;
use crate::{Error, Result};

/// Themes understood by [`PreviewRenderer::set_theme`].
pub const THEMES: &[&str] = &["light", "dark"];

/// HTML page renderer for previews.
///
/// # Example
///
/// ```rust
/// use eyd_core::correction::{CorrectionBatch, CorrectionCandidate};
/// use eyd_core::preview::PreviewRenderer;
///
/// let batch = CorrectionBatch::from_candidates(vec![
///     CorrectionCandidate::new("yg", "yang", "abbreviation"),
/// ]);
/// let renderer = PreviewRenderer::new();
/// let html = renderer.render("Ini contoh yg salah.", &batch);
/// assert!(html.contains("<!DOCTYPE html>"));
/// assert!(html.contains(r#"<span class="suggestion">yang</span>"#));
/// ```
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    /// Markup settings passed to the compositor
    options: PreviewOptions,
    /// Base HTML template
    template: String,
    /// Theme name
    theme: String,
    /// Page title
    title: String,
}

impl PreviewRenderer {
    /// Create a renderer with the default options and the light theme.
    pub fn new() -> Self {
        Self::with_options(PreviewOptions::default())
    }

    /// Create a renderer with the given compositor options.
    pub fn with_options(options: PreviewOptions) -> Self {
        Self {
            options,
            template: Self::default_template(),
            theme: "light".to_string(),
            title: "Pratinjau Koreksi EYD".to_string(),
        }
    }

    /// Render a full HTML page for `source` and `batch`.
    pub fn render(&self, source: &str, batch: &CorrectionBatch) -> String {
        let original = escape_html(source).replace('\n', &self.options.line_break);
        let preview = self.render_fragment(source, batch);
        let title = escape_html(&self.title);
        let css = self.css();

        fill_template(
            &self.template,
            &[
                ("title", title.as_str()),
                ("css", css.as_str()),
                ("theme", self.theme.as_str()),
                ("original", original.as_str()),
                ("preview", preview.as_str()),
            ],
        )
    }

    /// Render only the preview markup, without the page around it.
    pub fn render_fragment(&self, source: &str, batch: &CorrectionBatch) -> String {
        compose_preview_with(source, batch, &self.options)
    }

    /// Set the page theme.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a theme outside [`THEMES`].
    pub fn set_theme(&mut self, theme: &str) -> Result<()> {
        if !THEMES.contains(&theme) {
            return Err(Error::validation(
                "preview.theme".to_string(),
                format!("Unknown theme '{}', expected one of: {}", theme, THEMES.join(", ")),
            ));
        }
        self.theme = theme.to_string();
        Ok(())
    }

    /// Get the current theme.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Set the page title.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// The compositor options in use.
    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    fn css(&self) -> String {
        let (background, text, panel, border, accent) = match self.theme.as_str() {
            "dark" => ("#0f172a", "#f1f5f9", "#1e293b", "#334155", "#86efac"),
            _ => ("#ffffff", "#111827", "#f9fafb", "#e5e7eb", "#15803d"),
        };

        format!(
            r#"
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            font-size: 15px;
            line-height: 1.6;
            color: {text};
            background-color: {background};
            max-width: 960px;
            margin: 0 auto;
            padding: 24px;
        }}

        .panels {{ display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }}

        .panel {{
            padding: 16px;
            border: 1px solid {border};
            border-radius: 6px;
            background-color: {panel};
        }}

        .{class} {{ color: {accent}; font-weight: 600; }}
        "#,
            text = text,
            background = background,
            border = border,
            panel = panel,
            accent = accent,
            class = self.options.suggestion_class,
        )
    }

    fn default_template() -> String {
        r#"<!DOCTYPE html>
<html lang="id">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        {css}
    </style>
</head>
<body class="theme-{theme}">
    <h1>{title}</h1>
    <div class="panels">
        <section class="panel">
            <h2>Teks Asli</h2>
            <p>{original}</p>
        </section>
        <section class="panel">
            <h2>Teks Koreksi (preview)</h2>
            <p>{preview}</p>
        </section>
    </div>
</body>
</html>"#
            .to_string()
    }
}

/// Substitute `{key}` placeholders in one pass, so placeholder-like text
/// inside the values is left alone.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find(|(key, _)| {
            tail.starts_with(key) && tail[key.len()..].starts_with('}')
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

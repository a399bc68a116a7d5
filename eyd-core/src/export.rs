//! # Export sinks
//!
//! Destinations for the corrected text. [`FileSink`] plays the part of a
//! file download, writing to a user-chosen name under the export directory.
//! [`ClipboardSink`] puts it on the system clipboard, and [`WriterSink`]
//! hands it to any writer such as standard output.

use crate::config::ExportConfig;
use crate::{Error, Result};
use clipboard_rs::{Clipboard, ClipboardContext};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Somewhere exported text can be sent.
pub trait ExportSink {
    /// Deliver `text`.
    fn export(&mut self, text: &str) -> Result<()>;

    /// Human-readable description of the destination.
    fn describe(&self) -> String;
}

/// Writes exported text to a file.
///
/// # Example
///
/// ```rust,no_run
/// use eyd_core::config::ExportConfig;
/// use eyd_core::export::{ExportSink, FileSink};
///
/// let mut sink = FileSink::from_config(&ExportConfig::default(), None)?;
/// sink.export("Ini adalah contoh yang benar.")?;
/// # Ok::<(), eyd_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink writing `filename` inside `directory`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `filename` is empty or is not a plain
    /// file name.
    pub fn new(directory: impl AsRef<Path>, filename: &str) -> Result<Self> {
        let trimmed = filename.trim();
        let plain = Path::new(trimmed)
            .file_name()
            .map(|name| name == trimmed)
            .unwrap_or(false);
        if trimmed.is_empty() || !plain || trimmed.contains(['/', '\\']) {
            return Err(Error::validation(
                "filename".to_string(),
                format!("'{}' is not a plain file name", filename),
            ));
        }

        Ok(Self {
            path: directory.as_ref().join(trimmed),
        })
    }

    /// Create a sink from the export settings, using `filename` when given
    /// and the configured default name otherwise.
    pub fn from_config(config: &ExportConfig, filename: Option<&str>) -> Result<Self> {
        let name = filename.unwrap_or(config.default_filename.as_str());
        Self::new(&config.directory, name)
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExportSink for FileSink {
    fn export(&mut self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::export(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(&self.path, text).map_err(|e| {
            Error::export(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        info!(path = %self.path.display(), bytes = text.len(), "Exported text");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes exported text to any [`Write`] implementation.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    label: String,
}

impl<W: Write> WriterSink<W> {
    /// Wrap `writer`, describing it as `label`.
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer,
            label: label.into(),
        }
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExportSink for WriterSink<W> {
    fn export(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Puts exported text on the system clipboard.
///
/// The clipboard is opened on first use and kept open for the life of the
/// sink, since on X11 the copied text is only served while its owner lives.
#[derive(Default)]
pub struct ClipboardSink {
    context: Option<ClipboardContext>,
}

impl ClipboardSink {
    /// Create a sink; the clipboard is not touched until the first export.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for ClipboardSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardSink")
            .field("open", &self.context.is_some())
            .finish()
    }
}

impl ExportSink for ClipboardSink {
    fn export(&mut self, text: &str) -> Result<()> {
        let context = match self.context.take() {
            Some(context) => context,
            None => ClipboardContext::new()
                .map_err(|e| Error::export(format!("Clipboard unavailable: {}", e)))?,
        };
        let context = self.context.insert(context);
        context
            .set_text(text.to_string())
            .map_err(|e| Error::export(format!("Failed to copy to clipboard: {}", e)))?;
        info!(chars = text.chars().count(), "Copied text to clipboard");
        Ok(())
    }

    fn describe(&self) -> String {
        "clipboard".to_string()
    }
}

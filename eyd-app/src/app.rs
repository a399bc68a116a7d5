//! Review application: command parsing and the interactive loop.
//!
//! Reads one command per line, drives the [`EditingSession`] and prints the
//! resulting texts. Errors are reported and the loop keeps going; only `quit`
//! or end of input ends it.

use eyd_core::checker::CheckService;
use eyd_core::export::{ClipboardSink, ExportSink, FileSink};
use eyd_core::preview::PreviewRenderer;
use eyd_core::{Config, EditingSession, Error, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Default file name for exported preview pages.
pub const DEFAULT_PREVIEW_FILENAME: &str = "preview.html";

const HELP: &str = "\
Perintah:
  check <teks>        periksa teks
  open <berkas>       periksa isi berkas
  list                tampilkan daftar koreksi
  accept <n>          terima koreksi n
  reject <n>          tolak koreksi n
  accept-all          terima semua koreksi
  undo | redo         batalkan / ulangi keputusan
  text                tampilkan teks koreksi
  preview             tampilkan pratinjau HTML
  copy                salin teks koreksi ke papan klip
  export [berkas]     simpan teks koreksi
  html [berkas]       simpan halaman pratinjau
  theme <light|dark>  tema halaman pratinjau
  help                tampilkan bantuan ini
  quit                keluar";

/// A parsed REPL command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Blank line
    Empty,
    Check(String),
    Open(PathBuf),
    List,
    Accept(usize),
    Reject(usize),
    AcceptAll,
    Undo,
    Redo,
    Text,
    Preview,
    Copy,
    Export(Option<String>),
    Html(Option<String>),
    Theme(String),
    Help,
    Quit,
}

impl AppCommand {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown commands or missing arguments.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let optional = |rest: &str| (!rest.is_empty()).then(|| rest.to_string());

        let command = match name.to_lowercase().as_str() {
            "" => Self::Empty,
            "check" | "c" => Self::Check(required(rest, "check <teks>")?.to_string()),
            "open" | "o" => Self::Open(PathBuf::from(required(rest, "open <berkas>")?)),
            "list" | "ls" => Self::List,
            "accept" | "a" => Self::Accept(parse_id(rest)?),
            "reject" | "r" => Self::Reject(parse_id(rest)?),
            "accept-all" => Self::AcceptAll,
            "undo" | "u" => Self::Undo,
            "redo" => Self::Redo,
            "text" | "final" => Self::Text,
            "preview" | "p" => Self::Preview,
            "copy" => Self::Copy,
            "export" | "save" => Self::Export(optional(rest)),
            "html" => Self::Html(optional(rest)),
            "theme" => Self::Theme(required(rest, "theme <light|dark>")?.to_string()),
            "help" | "h" | "?" => Self::Help,
            "quit" | "exit" | "q" | ":q" => Self::Quit,
            other => {
                return Err(Error::validation(
                    "command".to_string(),
                    format!("unknown command '{}', type 'help'", other),
                ))
            }
        };
        Ok(command)
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(Error::validation("command".to_string(), format!("usage: {}", usage)))
    } else {
        Ok(rest)
    }
}

fn parse_id(rest: &str) -> Result<usize> {
    rest.parse().map_err(|_| {
        Error::validation(
            "id".to_string(),
            format!("'{}' is not a correction number", rest),
        )
    })
}

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Review loop state.
pub struct ReviewApp<S, W> {
    service: S,
    config: Config,
    session: EditingSession,
    renderer: PreviewRenderer,
    clipboard: Box<dyn ExportSink>,
    out: W,
}

impl<S: CheckService, W: Write> ReviewApp<S, W> {
    /// Create a loop checking with `service` and printing to `out`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured preview theme is unknown.
    pub fn new(service: S, config: Config, out: W) -> Result<Self> {
        let options = config.preview.options();
        let mut renderer = PreviewRenderer::with_options(options.clone());
        renderer.set_theme(&config.preview.theme)?;

        Ok(Self {
            service,
            config,
            session: EditingSession::with_options(options),
            renderer,
            clipboard: Box::new(ClipboardSink::new()),
            out,
        })
    }

    /// Send `copy` to `sink` instead of the system clipboard.
    pub fn with_clipboard(mut self, sink: impl ExportSink + 'static) -> Self {
        self.clipboard = Box::new(sink);
        self
    }

    /// The session being reviewed.
    pub fn session(&self) -> &EditingSession {
        &self.session
    }

    /// Read and execute commands from `input` until `quit` or end of input.
    pub async fn run<R: BufRead>(&mut self, mut input: R) -> Result<()> {
        writeln!(self.out, "EYD Checker - ketik 'help' untuk daftar perintah")?;
        let mut line = String::new();
        loop {
            write!(self.out, "eyd> ")?;
            self.out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            let result = match AppCommand::parse(&line) {
                Ok(command) => self.execute(command).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => writeln!(self.out, "Galat: {}", e)?,
            }
        }
        Ok(())
    }

    /// Execute one command.
    pub async fn execute(&mut self, command: AppCommand) -> Result<Flow> {
        debug!(?command, "Executing command");
        match command {
            AppCommand::Empty => {}
            AppCommand::Check(text) => self.check_text(&text).await?,
            AppCommand::Open(path) => {
                let text = std::fs::read_to_string(&path)?;
                self.check_text(&text).await?;
            }
            AppCommand::List => {
                self.require_document()?;
                self.print_list()?;
            }
            AppCommand::Accept(id) => self.decide(id, true).await?,
            AppCommand::Reject(id) => self.decide(id, false).await?,
            AppCommand::AcceptAll => self.accept_all().await?,
            AppCommand::Undo => {
                self.require_document()?;
                if !self.session.history().can_undo() {
                    writeln!(self.out, "Tidak ada yang dapat dibatalkan.")?;
                }
                self.session.undo();
                self.print_text()?;
            }
            AppCommand::Redo => {
                self.require_document()?;
                if !self.session.history().can_redo() {
                    writeln!(self.out, "Tidak ada yang dapat diulangi.")?;
                }
                self.session.redo();
                self.print_text()?;
            }
            AppCommand::Text => {
                self.require_document()?;
                self.print_text()?;
            }
            AppCommand::Preview => {
                self.require_document()?;
                writeln!(self.out, "{}", self.session.view().preview)?;
            }
            AppCommand::Copy => {
                self.require_document()?;
                self.clipboard.export(&self.session.view().final_text)?;
                writeln!(self.out, "Teks koreksi disalin ke {}", self.clipboard.describe())?;
            }
            AppCommand::Export(filename) => {
                self.require_document()?;
                let mut sink = FileSink::from_config(&self.config.export, filename.as_deref())?;
                sink.export(&self.session.view().final_text)?;
                writeln!(self.out, "Tersimpan di {}", sink.describe())?;
            }
            AppCommand::Html(filename) => {
                self.require_document()?;
                let filename = filename.as_deref().unwrap_or(DEFAULT_PREVIEW_FILENAME);
                let mut sink = FileSink::new(&self.config.export.directory, filename)?;
                let html = self
                    .renderer
                    .render(self.session.source(), self.session.corrections());
                sink.export(&html)?;
                writeln!(self.out, "Pratinjau tersimpan di {}", sink.describe())?;
            }
            AppCommand::Theme(theme) => {
                self.renderer.set_theme(&theme)?;
                writeln!(self.out, "Tema pratinjau: {}", self.renderer.theme())?;
            }
            AppCommand::Help => writeln!(self.out, "{}", HELP)?,
            AppCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Check `text` and load the result.
    pub async fn check_text(&mut self, text: &str) -> Result<()> {
        self.session.check(&self.service, text).await?;
        let count = self.session.corrections().len();
        if count == 0 {
            writeln!(self.out, "Tidak ada koreksi. Teks sudah sesuai EYD.")?;
        } else {
            writeln!(self.out, "Ditemukan {} koreksi:", count)?;
            self.print_list()?;
        }
        Ok(())
    }

    async fn decide(&mut self, id: usize, accepted: bool) -> Result<()> {
        self.require_document()?;
        self.session.decide(id, accepted)?;
        self.send_feedback(&[id], accepted).await;
        self.print_text()
    }

    async fn accept_all(&mut self) -> Result<()> {
        self.require_document()?;
        let current = self.session.corrections();
        let pending: Vec<usize> = current.iter().filter(|c| !c.accepted).map(|c| c.id).collect();
        if pending.is_empty() {
            writeln!(self.out, "Semua koreksi sudah diterima.")?;
            return Ok(());
        }

        // One timeline entry, so a single undo reverts the whole step
        let mut next = current.clone();
        for &id in &pending {
            next = next.with_decision(id, true)?;
        }
        self.session.apply(next);
        self.send_feedback(&pending, true).await;
        self.print_text()
    }

    /// Report decisions to the service when enabled. Never fails the decision.
    async fn send_feedback(&self, ids: &[usize], accepted: bool) {
        if !self.config.service.send_feedback {
            return;
        }
        for &id in ids {
            let Some(correction) = self.session.correction(id) else {
                continue;
            };
            if let Err(e) = self
                .service
                .send_feedback(&correction.to_candidate(), accepted)
                .await
            {
                warn!(id, error = %e, "Failed to send feedback");
            }
        }
    }

    fn require_document(&self) -> Result<()> {
        if self.session.has_document() {
            Ok(())
        } else {
            Err(Error::not_found("checked text (use 'check' or 'open' first)"))
        }
    }

    fn print_list(&mut self) -> Result<()> {
        for correction in self.session.corrections() {
            writeln!(
                self.out,
                "  [{}] {:>2}  {} -> {}  ({})",
                if correction.accepted { "x" } else { " " },
                correction.id,
                correction.original,
                correction.suggested,
                correction.rule
            )?;
        }
        Ok(())
    }

    fn print_text(&mut self) -> Result<()> {
        let batch = self.session.corrections();
        writeln!(
            self.out,
            "Teks koreksi ({}/{} diterima):\n{}",
            batch.accepted_count(),
            batch.len(),
            self.session.view().final_text
        )?;
        Ok(())
    }
}

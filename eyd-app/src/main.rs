//! # EYD Checker
//!
//! Terminal front end for reviewing Indonesian EYD/PUEBI corrections. Text is
//! sent to the checker service, and the suggested corrections can then be
//! accepted, rejected, undone and redone before the corrected text is
//! exported.
//!
//! ## Usage
//!
//! ```bash
//! # Start an interactive review
//! eyd-checker
//!
//! # Check a file, then review it
//! eyd-checker --file surat.txt
//!
//! # Check once, accept everything and print the result
//! eyd-checker --text "Ini contoh yg salah." --accept-all --print
//!
//! # Use another service and debug logging
//! eyd-checker --url http://checker.local:8000 --debug
//! ```

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use eyd_core::checker::CheckService;
use eyd_core::export::{ExportSink, FileSink, WriterSink};
use eyd_core::{Config, HttpChecker};
use std::path::PathBuf;

mod app;

use app::{AppCommand, ReviewApp};

/// Command line arguments for EYD Checker
#[derive(Debug, Clone, Default)]
pub struct AppArgs {
    /// Configuration file to use instead of the default one
    pub config_path: Option<PathBuf>,
    /// File whose content is checked on startup
    pub file: Option<PathBuf>,
    /// Text checked on startup
    pub text: Option<String>,
    /// Checker service base URL override
    pub url: Option<String>,
    /// Request timeout override in seconds
    pub timeout: Option<u64>,
    /// Report decisions back to the service
    pub send_feedback: bool,
    /// Accept every correction after the startup check
    pub accept_all: bool,
    /// Print the corrected text and exit
    pub print: bool,
    /// Export the corrected text to this file name and exit
    pub output: Option<String>,
    /// Write the default configuration file and exit
    pub init_config: bool,
    /// Enable debug logging
    pub debug: bool,
}

impl AppArgs {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches.get_one::<PathBuf>("config").cloned(),
            file: matches.get_one::<PathBuf>("file").cloned(),
            text: matches.get_one::<String>("text").cloned(),
            url: matches.get_one::<String>("url").cloned(),
            timeout: matches.get_one::<u64>("timeout").copied(),
            send_feedback: matches.get_flag("send-feedback"),
            accept_all: matches.get_flag("accept-all"),
            print: matches.get_flag("print"),
            output: matches.get_one::<String>("output").cloned(),
            init_config: matches.get_flag("init-config"),
            debug: matches.get_flag("debug"),
        }
    }

    /// Whether the run ends after the startup check instead of starting the REPL.
    pub fn is_batch(&self) -> bool {
        self.print || self.output.is_some()
    }

    /// Apply command line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.service.base_url = url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.service.timeout_secs = timeout;
        }
        if self.send_feedback {
            config.service.send_feedback = true;
        }
        if self.debug {
            config.advanced.log_level = "debug".to_string();
        }
    }
}

/// Build the command line definition
fn build_cli() -> Command {
    Command::new("eyd-checker")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Review Indonesian EYD/PUEBI spelling and style corrections")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file to use")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Text file to check on startup")
                .value_parser(clap::value_parser!(PathBuf))
                .conflicts_with("text"),
        )
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .value_name("TEXT")
                .help("Text to check on startup"),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Checker service base URL"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("Request timeout")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("send-feedback")
                .long("send-feedback")
                .help("Report accept/reject decisions to the service")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("accept-all")
                .long("accept-all")
                .help("Accept every correction after the startup check")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print")
                .long("print")
                .help("Print the corrected text and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("NAME")
                .help("Export the corrected text to NAME in the export directory and exit"),
        )
        .arg(
            Arg::new("init-config")
                .long("init-config")
                .help("Write the default configuration file and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

/// Parse command line arguments
fn parse_args() -> AppArgs {
    AppArgs::from_matches(&build_cli().get_matches())
}

/// Load the configuration file and apply command line overrides.
fn load_config(args: &AppArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config_path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load the configuration file")?,
    };
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

/// Text to check on startup, if any.
fn startup_text(args: &AppArgs) -> anyhow::Result<Option<String>> {
    match (&args.file, &args.text) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(Some(text))
        }
        (None, Some(text)) => Ok(Some(text.clone())),
        (None, None) => Ok(None),
    }
}

/// Check `text` once and deliver the corrected text without the REPL.
async fn run_batch<S: CheckService>(
    service: S,
    config: Config,
    args: &AppArgs,
    text: &str,
) -> anyhow::Result<()> {
    let export = config.export.clone();
    let mut app = ReviewApp::new(service, config, std::io::sink())?;
    app.check_text(text).await?;
    if args.accept_all {
        app.execute(AppCommand::AcceptAll).await?;
    }

    let final_text = &app.session().view().final_text;
    if let Some(name) = &args.output {
        let mut sink = FileSink::from_config(&export, Some(name))?;
        sink.export(final_text)?;
        tracing::info!("Corrected text written to {}", sink.describe());
    }
    if args.print {
        let mut sink = WriterSink::new(std::io::stdout(), "standard output");
        sink.export(final_text)?;
        println!();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args();
    let config = load_config(&args)?;
    eyd_core::init_tracing(&config.advanced.log_level);

    tracing::info!("Starting EYD Checker v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        let path = Config::default_config_path()?;
        config.save()?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let checker = HttpChecker::new(&config.service)?;
    tracing::debug!(url = checker.check_url(), "Using checker service");
    let text = startup_text(&args)?;

    if args.is_batch() {
        let text = text.context("--print and --output need --file or --text")?;
        return run_batch(checker, config, &args, &text).await;
    }

    let mut app = ReviewApp::new(checker, config, std::io::stdout())?;
    if let Some(text) = text {
        if let Err(e) = app.check_text(&text).await {
            eprintln!("Galat: {}", e);
        } else if args.accept_all {
            app.execute(AppCommand::AcceptAll).await?;
        }
    }
    app.run(std::io::stdin().lock()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> AppArgs {
        let mut full = vec!["eyd-checker"];
        full.extend_from_slice(argv);
        AppArgs::from_matches(&build_cli().get_matches_from(full))
    }

    #[test]
    fn test_app_args_default() {
        let args = args(&[]);
        assert!(args.config_path.is_none());
        assert!(!args.debug);
        assert!(!args.is_batch());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let args = args(&[
            "--url",
            "https://eyd.example.id",
            "--timeout",
            "5",
            "--send-feedback",
            "--debug",
        ]);
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.service.base_url, "https://eyd.example.id");
        assert_eq!(config.service.timeout_secs, 5);
        assert!(config.service.send_feedback);
        assert_eq!(config.advanced.log_level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_batch_mode() {
        assert!(args(&["--text", "x", "--print"]).is_batch());
        assert!(args(&["-t", "x", "-o", "hasil.txt"]).is_batch());
        assert!(build_cli()
            .try_get_matches_from(["eyd-checker", "--file", "a.txt", "--text", "x"])
            .is_err());
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save_to_file(&path).unwrap();

        let mut args = args(&["--timeout", "0"]);
        args.config_path = Some(path);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_startup_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surat.txt");
        std::fs::write(&path, "Ini surat yg penting.").unwrap();

        let mut args = AppArgs::default();
        assert!(startup_text(&args).unwrap().is_none());
        args.file = Some(path);
        assert_eq!(
            startup_text(&args).unwrap().as_deref(),
            Some("Ini surat yg penting.")
        );
    }
}

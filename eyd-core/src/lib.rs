//! # EYD Core
//!
//! Core functionality for reviewing Indonesian EYD/PUEBI spelling and style
//! corrections. The checking itself is done by an external service; this
//! crate owns what happens after the suggestions arrive.
//!
//! ## Architecture
//!
//! - [`history`]: undo/redo timeline of correction decisions
//! - [`compositor`]: final text and HTML preview derived from a snapshot
//! - [`session`]: the state a front end drives, tying the two together
//! - [`checker`]: the external service boundary
//! - [`export`] and [`preview`]: where the results go
//!
//! ## Example
//!
//! ```rust
//! use eyd_core::checker::CheckResponse;
//! use eyd_core::correction::CorrectionCandidate;
//! use eyd_core::EditingSession;
//!
//! let mut session = EditingSession::new();
//! let ticket = session.begin_check();
//! session.complete_check(ticket, CheckResponse {
//!     text: "Ini adalah contoh yg salah.".to_string(),
//!     corrections: vec![CorrectionCandidate::new("yg", "yang", "abbreviation")],
//! })?;
//!
//! let view = session.accept(0)?;
//! assert_eq!(view.final_text, "Ini adalah contoh yang salah.");
//! # Ok::<(), eyd_core::Error>(())
//! ```

pub mod checker;
pub mod compositor;
pub mod config;
pub mod correction;
pub mod error;
pub mod export;
pub mod history;
pub mod preview;
pub mod session;

pub use checker::{CheckResponse, CheckService, HttpChecker};
pub use compositor::{compose_final, compose_preview, PreviewOptions};
pub use config::Config;
pub use correction::{Correction, CorrectionBatch, CorrectionCandidate};
pub use error::{Error, Result};
pub use history::HistoryState;
pub use session::{CheckTicket, EditingSession, SessionView};

/// Initialize tracing for the application.
///
/// `RUST_LOG` takes precedence over `default_level` when it is set.
///
/// # Example
///
/// ```rust
/// eyd_core::init_tracing("info");
/// tracing::info!("Application started");
/// ```
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A global subscriber may already be installed (tests, embedding
    // applications); keep the existing one in that case.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing() {
        // Should not panic, even twice
        init_tracing("debug");
        init_tracing("not a level");
    }
}

//! # Editing sessions
//!
//! An [`EditingSession`] is the state one user works on: the source text of
//! the last successful check, the decision history for its corrections, and
//! the ticket counter that keeps late check responses from overwriting newer
//! work. Every transition ends with an explicit call to `refresh`, which
//! recomputes the final text and the preview from the current snapshot.

use crate::checker::{CheckResponse, CheckService};
use crate::compositor::{compose_final, compose_preview_with, PreviewOptions};
use crate::correction::{Correction, CorrectionBatch};
use crate::history::HistoryState;
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Sequence number of a check request.
///
/// Only the most recently issued ticket may load its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckTicket(u64);

impl CheckTicket {
    /// The raw sequence number.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Texts derived from the current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    /// Source text with the accepted corrections applied
    pub final_text: String,
    /// HTML preview with every suggestion marked
    pub preview: String,
}

/// Source text, decision history and request bookkeeping for one user.
///
/// # Example
///
/// ```rust
/// use eyd_core::correction::{CorrectionBatch, CorrectionCandidate};
/// use eyd_core::session::EditingSession;
///
/// let mut session = EditingSession::new();
/// let batch = CorrectionBatch::from_candidates(vec![
///     CorrectionCandidate::new("yg", "yang", "abbreviation"),
/// ]);
/// session.load("Ini contoh yg salah.", batch);
///
/// session.accept(0)?;
/// assert_eq!(session.view().final_text, "Ini contoh yang salah.");
///
/// session.undo();
/// assert_eq!(session.view().final_text, "Ini contoh yg salah.");
/// # Ok::<(), eyd_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EditingSession {
    source: String,
    history: HistoryState,
    loaded: bool,
    latest_ticket: u64,
    options: PreviewOptions,
    view: SessionView,
}

impl EditingSession {
    /// Create an empty session with default preview markup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with the given preview markup.
    pub fn with_options(options: PreviewOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Issue a ticket for a new check request.
    ///
    /// Issuing a ticket supersedes every earlier one.
    pub fn begin_check(&mut self) -> CheckTicket {
        self.latest_ticket += 1;
        debug!(ticket = self.latest_ticket, "Issued check ticket");
        CheckTicket(self.latest_ticket)
    }

    /// Whether `ticket` is the most recently issued one.
    pub fn is_current(&self, ticket: CheckTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Load the response of the check identified by `ticket`.
    ///
    /// # Errors
    ///
    /// Returns a stale response error, leaving the session untouched, if a
    /// newer check has been started since `ticket` was issued.
    pub fn complete_check(
        &mut self,
        ticket: CheckTicket,
        response: CheckResponse,
    ) -> Result<&SessionView> {
        if !self.is_current(ticket) {
            warn!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Discarding response of superseded check"
            );
            return Err(Error::stale(ticket.0, self.latest_ticket));
        }

        let (text, batch) = response.into_batch();
        Ok(self.load(text, batch))
    }

    /// Check `text` with `service` and load the result.
    ///
    /// On any failure the session keeps its previous document and history.
    pub async fn check<S>(&mut self, service: &S, text: &str) -> Result<&SessionView>
    where
        S: CheckService + ?Sized,
    {
        let ticket = self.begin_check();
        let response = service.check(text).await?;
        self.complete_check(ticket, response)
    }

    /// Start a new timeline for `source` with `batch` as its first snapshot.
    pub fn load(&mut self, source: impl Into<String>, batch: CorrectionBatch) -> &SessionView {
        self.source = source.into();
        info!(corrections = batch.len(), "Loaded new document");
        self.history = HistoryState::load(batch);
        self.loaded = true;
        self.refresh()
    }

    /// Commit a full replacement batch.
    pub fn apply(&mut self, next: CorrectionBatch) -> &SessionView {
        self.history = std::mem::take(&mut self.history).apply(next);
        self.refresh()
    }

    /// Set the decision on one correction and commit the result.
    ///
    /// # Errors
    ///
    /// Returns a not found error if the current batch has no such correction.
    pub fn decide(&mut self, id: usize, accepted: bool) -> Result<&SessionView> {
        let next = self.history.present().with_decision(id, accepted)?;
        debug!(id, accepted, "Recorded decision");
        Ok(self.apply(next))
    }

    /// Accept one correction.
    pub fn accept(&mut self, id: usize) -> Result<&SessionView> {
        self.decide(id, true)
    }

    /// Reject one correction.
    pub fn reject(&mut self, id: usize) -> Result<&SessionView> {
        self.decide(id, false)
    }

    /// Step back one decision. No-op at the start of the timeline.
    pub fn undo(&mut self) -> &SessionView {
        self.history = std::mem::take(&mut self.history).undo();
        self.refresh()
    }

    /// Step forward one decision. No-op at the end of the timeline.
    pub fn redo(&mut self) -> &SessionView {
        self.history = std::mem::take(&mut self.history).redo();
        self.refresh()
    }

    /// Recompute the derived texts from the current snapshot.
    fn refresh(&mut self) -> &SessionView {
        let batch = self.history.present();
        self.view = SessionView {
            final_text: compose_final(&self.source, batch),
            preview: compose_preview_with(&self.source, batch, &self.options),
        };
        &self.view
    }

    /// Whether a document has been loaded.
    pub fn has_document(&self) -> bool {
        self.loaded
    }

    /// The source text of the loaded document.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The decision history.
    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    /// The current correction batch.
    pub fn corrections(&self) -> &CorrectionBatch {
        self.history.present()
    }

    /// Look up a correction of the current batch.
    pub fn correction(&self, id: usize) -> Option<&Correction> {
        self.history.present().get(id)
    }

    /// The texts derived from the current snapshot.
    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// The preview markup settings.
    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::CorrectionCandidate;

    fn response(text: &str, items: &[(&str, &str)]) -> CheckResponse {
        CheckResponse {
            text: text.to_string(),
            corrections: items
                .iter()
                .map(|(o, s)| CorrectionCandidate::new(*o, *s, "rule"))
                .collect(),
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = EditingSession::new();
        assert!(!session.has_document());
        assert!(session.corrections().is_empty());
        assert_eq!(session.view(), &SessionView::default());
    }

    #[test]
    fn test_views_follow_decisions() {
        let mut session = EditingSession::new();
        let ticket = session.begin_check();
        let view = session
            .complete_check(ticket, response("Ini adalah contoh yg salah.", &[("yg", "yang")]))
            .unwrap();
        assert_eq!(view.final_text, "Ini adalah contoh yg salah.");
        let preview = view.preview.clone();

        let view = session.accept(0).unwrap();
        assert_eq!(view.final_text, "Ini adalah contoh yang salah.");
        assert_eq!(view.preview, preview);

        assert_eq!(session.reject(0).unwrap().final_text, "Ini adalah contoh yg salah.");
        assert_eq!(session.undo().final_text, "Ini adalah contoh yang salah.");
        assert_eq!(session.redo().final_text, "Ini adalah contoh yg salah.");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = EditingSession::new();
        let first = session.begin_check();
        let second = session.begin_check();

        session
            .complete_check(second, response("dokumen baru", &[("baru", "Baru")]))
            .unwrap();
        session.accept(0).unwrap();

        let err = session
            .complete_check(first, response("dokumen lama", &[]))
            .unwrap_err();
        assert!(err.is_stale());
        assert_eq!(session.source(), "dokumen baru");
        assert!(session.history().can_undo());
        assert_eq!(session.view().final_text, "dokumen Baru");
    }

    #[test]
    fn test_new_load_discards_timeline() {
        let mut session = EditingSession::new();
        session.load(
            "a yg b",
            CorrectionBatch::from_candidates(vec![CorrectionCandidate::new("yg", "yang", "rule")]),
        );
        session.accept(0).unwrap();
        session.undo();
        assert!(session.history().can_redo());

        session.load("c", CorrectionBatch::default());
        assert!(!session.history().can_undo());
        assert!(!session.history().can_redo());
        assert_eq!(session.view().final_text, "c");
    }

    #[test]
    fn test_unknown_id_leaves_history_alone() {
        let mut session = EditingSession::new();
        session.load("x", CorrectionBatch::default());
        assert_eq!(session.accept(3).unwrap_err().category(), "NotFound");
        assert!(!session.history().can_undo());
    }

    struct Unreachable;

    #[async_trait::async_trait]
    impl CheckService for Unreachable {
        async fn check(&self, _text: &str) -> Result<CheckResponse> {
            Err(Error::network("connection refused"))
        }
    }

    #[test]
    fn test_failed_check_keeps_document() {
        let mut session = EditingSession::new();
        session.load(
            "a yg b",
            CorrectionBatch::from_candidates(vec![CorrectionCandidate::new("yg", "yang", "rule")]),
        );
        session.accept(0).unwrap();

        let err = tokio_test::block_on(session.check(&Unreachable, "teks baru")).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(session.view().final_text, "a yang b");
        assert!(session.history().can_undo());
    }

    #[test]
    fn test_custom_preview_options() {
        let mut session = EditingSession::with_options(PreviewOptions {
            suggestion_class: "fix".to_string(),
            line_break: "<br>".to_string(),
        });
        session.load(
            "yg\nx",
            CorrectionBatch::from_candidates(vec![CorrectionCandidate::new("yg", "yang", "rule")]),
        );
        assert_eq!(session.view().preview, "<span class=\"fix\">yang</span><br>x");
    }
}

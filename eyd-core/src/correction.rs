//! # Corrections and correction batches
//!
//! A [`Correction`] is one proposed `original → suggested` change reported by
//! the checker service, plus the user's accept/reject decision. A
//! [`CorrectionBatch`] is the full ordered list returned for one checked
//! document. Batch order is the order the service reported the corrections in
//! and decides replacement precedence in the compositor, so every operation
//! here preserves it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A correction exactly as the checker service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionCandidate {
    /// Substring of the source text to replace
    pub original: String,
    /// Replacement text
    pub suggested: String,
    /// Label of the rule that produced the suggestion
    pub rule: String,
}

impl CorrectionCandidate {
    /// Create a new candidate.
    pub fn new(
        original: impl Into<String>,
        suggested: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            suggested: suggested.into(),
            rule: rule.into(),
        }
    }
}

/// One proposed change together with the user's decision on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Position of the correction in its batch
    pub id: usize,
    /// Substring of the source text to replace
    pub original: String,
    /// Replacement text
    pub suggested: String,
    /// Label of the rule that produced the suggestion
    pub rule: String,
    /// Whether the user accepted the change
    pub accepted: bool,
}

impl Correction {
    /// Build an undecided correction from a service candidate.
    pub fn from_candidate(id: usize, candidate: CorrectionCandidate) -> Self {
        Self {
            id,
            original: candidate.original,
            suggested: candidate.suggested,
            rule: candidate.rule,
            accepted: false,
        }
    }

    /// The candidate this correction was built from, without the decision.
    pub fn to_candidate(&self) -> CorrectionCandidate {
        CorrectionCandidate::new(&self.original, &self.suggested, &self.rule)
    }
}

/// Ordered set of corrections for one checked document.
///
/// # Example
///
/// ```rust
/// use eyd_core::correction::{CorrectionBatch, CorrectionCandidate};
///
/// let batch = CorrectionBatch::from_candidates(vec![
///     CorrectionCandidate::new("yg", "yang", "abbreviation"),
/// ]);
/// assert_eq!(batch.len(), 1);
/// assert_eq!(batch.pending_count(), 1);
///
/// let accepted = batch.with_decision(0, true)?;
/// assert_eq!(accepted.accepted_count(), 1);
/// # Ok::<(), eyd_core::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionBatch {
    corrections: Vec<Correction>,
}

impl CorrectionBatch {
    /// Create a batch from already-built corrections.
    ///
    /// # Errors
    ///
    /// Returns a validation error if two corrections share an id.
    pub fn new(corrections: Vec<Correction>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(corrections.len());
        for correction in &corrections {
            if !seen.insert(correction.id) {
                return Err(Error::validation(
                    "id".to_string(),
                    format!("Duplicate correction id {}", correction.id),
                ));
            }
        }
        Ok(Self { corrections })
    }

    /// Create a batch from service candidates, in order.
    ///
    /// Each correction gets `id = index` and starts out not accepted.
    pub fn from_candidates(candidates: Vec<CorrectionCandidate>) -> Self {
        let corrections = candidates
            .into_iter()
            .enumerate()
            .map(|(id, candidate)| Correction::from_candidate(id, candidate))
            .collect();
        Self { corrections }
    }

    /// Return a copy of this batch with one correction's decision changed.
    ///
    /// Every other correction, and the order, is left as is. Setting a flag
    /// to the value it already has still produces a (equal) new batch.
    ///
    /// # Errors
    ///
    /// Returns a not found error if no correction has the given id.
    pub fn with_decision(&self, id: usize, accepted: bool) -> Result<Self> {
        if self.get(id).is_none() {
            return Err(Error::not_found(format!("Correction #{}", id)));
        }

        let corrections = self
            .corrections
            .iter()
            .map(|c| {
                if c.id == id {
                    Correction {
                        accepted,
                        ..c.clone()
                    }
                } else {
                    c.clone()
                }
            })
            .collect();
        Ok(Self { corrections })
    }

    /// Look up a correction by id.
    pub fn get(&self, id: usize) -> Option<&Correction> {
        self.corrections.iter().find(|c| c.id == id)
    }

    /// Iterate over the corrections in batch order.
    pub fn iter(&self) -> std::slice::Iter<'_, Correction> {
        self.corrections.iter()
    }

    /// The corrections in batch order.
    pub fn as_slice(&self) -> &[Correction] {
        &self.corrections
    }

    /// Number of corrections.
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    /// Whether the batch has no corrections.
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    /// Number of accepted corrections.
    pub fn accepted_count(&self) -> usize {
        self.corrections.iter().filter(|c| c.accepted).count()
    }

    /// Number of corrections not (or no longer) accepted.
    pub fn pending_count(&self) -> usize {
        self.len() - self.accepted_count()
    }
}

impl<'a> IntoIterator for &'a CorrectionBatch {
    type Item = &'a Correction;
    type IntoIter = std::slice::Iter<'a, Correction>;

    fn into_iter(self) -> Self::IntoIter {
        self.corrections.iter()
    }
}

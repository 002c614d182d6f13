//! Analysis reports over a user's saved notes.
//!
//! A report loads its own data through the repository; the analysis screen
//! only tells it which kind to build and for whom.

use std::fmt;

use crate::db::{NoteRepository, RepoResult};
use crate::models::Note;
use crate::predict::RiskBand;

/// The two report kinds offered by the analysis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Depression,
    Schizophrenia,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Depression, ReportKind::Schizophrenia];

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Depression => "Depression",
            ReportKind::Schizophrenia => "Schizophrenia",
        }
    }

    /// The score this report reads from a note.
    pub fn score(self, note: &Note) -> f64 {
        match self {
            ReportKind::Depression => note.pred_depression,
            ReportKind::Schizophrenia => note.pred_schizophrenia,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One note's contribution to a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNote {
    pub id: i64,
    pub title: String,
    pub score: f64,
}

/// Aggregated view of one score across all notes, in creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub kind: ReportKind,
    pub scores: Vec<ScoredNote>,
}

impl AnalysisReport {
    /// Fetch the owner's notes and build the report for `kind`.
    pub fn load(repo: &dyn NoteRepository, owner: &str, kind: ReportKind) -> RepoResult<Self> {
        let notes = repo.list_notes(owner)?;
        Ok(Self::from_notes(kind, &notes))
    }

    pub fn from_notes(kind: ReportKind, notes: &[Note]) -> Self {
        let scores = notes
            .iter()
            .map(|note| ScoredNote {
                id: note.id,
                title: note.title.clone(),
                score: kind.score(note),
            })
            .collect();
        Self { kind, scores }
    }

    pub fn note_count(&self) -> usize {
        self.scores.len()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let total: f64 = self.scores.iter().map(|entry| entry.score).sum();
        Some(total / self.scores.len() as f64)
    }

    /// Highest-scoring note. Ties keep the earliest note.
    pub fn peak(&self) -> Option<&ScoredNote> {
        self.scores.iter().fold(None, |best, entry| match best {
            Some(current) if current.score >= entry.score => Some(current),
            _ => Some(entry),
        })
    }

    /// Number of notes per risk band, in `RiskBand::ALL` order.
    pub fn band_counts(&self) -> [(RiskBand, u64); 3] {
        let mut counts = RiskBand::ALL.map(|band| (band, 0u64));
        for entry in &self.scores {
            let band = RiskBand::from_score(entry.score);
            if let Some(slot) = counts.iter_mut().find(|(candidate, _)| *candidate == band) {
                slot.1 += 1;
            }
        }
        counts
    }

    /// Scores scaled to whole percentages for sparkline rendering.
    pub fn trend(&self) -> Vec<u64> {
        self.scores
            .iter()
            .map(|entry| (entry.score.clamp(0.0, 1.0) * 100.0).round() as u64)
            .collect()
    }
}

//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These types stay light-weight data holders so other layers can focus on
//! presentation and persistence logic.

use std::fmt;

use crate::predict::Prediction;

#[derive(Debug, Clone, PartialEq)]
/// A persisted note together with the prediction computed when it was last
/// saved.
pub struct Note {
    /// Primary key from the database. Stable for the lifetime of the note,
    /// including across edits.
    pub id: i64,
    /// Title shown on the grid card and the detail header.
    pub title: String,
    /// Free text written by the user.
    pub body: String,
    /// Depression indicator score in `[0, 1]`.
    pub pred_depression: f64,
    /// Schizophrenia indicator score in `[0, 1]`.
    pub pred_schizophrenia: f64,
    /// Human-readable summary of both scores, displayed verbatim.
    pub prediction_message: String,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Last update time in epoch milliseconds.
    pub updated_at: i64,
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Write model used for both inserts and in-place updates.
pub struct NoteDraft {
    pub title: String,
    pub body: String,
    pub prediction: Prediction,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>, prediction: Prediction) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            prediction,
        }
    }
}

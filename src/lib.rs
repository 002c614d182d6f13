//! Core library surface for the Harmony notes TUI.
//!
//! The binary only wires configuration, logging and storage together; all of
//! the behaviour lives behind the modules exposed here so tests can drive the
//! same pieces without a terminal.
pub mod analysis;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod predict;
pub mod ui;

/// Persistence entry points used by `main.rs` and the integration tests.
pub use db::{
    database_path, ensure_schema, open_database, open_in_memory, NoteRepository, RepoError,
    SqliteNoteRepository,
};

/// Domain types shared by every layer.
pub use models::{Note, NoteDraft};

/// Scoring of note text and the per-kind reports built from it.
pub use analysis::{AnalysisReport, ReportKind};
pub use predict::{LexiconPredictor, Prediction, Predictor, RiskBand};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

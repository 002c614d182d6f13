//! Persistence module split across logical submodules.

use thiserror::Error;

mod connection;
mod notes;

pub use connection::{database_path, ensure_schema, open_database, open_in_memory};
pub use notes::{NoteRepository, SqliteNoteRepository};

/// Failures surfaced by the notes repository. Callers branch on the variant to
/// pick the recovery: a missing note sends the user back to the grid, a
/// storage failure is reported and the current screen decides what to do.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Note {0} not found.")]
    NotFound(i64),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

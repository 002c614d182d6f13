use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{RepoError, RepoResult};
use crate::models::{Note, NoteDraft};

const NOTE_COLUMNS: &str = "id, title, body, pred_depression, pred_schizophrenia, \
                            prediction_message, created_at, updated_at";

/// Repository interface for the notes shown in the UI. Every call is scoped to
/// an owner so one login never sees another login's notes.
pub trait NoteRepository {
    /// All notes for `owner` in creation order.
    fn list_notes(&self, owner: &str) -> RepoResult<Vec<Note>>;
    /// One note by id, `None` when it does not exist for this owner.
    fn get_note(&self, owner: &str, id: i64) -> RepoResult<Option<Note>>;
    /// Insert a note and return it with its freshly assigned id.
    fn create_note(&self, owner: &str, draft: &NoteDraft) -> RepoResult<Note>;
    /// Replace title, body and prediction in place. The id is preserved.
    fn update_note(&self, owner: &str, id: i64, draft: &NoteDraft) -> RepoResult<()>;
    /// Remove a note. Returns `false` when nothing matched; deleting twice is
    /// not an error.
    fn delete_note(&self, owner: &str, id: i64) -> RepoResult<bool>;
}

/// SQLite-backed notes repository.
pub struct SqliteNoteRepository {
    conn: Connection,
}

impl SqliteNoteRepository {
    /// Wrap a connection that already went through `ensure_schema`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn list_notes(&self, owner: &str) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE owner = ?1 ORDER BY id"
        ))?;

        let notes = stmt
            .query_map([owner], note_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("event=notes_list module=db status=ok count={}", notes.len());
        Ok(notes)
    }

    fn get_note(&self, owner: &str, id: i64) -> RepoResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND owner = ?2"),
                params![id, owner],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }

    fn create_note(&self, owner: &str, draft: &NoteDraft) -> RepoResult<Note> {
        self.conn.execute(
            "INSERT INTO notes (
                owner, title, body, pred_depression, pred_schizophrenia,
                prediction_message, created_at, updated_at
             ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7
             )",
            params![
                owner,
                draft.title,
                draft.body,
                draft.prediction.depression,
                draft.prediction.schizophrenia,
                draft.prediction.message,
                now_millis(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("event=note_create module=db status=ok id={id}");
        self.get_note(owner, id)?.ok_or(RepoError::NotFound(id))
    }

    fn update_note(&self, owner: &str, id: i64, draft: &NoteDraft) -> RepoResult<()> {
        let updated = self.conn.execute(
            "UPDATE notes
             SET title = ?3,
                 body = ?4,
                 pred_depression = ?5,
                 pred_schizophrenia = ?6,
                 prediction_message = ?7,
                 updated_at = ?8
             WHERE id = ?1 AND owner = ?2",
            params![
                id,
                owner,
                draft.title,
                draft.body,
                draft.prediction.depression,
                draft.prediction.schizophrenia,
                draft.prediction.message,
                now_millis(),
            ],
        )?;

        if updated == 0 {
            warn!("event=note_update module=db status=not_found id={id}");
            Err(RepoError::NotFound(id))
        } else {
            info!("event=note_update module=db status=ok id={id}");
            Ok(())
        }
    }

    fn delete_note(&self, owner: &str, id: i64) -> RepoResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;

        if deleted == 0 {
            warn!("event=note_delete module=db status=noop id={id}");
        } else {
            info!("event=note_delete module=db status=ok id={id}");
        }
        Ok(deleted > 0)
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        pred_depression: row.get(3)?,
        pred_schizophrenia: row.get(4)?,
        prediction_message: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Wall-clock time in epoch milliseconds. A clock set before 1970 reads as 0.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

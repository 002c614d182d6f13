//! Per-login state. A session exists only between login and logout; dropping
//! it discards every screen and form value it held.

use super::screens::{AnalysisScreen, NewNoteScreen, NoteDetail, NotesGrid};

/// The active screen. Only one can exist at a time, so switching screens
/// always replaces the previous one wholesale.
#[derive(Debug, Clone)]
pub enum View {
    Grid(NotesGrid),
    Detail(NoteDetail),
    NewNote(NewNoteScreen),
    Analysis(AnalysisScreen),
}

/// Lightweight description of the active screen, convenient for assertions
/// and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Grid,
    Detail(i64),
    NewNote,
    Analysis,
}

impl View {
    pub fn kind(&self) -> ViewKind {
        match self {
            View::Grid(_) => ViewKind::Grid,
            View::Detail(detail) => ViewKind::Detail(detail.note.id),
            View::NewNote(_) => ViewKind::NewNote,
            View::Analysis(_) => ViewKind::Analysis,
        }
    }
}

impl ViewKind {
    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Grid => "grid",
            ViewKind::Detail(_) => "detail",
            ViewKind::NewNote => "new_note",
            ViewKind::Analysis => "analysis",
        }
    }

    /// `from=… to=…` log fields for a switch to `next`, `None` when nothing
    /// changes.
    pub(crate) fn change_to(self, next: ViewKind) -> Option<String> {
        (self != next).then(|| format!("from={} to={}", self.name(), next.name()))
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    email: String,
    pub(crate) view: View,
}

impl Session {
    pub(crate) fn new(email: String) -> Self {
        Self {
            email,
            view: View::Grid(NotesGrid::default()),
        }
    }

    /// Identity the session's notes are scoped to.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub(crate) fn show(&mut self, view: View) {
        self.view = view;
    }
}

//! Terminal front end: login gate, session views and the draw/input loop.

mod app;
pub mod forms;
mod helpers;
mod render;
pub mod screens;
pub mod session;
mod terminal;

pub use app::{App, StatusKind};
pub use forms::{DetailAction, FormError, NewNoteAction};
pub use helpers::{preview, PREVIEW_CHARS};
pub use screens::{AnalysisScreen, AnalysisState, NewNoteScreen, NoteDetail, NotesGrid, GRID_COLUMNS};
pub use session::{Session, View, ViewKind};
pub use terminal::run_app;

use crossterm::event::KeyCode;

use crate::analysis::{AnalysisReport, ReportKind};
use crate::models::Note;

use super::forms::{button_line, ActionRow, AnalysisAction, DetailAction, NewNoteAction, NoteForm};

/// Number of note cards shown in each row of the grid.
pub const GRID_COLUMNS: usize = 5;

/// The saved-notes grid, holding the snapshot it was opened with.
#[derive(Debug, Clone, Default)]
pub struct NotesGrid {
    pub(crate) notes: Vec<Note>,
    pub(crate) selected: usize,
    pub(crate) load_error: Option<String>,
}

impl NotesGrid {
    pub(crate) fn new(notes: Vec<Note>) -> Self {
        Self {
            notes,
            selected: 0,
            load_error: None,
        }
    }

    pub(crate) fn failed(message: String) -> Self {
        Self {
            notes: Vec::new(),
            selected: 0,
            load_error: Some(message),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Notes partitioned into display rows of [`GRID_COLUMNS`], in repository
    /// order.
    pub fn rows(&self) -> Vec<&[Note]> {
        self.notes.chunks(GRID_COLUMNS).collect()
    }

    pub fn row_count(&self) -> usize {
        self.notes.len().div_ceil(GRID_COLUMNS)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current_note(&self) -> Option<&Note> {
        self.notes.get(self.selected)
    }

    pub(crate) fn select_id(&mut self, id: i64) {
        if let Some(index) = self.notes.iter().position(|note| note.id == id) {
            self.selected = index;
        }
    }

    pub(crate) fn move_horizontal(&mut self, offset: isize) {
        self.move_to(self.selected as isize + offset);
    }

    pub(crate) fn move_vertical(&mut self, offset: isize) {
        self.move_to(self.selected as isize + offset * GRID_COLUMNS as isize);
    }

    fn move_to(&mut self, index: isize) {
        if (0..self.notes.len() as isize).contains(&index) {
            self.selected = index as usize;
        }
    }

    /// First row to draw so the selected card stays visible when only
    /// `visible_rows` fit on screen.
    pub(crate) fn first_visible_row(&self, visible_rows: usize) -> usize {
        let visible_rows = visible_rows.max(1);
        let selected_row = self.selected / GRID_COLUMNS;
        if selected_row >= visible_rows {
            selected_row + 1 - visible_rows
        } else {
            0
        }
    }
}

/// One note opened for reading and editing.
#[derive(Debug, Clone)]
pub struct NoteDetail {
    pub(crate) note: Note,
    pub(crate) form: NoteForm<DetailAction>,
    pub(crate) updated_prediction: Option<String>,
}

impl NoteDetail {
    pub(crate) fn new(note: Note) -> Self {
        let form = NoteForm::with_values(&note.title, &note.body);
        Self {
            note,
            form,
            updated_prediction: None,
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn form(&self) -> &NoteForm<DetailAction> {
        &self.form
    }

    /// Message from the last "Update Prediction", never persisted.
    pub fn updated_prediction(&self) -> Option<&str> {
        self.updated_prediction.as_deref()
    }
}

/// The add-note form plus its unsaved prediction preview.
#[derive(Debug, Clone, Default)]
pub struct NewNoteScreen {
    pub(crate) form: NoteForm<NewNoteAction>,
    pub(crate) pending_prediction: Option<String>,
}

impl NewNoteScreen {
    pub fn form(&self) -> &NoteForm<NewNoteAction> {
        &self.form
    }

    pub fn pending_prediction(&self) -> Option<&str> {
        self.pending_prediction.as_deref()
    }
}

/// What the analysis screen found when it was opened.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    /// Notes exist; the selector is offered.
    Ready,
    /// The user has no notes; nothing to choose from.
    Empty,
    /// Listing notes failed; the message is shown in place of the selector.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnalysisFocus {
    Selector,
    Action(AnalysisAction),
}

/// Report chooser with the last rendered report, if any.
#[derive(Debug, Clone)]
pub struct AnalysisScreen {
    pub(crate) state: AnalysisState,
    pub(crate) selected: usize,
    pub(crate) focus: AnalysisFocus,
    pub(crate) report: Option<AnalysisReport>,
}

/// Outcome of a key on the analysis screen.
pub(crate) enum AnalysisInput {
    Handled,
    Submit(AnalysisAction),
    Ignored,
}

impl AnalysisScreen {
    pub(crate) fn new(state: AnalysisState) -> Self {
        Self {
            state,
            selected: 0,
            focus: AnalysisFocus::Selector,
            report: None,
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn selector_available(&self) -> bool {
        self.state == AnalysisState::Ready
    }

    pub fn selected_kind(&self) -> ReportKind {
        ReportKind::ALL[self.selected.min(ReportKind::ALL.len() - 1)]
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub(crate) fn action_line(&self) -> ratatui::text::Line<'static> {
        let focused = match self.focus {
            AnalysisFocus::Action(action) => Some(action),
            AnalysisFocus::Selector => None,
        };
        button_line(AnalysisAction::ALL, focused)
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode) -> AnalysisInput {
        if !self.selector_available() {
            return AnalysisInput::Ignored;
        }
        match (code, self.focus) {
            (KeyCode::Up, AnalysisFocus::Selector) => {
                self.selected = self.selected.saturating_sub(1);
                AnalysisInput::Handled
            }
            (KeyCode::Down, AnalysisFocus::Selector) => {
                self.selected = (self.selected + 1).min(ReportKind::ALL.len() - 1);
                AnalysisInput::Handled
            }
            (KeyCode::Enter, AnalysisFocus::Selector) => {
                AnalysisInput::Submit(AnalysisAction::Show)
            }
            (KeyCode::Enter, AnalysisFocus::Action(action)) => AnalysisInput::Submit(action),
            (KeyCode::Tab, _) | (KeyCode::Right, AnalysisFocus::Action(_)) => {
                self.focus = self.cycle_focus(1);
                AnalysisInput::Handled
            }
            (KeyCode::BackTab, _) | (KeyCode::Left, AnalysisFocus::Action(_)) => {
                self.focus = self.cycle_focus(-1);
                AnalysisInput::Handled
            }
            _ => AnalysisInput::Ignored,
        }
    }

    fn cycle_focus(&self, offset: isize) -> AnalysisFocus {
        let mut order = vec![AnalysisFocus::Selector];
        order.extend(AnalysisAction::ALL.iter().copied().map(AnalysisFocus::Action));
        let len = order.len() as isize;
        let index = order
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0) as isize;
        order[(index + offset).rem_euclid(len) as usize]
    }
}

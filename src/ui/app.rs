use std::mem;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, error, info, warn};
use ratatui::style::{Color, Style};

use crate::analysis::AnalysisReport;
use crate::db::{NoteRepository, RepoError};
use crate::logging::sanitize_message;
use crate::models::NoteDraft;
use crate::predict::Predictor;

use super::forms::{
    AnalysisAction, ConfirmNoteDelete, DetailAction, FormError, FormInput, LoginForm,
    NewNoteAction,
};
use super::helpers::surface_error;
use super::screens::{
    AnalysisInput, AnalysisScreen, AnalysisState, NewNoteScreen, NoteDetail, NotesGrid,
};
use super::session::{Session, View, ViewKind};

/// Modal overlays drawn on top of the active screen.
pub(crate) enum Mode {
    Normal,
    ConfirmDelete(ConfirmNoteDelete),
}

/// Holds the footer message text plus its severity.
pub(crate) struct StatusMessage {
    pub(crate) text: String,
    pub(crate) kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    pub(crate) fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Without a session only the
/// login form is reachable; with one, exactly one [`View`] is active.
pub struct App {
    pub(crate) repo: Box<dyn NoteRepository>,
    pub(crate) predictor: Box<dyn Predictor>,
    pub(crate) session: Option<Session>,
    pub(crate) login: LoginForm,
    pub(crate) mode: Mode,
    pub(crate) status: Option<StatusMessage>,
}

impl App {
    pub fn new(repo: Box<dyn NoteRepository>, predictor: Box<dyn Predictor>) -> Self {
        Self {
            repo,
            predictor,
            session: None,
            login: LoginForm::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Pre-fill the login form.
    pub fn with_login_email(mut self, email: Option<&str>) -> Self {
        self.login = LoginForm::with_email(email);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn view_kind(&self) -> Option<ViewKind> {
        self.session.as_ref().map(|session| session.view().kind())
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    pub fn status_kind(&self) -> Option<StatusKind> {
        self.status.as_ref().map(|status| status.kind)
    }

    pub fn is_confirming_delete(&self) -> bool {
        matches!(self.mode, Mode::ConfirmDelete(_))
    }

    /// Route one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.session.is_none() {
            return self.handle_login_key(code);
        }

        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => self.handle_view_key(code, &mut exit),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
        };
        exit
    }

    /// Route a raw terminal key event. Ctrl+Alt is AltGr on some layouts and
    /// types its character instead of triggering a shortcut.
    pub fn handle_key_event(&mut self, event: KeyEvent) -> bool {
        let chord = event.modifiers.contains(KeyModifiers::CONTROL)
            && !event.modifiers.contains(KeyModifiers::ALT);
        match event.code {
            KeyCode::Char(ch) if chord => self.handle_ctrl(ch),
            code => self.handle_key(code),
        }
    }

    /// Ctrl chords: Ctrl+N new note, Ctrl+A analysis, Ctrl+L logout, Ctrl+C
    /// quit. Returns `true` when the user asked to quit.
    pub fn handle_ctrl(&mut self, ch: char) -> bool {
        match ch.to_ascii_lowercase() {
            'c' => return true,
            _ if self.session.is_none() => {}
            'n' => self.show_new_note(),
            'a' => self.show_analysis(),
            'l' => self.logout(),
            _ => {}
        }
        false
    }

    /// Validate `email` and start a session for it on the notes grid.
    pub fn login(&mut self, email: &str) -> Result<(), FormError> {
        self.login.email = email.to_string();
        let email = self.login.parse_email()?;
        self.login = LoginForm::default();
        self.mode = Mode::Normal;
        self.session = Some(Session::new(email.clone()));
        info!("event=login module=ui status=ok");

        self.clear_status();
        let view = self.grid_view(&email, None);
        self.replace_view(view);
        if self.status.is_none() {
            self.set_status(format!("Logged in as {email}."), StatusKind::Info);
        }
        Ok(())
    }

    /// Drop the session and every bit of state it carried.
    pub fn logout(&mut self) {
        if self.session.take().is_some() {
            info!("event=logout module=ui status=ok");
        }
        self.mode = Mode::Normal;
        self.login = LoginForm::default();
        self.set_status("Logged out.", StatusKind::Info);
    }

    /// Jump to the note detail screen for `id`. A missing note or a storage
    /// failure reports an error and lands on the grid instead.
    pub fn open_note(&mut self, id: i64) {
        let Some(owner) = self.owner() else {
            return;
        };
        self.mode = Mode::Normal;
        self.clear_status();
        let view = self.note_view(&owner, id);
        self.replace_view(view);
    }

    /// Jump to an empty new-note form from any screen.
    pub fn show_new_note(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.mode = Mode::Normal;
        self.clear_status();
        self.replace_view(View::NewNote(NewNoteScreen::default()));
    }

    /// Jump to the analysis chooser from any screen.
    pub fn show_analysis(&mut self) {
        let Some(owner) = self.owner() else {
            return;
        };
        self.mode = Mode::Normal;
        self.clear_status();
        let view = self.analysis_view(&owner);
        self.replace_view(view);
    }

    fn owner(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|session| session.email().to_string())
    }

    fn replace_view(&mut self, view: View) {
        if let Some(previous) = self.view_kind() {
            self.show_view(previous, view);
        }
    }

    fn show_view(&mut self, previous: ViewKind, view: View) {
        if let Some(change) = previous.change_to(view.kind()) {
            debug!("event=view_change module=ui {change}");
        }
        if let Some(session) = self.session.as_mut() {
            session.show(view);
        }
    }

    fn handle_login_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => return true,
            KeyCode::Enter => {
                let email = self.login.email.clone();
                if let Err(err) = self.login(&email) {
                    self.login.error = Some(err.to_string());
                    self.set_status(err.to_string(), StatusKind::Warning);
                }
            }
            KeyCode::Backspace => {
                self.login.backspace();
                self.login.error = None;
            }
            KeyCode::Char(ch) => {
                if self.login.push_char(ch) {
                    self.login.error = None;
                }
            }
            _ => {}
        }
        false
    }

    fn handle_view_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let Some(owner) = self.owner() else {
            return Mode::Normal;
        };
        let Some(session) = self.session.as_mut() else {
            return Mode::Normal;
        };
        let previous = session.view().kind();
        let current = mem::replace(&mut session.view, View::Grid(NotesGrid::default()));

        let mut mode = Mode::Normal;
        let next = match current {
            View::Grid(grid) => self.handle_grid_key(&owner, code, grid, exit),
            View::Detail(detail) => self.handle_detail_key(&owner, code, detail, &mut mode),
            View::NewNote(screen) => self.handle_new_note_key(&owner, code, screen),
            View::Analysis(screen) => self.handle_analysis_key(&owner, code, screen),
        };

        self.show_view(previous, next);
        mode
    }

    fn handle_grid_key(
        &mut self,
        owner: &str,
        code: KeyCode,
        mut grid: NotesGrid,
        exit: &mut bool,
    ) -> View {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Left => grid.move_horizontal(-1),
            KeyCode::Right => grid.move_horizontal(1),
            KeyCode::Up => grid.move_vertical(-1),
            KeyCode::Down => grid.move_vertical(1),
            KeyCode::Enter => {
                if let Some(id) = grid.current_note().map(|note| note.id) {
                    self.clear_status();
                    return self.note_view(owner, id);
                }
                self.set_status("No note selected.", StatusKind::Error);
            }
            KeyCode::Char('+') | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.clear_status();
                return View::NewNote(NewNoteScreen::default());
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return self.analysis_view(owner);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                let focus = grid.current_note().map(|note| note.id);
                return self.grid_view(owner, focus);
            }
            _ => {}
        }
        View::Grid(grid)
    }

    fn handle_detail_key(
        &mut self,
        owner: &str,
        code: KeyCode,
        mut detail: NoteDetail,
        mode: &mut Mode,
    ) -> View {
        if code == KeyCode::Esc {
            self.clear_status();
            return self.grid_view(owner, Some(detail.note.id));
        }

        match detail.form.handle_key(code) {
            FormInput::Submit(action) => self.apply_detail_action(owner, detail, action, mode),
            FormInput::Edited => {
                self.clear_warning();
                View::Detail(detail)
            }
            FormInput::Moved | FormInput::Ignored => View::Detail(detail),
        }
    }

    fn apply_detail_action(
        &mut self,
        owner: &str,
        mut detail: NoteDetail,
        action: DetailAction,
        mode: &mut Mode,
    ) -> View {
        let id = detail.note.id;
        match action {
            DetailAction::SaveChanges => {
                let title = match detail.form.title_input() {
                    Ok(title) => title,
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Warning);
                        return View::Detail(detail);
                    }
                };
                let prediction = self.predictor.predict(&detail.form.body);
                let draft = NoteDraft::new(title.clone(), detail.form.body.clone(), prediction);
                match self.repo.update_note(owner, id, &draft) {
                    Ok(()) => {
                        self.set_status(format!("Saved changes to \"{title}\"."), StatusKind::Info);
                        self.grid_view(owner, Some(id))
                    }
                    Err(RepoError::NotFound(_)) => {
                        self.fall_back_to_grid(owner, "Note not found.".to_string())
                    }
                    Err(err) => {
                        self.report_storage_error("Failed to save note", &err);
                        View::Detail(detail)
                    }
                }
            }
            DetailAction::UpdatePrediction => {
                let prediction = self.predictor.predict(&detail.form.body);
                detail.updated_prediction = Some(prediction.message);
                self.clear_status();
                View::Detail(detail)
            }
            DetailAction::Delete => {
                self.clear_status();
                *mode = Mode::ConfirmDelete(ConfirmNoteDelete {
                    id,
                    title: detail.note.title.clone(),
                });
                View::Detail(detail)
            }
            DetailAction::Back => {
                self.clear_status();
                self.grid_view(owner, Some(id))
            }
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmNoteDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let Some(owner) = self.owner() else {
                    return Mode::Normal;
                };
                match self.repo.delete_note(&owner, confirm.id) {
                    Ok(deleted) => {
                        if deleted {
                            self.set_status(
                                format!("Deleted \"{}\".", confirm.title),
                                StatusKind::Info,
                            );
                        } else {
                            self.set_status("Note was already deleted.", StatusKind::Warning);
                        }
                        let view = self.grid_view(&owner, None);
                        self.replace_view(view);
                        Mode::Normal
                    }
                    Err(err) => {
                        self.report_storage_error("Failed to delete note", &err);
                        Mode::Normal
                    }
                }
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_new_note_key(&mut self, owner: &str, code: KeyCode, mut screen: NewNoteScreen) -> View {
        if code == KeyCode::Esc {
            return self.apply_new_note_action(owner, screen, NewNoteAction::Cancel);
        }

        match screen.form.handle_key(code) {
            FormInput::Submit(action) => self.apply_new_note_action(owner, screen, action),
            FormInput::Edited => {
                self.clear_warning();
                View::NewNote(screen)
            }
            FormInput::Moved | FormInput::Ignored => View::NewNote(screen),
        }
    }

    fn apply_new_note_action(
        &mut self,
        owner: &str,
        mut screen: NewNoteScreen,
        action: NewNoteAction,
    ) -> View {
        match action {
            NewNoteAction::GetPrediction => {
                match screen.form.body_input() {
                    Ok(body) => {
                        let prediction = self.predictor.predict(body);
                        screen.pending_prediction = Some(prediction.message);
                        self.clear_status();
                    }
                    Err(err) => self.set_status(err.to_string(), StatusKind::Warning),
                }
                View::NewNote(screen)
            }
            NewNoteAction::Save => {
                let title = match screen.form.title_input() {
                    Ok(title) => title,
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Warning);
                        return View::NewNote(screen);
                    }
                };
                let prediction = self.predictor.predict(&screen.form.body);
                let draft = NoteDraft::new(title.clone(), screen.form.body.clone(), prediction);
                match self.repo.create_note(owner, &draft) {
                    Ok(note) => {
                        self.set_status(format!("Saved \"{title}\"."), StatusKind::Info);
                        self.grid_view(owner, Some(note.id))
                    }
                    Err(err) => {
                        self.report_storage_error("Failed to save note", &err);
                        View::NewNote(screen)
                    }
                }
            }
            NewNoteAction::Cancel => {
                self.clear_status();
                self.grid_view(owner, None)
            }
        }
    }

    fn handle_analysis_key(&mut self, owner: &str, code: KeyCode, mut screen: AnalysisScreen) -> View {
        if code == KeyCode::Esc {
            self.clear_status();
            return self.grid_view(owner, None);
        }

        match screen.handle_key(code) {
            AnalysisInput::Submit(AnalysisAction::Show) => {
                let kind = screen.selected_kind();
                match AnalysisReport::load(self.repo.as_ref(), owner, kind) {
                    Ok(report) => {
                        debug!(
                            "event=analysis_report module=ui status=ok kind={} notes={}",
                            kind.label(),
                            report.note_count()
                        );
                        screen.report = Some(report);
                        self.clear_status();
                    }
                    Err(err) => {
                        self.report_storage_error(&format!("Failed to build {kind} analysis"), &err);
                    }
                }
                View::Analysis(screen)
            }
            AnalysisInput::Submit(AnalysisAction::Back) => {
                self.clear_status();
                self.grid_view(owner, None)
            }
            AnalysisInput::Handled | AnalysisInput::Ignored => View::Analysis(screen),
        }
    }

    /// Fresh grid for `owner`, optionally keeping `focus_id` selected.
    fn grid_view(&mut self, owner: &str, focus_id: Option<i64>) -> View {
        match self.repo.list_notes(owner) {
            Ok(notes) => {
                let mut grid = NotesGrid::new(notes);
                if let Some(id) = focus_id {
                    grid.select_id(id);
                }
                View::Grid(grid)
            }
            Err(err) => {
                let message = self.report_storage_error("Failed to load notes", &err);
                View::Grid(NotesGrid::failed(message))
            }
        }
    }

    fn note_view(&mut self, owner: &str, id: i64) -> View {
        match self.repo.get_note(owner, id) {
            Ok(Some(note)) => View::Detail(NoteDetail::new(note)),
            Ok(None) => {
                warn!("event=note_open module=ui status=not_found id={id}");
                self.fall_back_to_grid(owner, "Note not found.".to_string())
            }
            Err(err) => {
                let message = self.report_storage_error("Failed to load note", &err);
                self.fall_back_to_grid(owner, message)
            }
        }
    }

    /// Show the grid but keep `message` in the footer. A failed reload of the
    /// grid is still shown in the grid body.
    fn fall_back_to_grid(&mut self, owner: &str, message: String) -> View {
        let view = self.grid_view(owner, None);
        self.set_status(message, StatusKind::Error);
        view
    }

    fn analysis_view(&mut self, owner: &str) -> View {
        let state = match self.repo.list_notes(owner) {
            Ok(notes) if notes.is_empty() => {
                self.set_status("No notes found.", StatusKind::Error);
                AnalysisState::Empty
            }
            Ok(_) => AnalysisState::Ready,
            Err(err) => {
                AnalysisState::Failed(self.report_storage_error("Failed to fetch analysis data", &err))
            }
        };
        View::Analysis(AnalysisScreen::new(state))
    }

    /// Log a repository failure, show it in the footer and hand back the text.
    fn report_storage_error(&mut self, context: &str, err: &RepoError) -> String {
        let message = format!("{context}: {}", surface_error(err));
        error!(
            "event=storage_error module=ui status=error context={} error={}",
            sanitize_message(context, 80),
            sanitize_message(&err.to_string(), 160)
        );
        self.set_status(message.clone(), StatusKind::Error);
        message
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Drop a validation warning once the user starts correcting the input.
    fn clear_warning(&mut self) {
        if self.status_kind() == Some(StatusKind::Warning) {
            self.clear_status();
        }
    }
}

use crossterm::event::KeyCode;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use thiserror::Error;

/// Validation failures raised before anything reaches the repository. They are
/// shown as warnings and never change the active screen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter a title.")]
    EmptyTitle,
    #[error("Note body is empty.")]
    EmptyBody,
    #[error("Please enter your email.")]
    EmptyEmail,
    #[error("`{0}` is not a valid email address.")]
    InvalidEmail(String),
}

/// A fixed row of buttons rendered under a form.
pub trait ActionRow: Copy + PartialEq + 'static {
    const ALL: &'static [Self];
    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    SaveChanges,
    UpdatePrediction,
    Delete,
    Back,
}

impl ActionRow for DetailAction {
    const ALL: &'static [Self] = &[
        DetailAction::SaveChanges,
        DetailAction::UpdatePrediction,
        DetailAction::Delete,
        DetailAction::Back,
    ];

    fn label(self) -> &'static str {
        match self {
            DetailAction::SaveChanges => "Save Changes",
            DetailAction::UpdatePrediction => "Update Prediction",
            DetailAction::Delete => "Delete Note",
            DetailAction::Back => "Back to All Notes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewNoteAction {
    GetPrediction,
    Save,
    Cancel,
}

impl ActionRow for NewNoteAction {
    const ALL: &'static [Self] = &[
        NewNoteAction::GetPrediction,
        NewNoteAction::Save,
        NewNoteAction::Cancel,
    ];

    fn label(self) -> &'static str {
        match self {
            NewNoteAction::GetPrediction => "Get Prediction",
            NewNoteAction::Save => "Save",
            NewNoteAction::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisAction {
    Show,
    Back,
}

impl ActionRow for AnalysisAction {
    const ALL: &'static [Self] = &[AnalysisAction::Show, AnalysisAction::Back];

    fn label(self) -> &'static str {
        match self {
            AnalysisAction::Show => "Show Analysis",
            AnalysisAction::Back => "Back to Notes",
        }
    }
}

/// Which part of a note form receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus<A> {
    Title,
    Body,
    Action(A),
}

impl<A: ActionRow> Focus<A> {
    fn order() -> Vec<Self> {
        let mut order = vec![Focus::Title, Focus::Body];
        order.extend(A::ALL.iter().copied().map(Focus::Action));
        order
    }

    /// Tab order: title, body, then every button, wrapping around.
    pub fn next(self) -> Self {
        self.step(1)
    }

    pub fn prev(self) -> Self {
        self.step(-1)
    }

    fn step(self, offset: isize) -> Self {
        let order = Self::order();
        let len = order.len() as isize;
        let index = order.iter().position(|focus| *focus == self).unwrap_or(0) as isize;
        order[(index + offset).rem_euclid(len) as usize]
    }
}

/// Outcome of feeding one key to a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput<A> {
    Edited,
    Moved,
    Submit(A),
    Ignored,
}

/// Title/body editor shared by the new-note and note-detail screens. `A` is
/// the button row shown beneath the inputs.
#[derive(Debug, Clone)]
pub struct NoteForm<A> {
    pub title: String,
    pub body: String,
    pub focus: Focus<A>,
}

impl<A: ActionRow> Default for NoteForm<A> {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            focus: Focus::Title,
        }
    }
}

impl<A: ActionRow> NoteForm<A> {
    /// Seed the inputs, e.g. from an existing note when editing.
    pub fn with_values(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            focus: Focus::Title,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> FormInput<A> {
        match code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                FormInput::Moved
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                FormInput::Moved
            }
            KeyCode::Enter => match self.focus {
                Focus::Title => {
                    self.focus = Focus::Body;
                    FormInput::Moved
                }
                Focus::Body => {
                    self.body.push('\n');
                    FormInput::Edited
                }
                Focus::Action(action) => FormInput::Submit(action),
            },
            KeyCode::Backspace => match self.focus {
                Focus::Title => {
                    self.title.pop();
                    FormInput::Edited
                }
                Focus::Body => {
                    self.body.pop();
                    FormInput::Edited
                }
                Focus::Action(_) => FormInput::Ignored,
            },
            KeyCode::Left | KeyCode::Right => match self.focus {
                Focus::Action(action) => {
                    self.focus = Focus::Action(step_action(action, code == KeyCode::Right));
                    FormInput::Moved
                }
                _ => FormInput::Ignored,
            },
            KeyCode::Char(ch) if !ch.is_control() => match self.focus {
                Focus::Title => {
                    self.title.push(ch);
                    FormInput::Edited
                }
                Focus::Body => {
                    self.body.push(ch);
                    FormInput::Edited
                }
                Focus::Action(_) => FormInput::Ignored,
            },
            _ => FormInput::Ignored,
        }
    }

    /// Trimmed title, rejected when blank.
    pub fn title_input(&self) -> Result<String, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            Err(FormError::EmptyTitle)
        } else {
            Ok(title.to_string())
        }
    }

    /// Body as typed, rejected when it holds only whitespace.
    pub fn body_input(&self) -> Result<&str, FormError> {
        if self.body.trim().is_empty() {
            Err(FormError::EmptyBody)
        } else {
            Ok(&self.body)
        }
    }

    pub fn title_focused(&self) -> bool {
        self.focus == Focus::Title
    }

    pub fn body_focused(&self) -> bool {
        self.focus == Focus::Body
    }

    /// Button row with the focused action highlighted.
    pub fn action_line(&self) -> Line<'static> {
        let focused = match self.focus {
            Focus::Action(action) => Some(action),
            _ => None,
        };
        button_line(A::ALL, focused)
    }
}

fn step_action<A: ActionRow>(current: A, forward: bool) -> A {
    let len = A::ALL.len() as isize;
    let index = A::ALL
        .iter()
        .position(|action| *action == current)
        .unwrap_or(0) as isize;
    let offset = if forward { 1 } else { -1 };
    A::ALL[(index + offset).rem_euclid(len) as usize]
}

/// Render a row of `[ Label ]` buttons.
pub(crate) fn button_line<A: ActionRow>(actions: &[A], focused: Option<A>) -> Line<'static> {
    let mut spans = Vec::with_capacity(actions.len() * 2);
    for (index, action) in actions.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("   "));
        }
        let style = if focused == Some(*action) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("[ {} ]", action.label()), style));
    }
    Line::from(spans)
}

/// Pending deletion awaiting a yes/no answer.
#[derive(Debug, Clone)]
pub(crate) struct ConfirmNoteDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

/// Identity prompt shown while nobody is logged in.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn with_email(email: Option<&str>) -> Self {
        Self {
            email: email.unwrap_or_default().trim().to_string(),
            error: None,
        }
    }

    pub fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || ch.is_whitespace() {
            return false;
        }
        self.email.push(ch);
        true
    }

    pub fn backspace(&mut self) {
        self.email.pop();
    }

    /// Validate the email and normalize it to lowercase so the same person
    /// always maps to the same notes.
    pub fn parse_email(&self) -> Result<String, FormError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::EmptyEmail);
        }

        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };

        if valid {
            Ok(email.to_lowercase())
        } else {
            Err(FormError::InvalidEmail(email.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_cycles_fields_then_buttons() {
        let mut form: NoteForm<NewNoteAction> = NoteForm::default();
        assert_eq!(form.focus, Focus::Title);
        form.handle_key(KeyCode::Tab);
        assert_eq!(form.focus, Focus::Body);
        form.handle_key(KeyCode::Tab);
        assert_eq!(form.focus, Focus::Action(NewNoteAction::GetPrediction));
        form.handle_key(KeyCode::Tab);
        form.handle_key(KeyCode::Tab);
        assert_eq!(form.focus, Focus::Action(NewNoteAction::Cancel));
        form.handle_key(KeyCode::Tab);
        assert_eq!(form.focus, Focus::Title);
        form.handle_key(KeyCode::BackTab);
        assert_eq!(form.focus, Focus::Action(NewNoteAction::Cancel));
    }

    #[test]
    fn enter_moves_from_title_and_breaks_lines_in_body() {
        let mut form: NoteForm<DetailAction> = NoteForm::default();
        form.handle_key(KeyCode::Char('T'));
        assert_eq!(form.handle_key(KeyCode::Enter), FormInput::Moved);
        form.handle_key(KeyCode::Char('a'));
        form.handle_key(KeyCode::Enter);
        form.handle_key(KeyCode::Char('b'));
        assert_eq!(form.title, "T");
        assert_eq!(form.body, "a\nb");
    }

    #[test]
    fn enter_on_button_submits_it() {
        let mut form: NoteForm<DetailAction> = NoteForm::default();
        form.focus = Focus::Action(DetailAction::Delete);
        assert_eq!(
            form.handle_key(KeyCode::Enter),
            FormInput::Submit(DetailAction::Delete)
        );
        assert_eq!(form.handle_key(KeyCode::Char('x')), FormInput::Ignored);
    }

    #[test]
    fn arrows_walk_the_button_row() {
        let mut form: NoteForm<DetailAction> = NoteForm::default();
        assert_eq!(form.handle_key(KeyCode::Right), FormInput::Ignored);
        form.focus = Focus::Action(DetailAction::SaveChanges);
        form.handle_key(KeyCode::Left);
        assert_eq!(form.focus, Focus::Action(DetailAction::Back));
        form.handle_key(KeyCode::Right);
        form.handle_key(KeyCode::Right);
        assert_eq!(form.focus, Focus::Action(DetailAction::UpdatePrediction));
    }

    #[test]
    fn blank_inputs_are_rejected() {
        let form: NoteForm<NewNoteAction> = NoteForm::with_values("   ", " \n ");
        assert_eq!(form.title_input(), Err(FormError::EmptyTitle));
        assert_eq!(form.body_input(), Err(FormError::EmptyBody));

        let form: NoteForm<NewNoteAction> = NoteForm::with_values("  Day one ", "text");
        assert_eq!(form.title_input().unwrap(), "Day one");
        assert_eq!(form.body_input().unwrap(), "text");
    }

    #[test]
    fn login_accepts_plain_addresses() {
        let form = LoginForm::with_email(Some(" Ada@Example.com "));
        assert_eq!(form.parse_email().unwrap(), "ada@example.com");
    }

    #[test]
    fn login_rejects_malformed_addresses() {
        assert_eq!(LoginForm::default().parse_email(), Err(FormError::EmptyEmail));
        for raw in ["ada", "@example.com", "ada@", "ada@example", "a@b@c.com", "ada@.com"] {
            let form = LoginForm::with_email(Some(raw));
            assert!(
                matches!(form.parse_email(), Err(FormError::InvalidEmail(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn login_ignores_whitespace_keys() {
        let mut form = LoginForm::default();
        assert!(!form.push_char(' '));
        assert!(form.push_char('a'));
        form.backspace();
        assert!(form.email.is_empty());
    }
}

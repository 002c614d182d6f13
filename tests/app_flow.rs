use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use harmony_notes::db::RepoResult;
use harmony_notes::ui::{AnalysisState, StatusKind, View, ViewKind};
use harmony_notes::{
    open_in_memory, App, Note, NoteDraft, NoteRepository, Prediction, RepoError,
    SqliteNoteRepository,
};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

const EMAIL: &str = "ada@example.com";
const FIXED_MESSAGE: &str = "High depression risk";

/// Handles shared between a test and the repository the app owns.
#[derive(Clone)]
struct Store {
    notes: Rc<SqliteNoteRepository>,
    writes: Rc<Cell<usize>>,
    fail_get: Rc<Cell<bool>>,
    fail_list: Rc<Cell<bool>>,
}

impl Store {
    fn new() -> Self {
        Self {
            notes: Rc::new(SqliteNoteRepository::new(
                open_in_memory().expect("in-memory db"),
            )),
            writes: Rc::new(Cell::new(0)),
            fail_get: Rc::new(Cell::new(false)),
            fail_list: Rc::new(Cell::new(false)),
        }
    }
}

fn storage_failure() -> RepoError {
    RepoError::Sqlite(rusqlite::Error::InvalidQuery)
}

/// Repository wrapper that counts every write it forwards and can be told to
/// fail reads.
struct RecordingRepo {
    store: Store,
}

impl NoteRepository for RecordingRepo {
    fn list_notes(&self, owner: &str) -> RepoResult<Vec<Note>> {
        if self.store.fail_list.get() {
            return Err(storage_failure());
        }
        self.store.notes.list_notes(owner)
    }

    fn get_note(&self, owner: &str, id: i64) -> RepoResult<Option<Note>> {
        if self.store.fail_get.get() {
            return Err(storage_failure());
        }
        self.store.notes.get_note(owner, id)
    }

    fn create_note(&self, owner: &str, draft: &NoteDraft) -> RepoResult<Note> {
        self.store.writes.set(self.store.writes.get() + 1);
        self.store.notes.create_note(owner, draft)
    }

    fn update_note(&self, owner: &str, id: i64, draft: &NoteDraft) -> RepoResult<()> {
        self.store.writes.set(self.store.writes.get() + 1);
        self.store.notes.update_note(owner, id, draft)
    }

    fn delete_note(&self, owner: &str, id: i64) -> RepoResult<bool> {
        self.store.writes.set(self.store.writes.get() + 1);
        self.store.notes.delete_note(owner, id)
    }
}

/// Repository whose every call fails at the storage layer.
struct BrokenRepo;

impl NoteRepository for BrokenRepo {
    fn list_notes(&self, _owner: &str) -> RepoResult<Vec<Note>> {
        Err(storage_failure())
    }

    fn get_note(&self, _owner: &str, _id: i64) -> RepoResult<Option<Note>> {
        Err(storage_failure())
    }

    fn create_note(&self, _owner: &str, _draft: &NoteDraft) -> RepoResult<Note> {
        Err(storage_failure())
    }

    fn update_note(&self, _owner: &str, _id: i64, _draft: &NoteDraft) -> RepoResult<()> {
        Err(storage_failure())
    }

    fn delete_note(&self, _owner: &str, _id: i64) -> RepoResult<bool> {
        Err(storage_failure())
    }
}

fn fixed_prediction(_text: &str) -> Prediction {
    Prediction {
        depression: 0.8,
        schizophrenia: 0.1,
        message: FIXED_MESSAGE.to_string(),
    }
}

fn app_with_store() -> (App, Store) {
    let store = Store::new();
    let repo = RecordingRepo {
        store: store.clone(),
    };
    let app = App::new(Box::new(repo), Box::new(fixed_prediction));
    (app, store)
}

fn app_with_writes() -> (App, Rc<Cell<usize>>) {
    let (app, store) = app_with_store();
    (app, store.writes)
}

fn logged_in_app() -> (App, Rc<Cell<usize>>) {
    let (mut app, writes) = app_with_writes();
    app.login(EMAIL).expect("valid email");
    (app, writes)
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.handle_key(KeyCode::Char(ch));
    }
}

fn press(app: &mut App, code: KeyCode, times: usize) {
    for _ in 0..times {
        app.handle_key(code);
    }
}

/// From a fresh new-note form: fill both inputs and press Save.
fn save_new_note(app: &mut App, title: &str, body: &str) {
    type_text(app, title);
    app.handle_key(KeyCode::Tab);
    type_text(app, body);
    // Body -> Get Prediction -> Save
    press(app, KeyCode::Tab, 2);
    app.handle_key(KeyCode::Enter);
}

fn grid_ids(app: &App) -> Vec<i64> {
    match app.session().map(|session| session.view()) {
        Some(View::Grid(grid)) => grid.notes().iter().map(|note| note.id).collect(),
        other => panic!("expected grid, got {:?}", other.map(|view| view.kind())),
    }
}

fn render(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("test terminal");
    terminal.draw(|frame| app.draw(frame)).expect("draw");
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    let symbols: Vec<&str> = buffer.content().iter().map(|cell| cell.symbol()).collect();
    symbols
        .chunks(width)
        .map(|row| row.concat())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn login_gate_rejects_bad_email_and_accepts_a_good_one() {
    let (mut app, _) = app_with_writes();
    assert!(app.session().is_none());

    type_text(&mut app, "not-an-email");
    assert!(!app.handle_key(KeyCode::Enter));
    assert!(app.session().is_none());
    assert_eq!(app.status_kind(), Some(StatusKind::Warning));

    press(&mut app, KeyCode::Backspace, "not-an-email".len());
    type_text(&mut app, "Ada@Example.com");
    app.handle_key(KeyCode::Enter);

    let session = app.session().expect("logged in");
    assert_eq!(session.email(), EMAIL);
    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
}

#[test]
fn shortcuts_do_nothing_before_login() {
    let (mut app, _) = app_with_writes();
    assert!(!app.handle_ctrl('n'));
    assert!(!app.handle_ctrl('a'));
    assert!(app.session().is_none());
    assert!(app.handle_ctrl('c'));
}

#[test]
fn logout_from_every_screen_returns_to_login() {
    let (mut app, _) = logged_in_app();
    app.show_new_note();
    save_new_note(&mut app, "Day one", "felt fine");
    let id = grid_ids(&app)[0];

    let jumps: [fn(&mut App, i64); 4] = [
        |_, _| {},
        |app, id| app.open_note(id),
        |app, _| app.show_new_note(),
        |app, _| app.show_analysis(),
    ];
    for jump in jumps {
        app.login(EMAIL).expect("valid email");
        jump(&mut app, id);
        assert!(app.session().is_some());
        app.handle_ctrl('l');
        assert!(app.session().is_none());
        assert_eq!(app.status_text(), Some("Logged out."));
    }

    let screen = render(&app);
    assert!(screen.contains("Log in"));
    assert!(!screen.contains(EMAIL));
}

#[test]
fn saving_a_new_note_stores_the_prediction() {
    let (mut app, writes) = logged_in_app();
    app.handle_key(KeyCode::Char('+'));
    assert_eq!(app.view_kind(), Some(ViewKind::NewNote));

    save_new_note(&mut app, "Monday", "long day at work");

    assert_eq!(writes.get(), 1);
    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert_eq!(app.status_text(), Some("Saved \"Monday\"."));
    let id = grid_ids(&app)[0];
    app.open_note(id);
    match app.session().map(|session| session.view()) {
        Some(View::Detail(detail)) => {
            assert_eq!(detail.note().body, "long day at work");
            assert_eq!(detail.note().prediction_message, FIXED_MESSAGE);
            assert_eq!(detail.note().pred_depression, 0.8);
        }
        _ => panic!("expected detail view"),
    }
}

#[test]
fn get_prediction_previews_without_writing() {
    let (mut app, writes) = logged_in_app();
    app.show_new_note();
    type_text(&mut app, "Draft");
    app.handle_key(KeyCode::Tab);
    type_text(&mut app, "some thoughts");
    app.handle_key(KeyCode::Tab);
    app.handle_key(KeyCode::Enter);

    assert_eq!(writes.get(), 0);
    match app.session().map(|session| session.view()) {
        Some(View::NewNote(screen)) => {
            assert_eq!(screen.pending_prediction(), Some(FIXED_MESSAGE));
            assert_eq!(screen.form().title, "Draft");
        }
        _ => panic!("expected new-note view"),
    }
    assert!(render(&app).contains("Prediction: High depression risk"));
}

#[test]
fn empty_title_blocks_saving() {
    let (mut app, writes) = logged_in_app();
    app.show_new_note();
    save_new_note(&mut app, "   ", "body without a title");

    assert_eq!(writes.get(), 0);
    assert_eq!(app.view_kind(), Some(ViewKind::NewNote));
    assert_eq!(app.status_text(), Some("Please enter a title."));
    assert_eq!(app.status_kind(), Some(StatusKind::Warning));
}

#[test]
fn empty_body_blocks_a_prediction() {
    let (mut app, _) = logged_in_app();
    app.show_new_note();
    type_text(&mut app, "Title only");
    press(&mut app, KeyCode::Tab, 2);
    app.handle_key(KeyCode::Enter);

    assert_eq!(app.status_text(), Some("Note body is empty."));
    match app.session().map(|session| session.view()) {
        Some(View::NewNote(screen)) => assert!(screen.pending_prediction().is_none()),
        _ => panic!("expected new-note view"),
    }
}

#[test]
fn seven_notes_render_as_two_grid_rows() {
    let (mut app, _) = logged_in_app();
    for n in 1..=7 {
        app.show_new_note();
        save_new_note(&mut app, &format!("Note {n}"), "text");
    }

    match app.session().map(|session| session.view()) {
        Some(View::Grid(grid)) => {
            let rows = grid.rows();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].len(), 5);
            assert_eq!(rows[1].len(), 2);
            assert_eq!(rows[1][1].title, "Note 7");
        }
        _ => panic!("expected grid"),
    }
    let screen = render(&app);
    assert!(screen.contains("Note 1"));
    assert!(screen.contains("Note 7"));
}

#[test]
fn empty_grid_invites_a_first_note() {
    let (app, _) = logged_in_app();
    let screen = render(&app);
    assert!(screen.contains("No notes saved yet! Press '+' to write one."));
    assert!(screen.contains(EMAIL));
}

#[test]
fn opening_an_unknown_note_falls_back_to_the_grid() {
    let (mut app, _) = logged_in_app();
    app.open_note(999);

    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert_eq!(app.status_text(), Some("Note not found."));
    assert_eq!(app.status_kind(), Some(StatusKind::Error));
}

#[test]
fn save_changes_updates_in_place() {
    let (mut app, writes) = logged_in_app();
    for title in ["First", "Second", "Third"] {
        app.show_new_note();
        save_new_note(&mut app, title, "original");
    }
    let before = grid_ids(&app);

    app.open_note(before[1]);
    assert_eq!(app.view_kind(), Some(ViewKind::Detail(before[1])));
    type_text(&mut app, " edited");
    // Title -> Body -> Save Changes
    press(&mut app, KeyCode::Tab, 2);
    app.handle_key(KeyCode::Enter);

    assert_eq!(writes.get(), 4);
    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert_eq!(app.status_text(), Some("Saved changes to \"Second edited\"."));
    let after = grid_ids(&app);
    assert_eq!(before, after);
    match app.session().map(|session| session.view()) {
        Some(View::Grid(grid)) => {
            assert_eq!(grid.notes()[1].title, "Second edited");
            assert_eq!(grid.current_note().map(|note| note.id), Some(before[1]));
        }
        _ => panic!("expected grid"),
    }
}

#[test]
fn update_prediction_is_only_a_preview() {
    let (mut app, writes) = logged_in_app();
    app.show_new_note();
    save_new_note(&mut app, "Entry", "before");
    let id = grid_ids(&app)[0];
    let writes_after_save = writes.get();

    app.open_note(id);
    // Title -> Body -> Save Changes -> Update Prediction
    press(&mut app, KeyCode::Tab, 3);
    app.handle_key(KeyCode::Enter);

    assert_eq!(writes.get(), writes_after_save);
    match app.session().map(|session| session.view()) {
        Some(View::Detail(detail)) => {
            assert_eq!(detail.updated_prediction(), Some(FIXED_MESSAGE));
        }
        _ => panic!("expected detail view"),
    }
    assert!(render(&app).contains("Updated Prediction:"));
}

#[test]
fn delete_asks_first_and_can_be_cancelled() {
    let (mut app, _) = logged_in_app();
    app.show_new_note();
    save_new_note(&mut app, "Keep me", "maybe");
    app.show_new_note();
    save_new_note(&mut app, "Drop me", "surely");
    let ids = grid_ids(&app);

    app.open_note(ids[1]);
    // Title -> Body -> Save Changes -> Update Prediction -> Delete Note
    press(&mut app, KeyCode::Tab, 4);
    app.handle_key(KeyCode::Enter);
    assert!(app.is_confirming_delete());
    assert!(render(&app).contains("Delete \"Drop me\"?"));

    app.handle_key(KeyCode::Char('n'));
    assert!(!app.is_confirming_delete());
    assert_eq!(app.view_kind(), Some(ViewKind::Detail(ids[1])));
    assert_eq!(app.status_text(), Some("Deletion cancelled."));

    app.handle_key(KeyCode::Enter);
    assert!(app.is_confirming_delete());
    app.handle_key(KeyCode::Char('y'));

    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert_eq!(app.status_text(), Some("Deleted \"Drop me\"."));
    assert_eq!(grid_ids(&app), vec![ids[0]]);
}

#[test]
fn escape_leaves_forms_without_saving() {
    let (mut app, writes) = logged_in_app();
    app.show_new_note();
    type_text(&mut app, "Unsaved");
    app.handle_key(KeyCode::Esc);

    assert_eq!(writes.get(), 0);
    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert!(grid_ids(&app).is_empty());
}

#[test]
fn analysis_without_notes_offers_no_selector() {
    let (mut app, _) = logged_in_app();
    app.handle_key(KeyCode::Char('a'));

    match app.session().map(|session| session.view()) {
        Some(View::Analysis(screen)) => {
            assert_eq!(screen.state(), &AnalysisState::Empty);
            assert!(!screen.selector_available());
        }
        _ => panic!("expected analysis view"),
    }
    let screen = render(&app);
    assert!(screen.contains("No notes found."));
    assert!(!screen.contains("Choose which analysis you need to see"));
}

#[test]
fn analysis_report_summarises_saved_scores() {
    let (mut app, _) = logged_in_app();
    for title in ["One", "Two"] {
        app.show_new_note();
        save_new_note(&mut app, title, "words");
    }

    app.handle_ctrl('a');
    app.handle_key(KeyCode::Enter);

    match app.session().map(|session| session.view()) {
        Some(View::Analysis(screen)) => {
            assert!(screen.selector_available());
            let report = screen.report().expect("report loaded");
            assert_eq!(report.note_count(), 2);
            let mean = report.mean().expect("mean");
            assert!((mean - 0.8).abs() < 1e-9);
        }
        _ => panic!("expected analysis view"),
    }
    let screen = render(&app);
    assert!(screen.contains("Choose which analysis you need to see"));
    assert!(screen.contains("Notes analysed: 2"));
}

#[test]
fn storage_failures_are_reported_not_fatal() {
    let mut app = App::new(Box::new(BrokenRepo), Box::new(fixed_prediction));
    app.login(EMAIL).expect("valid email");

    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert_eq!(app.status_kind(), Some(StatusKind::Error));
    assert!(app
        .status_text()
        .is_some_and(|text| text.starts_with("Failed to load notes")));

    app.show_analysis();
    match app.session().map(|session| session.view()) {
        Some(View::Analysis(screen)) => {
            assert!(matches!(screen.state(), AnalysisState::Failed(message)
                if message.starts_with("Failed to fetch analysis data")));
        }
        _ => panic!("expected analysis view"),
    }
}

#[test]
fn quitting_from_the_grid_and_ctrl_c_anywhere() {
    let (mut app, _) = logged_in_app();
    app.show_new_note();
    assert!(!app.handle_key(KeyCode::Char('q')));
    assert!(app.handle_ctrl('c'));
    app.handle_key(KeyCode::Esc);
    assert!(app.handle_key(KeyCode::Char('q')));
}

#[test]
fn altgr_characters_reach_the_login_form() {
    let (mut app, _) = app_with_writes();
    type_text(&mut app, "ada");
    let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
    assert!(!app.handle_key_event(KeyEvent::new(KeyCode::Char('@'), altgr)));
    type_text(&mut app, "example.com");
    app.handle_key(KeyCode::Enter);

    assert_eq!(app.session().map(|session| session.email()), Some(EMAIL));
}

#[test]
fn plain_control_chords_stay_shortcuts() {
    let (mut app, _) = logged_in_app();
    app.handle_key_event(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL));
    assert_eq!(app.view_kind(), Some(ViewKind::NewNote));
    match app.session().map(|session| session.view()) {
        Some(View::NewNote(screen)) => assert!(screen.form().title.is_empty()),
        _ => panic!("expected new-note view"),
    }

    app.handle_key_event(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
    match app.session().map(|session| session.view()) {
        Some(View::NewNote(screen)) => assert_eq!(screen.form().title, "x"),
        _ => panic!("expected new-note view"),
    }
    assert!(app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
}

#[test]
fn failing_note_lookup_falls_back_to_the_grid() {
    let (mut app, store) = app_with_store();
    app.login(EMAIL).expect("valid email");
    app.show_new_note();
    save_new_note(&mut app, "Kept", "still listed");
    let id = grid_ids(&app)[0];

    store.fail_get.set(true);
    app.handle_key(KeyCode::Enter);

    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert_eq!(app.status_kind(), Some(StatusKind::Error));
    assert!(app
        .status_text()
        .is_some_and(|text| text.starts_with("Failed to load note: ")));
    assert_eq!(grid_ids(&app), vec![id]);
}

#[test]
fn lookup_error_survives_a_failing_grid_reload() {
    let (mut app, store) = app_with_store();
    app.login(EMAIL).expect("valid email");
    store.fail_get.set(true);
    store.fail_list.set(true);
    app.open_note(1);

    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert!(app
        .status_text()
        .is_some_and(|text| text.starts_with("Failed to load note: ")));
    assert!(render(&app).contains("Failed to load notes"));
}

#[test]
fn blank_title_keeps_the_note_open() {
    let (mut app, writes) = logged_in_app();
    app.show_new_note();
    save_new_note(&mut app, "Named", "body");
    let id = grid_ids(&app)[0];
    let writes_after_save = writes.get();

    app.open_note(id);
    press(&mut app, KeyCode::Backspace, "Named".len());
    // Title -> Body -> Save Changes
    press(&mut app, KeyCode::Tab, 2);
    app.handle_key(KeyCode::Enter);

    assert_eq!(writes.get(), writes_after_save);
    assert_eq!(app.view_kind(), Some(ViewKind::Detail(id)));
    assert_eq!(app.status_text(), Some("Please enter a title."));
    assert_eq!(app.status_kind(), Some(StatusKind::Warning));
}

#[test]
fn saving_a_vanished_note_returns_to_the_grid() {
    let (mut app, store) = app_with_store();
    app.login(EMAIL).expect("valid email");
    app.show_new_note();
    save_new_note(&mut app, "Fleeting", "here now");
    let id = grid_ids(&app)[0];

    app.open_note(id);
    assert!(store.notes.delete_note(EMAIL, id).unwrap());
    // Title -> Body -> Save Changes
    press(&mut app, KeyCode::Tab, 2);
    app.handle_key(KeyCode::Enter);

    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert_eq!(app.status_text(), Some("Note not found."));
    assert_eq!(app.status_kind(), Some(StatusKind::Error));
    assert!(grid_ids(&app).is_empty());
}

#[test]
fn confirming_a_delete_after_the_note_vanished_warns() {
    let (mut app, store) = app_with_store();
    app.login(EMAIL).expect("valid email");
    app.show_new_note();
    save_new_note(&mut app, "Twice", "gone");
    let id = grid_ids(&app)[0];

    app.open_note(id);
    // Title -> Body -> Save Changes -> Update Prediction -> Delete Note
    press(&mut app, KeyCode::Tab, 4);
    app.handle_key(KeyCode::Enter);
    assert!(app.is_confirming_delete());

    assert!(store.notes.delete_note(EMAIL, id).unwrap());
    app.handle_key(KeyCode::Char('y'));

    assert!(!app.is_confirming_delete());
    assert_eq!(app.view_kind(), Some(ViewKind::Grid));
    assert_eq!(app.status_text(), Some("Note was already deleted."));
    assert_eq!(app.status_kind(), Some(StatusKind::Warning));
}

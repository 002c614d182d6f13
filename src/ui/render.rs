use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    BarChart, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Sparkline, Wrap,
};
use ratatui::Frame;

use crate::analysis::{AnalysisReport, ReportKind};

use super::app::{App, Mode};
use super::forms::{ActionRow, ConfirmNoteDelete, NoteForm};
use super::helpers::{build_note_card_lines, centered_rect, truncate_chars};
use super::screens::{
    AnalysisFocus, AnalysisScreen, AnalysisState, NewNoteScreen, NoteDetail, NotesGrid,
    GRID_COLUMNS,
};
use super::session::{Session, View};

/// Header space holding the app name and the logged-in identity.
const HEADER_HEIGHT: u16 = 2;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Fixed height of a note card in the grid.
const CARD_HEIGHT: u16 = 8;
/// Height of the bordered single-line title input.
const TITLE_INPUT_HEIGHT: u16 = 3;

impl App {
    /// Draw the whole frame: login screen when logged out, otherwise header,
    /// the active view, footer and any modal.
    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.session {
            None => self.draw_login(frame, content_area),
            Some(session) => self.draw_session(frame, content_area, session),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::ConfirmDelete(confirm) = &self.mode {
            self.draw_confirm_delete(frame, area, confirm);
        }
    }

    fn draw_session(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)])
            .split(area);

        let header = Line::from(vec![
            Span::styled(
                "Project Harmony",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(session.email().to_string(), Style::default().fg(Color::Gray)),
        ]);
        frame.render_widget(
            Paragraph::new(header).block(Block::default().borders(Borders::BOTTOM)),
            chunks[0],
        );

        match session.view() {
            View::Grid(grid) => self.draw_notes_grid(frame, chunks[1], grid),
            View::Detail(detail) => self.draw_note_detail(frame, chunks[1], detail),
            View::NewNote(screen) => self.draw_new_note(frame, chunks[1], screen),
            View::Analysis(screen) => self.draw_analysis(frame, chunks[1], screen),
        }
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Project Harmony · Log in")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(vec![
                Span::raw("Email: "),
                Span::styled(self.login.email.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
        ];
        if let Some(error) = &self.login.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to log in • Esc to quit",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if inner.width > 0 && inner.height > 0 {
            let offset = ("Email: ".len() + self.login.email.chars().count()) as u16;
            let cursor_x = inner.x + offset.min(inner.width.saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_notes_grid(&self, frame: &mut Frame, area: Rect, grid: &NotesGrid) {
        if grid.notes().is_empty() {
            let (text, style) = match &grid.load_error {
                Some(error) => (error.clone(), Style::default().fg(Color::Red)),
                None => (
                    "No notes saved yet! Press '+' to write one.".to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            };
            let message = Paragraph::new(text)
                .style(style)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        let rows = grid.rows();
        let visible_rows = ((chunks[1].height / CARD_HEIGHT) as usize).max(1);
        let first_row = grid.first_visible_row(visible_rows);
        let shown = visible_rows.min(rows.len() - first_row);

        let heading = if shown < rows.len() {
            format!(
                "Saved Notes (rows {}-{} of {})",
                first_row + 1,
                first_row + shown,
                rows.len()
            )
        } else {
            "Saved Notes".to_string()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                heading,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            chunks[0],
        );

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); shown])
            .split(chunks[1]);

        for (offset, row_area) in row_areas.iter().enumerate() {
            let row_idx = first_row + offset;
            let Some(row) = rows.get(row_idx) else {
                break;
            };
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
                .split(*row_area);

            for (col_idx, note) in row.iter().enumerate() {
                let index = row_idx * GRID_COLUMNS + col_idx;
                let selected = index == grid.selected_index();
                let card_area = columns[col_idx];

                let mut block = Block::default().borders(Borders::ALL);
                if selected {
                    block = block
                        .title("Open ⏎")
                        .border_style(Style::default().fg(Color::Yellow));
                }
                let lines = build_note_card_lines(
                    note,
                    card_area.width.saturating_sub(2),
                    card_area.height.saturating_sub(2),
                    selected,
                );
                let card = Paragraph::new(lines).block(block);
                frame.render_widget(card, card_area);
            }
        }
    }

    fn draw_note_detail(&self, frame: &mut Frame, area: Rect, detail: &NoteDetail) {
        let updated_height = if detail.updated_prediction.is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(TITLE_INPUT_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(updated_height),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(Span::styled(
                detail.note.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(detail.note.prediction_message.clone())
                .block(Block::default().title("Prediction").borders(Borders::ALL))
                .wrap(Wrap { trim: true }),
            chunks[1],
        );

        draw_note_inputs(frame, chunks[2], chunks[3], "Edit Title", "Edit Note", &detail.form);
        frame.render_widget(Paragraph::new(detail.form.action_line()), chunks[4]);

        if let Some(message) = &detail.updated_prediction {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(
                        "Updated Prediction: ",
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(message.clone()),
                ]))
                .style(Style::default().fg(Color::Cyan))
                .block(Block::default().borders(Borders::ALL))
                .wrap(Wrap { trim: true }),
                chunks[5],
            );
        }
    }

    fn draw_new_note(&self, frame: &mut Frame, area: Rect, screen: &NewNoteScreen) {
        let preview_height = if screen.pending_prediction.is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(preview_height),
                Constraint::Length(TITLE_INPUT_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Add a New Note",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            chunks[0],
        );

        if let Some(message) = &screen.pending_prediction {
            frame.render_widget(
                Paragraph::new(format!("Prediction: {message}"))
                    .style(Style::default().fg(Color::Cyan))
                    .block(Block::default().borders(Borders::ALL))
                    .wrap(Wrap { trim: true }),
                chunks[1],
            );
        }

        draw_note_inputs(frame, chunks[2], chunks[3], "Title", "Body", &screen.form);
        frame.render_widget(Paragraph::new(screen.form.action_line()), chunks[4]);
    }

    fn draw_analysis(&self, frame: &mut Frame, area: Rect, screen: &AnalysisScreen) {
        let message = match &screen.state {
            AnalysisState::Ready => None,
            AnalysisState::Empty => Some("No notes found.".to_string()),
            AnalysisState::Failed(error) => Some(error.clone()),
        };
        if let Some(message) = message {
            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(ReportKind::ALL.len() as u16 + 2),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Choose which analysis you need to see",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            chunks[0],
        );

        let items: Vec<ListItem> = ReportKind::ALL
            .iter()
            .map(|kind| ListItem::new(kind.label()))
            .collect();
        let mut selector_block = Block::default()
            .title("Choose an option")
            .borders(Borders::ALL);
        if screen.focus == AnalysisFocus::Selector {
            selector_block = selector_block.border_style(Style::default().fg(Color::Yellow));
        }
        let list = List::new(items)
            .block(selector_block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut list_state = ListState::default();
        list_state.select(Some(screen.selected));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);

        frame.render_widget(Paragraph::new(screen.action_line()), chunks[2]);

        if let Some(report) = &screen.report {
            draw_report(frame, chunks[3], report);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.session, &self.mode) {
            (_, Mode::ConfirmDelete(_)) => &[("[y]", "Delete"), ("[n/Esc]", "Keep")],
            (None, _) => &[("[Enter]", "Log in"), ("[Esc]", "Quit")],
            (Some(session), Mode::Normal) => match session.view() {
                View::Grid(_) => &[
                    ("[←↑↓→]", "Move"),
                    ("[Enter]", "Open"),
                    ("[+]", "New"),
                    ("[a]", "Analysis"),
                    ("[r]", "Reload"),
                    ("[Ctrl+L]", "Logout"),
                    ("[q]", "Quit"),
                ],
                View::Detail(_) | View::NewNote(_) => &[
                    ("[Tab]", "Next field"),
                    ("[Enter]", "Press button"),
                    ("[Esc]", "Back"),
                    ("[Ctrl+N]", "New"),
                    ("[Ctrl+A]", "Analysis"),
                    ("[Ctrl+L]", "Logout"),
                ],
                View::Analysis(_) => &[
                    ("[↑↓]", "Choose"),
                    ("[Tab]", "Buttons"),
                    ("[Enter]", "Select"),
                    ("[Esc]", "Back"),
                    ("[Ctrl+N]", "New"),
                    ("[Ctrl+L]", "Logout"),
                ],
            },
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, label) in hints {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(format!(" {label}   ")));
        }
        Line::from(spans)
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmNoteDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Note").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete \"{}\"?", confirm.title)),
            Line::from(""),
            Line::from(Span::styled(
                "This cannot be undone. Press y to delete or n to keep it.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

/// Title input above a multi-line body input, with the cursor placed at the
/// end of whichever one has focus.
fn draw_note_inputs<A: ActionRow>(
    frame: &mut Frame,
    title_area: Rect,
    body_area: Rect,
    title_label: &str,
    body_label: &str,
    form: &NoteForm<A>,
) {
    let focused = Style::default().fg(Color::Yellow);

    let mut title_block = Block::default()
        .title(title_label.to_string())
        .borders(Borders::ALL);
    if form.title_focused() {
        title_block = title_block.border_style(focused);
    }
    let title_inner = title_block.inner(title_area);
    let title_width = title_inner.width as usize;
    let shown_title = tail_chars(&form.title, title_width.saturating_sub(1));
    frame.render_widget(
        Paragraph::new(shown_title.clone()).block(title_block),
        title_area,
    );

    let mut body_block = Block::default()
        .title(body_label.to_string())
        .borders(Borders::ALL);
    if form.body_focused() {
        body_block = body_block.border_style(focused);
    }
    let body_inner = body_block.inner(body_area);
    let body_lines: Vec<&str> = form.body.split('\n').collect();
    let visible = (body_inner.height as usize).max(1);
    let skip = body_lines.len().saturating_sub(visible);
    let body_width = body_inner.width as usize;
    let shown_body: Vec<Line> = body_lines[skip..]
        .iter()
        .map(|line| Line::from(tail_chars(line, body_width.saturating_sub(1))))
        .collect();
    let last_width = shown_body
        .last()
        .map(|line| line.width())
        .unwrap_or(0) as u16;
    let last_row = shown_body.len().saturating_sub(1) as u16;
    frame.render_widget(Paragraph::new(shown_body).block(body_block), body_area);

    if form.title_focused() && title_inner.width > 0 && title_inner.height > 0 {
        let offset = (shown_title.chars().count() as u16).min(title_inner.width - 1);
        frame.set_cursor_position((title_inner.x + offset, title_inner.y));
    } else if form.body_focused() && body_inner.width > 0 && body_inner.height > 0 {
        let offset = last_width.min(body_inner.width - 1);
        let row = last_row.min(body_inner.height - 1);
        frame.set_cursor_position((body_inner.x + offset, body_inner.y + row));
    }
}

/// Keep the last `max` characters so the text being typed stays in view.
fn tail_chars(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        text.to_string()
    } else {
        text.chars().skip(count - max).collect()
    }
}

/// Summary, band distribution and trend for one report kind.
fn draw_report(frame: &mut Frame, area: Rect, report: &AnalysisReport) {
    let block = Block::default()
        .title(format!("{} analysis", report.kind))
        .borders(Borders::ALL);
    frame.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(inner);

    let mean = report.mean().unwrap_or(0.0);
    let peak = match report.peak() {
        Some(entry) => format!(
            "\"{}\" ({:.0}%)",
            truncate_chars(&entry.title, 40),
            entry.score * 100.0
        ),
        None => "-".to_string(),
    };
    let summary = vec![
        Line::from(format!("Notes analysed: {}", report.note_count())),
        Line::from(format!("Mean score: {:.0}%", mean * 100.0)),
        Line::from(format!("Highest: {peak}")),
    ];
    frame.render_widget(Paragraph::new(summary), chunks[0]);

    let bars: [(&str, u64); 3] = report
        .band_counts()
        .map(|(band, count)| (band.label(), count));
    let barchart = BarChart::default()
        .block(Block::default().title("Notes per risk band").borders(Borders::ALL))
        .data(&bars)
        .bar_width(10)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Yellow))
        .value_style(Style::default().fg(Color::Black).bg(Color::Yellow));
    frame.render_widget(barchart, chunks[1]);

    let trend = report.trend();
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title("Trend (oldest → newest)")
                .borders(Borders::ALL),
        )
        .data(&trend)
        .max(100)
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(sparkline, chunks[2]);
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use botica_app::{
    AppCommand, AppEvent, AppMode, AppState, Drug, DrugFormInput, DrugId, FormField, Severity,
    StatusLine, TabKind,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const FILTER_MARK: &str = "▼";
const PLACEHOLDER: &str = "-";
const TABLE_COLUMNS: [&str; 4] = ["name", "description", "category", "interactions"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum InternalEvent {
    ClearStatus { token: u64 },
}

pub trait AppRuntime {
    fn save_drug(&mut self, form: &DrugFormInput) -> Result<DrugId>;
    fn search_drugs(&mut self, filter: &str) -> Result<Vec<Drug>>;
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    matches: Vec<Drug>,
    selected_row: usize,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if let Err(error) = refresh_view_data(state, runtime, &mut view_data) {
        state.dispatch(AppCommand::SetStatus(StatusLine::new(
            Severity::Error,
            format!("load failed: {error:#}"),
        )));
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = internal_rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    severity: Severity,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(StatusLine::new(severity, message)));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

// On failure the previously rendered rows stay in place.
fn refresh_view_data<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    view_data.matches = runtime.search_drugs(&state.filter)?;
    clamp_selected_row(view_data);
    Ok(())
}

fn clamp_selected_row(view_data: &mut ViewData) {
    if view_data.matches.is_empty() {
        view_data.selected_row = 0;
    } else if view_data.selected_row >= view_data.matches.len() {
        view_data.selected_row = view_data.matches.len() - 1;
    }
}

fn move_selected_row(view_data: &mut ViewData, delta: isize) {
    if view_data.matches.is_empty() {
        view_data.selected_row = 0;
        return;
    }
    let last = view_data.matches.len() as isize - 1;
    view_data.selected_row = (view_data.selected_row as isize + delta).clamp(0, last) as usize;
}

fn should_refresh_view(events: &[AppEvent]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            AppEvent::TabChanged(_) | AppEvent::FilterChanged | AppEvent::FormSubmitted
        )
    })
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    if should_refresh_view(&events)
        && let Err(error) = refresh_view_data(state, runtime, view_data)
    {
        emit_status(
            state,
            view_data,
            internal_tx,
            Severity::Error,
            format!("load failed: {error:#}"),
        );
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    match state.mode {
        AppMode::Nav => handle_nav_key(state, runtime, view_data, internal_tx, key),
        AppMode::Edit => {
            match state.active_tab {
                TabKind::Register => handle_form_key(state, runtime, view_data, internal_tx, key),
                TabKind::Search => handle_filter_key(state, runtime, view_data, internal_tx, key),
            }
            false
        }
    }
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('f') | KeyCode::Right, KeyModifiers::NONE) => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::NextTab, internal_tx);
        }
        (KeyCode::Char('b') | KeyCode::Left, KeyModifiers::NONE) => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::PrevTab, internal_tx);
        }
        (KeyCode::Char('i') | KeyCode::Enter, KeyModifiers::NONE) => {
            state.dispatch(AppCommand::EnterEditMode);
        }
        (KeyCode::Char('j') | KeyCode::Down, KeyModifiers::NONE) => {
            move_selected_row(view_data, 1);
        }
        (KeyCode::Char('k') | KeyCode::Up, KeyModifiers::NONE) => {
            move_selected_row(view_data, -1);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => view_data.selected_row = 0,
        (KeyCode::Char('G'), KeyModifiers::SHIFT) => {
            if !view_data.matches.is_empty() {
                view_data.selected_row = view_data.matches.len() - 1;
            }
        }
        _ => {}
    }
    false
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            state.dispatch(AppCommand::ExitToNav);
        }
        (KeyCode::Tab, _) => {
            state.dispatch(AppCommand::FocusNextField);
        }
        (KeyCode::BackTab, _) => {
            state.dispatch(AppCommand::FocusPrevField);
        }
        (KeyCode::Enter, _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
            submit_drug_form(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::ClearForm, internal_tx);
        }
        (KeyCode::Backspace, _) => {
            state.dispatch(AppCommand::FormBackspace);
        }
        (KeyCode::Char(ch), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            state.dispatch(AppCommand::FormInput(ch));
        }
        _ => {}
    }
}

fn handle_filter_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc | KeyCode::Enter, _) => {
            state.dispatch(AppCommand::ExitToNav);
        }
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::ClearFilter, internal_tx);
        }
        (KeyCode::Backspace, _) => {
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::FilterBackspace,
                internal_tx,
            );
        }
        (KeyCode::Down, _) => move_selected_row(view_data, 1),
        (KeyCode::Up, _) => move_selected_row(view_data, -1),
        (KeyCode::Char(ch), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::FilterInput(ch),
                internal_tx,
            );
        }
        _ => {}
    }
}

// Validation failures never reach the runtime; storage failures keep the form.
fn submit_drug_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if let Err(error) = state.form.validate() {
        emit_status(
            state,
            view_data,
            internal_tx,
            Severity::Error,
            format!("complete required fields -- {error}"),
        );
        return;
    }
    if let Err(error) = runtime.save_drug(&state.form) {
        emit_status(
            state,
            view_data,
            internal_tx,
            Severity::Error,
            format!("save failed: {error:#}"),
        );
        return;
    }
    dispatch_and_refresh(state, runtime, view_data, AppCommand::SubmitForm, internal_tx);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_tab_bar(frame, state, chunks[0]);
    match state.active_tab {
        TabKind::Register => render_register_form(frame, state, chunks[1]),
        TabKind::Search => render_search_results(frame, state, view_data, chunks[1]),
    }
    render_status_bar(frame, state, chunks[2]);
}

fn render_tab_bar(frame: &mut ratatui::Frame<'_>, state: &AppState, area: Rect) {
    let titles: Vec<String> = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, state))
        .collect();
    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(Block::default().title("botica").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .select(selected);
    frame.render_widget(tabs, area);
}

fn tab_title(tab: TabKind, state: &AppState) -> String {
    if tab == TabKind::Search && !state.filter.is_empty() {
        format!(" {} {FILTER_MARK} ", tab.label())
    } else {
        format!(" {} ", tab.label())
    }
}

fn render_register_form(frame: &mut ratatui::Frame<'_>, state: &AppState, area: Rect) {
    let mut lines = Vec::new();
    for field in FormField::ALL {
        let marker = if state.form_field == field { ">" } else { " " };
        let required = if field.required() { " *" } else { "" };
        let caret = if state.mode == AppMode::Edit && state.form_field == field {
            "_"
        } else {
            ""
        };
        lines.push(format!(
            "{marker} {:<15} {}{caret}",
            format!("{}{required}:", field.label()),
            state.form.value(field),
        ));
    }
    lines.push(String::new());
    lines.push("required fields are marked with *".to_owned());
    let body = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("register drug").borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn render_search_results(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    view_data: &ViewData,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let caret = if state.mode == AppMode::Edit { "_" } else { "" };
    let filter_line = Paragraph::new(format!("{}{caret}", state.filter))
        .block(Block::default().title("filter by name").borders(Borders::ALL));
    frame.render_widget(filter_line, chunks[0]);

    render_results_table(frame, view_data, chunks[1]);
}

fn render_results_table(frame: &mut ratatui::Frame<'_>, view_data: &ViewData, area: Rect) {
    let header = Row::new(TABLE_COLUMNS.iter().map(|label| {
        Cell::from(*label).style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
    }));
    let rows = view_data.matches.iter().enumerate().map(|(index, drug)| {
        let style = if index == view_data.selected_row {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new([
            Cell::from(render_cell(Some(&drug.name))),
            Cell::from(render_cell(Some(&drug.description))),
            Cell::from(render_cell(Some(&drug.category))),
            Cell::from(render_cell(drug.interactions.as_deref())),
        ])
        .style(style)
    });
    let widths = vec![Constraint::Min(8); TABLE_COLUMNS.len()];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(format!("drugs ({})", view_data.matches.len()))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

// Missing values render as a placeholder instead of an empty cell.
fn render_cell(text: Option<&str>) -> String {
    match text {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => PLACEHOLDER.to_owned(),
    }
}

fn render_status_bar(frame: &mut ratatui::Frame<'_>, state: &AppState, area: Rect) {
    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(status_color(state.status_line.as_ref())))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, area);
}

fn status_color(status: Option<&StatusLine>) -> Color {
    match status.map(|status| status.severity) {
        Some(Severity::Success) => Color::Green,
        Some(Severity::Error) => Color::Red,
        Some(Severity::Info) => Color::Blue,
        None => Color::Yellow,
    }
}

fn status_text(state: &AppState) -> String {
    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Edit => "EDIT",
    };
    let hints = key_hints(state);
    match &state.status_line {
        Some(status) => format!("{mode} | {} | {hints}", status.message),
        None => format!("{mode} | {hints}"),
    }
}

fn key_hints(state: &AppState) -> &'static str {
    match (state.mode, state.active_tab) {
        (AppMode::Nav, _) => "f/b tabs | j/k rows | i edit | q quit",
        (AppMode::Edit, TabKind::Register) => {
            "tab/shift+tab fields | enter save | ctrl+x clear | esc back"
        }
        (AppMode::Edit, TabKind::Search) => "type to filter | ctrl+x clear | esc back",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, dispatch_and_refresh, emit_status, handle_key_event,
        move_selected_row, process_internal_events, refresh_view_data, render_cell,
        should_refresh_view, status_color, status_text, submit_drug_form, tab_title,
    };
    use anyhow::{Result, bail};
    use botica_app::{
        AppCommand, AppEvent, AppMode, AppState, Drug, DrugFormInput, DrugId, FormField, Severity,
        StatusLine, TabKind,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::style::Color;
    use std::sync::mpsc;
    use time::OffsetDateTime;

    #[derive(Debug, Default)]
    struct TestRuntime {
        drugs: Vec<Drug>,
        save_calls: usize,
        searches: Vec<String>,
        fail_save: Option<String>,
        fail_search: bool,
    }

    impl TestRuntime {
        fn with_drugs(names: &[&str]) -> Self {
            let drugs = names
                .iter()
                .enumerate()
                .map(|(index, name)| sample_drug(index as i64 + 1, name))
                .collect();
            Self {
                drugs,
                ..Self::default()
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn save_drug(&mut self, form: &DrugFormInput) -> Result<DrugId> {
            self.save_calls += 1;
            if let Some(message) = &self.fail_save {
                bail!("{message}");
            }
            let id = self.drugs.len() as i64 + 1;
            let mut drug = sample_drug(id, &form.name);
            drug.description = form.description.clone();
            drug.category = form.category.clone();
            drug.interactions = form.interactions_or_none();
            self.drugs.push(drug);
            Ok(DrugId::new(id))
        }

        fn search_drugs(&mut self, filter: &str) -> Result<Vec<Drug>> {
            self.searches.push(filter.to_owned());
            if self.fail_search {
                bail!("database is locked");
            }
            let needle = filter.to_lowercase();
            let mut matches: Vec<Drug> = self
                .drugs
                .iter()
                .filter(|drug| drug.name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            matches.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            Ok(matches)
        }
    }

    fn sample_drug(id: i64, name: &str) -> Drug {
        Drug {
            id: DrugId::new(id),
            name: name.to_owned(),
            description: format!("{name} description"),
            category: "AINE".to_owned(),
            interactions: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn edit_state(tab: TabKind) -> AppState {
        AppState {
            mode: AppMode::Edit,
            active_tab: tab,
            ..AppState::default()
        }
    }

    fn filled_state() -> AppState {
        let mut state = edit_state(TabKind::Register);
        state.form.name = "Ibuprofeno".to_owned();
        state.form.description = "Antiinflamatorio".to_owned();
        state.form.category = "AINE".to_owned();
        state
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn invalid_form_is_rejected_without_a_storage_call() {
        let mut state = edit_state(TabKind::Register);
        state.form.description = "Antiinflamatorio".to_owned();
        state.form.category = "AINE".to_owned();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        submit_drug_form(&mut state, &mut runtime, &mut view_data, &tx);

        assert_eq!(runtime.save_calls, 0);
        assert!(runtime.searches.is_empty());
        let status = state.status_line.clone().expect("status line");
        assert_eq!(status.severity, Severity::Error);
        assert!(status.message.contains("complete required fields"));
        assert!(status.message.contains("drug name is required"));
        assert_eq!(state.form.description, "Antiinflamatorio");
    }

    #[test]
    fn valid_submit_saves_clears_and_requeries_with_current_filter() {
        let mut state = filled_state();
        state.filter = "ibu".to_owned();
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        submit_drug_form(&mut state, &mut runtime, &mut view_data, &tx);

        assert_eq!(runtime.save_calls, 1);
        assert_eq!(runtime.drugs.len(), 1);
        assert_eq!(runtime.drugs[0].interactions, None);
        assert!(state.form.is_empty());
        assert_eq!(runtime.searches, vec!["ibu".to_owned()]);
        assert_eq!(view_data.matches.len(), 1);
        let status = state.status_line.clone().expect("status line");
        assert_eq!(status.severity, Severity::Success);
        assert_eq!(status.message, "drug saved");
    }

    #[test]
    fn save_failure_keeps_the_form_and_surfaces_the_error() {
        let mut state = filled_state();
        let mut runtime = TestRuntime {
            fail_save: Some("disk I/O error".to_owned()),
            ..TestRuntime::default()
        };
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        submit_drug_form(&mut state, &mut runtime, &mut view_data, &tx);

        assert_eq!(runtime.save_calls, 1);
        assert!(runtime.searches.is_empty());
        assert_eq!(state.form.name, "Ibuprofeno");
        let status = state.status_line.clone().expect("status line");
        assert_eq!(status.severity, Severity::Error);
        assert!(status.message.contains("save failed"));
        assert!(status.message.contains("disk I/O error"));
    }

    #[test]
    fn filter_keystrokes_requery_once_per_change() {
        let mut state = edit_state(TabKind::Search);
        let mut runtime = TestRuntime::with_drugs(&["Ibuprofeno", "Paracetamol"]);
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        for ch in ['i', 'b', 'u'] {
            handle_key_event(
                &mut state,
                &mut runtime,
                &mut view_data,
                &tx,
                key(KeyCode::Char(ch)),
            );
        }

        assert_eq!(runtime.searches, vec!["i", "ib", "ibu"]);
        assert_eq!(view_data.matches.len(), 1);
        assert_eq!(view_data.matches[0].name, "Ibuprofeno");
    }

    #[test]
    fn failed_search_leaves_previous_rows_in_place() {
        let mut state = edit_state(TabKind::Search);
        let mut runtime = TestRuntime::with_drugs(&["Ibuprofeno", "Paracetamol"]);
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        dispatch_and_refresh(
            &mut state,
            &mut runtime,
            &mut view_data,
            AppCommand::FilterInput('a'),
            &tx,
        );
        assert_eq!(view_data.matches.len(), 1);
        assert_eq!(view_data.matches[0].name, "Paracetamol");

        runtime.fail_search = true;
        dispatch_and_refresh(
            &mut state,
            &mut runtime,
            &mut view_data,
            AppCommand::FilterInput('x'),
            &tx,
        );

        assert_eq!(view_data.matches.len(), 1);
        assert_eq!(view_data.matches[0].name, "Paracetamol");
        let status = state.status_line.clone().expect("status line");
        assert_eq!(status.severity, Severity::Error);
        assert!(status.message.contains("load failed"));
        assert!(status.message.contains("database is locked"));
    }

    #[test]
    fn stale_status_clears_are_ignored() {
        let mut state = AppState::default();
        let mut view_data = ViewData::default();
        let (tx, rx) = mpsc::channel();

        emit_status(&mut state, &mut view_data, &tx, Severity::Info, "first");
        let stale_token = view_data.status_token;
        emit_status(&mut state, &mut view_data, &tx, Severity::Success, "second");

        tx.send(InternalEvent::ClearStatus { token: stale_token })
            .expect("send stale clear");
        process_internal_events(&mut state, &mut view_data, &rx);
        assert_eq!(
            state.status_line.as_ref().map(|status| status.message.as_str()),
            Some("second")
        );

        tx.send(InternalEvent::ClearStatus {
            token: view_data.status_token,
        })
        .expect("send current clear");
        process_internal_events(&mut state, &mut view_data, &rx);
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn render_cell_substitutes_the_placeholder() {
        assert_eq!(render_cell(Some("AINE")), "AINE");
        assert_eq!(render_cell(Some("")), "-");
        assert_eq!(render_cell(None), "-");
    }

    #[test]
    fn refresh_is_limited_to_write_filter_and_tab_events() {
        assert!(should_refresh_view(&[AppEvent::FilterChanged]));
        assert!(should_refresh_view(&[AppEvent::FormSubmitted]));
        assert!(should_refresh_view(&[AppEvent::TabChanged(TabKind::Search)]));
        assert!(!should_refresh_view(&[AppEvent::FormChanged]));
        assert!(!should_refresh_view(&[AppEvent::FormCleared]));
        assert!(!should_refresh_view(&[AppEvent::StatusCleared]));
    }

    #[test]
    fn nav_keys_switch_tabs_and_modes() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::with_drugs(&["Ibuprofeno"]);
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        let quit = handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('f')),
        );
        assert!(!quit);
        assert_eq!(state.active_tab, TabKind::Search);
        assert_eq!(runtime.searches.len(), 1);
        assert_eq!(view_data.matches.len(), 1);

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('i')),
        );
        assert_eq!(state.mode, AppMode::Edit);
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Esc));
        assert_eq!(state.mode, AppMode::Nav);
    }

    #[test]
    fn quit_keys_respect_edit_mode() {
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        let mut nav = AppState::default();
        assert!(handle_key_event(
            &mut nav,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('q')),
        ));

        let mut editing = edit_state(TabKind::Register);
        assert!(!handle_key_event(
            &mut editing,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('q')),
        ));
        assert_eq!(editing.form.name, "q");
        assert!(handle_key_event(
            &mut editing,
            &mut runtime,
            &mut view_data,
            &tx,
            ctrl('q'),
        ));
    }

    #[test]
    fn form_keys_cycle_fields_and_edit_text() {
        let mut state = edit_state(TabKind::Register);
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('I')),
        );
        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, key(KeyCode::Tab));
        assert_eq!(state.form_field, FormField::Category);
        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Char('A')),
        );
        assert_eq!(state.form.name, "I");
        assert_eq!(state.form.category, "A");

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            key(KeyCode::Backspace),
        );
        assert_eq!(state.form.category, "");

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, ctrl('x'));
        assert!(state.form.is_empty());
        assert_eq!(state.form_field, FormField::Name);
        let status = state.status_line.clone().expect("status line");
        assert_eq!(status.severity, Severity::Info);
        assert_eq!(status.message, "form cleared");
    }

    #[test]
    fn clearing_the_filter_requeries_everything() {
        let mut state = edit_state(TabKind::Search);
        state.filter = "ibu".to_owned();
        let mut runtime = TestRuntime::with_drugs(&["Ibuprofeno", "Paracetamol"]);
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        handle_key_event(&mut state, &mut runtime, &mut view_data, &tx, ctrl('x'));

        assert_eq!(state.filter, "");
        assert_eq!(runtime.searches, vec!["".to_owned()]);
        assert_eq!(view_data.matches.len(), 2);
    }

    #[test]
    fn initial_refresh_runs_with_an_empty_filter() {
        let state = AppState::default();
        let mut runtime = TestRuntime::with_drugs(&["Ibuprofeno"]);
        let mut view_data = ViewData::default();

        refresh_view_data(&state, &mut runtime, &mut view_data).expect("refresh");

        assert_eq!(runtime.searches, vec!["".to_owned()]);
        assert_eq!(view_data.matches.len(), 1);
    }

    #[test]
    fn status_bar_reflects_mode_message_and_severity() {
        let mut state = AppState::default();
        assert!(status_text(&state).starts_with("NAV | "));
        assert_eq!(status_color(None), Color::Yellow);

        state.status_line = Some(StatusLine::new(Severity::Success, "drug saved"));
        assert!(status_text(&state).contains("drug saved"));
        assert_eq!(status_color(state.status_line.as_ref()), Color::Green);
        assert_eq!(
            status_color(Some(&StatusLine::new(Severity::Error, "save failed"))),
            Color::Red
        );
        assert_eq!(
            status_color(Some(&StatusLine::new(Severity::Info, "form cleared"))),
            Color::Blue
        );
    }

    #[test]
    fn search_tab_title_marks_an_active_filter() {
        let mut state = AppState::default();
        assert_eq!(tab_title(TabKind::Register, &state), " register ");
        assert_eq!(tab_title(TabKind::Search, &state), " search ");
        state.filter = "ibu".to_owned();
        assert_eq!(tab_title(TabKind::Search, &state), " search ▼ ");
    }

    #[test]
    fn row_selection_clamps_to_the_result_set() {
        let mut view_data = ViewData {
            matches: vec![sample_drug(1, "Ibuprofeno"), sample_drug(2, "Naproxeno")],
            selected_row: 0,
            status_token: 0,
        };
        move_selected_row(&mut view_data, 1);
        assert_eq!(view_data.selected_row, 1);
        move_selected_row(&mut view_data, 5);
        assert_eq!(view_data.selected_row, 1);
        move_selected_row(&mut view_data, -5);
        assert_eq!(view_data.selected_row, 0);

        view_data.matches.clear();
        move_selected_row(&mut view_data, 1);
        assert_eq!(view_data.selected_row, 0);
    }
}

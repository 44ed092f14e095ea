// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airdesk_app::{
    AppCommand, AppEvent, AppMode, AppState, EntityKind, FieldSpec, FormValues, PromptKind,
    SubmitMode, TableScreen,
};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs};
use std::io::{self, Stdout};
use std::time::Duration;

/// Builds the table behind a screen. Each mount starts from scratch; the
/// previous screen's table is dropped along with anything it cached.
pub trait AppRuntime {
    fn mount(&mut self, screen: EntityKind) -> Result<Box<dyn TableScreen>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormUiState {
    mode: SubmitMode,
    field_index: usize,
}

/// Fetch requested by a key press. It runs after the next frame is drawn,
/// so the status line can say the table is loading while it blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingLoad {
    Mount,
    Reload,
    Filter(String),
    Assign(String),
}

#[derive(Default)]
struct ViewData {
    table: Option<Box<dyn TableScreen>>,
    selected_row: usize,
    form: Option<FormUiState>,
    prompt_input: String,
    delete_prompt: Option<String>,
    pending: Option<PendingLoad>,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    mount_screen(state, runtime, &mut view_data);
    let result = event_loop(&mut terminal, state, runtime, &mut view_data);

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<R: AppRuntime>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    loop {
        terminal
            .draw(|frame| render(frame, state, view_data))
            .context("draw frame")?;

        if run_pending(state, view_data) {
            continue;
        }
        if !event::poll(Duration::from_millis(120)).context("poll event")? {
            continue;
        }
        if let Event::Key(key) = event::read().context("read event")?
            && key.kind == KeyEventKind::Press
            && handle_key_event(state, runtime, view_data, key)
        {
            return Ok(());
        }
    }
}

/// Drops the current table and mounts a fresh one for `state.screen`, then
/// queues its first load.
fn mount_screen<R: AppRuntime>(state: &mut AppState, runtime: &mut R, view_data: &mut ViewData) {
    *view_data = ViewData::default();
    state.dispatch(AppCommand::ClearStatus);
    match runtime.mount(state.screen) {
        Ok(table) => {
            view_data.table = Some(table);
            queue_load(view_data, PendingLoad::Mount);
        }
        Err(error) => {
            state.set_status(format!("{} unavailable: {error:#}", state.screen.label()));
        }
    }
}

fn apply_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    events: Vec<AppEvent>,
) {
    for event in events {
        if let AppEvent::ScreenChanged(_) = event {
            mount_screen(state, runtime, view_data);
        }
    }
}

/// Returns true when the shell should exit.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match state.mode {
        AppMode::Nav => return handle_nav_key(state, runtime, view_data, key),
        AppMode::Form(mode) => handle_form_key(state, view_data, mode, key),
        AppMode::Prompt(prompt) => handle_prompt_key(state, view_data, prompt, key),
        AppMode::ConfirmDelete => handle_confirm_key(state, view_data, key),
        AppMode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q')) {
                state.dispatch(AppCommand::ExitToNav);
            }
        }
    }
    false
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    let command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => Some(AppCommand::NextScreen),
        KeyCode::BackTab => Some(AppCommand::PrevScreen),
        KeyCode::Char(digit @ '1'..='7') => {
            let index = digit as usize - '1' as usize;
            EntityKind::ALL.get(index).copied().map(AppCommand::OpenScreen)
        }
        KeyCode::Char('j') | KeyCode::Down => {
            move_selection(view_data, 1);
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            move_selection(view_data, -1);
            None
        }
        KeyCode::Char('r') => {
            queue_load(view_data, PendingLoad::Reload);
            None
        }
        KeyCode::Char('n') => {
            open_create_form(state, view_data);
            None
        }
        KeyCode::Char('e') => {
            open_edit_form(state, view_data);
            None
        }
        KeyCode::Char('d') => {
            request_delete(state, view_data);
            None
        }
        KeyCode::Char('/') => {
            open_prompt(state, view_data, PromptKind::Filter);
            None
        }
        KeyCode::Char('a') => {
            open_assign_prompt(state, view_data);
            None
        }
        KeyCode::Char('?') => Some(AppCommand::ShowHelp),
        _ => None,
    };

    if let Some(command) = command {
        let events = state.dispatch(command);
        apply_events(state, runtime, view_data, events);
    }
    false
}

fn move_selection(view_data: &mut ViewData, delta: isize) {
    let rows = view_data
        .table
        .as_deref()
        .map_or(0, TableScreen::row_count);
    if rows == 0 {
        view_data.selected_row = 0;
        return;
    }
    let next = view_data.selected_row as isize + delta;
    view_data.selected_row = next.clamp(0, rows as isize - 1) as usize;
}

fn clamp_selection(view_data: &mut ViewData) {
    move_selection(view_data, 0);
}

fn queue_load(view_data: &mut ViewData, load: PendingLoad) {
    if let Some(table) = view_data.table.as_mut() {
        table.begin_load();
        view_data.pending = Some(load);
    }
}

/// Runs the queued fetch, if any. Returns true when one ran.
fn run_pending(state: &mut AppState, view_data: &mut ViewData) -> bool {
    let Some(load) = view_data.pending.take() else {
        return false;
    };
    let Some(table) = view_data.table.as_mut() else {
        return false;
    };
    match load {
        PendingLoad::Mount => {
            table.load();
        }
        PendingLoad::Reload => {
            if table.load() {
                state.set_status(format!("reloaded {}", table.kind().label()));
            }
        }
        PendingLoad::Filter(input) => {
            if table.apply_filter(&input) {
                if input.is_empty() {
                    state.set_status("filter cleared");
                } else {
                    state.set_status(format!("filtered by {input}"));
                }
            }
            view_data.selected_row = 0;
        }
        PendingLoad::Assign(input) => {
            let target = table.relation().map_or("related", EntityKind::singular);
            if table.assign_at(view_data.selected_row, &input) {
                state.set_status(format!("assigned {target} {input}"));
            }
        }
    }
    clamp_selection(view_data);
    true
}

fn open_create_form(state: &mut AppState, view_data: &mut ViewData) {
    if view_data.table.is_none() {
        return;
    }
    view_data.form = Some(FormUiState {
        mode: SubmitMode::Create,
        field_index: 0,
    });
    state.dispatch(AppCommand::OpenForm(SubmitMode::Create));
}

fn open_edit_form(state: &mut AppState, view_data: &mut ViewData) {
    let Some(table) = view_data.table.as_mut() else {
        return;
    };
    if !table.begin_edit_at(view_data.selected_row) {
        state.set_status("nothing to edit");
        return;
    }
    view_data.form = Some(FormUiState {
        mode: SubmitMode::Update,
        field_index: 0,
    });
    state.dispatch(AppCommand::OpenForm(SubmitMode::Update));
}

fn request_delete(state: &mut AppState, view_data: &mut ViewData) {
    let Some(table) = view_data.table.as_mut() else {
        return;
    };
    // Decline once to learn the prompt text; the overlay asks for real.
    let mut prompt = None;
    table.delete_at(view_data.selected_row, &mut |text: &str| {
        prompt = Some(text.to_owned());
        false
    });
    match prompt {
        Some(prompt) => {
            view_data.delete_prompt = Some(prompt);
            state.dispatch(AppCommand::ConfirmDelete);
        }
        None => {
            state.set_status("nothing to delete");
        }
    }
}

fn handle_confirm_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y' | 'Y') => {
            if let Some(table) = view_data.table.as_mut()
                && table.delete_at(view_data.selected_row, &mut |_| true)
            {
                state.set_status(format!("deleted {}", table.kind().singular()));
            }
            clamp_selection(view_data);
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            state.set_status("delete canceled");
        }
        _ => return,
    }
    view_data.delete_prompt = None;
    state.dispatch(AppCommand::ExitToNav);
}

fn open_prompt(state: &mut AppState, view_data: &mut ViewData, prompt: PromptKind) {
    if view_data.table.is_none() {
        return;
    }
    view_data.prompt_input.clear();
    state.dispatch(AppCommand::OpenPrompt(prompt));
}

fn open_assign_prompt(state: &mut AppState, view_data: &mut ViewData) {
    let Some(table) = view_data.table.as_deref() else {
        return;
    };
    if table.relation().is_none() {
        state.set_status(format!("{} cannot be assigned", table.kind().label()));
        return;
    }
    if table.row_count() == 0 {
        state.set_status("nothing to assign");
        return;
    }
    open_prompt(state, view_data, PromptKind::Assign);
}

fn handle_prompt_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    prompt: PromptKind,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => {
            view_data.prompt_input.pop();
        }
        KeyCode::Char(ch) => view_data.prompt_input.push(ch),
        KeyCode::Enter => {
            submit_prompt(view_data, prompt);
            state.dispatch(AppCommand::ExitToNav);
        }
        _ => {}
    }
}

fn submit_prompt(view_data: &mut ViewData, prompt: PromptKind) {
    let input = view_data.prompt_input.trim().to_owned();
    let load = match prompt {
        PromptKind::Filter => PendingLoad::Filter(input),
        PromptKind::Assign => PendingLoad::Assign(input),
    };
    queue_load(view_data, load);
}

fn form_values_mut(table: &mut dyn TableScreen, mode: SubmitMode) -> Option<&mut FormValues> {
    match mode {
        SubmitMode::Create => Some(table.create_form()),
        SubmitMode::Update => table.edit_buffer(),
    }
}

fn handle_form_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    mode: SubmitMode,
    key: KeyEvent,
) {
    let (Some(table), Some(form)) = (view_data.table.as_mut(), view_data.form.as_mut()) else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let table = &mut **table;
    let fields = table.fields();
    let Some(field) = fields.get(form.field_index).copied() else {
        return;
    };

    match key.code {
        KeyCode::Esc => {
            if mode == SubmitMode::Update {
                table.cancel_edit();
            }
            close_form(state, view_data);
        }
        KeyCode::Enter => {
            let saved = match mode {
                SubmitMode::Create => table.create(),
                SubmitMode::Update => table.save_edit(),
            };
            // A failed submit keeps the form open; the error shows below it.
            if saved {
                let verb = match mode {
                    SubmitMode::Create => "created",
                    SubmitMode::Update => "saved",
                };
                let message = format!("{verb} {}", table.kind().singular());
                close_form(state, view_data);
                state.set_status(message);
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            form.field_index = (form.field_index + 1) % fields.len();
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.field_index = (form.field_index + fields.len() - 1) % fields.len();
        }
        KeyCode::Left => cycle_choice(table, mode, field, -1),
        KeyCode::Right => cycle_choice(table, mode, field, 1),
        KeyCode::Backspace => {
            if let Some(values) = form_values_mut(table, mode) {
                values.pop_char(field.key);
            }
        }
        KeyCode::Char(ch) => {
            if table.choices(field.kind).is_empty()
                && let Some(values) = form_values_mut(table, mode)
            {
                values.push_char(field.key, ch);
            }
        }
        _ => {}
    }
}

fn close_form(state: &mut AppState, view_data: &mut ViewData) {
    view_data.form = None;
    state.dispatch(AppCommand::ExitToNav);
}

/// Steps a choice field through its value set, wrapping at both ends.
fn cycle_choice(table: &mut dyn TableScreen, mode: SubmitMode, field: FieldSpec, step: isize) {
    let choices = table.choices(field.kind);
    if choices.is_empty() {
        return;
    }
    let Some(values) = form_values_mut(table, mode) else {
        return;
    };
    let current = choices
        .iter()
        .position(|(value, _)| value == values.get(field.key));
    let next = match current {
        Some(index) => (index as isize + step).rem_euclid(choices.len() as isize) as usize,
        None if step > 0 => 0,
        None => choices.len() - 1,
    };
    values.set(field.key, choices[next].0.clone());
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = EntityKind::ALL
        .iter()
        .position(|screen| *screen == state.screen)
        .unwrap_or(0);
    let tabs = Tabs::new(EntityKind::ALL.map(EntityKind::label).to_vec())
        .block(Block::default().title("airdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    let singular = state.screen.singular();
    let overlay = match state.mode {
        AppMode::Nav => None,
        AppMode::Form(SubmitMode::Create) => Some((
            format!("new {singular}"),
            form_overlay_text(view_data),
            (60, 60),
        )),
        AppMode::Form(SubmitMode::Update) => Some((
            format!("edit {singular}"),
            form_overlay_text(view_data),
            (60, 60),
        )),
        AppMode::Prompt(prompt) => Some((
            prompt_title(prompt, view_data),
            format!("> {}_", view_data.prompt_input),
            (50, 20),
        )),
        AppMode::ConfirmDelete => Some((
            "confirm".to_owned(),
            format!(
                "{}\n\ny delete | n keep",
                view_data.delete_prompt.as_deref().unwrap_or_default()
            ),
            (44, 22),
        )),
        AppMode::Help => Some(("help".to_owned(), help_overlay_text().to_owned(), (64, 60))),
    };
    if let Some((title, text, (percent_x, percent_y))) = overlay {
        let area = centered_rect(percent_x, percent_y, frame.area());
        frame.render_widget(Clear, area);
        let widget =
            Paragraph::new(text).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(widget, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let Some(table) = view_data.table.as_deref() else {
        let empty = Paragraph::new(String::new()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.screen.label()),
        );
        frame.render_widget(empty, area);
        return;
    };

    let columns = table.columns();
    let header = Row::new(columns.iter().map(|column| {
        Cell::from(*column).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let editing = table.editing_row();
    let rows = table
        .cells()
        .into_iter()
        .enumerate()
        .map(|(index, cells)| {
            let style = if Some(index) == editing {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect::<Vec<_>>();
    let widths = vec![Constraint::Min(6); columns.len().max(1)];

    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(
            Block::default()
                .title(table_title(table))
                .borders(Borders::ALL),
        );
    let mut table_state = TableState::default();
    if table.row_count() > 0 {
        table_state.select(Some(view_data.selected_row));
    }
    frame.render_stateful_widget(widget, area, &mut table_state);
}

fn table_title(table: &dyn TableScreen) -> String {
    match table.summary() {
        Some(summary) => format!("{} | {summary}", table.kind().label()),
        None => format!("{} ({})", table.kind().label(), table.row_count()),
    }
}

fn prompt_title(prompt: PromptKind, view_data: &ViewData) -> String {
    match prompt {
        PromptKind::Filter => "filter (blank for all)".to_owned(),
        PromptKind::Assign => {
            let target = view_data
                .table
                .as_deref()
                .and_then(TableScreen::relation)
                .map_or("related", EntityKind::singular);
            format!("assign {target} id")
        }
    }
}

fn form_overlay_text(view_data: &ViewData) -> String {
    let (Some(table), Some(form)) = (view_data.table.as_deref(), view_data.form) else {
        return String::new();
    };
    let Some(values) = table.form(form.mode) else {
        return String::new();
    };

    let mut lines = table
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let marker = if index == form.field_index { ">" } else { " " };
            let raw = values.get(field.key);
            let choices = table.choices(field.kind);
            let shown = if choices.is_empty() {
                raw.to_owned()
            } else {
                let label = choices
                    .iter()
                    .find(|(value, _)| value == raw)
                    .map_or(raw, |(_, label)| label.as_str());
                format!("< {label} >")
            };
            format!("{marker} {}: {shown}", field.label)
        })
        .collect::<Vec<_>>();
    if let Some(error) = table.error() {
        lines.push(String::new());
        lines.push(format!("error: {error}"));
    }
    lines.join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Form(_) => "FORM",
        AppMode::Prompt(_) => "PROMPT",
        AppMode::ConfirmDelete => "DELETE",
        AppMode::Help => "HELP",
    };
    let table = view_data.table.as_deref();
    let message = if let Some(error) = table.and_then(TableScreen::error) {
        format!("error: {error}")
    } else if table.is_some_and(TableScreen::loading) {
        "loading...".to_owned()
    } else if let Some(status) = &state.status_line {
        status.clone()
    } else {
        mode_hint(state.mode, table).to_owned()
    };
    format!("{mode} | {message}")
}

fn mode_hint(mode: AppMode, table: Option<&dyn TableScreen>) -> &'static str {
    match mode {
        AppMode::Nav if table.is_some_and(|table| table.relation().is_some()) => {
            "tab screens | j/k move | n new | e edit | d delete | a assign | / filter | r reload | ? help | q quit"
        }
        AppMode::Nav => {
            "tab screens | j/k move | n new | e edit | d delete | / filter | r reload | ? help | q quit"
        }
        AppMode::Form(_) => "tab/up/down field | left/right choose | enter submit | esc cancel",
        AppMode::Prompt(_) => "enter apply | esc cancel",
        AppMode::ConfirmDelete => "y delete | n keep",
        AppMode::Help => "esc close",
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+c quit\n\
nav: tab/shift+tab screens | 1-7 jump to screen | j/k move | r reload | q quit | ? help\n\
nav: n new | e edit | d delete | / filter | a assign airport (aircraft)\n\
form: tab/shift+tab or up/down field | left/right choose | enter submit | esc cancel\n\
filter flights: <number> or <start>..<end> (YYYY-MM-DDTHH:MM)\n\
filter gates: <airport id> [departure|arrival]\n\
filter airlines: <code>\n\
prompt: enter apply | esc cancel\n\
delete: y confirm | n keep"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use zentask_core::{KeyValueStore, Priority, Task};

use crate::tui::app::{App, EditField, EditState, FormField, Mode, TaskForm};
use crate::tui::input::TextInput;

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    draw_header(f, app, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_chunks[1]);

    if app.store.tasks().is_empty() {
        draw_empty_state(f, content_chunks[0]);
    } else {
        draw_task_list(f, app, content_chunks[0]);
    }

    match &app.mode {
        Mode::Editing(edit) => draw_edit_view(f, edit, content_chunks[1]),
        _ => draw_detail_view(f, app, content_chunks[1]),
    }

    if let Mode::Creating(form) = &app.mode {
        draw_form(f, form, centered_rect(60, 14, size));
    }

    draw_footer(f, app, main_chunks[2]);
}

fn rounded_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Green),
    }
}

fn draw_header<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let pending = format!(" {} pending ", app.store.pending_count());
    let header = Paragraph::new(Line::from(vec![
        Span::styled("ZENTASK", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled("  Stay organized, focused, and calm.", Style::default().fg(Color::DarkGray)),
    ]))
    .alignment(Alignment::Left)
    .block(
        rounded_block("")
            .title_top(Line::from(pending).right_aligned()),
    );
    f.render_widget(header, area);
}

fn draw_empty_state(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("All caught up!", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            "You have no pending tasks. Enjoy your day.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled("Press 'a' to create a task", Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(rounded_block(" Tasks "));
    f.render_widget(paragraph, area);
}

fn draw_task_list<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let today = app.today;
    let rows: Vec<Row> = app
        .store
        .tasks()
        .iter()
        .map(|task| {
            let status_icon = if task.completed { "✔" } else { "○" };

            let due_str = task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            let due_style = if task.is_overdue(today) {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let title_style = if task.completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };

            Row::new(vec![
                Span::styled(status_icon, Style::default().fg(Color::Green)),
                Span::styled(task.priority.to_string(), priority_style(task.priority)),
                Span::styled(due_str, due_style),
                Span::styled(task.title.clone(), title_style),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),  // Status
            Constraint::Length(7),  // Priority
            Constraint::Length(11), // Due
            Constraint::Min(10),    // Title
        ],
    )
    .header(Row::new(vec!["", "Pri", "Due", "Task"]).style(Style::default().fg(Color::Yellow)))
    .block(rounded_block(" Tasks "))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_detail_view<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let Some(task) = app.selected_task() else {
        f.render_widget(rounded_block(" Detail "), area);
        return;
    };

    let detail = Paragraph::new(detail_lines(task, app.today))
        .block(rounded_block(" Detail "))
        .wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn detail_lines(task: &Task, today: chrono::NaiveDate) -> Vec<Line<'_>> {
    let label = Style::default().fg(Color::Blue);
    let due = match task.due_date {
        Some(d) if task.is_overdue(today) => Span::styled(
            format!("{} (overdue)", d.format("%Y-%m-%d")),
            Style::default().fg(Color::Red),
        ),
        Some(d) => Span::raw(d.format("%Y-%m-%d").to_string()),
        None => Span::raw("None"),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Title: ", label),
            Span::styled(task.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
            Span::raw(task.id.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::raw(if task.completed { "Completed" } else { "Active" }),
        ]),
        Line::from(vec![
            Span::styled("Priority: ", label),
            Span::styled(task.priority.to_string(), priority_style(task.priority)),
        ]),
        Line::from(vec![Span::styled("Due: ", label), due]),
        Line::from(vec![
            Span::styled("Created: ", label),
            Span::raw(
                task.created_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ),
        ]),
        Line::from(""),
    ];

    if let Some(desc) = &task.description {
        lines.push(Line::from(Span::styled("Description:", label)));
        lines.push(Line::from(desc.as_str()));
    }
    lines
}

fn draw_edit_view(f: &mut Frame, edit: &EditState, area: Rect) {
    let block = rounded_block(" Edit ").border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    draw_text_field(f, " Title ", &edit.title, edit.focus == EditField::Title, chunks[0]);
    draw_text_field(
        f,
        " Description ",
        &edit.description,
        edit.focus == EditField::Description,
        chunks[1],
    );
}

fn draw_form(f: &mut Frame, form: &TaskForm, area: Rect) {
    f.render_widget(Clear, area);
    let block = rounded_block(" New Task ").border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    draw_text_field(f, " Title ", &form.title, form.focus == FormField::Title, chunks[0]);
    draw_text_field(
        f,
        " Description (optional) ",
        &form.description,
        form.focus == FormField::Description,
        chunks[1],
    );

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);

    let priority_spans: Vec<Span> = Priority::ALL
        .iter()
        .flat_map(|p| {
            let style = if *p == form.priority {
                priority_style(*p).add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(format!(" {} ", p), style), Span::raw(" ")]
        })
        .collect();
    let priority = Paragraph::new(Line::from(priority_spans))
        .block(rounded_block(" Priority ").border_style(focus_style(form.focus == FormField::Priority)));
    f.render_widget(priority, row[0]);

    draw_text_field(f, " Due (e.g. 2025-05-01, fri, +3d) ", &form.due, form.focus == FormField::Due, row[1]);

    if let Some(error) = &form.error {
        let message = Paragraph::new(Span::styled(error.as_str(), Style::default().fg(Color::Red)));
        f.render_widget(message, chunks[3]);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_text_field(f: &mut Frame, title: &str, input: &TextInput, focused: bool, area: Rect) {
    let paragraph = Paragraph::new(input.value())
        .block(rounded_block(title).border_style(focus_style(focused)));
    f.render_widget(paragraph, area);

    if focused {
        let max_x = area.x + area.width.saturating_sub(2);
        let x = (area.x + 1 + input.cursor_width()).min(max_x);
        f.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn draw_footer<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let (text, style) = match (&app.status, &app.mode) {
        (Some(status), Mode::Normal) => (status.clone(), Style::default().fg(Color::Yellow)),
        (_, Mode::Normal) => (
            "j/k: Navigate | space: Toggle | a: Add | e: Edit | d: Delete | q: Quit".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        (_, Mode::Creating(_)) => (
            "tab: Next field | ←/→: Priority | enter: Add task | esc: Cancel".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        (_, Mode::Editing(_)) => (
            "tab: Switch field | enter: Save | esc: Cancel".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    let footer = Paragraph::new(text).style(style).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

use chrono::{DateTime, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::board::Column;
use crate::config::ViewMode;
use crate::deps::{self, DependencyEntry};
use crate::task::{Task, TaskStatus};

use super::app::{AppState, StatusKind};

const STATUS_WIDTH: usize = 7;
const KEY_WIDTH: usize = 14;
const MARK_WIDTH: usize = 2;
const HELP_KEY_WIDTH: usize = 14;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_DETAIL: Color = Color::Rgb(180, 156, 92);
const COLOR_MAGENTA: Color = Color::Rgb(214, 140, 230);
const COLOR_UPSTREAM: Color = Color::Rgb(255, 170, 90);
const COLOR_DOWNSTREAM: Color = Color::Rgb(120, 220, 200);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    let tabs = chunks[0];
    let main = chunks[1];
    let footer = chunks[2];

    render_tabs(frame, app, tabs);

    let has_detail = app.view.selected().is_some();
    if !has_detail {
        render_main(frame, app, main);
    } else if app.is_narrow() {
        render_detail(frame, app, main);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
            .split(main);
        render_main(frame, app, chunks[0]);
        render_detail(frame, app, chunks[1]);
    }

    render_footer(frame, app, footer);

    if app.show_help {
        render_help_modal(frame, area);
    }
}

fn render_main(frame: &mut Frame, app: &AppState, area: Rect) {
    match app.mode {
        ViewMode::List => render_list(frame, app, area),
        ViewMode::Board => render_board(frame, app, area),
    }
}

fn render_tabs(frame: &mut Frame, app: &AppState, area: Rect) {
    let [pending, in_progress, completed] = app.view.board().counts();
    let tabs = vec![
        (
            format!("List ({})", app.view.store().len()),
            app.mode == ViewMode::List,
            COLOR_INFO,
        ),
        (
            format!("Board ({pending}/{in_progress}/{completed})"),
            app.mode == ViewMode::Board,
            COLOR_ACCENT,
        ),
    ];

    let mut spans = Vec::new();
    for (idx, (text, selected, color)) in tabs.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let style = if selected {
            Style::default()
                .fg(color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(text, style));
    }
    spans.push(Span::styled(
        format!("  {}", app.source_label),
        Style::default().fg(COLOR_MUTED_DARK),
    ));

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut lines = Vec::new();
    let content_width = area.width.saturating_sub(2) as usize;
    let filter = app.list_filter();

    if !filter.is_empty() {
        let status_label = match filter.status.as_deref() {
            Some(value) => format!("status: {value}"),
            None => "status: all".to_string(),
        };
        let agent_label = match filter.agent.as_deref() {
            Some(value) => format!("agent: {value}"),
            None => "agent: all".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(status_label, Style::default().fg(COLOR_WARNING)),
            Span::raw("  "),
            Span::styled(agent_label, Style::default().fg(COLOR_ACCENT)),
        ]));
        lines.push(Line::from(""));
    }

    let tasks = app.view.list(&filter);
    if tasks.is_empty() {
        let empty = if !app.loaded {
            "Loading..."
        } else if filter.is_empty() {
            "No tasks"
        } else {
            "No matches"
        };
        lines.push(Line::from(empty));
    } else {
        let list_height = area
            .height
            .saturating_sub(2)
            .saturating_sub(lines.len() as u16) as usize;
        let (start, end) = list_window(tasks.len(), Some(app.list_cursor), list_height);
        for (pos, task) in tasks.iter().enumerate().take(end).skip(start) {
            lines.push(render_list_row(app, task, pos == app.list_cursor, content_width));
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Tasks")
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_board(frame: &mut Frame, app: &AppState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ]
            .as_ref(),
        )
        .split(area);
    let board = app.view.board();

    for column in Column::ALL {
        let rect = columns[column.index()];
        let tasks = board.column(column);
        let focused = app.column == column;
        let cursor = app.column_cursors[column.index()];
        let content_width = rect.width.saturating_sub(2) as usize;
        let height = rect.height.saturating_sub(2) as usize;

        let mut lines = Vec::new();
        if tasks.is_empty() {
            lines.push(Line::from(Span::styled(
                "Empty",
                Style::default().fg(COLOR_MUTED_DARK),
            )));
        } else {
            let (start, end) = list_window(tasks.len(), Some(cursor), height);
            for (pos, task) in tasks.iter().enumerate().take(end).skip(start) {
                let at_cursor = focused && pos == cursor;
                lines.push(render_card(app, task, at_cursor, content_width));
            }
        }

        let border = if focused {
            Style::default().fg(COLOR_ACCENT)
        } else {
            Style::default().fg(COLOR_BORDER_LIST)
        };
        let title = format!("{} ({})", column.title(), tasks.len());
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border),
        );
        frame.render_widget(widget, rect);
    }
}

fn render_detail(frame: &mut Frame, app: &AppState, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let widget = Paragraph::new(build_detail_lines(app, content_width))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Inspector")
                .border_style(Style::default().fg(COLOR_BORDER_DETAIL)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let counts_line = Line::from(Span::styled(
        app.stats_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let rect = centered_rect(48, 20, area);
    let width = rect.width.saturating_sub(2) as usize;
    let widget = Paragraph::new(build_help_lines(width)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .border_style(Style::default().fg(COLOR_ACCENT)),
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(widget, rect);
}

fn build_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_header("Keys"),
        help_line("j/k or up/down", "move cursor", width),
        help_line("h/l", "previous/next board column", width),
        help_line("enter", "select task (again to close)", width),
        help_line("esc", "close inspector, or quit", width),
        help_line("tab/shift+tab", "next/previous dependency", width),
        help_line("g", "go to dependency", width),
        help_line("v", "toggle list/board", width),
        help_line("s", "cycle status filter", width),
        help_line("a", "cycle agent filter", width),
        help_line("r", "reload tasks", width),
        help_line("q", "quit", width),
        help_line("?", "hide help", width),
        Line::from(""),
        help_header("Markers"),
        Line::from(vec![
            Span::styled(
                pad_text("^", HELP_KEY_WIDTH),
                Style::default().fg(COLOR_UPSTREAM).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled("blocks the selected task", Style::default().fg(COLOR_MUTED)),
        ]),
        Line::from(vec![
            Span::styled(
                pad_text("v", HELP_KEY_WIDTH),
                Style::default()
                    .fg(COLOR_DOWNSTREAM)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled("waits on the selected task", Style::default().fg(COLOR_MUTED)),
        ]),
    ]
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    let desc_text = truncate_text(desc, desc_width);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_list_row(app: &AppState, task: &Task, at_cursor: bool, width: usize) -> Line<'static> {
    let status_text = pad_text_center(&format_status_label(&task.status), STATUS_WIDTH);
    let key_text = pad_text(&task.key().to_string(), KEY_WIDTH);
    let agent = task.agent_name.as_deref().or(task.agent_id.as_deref());
    let agent_text = agent.map(|agent| format!(" @{agent}")).unwrap_or_default();
    let used = MARK_WIDTH + STATUS_WIDTH + KEY_WIDTH + 3 + agent_text.chars().count();
    let subject = truncate_text(&task.subject, width.saturating_sub(used));

    let mut spans = vec![
        marker_span(app, task),
        Span::styled(
            status_text,
            status_style(&task.status).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(key_text, id_style()),
        Span::raw(" "),
        Span::styled(subject, subject_style(app, task)),
        Span::styled(agent_text, Style::default().fg(COLOR_MUTED_DARK)),
    ];
    if at_cursor {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }
    Line::from(spans)
}

fn render_card(app: &AppState, task: &Task, at_cursor: bool, width: usize) -> Line<'static> {
    let key_text = task.key().to_string();
    let label = task
        .active_label()
        .map(|label| format!(" ({label})"))
        .unwrap_or_default();
    let used = MARK_WIDTH + key_text.chars().count() + 1;
    let subject = truncate_text(
        &format!("{}{}", task.subject, label),
        width.saturating_sub(used),
    );

    let mut spans = vec![
        marker_span(app, task),
        Span::styled(key_text, id_style()),
        Span::raw(" "),
        Span::styled(subject, subject_style(app, task)),
    ];
    if at_cursor {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }
    Line::from(spans)
}

/// Leading marker: the selection itself, or its upstream/downstream edges.
fn marker_span(app: &AppState, task: &Task) -> Span<'static> {
    let is_selected = app
        .view
        .selected()
        .map(|selected| task.has_key(&selected.key()))
        .unwrap_or(false);
    if is_selected {
        return Span::styled(
            "> ",
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        );
    }
    match app.view.highlight_for(task) {
        Some(deps::Direction::Upstream) => Span::styled(
            "^ ",
            Style::default()
                .fg(COLOR_UPSTREAM)
                .add_modifier(Modifier::BOLD),
        ),
        Some(deps::Direction::Downstream) => Span::styled(
            "v ",
            Style::default()
                .fg(COLOR_DOWNSTREAM)
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::raw("  "),
    }
}

fn subject_style(app: &AppState, task: &Task) -> Style {
    match app.view.highlight_for(task) {
        Some(deps::Direction::Upstream) => Style::default().fg(COLOR_UPSTREAM),
        Some(deps::Direction::Downstream) => Style::default().fg(COLOR_DOWNSTREAM),
        None => Style::default().fg(COLOR_TEXT),
    }
}

fn build_detail_lines(app: &AppState, width: usize) -> Vec<Line<'static>> {
    let Some(task) = app.view.selected() else {
        return vec![Line::from("No task selected")];
    };

    let mut lines: Vec<Line<'static>> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("# ", Style::default().fg(COLOR_MUTED_DARK)),
        Span::styled(
            task.key().to_string(),
            id_style().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            task.subject.clone(),
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(vec![
        label_span("Status: "),
        Span::styled(
            task.status.to_string(),
            status_style(&task.status).add_modifier(Modifier::BOLD),
        ),
    ]));
    if let Some(label) = task.active_label() {
        lines.push(Line::from(vec![
            label_span("Now: "),
            Span::styled(
                label.to_string(),
                Style::default()
                    .fg(COLOR_SUCCESS)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]));
    }
    if let Some(owner) = task.owner.as_deref() {
        lines.push(Line::from(vec![
            label_span("Owner: "),
            Span::styled(owner.to_string(), Style::default().fg(COLOR_INFO)),
        ]));
    }
    if let Some(agent) = task.agent_name.as_deref().or(task.agent_id.as_deref()) {
        lines.push(Line::from(vec![
            label_span("Agent: "),
            Span::styled(agent.to_string(), Style::default().fg(COLOR_INFO)),
        ]));
    }
    append_timestamps(&mut lines, task);

    if let Some(description) = task
        .description
        .as_deref()
        .map(str::trim_end)
        .filter(|value| !value.trim().is_empty())
    {
        lines.push(Line::from(""));
        lines.push(section_header("## Description"));
        for line in description.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(COLOR_TEXT),
            )));
        }
    }

    let entries = app.dependency_entries();
    if !entries.is_empty() {
        append_dependencies(&mut lines, &entries, app.dep_cursor, width);
    }

    if let Some(metadata) = task.metadata_entries() {
        lines.push(Line::from(""));
        lines.push(section_header("## Metadata"));
        for (key, value) in metadata {
            lines.push(Line::from(vec![
                label_span(&format!("{key}: ")),
                Span::styled(value, Style::default().fg(COLOR_TEXT)),
            ]));
        }
    }

    lines
}

fn append_timestamps(lines: &mut Vec<Line<'static>>, task: &Task) {
    let stamps = [
        ("Created: ", task.created_at),
        ("Started: ", task.started_at),
        ("Updated: ", task.updated_at),
        ("Completed: ", task.completed_at),
    ];
    let mut spans = Vec::new();
    for (label, value) in stamps {
        let Some(value) = value else {
            continue;
        };
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(label_span(label));
        spans.push(Span::styled(
            format_timestamp(value),
            Style::default().fg(COLOR_WARNING),
        ));
    }
    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
}

fn append_dependencies(
    lines: &mut Vec<Line<'static>>,
    entries: &[DependencyEntry<'_>],
    cursor: usize,
    width: usize,
) {
    lines.push(Line::from(""));
    lines.push(section_header("## Dependencies"));
    let mut current = None;
    for (idx, entry) in entries.iter().enumerate() {
        if current != Some(entry.direction) {
            current = Some(entry.direction);
            let (title, color) = match entry.direction {
                deps::Direction::Upstream => ("Blocked by", COLOR_UPSTREAM),
                deps::Direction::Downstream => ("Blocks", COLOR_DOWNSTREAM),
            };
            lines.push(Line::from(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(render_dependency_row(entry, idx == cursor, width));
    }
}

fn render_dependency_row(entry: &DependencyEntry<'_>, at_cursor: bool, width: usize) -> Line<'static> {
    let pointer = if at_cursor { "> " } else { "  " };
    let mut spans = vec![Span::styled(
        pointer,
        Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD),
    )];
    match entry.task {
        Some(task) => {
            let key_text = task.key().to_string();
            let used = MARK_WIDTH + key_text.chars().count() + STATUS_WIDTH + 2;
            spans.push(Span::styled(key_text, id_style()));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                pad_text_center(&format_status_label(&task.status), STATUS_WIDTH),
                status_style(&task.status),
            ));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                truncate_text(&task.subject, width.saturating_sub(used)),
                Style::default().fg(COLOR_TEXT),
            ));
        }
        None => {
            spans.push(Span::styled(entry.id.clone(), id_style()));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                "not in scope",
                Style::default()
                    .fg(COLOR_MUTED_DARK)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
    }
    if at_cursor {
        for span in spans.iter_mut().skip(1) {
            span.style = span.style.add_modifier(Modifier::UNDERLINED);
        }
    }
    Line::from(spans)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn format_status_label(status: &TaskStatus) -> String {
    match status {
        TaskStatus::Pending => "PEND".to_string(),
        TaskStatus::InProgress => "PROG".to_string(),
        TaskStatus::Completed => "DONE".to_string(),
        TaskStatus::Deleted => "DEL".to_string(),
        TaskStatus::Other(value) => truncate_text(&value.to_ascii_uppercase(), 6),
    }
}

fn status_style(status: &TaskStatus) -> Style {
    let (fg, bg) = status_colors(status);
    Style::default().fg(fg).bg(bg)
}

fn status_colors(status: &TaskStatus) -> (Color, Color) {
    match status {
        TaskStatus::Pending => (Color::Rgb(80, 250, 123), Color::Rgb(26, 61, 42)),
        TaskStatus::InProgress => (Color::Rgb(139, 233, 253), Color::Rgb(26, 51, 68)),
        TaskStatus::Completed => (Color::Rgb(98, 114, 164), Color::Rgb(42, 42, 61)),
        TaskStatus::Deleted => (COLOR_MUTED_DARK, COLOR_BG_MUTED),
        TaskStatus::Other(_) => (COLOR_TEXT, COLOR_BG_MUTED),
    }
}

fn pad_text(value: &str, width: usize) -> String {
    let mut text = value.to_string();
    if text.chars().count() > width {
        text = truncate_text(&text, width);
    }
    format!("{text:width$}")
}

fn pad_text_center(value: &str, width: usize) -> String {
    let mut text = value.to_string();
    if text.chars().count() > width {
        text = truncate_text(&text, width);
    }
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let total_pad = width - len;
    let left = total_pad / 2;
    let right = total_pad - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

fn label_span(label: &str) -> Span<'static> {
    Span::styled(label.to_string(), Style::default().fg(COLOR_MUTED_DARK))
}

fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(COLOR_MAGENTA)
            .add_modifier(Modifier::BOLD),
    ))
}

fn id_style() -> Style {
    Style::default()
        .fg(COLOR_MUTED)
        .add_modifier(Modifier::BOLD)
}

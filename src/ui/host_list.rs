use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use unicode_width::UnicodeWidthStr;

use super::theme;
use crate::app::{App, SortMode};
use crate::table::{self, HEADERS};

/// Host and group columns never grow past this.
const MAX_COLUMN_WIDTH: usize = 40;

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let searching = app.search_query.is_some();

    let chunks = if searching {
        Layout::vertical([
            Constraint::Min(5),    // Host table
            Constraint::Length(1), // Search bar
            Constraint::Length(1), // Footer or status message
        ])
        .split(area)
    } else {
        Layout::vertical([Constraint::Min(5), Constraint::Length(1)]).split(area)
    };

    render_table(frame, app, chunks[0]);
    if searching {
        render_search_bar(frame, app, chunks[1]);
    }

    let footer_area = chunks[chunks.len() - 1];
    if app.status.is_some() {
        super::render_status_bar(frame, footer_area, app);
    } else {
        let keys = if searching { SEARCH_KEYS } else { LIST_KEYS };
        frame.render_widget(Paragraph::new(super::key_hints(keys)), footer_area);
    }
}

fn title(app: &App) -> Line<'static> {
    let mut spans = vec![Span::styled(" ansible-tty ", theme::brand_badge())];
    if !app.view.is_empty() {
        let pos = app.table_state.selected().map(|i| i + 1).unwrap_or(0);
        spans.push(Span::raw(format!(" {}/{} ", pos, app.view.len())));
    }
    if let Some(ref group) = app.group_filter {
        spans.push(Span::styled(format!("[{}] ", group), theme::accent_bold()));
    }
    if app.sort_mode != SortMode::Original {
        spans.push(Span::raw(format!("({}) ", app.sort_mode.label())));
    }
    Line::from(spans)
}

fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.search_query.is_some() {
        theme::border_focused()
    } else {
        theme::border()
    };
    let block = Block::default()
        .title(title(app))
        .borders(Borders::ALL)
        .border_style(border_style);

    if app.view.is_empty() {
        let msg = if app.entries.is_empty() {
            "  This inventory has no hosts. Check it with 'ansible-inventory --graph'."
        } else {
            "  No matches. Try a different search."
        };
        frame.render_widget(Paragraph::new(msg).style(theme::muted()).block(block), area);
        return;
    }

    let rows: Vec<[String; 4]> = app
        .view
        .iter()
        .enumerate()
        .map(|(pos, &i)| table::row(pos, &app.entries[i]))
        .collect();

    let mut widths = HEADERS.map(|h| h.width());
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r.iter()) {
            *w = (*w).max(cell.width()).min(MAX_COLUMN_WIDTH);
        }
    }

    let header = Row::new(HEADERS.map(Cell::from)).style(theme::header());
    let body: Vec<Row> = rows
        .into_iter()
        .map(|[index, host, group, address]| {
            Row::new(vec![
                Cell::from(Span::styled(index, theme::muted())),
                Cell::from(Span::styled(host, theme::bold())),
                Cell::from(Span::styled(group, theme::accent())),
                Cell::from(Span::styled(address, Style::default())),
            ])
        })
        .collect();

    let constraints = [
        Constraint::Length(widths[0] as u16),
        Constraint::Length(widths[1] as u16),
        Constraint::Length(widths[2] as u16),
        Constraint::Min(widths[3] as u16),
    ];

    let table = Table::new(body, constraints)
        .header(header)
        .block(block)
        .column_spacing(2)
        .row_highlight_style(theme::selected())
        .highlight_symbol("  ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let query = app.search_query.as_deref().unwrap_or("");
    let match_info = if query.is_empty() {
        String::new()
    } else {
        match app.view.len() {
            0 => " (no matches)".to_string(),
            1 => " (1 match)".to_string(),
            n => format!(" ({} matches)", n),
        }
    };
    let search_line = Line::from(vec![
        Span::styled(" / ", theme::accent_bold()),
        Span::raw(query),
        Span::styled("_", theme::accent()),
        Span::styled(match_info, theme::muted()),
    ]);
    frame.render_widget(Paragraph::new(search_line), area);
}

const LIST_KEYS: &[(&str, &str)] = &[
    ("Enter", "connect"),
    ("/", "search"),
    ("g", "group"),
    ("s", "sort"),
    ("i", "info"),
    ("?", "help"),
];

const SEARCH_KEYS: &[(&str, &str)] = &[("Enter", "connect"), ("Esc", "cancel")];

mod group_picker;
mod help;
mod host_detail;
mod host_list;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{App, Screen};

const MIN_WIDTH: u16 = 50;
const MIN_HEIGHT: u16 = 10;

/// Top-level render dispatcher. Overlays draw on top of the host table.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = Paragraph::new(format!(
            "Terminal too small. Need at least {}x{}.",
            MIN_WIDTH, MIN_HEIGHT
        ))
        .style(theme::error());
        frame.render_widget(msg, area);
        return;
    }

    host_list::render(frame, app);
    match app.screen.clone() {
        Screen::HostList => {}
        Screen::HostDetail { index } => host_detail::render(frame, app, index),
        Screen::GroupPicker => group_picker::render(frame, app),
        Screen::Help => help::render(frame),
    }
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(ref status) = app.status {
        let line = if status.is_error {
            Line::from(vec![
                Span::styled(" ! ", theme::error()),
                Span::styled(status.text.as_str(), theme::error()),
            ])
        } else {
            Line::from(Span::styled(format!(" {}", status.text), theme::success()))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Key hints as `key label` pairs, e.g. for footers.
pub fn key_hints(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (n, &(key, label)) in hints.iter().enumerate() {
        let key_style = if key == "Enter" {
            theme::primary_action()
        } else {
            theme::accent_bold()
        };
        spans.push(Span::styled(format!(" {}", key), key_style));
        let sep = if n + 1 == hints.len() { "" } else { " " };
        spans.push(Span::styled(format!(" {}{}", label, sep), theme::muted()));
    }
    Line::from(spans)
}

/// Clear a centered `width`x`height` box and return it with its framing block.
pub fn overlay(frame: &mut Frame, title: String, width: u16, height: u16) -> (Rect, Block<'static>) {
    let area = centered_rect_fixed(width, height, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(format!(" {} ", title), theme::brand()))
        .borders(Borders::ALL)
        .border_style(theme::accent());
    (area, block)
}

/// Create a centered rect with fixed dimensions.
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

use ratatui::Frame;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::theme;
use crate::app::App;

const MAX_VISIBLE_VARS: usize = 15;

pub fn render(frame: &mut Frame, app: &App, index: usize) {
    let Some(entry) = app.entries.get(index) else {
        return;
    };

    let var_count = entry.vars.len();
    let visible = var_count.min(MAX_VISIBLE_VARS);
    let overflow_line = usize::from(var_count > MAX_VISIBLE_VARS);
    // borders + blank + groups block (3) + vars header (2) + vars + overflow + blank
    let height = (9 + visible.max(1) + overflow_line) as u16;
    let (area, block) = super::overlay(frame, entry.hostname.clone(), 64, height);

    let groups = if entry.groups.is_empty() {
        "(none)".to_string()
    } else {
        entry.group_label()
    };

    let mut lines = vec![
        Line::from(""),
        field("Groups", groups),
        field("Address", entry.address().to_string()),
        Line::from(""),
        Line::from(Span::styled("  Variables", theme::section_header())),
        Line::from(Span::styled("  ────────────────────────", theme::muted())),
    ];

    if entry.vars.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", theme::muted())));
    } else {
        for (key, value) in entry.vars.iter().take(MAX_VISIBLE_VARS) {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<28}", key), theme::muted()),
                Span::styled(value.clone(), theme::bold()),
            ]));
        }
        if var_count > MAX_VISIBLE_VARS {
            lines.push(Line::from(Span::styled(
                format!("  (and {} more...)", var_count - MAX_VISIBLE_VARS),
                theme::muted(),
            )));
        }
    }

    lines.push(Line::from(""));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", label), theme::muted()),
        Span::styled(value, theme::bold()),
    ])
}

use ratatui::Frame;
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem};

use super::theme;
use crate::app::App;

pub fn render(frame: &mut Frame, app: &mut App) {
    let count_in = |group: &str| {
        app.entries
            .iter()
            .filter(|e| e.groups.contains(group))
            .count()
    };

    let mut items = vec![ListItem::new(Line::from(vec![
        Span::styled(" all", theme::bold()),
        Span::styled(format!(" ({})", app.entries.len()), theme::muted()),
    ]))];
    items.extend(app.groups.iter().map(|group| {
        ListItem::new(Line::from(vec![
            Span::styled(format!(" {}", group), theme::bold()),
            Span::styled(format!(" ({})", count_in(group)), theme::muted()),
        ]))
    }));

    let height = (app.group_picker_len() as u16 + 2).min(18);
    let (area, block) = super::overlay(frame, "Filter by Group".to_string(), 40, height);

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected())
        .highlight_symbol("  ");

    frame.render_stateful_widget(list, area, &mut app.group_picker_state);
}

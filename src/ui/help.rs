use ratatui::Frame;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::theme;

const HOST_KEYS: &[(&str, &str)] = &[
    ("j / Down", "Move down"),
    ("k / Up", "Move up"),
    ("Enter", "ssh to host"),
    ("/", "Search host, group, address"),
    ("g", "Filter by group"),
    ("s", "Cycle sort order"),
    ("i", "Host variables"),
    ("q / Esc", "Quit"),
    ("Ctrl+C", "Quit (from anywhere)"),
];

const SEARCH_KEYS: &[(&str, &str)] = &[
    ("Tab/Down", "Next match"),
    ("Enter", "ssh to match"),
    ("Esc", "Clear search"),
];

const KEY_COLUMN: usize = 10;

pub fn render(frame: &mut Frame) {
    let mut text = Vec::new();
    for (heading, keys) in [("Hosts", HOST_KEYS), ("Search", SEARCH_KEYS)] {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(format!("  {}", heading), theme::section_header())));
        text.push(Line::from(""));
        text.extend(keys.iter().map(|&(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:<width$}", key, width = KEY_COLUMN), theme::accent_bold()),
                Span::raw(desc),
            ])
        }));
    }

    let height = text.len() as u16 + 2;
    let (area, block) = super::overlay(frame, "ansible-tty keys".to_string(), 50, height);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

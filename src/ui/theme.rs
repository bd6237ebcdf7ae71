use std::sync::atomic::{AtomicU8, Ordering};

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
enum ColorMode {
    /// `NO_COLOR` is set: modifiers only.
    Mono = 0,
    Ansi = 1,
    TrueColor = 2,
}

static COLOR_MODE: AtomicU8 = AtomicU8::new(ColorMode::Ansi as u8);

/// Pick the color mode from `NO_COLOR` and `COLORTERM`. Call once at startup.
pub fn init() {
    let mode = if std::env::var_os("NO_COLOR").is_some() {
        ColorMode::Mono
    } else if std::env::var("COLORTERM").is_ok_and(|v| v == "truecolor" || v == "24bit") {
        ColorMode::TrueColor
    } else {
        ColorMode::Ansi
    };
    COLOR_MODE.store(mode as u8, Ordering::Release);
}

fn mode() -> ColorMode {
    match COLOR_MODE.load(Ordering::Acquire) {
        0 => ColorMode::Mono,
        2 => ColorMode::TrueColor,
        _ => ColorMode::Ansi,
    }
}

/// Bold, plus a foreground color when colors are allowed.
fn tinted(ansi: Color, rgb: Color) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match mode() {
        ColorMode::Mono => style,
        ColorMode::Ansi => style.fg(ansi),
        ColorMode::TrueColor => style.fg(rgb),
    }
}

/// Title badge: white on ansible red, REVERSED under NO_COLOR.
/// DIM is removed so the border style doesn't leak in through `Style::patch()`.
pub fn brand_badge() -> Style {
    let base = Style::default()
        .add_modifier(Modifier::BOLD)
        .remove_modifier(Modifier::DIM);
    match mode() {
        ColorMode::Mono => base.add_modifier(Modifier::REVERSED),
        ColorMode::Ansi => base.fg(Color::White).bg(Color::Red),
        ColorMode::TrueColor => base.fg(Color::White).bg(Color::Rgb(238, 0, 0)),
    }
}

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// Overlay titles and section headers.
pub fn brand() -> Style {
    bold()
}

pub fn section_header() -> Style {
    bold()
}

/// Keys in the footer and help overlay.
pub fn accent_bold() -> Style {
    bold()
}

/// The connect key.
pub fn primary_action() -> Style {
    tinted(Color::Green, Color::Rgb(34, 197, 94))
}

/// Group names and overlay borders.
pub fn accent() -> Style {
    match mode() {
        ColorMode::Mono => Style::default(),
        ColorMode::Ansi => Style::default().fg(Color::Cyan),
        ColorMode::TrueColor => Style::default().fg(Color::Rgb(56, 189, 248)),
    }
}

pub fn header() -> Style {
    bold().add_modifier(Modifier::UNDERLINED)
}

pub fn selected() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

pub fn error() -> Style {
    tinted(Color::Red, Color::Rgb(239, 68, 68))
}

pub fn success() -> Style {
    tinted(Color::Green, Color::Rgb(34, 197, 94))
}

pub fn border() -> Style {
    muted()
}

/// Border while searching.
pub fn border_focused() -> Style {
    bold()
}

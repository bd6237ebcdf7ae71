use unicode_width::UnicodeWidthStr;

use crate::inventory::model::InventoryEntry;

pub const HEADERS: [&str; 4] = ["#", "HOST", "GROUP", "ADDRESS"];

const GAP: &str = "  ";

/// One table row: index (1-based), host, group, address.
pub fn row(index: usize, entry: &InventoryEntry) -> [String; 4] {
    [
        (index + 1).to_string(),
        entry.hostname.clone(),
        entry.group_label(),
        entry.address().to_string(),
    ]
}

/// Render hosts as an aligned plain-text table, one row per entry.
pub fn render(entries: &[&InventoryEntry]) -> String {
    if entries.is_empty() {
        return "No hosts found. Check your inventory with 'ansible-inventory --graph'.\n"
            .to_string();
    }

    let rows: Vec<[String; 4]> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| row(i, entry))
        .collect();

    let mut widths = HEADERS.map(|h| h.width());
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r.iter()) {
            *w = (*w).max(cell.width());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    push_line(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for r in &rows {
        push_line(&mut out, r, &widths);
    }
    out
}

/// Print the table to stdout.
pub fn print(entries: &[&InventoryEntry]) {
    print!("{}", render(entries));
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let last = cells.len() - 1;
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        if i == last {
            out.push_str(cell);
        } else {
            out.push_str(&pad(cell, *width));
            out.push_str(GAP);
        }
    }
    out.push('\n');
}

/// Left-align to a display width.
pub fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

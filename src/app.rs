use ratatui::widgets::{ListState, TableState};

use crate::inventory::model::{Inventory, InventoryEntry};

/// Which screen is currently displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    HostList,
    HostDetail { index: usize },
    GroupPicker,
    Help,
}

/// Host table ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortMode {
    /// Inventory order.
    #[default]
    Original,
    /// Alphabetical by hostname.
    Alpha,
    /// By group, then hostname.
    Group,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::Original => SortMode::Alpha,
            SortMode::Alpha => SortMode::Group,
            SortMode::Group => SortMode::Original,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Original => "inventory order",
            SortMode::Alpha => "A-Z",
            SortMode::Group => "by group",
        }
    }

    /// Sort key for an entry. Every entry gets the same key under `Original`,
    /// so a stable sort keeps inventory order.
    pub fn sort_key(self, entry: &InventoryEntry) -> (bool, String, String) {
        match self {
            SortMode::Original => (false, String::new(), String::new()),
            SortMode::Alpha => (false, String::new(), entry.hostname.to_lowercase()),
            // Ungrouped hosts sink to the bottom
            SortMode::Group => (
                entry.groups.is_empty(),
                entry.group_label(),
                entry.hostname.to_lowercase(),
            ),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "original" => Some(SortMode::Original),
            "alpha" => Some(SortMode::Alpha),
            "group" => Some(SortMode::Group),
            _ => None,
        }
    }
}

/// Status message displayed at the bottom.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub tick_count: u32,
}

/// Main application state.
pub struct App {
    pub screen: Screen,
    pub running: bool,
    pub entries: Vec<InventoryEntry>,
    pub groups: Vec<String>,

    /// Indices into `entries` currently shown, after filter and sort.
    pub view: Vec<usize>,
    pub table_state: TableState,

    pub search_query: Option<String>,
    pub group_filter: Option<String>,
    pub group_picker_state: ListState,
    pub sort_mode: SortMode,

    pub status: Option<StatusMessage>,

    /// Entry index chosen with Enter. Launched after the TUI exits.
    pub pending_connect: Option<usize>,
}

impl App {
    pub fn new(inventory: Inventory, sort_mode: SortMode) -> Self {
        let mut app = Self {
            screen: Screen::HostList,
            running: true,
            entries: inventory.entries,
            groups: inventory.groups,
            view: Vec::new(),
            table_state: TableState::default(),
            search_query: None,
            group_filter: None,
            group_picker_state: ListState::default(),
            sort_mode,
            status: None,
            pending_connect: None,
        };
        app.apply_view();
        app
    }

    /// Entry index of the selected row.
    pub fn selected_index(&self) -> Option<usize> {
        self.table_state
            .selected()
            .and_then(|row| self.view.get(row).copied())
    }

    pub fn selected_entry(&self) -> Option<&InventoryEntry> {
        self.selected_index().and_then(|i| self.entries.get(i))
    }

    /// Move selection up, wrapping to the bottom.
    pub fn select_prev(&mut self) {
        if self.view.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => self.view.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    /// Move selection down, wrapping to the top.
    pub fn select_next(&mut self) {
        if self.view.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < self.view.len() => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Rebuild `view` from search, group filter and sort. Keeps the selected
    /// host selected if it survives the filter.
    pub fn apply_view(&mut self) {
        let previous = self.selected_index();
        let needle = self
            .search_query
            .as_deref()
            .unwrap_or("")
            .to_lowercase();

        let mut view: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                self.group_filter
                    .as_ref()
                    .is_none_or(|g| e.groups.contains(g))
            })
            .filter(|(_, e)| e.matches(&needle))
            .map(|(i, _)| i)
            .collect();

        if self.sort_mode != SortMode::Original {
            view.sort_by_cached_key(|&i| self.sort_mode.sort_key(&self.entries[i]));
        }

        let row = previous
            .and_then(|p| view.iter().position(|&i| i == p))
            .or(if view.is_empty() { None } else { Some(0) });
        self.view = view;
        self.table_state.select(row);
    }

    pub fn start_search(&mut self) {
        self.start_search_with(String::new());
    }

    /// Open search with a pre-filled query.
    pub fn start_search_with(&mut self, query: impl Into<String>) {
        self.search_query = Some(query.into());
        self.apply_view();
    }

    pub fn push_search_char(&mut self, c: char) {
        if let Some(ref mut q) = self.search_query {
            q.push(c);
            self.apply_view();
        }
    }

    pub fn pop_search_char(&mut self) {
        if let Some(ref mut q) = self.search_query {
            q.pop();
            self.apply_view();
        }
    }

    pub fn cancel_search(&mut self) {
        self.search_query = None;
        self.apply_view();
    }

    pub fn cycle_sort(&mut self) {
        self.sort_mode = self.sort_mode.next();
        self.apply_view();
        self.set_status(format!("Sorted {}.", self.sort_mode.label()), false);
    }

    /// Rows in the group picker: "all" followed by every group.
    pub fn group_picker_len(&self) -> usize {
        self.groups.len() + 1
    }

    pub fn open_group_picker(&mut self) {
        let row = self
            .group_filter
            .as_ref()
            .and_then(|g| self.groups.iter().position(|x| x == g))
            .map_or(0, |p| p + 1);
        self.group_picker_state.select(Some(row));
        self.screen = Screen::GroupPicker;
    }

    pub fn group_picker_next(&mut self) {
        let len = self.group_picker_len();
        let i = self.group_picker_state.selected().map_or(0, |i| (i + 1) % len);
        self.group_picker_state.select(Some(i));
    }

    pub fn group_picker_prev(&mut self) {
        let len = self.group_picker_len();
        let i = self
            .group_picker_state
            .selected()
            .map_or(0, |i| (i + len - 1) % len);
        self.group_picker_state.select(Some(i));
    }

    /// Apply the highlighted group. Row 0 clears the filter.
    pub fn pick_group(&mut self) {
        let row = self.group_picker_state.selected().unwrap_or(0);
        self.group_filter = row.checked_sub(1).and_then(|i| self.groups.get(i)).cloned();
        self.screen = Screen::HostList;
        self.apply_view();
        match self.group_filter.clone() {
            Some(g) => self.set_status(format!("Showing {} hosts in {}.", self.view.len(), g), false),
            None => self.set_status("Showing all hosts.", false),
        }
    }

    /// Mark the selected host for connection and stop the loop.
    pub fn connect_selected(&mut self) {
        if let Some(index) = self.selected_index() {
            self.pending_connect = Some(index);
            self.running = false;
        }
    }

    /// Set a status message.
    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
            tick_count: 0,
        });
    }

    /// Tick the status message timer. Errors show for 5s, success for 3s.
    pub fn tick_status(&mut self) {
        if let Some(ref mut status) = self.status {
            status.tick_count += 1;
            let timeout = if status.is_error { 20 } else { 12 };
            if status.tick_count > timeout {
                self.status = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> Inventory {
        Inventory::parse_json(
            r#"{
                "_meta": {"hostvars": {"web2": {"ansible_host": "10.0.0.12"}}},
                "all": {"children": ["webservers", "databases"]},
                "webservers": {"hosts": ["web2", "web1"]},
                "databases": {"hosts": ["db1"]}
            }"#,
        )
        .unwrap()
    }

    fn shown(app: &App) -> Vec<&str> {
        app.view
            .iter()
            .map(|&i| app.entries[i].hostname.as_str())
            .collect()
    }

    #[test]
    fn test_new_selects_first() {
        let app = App::new(inventory(), SortMode::Original);
        assert_eq!(shown(&app), vec!["web2", "web1", "db1"]);
        assert_eq!(app.selected_entry().unwrap().hostname, "web2");
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = App::new(inventory(), SortMode::Original);
        app.select_prev();
        assert_eq!(app.selected_entry().unwrap().hostname, "db1");
        app.select_next();
        assert_eq!(app.selected_entry().unwrap().hostname, "web2");
    }

    #[test]
    fn test_sort_modes() {
        let mut app = App::new(inventory(), SortMode::Alpha);
        assert_eq!(shown(&app), vec!["db1", "web1", "web2"]);
        app.cycle_sort();
        assert_eq!(app.sort_mode, SortMode::Group);
        assert_eq!(shown(&app), vec!["db1", "web1", "web2"]);
        app.cycle_sort();
        assert_eq!(shown(&app), vec!["web2", "web1", "db1"]);
    }

    #[test]
    fn test_group_sort_puts_ungrouped_last() {
        let lonely = InventoryEntry::new("aaa");
        assert!(lonely.groups.is_empty());
        let mut grouped = InventoryEntry::new("zzz");
        grouped.groups.insert("web".to_string());
        let mut entries = vec![&lonely, &grouped];
        entries.sort_by_cached_key(|e| SortMode::Group.sort_key(e));
        assert_eq!(entries[0].hostname, "zzz");
    }

    #[test]
    fn test_search_keeps_selection_when_possible() {
        let mut app = App::new(inventory(), SortMode::Original);
        app.select_next(); // web1
        app.start_search();
        for c in "web".chars() {
            app.push_search_char(c);
        }
        assert_eq!(shown(&app), vec!["web2", "web1"]);
        assert_eq!(app.selected_entry().unwrap().hostname, "web1");
        app.push_search_char('2');
        assert_eq!(app.selected_entry().unwrap().hostname, "web2");
        app.cancel_search();
        assert_eq!(app.view.len(), 3);
    }

    #[test]
    fn test_search_matches_address() {
        let mut app = App::new(inventory(), SortMode::Original);
        app.start_search_with("10.0.0.12");
        assert_eq!(shown(&app), vec!["web2"]);
    }

    #[test]
    fn test_search_no_match_clears_selection() {
        let mut app = App::new(inventory(), SortMode::Original);
        app.start_search_with("zzz");
        assert!(app.view.is_empty());
        assert!(app.selected_entry().is_none());
        app.connect_selected();
        assert!(app.running);
        assert!(app.pending_connect.is_none());
    }

    #[test]
    fn test_group_picker_filters() {
        let mut app = App::new(inventory(), SortMode::Original);
        app.open_group_picker();
        assert_eq!(app.screen, Screen::GroupPicker);
        app.group_picker_next();
        app.group_picker_next(); // databases
        app.pick_group();
        assert_eq!(app.group_filter.as_deref(), Some("databases"));
        assert_eq!(shown(&app), vec!["db1"]);

        app.open_group_picker();
        assert_eq!(app.group_picker_state.selected(), Some(2));
        app.group_picker_prev();
        app.group_picker_prev(); // all
        app.pick_group();
        assert!(app.group_filter.is_none());
        assert_eq!(app.view.len(), 3);
    }

    #[test]
    fn test_connect_selected_stops_loop() {
        let mut app = App::new(inventory(), SortMode::Alpha);
        app.connect_selected();
        assert!(!app.running);
        let index = app.pending_connect.unwrap();
        assert_eq!(app.entries[index].hostname, "db1");
    }

    #[test]
    fn test_status_expires() {
        let mut app = App::new(inventory(), SortMode::Original);
        app.set_status("hello", false);
        for _ in 0..12 {
            app.tick_status();
        }
        assert!(app.status.is_some());
        app.tick_status();
        assert!(app.status.is_none());
    }
}

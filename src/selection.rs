use std::io::{self, BufRead, Write};

use log::debug;
use thiserror::Error;

use crate::app::SortMode;
use crate::connection::{LaunchError, Launcher};
use crate::inventory::model::{Inventory, InventoryEntry};
use crate::table;

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("Nothing selected.")]
    Empty,
    #[error("'{input}' is not a number. Pick 1-{count}.")]
    NotANumber { input: String, count: usize },
    #[error("{index} is out of range. Pick 1-{count}.")]
    OutOfRange { index: usize, count: usize },
    #[error("No hosts match '{0}'.")]
    NoMatch(String),
}

/// Parse a 1-based index into a 0-based position within `count` entries.
pub fn parse_selection(input: &str, count: usize) -> Result<usize, SelectionError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SelectionError::Empty);
    }
    let index: usize = input.parse().map_err(|_| SelectionError::NotANumber {
        input: input.to_string(),
        count,
    })?;
    if index == 0 || index > count {
        return Err(SelectionError::OutOfRange { index, count });
    }
    Ok(index - 1)
}

#[derive(Debug, Error)]
pub enum SelectAndLaunchError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("Failed to read selection")]
    Io(#[from] io::Error),
}

/// Entries matching the optional filter, in the requested order.
pub fn ordered<'a>(
    inventory: &'a Inventory,
    filter: Option<&str>,
    sort: SortMode,
) -> Vec<&'a InventoryEntry> {
    let mut entries = inventory.filter(filter.unwrap_or(""));
    if sort != SortMode::Original {
        entries.sort_by_cached_key(|e| sort.sort_key(e));
    }
    entries
}

/// Where the `HOST` argument leads in prompt mode.
#[derive(Debug)]
pub enum HostChoice<'a> {
    /// Connect without a menu.
    Direct(&'a InventoryEntry),
    /// Ask with a numbered menu over these entries.
    Menu(Vec<&'a InventoryEntry>),
}

/// An exact hostname, or a filter with a single match, goes straight to
/// ssh. A filter with no match is an error.
pub fn resolve_host<'a>(
    inventory: &'a Inventory,
    host: Option<&str>,
    sort: SortMode,
) -> Result<HostChoice<'a>, SelectionError> {
    let Some(host) = host else {
        return Ok(HostChoice::Menu(ordered(inventory, None, sort)));
    };
    if let Some(entry) = inventory.find(host) {
        return Ok(HostChoice::Direct(entry));
    }
    let entries = ordered(inventory, Some(host), sort);
    match entries.len() {
        0 => Err(SelectionError::NoMatch(host.to_string())),
        1 => Ok(HostChoice::Direct(entries[0])),
        _ => Ok(HostChoice::Menu(entries)),
    }
}

/// Launch a direct choice, or prompt once over the menu and launch the answer.
/// Cancelling the prompt launches nothing and is not an error.
pub fn launch_choice<R: BufRead, W: Write>(
    choice: HostChoice<'_>,
    input: &mut R,
    out: &mut W,
    launcher: &dyn Launcher,
) -> Result<(), SelectAndLaunchError> {
    let entries = match choice {
        HostChoice::Direct(entry) => {
            debug!("Selected {}", entry.hostname);
            launcher.launch(entry)?;
            return Ok(());
        }
        HostChoice::Menu(entries) => entries,
    };
    let Some(answer) = prompt(&entries, input, out)? else {
        debug!("Selection cancelled");
        return Ok(());
    };
    select_and_launch(&entries, &answer, launcher)
}

/// Resolve `input` against `entries` and hand exactly that entry to the launcher.
/// An invalid selection never reaches the launcher.
pub fn select_and_launch(
    entries: &[&InventoryEntry],
    input: &str,
    launcher: &dyn Launcher,
) -> Result<(), SelectAndLaunchError> {
    let position = parse_selection(input, entries.len())?;
    launcher.launch(entries[position])?;
    Ok(())
}

/// Print the table and read one answer. `None` means the user cancelled with
/// a blank line, `q`, or end of input. The answer is not validated here.
pub fn prompt<R: BufRead, W: Write>(
    entries: &[&InventoryEntry],
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<String>> {
    write!(out, "{}", table::render(entries))?;
    if entries.is_empty() {
        return Ok(None);
    }
    write!(out, "\nHost [1-{}, q to quit]: ", entries.len())?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    let answer = line.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
        return Ok(None);
    }
    Ok(Some(answer.to_string()))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;

    use super::*;
    use crate::connection::{DryRun, SshLauncher};

    /// Records which hosts it was asked to launch.
    #[derive(Default)]
    struct RecordingLauncher {
        launched: RefCell<Vec<String>>,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, entry: &InventoryEntry) -> Result<(), LaunchError> {
            self.launched.borrow_mut().push(entry.hostname.clone());
            Ok(())
        }
    }

    fn hosts() -> Vec<InventoryEntry> {
        ["web1", "web2", "db1"]
            .into_iter()
            .map(InventoryEntry::new)
            .collect()
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1", 3), Ok(0));
        assert_eq!(parse_selection(" 3\n", 3), Ok(2));
        assert_eq!(parse_selection("", 3), Err(SelectionError::Empty));
        assert_eq!(
            parse_selection("0", 3),
            Err(SelectionError::OutOfRange { index: 0, count: 3 })
        );
        assert_eq!(
            parse_selection("4", 3),
            Err(SelectionError::OutOfRange { index: 4, count: 3 })
        );
        assert!(matches!(
            parse_selection("web1", 3),
            Err(SelectionError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_selection("-1", 3),
            Err(SelectionError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_out_of_range_never_launches() {
        let hosts = hosts();
        let entries: Vec<&InventoryEntry> = hosts.iter().collect();
        let launcher = RecordingLauncher::default();
        let err = select_and_launch(&entries, "7", &launcher).unwrap_err();
        assert!(matches!(
            err,
            SelectAndLaunchError::Selection(SelectionError::OutOfRange { index: 7, count: 3 })
        ));
        assert!(launcher.launched.borrow().is_empty());
    }

    #[test]
    fn test_valid_index_launches_exactly_that_host() {
        let hosts = hosts();
        let entries: Vec<&InventoryEntry> = hosts.iter().collect();
        let launcher = RecordingLauncher::default();
        select_and_launch(&entries, "2", &launcher).unwrap();
        assert_eq!(*launcher.launched.borrow(), vec!["web2".to_string()]);
    }

    #[test]
    fn test_prompt_returns_answer() {
        let hosts = hosts();
        let entries: Vec<&InventoryEntry> = hosts.iter().collect();
        let mut input = Cursor::new(" 3 \n");
        let mut out = Vec::new();
        let answer = prompt(&entries, &mut input, &mut out).unwrap();
        assert_eq!(answer.as_deref(), Some("3"));
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("db1"));
        assert!(out.ends_with("Host [1-3, q to quit]: "));
    }

    #[test]
    fn test_prompt_answer_out_of_range_is_rejected_once() {
        let hosts = hosts();
        let entries: Vec<&InventoryEntry> = hosts.iter().collect();
        let launcher = RecordingLauncher::default();
        let mut input = Cursor::new("9\n1\n");
        let mut out = Vec::new();
        let answer = prompt(&entries, &mut input, &mut out).unwrap().unwrap();
        let err = select_and_launch(&entries, &answer, &launcher).unwrap_err();
        assert_eq!(err.to_string(), "9 is out of range. Pick 1-3.");
        assert!(launcher.launched.borrow().is_empty());
    }

    #[test]
    fn test_prompt_cancel() {
        let hosts = hosts();
        let entries: Vec<&InventoryEntry> = hosts.iter().collect();
        for answer in ["q\n", "Q\n", "\n", ""] {
            let mut input = Cursor::new(answer);
            let mut out = Vec::new();
            let result = prompt(&entries, &mut input, &mut out).unwrap();
            assert_eq!(result, None, "answer {:?}", answer);
        }
    }

    fn inventory() -> Inventory {
        Inventory::parse_json(
            r#"{
                "all": {"children": ["web", "db"]},
                "web": {"hosts": ["web1", "web2"]},
                "db": {"hosts": ["db1"]}
            }"#,
        )
        .unwrap()
    }

    fn resolved_names(choice: &HostChoice<'_>) -> Vec<String> {
        match choice {
            HostChoice::Direct(entry) => vec![entry.hostname.clone()],
            HostChoice::Menu(entries) => entries.iter().map(|e| e.hostname.clone()).collect(),
        }
    }

    #[test]
    fn test_exact_hostname_is_direct() {
        let inventory = Inventory {
            entries: vec![InventoryEntry::new("web1"), InventoryEntry::new("web10")],
            groups: Vec::new(),
        };
        let choice = resolve_host(&inventory, Some("web1"), SortMode::Original).unwrap();
        assert!(matches!(choice, HostChoice::Direct(e) if e.hostname == "web1"));
    }

    #[test]
    fn test_single_filter_match_is_direct() {
        let inventory = inventory();
        let choice = resolve_host(&inventory, Some("DB"), SortMode::Original).unwrap();
        assert!(matches!(choice, HostChoice::Direct(e) if e.hostname == "db1"));
    }

    #[test]
    fn test_filter_with_several_matches_is_menu() {
        let inventory = inventory();
        let choice = resolve_host(&inventory, Some("web"), SortMode::Original).unwrap();
        assert!(matches!(choice, HostChoice::Menu(_)));
        assert_eq!(resolved_names(&choice), vec!["web1", "web2"]);

        let all = resolve_host(&inventory, None, SortMode::Alpha).unwrap();
        assert_eq!(resolved_names(&all), vec!["db1", "web1", "web2"]);
    }

    #[test]
    fn test_filter_without_match_is_error() {
        let inventory = inventory();
        let err = resolve_host(&inventory, Some("mail"), SortMode::Original).unwrap_err();
        assert_eq!(err, SelectionError::NoMatch("mail".to_string()));
        assert_eq!(err.to_string(), "No hosts match 'mail'.");
    }

    #[test]
    fn test_direct_choice_launches_without_prompting() {
        let inventory = inventory();
        let launcher = RecordingLauncher::default();
        let choice = resolve_host(&inventory, Some("db"), SortMode::Original).unwrap();
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        launch_choice(choice, &mut input, &mut out, &launcher).unwrap();
        assert_eq!(*launcher.launched.borrow(), vec!["db1".to_string()]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_menu_choice_prompts_then_launches() {
        let inventory = inventory();
        let launcher = RecordingLauncher::default();
        let choice = resolve_host(&inventory, Some("web"), SortMode::Original).unwrap();
        let mut input = Cursor::new("2\n");
        let mut out = Vec::new();
        launch_choice(choice, &mut input, &mut out, &launcher).unwrap();
        assert_eq!(*launcher.launched.borrow(), vec!["web2".to_string()]);
        assert!(String::from_utf8(out).unwrap().contains("Host [1-2, q to quit]: "));
    }

    #[test]
    fn test_menu_choice_cancelled_launches_nothing() {
        let inventory = inventory();
        let launcher = RecordingLauncher::default();
        let choice = resolve_host(&inventory, None, SortMode::Original).unwrap();
        let mut input = Cursor::new("q\n");
        let mut out = Vec::new();
        launch_choice(choice, &mut input, &mut out, &launcher).unwrap();
        assert!(launcher.launched.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_through_selection_prints_command() {
        let inventory = inventory();
        let choice = resolve_host(&inventory, Some("db1"), SortMode::Original).unwrap();
        let dry_run = DryRun::new(SshLauncher::default(), Vec::new());
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        launch_choice(choice, &mut input, &mut out, &dry_run).unwrap();
        assert_eq!(String::from_utf8(dry_run.into_inner()).unwrap(), "ssh -- db1\n");
    }

    #[test]
    fn test_prompt_empty_inventory() {
        let mut input = Cursor::new("1\n");
        let mut out = Vec::new();
        let result = prompt(&[], &mut input, &mut out).unwrap();
        assert_eq!(result, None);
        assert!(String::from_utf8(out).unwrap().starts_with("No hosts found."));
    }
}

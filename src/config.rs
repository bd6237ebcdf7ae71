use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::app::SortMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: invalid value for '{key}': '{value}'", .path.display())]
    Invalid {
        path: PathBuf,
        line: usize,
        key: String,
        value: String,
    },
    #[error("Could not determine home directory")]
    NoHome,
}

/// Settings from `~/.ansible-tty/config`. Read only, never written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Inventory sources passed as `-i`. The key may repeat.
    pub inventory: Vec<String>,
    pub inventory_bin: Option<String>,
    pub ssh_bin: Option<String>,
    /// Fallback ssh user for hosts without `ansible_user`.
    pub user: Option<String>,
    pub sort: Option<SortMode>,
}

pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ansible-tty").join("config"))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(path))
    }
}

impl Settings {
    /// Load settings from a file. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        debug!("Reading config from {}", path.display());
        Self::parse(&content, path)
    }

    /// Parse `key=value` lines. `#` comments and blank lines are skipped,
    /// unknown keys are logged and ignored.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("{}:{}: ignoring line without '='", path.display(), n + 1);
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            let invalid = || ConfigError::Invalid {
                path: path.to_path_buf(),
                line: n + 1,
                key: key.to_string(),
                value: value.to_string(),
            };
            if value.is_empty() {
                return Err(invalid());
            }
            match key {
                "inventory" => {
                    let source = if value.starts_with("~/") {
                        expand_tilde(value)?.display().to_string()
                    } else {
                        value.to_string()
                    };
                    settings.inventory.push(source);
                }
                "inventory_bin" => settings.inventory_bin = Some(value.to_string()),
                "ssh_bin" => settings.ssh_bin = Some(value.to_string()),
                "user" => settings.user = Some(value.to_string()),
                "sort" => settings.sort = Some(SortMode::from_key(value).ok_or_else(invalid)?),
                other => warn!("{}:{}: unknown key '{}'", path.display(), n + 1, other),
            }
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Settings, ConfigError> {
        Settings::parse(content, Path::new("config"))
    }

    #[test]
    fn test_parse_all_keys() {
        let settings = parse(
            "# ansible-tty\n\
             inventory = hosts/prod.yml\n\
             inventory=hosts/stage.yml\n\
             \n\
             inventory_bin=ansible-inventory --playbook-dir site\n\
             ssh_bin=/usr/local/bin/ssh\n\
             user=deploy\n\
             sort=group\n",
        )
        .unwrap();
        assert_eq!(settings.inventory, vec!["hosts/prod.yml", "hosts/stage.yml"]);
        assert_eq!(
            settings.inventory_bin.as_deref(),
            Some("ansible-inventory --playbook-dir site")
        );
        assert_eq!(settings.ssh_bin.as_deref(), Some("/usr/local/bin/ssh"));
        assert_eq!(settings.user.as_deref(), Some("deploy"));
        assert_eq!(settings.sort, Some(SortMode::Group));
    }

    #[test]
    fn test_unknown_keys_and_junk_are_ignored() {
        let settings = parse("colour=purple\njust some words\n").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_bad_sort_is_an_error() {
        let err = parse("\nsort=sideways\n").unwrap_err();
        match err {
            ConfigError::Invalid { line, key, .. } => {
                assert_eq!(line, 2);
                assert_eq!(key, "sort");
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_value_is_an_error() {
        assert!(matches!(parse("user=\n"), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_missing_file_is_default() {
        let settings =
            Settings::load(Path::new("/nonexistent/ansible-tty/config")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("/etc/ansible/hosts").unwrap(), PathBuf::from("/etc/ansible/hosts"));
        assert_eq!(expand_tilde("hosts.ini").unwrap(), PathBuf::from("hosts.ini"));
    }
}

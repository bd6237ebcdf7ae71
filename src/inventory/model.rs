use std::collections::{BTreeMap, BTreeSet};

use log::warn;

/// The full host listing produced by one `ansible-inventory --list` run.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Hosts in inventory order. Hostnames are unique.
    pub entries: Vec<InventoryEntry>,
    /// Every group name that appeared in the listing, `all` excluded.
    pub groups: Vec<String>,
}

/// A single managed host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryEntry {
    pub hostname: String,
    /// Groups that list this host directly.
    pub groups: BTreeSet<String>,
    /// Host variables from `_meta.hostvars`, stringified.
    pub vars: BTreeMap<String, String>,
}

impl InventoryEntry {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Default::default()
        }
    }

    /// First non-empty value among the given var names.
    fn var_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.vars.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    /// Address ssh should dial: `ansible_host`, `ansible_ssh_host`, then the inventory name.
    pub fn address(&self) -> &str {
        self.var_any(&["ansible_host", "ansible_ssh_host"])
            .unwrap_or(&self.hostname)
    }

    pub fn user(&self) -> Option<&str> {
        self.var_any(&["ansible_user", "ansible_ssh_user"])
    }

    /// Port from `ansible_port`/`ansible_ssh_port`. Garbage and 0 read as unset.
    pub fn port(&self) -> Option<u16> {
        self.var_any(&["ansible_port", "ansible_ssh_port"])
            .and_then(|p| p.parse::<u16>().ok())
            .filter(|p| *p != 0)
    }

    pub fn identity_file(&self) -> Option<&str> {
        self.var_any(&["ansible_ssh_private_key_file", "ansible_private_key_file"])
    }

    /// Extra ssh arguments from `ansible_ssh_common_args`, split with shell
    /// quoting rules the way ansible does. Unbalanced quotes fall back to
    /// plain whitespace splitting.
    pub fn extra_ssh_args(&self) -> Vec<String> {
        let Some(args) = self.var_any(&["ansible_ssh_common_args"]) else {
            return Vec::new();
        };
        shlex::split(args).unwrap_or_else(|| {
            warn!(
                "Unbalanced quotes in ansible_ssh_common_args for {}, splitting on spaces",
                self.hostname
            );
            args.split_whitespace().map(str::to_string).collect()
        })
    }

    /// Groups joined with commas (sorted, since `groups` is a BTreeSet).
    pub fn group_label(&self) -> String {
        self.groups
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Case-insensitive substring match on hostname, groups and address.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.hostname.to_lowercase().contains(needle)
            || self.address().to_lowercase().contains(needle)
            || self.groups.iter().any(|g| g.to_lowercase().contains(needle))
    }
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Exact hostname lookup.
    pub fn find(&self, hostname: &str) -> Option<&InventoryEntry> {
        self.entries.iter().find(|e| e.hostname == hostname)
    }

    /// Entries matching a filter, in inventory order.
    pub fn filter(&self, query: &str) -> Vec<&InventoryEntry> {
        let needle = query.to_lowercase();
        self.entries.iter().filter(|e| e.matches(&needle)).collect()
    }
}

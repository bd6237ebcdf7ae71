use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::InventoryError;
use super::model::{Inventory, InventoryEntry};

const ROOT_GROUP: &str = "all";
const META_KEY: &str = "_meta";

/// One group object from `ansible-inventory --list`.
#[derive(Debug, Default, Deserialize)]
struct GroupNode {
    #[serde(default)]
    hosts: Vec<String>,
    #[serde(default)]
    children: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    hostvars: BTreeMap<String, Map<String, Value>>,
}

impl Inventory {
    /// Parse the JSON printed by `ansible-inventory --list`.
    ///
    /// Hosts come out in the order a depth-first walk from `all` first meets
    /// them. Hosts only present in `_meta.hostvars` are appended last.
    pub fn parse_json(content: &str) -> Result<Self, InventoryError> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| InventoryError::Parse(format!("invalid JSON: {}", e)))?;
        let Value::Object(mut root) = root else {
            return Err(InventoryError::Parse(
                "expected a JSON object at the top level".to_string(),
            ));
        };

        let meta: Meta = match root.remove(META_KEY) {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| InventoryError::Parse(format!("bad {} section: {}", META_KEY, e)))?,
            None => Meta::default(),
        };

        let mut groups = BTreeMap::new();
        for (name, value) in root {
            let node: GroupNode = if value.is_null() {
                GroupNode::default()
            } else {
                serde_json::from_value(value)
                    .map_err(|e| InventoryError::Parse(format!("bad group '{}': {}", name, e)))?
            };
            groups.insert(name, node);
        }

        let mut walk = Walk::new(&groups);
        if groups.contains_key(ROOT_GROUP) {
            walk.visit(ROOT_GROUP);
        }
        for name in groups.keys() {
            walk.visit(name);
        }
        for hostname in meta.hostvars.keys() {
            walk.host(hostname);
        }

        let Walk {
            mut entries,
            group_order,
            ..
        } = walk;
        for entry in &mut entries {
            if let Some(vars) = meta.hostvars.get(&entry.hostname) {
                entry.vars = vars
                    .iter()
                    .map(|(k, v)| (k.clone(), stringify(v)))
                    .collect();
            }
        }

        debug!(
            "Parsed inventory: {} hosts in {} groups",
            entries.len(),
            group_order.len()
        );
        Ok(Inventory {
            entries,
            groups: group_order,
        })
    }
}

/// Depth-first walk state. Each group is visited once, which also breaks cycles.
struct Walk<'a> {
    groups: &'a BTreeMap<String, GroupNode>,
    visited: HashSet<String>,
    positions: HashMap<String, usize>,
    entries: Vec<InventoryEntry>,
    group_order: Vec<String>,
}

impl<'a> Walk<'a> {
    fn new(groups: &'a BTreeMap<String, GroupNode>) -> Self {
        Self {
            groups,
            visited: HashSet::new(),
            positions: HashMap::new(),
            entries: Vec::new(),
            group_order: Vec::new(),
        }
    }

    fn visit(&mut self, name: &str) {
        if !self.visited.insert(name.to_string()) {
            return;
        }
        let groups = self.groups;
        let Some(node) = groups.get(name) else {
            debug!("Group '{}' is referenced but never defined", name);
            return;
        };
        if name != ROOT_GROUP {
            self.group_order.push(name.to_string());
        }
        for hostname in &node.hosts {
            let index = self.host(hostname);
            if name != ROOT_GROUP {
                self.entries[index].groups.insert(name.to_string());
            }
        }
        for child in &node.children {
            self.visit(child);
        }
    }

    /// Position of a host, inserting it on first sight.
    fn host(&mut self, hostname: &str) -> usize {
        if let Some(&index) = self.positions.get(hostname) {
            return index;
        }
        let index = self.entries.len();
        self.entries.push(InventoryEntry::new(hostname));
        self.positions.insert(hostname.to_string(), index);
        index
    }
}

/// Strings stay bare, everything else keeps its compact JSON form.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

use std::io::ErrorKind;
use std::process::{Command, Stdio};

use log::{debug, info, warn};

use super::InventoryError;
use super::model::Inventory;

pub const DEFAULT_INVENTORY_BIN: &str = "ansible-inventory";

/// How to invoke `ansible-inventory`.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryCommand {
    pub program: String,
    /// Arguments placed before `--list`.
    pub args: Vec<String>,
    /// Inventory sources, each passed as `-i <source>`.
    pub sources: Vec<String>,
}

impl Default for InventoryCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_INVENTORY_BIN.to_string(),
            args: Vec::new(),
            sources: Vec::new(),
        }
    }
}

impl InventoryCommand {
    /// Build from a command line such as `ansible-inventory --playbook-dir ./site`.
    /// A blank line falls back to the default binary.
    pub fn from_command_line(line: &str, sources: Vec<String>) -> Self {
        let mut parts = line.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(program) => Self {
                program,
                args: parts.collect(),
                sources,
            },
            None => Self {
                sources,
                ..Default::default()
            },
        }
    }

    /// Full argument list handed to the program.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.push("--list".to_string());
        for source in &self.sources {
            argv.push("-i".to_string());
            argv.push(source.clone());
        }
        argv
    }

    /// Run the command once and parse what it prints.
    pub fn fetch(&self) -> Result<Inventory, InventoryError> {
        let argv = self.argv();
        debug!("Running {} {}", self.program, argv.join(" "));

        let output = Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => InventoryError::Unavailable(format!(
                    "'{}' not found. Is ansible installed and on your PATH?",
                    self.program
                )),
                _ => InventoryError::Unavailable(format!(
                    "failed to run '{}': {}",
                    self.program, e
                )),
            })?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(InventoryError::Unavailable(
                match stderr_diagnostics(&output.stderr) {
                    Some(detail) => format!("'{}' exited with {}: {}", self.program, code, detail),
                    None => format!("'{}' exited with {}", self.program, code),
                },
            ));
        }

        // ansible reports unusable -i sources here and still exits 0
        if let Some(diagnostics) = stderr_diagnostics(&output.stderr) {
            warn!("{} reported: {}", self.program, diagnostics);
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| InventoryError::Parse("output is not valid UTF-8".to_string()))?;
        let inventory = Inventory::parse_json(&stdout)?;
        info!(
            "Loaded {} hosts from {}",
            inventory.len(),
            if self.sources.is_empty() {
                "the default inventory".to_string()
            } else {
                self.sources.join(", ")
            }
        );
        Ok(inventory)
    }
}

/// Trimmed stderr, or `None` when there is nothing worth showing.
fn stderr_diagnostics(stderr: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

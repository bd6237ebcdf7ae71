use std::cell::RefCell;
use std::io::{self, ErrorKind, Write};
use std::process::{Command, Stdio};

use log::info;
use thiserror::Error;

use crate::inventory::model::InventoryEntry;

pub const DEFAULT_SSH_BIN: &str = "ssh";

/// ssh reserves 255 for its own failures (unreachable host, auth, bad options).
const SSH_FAILURE_CODE: i32 = 255;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("'{0}' not found. Is an ssh client installed and on your PATH?")]
    NotFound(String),
    #[error("Couldn't reach {host} (ssh exited with 255).")]
    Unreachable { host: String },
    #[error("ssh to {host} exited with code {code}.")]
    Exited { host: String, code: i32 },
    #[error("Failed to launch ssh for '{host}'")]
    Io {
        host: String,
        #[source]
        source: io::Error,
    },
}

/// Starts an interactive session for a chosen host.
pub trait Launcher {
    fn launch(&self, entry: &InventoryEntry) -> Result<(), LaunchError>;
}

/// Launches the system ssh client with inherited stdin/stdout/stderr.
#[derive(Debug, Clone)]
pub struct SshLauncher {
    pub program: String,
    /// `--user` from the command line. Beats the inventory.
    pub user_override: Option<String>,
    /// `user` from the config file. Loses to the inventory.
    pub default_user: Option<String>,
}

impl Default for SshLauncher {
    fn default() -> Self {
        Self {
            program: DEFAULT_SSH_BIN.to_string(),
            user_override: None,
            default_user: None,
        }
    }
}

impl SshLauncher {
    fn user_for<'a>(&'a self, entry: &'a InventoryEntry) -> Option<&'a str> {
        self.user_override
            .as_deref()
            .or_else(|| entry.user())
            .or(self.default_user.as_deref())
    }

    /// Arguments passed to ssh for this host. The destination always follows `--`.
    pub fn ssh_args(&self, entry: &InventoryEntry) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(user) = self.user_for(entry) {
            args.push("-l".to_string());
            args.push(user.to_string());
        }
        if let Some(port) = entry.port() {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(key) = entry.identity_file() {
            args.push("-i".to_string());
            args.push(key.to_string());
        }
        args.extend(entry.extra_ssh_args());
        args.push("--".to_string());
        args.push(entry.address().to_string());
        args
    }

    /// The command as a copy-pasteable shell string.
    /// Arguments with shell metacharacters are single-quoted so a paste can't inject.
    pub fn command_line(&self, entry: &InventoryEntry) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.ssh_args(entry).iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self, entry: &InventoryEntry) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.ssh_args(entry))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    fn map_spawn_error(&self, host: &str, e: io::Error) -> LaunchError {
        if e.kind() == ErrorKind::NotFound {
            LaunchError::NotFound(self.program.clone())
        } else {
            LaunchError::Io {
                host: host.to_string(),
                source: e,
            }
        }
    }
}

impl Launcher for SshLauncher {
    /// On unix this replaces the current process and only returns on failure.
    fn launch(&self, entry: &InventoryEntry) -> Result<(), LaunchError> {
        info!("Connecting to {}: {}", entry.hostname, self.command_line(entry));
        let cmd = self.command(entry);
        self.run(cmd, &entry.hostname)
    }
}

/// Writes the ssh command line to `out` instead of running it.
pub struct DryRun<W: Write> {
    launcher: SshLauncher,
    out: RefCell<W>,
}

impl<W: Write> DryRun<W> {
    pub fn new(launcher: SshLauncher, out: W) -> Self {
        Self {
            launcher,
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> Launcher for DryRun<W> {
    fn launch(&self, entry: &InventoryEntry) -> Result<(), LaunchError> {
        let line = self.launcher.command_line(entry);
        writeln!(self.out.borrow_mut(), "{}", line).map_err(|source| LaunchError::Io {
            host: entry.hostname.clone(),
            source,
        })
    }
}

impl SshLauncher {
    #[cfg(unix)]
    fn run(&self, mut cmd: Command, host: &str) -> Result<(), LaunchError> {
        use std::os::unix::process::CommandExt;
        let err = cmd.exec();
        Err(self.map_spawn_error(host, err))
    }

    #[cfg(not(unix))]
    fn run(&self, mut cmd: Command, host: &str) -> Result<(), LaunchError> {
        let status = cmd.status().map_err(|e| self.map_spawn_error(host, e))?;
        exit_status_to_result(host, status.code())
    }
}

/// Map an ssh exit code onto the launch result.
pub fn exit_status_to_result(host: &str, code: Option<i32>) -> Result<(), LaunchError> {
    match code {
        Some(0) => Ok(()),
        Some(SSH_FAILURE_CODE) => Err(LaunchError::Unreachable {
            host: host.to_string(),
        }),
        Some(code) => Err(LaunchError::Exited {
            host: host.to_string(),
            code,
        }),
        // Killed by a signal
        None => Err(LaunchError::Exited {
            host: host.to_string(),
            code: 1,
        }),
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%~".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

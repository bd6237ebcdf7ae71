use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::{Shell, generate};
use log::{LevelFilter, debug, warn};

use ansible_tty::app::{App, SortMode};
use ansible_tty::config::{self, Settings};
use ansible_tty::connection::{DEFAULT_SSH_BIN, DryRun, LaunchError, Launcher, SshLauncher};
use ansible_tty::inventory::fetcher::{DEFAULT_INVENTORY_BIN, InventoryCommand};
use ansible_tty::inventory::model::{Inventory, InventoryEntry};
use ansible_tty::selection::{self, SelectAndLaunchError, resolve_host};
use ansible_tty::{table, tui, ui};

#[derive(Parser)]
#[command(
    name = "ansible-tty",
    about = "Initiate an ssh session to any host in your ansible inventory.",
    long_about = "ansible-tty lists the hosts from `ansible-inventory --list`,\n\
                  lets you pick one, and replaces itself with `ssh` to that host.\n\n\
                  Connection vars (ansible_host, ansible_user, ansible_port,\n\
                  ansible_ssh_private_key_file) are honored.",
    version
)]
struct Cli {
    /// Connect to this host directly, or filter the host table
    #[arg(value_name = "HOST")]
    host: Option<String>,

    /// Inventory source passed to ansible-inventory as -i (repeatable)
    #[arg(short, long, value_name = "PATH")]
    inventory: Vec<String>,

    /// Remote user, overrides ansible_user
    #[arg(short, long)]
    user: Option<String>,

    /// Print the host table and exit
    #[arg(short, long)]
    list: bool,

    /// Numbered prompt instead of the full-screen picker
    #[arg(short, long)]
    plain: bool,

    /// Print the ssh command instead of running it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Host table order
    #[arg(long, value_enum)]
    sort: Option<SortMode>,

    /// Path to the config file [default: ~/.ansible-tty/config]
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// More logging: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG wins over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_settings(explicit: Option<&str>) -> Result<Settings> {
    let path: PathBuf = match explicit {
        Some(p) => {
            let path = config::expand_tilde(p)?;
            if !path.exists() {
                bail!("Config file {} not found.", path.display());
            }
            path
        }
        None => match config::default_path() {
            Some(p) => p,
            None => {
                warn!("Could not determine home directory, skipping config");
                return Ok(Settings::default());
            }
        },
    };
    Ok(Settings::load(&path)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    ui::theme::init();

    // Shell completions (no inventory needed)
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "ansible-tty", &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli.config.as_deref())?;
    let sort = cli.sort.or(settings.sort).unwrap_or_default();

    let sources = if cli.inventory.is_empty() {
        settings.inventory.clone()
    } else {
        cli.inventory.clone()
    };
    let command = InventoryCommand::from_command_line(
        settings
            .inventory_bin
            .as_deref()
            .unwrap_or(DEFAULT_INVENTORY_BIN),
        sources,
    );
    let inventory = command.fetch()?;

    let ssh = SshLauncher {
        program: settings
            .ssh_bin
            .clone()
            .unwrap_or_else(|| DEFAULT_SSH_BIN.to_string()),
        user_override: cli.user.clone(),
        default_user: settings.user.clone(),
    };
    let launcher: Box<dyn Launcher> = if cli.dry_run {
        Box::new(DryRun::new(ssh, io::stdout()))
    } else {
        Box::new(ssh)
    };

    // List mode
    if cli.list {
        table::print(&selection::ordered(&inventory, cli.host.as_deref(), sort));
        return Ok(());
    }

    // Exact hostname: connect without asking
    if let Some(entry) = cli.host.as_deref().and_then(|h| inventory.find(h)) {
        return connect(launcher.as_ref(), entry);
    }

    let interactive = !cli.plain && io::stdin().is_terminal() && io::stdout().is_terminal();
    if interactive {
        run_picker(inventory, sort, cli.host, launcher.as_ref())
    } else {
        run_prompt(&inventory, cli.host.as_deref(), sort, launcher.as_ref())
    }
}

fn run_prompt(
    inventory: &Inventory,
    host: Option<&str>,
    sort: SortMode,
    launcher: &dyn Launcher,
) -> Result<()> {
    let choice = resolve_host(inventory, host, sort)?;
    let result = selection::launch_choice(
        choice,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        launcher,
    );
    match result {
        Ok(()) => Ok(()),
        Err(SelectAndLaunchError::Launch(e)) => finish_launch(Err(e)),
        Err(e) => Err(e.into()),
    }
}

fn run_picker(
    inventory: Inventory,
    sort: SortMode,
    filter: Option<String>,
    launcher: &dyn Launcher,
) -> Result<()> {
    let mut app = App::new(inventory, sort);
    if let Some(filter) = filter {
        app.start_search_with(filter.as_str());
        if app.view.is_empty() {
            app.set_status(format!("No hosts match '{}'.", filter), true);
        }
    }

    let Some(index) = tui::run(&mut app)? else {
        debug!("Picker closed without a selection");
        return Ok(());
    };
    connect(launcher, &app.entries[index])
}

fn connect(launcher: &dyn Launcher, entry: &InventoryEntry) -> Result<()> {
    debug!("Selected {}", entry.hostname);
    finish_launch(launcher.launch(entry))
}

/// ssh's own exit code is passed through untouched.
fn finish_launch(result: Result<(), LaunchError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(LaunchError::Exited { code, .. }) => std::process::exit(code),
        Err(e) => Err(e.into()),
    }
}

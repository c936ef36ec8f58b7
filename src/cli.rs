use std::path::{Path, PathBuf};

mod auth;
mod components;
mod hierarchy;
mod init;
mod profile;
mod progress;
mod render;
mod reservations;
mod reserve;
mod scan;
mod shell;
mod terminal;

use anyhow::Context as _;
use clap::ArgAction;
use labinv::{App, Config, HttpClient, Session, SessionStore};
use tracing::instrument;

/// The controller as wired up by the binary.
type Client = App<HttpClient>;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the configuration and the session record
    #[arg(short, long, default_value = ".labinv", env = "LABINV_HOME", global = true)]
    root: PathBuf,

    /// Base URL of the inventory service (overrides the configuration file)
    #[arg(long, env = "LABINV_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Shell(shell::Command::default()))
            .run(&self.root, self.base_url.as_deref())
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Create the configuration directory
    Init(init::Command),

    /// Log in to an existing account
    Login(auth::Login),

    /// Create a new account
    Signup(auth::Signup),

    /// Log out and forget the stored session
    Logout,

    /// Show or edit the signed-in user's profile
    #[command(subcommand)]
    Profile(profile::Command),

    /// Show the faculty → department → lab hierarchy
    Hierarchy(hierarchy::Command),

    /// List the components of a lab
    Components(components::Browse),

    /// Search components by name
    Search(components::Search),

    /// Show a single component
    Show(components::Show),

    /// Request to reserve a component
    Reserve(reserve::Reserve),

    /// Withdraw a reservation request
    Cancel(reserve::Cancel),

    /// Look up a component from scanned QR code text
    Scan(scan::Command),

    /// List outstanding reservation requests
    Reservations(reservations::Command),

    /// Start an interactive session (default)
    ///
    /// The session keeps the component store between commands, so
    /// reservations made from search results show up in lab listings.
    Shell(shell::Command),
}

impl Command {
    fn run(self, root: &Path, base_url: Option<&str>) -> anyhow::Result<()> {
        let app = || open_app(root, base_url);
        match self {
            Self::Init(command) => command.run(root, base_url)?,
            Self::Login(command) => command.run(&mut app()?)?,
            Self::Signup(command) => command.run(&mut app()?)?,
            Self::Logout => auth::logout(&mut app()?),
            Self::Profile(command) => command.run(&mut app()?)?,
            Self::Hierarchy(command) => command.run(&mut app()?)?,
            Self::Components(command) => command.run(&mut app()?)?,
            Self::Search(command) => command.run(&mut app()?)?,
            Self::Show(command) => command.run(&mut app()?)?,
            Self::Reserve(command) => command.run(&mut app()?),
            Self::Cancel(command) => command.run(&mut app()?),
            Self::Scan(command) => command.run(&mut app()?)?,
            Self::Reservations(command) => command.run(&app()?)?,
            Self::Shell(command) => command.run(app()?)?,
        }
        Ok(())
    }
}

/// Builds the controller from the configuration under `root`.
#[instrument(level = "debug")]
fn open_app(root: &Path, base_url: Option<&str>) -> anyhow::Result<Client> {
    let mut config = load_config(root);
    if let Some(base_url) = base_url {
        config.set_base_url(base_url.to_string());
    }
    tracing::debug!(base_url = config.base_url(), "using inventory service");

    let client = HttpClient::new(&config).context("failed to initialise the HTTP client")?;
    let session = Session::open(SessionStore::new(root.to_path_buf()));
    Ok(App::new(client, session))
}

fn load_config(root: &Path) -> Config {
    let path = config_path(root);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn config_path(root: &Path) -> PathBuf {
    root.join("config.toml")
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn shell_is_the_default_command() {
        let cli = Cli::try_parse_from(["labinv"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli =
            Cli::try_parse_from(["labinv", "search", "scope", "--base-url", "http://lab"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://lab"));
        assert!(matches!(cli.command, Some(Command::Search(_))));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(load_config(tmp.path()), Config::default());
    }

    #[test]
    fn config_file_is_read_from_root() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::new("https://inventory.example.edu/api");
        config.save(&config_path(tmp.path())).unwrap();

        assert_eq!(load_config(tmp.path()), config);
    }
}

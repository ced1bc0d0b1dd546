//! canary-browser CLI application entry point
//!
//! Connects to a Canary historian and runs the interactive menu: browse the
//! tag hierarchy, read single tags, search, and export date ranges to CSV.
//!
//! # Usage
//!
//! ```bash
//! # Anonymous session against the default port
//! canary-browser historian.plant.local
//!
//! # Authenticated, starting below a given node
//! canary-browser historian.plant.local -u operator --path Plant.Line1
//!
//! # Explicit base URL and verbose logging
//! canary-browser https://historian:55236 --log-level debug
//! ```
//!
//! # Configuration
//!
//! Defaults are read from `~/.config/canary-browser/config.toml` on Linux,
//! created on first run. See `canary_browser::config`.

use canary_browser::{
    BrowserError,
    cli::Cli,
    config::BrowserConfig,
    service::{CanaryClient, Credentials},
    session::Session,
    ui::{DialoguerInput, OutputWriter, StdoutWriter, UserInput},
};
use tracing::info;

type Result<T> = std::result::Result<T, BrowserError>;

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    if let Err(e) = tracing_subscriber::registry().with(filter).with(layer).try_init() {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
}

/// Build credentials, prompting for a password when only a username is known
fn credentials(cli: &Cli, config: &BrowserConfig, input: &dyn UserInput) -> Result<Credentials> {
    let username = cli.resolve_username(config);
    let password = match (&username, &cli.password) {
        (_, Some(password)) => Some(password.clone()),
        (Some(user), None) => input.prompt_password(&format!("Password for {user}"))?,
        (None, None) => None,
    };
    Ok(Credentials { username, password })
}

fn main() -> Result<()> {
    let mut config = BrowserConfig::load()?;

    let cli = Cli::parse_args();
    init_logging(&cli);
    cli.apply_overrides(&mut config);

    let server = cli.resolve_server(&config)?;
    let input = DialoguerInput::new();
    let output = if config.quiet {
        StdoutWriter::quiet()
    } else {
        StdoutWriter::new()
    };

    let credentials = credentials(&cli, &config, &input)?;
    let client = CanaryClient::new(&server, credentials, config.client_options())?;
    info!(url = client.base_url(), "historian client ready");
    output.info(&format!("Using historian at {}", client.base_url()));

    let mut session = Session::new(&client, cli.start_path(), &config, &input, &output);
    session.run()?;

    output.info("Goodbye.");
    Ok(())
}

//! Command-line interface definitions and parsing
//!
//! canary-browser takes a single set of connection flags and then runs the
//! interactive menu; there are no subcommands.
//!
//! # Examples
//!
//! ```
//! use canary_browser::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["canary-browser", "historian", "-u", "operator", "--path", "Plant"]);
//! assert_eq!(cli.server.as_deref(), Some("historian"));
//! assert_eq!(cli.start_path().to_string(), "Plant");
//! ```

use crate::config::BrowserConfig;
use crate::types::TagPath;
use crate::{BrowserError, Result};
use clap::{Parser, ValueEnum};

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Errors and warnings
    #[default]
    Warn,
    /// Errors, warnings, and informational messages
    Info,
    /// All of the above plus debug messages
    Debug,
    /// All messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Directive for `tracing_subscriber::EnvFilter`
    #[must_use]
    pub const fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "canary-browser")]
#[command(about = "Browse and export Canary historian tags", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Historian host, host:port or base URL (defaults to `server` in config)
    #[arg(value_name = "SERVER")]
    pub server: Option<String>,

    /// Username for the historian (defaults to `username` in config)
    #[arg(short = 'u', long = "username")]
    pub username: Option<String>,

    /// Password for the historian; prompted when a username is set without one
    #[arg(short = 'p', long = "password", env = "CANARY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to start browsing at, dot separated
    #[arg(long = "path", value_name = "PATH")]
    pub path: Option<String>,

    /// Suppress informational output
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Log verbosity written to stderr (`RUST_LOG` takes precedence)
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Initial browse path; the root when `--path` is absent
    #[must_use]
    pub fn start_path(&self) -> TagPath {
        self.path.as_deref().map(TagPath::parse).unwrap_or_default()
    }

    /// Server from the flag, falling back to the config file
    ///
    /// # Errors
    ///
    /// Returns `BrowserError::InvalidInput` if neither names a server.
    pub fn resolve_server(&self, config: &BrowserConfig) -> Result<String> {
        self.server
            .as_deref()
            .or(config.server.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| {
                BrowserError::InvalidInput(
                    "No server given. Pass SERVER or set `server` in the config file.".into(),
                )
            })
    }

    /// Username from the flag, falling back to the config file
    #[must_use]
    pub fn resolve_username(&self, config: &BrowserConfig) -> Option<String> {
        self.username.clone().or_else(|| config.username.clone())
    }

    /// Apply flag overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut BrowserConfig) {
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config.quiet |= self.quiet;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("canary-browser").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert!(cli.server.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert!(cli.start_path().is_root());
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "10.0.0.5",
            "-u",
            "operator",
            "-p",
            "secret",
            "--path",
            "Plant.Line1",
            "-q",
            "--log-level",
            "debug",
            "--timeout",
            "90",
        ]);
        assert_eq!(cli.server.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.username.as_deref(), Some("operator"));
        assert_eq!(cli.password.as_deref(), Some("secret"));
        assert_eq!(cli.start_path(), TagPath::parse("Plant.Line1"));
        assert!(cli.quiet);
        assert_eq!(cli.log_level.to_filter_string(), "debug");
        assert_eq!(cli.timeout, Some(90));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        assert!(Cli::try_parse_from(["canary-browser", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_server_falls_back_to_config() {
        let config = BrowserConfig {
            server: Some("historian.local".into()),
            ..BrowserConfig::default()
        };
        assert_eq!(parse(&[]).resolve_server(&config).unwrap(), "historian.local");
        assert_eq!(parse(&["other"]).resolve_server(&config).unwrap(), "other");
    }

    #[test]
    fn test_missing_server_is_error() {
        let err = parse(&[]).resolve_server(&BrowserConfig::default()).unwrap_err();
        assert!(matches!(err, BrowserError::InvalidInput(_)));
    }

    #[test]
    fn test_overrides() {
        let mut config = BrowserConfig::default();
        parse(&["--timeout", "5", "-q"]).apply_overrides(&mut config);
        assert_eq!(config.timeout_secs, 5);
        assert!(config.quiet);
    }

    #[test]
    fn test_username_fallback() {
        let config = BrowserConfig {
            username: Some("from-config".into()),
            ..BrowserConfig::default()
        };
        assert_eq!(parse(&[]).resolve_username(&config).as_deref(), Some("from-config"));
        assert_eq!(
            parse(&["-u", "cli"]).resolve_username(&config).as_deref(),
            Some("cli")
        );
    }
}

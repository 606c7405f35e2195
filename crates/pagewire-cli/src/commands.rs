//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pagewire: locator-driven UI test harness for Selenium and Appium sessions
#[derive(Parser, Debug)]
#[command(name = "pagewire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every locator in a page file
    Lint(LintArgs),

    /// Parse one locator string
    Parse(ParseArgs),

    /// Decode a hex-encoded credential
    Decrypt(DecryptArgs),

    /// Show test data values
    Data(DataArgs),

    /// Show the effective harness configuration
    Config(ConfigArgs),

    /// Open a live session and wait for an element
    #[cfg(feature = "webdriver")]
    Check(CheckArgs),
}

/// Arguments for the lint command
#[derive(Parser, Debug)]
pub struct LintArgs {
    /// Page file (YAML with `page` and `locators`)
    pub file: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the parse command
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Locator in `strategy==value` form
    pub locator: String,
}

/// Arguments for the decrypt command
#[derive(Parser, Debug)]
pub struct DecryptArgs {
    /// Hex-encoded value
    pub value: String,
}

/// Arguments for the data command
#[derive(Parser, Debug)]
pub struct DataArgs {
    /// Test data file (`.yaml`, `.yml` or `.properties`)
    pub file: PathBuf,

    /// Key to print; all pairs when omitted
    pub key: Option<String>,

    /// Hex-decode the value before printing
    #[arg(long, requires = "key")]
    pub decrypt: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file; falls back to `PAGEWIRE_CONFIG`, then defaults
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the check command
#[cfg(feature = "webdriver")]
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Page to open
    pub url: String,

    /// Locator to wait for
    pub locator: String,

    /// Configuration file; falls back to `PAGEWIRE_CONFIG`, then defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL, overriding the configuration
    #[arg(long)]
    pub server: Option<String>,

    /// Step label used for the evidence file name
    #[arg(long, default_value = "check")]
    pub label: String,
}

/// Output format for reports
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_lint_command() {
            let cli = Cli::parse_from(["pagewire", "lint", "pages/login.yaml"]);
            if let Commands::Lint(args) = cli.command {
                assert_eq!(args.file, PathBuf::from("pages/login.yaml"));
                assert_eq!(args.format, OutputFormat::Text);
            } else {
                panic!("expected Lint command");
            }
        }

        #[test]
        fn test_parse_lint_json() {
            let cli = Cli::parse_from(["pagewire", "lint", "p.yaml", "--format", "json"]);
            if let Commands::Lint(args) = cli.command {
                assert_eq!(args.format, OutputFormat::Json);
            } else {
                panic!("expected Lint command");
            }
        }

        #[test]
        fn test_parse_data_with_key() {
            let cli = Cli::parse_from(["pagewire", "data", "td.yaml", "password", "--decrypt"]);
            if let Commands::Data(args) = cli.command {
                assert_eq!(args.key.as_deref(), Some("password"));
                assert!(args.decrypt);
            } else {
                panic!("expected Data command");
            }
        }

        #[test]
        fn test_decrypt_flag_requires_key() {
            assert!(Cli::try_parse_from(["pagewire", "data", "td.yaml", "--decrypt"]).is_err());
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::parse_from(["pagewire", "-vv", "--json-logs", "parse", "id==x"]);
            assert_eq!(cli.verbose, 2);
            assert!(cli.json_logs);
            assert!(matches!(cli.command, Commands::Parse(_)));
        }

        #[test]
        fn test_config_path() {
            let cli = Cli::parse_from(["pagewire", "config", "--path", "pagewire.yaml"]);
            if let Commands::Config(args) = cli.command {
                assert_eq!(args.path, Some(PathBuf::from("pagewire.yaml")));
            } else {
                panic!("expected Config command");
            }
        }

        #[cfg(feature = "webdriver")]
        #[test]
        fn test_parse_check() {
            let cli = Cli::parse_from([
                "pagewire",
                "check",
                "https://example.test/login",
                "id==username",
                "--server",
                "http://localhost:4444",
            ]);
            if let Commands::Check(args) = cli.command {
                assert_eq!(args.locator, "id==username");
                assert_eq!(args.server.as_deref(), Some("http://localhost:4444"));
                assert_eq!(args.label, "check");
            } else {
                panic!("expected Check command");
            }
        }

        #[test]
        fn test_missing_subcommand() {
            assert!(Cli::try_parse_from(["pagewire"]).is_err());
        }
    }
}

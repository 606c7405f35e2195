//! Pagewire CLI binary

use clap::Parser;
use pagewire_cli::handlers;
use pagewire_cli::{Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    pagewire_cli::logging::init_logging(&config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Lint(args) => handlers::execute_lint(&config, &args, &mut out),
        Commands::Parse(args) => handlers::execute_parse(&args, &mut out),
        Commands::Decrypt(args) => handlers::execute_decrypt(&args, &mut out),
        Commands::Data(args) => handlers::execute_data(&args, &mut out),
        Commands::Config(args) => handlers::execute_config(&args, &mut out),
        #[cfg(feature = "webdriver")]
        Commands::Check(args) => handlers::execute_check(&config, &args, &mut out),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_json_logs(cli.json_logs)
}

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use primstage_app::config::{self, DEFAULT_CONFIG_FILE};
use primstage_app::{run, Cli};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_config(path),
        None => config::load_or_default(Path::new(DEFAULT_CONFIG_FILE)),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    log::debug!("primstage core v{}", primstage_core::VERSION);
    match run(cli.command, &config) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

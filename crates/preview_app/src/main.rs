mod cli;
mod platform;

use clap::Parser;
use engine_logging::engine_warn;
use preview_engine::BUILTIN_STAGES;

use platform::config::{load_config, AppConfig};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    if cli.list_stages {
        for name in BUILTIN_STAGES {
            println!("{name}");
        }
        return Ok(());
    }

    let (mut config, config_error) = match cli.config.as_deref().map(load_config) {
        Some(Ok(config)) => (config, None),
        Some(Err(err)) => (AppConfig::default(), Some(err)),
        None => (AppConfig::default(), None),
    };
    cli.apply(&mut config);

    platform::logging::initialize(config.log);
    if let Some(err) = config_error {
        engine_warn!("Using default configuration: {}", err);
        eprintln!("warning: using default configuration: {err}");
    }

    platform::app::run_app(config)
}

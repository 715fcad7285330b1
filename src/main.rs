use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use weatherdash::cli::{self, Cli, Command, Prompt};
use weatherdash::{AppConfig, Db, WeatherApiClient, WeatherError, WeatherService, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            match error.downcast_ref::<WeatherError>() {
                Some(config_error @ WeatherError::Config { .. }) => eprintln!("{config_error}"),
                Some(error) => eprintln!("{}", error.user_message()),
                None => eprintln!("Error: {error:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if matches!(cli.command, Command::Version) {
        println!("weatherdash {}", weatherdash::VERSION);
        return Ok(());
    }

    let config = AppConfig::load_from_path(cli.config.clone())?;

    // One-shot commands log warnings only, unless verbose
    let level = if cli.verbose {
        "debug"
    } else if matches!(cli.command, Command::Serve { .. }) {
        config.logging.level.as_str()
    } else {
        "warn"
    };
    let _guards = logging::init(&config.logging, level)?;
    let config_path = cli.config.clone().or_else(AppConfig::get_config_path);
    debug!(
        "Using config from: {}",
        config_path.map_or_else(|| "defaults".to_string(), |path| path.display().to_string())
    );

    let db = Db::try_new(Path::new(&config.database.path)).await?;
    info!("Database: {}", config.database.path);
    let client = WeatherApiClient::new(&config.weather)?;
    let service = WeatherService::new(Arc::new(client), db).with_config(&config)?;

    let mut prompt = Prompt::default();
    cli::execute(cli.command, Arc::new(service), &config, &mut prompt).await
}

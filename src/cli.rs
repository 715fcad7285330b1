//! Command-line interface

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::WeatherError;
use crate::config::AppConfig;
use crate::models::{Candidate, SettingsPatch};
use crate::service::{Lookup, WeatherRequest, WeatherResult, WeatherService};
use crate::units::UnitSystem;
use crate::{display, web};

#[derive(Parser)]
#[command(
    name = "weatherdash",
    author,
    version,
    about = "Weather lookups with location disambiguation, history and a web dashboard",
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file (default: the user config directory)
    #[clap(long, global = true, env = "WEATHERDASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Current conditions for a location name, postal code or `lat,lon`.
    Weather {
        location: String,

        /// Temperature unit: C or F.
        #[clap(long)]
        unit: Option<UnitSystem>,

        /// Pick the Nth candidate when the location is ambiguous.
        #[clap(long)]
        select: Option<usize>,
    },

    /// Daily forecast for a location.
    Forecast {
        location: String,

        #[clap(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        days: Option<u8>,

        #[clap(long)]
        unit: Option<UnitSystem>,

        #[clap(long)]
        select: Option<usize>,
    },

    /// Natural-language query, e.g. `weather in Paris next friday`.
    Ask {
        #[clap(required = true)]
        phrase: Vec<String>,

        #[clap(long)]
        unit: Option<UnitSystem>,

        #[clap(long)]
        select: Option<usize>,
    },

    /// List the provider's candidates for a query.
    Search { query: String },

    /// Prompt for queries until `quit`.
    #[clap(alias = "i")]
    Interactive,

    /// List favorite locations.
    Favorites {
        /// Toggle the favorite flag of a saved location first.
        #[clap(long)]
        toggle: Option<i64>,
    },

    /// List saved locations.
    Locations {
        /// Filter by name, region or country.
        #[clap(long)]
        search: Option<String>,

        #[clap(long, default_value = "20")]
        limit: u32,
    },

    /// Stored weather snapshots for a saved location.
    History {
        location_id: i64,

        #[clap(long, default_value = "20")]
        limit: u32,

        #[clap(long)]
        unit: Option<UnitSystem>,
    },

    /// Show or change the stored preferences.
    Settings {
        #[clap(long)]
        unit: Option<UnitSystem>,

        #[clap(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        days: Option<u8>,

        #[clap(long)]
        save_history: Option<bool>,

        /// Days of history to show.
        #[clap(long)]
        history_days: Option<u32>,

        #[clap(long, conflicts_with = "clear_default_location")]
        default_location: Option<i64>,

        #[clap(long)]
        clear_default_location: bool,
    },

    /// Print the version.
    Version,

    /// Database counts and configuration summary.
    Diagnostics {
        /// Also make a test search against the provider.
        #[clap(long)]
        check_provider: bool,
    },

    /// Run the web dashboard.
    Serve {
        #[clap(long)]
        host: Option<String>,

        #[clap(long)]
        port: Option<u16>,
    },
}

/// Line reader over stdin used for selections and the interactive loop
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
    interactive: bool,
}

impl Default for Prompt {
    fn default() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            interactive: std::io::stdin().is_terminal(),
        }
    }
}

impl Prompt {
    /// Print `prompt` and read one line; `None` at end of input
    pub async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush().context("failed to flush stdout")?;
        self.lines
            .next_line()
            .await
            .context("failed to read from stdin")
    }

    /// Ask for a 1-based candidate number until a valid one or an empty line is entered
    async fn choose(&mut self, count: usize) -> Result<Option<usize>> {
        loop {
            let Some(line) = self.read_line(&format!("Select a location [1-{count}]: ")).await? else {
                return Ok(None);
            };
            let line = line.trim();
            if line.is_empty() {
                return Ok(None);
            }
            match line.parse::<usize>() {
                Ok(position) if (1..=count).contains(&position) => return Ok(Some(position)),
                _ => println!("Please enter a number between 1 and {count}."),
            }
        }
    }
}

/// What to print for a finished lookup
#[derive(Clone, Copy)]
enum View {
    Current,
    Forecast,
}

impl View {
    fn render(self, result: &WeatherResult) -> String {
        match self {
            Self::Current => display::current(result),
            Self::Forecast => display::forecast(result),
        }
    }
}

pub async fn execute(
    command: Command,
    shared: Arc<WeatherService>,
    config: &AppConfig,
    prompt: &mut Prompt,
) -> Result<()> {
    let service = shared.as_ref();
    match command {
        Command::Weather {
            location,
            unit,
            select,
        } => {
            let request = WeatherRequest {
                unit,
                select,
                ..WeatherRequest::default()
            };
            let lookup = service.weather(&location, &request).await?;
            finish(service, prompt, lookup, &request, View::Current).await
        }
        Command::Forecast {
            location,
            days,
            unit,
            select,
        } => {
            let request = WeatherRequest {
                unit,
                days,
                select,
                ..WeatherRequest::default()
            };
            let lookup = service.weather(&location, &request).await?;
            finish(service, prompt, lookup, &request, View::Forecast).await
        }
        Command::Ask {
            phrase,
            unit,
            select,
        } => {
            let request = WeatherRequest {
                unit,
                select,
                ..WeatherRequest::default()
            };
            let lookup = service.ask(&phrase.join(" "), &request).await?;
            finish(service, prompt, lookup, &request, View::Forecast).await
        }
        Command::Search { query } => {
            let candidates = service.search(&query).await?;
            if candidates.is_empty() {
                println!("No locations found for '{}'.", query.trim());
            } else {
                println!("{}", display::search_results(query.trim(), &candidates));
            }
            Ok(())
        }
        Command::Interactive => interactive(service, prompt).await,
        Command::Favorites { toggle } => {
            if let Some(id) = toggle {
                let location = service.toggle_favorite(id).await?;
                let verb = if location.is_favorite { "Added" } else { "Removed" };
                println!("{verb} {}.", location.display_name());
            }
            println!("{}", display::locations("Favorites", &service.favorites().await?));
            Ok(())
        }
        Command::Locations { search, limit } => {
            let locations = match search {
                Some(text) => service.search_saved(&text, limit).await?,
                None => service.saved_locations(limit).await?,
            };
            println!("{}", display::locations("Saved locations", &locations));
            Ok(())
        }
        Command::History {
            location_id,
            limit,
            unit,
        } => {
            let (location, records) = service.history(location_id, limit).await?;
            let unit = match unit {
                Some(unit) => unit,
                None => service.settings().await?.temperature_unit,
            };
            println!("{}", display::history(&location, &records, unit));
            Ok(())
        }
        Command::Settings {
            unit,
            days,
            save_history,
            history_days,
            default_location,
            clear_default_location,
        } => {
            let patch = SettingsPatch {
                temperature_unit: unit,
                forecast_days: days,
                default_location_id: if clear_default_location {
                    Some(None)
                } else {
                    default_location.map(Some)
                },
                save_history,
                max_history_days: history_days,
            };
            let settings = if patch.is_empty() {
                service.settings().await?
            } else {
                service.update_settings(&patch).await?
            };
            println!("{}", display::settings(&settings));
            Ok(())
        }
        Command::Diagnostics { check_provider } => {
            println!("weatherdash {}", crate::VERSION);
            println!("Database: {}", config.database.path);
            println!("Provider: {}", config.weather.base_url);
            println!(
                "API key: {}",
                if config.weather.api_key.is_some() { "configured" } else { "missing" }
            );
            println!("Log level: {} ({})", config.logging.level, config.logging.output);
            println!("{}", display::diagnostics(&service.diagnostics().await?));
            if check_provider {
                match service.check_provider().await {
                    Ok(count) => println!("Provider: reachable ({count} results for a test search)"),
                    Err(error) => println!("Provider: {}", error.user_message()),
                }
            }
            Ok(())
        }
        Command::Version => {
            println!("weatherdash {}", crate::VERSION);
            Ok(())
        }
        Command::Serve { host, port } => {
            let mut web_config = config.web.clone();
            if let Some(host) = host {
                web_config.host = host;
            }
            if let Some(port) = port {
                web_config.port = port;
            }
            web::serve(Arc::clone(&shared), &web_config).await
        }
    }
}

/// Print a result, asking the user to pick a candidate first if needed
async fn finish(
    service: &WeatherService,
    prompt: &mut Prompt,
    lookup: Lookup,
    request: &WeatherRequest,
    view: View,
) -> Result<()> {
    let result = match lookup {
        Lookup::Weather(result) => *result,
        Lookup::Disambiguate {
            query,
            candidates,
            interpretation,
        } => {
            let Some(candidate) = pick(prompt, &query, candidates).await? else {
                return Ok(());
            };
            match interpretation {
                Some(interpretation) => {
                    service
                        .ask_with_candidate(&candidate, interpretation, request)
                        .await?
                }
                None => service.weather_for_candidate(&candidate, request).await?,
            }
        }
    };
    println!("{}", view.render(&result));
    Ok(())
}

/// Numbered selection on a terminal; elsewhere the candidates go to stderr
/// and the lookup fails as ambiguous.
async fn pick(prompt: &mut Prompt, query: &str, candidates: Vec<Candidate>) -> Result<Option<Candidate>> {
    if !prompt.interactive {
        eprintln!("{}", display::candidates(query, &candidates));
        eprintln!("Re-run with --select N to pick one.");
        return Err(WeatherError::LocationAmbiguous {
            query: query.to_string(),
            candidates,
        }
        .into());
    }

    println!("{}", display::candidates(query, &candidates));
    let Some(position) = prompt.choose(candidates.len()).await? else {
        println!("Cancelled.");
        return Ok(None);
    };
    debug!("Picked candidate {} of {}", position, candidates.len());
    Ok(candidates.into_iter().nth(position - 1))
}

async fn interactive(service: &WeatherService, prompt: &mut Prompt) -> Result<()> {
    println!("Ask about the weather, e.g. 'London tomorrow' or 'weather in Paris this weekend'.");
    println!("Type 'quit' to exit.");
    let request = WeatherRequest::default();

    while let Some(line) = prompt.read_line("> ").await? {
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" | "q" => break,
            _ => {}
        }

        let outcome = match service.ask(line, &request).await {
            Ok(lookup) => finish(service, prompt, lookup, &request, View::Forecast).await,
            Err(error) => Err(error.into()),
        };
        if let Err(error) = outcome {
            match error.downcast_ref::<WeatherError>() {
                Some(error) => println!("{}", error.user_message()),
                None => return Err(error),
            }
        }
        println!();
    }
    Ok(())
}

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use sizzler_core::{
    Config, Coordinates, FixedLocationProvider, IpLocationProvider, LocationFetchCoordinator,
    LocationProvider, ObserverHub, SharedState, StateChange, WeatherContext, client_from_config,
};

use crate::report;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "sizzler", version, about = "Current weather by city or location")]
pub struct Cli {
    /// Log coordinator decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and defaults.
    Configure,

    /// Show weather for a city (defaults to the configured search).
    Show {
        /// City or free-text query.
        city: Option<String>,
    },

    /// Show weather for the current location.
    Here {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Read search text from stdin, one line per edit, and print each update.
    ///
    /// A line of `:here` requests the current location; `:q` quits.
    Watch,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(city).await,
            Command::Here { lat, lon } => {
                here(lat.zip(lon).map(|(la, lo)| Coordinates::new(la, lo))).await
            }
            Command::Watch => watch().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        cfg.api_key = Some(api_key.trim().to_string());
    }

    cfg.default_search = Text::new("Default search:")
        .with_default(&cfg.default_search)
        .prompt()
        .context("Failed to read default search")?;

    let timeout = CustomType::<u64>::new("Request timeout in seconds (0 = none):")
        .with_default(cfg.request_timeout_secs.unwrap_or(0))
        .prompt()
        .context("Failed to read timeout")?;
    cfg.request_timeout_secs = (timeout > 0).then_some(timeout);

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn location_provider(
    cfg: &Config,
    explicit: Option<Coordinates>,
) -> anyhow::Result<Arc<dyn LocationProvider>> {
    let provider: Arc<dyn LocationProvider> = match explicit.or(cfg.home) {
        Some(coordinates) => {
            tracing::debug!(%coordinates, "using fixed location");
            Arc::new(FixedLocationProvider::new(coordinates))
        }
        None => {
            tracing::debug!("using ip lookup for location");
            Arc::new(IpLocationProvider::new()?)
        }
    };
    Ok(provider)
}

/// `show` never requests a location, so it skips building the IP lookup.
fn search_only_provider(cfg: &Config) -> Arc<dyn LocationProvider> {
    Arc::new(FixedLocationProvider::new(cfg.home.unwrap_or_default()))
}

/// One line of `watch` input.
#[derive(Debug, PartialEq, Eq)]
enum WatchLine {
    Quit,
    Here,
    Search(String),
}

impl WatchLine {
    fn parse(line: String) -> Self {
        match line.as_str() {
            ":q" => Self::Quit,
            ":here" => Self::Here,
            _ => Self::Search(line),
        }
    }
}

async fn show(city: Option<String>) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let client = client_from_config(&cfg)?;
    let query = city.unwrap_or_else(|| cfg.default_search.clone());

    let ctx = WeatherContext::with_search_text(client, search_only_provider(&cfg), query.clone());
    ctx.search().settled().await;

    let snap = ctx.snapshot();
    let record = snap
        .current_weather
        .ok_or_else(|| {
            anyhow!("No weather available for '{query}' (rerun with --verbose for details)")
        })?;

    println!("{}", report::render(&record, &snap.map_region));
    Ok(())
}

async fn here(explicit: Option<Coordinates>) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let client = client_from_config(&cfg)?;
    let provider = location_provider(&cfg, explicit)?;

    // No startup search here: only the location fetch should publish.
    let state = Arc::new(SharedState::new(cfg.default_search.clone()));
    let location =
        LocationFetchCoordinator::new(client, provider, state.clone(), Arc::new(ObserverHub::new()));

    location.request_location().await.context("Location task failed")?;
    location.settled().await;

    let snap = state.snapshot();
    let record = snap
        .current_weather
        .ok_or_else(|| anyhow!("Could not determine weather for the current location"))?;

    println!("{}", report::render(&record, &snap.map_region));
    Ok(())
}

async fn watch() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let client = client_from_config(&cfg)?;
    let ctx = WeatherContext::with_search_text(
        client,
        location_provider(&cfg, None)?,
        cfg.default_search.clone(),
    );

    let handle = ctx.subscribe(|change, snap| {
        if change != StateChange::Weather {
            return;
        }
        if let Some(record) = &snap.current_weather {
            println!("{}", report::summary(record));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match WatchLine::parse(line) {
            WatchLine::Quit => break,
            WatchLine::Here => {
                // Detached; `settled` below waits for it.
                drop(ctx.request_location());
            }
            WatchLine::Search(text) => {
                ctx.submit_search_intent(text);
            }
        }
    }

    ctx.settled().await;
    ctx.unsubscribe(handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn here_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["sizzler", "here", "--lat", "33.9", "--lon", "-118.4"])
            .expect("parses");
        match cli.command {
            Command::Here { lat, lon } => {
                assert_eq!(lat, Some(33.9));
                assert_eq!(lon, Some(-118.4));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn here_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["sizzler", "here", "--lat", "33.9"]).is_err());
    }

    #[test]
    fn show_city_is_optional() {
        let cli = Cli::try_parse_from(["sizzler", "-v", "show"]).expect("parses");
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Show { city: None }));
    }

    #[test]
    fn explicit_coordinates_win_over_home() {
        let cfg = Config { home: Some(Coordinates::new(1.0, 1.0)), ..Config::default() };
        let provider = location_provider(&cfg, Some(Coordinates::new(2.0, 2.0))).unwrap();
        assert!(format!("{provider:?}").contains("2.0"));
    }

    #[test]
    fn show_provider_is_fixed_even_without_home() {
        let provider = search_only_provider(&Config::default());
        assert!(format!("{provider:?}").contains("FixedLocationProvider"));

        let cfg = Config { home: Some(Coordinates::new(3.5, 4.5)), ..Config::default() };
        assert!(format!("{:?}", search_only_provider(&cfg)).contains("3.5"));
    }

    #[test]
    fn watch_lines_map_to_commands() {
        assert_eq!(WatchLine::parse(":q".into()), WatchLine::Quit);
        assert_eq!(WatchLine::parse(":here".into()), WatchLine::Here);
        assert_eq!(WatchLine::parse("Paris".into()), WatchLine::Search("Paris".into()));
        assert_eq!(WatchLine::parse(String::new()), WatchLine::Search(String::new()));
    }
}

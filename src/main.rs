/// Command-line front end for the air quality monitoring service.
///
/// Each subcommand opens its own history store handle, runs one operation
/// and prints the result as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::exit;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;

use aqmon_service::analysis;
use aqmon_service::aqi;
use aqmon_service::config::{AppConfig, DEFAULT_CONFIG_PATH};
use aqmon_service::history::{HistoryStore, MemoryHistoryStore, PostgresHistoryStore, UnavailableHistoryStore};
use aqmon_service::ingest::{DemoSource, FallbackSource, OpenWeatherSource, PollutantSource};
use aqmon_service::logging::{self, Component};
use aqmon_service::model::{AnalysisError, StoreError};
use aqmon_service::search;

/// Rows returned by the history listings.
const CITY_HISTORY_LIMIT: usize = 50;
const ALL_HISTORY_LIMIT: usize = 100;

#[derive(Parser)]
#[command(name = "aqmon", version, about = "Air quality monitoring service")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch current conditions for a city and record them.
    Search { city: String },
    /// Compare two or more cities statistically.
    Compare {
        #[arg(required = true, num_args = 2..)]
        cities: Vec<String>,
    },
    /// 7-day AQI forecast.
    Forecast { city: String },
    /// Searched cities ordered by average AQI.
    Rankings,
    /// Daily averages over the last week.
    Trends { city: String },
    /// Statistics and pollutant correlations for a city.
    Analytics { city: String },
    /// Recent history, for one city or across all cities.
    History {
        #[arg(long)]
        city: Option<String>,
    },
    /// Latest AQI for the major-city map.
    Heatmap,
    /// AQI for hand-entered concentrations.
    Calculate {
        #[arg(long)]
        pm25: f64,
        #[arg(long, default_value_t = 0.0)]
        pm10: f64,
    },
}

#[derive(Debug)]
enum CliError {
    Analysis(AnalysisError),
    Store(StoreError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Analysis(e) => write!(f, "{}", e),
            CliError::Store(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "Cannot serialize result: {}", e),
        }
    }
}

impl From<AnalysisError> for CliError {
    fn from(e: AnalysisError) -> Self {
        CliError::Analysis(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            print_error(&e.to_string());
            exit(2);
        }
    };

    logging::init_logger(
        config.logging.level,
        config.logging.file.as_deref(),
        config.logging.console_timestamps,
    );

    match run(cli.command, &config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            print_error(&e.to_string());
            exit(1);
        }
    }
}

fn run(command: Command, config: &AppConfig) -> Result<String, CliError> {
    let now = Utc::now();

    match command {
        Command::Calculate { pm25, pm10 } => to_json(&aqi::calculate(pm25, pm10)),
        Command::History { city } => {
            // Listings and rankings surface store failures instead of degrading.
            let mut store = open_store(config)?;
            let records = match city {
                Some(city) => store.recent_for_city(&city, CITY_HISTORY_LIMIT)?,
                None => store.recent(ALL_HISTORY_LIMIT)?,
            };
            to_json(&records)
        }
        Command::Rankings => {
            let mut store = open_store(config)?;
            to_json(&analysis::rank_cities(store.as_mut(), now)?)
        }
        Command::Search { city } => {
            let (mut store, mut source) = handles(config);
            to_json(&search::search_city(store.as_mut(), source.as_mut(), &city, now)?)
        }
        Command::Compare { cities } => {
            let (mut store, mut source) = handles(config);
            to_json(&analysis::compare(store.as_mut(), source.as_mut(), &cities)?)
        }
        Command::Forecast { city } => {
            let (mut store, mut source) = handles(config);
            let mut rng = rand::thread_rng();
            to_json(&analysis::forecast(store.as_mut(), source.as_mut(), &city, now, &mut rng)?)
        }
        Command::Trends { city } => {
            let (mut store, mut source) = handles(config);
            to_json(&analysis::weekly_trends(store.as_mut(), source.as_mut(), &city, now))
        }
        Command::Analytics { city } => {
            let (mut store, mut source) = handles(config);
            to_json(&analysis::city_analytics(store.as_mut(), source.as_mut(), &city)?)
        }
        Command::Heatmap => {
            let (mut store, mut source) = handles(config);
            to_json(&analysis::heatmap_snapshot(store.as_mut(), source.as_mut()))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn print_error(message: &str) {
    println!("{}", serde_json::json!({ "error": message }));
}

fn open_store(config: &AppConfig) -> Result<Box<dyn HistoryStore>, StoreError> {
    match config.database.url.as_deref() {
        Some(url) => Ok(Box::new(PostgresHistoryStore::connect(url)?)),
        None => {
            logging::warn(
                Component::Database,
                None,
                "No database configured; history is kept in memory for this run only",
            );
            Ok(Box::new(MemoryHistoryStore::new()))
        }
    }
}

/// Like `open_store`, but a connection failure yields a store that fails
/// every call, so searches report the row as not persisted.
fn open_store_or_unavailable(config: &AppConfig) -> Box<dyn HistoryStore> {
    match open_store(config) {
        Ok(store) => store,
        Err(e) => {
            logging::error(Component::Database, None, &format!("{}; history is unavailable", e));
            Box::new(UnavailableHistoryStore::new(e))
        }
    }
}

fn handles(config: &AppConfig) -> (Box<dyn HistoryStore>, Box<dyn PollutantSource>) {
    (open_store_or_unavailable(config), live_source(config))
}

fn live_source(config: &AppConfig) -> Box<dyn PollutantSource> {
    match OpenWeatherSource::new(&config.upstream) {
        Ok(live) => Box::new(FallbackSource::new(live, DemoSource::from_entropy())),
        Err(e) => {
            logging::log_upstream_failure("-", "HTTP client setup", &e);
            Box::new(DemoSource::from_entropy())
        }
    }
}

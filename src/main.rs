//! Dostavka Planner - delivery route construction worker
//!
//! Reads destination records, geocodes them through a persistent cache and
//! builds optimized multi-vehicle routes via openrouteservice.

mod cli;
mod config;
mod defaults;
mod services;
mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::services::destinations::{CsvDestinations, DestinationSource};
use crate::services::geocode_cache::GeocodeCache;
use crate::services::geocoding::{CachingGeocoder, Geocoder, OpenRouteGeocoder};
use crate::services::openroute::{OpenRouteClient, OpenRouteConfig};
use crate::services::optimizer::RouteOptimizer;
use crate::types::{Coordinates, Vehicle};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ./logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "planner.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stderr and file (stdout carries the JSON output)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,dostavka_planner=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let args = Cli::parse();

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let client = Arc::new(OpenRouteClient::new(OpenRouteConfig {
        base_url: config.ors_base_url.clone(),
        api_key: config.ors_api_key.clone(),
        timeout_seconds: config.http_timeout_secs,
    }));

    let cache = GeocodeCache::load(
        &config.cache_path,
        config.cache_max_entries,
        config.cache_expiry_secs,
    );

    let raw_geocoder = Arc::new(OpenRouteGeocoder::new(
        client.clone(),
        (config.warehouse_lon, config.warehouse_lat),
        &config.geocode_country,
    ));
    let geocoder: Arc<dyn Geocoder> = Arc::new(CachingGeocoder::new(raw_geocoder, cache));

    match args.command {
        Command::Optimize { input } => {
            let fleet = match &config.fleet_path {
                Some(path) => Vehicle::load_fleet(Path::new(path))?,
                None => Vehicle::default_fleet(),
            };
            info!("Fleet: {} vehicle(s)", fleet.len());

            let warehouse = Coordinates {
                lat: config.warehouse_lat,
                lon: config.warehouse_lon,
            };
            let optimizer = RouteOptimizer::new(geocoder, client, fleet, warehouse);

            let addresses = CsvDestinations::new(&input).get_addresses().await?;
            info!("Loaded {} destinations from {}", addresses.len(), input);

            let plan = optimizer.optimize(&addresses).await;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Geocode { address } => match geocoder.geocode(&address).await {
            Ok(coords) => println!("{}", serde_json::to_string(&coords)?),
            Err(err) => {
                error!("Geocoding '{}' failed: {}", address, err);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

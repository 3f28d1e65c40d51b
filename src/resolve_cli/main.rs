//! Offline address resolution CLI.
//!
//! Runs the locally-available pipelines (rule-based parser, plus the
//! capture API when a key is configured) against a sled place index and
//! prints one record per pipeline as JSON.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use magnolia::config::Config;
use magnolia::index::SledIndex;
use magnolia::pipeline::ResolutionService;
use magnolia::providers::{
    CaptureAdapter, HttpCaptureClient, Provider, ResolveRequest, RuleParser,
};
use magnolia::resolve::OfflineGeoResolver;

#[derive(Parser, Debug)]
#[command(name = "resolve")]
#[command(about = "Resolve a free-text postal address")]
struct Args {
    /// Free-text address to resolve
    #[arg(short, long)]
    address: String,

    /// ISO-2 country hint
    #[arg(short, long, default_value = "")]
    country: String,

    /// Config file (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Place index path (overrides the config file)
    #[arg(long)]
    index: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let index_path = args.index.clone().unwrap_or(config.index.path.clone());
    info!("Opening place index at {}", index_path.display());
    let index = SledIndex::open(&index_path)
        .with_context(|| format!("Failed to open place index at {}", index_path.display()))?;

    let resolver = OfflineGeoResolver::new(Arc::new(index), config.resolver.city_candidate_limit);

    let mut providers: Vec<Arc<dyn Provider>> = vec![Arc::new(RuleParser::new())];
    if config.pipelines.capture {
        match std::env::var(&config.capture.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                let client = HttpCaptureClient::new(&config.capture.base_url, key.trim());
                providers.push(Arc::new(CaptureAdapter::new(
                    Arc::new(client),
                    5,
                    &config.capture.language,
                )));
            }
            _ => info!(
                "Capture pipeline enabled but {} is not set; skipping",
                config.capture.api_key_env
            ),
        }
    }

    info!("Resolving through {} pipeline(s)", providers.len());
    let service = ResolutionService::new(
        providers,
        resolver,
        Duration::from_secs(config.resolver.adapter_timeout_secs),
    );

    let request = ResolveRequest {
        raw_address: args.address,
        country_hint: args.country,
    };
    let results = service.resolve(&request).await;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

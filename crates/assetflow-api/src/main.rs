//! AssetFlow API server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `ASSETFLOW_*` environment variables, opens the SQLite store, seeds the
//! membership packages on first start, and serves the JSON API over HTTP.
//!
//! Nested keys use a double underscore, e.g.
//! `ASSETFLOW_ROSTER__ENFORCE_MEMBERSHIP_LIMIT=false`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use assetflow_api::{
  AppState, ServerConfig,
  payment::{DisabledProvider, StripeProvider},
};
use assetflow_core::payment::{self, PaymentProvider};
use assetflow_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "AssetFlow API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("ASSETFLOW")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("allowed_origins")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if payment::seed_packages(&store, &server_cfg.packages)
    .await
    .context("failed to seed membership packages")?
  {
    tracing::info!(count = server_cfg.packages.len(), "seeded membership packages");
  }

  let payments: Arc<dyn PaymentProvider> = match &server_cfg.stripe_secret_key {
    Some(key) => Arc::new(StripeProvider::new(&server_cfg.stripe_api_base, key)),
    None => {
      tracing::warn!("no stripe_secret_key configured; payment intents are disabled");
      Arc::new(DisabledProvider)
    }
  };

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(store, server_cfg, payments);
  let app = assetflow_api::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

use paper_terminal::config::Config;
use paper_terminal::feed::{FeedTask, PriceFeed};
use paper_terminal::storage::{
    KeyValueStore, MemoryStore, Persistence, SqliteStore, SqliteStoreConfig,
};
use paper_terminal::terminal::{Terminal, TerminalConfig};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";
const APP_NAME: &str = "paper-terminal";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Loads the config file, or falls back to defaults when the default path is absent.
fn load_config(path: &str) -> Result<Config, String> {
    if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
        dotenvy::dotenv().ok();
        return Ok(Config::with_defaults(APP_NAME));
    }
    Config::load(path).map_err(|e| e.to_string())
}

async fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if !config.storage.enabled {
        info!("Storage disabled, account kept in memory");
        return Arc::new(MemoryStore::new());
    }

    let sqlite_config = SqliteStoreConfig {
        path: config.storage.path.clone(),
        ..SqliteStoreConfig::default()
    };

    match SqliteStore::new(sqlite_config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(path = %config.storage.path, error = %e, "Failed to open storage, account kept in memory");
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    let config_path = parse_config_path();

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return;
        }
    };

    init_tracing(config.app.log_level.as_deref());

    info!(
        app = %config.app.name,
        env = %config.app.env,
        config = %config_path,
        "Starting"
    );

    let store = open_store(&config).await;
    let terminal_config = TerminalConfig::from_config(&config);
    let persistence = Persistence::new(
        store.clone(),
        config.storage.namespace.clone(),
        terminal_config.initial_balance,
    );

    let mut terminal = Terminal::restore(terminal_config, persistence).await;
    if env::args().any(|arg| arg == "--reset") {
        terminal.reset().await;
    }

    let feed = PriceFeed::with_snapshot(terminal.prices().clone(), config.simulator.seed);
    let (feed_task, _prices_tx, prices_rx) = FeedTask::spawn(feed, config.simulator.tick_interval);
    let (handle, task) = terminal.spawn(prices_rx);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!("Shutting down");
    handle.shutdown().await;
    if let Err(e) = task.await {
        error!(error = %e, "Terminal task failed");
    }
    feed_task.stop().await;

    if let Err(e) = store.close().await {
        error!(error = %e, "Failed to close storage");
    }
}

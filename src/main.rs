use clap::Parser;
use oddsline::adapters::{FileMirror, HttpTransport, PostgresStore};
use oddsline::cli::{self, output::OutputMode, Cli};
use oddsline::config::{AppConfig, LoggingConfig};
use oddsline::domain::SportRegistry;
use oddsline::persistence::{
    ConfigurationStore, DurableStore, LocalMirror, MemoryMirror, MemoryStore,
};
use oddsline::{OddsClient, OddsClientOptions};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: could not load config from {} ({}), using defaults", cli.config, e);
            AppConfig::default_config()
        }
    };
    if let Err(errors) = config.validate() {
        anyhow::bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }

    init_logging(&config.logging);

    let store = Arc::new(ConfigurationStore::new(
        durable_store(&config).await?,
        local_mirror(&config),
        SportRegistry::standard(),
    ));
    let transport = Arc::new(HttpTransport::new(&config.provider.base_url)?);
    let client = OddsClient::new(transport, store, OddsClientOptions::from_config(&config));

    let mode = OutputMode::from_json_flag(cli.json);
    cli::commands::run(cli.command, &client, mode, &config.provider.market).await
}

async fn durable_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DurableStore>> {
    match &config.storage.database_url {
        Some(url) => {
            let store = PostgresStore::new(url, config.storage.max_connections).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("storage.database_url not set, configuration will not survive restarts");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn local_mirror(config: &AppConfig) -> Arc<dyn LocalMirror> {
    match config.storage.resolved_mirror_path() {
        Some(path) => {
            info!(path = %path.display(), "Using local credential mirror");
            Arc::new(FileMirror::new(path))
        }
        None => {
            warn!("No config directory available, credential mirror kept in memory");
            Arc::new(MemoryMirror::new())
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if logging.level == "info" {
            EnvFilter::new("info,oddsline=debug,sqlx=warn")
        } else {
            EnvFilter::new(format!("{},sqlx=warn", logging.level))
        }
    });

    // tracing_appender panics if it cannot create the initial file
    let file_layer = logging.dir.as_ref().and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "Warning: Could not create log directory {} ({}), file logging disabled",
                dir.display(),
                e
            );
            return None;
        }

        let file_appender = tracing_appender::rolling::daily(dir, "oddsline.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Lives for the whole process
        Box::leak(Box::new(guard));

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
    });

    let json_layer = logging
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr).with_target(true));
    let console_layer = (!logging.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .with(file_layer)
        .init();
}

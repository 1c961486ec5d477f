use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vigil::{
    config::{AppConfig, WatcherLoader},
    extractor::{Extractor, PageDriver, WebDriverSession},
    notification::NotificationService,
    persistence::SqliteWatcherRepository,
    registry::WatcherRegistry,
    scheduler::Scheduler,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing app.yaml and watchers.yaml.
    #[arg(long, default_value = "configs")]
    config_dir: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    if let Err(e) = run(&cli.config_dir).await {
        tracing::error!(error = %e, "Fatal error, exiting.");
        return Err(e);
    }

    Ok(())
}

async fn run(config_dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(config_dir, "Loading application configuration...");
    let config = AppConfig::new(Some(config_dir))?;
    tracing::debug!(database_url = %config.database_url, "Configuration loaded.");

    tracing::debug!("Initializing watcher repository...");
    let repo = Arc::new(SqliteWatcherRepository::new(&config.database_url).await?);
    repo.run_migrations().await?;
    tracing::info!("Database migrations completed.");

    // Load watcher declarations; unknown event categories or invalid channel
    // options abort startup here.
    let watcher_configs = WatcherLoader::new(config.watcher_config_path.clone()).load()?;
    tracing::info!(count = watcher_configs.len(), "Loaded watcher configuration.");

    // Build the registry for this run and prune rows dropped from the
    // configuration since the store's last write.
    let mut registry =
        WatcherRegistry::new(Arc::clone(&repo) as Arc<dyn vigil::persistence::traits::WatcherRepository>);
    for watcher_config in &watcher_configs {
        registry.register(watcher_config).await?;
    }
    let pruned = registry.reconcile().await?;
    tracing::info!(registered = registry.len(), pruned, "Watcher registry reconciled.");

    tracing::debug!("Connecting to browser driver...");
    let driver: Arc<dyn PageDriver> = Arc::new(WebDriverSession::connect(&config.browser).await?);
    let extractor = Extractor::new(Arc::clone(&driver));

    // Listen for shutdown signals; the scheduler stops at the next safe
    // point after the current watcher's cycle completes.
    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        let ctrl_c = signal::ctrl_c();
        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to register SIGTERM handler")
                .recv()
                .await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
            _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
        }
        signal_token.cancel();
    });

    let scheduler = Scheduler::new(
        Arc::clone(&repo) as Arc<dyn vigil::persistence::traits::WatcherRepository>,
        registry,
        extractor,
        NotificationService::new(),
        config.poll_interval_ms,
        cancellation_token,
    );

    tracing::info!("Starting watch loop...");
    let result = scheduler.run().await;

    // Release the browser session and the store before reporting the loop's
    // outcome.
    if let Err(e) = driver.close().await {
        tracing::warn!(error = %e, "Failed to close browser session cleanly.");
    }
    repo.close().await;

    result?;
    tracing::info!("Shutdown complete.");
    Ok(())
}

use anyhow::Context;
use aurora_core::RefreshFilter;
use aurora_news::{scheduler, NewsService, TruncatingSummarizer};
use aurora_providers::ProviderRegistry;
use aurora_storage::create_storage;
use aurora_web::{create_app, AppState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Aurora news aggregation service", long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Article store: memory or sqlite
    #[arg(long, global = true)]
    storage: Option<String>,
    /// SQLite database file
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[arg(long, env = "NEWSAPI_KEY", global = true, hide_env_values = true)]
    newsapi_key: Option<String>,
    #[arg(long, env = "GNEWS_KEY", global = true, hide_env_values = true)]
    gnews_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API, with the background jobs unless disabled
    Serve {
        /// Address to listen on (e.g. 0.0.0.0:8080)
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        no_scheduler: bool,
    },
    /// Fetch from every enabled provider once and store the results
    Refresh {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Delete articles fetched longer ago than the retention window
    Cleanup {
        #[arg(long)]
        retention_days: Option<u32>,
    },
    /// Show provider status
    Providers,
}

impl Cli {
    /// Flags win over the config file.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(storage) = &self.storage {
            config.storage = storage.clone();
        }
        if let Some(url) = &self.database_url {
            config.database_url = Some(url.clone());
        }
        if let Some(key) = &self.newsapi_key {
            config.providers.newsapi.api_key = Some(key.clone());
        }
        if let Some(key) = &self.gnews_key {
            config.providers.gnews.api_key = Some(key.clone());
        }
    }
}

async fn build_service(config: &AppConfig) -> anyhow::Result<Arc<NewsService>> {
    let storage = create_storage(&config.storage, config.database_url.as_deref())
        .await
        .context("Failed to initialize article store")?;
    info!("✨ Storage initialized successfully (using {})", storage.name());

    let registry = ProviderRegistry::from_settings(
        config.providers.newsapi_settings(),
        config.providers.gnews_settings(),
    )
    .context("Failed to build news providers")?
    .with_retry_interval(config.providers.retry_interval());
    registry.log_status();
    if registry.enabled_providers().is_empty() {
        warn!("No news providers are enabled; set NEWSAPI_KEY or GNEWS_KEY");
    }

    Ok(Arc::new(NewsService::new(
        storage,
        Arc::new(registry),
        Arc::new(TruncatingSummarizer::new(config.summary_length)),
        config.service_config(),
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown requested");
}

async fn serve(news: Arc<NewsService>, config: &AppConfig, bind: String, no_scheduler: bool) -> anyhow::Result<()> {
    let jobs = if no_scheduler || !config.scheduler.enabled {
        info!("Scheduler disabled");
        None
    } else {
        Some(scheduler::start(news.clone(), config.scheduler_config()))
    };

    let app = create_app(AppState::new(news)).await;
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("📡 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    if let Some(jobs) = jobs {
        jobs.stop().await;
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    let news = build_service(&config).await?;

    match cli.command {
        Commands::Serve { bind, no_scheduler } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            serve(news, &config, bind, no_scheduler).await?;
        }
        Commands::Refresh {
            country,
            language,
            category,
            keyword,
        } => {
            let filter = RefreshFilter::new(country, language, category, keyword);
            let outcome = news.refresh(&filter).await?;
            print_json(&outcome)?;
        }
        Commands::Cleanup { retention_days } => {
            let report = news.cleanup(retention_days).await?;
            print_json(&report)?;
        }
        Commands::Providers => {
            for description in news.provider_descriptions() {
                println!("{}", description);
            }
            print_json(&news.health_summary())?;
        }
    }

    Ok(())
}

use actix_web::web;
use clap::Parser;
use dotenvy::dotenv;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use rss_robot::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    errors::AppResult,
    feed::HttpFeedClient,
    feishu::{EventParser, FeishuClient, FeishuConfig},
    observability, server,
    store::{MemoryStore, RedisStore, StateStore},
    tasks::feed_monitor::{runner, ChangeDetector},
    AppContext,
};

/// How long scheduled checks still running at shutdown may take to finish.
const RUN_DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

/// CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() {
    dotenv().ok();
    observability::init_logging();

    let args = Args::parse();
    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_server(config) {
        tracing::error!(error = %e, "Server terminated");
        std::process::exit(1);
    }
}

async fn build_store(config: &AppConfig) -> AppResult<Arc<dyn StateStore>> {
    match config.redis_url() {
        Some(url) => Ok(Arc::new(RedisStore::connect(&url).await?)),
        None => {
            tracing::warn!("RedisAddr is empty, keeping feed state in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn run_server(config: AppConfig) -> AppResult<()> {
    let store = build_store(&config).await?;
    let messenger = Arc::new(FeishuClient::new(FeishuConfig {
        app_id: config.app_id.clone(),
        app_secret: config.app_secret.clone(),
        base_url: config.feishu_base_url.clone(),
    })?);
    let feeds = Arc::new(HttpFeedClient::new()?);

    let detector = Arc::new(ChangeDetector::new(
        feeds,
        store,
        messenger.clone(),
        config.feed_urls.clone(),
        config.link_rule(),
    ));

    // Surface fetch problems before serving anything
    runner::run_once(&detector).await;
    let (stop_scheduler, stop) = oneshot::channel();
    let scheduler = tokio::spawn(runner::start(
        detector,
        config.check_interval(),
        stop,
        RUN_DRAIN_TIMEOUT,
    ));

    let ctx = web::Data::new(AppContext {
        messenger,
        events: EventParser::new(&config.verification_token, &config.encrypt_key),
        feed_urls: config.feed_urls.clone(),
        reply_banner: config.reply_banner.clone(),
    });

    tracing::info!("Starting server at http://{}", config.listen);
    let listener = TcpListener::bind(config.listen.as_str());
    let served = match listener.and_then(|listener| server::run(listener, ctx)) {
        Ok(http) => server::serve_until(http, server::shutdown_signal()).await,
        Err(e) => Err(e),
    };
    tracing::info!("Server stopped");

    // In-flight checks finish (bounded) before the runtime is dropped
    let _ = stop_scheduler.send(());
    if let Err(e) = scheduler.await {
        tracing::error!(error = %e, "Feed monitor task failed");
    }

    served?;
    Ok(())
}

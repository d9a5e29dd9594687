use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use vaccine_availability_monitor::api::create_status_router;
use vaccine_availability_monitor::cli::Cli;
use vaccine_availability_monitor::config::ServiceConfig;
use vaccine_availability_monitor::error::AppError;
use vaccine_availability_monitor::logging::init_logging;
use vaccine_availability_monitor::metrics::AppMetrics;
use vaccine_availability_monitor::monitor::AvailabilityMonitor;
use vaccine_availability_monitor::notify::{LocalClock, SlackNotifier};
use vaccine_availability_monitor::providers::hyvee::HyVeeClient;
use vaccine_availability_monitor::providers::spotter::SpotterClient;
use vaccine_availability_monitor::scheduler;
use vaccine_availability_monitor::search_area::load_search_areas;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let config = ServiceConfig::from_env()
        .and_then(|config| config.apply_cli(&cli))
        .map_err(AppError::Config)
        .unwrap_or_else(|err| {
            tracing::error!("{}", err);
            std::process::exit(1);
        });

    tracing::info!("Service started with config: {:?}", config);

    if let Err(err) = run(config, cli.once).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(config: ServiceConfig, once: bool) -> Result<(), AppError> {
    let areas = load_search_areas(&config.config_dir)?;
    let enabled = areas.iter().filter(|area| area.enabled).count();
    if enabled == 0 {
        tracing::warn!("No enabled search areas in {}", config.config_dir.display());
    }
    tracing::info!("{} search area(s) loaded, {} enabled", areas.len(), enabled);

    let metrics = Arc::new(AppMetrics::new().map_err(|err| AppError::Server(err.to_string()))?);
    let hyvee = HyVeeClient::new(config.hyvee_url.clone(), config.http_timeout())?;
    let spotter = SpotterClient::new(config.spotter_url.clone(), config.http_timeout())?;
    let notifier = SlackNotifier::new(
        config.slack_api_url.clone(),
        config.slack_bot_token.clone(),
        config.http_timeout(),
    )?;

    let mut monitor = AvailabilityMonitor::new(
        Arc::new(hyvee),
        Arc::new(spotter),
        Arc::new(notifier),
        LocalClock::new(),
        metrics.clone(),
    );

    if once {
        let report = scheduler::poll_once(&mut monitor, &areas).await;
        tracing::info!("Single cycle finished: {:?}", report);
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Status server listening on {}", addr);
    let app = create_status_router(metrics);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("Status server stopped: {}", err);
        }
    });

    scheduler::run_polling(&mut monitor, &areas, config.poll_interval()).await;
    Ok(())
}

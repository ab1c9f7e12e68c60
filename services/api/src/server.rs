use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bagtrack::config::AppConfig;
use bagtrack::error::AppError;
use bagtrack::kit::{ExpirationSweep, KitService, RecommendationCatalog};
use bagtrack::telemetry;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryItemRepository, InMemoryMailOutbox, InMemoryUserRepository};
use crate::routes::with_kit_routes;
use crate::scheduler;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = match args.catalog.take() {
        Some(path) => Arc::new(load_catalog(&path)?),
        None => Arc::new(RecommendationCatalog::builtin()),
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let items = Arc::new(InMemoryItemRepository::default());
    let users = Arc::new(InMemoryUserRepository::default());
    let outbox = Arc::new(InMemoryMailOutbox::default());
    let service = Arc::new(KitService::new(
        Arc::clone(&items),
        Arc::clone(&users),
        Arc::clone(&outbox),
    ));

    let sweep = ExpirationSweep::new(items, users, outbox);
    scheduler::spawn_daily_sweep(sweep, config.sweep.hour);

    let app = with_kit_routes(service, catalog)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "emergency bag tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn load_catalog(path: &Path) -> Result<RecommendationCatalog, AppError> {
    let file = std::fs::File::open(path)?;
    let import = RecommendationCatalog::from_reader(file)?;

    if import.assumed_gram_units > 0 {
        warn!(
            path = %path.display(),
            rows = import.assumed_gram_units,
            "catalog rows with unknown weight units were read as grams"
        );
    }
    info!(
        path = %path.display(),
        entries = import.catalog.entries().len(),
        "recommendation catalog loaded from file"
    );

    Ok(import.catalog)
}

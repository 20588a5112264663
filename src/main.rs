use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use productivity_filters::config::{Config, Deployment};
use productivity_filters::filters::PageQuery;
use productivity_filters::lookup::{CachedLookup, LookupClient, LookupService};
use productivity_filters::sync::FilterSession;

/// Replays a dashboard URL (e.g. `/?customer=Acme&model=X1`) through the
/// filter session against the configured lookup service, then prints the
/// resulting filter bar as JSON followed by the submit URL.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    init_tracing(&config.deployment);

    tracing::info!(
        deployment = ?config.deployment,
        base_url = %config.lookup_base_url,
        timeout_secs = config.lookup_timeout_seconds,
        "Configuration loaded"
    );

    let page_url = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let page = PageQuery::from_url(&page_url);
    tracing::info!(url = %page_url, selection = ?page.selection, filter = ?page.filter, "Page query parsed");

    let client = LookupClient::new(&config)?;
    let service: Arc<dyn LookupService> = match config.lookup_cache_ttl() {
        Some(ttl) => {
            tracing::info!(ttl_secs = ttl.as_secs(), "Lookup cache enabled");
            Arc::new(CachedLookup::new(
                Arc::new(client),
                ttl,
                config.lookup_cache_max_entries,
            ))
        }
        None => Arc::new(client),
    };

    let mut session = FilterSession::new(service, page.filter, config.lookup_timeout());
    session.initialize_from_selection(&page.selection).await;
    session.settle().await;

    println!("{}", serde_json::to_string_pretty(&session.view())?);
    println!("{}", session.submit_url());
    Ok(())
}

fn init_tracing(deployment: &Deployment) {
    let json = deployment.structured_logs();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,productivity_filters=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

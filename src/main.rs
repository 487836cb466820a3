use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use autobook::config::AppConfig;
use autobook::services::browser::webdriver::WebDriverProvider;
use autobook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    tracing::info!(
        target_name = %config.target.name,
        url = %config.target.url,
        headless = config.target.headless,
        webdriver = %config.webdriver_url,
        "booking target configured"
    );

    let browser = WebDriverProvider::new(config.webdriver_url.clone(), config.automation.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        browser: Box::new(browser),
    });

    let app = autobook::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

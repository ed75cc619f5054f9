use anyhow::Context;
use tokio::net::TcpListener;

use support_triage::config::AppConfig;
use support_triage::server::app_from_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().context("reading configuration")?;
    let app = app_from_config(&config).context("starting support triage")?;

    eprintln!("Support Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.insights.model);
    eprintln!("   API:   http://0.0.0.0:{}/api/messages", config.port);
    eprintln!("   WS:    ws://0.0.0.0:{}/ws", config.port);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    tracing::info!(port = config.port, "Listening");

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}

//! # DropShip Pay
//!
//! Payment backend for the DropShip storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export FRONTEND_URL=http://localhost:5173
//!
//! # Run the server
//! dropship-pay
//! ```

use pay_api::{create_router, AppConfig, AppState, LogFormat};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging before config so its warnings are visible
    init_tracing(LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref()));

    print_banner();

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config)?;

    info!("Environment: {}", config.environment);
    match &config.frontend_url {
        Some(origin) => info!("CORS origin: {}", origin),
        None => info!("CORS origin: any"),
    }

    let app = create_router(state);

    if !config.should_bind_listener() {
        info!("Production mode: the hosting layer owns the listener, not binding");
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("🚀 DropShip Pay listening on http://{}", listener.local_addr()?);
    info!("🔔 Webhook: POST http://{}/webhook", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

fn print_banner() {
    println!(
        r#"
  DropShip Pay
  ━━━━━━━━━━━━━━━━━━━━━━━
  Stripe payment backend
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}

use std::sync::Arc;

use clap::Parser;
use orgdesk_mock::{AppState, router};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "orgdesk-mock", about = "In-memory mock of the Orgdesk backend API")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1", env = "ORGDESK_MOCK_HOST")]
    host: String,

    /// Listen port
    #[arg(long, default_value_t = 8000, env = "ORGDESK_MOCK_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so RUST_LOG reaches the filter below
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orgdesk_mock=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let state = Arc::new(AppState::seeded());
    let app = router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mock backend listening on http://{}/api", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

use tokio::net::TcpListener;
use tracing::info;

use parley_db::Database;
use parley_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "parley=debug,parley_server=debug,parley_api=debug,parley_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::open(&config.database_url)?;
    let app = parley_server::router(db.clone());

    let addr = config.bind_addr()?;
    info!("Parley listening on {} (store: {})", addr, db.path().display());

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use photo_settings::{app, utils::static_object::{APP_ENV, BIND_ADDRESS}};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "photo_settings=info,tower_http=info".into());

    if APP_ENV.as_str() == "production" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new(
                "photo-settings".into(),
                std::io::stdout,
            ))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let database_url = std::env::var("DATABASE_URL").inspect_err(|_| {
        error!("Env variable `DATABASE_URL` should be set");
    })?;
    let db_pool = PgPool::connect(&database_url).await?;
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let app = app(db_pool).inspect_err(|e| error!(error = %e, "Failed to assemble application"))?;

    let listener = TcpListener::bind(BIND_ADDRESS.as_str()).await?;
    info!(address = %*BIND_ADDRESS, "Server starting");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

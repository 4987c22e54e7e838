use std::time::Duration;

use chrono_tz::Tz;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "aforo={level},server={level},engine={level},delivery={level}",
            level = settings.app.level
        ))
        .init();

    let timezone: Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {}: {err}", settings.app.timezone))?;

    let dispatcher = match &settings.delivery {
        Some(delivery) => {
            tracing::info!("Found delivery settings...");
            Some(build_dispatcher(delivery)?)
        }
        None => {
            tracing::warn!("no delivery settings, closed ledgers will not be sent");
            None
        }
    };

    let Some(server) = settings.server else {
        tracing::warn!("no server settings, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let mut state = server::ServerState::new(engine, dispatcher, timezone);
    if let Some(minutes) = server.session_ttl_minutes {
        state = state.session_ttl(Duration::from_secs(minutes.saturating_mul(60)));
    }
    server::run_with_listener(state, listener).await?;

    Ok(())
}

fn build_dispatcher(
    config: &settings::Delivery,
) -> Result<delivery::Dispatcher, delivery::DeliveryError> {
    let mut builder = delivery::Dispatcher::builder().sink(config.sink.build()?);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(retries) = config.retries {
        builder = builder.retries(retries);
    }
    builder.build()
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

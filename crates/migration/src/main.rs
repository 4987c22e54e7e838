use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./aforo.db?mode=rwc";
const USAGE: &str = "Usage: cargo run -p migration -- [up|down|fresh|status]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let ledger_db = Database::connect(&url).await?;

    match command.as_str() {
        "up" => migration::Migrator::up(&ledger_db, None).await?,
        "down" => migration::Migrator::down(&ledger_db, None).await?,
        "fresh" => migration::Migrator::fresh(&ledger_db).await?,
        "status" => migration::Migrator::status(&ledger_db).await?,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

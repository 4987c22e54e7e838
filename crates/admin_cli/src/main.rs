use std::{error::Error, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use config::{Config, File};
use delivery::{Dispatcher, SinkConfig};
use engine::{Engine, LedgerKey, LedgerSnapshot};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "aforo_admin")]
#[command(about = "Admin utilities for Aforo (inspect, export and deliver ledgers)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./aforo.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ledger(Ledger),
}

#[derive(Args, Debug)]
struct Ledger {
    #[command(subcommand)]
    command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// List every ledger.
    List,
    /// Print the aggregate table of one ledger.
    Show(LedgerArgs),
    /// Write both CSV files of one ledger to a directory.
    Export(ExportArgs),
    /// Send one ledger through a sink described in a TOML file.
    Deliver(DeliverArgs),
}

#[derive(Args, Debug)]
struct LedgerArgs {
    #[arg(long)]
    operator: String,
    #[arg(long)]
    route: String,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    ledger: LedgerArgs,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct DeliverArgs {
    #[command(flatten)]
    ledger: LedgerArgs,
    /// TOML file with the sink options, e.g. `kind = "telegram"`.
    #[arg(long)]
    sink: PathBuf,
    #[arg(long, default_value_t = 2)]
    retries: u32,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn snapshot(
    engine: &Engine,
    args: &LedgerArgs,
) -> Result<LedgerSnapshot, Box<dyn Error + Send + Sync>> {
    let key = LedgerKey::new(args.operator.trim(), args.route.trim());
    if !engine.ledger_exists(&key).await? {
        eprintln!("ledger not found: {key}");
        std::process::exit(1);
    }
    Ok(engine.finalize(&key).await?)
}

fn print_snapshot(snapshot: &LedgerSnapshot) {
    println!("{} ({} / {})", snapshot.key, snapshot.operator, snapshot.route);
    for row in &snapshot.aggregate {
        let date = row
            .last_date
            .map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_default();
        println!(
            "  {:<24} {:>8}  {:<10} {}",
            row.category,
            row.accumulated_count,
            date,
            row.last_route.as_deref().unwrap_or_default()
        );
    }
    println!("  {} history entries", snapshot.history.len());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    let Command::Ledger(Ledger { command }) = cli.command;
    match command {
        LedgerCommand::List => {
            for ledger in engine.list_ledgers().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    ledger.key,
                    ledger.operator,
                    ledger.route,
                    ledger.created_at.format("%d-%m-%Y %H:%M:%S")
                );
            }
        }
        LedgerCommand::Show(args) => {
            let snapshot = snapshot(&engine, &args).await?;
            print_snapshot(&snapshot);
        }
        LedgerCommand::Export(args) => {
            let snapshot = snapshot(&engine, &args.ledger).await?;
            let rendered = delivery::render(&snapshot)?;
            std::fs::create_dir_all(&args.out)?;
            for attachment in rendered.attachments {
                let path = args.out.join(&attachment.file_name);
                std::fs::write(&path, &attachment.bytes)?;
                println!("wrote {}", path.display());
            }
        }
        LedgerCommand::Deliver(args) => {
            let snapshot = snapshot(&engine, &args.ledger).await?;
            let sink: SinkConfig = Config::builder()
                .add_source(File::from(args.sink.as_path()))
                .build()?
                .try_deserialize()?;

            let dispatcher = Dispatcher::builder()
                .sink(sink.build()?)
                .retries(args.retries)
                .build()?;
            dispatcher.deliver(&snapshot).await?;
            println!("delivered {} through {}", snapshot.key, dispatcher.sink_kind());
        }
    }

    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitdigest::github::ReadmeFetcher;
use gitdigest::store::postgres::PgStore;
use gitdigest::store::{KeyStore, NewApiKey};
use gitdigest::summarizer::openai::OpenAiModel;
use gitdigest::{api, cli, config, keys, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "gitdigest=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Key { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            handle_key_command(&db, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let readme = ReadmeFetcher::new(&cfg);
    let model = OpenAiModel::new(&cfg);

    let state = Arc::new(AppState {
        db: Arc::new(db),
        readme,
        model: Arc::new(model),
        config: cfg,
    });

    let app = api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("gitdigest listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_key_command(db: &PgStore, cmd: cli::KeyCommands) -> anyhow::Result<()> {
    match cmd {
        cli::KeyCommands::Create { name, limit } => {
            if limit <= 0 {
                anyhow::bail!("limit must be positive");
            }
            let new = NewApiKey {
                name,
                key: keys::generate_key(),
                usage_limit: limit,
            };
            let row = db.insert_key(&new).await?;
            println!(
                "API key created:\n  Name: {}\n  ID:   {}\n  Use:  x-api-key: {}",
                row.name, row.id, row.key
            );
        }
        cli::KeyCommands::List => {
            let rows = db.list_keys().await?;
            if rows.is_empty() {
                println!("No API keys found.");
            } else {
                println!(
                    "{:<38} {:<20} {:>8} {:>8}  CREATED",
                    "ID", "NAME", "USAGE", "LIMIT"
                );
                for k in rows {
                    println!(
                        "{:<38} {:<20} {:>8} {:>8}  {}",
                        k.id,
                        k.name,
                        k.usage,
                        k.usage_limit,
                        k.created_at.format("%Y-%m-%d")
                    );
                }
            }
        }
        cli::KeyCommands::Delete { id } => {
            let id = uuid::Uuid::parse_str(&id).context("Invalid key ID")?;
            if db.delete_key(id).await? {
                println!("API key deleted.");
            } else {
                println!("API key not found.");
            }
        }
    }
    Ok(())
}

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use minefield_server::net;
use minefield_server::server::GameServer;
use minefield_server::store::SqliteStore;

/// Serve the Minefield Mahjong application.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, value_name = "IP", default_value = "127.0.0.1")]
    host: String,

    #[arg(long, value_name = "PORT", default_value_t = 8080)]
    port: u16,

    /// Debug mode: deterministic deals, seat 0 is East.
    #[arg(long)]
    debug: bool,

    /// Room database; defaults to minefield.db next to the binary.
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();
    log::info!("starting server: {args:?}");

    let db = args.db.unwrap_or_else(|| PathBuf::from("minefield.db"));
    let store = SqliteStore::open(&db)?;
    let server = GameServer::new(Box::new(store), args.debug)?;

    net::serve(server, &args.host, args.port).await
}

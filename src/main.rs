mod api;
mod config;
mod envelope;
mod error;
pub mod models;
mod service;
mod store;

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;

use config::DatabaseUrl;
use envelope::{Invocation, InvocationContext};
use service::ReportService;
use store::postgres::PgConnector;

/// Create, list and delete financial reports stored in PostgreSQL.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the function over HTTP on BIND_ADDR (default 0.0.0.0:3000).
    Serve,
    /// Run a single invocation event and print the response envelope.
    Invoke {
        /// JSON event file. Reads stdin when omitted.
        #[arg(long, short)]
        event: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::try_init_from_env(Env::default().default_filter_or("finreports=info"))?;

    let args = Args::parse();
    let service = ReportService::new(PgConnector, DatabaseUrl::default());

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::start_web_server(service, config::bind_addr()?).await,
        Command::Invoke { event } => {
            let raw = match event {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("cannot read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let event: Invocation =
                serde_json::from_str(&raw).context("event is not a valid invocation")?;

            let envelope = service
                .handle(&event, &InvocationContext::new("cli"))
                .await;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(())
        }
    }
}

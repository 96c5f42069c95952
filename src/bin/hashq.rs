//! hashq CLI: run the service or compute a digest locally.

use clap::{Parser, Subcommand};
use hashq::api::Server;
use hashq::config::{Config, MAX_DURATION_MS};
use hashq::engine::HashService;
use hashq::telemetry::{TelemetryConfig, init_telemetry};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hashq", about = "Deferred password hashing service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to listen on (overrides HASHQ_LISTEN_ADDR)
        #[arg(long)]
        listen: Option<SocketAddr>,
        /// Minimum delay before a password is hashed, in milliseconds
        /// (overrides HASHQ_MIN_DELAY_MS)
        #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_DURATION_MS))]
        min_delay_ms: Option<u64>,
    },
    /// Print the digest of a password without running the service
    Digest {
        /// Password to hash
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            listen,
            min_delay_ms,
        } => cmd_serve(listen, min_delay_ms).await,
        Command::Digest { password } => {
            if password.is_empty() {
                anyhow::bail!("password must not be empty");
            }
            let (digest, elapsed) = hashq::digest::encode(&password);
            println!("{digest}");
            eprintln!("computed in {}us", elapsed.as_micros());
            Ok(())
        }
    }
}

async fn cmd_serve(listen: Option<SocketAddr>, min_delay_ms: Option<u64>) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(addr) = listen {
        config.listen_addr = addr;
    }
    if let Some(ms) = min_delay_ms {
        config.engine.min_delay = Duration::from_millis(ms);
    }

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "hashq".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let service = HashService::start(config.engine);
    let server = Server::bind(config.listen_addr, service.clone(), config.shutdown_grace).await?;

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, draining");
            if let Err(e) = shutdown.drain_and_stop().await {
                tracing::error!("drain failed: {e}");
            }
        }
    });

    server.run().await?;

    // The listener can also stop on its own (I/O error); make sure nothing
    // accepted is left unhashed either way.
    service.drain_and_stop().await?;
    Ok(())
}

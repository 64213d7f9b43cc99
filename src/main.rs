//! Cluster probe.
//!
//! Builds a connection pool from a config file, sends probe requests
//! through it and prints how the pool looks afterwards.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use cluster_transport::config::{self, ClientConfig};
use cluster_transport::observability::{logging, metrics, observer::{MetricsObserver, PoolObserver}};
use cluster_transport::{pool, Transport};

#[derive(Parser)]
#[command(name = "cluster-probe")]
#[command(about = "Probe a cluster through a health-aware connection pool", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node URL; overrides the configured node list. Repeatable.
    #[arg(short, long = "node")]
    nodes: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pool composition
    Nodes,
    /// Send GET requests through the pool
    Probe {
        #[arg(short, long, default_value = "/")]
        path: String,

        #[arg(short = 'n', long, default_value_t = 10)]
        count: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ClientConfig::default(),
    };
    if !cli.nodes.is_empty() {
        config.nodes = cli.nodes.clone();
        config::validation::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        nodes = config.nodes.len(),
        interval_secs = config.resurrection.interval_secs,
        initial_timeout_secs = config.resurrection.initial_timeout_secs,
        "Configuration loaded"
    );

    let mut observer: Option<Arc<dyn PoolObserver>> = None;
    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
        observer = Some(Arc::new(MetricsObserver));
    }

    let pool = pool::build(config.connections()?, config.resurrection.clone(), observer);

    match cli.command {
        Commands::Nodes => {}
        Commands::Probe { path, count } => {
            let transport = Transport::new(pool.clone(), &config.transport)?;
            let mut ok = 0u32;
            for i in 0..count {
                let start = Instant::now();
                match transport.get(&path).await {
                    Ok(response) => {
                        ok += 1;
                        tracing::info!(
                            request = i,
                            status = %response.status(),
                            url = %response.url(),
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "Probe complete"
                        );
                    }
                    Err(e) => tracing::error!(request = i, error = %e, "Probe failed"),
                }
            }
            tracing::info!(ok, failed = count - ok, "Probing finished");
        }
    }

    println!("{}", serde_json::to_string_pretty(&pool.snapshot())?);
    pool.close();
    Ok(())
}

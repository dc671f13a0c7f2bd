//! Seele Node - blockchain node daemon
//!
//! Usage:
//!   seele-node --config node.toml
//!
//! The node will:
//! - Start the P2P transport
//! - Start the seele service over an in-memory chain and pool
//! - Serve JSON-RPC on the raw socket and HTTP endpoints
//! - Run until Ctrl+C is received

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use seele::{Block, MemoryChain, MemoryTxPool, SeeleService};
use seele_node::{Config, LogFormat, Node};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "seele-node", about = "Seele blockchain node daemon", version)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long, short = 'c', env = "SEELE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides the raw socket RPC listen address.
    #[arg(long, value_name = "ADDR", env = "SEELE_RPC_ADDR")]
    rpc_addr: Option<String>,

    /// Overrides the HTTP RPC listen address.
    #[arg(long, value_name = "ADDR", env = "SEELE_HTTP_ADDR")]
    http_addr: Option<String>,

    /// Overrides the P2P listen address.
    #[arg(long, value_name = "ADDR", env = "SEELE_P2P_ADDR")]
    p2p_addr: Option<String>,

    /// Overrides the log level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL", env = "SEELE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Overrides the log format (text, json, pretty).
    #[arg(long, value_name = "FORMAT", env = "SEELE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Run in daemon mode (no console output).
    #[arg(long, short = 'd', env = "SEELE_DAEMON")]
    daemon: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.check_config {
        println!("configuration OK");
        return Ok(());
    }

    let _logging = logging::init_tracing(&config.log, cli.daemon)?;
    info!(
        target: "seele",
        name = %config.name,
        rpc = %config.rpc_addr,
        http = %config.http_addr,
        p2p = %config.p2p.listen_addr,
        "starting seele node"
    );

    let genesis = Block::genesis().context("failed to build genesis block")?;
    let chain = Arc::new(MemoryChain::with_genesis(genesis));
    let pool = Arc::new(MemoryTxPool::new());

    let node = Node::new(&config);
    node.register(Arc::new(SeeleService::new(chain, pool)))
        .await
        .context("failed to register seele service")?;
    node.start().await.context("failed to start node")?;

    if let Err(err) = signal::ctrl_c().await {
        error!(target: "seele", error = %err, "failed to wait for shutdown signal");
    } else {
        info!(target: "seele", "shutdown signal received (Ctrl+C)");
    }

    node.stop().await.context("node stopped with errors")?;
    info!(target: "seele", "shutdown complete");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, cli);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(addr) = &cli.rpc_addr {
        config.rpc_addr = addr.clone();
    }
    if let Some(addr) = &cli.http_addr {
        config.http_addr = addr.clone();
    }
    if let Some(addr) = &cli.p2p_addr {
        config.p2p.listen_addr = addr.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
}

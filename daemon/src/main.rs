//! DAOship daemon: runs the governance engine behind its HTTP API.

mod config;
mod shutdown;
mod sweeper;

use anyhow::Context;
use clap::Parser;
use config::DaemonConfig;
use daoship_governance::GovernanceEngine;
use daoship_rpc::{AppState, RpcMetrics, RpcServer};
use daoship_store::RetryingStore;
use daoship_store_lmdb::LmdbEnvironment;
use daoship_types::SystemClock;
use shutdown::ShutdownController;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "daoship-daemon", about = "DAO governance service")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "DAOSHIP_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "DAOSHIP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address the HTTP API binds to.
    #[arg(long, env = "DAOSHIP_RPC_BIND")]
    rpc_bind: Option<IpAddr>,

    /// HTTP API port.
    #[arg(long, env = "DAOSHIP_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Seconds between lifecycle sweeps.
    #[arg(long, env = "DAOSHIP_SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: Option<u64>,

    /// LMDB map size in MiB.
    #[arg(long, env = "DAOSHIP_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, env = "DAOSHIP_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DAOSHIP_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the service.
    Run,
    /// Print the effective configuration as TOML and exit.
    Config,
}

impl Cli {
    /// Layer CLI flags and env vars over the file config (or defaults).
    fn resolve_config(&self) -> anyhow::Result<DaemonConfig> {
        let base = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        let config = DaemonConfig {
            data_dir: self.data_dir.clone().unwrap_or(base.data_dir),
            rpc_bind: self.rpc_bind.unwrap_or(base.rpc_bind),
            rpc_port: self.rpc_port.unwrap_or(base.rpc_port),
            sweep_interval_secs: self.sweep_interval_secs.unwrap_or(base.sweep_interval_secs),
            map_size_mb: self.map_size_mb.unwrap_or(base.map_size_mb),
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            ..base
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match cli.command {
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Run => run(config).await,
    }
}

async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    daoship_utils::init_logging(config.log_format()?, &config.log_level)
        .context("failed to initialise logging")?;

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("cannot create data dir {}", config.data_dir.display()))?;
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("cannot open store in {}", config.data_dir.display()))?;
    let store = Arc::new(RetryingStore::new(
        env.governance_store(),
        config.retry_policy(),
    ));
    let engine = Arc::new(GovernanceEngine::new(store, SystemClock::shared()));
    let metrics = Arc::new(RpcMetrics::new().context("failed to register metrics")?);

    info!(
        data_dir = %config.data_dir.display(),
        rpc = %config.rpc_addr(),
        sweep_interval_secs = config.sweep_interval_secs,
        "starting DAOship daemon"
    );

    let shutdown = ShutdownController::new();
    let sweeper = tokio::spawn(sweeper::run(
        Arc::clone(&engine),
        Arc::clone(&metrics),
        config.sweep_interval(),
        shutdown.subscribe(),
    ));

    let server = RpcServer::new(config.rpc_addr(), AppState { engine, metrics });
    let mut server = tokio::spawn(server.start(shutdown.signalled()));

    // the server exiting on its own (bind failure) also stops the daemon
    let finished = tokio::select! {
        _ = shutdown.wait_for_signal() => None,
        res = &mut server => Some(res),
    };
    shutdown.shutdown();
    let served = match finished {
        Some(res) => res,
        None => server.await,
    };
    sweeper.await?;
    served?.context("HTTP API failed")?;
    info!("DAOship daemon exited cleanly");
    Ok(())
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use stakesync::handlers::stake_handlers;
use stakesync::settings::Settings;
use stakesync::syncer::connect_chain_reader;
use stakesync::{
    logging, Contract, PostgresRepo, RedisCheckpointStore, Repo, RepoMigrations, SyncError,
};

#[derive(Parser)]
#[clap(rename_all = "kebab-case", author, version, about = "Sync staking contract events into Postgres")]
struct Args {
    /// Path of the YAML settings file
    #[clap(env = "STAKESYNC_CONFIG", short, long, default_value = "./config/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::load(&args.config)?;
    logging::init(&settings.log);

    let repo = PostgresRepo::new(&settings.db.dsn, settings.db.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    repo.migrate(&PostgresRepo::get_internal_migrations())
        .await
        .context("Failed to run migrations")?;

    let checkpoints = RedisCheckpointStore::connect(&settings.redis.url())
        .await
        .context("Failed to connect to Redis")?;

    let contracts = load_contracts(&repo, &settings, &args.config).await?;
    info!(contracts = contracts.len(), "starting sync");

    let config = contracts
        .into_iter()
        .fold(settings.config(), |config, contract| config.add_contract(contract));

    let cancellation_token = CancellationToken::new();
    let handles = stakesync::start(
        &config,
        &repo,
        Arc::new(checkpoints),
        |contract| {
            let json_rpc_url = contract.json_rpc_url.as_deref().ok_or_else(|| {
                SyncError::InvalidContract(format!("{} has no JSON-RPC URL", contract.name))
            })?;

            Ok(Arc::new(connect_chain_reader(json_rpc_url)?))
        },
        &cancellation_token,
    )
    .map_err(|error| anyhow::anyhow!("Failed to start sync tasks: {error}"))?;

    shutdown_signal().await;
    info!("shutting down");
    cancellation_token.cancel();

    for handle in handles {
        if let Err(join_error) = handle.await {
            error!(error = %join_error, "sync task panicked");
        }
    }

    Ok(())
}

async fn load_contracts(
    repo: &PostgresRepo,
    settings: &Settings,
    config_path: &Path,
) -> Result<Vec<Contract>> {
    let mut contracts = repo
        .get_all_contracts()
        .await
        .context("Failed to load contract registry")?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    contracts.extend(settings.contracts(base_dir)?);

    Ok(contracts
        .into_iter()
        .map(|contract| contract.add_handlers(stake_handlers()))
        .collect())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (Ok(mut terminate), Ok(mut hangup)) =
            (signal(SignalKind::terminate()), signal(SignalKind::hangup()))
        else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!(signal = "SIGINT", "exit by signal"),
            _ = terminate.recv() => info!(signal = "SIGTERM", "exit by signal"),
            _ = hangup.recv() => info!(signal = "SIGHUP", "exit by signal"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!(signal = "ctrl-c", "exit by signal");
    }
}

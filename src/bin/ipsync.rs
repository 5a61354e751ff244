//! ipsync: keeps tagged security group rules pointed at this host's public IP
//!
//! Loads the YAML config, then runs reconciliation cycles every `sleepTime`
//! minutes (or once, when no interval is configured or `--once` is given).

use anyhow::{Context, Result};
use clap::Parser;
use ipsync::aliyun::EcsContext;
use ipsync::defaults::DEFAULT_CONFIG_PATH;
use ipsync::repository::EcsRuleRepository;
use ipsync::resolver::HttpAddressResolver;
use ipsync::scheduler::{self, Schedule};
use ipsync::{Config, Reconciler, Target};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "ipsync")]
#[command(about = "Keep security group ingress rules pointed at this host's public IP")]
#[command(version)]
struct Args {
    /// Path to the YAML config file
    #[arg(short, long, env = "IPSYNC_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Run a single cycle even if sleepTime is set
    #[arg(long)]
    once: bool,

    /// Log the rules that would change without touching them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::load(&args.config).context("Failed to load configuration")?;
    info!(
        config = %args.config.display(),
        access_key = %config.access.masked_key(),
        region = %config.region_id,
        security_group_id = %config.security_group_id,
        description = %config.description,
        sleep_time = ?config.sleep_time,
        dry_run = args.dry_run,
        "Loaded configuration"
    );

    let ecs = EcsContext::from_config(&config)
        .ecs_client()
        .context("Failed to create ECS client")?;
    let repository = EcsRuleRepository::new(ecs, config.nic_type);
    let resolver =
        HttpAddressResolver::new(config.ip_service()).context("Failed to create IP resolver")?;

    let reconciler =
        Reconciler::new(repository, resolver, Target::from(&config)).with_dry_run(args.dry_run);

    let schedule = if args.once {
        Schedule::Once
    } else {
        Schedule::from_interval(config.sleep_interval())
    };

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl-C, stopping after the current cycle");
            ctrl_c_cancel.cancel();
        }
    });

    scheduler::run(&reconciler, schedule, &cancel)
        .await
        .context("Reconciliation cycle failed")?;

    Ok(())
}

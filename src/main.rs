use anyhow::Context;
use clap::Parser;
use port_exporter::cli::Args;
use port_exporter::collector::Collector;
use port_exporter::server;
use prometheus::Registry;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let registry = Registry::new();
    let collector = Collector::initialize(&args.instances, args.settings(), &registry)
        .context("failed to initialize collector")?;

    let cancel = CancellationToken::new();
    let mut collector_task = tokio::spawn(collector.run(cancel.clone()));
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("starting metrics server at {}", args.listen);

    tokio::select! {
        joined = &mut collector_task => {
            cancel.cancel();
            joined
                .context("collector task panicked")?
                .context("collector stopped")?;
        }
        served = server::serve(listener, registry, cancel.clone()) => {
            cancel.cancel();
            served.context("metrics server failed")?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info,port_exporter=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("shutdown requested");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
    }
}

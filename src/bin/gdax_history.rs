use anyhow::Context;
use chrono::Utc;
use clap::{error::ErrorKind, CommandFactory, Parser};
use log::{error, info, warn};
use std::process::ExitCode;
use std::sync::Arc;

use gdax_history::{
    cli::Args,
    config::AppConfig,
    exchange::ExchangeConnector,
    services::{resolve_output_path, write_dataset, CandleFetchLoop, DatasetKey, Interrupt},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(message) = args.validate() {
        Args::command().error(ErrorKind::ArgumentConflict, message).exit();
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    let connector = ExchangeConnector::new(&config).context("building HTTP client")?;
    let target = args.target();
    let interrupt = Arc::new(Interrupt::new());
    listen_for_interrupts(interrupt.clone());
    let fetch_loop = CandleFetchLoop::new(connector, target.clone(), config.fetch_settings())?
        .with_interrupt(interrupt);

    let now = Utc::now();
    let outcome = fetch_loop.run(now).await;
    if let Some(failure) = &outcome.failure {
        error!("download stopped early, saving partial data: {}", failure);
    }

    let key = DatasetKey::for_run(&target, &outcome.dataset, now);
    let path = resolve_output_path(args.output.as_deref(), &key);
    match write_dataset(&path, &outcome.dataset) {
        Ok(()) => info!(
            "Done ! {} candles written to {}",
            outcome.dataset.len(),
            path.display()
        ),
        Err(e) => error!("could not write {}: {}", path.display(), e),
    }

    Ok(())
}

/// Sole owner of SIGINT. The first Ctrl-C skips a running delay; a Ctrl-C
/// outside a delay, or any later one, ends the process.
fn listen_for_interrupts(interrupt: Arc<Interrupt>) {
    tokio::spawn(async move {
        let mut skipped = false;
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for interrupts: {}", e);
                return;
            }
            if !skipped && interrupt.signal() {
                skipped = true;
                warn!("delay interrupted, press Ctrl-C again to stop");
                continue;
            }
            warn!("interrupted, exiting");
            std::process::exit(130);
        }
    });
}

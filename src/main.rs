use clap::Parser;
use small_harvest::config::cli::report_outcome;
use small_harvest::{CliArgs, EtlEngine, HarvestConfig, HarvestPipeline, LocalStorage};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    args.init_logging();

    tracing::info!("Starting small-harvest");

    let config = match args.load_config(HarvestConfig::builtin()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };
    if args.verbose {
        tracing::debug!("Harvest config: {:?}", config);
    }

    let monitor_enabled = args.monitoring_enabled(&config);

    // Ctrl-C stops the page walk between requests; what was fetched is still written.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🔶 Interrupt received, finishing after the current page");
            on_interrupt.cancel();
        }
    });

    let pipeline = HarvestPipeline::new(LocalStorage::default(), config)?.with_cancellation(cancel);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let exit_code = report_outcome(engine.run().await);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

use clap::Parser;
use small_harvest::config::cli::report_outcome;
use small_harvest::{CliArgs, EtlEngine, FlattenConfig, FlattenPipeline, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    args.init_logging();

    tracing::info!("Starting nested JSON flattening");

    let config = match args.load_config(FlattenConfig::default()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let monitor_enabled = args.monitoring_enabled(&config);
    let pipeline = FlattenPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let exit_code = report_outcome(engine.run().await);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

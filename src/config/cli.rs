use crate::config::toml_config::TomlFile;
use crate::utils::error::Result;
use crate::utils::logger;
use clap::Parser;
use std::path::PathBuf;

/// Flags shared by every binary. With no flags, the built-in pipeline runs.
#[derive(Debug, Clone, Parser)]
pub struct CliArgs {
    /// Optional TOML file overriding the built-in pipeline settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log CPU and memory usage between phases
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CliArgs {
    pub fn init_logging(&self) {
        if self.json_logs {
            logger::init_json_logger(self.verbose);
        } else {
            logger::init_cli_logger(self.verbose);
        }
    }

    /// The configuration from `--config`, or `builtin` when none was given,
    /// validated either way.
    pub fn load_config<T: TomlFile>(&self, builtin: T) -> Result<T> {
        let config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                T::from_file(path)?
            }
            None => builtin,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn monitoring_enabled<T: TomlFile>(&self, config: &T) -> bool {
        self.monitor || config.monitoring_enabled()
    }
}

/// Print the outcome of a run and return the process exit code.
pub fn report_outcome(result: Result<Option<String>>) -> i32 {
    match result {
        Ok(Some(output_path)) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            0
        }
        Ok(None) => {
            println!("🔶 Nothing to write: no records were extracted.");
            0
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::HarvestConfig;
    use crate::utils::error::EtlError;

    #[test]
    fn test_no_arguments_selects_builtin_pipeline() {
        let args = CliArgs::parse_from(["small-harvest"]);
        assert!(args.config.is_none());

        let config = args.load_config(HarvestConfig::builtin()).unwrap();
        assert_eq!(config.load.filename, "hh_data.csv");
        assert!(!args.monitoring_enabled(&config));
    }

    #[test]
    fn test_invalid_builtin_override_is_rejected() {
        let args = CliArgs::parse_from(["small-harvest", "--monitor"]);
        let mut config = HarvestConfig::builtin();
        config.source.endpoint = String::new();

        assert!(args.load_config(config.clone()).is_err());
        assert!(args.monitoring_enabled(&config));
    }

    #[test]
    fn test_report_outcome_exit_codes() {
        assert_eq!(report_outcome(Ok(Some("out.csv".to_string()))), 0);
        assert_eq!(report_outcome(Ok(None)), 0);
        let err = EtlError::ProcessingError {
            message: "boom".to_string(),
        };
        assert_ne!(report_outcome(Err(err)), 0);
    }
}

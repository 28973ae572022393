pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{LocalStorage, PageFetcher, TabularSink};
pub use app::pipelines::{CleaningPipeline, FlattenPipeline, HarvestPipeline};
pub use config::toml_config::{CleaningConfig, FlattenConfig, HarvestConfig, TomlFile};
pub use core::{etl::EtlEngine, HarvestOutcome, HarvestStop, ResultAccumulator};
pub use domain::services::{CustomerCleaner, RecordProjector, TreeFlattener};
pub use utils::error::{EtlError, Result};

use crate::adapters::TabularSink;
use crate::config::toml_config::FlattenConfig;
use crate::core::{Pipeline, RawRecord, Storage, Table};
use crate::domain::services::TreeFlattener;
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

/// JSON document of nested records → one row per leaf → delimited file.
pub struct FlattenPipeline<S: Storage> {
    storage: S,
    config: FlattenConfig,
    flattener: TreeFlattener,
    sink: TabularSink,
}

impl<S: Storage> FlattenPipeline<S> {
    pub fn new(storage: S, config: FlattenConfig) -> Self {
        let settings = &config.flatten;
        let mut flattener = TreeFlattener::new(settings.record_path.iter().cloned(), &settings.meta);
        if let Some(prefix) = &settings.record_prefix {
            flattener = flattener.with_record_prefix(prefix.clone());
        }
        if let Some(prefix) = &settings.meta_prefix {
            flattener = flattener.with_meta_prefix(prefix);
        }
        let sink = TabularSink::new(config.load.clone());

        Self {
            storage,
            config,
            flattener,
            sink,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for FlattenPipeline<S> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        tracing::info!("📂 Reading {}", self.config.input.path);
        let bytes = self.storage.read_file(&self.config.input.path).await?;

        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Array(documents) => {
                tracing::info!("📂 Loaded {} top-level records", documents.len());
                Ok(documents)
            }
            other => Err(EtlError::ValidationError {
                message: format!(
                    "{}: expected a JSON array of records at the top level, found {}",
                    self.config.input.path,
                    if other.is_object() { "an object" } else { "a scalar" }
                ),
            }),
        }
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<Table> {
        tracing::info!(
            "🔄 Expanding along {} with {} meta field(s)",
            self.flattener.record_path().join(" → "),
            self.config.flatten.meta.len()
        );
        self.flattener.to_table(&data)
    }

    async fn load(&self, table: Table) -> Result<String> {
        self.sink.write(&self.storage, &table).await
    }
}

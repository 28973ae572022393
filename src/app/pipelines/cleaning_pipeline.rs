use crate::adapters::TabularSink;
use crate::config::toml_config::CleaningConfig;
use crate::core::{Pipeline, RawRecord, Record, Storage, Table};
use crate::domain::services::CustomerCleaner;
use crate::utils::error::Result;
use serde_json::{Map, Value};

/// Customer CSV → normalized CSV.
pub struct CleaningPipeline<S: Storage> {
    storage: S,
    config: CleaningConfig,
    cleaner: CustomerCleaner,
    sink: TabularSink,
}

impl<S: Storage> CleaningPipeline<S> {
    pub fn new(storage: S, config: CleaningConfig) -> Self {
        let cleaner = CustomerCleaner::new(config.clean.clone());
        let sink = TabularSink::new(config.load.clone());
        Self {
            storage,
            config,
            cleaner,
            sink,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for CleaningPipeline<S> {
    /// Each CSV line becomes a mapping of header to text, in header order.
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        tracing::info!("📂 Loading {}", self.config.input.path);
        let bytes = self.storage.read_file(&self.config.input.path).await?;

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let data: Map<String, Value> = headers
                .iter()
                .zip(row.iter())
                .map(|(header, field)| (header.to_string(), Value::String(field.to_string())))
                .collect();
            records.push(Value::Object(data));
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<Table> {
        let rows = data
            .into_iter()
            .filter_map(|record| match record {
                Value::Object(data) => Some(Record::new(data)),
                _ => None,
            })
            .collect();

        let table = self.cleaner.clean(Table::from_records(rows));
        tracing::info!("🧹 Cleaned table: {} rows x {} columns", table.len(), table.columns.len());
        Ok(table)
    }

    async fn load(&self, table: Table) -> Result<String> {
        self.sink.write(&self.storage, &table).await
    }
}

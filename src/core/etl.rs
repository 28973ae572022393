use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Run extract, transform and load.
    ///
    /// Returns `Ok(None)` without writing anything when extraction produced no
    /// records.
    pub async fn run(&self) -> Result<Option<String>> {
        tracing::info!("🚀 Starting ETL process...");

        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", raw_data.len());
        self.monitor.log_stats("Extract");

        if raw_data.is_empty() {
            tracing::warn!("🔶 Nothing was extracted, check the source settings. No output written.");
            self.monitor.log_final_stats();
            return Ok(None);
        }

        let table = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "🔄 Transformed into {} rows x {} columns",
            table.len(),
            table.columns.len()
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(table).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(Some(output_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RawRecord, Record, Table};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPipeline {
        records: Vec<RawRecord>,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<RawRecord>> {
            Ok(self.records.clone())
        }

        async fn transform(&self, data: Vec<RawRecord>) -> Result<Table> {
            let rows = data
                .into_iter()
                .filter_map(|v| v.as_object().cloned())
                .map(Record::new)
                .collect();
            Ok(Table::from_records(rows))
        }

        async fn load(&self, _table: Table) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok("out/data.csv".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_loads_extracted_records() {
        let engine = EtlEngine::new(StubPipeline {
            records: vec![json!({"id": 1})],
            loads: AtomicUsize::new(0),
        });

        let output = engine.run().await.unwrap();

        assert_eq!(output.as_deref(), Some("out/data.csv"));
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_skips_load_when_nothing_extracted() {
        let engine = EtlEngine::new(StubPipeline {
            records: Vec::new(),
            loads: AtomicUsize::new(0),
        });

        let output = engine.run().await.unwrap();

        assert!(output.is_none());
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 0);
    }
}

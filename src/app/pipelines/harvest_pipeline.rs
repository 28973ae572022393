use crate::adapters::{PageFetcher, TabularSink};
use crate::config::toml_config::HarvestConfig;
use crate::core::{PageSource, Pipeline, RawRecord, ResultAccumulator, Storage, Table};
use crate::domain::services::RecordProjector;
use crate::utils::error::Result;
use tokio_util::sync::CancellationToken;

/// Paginated API → projected table → delimited file.
pub struct HarvestPipeline<S: Storage, F: PageSource> {
    storage: S,
    config: HarvestConfig,
    accumulator: ResultAccumulator<F>,
    projector: RecordProjector,
    sink: TabularSink,
}

impl<S: Storage> HarvestPipeline<S, PageFetcher> {
    pub fn new(storage: S, config: HarvestConfig) -> Result<Self> {
        let fetcher = PageFetcher::new(config.source.clone(), config.harvest.page_size)?;
        Ok(Self::with_source(storage, config, fetcher))
    }
}

impl<S: Storage, F: PageSource> HarvestPipeline<S, F> {
    pub fn with_source(storage: S, config: HarvestConfig, fetcher: F) -> Self {
        let accumulator =
            ResultAccumulator::new(fetcher, config.harvest.page_size, config.harvest.pacing());
        let projector = RecordProjector::new(config.project.fields.iter().cloned());
        let sink = TabularSink::new(config.load.clone());

        Self {
            storage,
            config,
            accumulator,
            projector,
            sink,
        }
    }

    /// Stop the page walk early when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.accumulator = self.accumulator.with_cancellation(cancel);
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: PageSource> Pipeline for HarvestPipeline<S, F> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        tracing::info!(
            "🚀 {}: harvesting from {}",
            self.config.pipeline.name,
            self.config.source.endpoint
        );

        let outcome = self.accumulator.harvest(self.config.harvest.max_pages).await;
        tracing::info!(
            "📊 {}: {} records from {} page request(s), stopped: {:?}",
            self.config.pipeline.name,
            outcome.records.len(),
            outcome.pages_fetched,
            outcome.stop
        );

        Ok(outcome.records)
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<Table> {
        Ok(self.projector.project(data))
    }

    async fn load(&self, table: Table) -> Result<String> {
        self.sink.write(&self.storage, &table).await
    }
}

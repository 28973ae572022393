use crate::domain::model::{Page, RawRecord, Table};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// A paginated provider. Implementations never fail: a page that could not be
/// retrieved comes back empty.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, page_index: u32) -> Page;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRecord>>;
    async fn transform(&self, data: Vec<RawRecord>) -> Result<Table>;
    async fn load(&self, table: Table) -> Result<String>;
}

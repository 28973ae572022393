use crate::config::toml_config::SourceConfig;
use crate::domain::model::Page;
use crate::domain::ports::PageSource;
use crate::utils::error::Result;
use crate::utils::validation;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;

/// Fetches single result pages from the provider.
///
/// Every failure (transport, timeout, non-2xx status, unreadable body) is
/// logged and turned into an empty page, so the accumulator sees it exactly
/// like the end of the result set. There is no retry here.
pub struct PageFetcher {
    source: SourceConfig,
    page_size: usize,
    client: Client,
}

impl PageFetcher {
    /// Malformed headers are rejected here rather than on every request.
    pub fn new(source: SourceConfig, page_size: usize) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &source.headers {
            let (name, value) = validation::parse_header("source.headers", name, value)?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(source.timeout())
            .default_headers(headers)
            .build()?;
        Ok(Self {
            source,
            page_size,
            client,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    async fn try_fetch(&self, page_index: u32) -> Result<Page> {
        let page = page_index.to_string();
        let per_page = self.page_size.to_string();
        let request = self
            .client
            .get(&self.source.endpoint)
            .query(&self.source.parameters)
            .query(&[
                (self.source.page_param.as_str(), page.as_str()),
                (self.source.page_size_param.as_str(), per_page.as_str()),
            ]);

        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        let body: Value = response.error_for_status()?.json().await?;
        Ok(self.parse_page(page_index, body))
    }

    /// Pull the result list (and optional total) out of a response body.
    /// A missing or non-list result key means an empty page.
    pub fn parse_page(&self, page_index: u32, mut body: Value) -> Page {
        let total_found = self
            .source
            .total_key
            .as_ref()
            .and_then(|key| body.get(key))
            .and_then(Value::as_u64);

        let records = match body.get_mut(&self.source.results_key).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                tracing::warn!(
                    "🔶 Page {}: '{}' is not a list ({}), treating page as empty",
                    page_index,
                    self.source.results_key,
                    type_name(&other)
                );
                Vec::new()
            }
            None => Vec::new(),
        };

        Page {
            index: page_index,
            records,
            total_found,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, page_index: u32) -> Page {
        tracing::debug!("Making API request to: {} (page {})", self.source.endpoint, page_index);

        match self.try_fetch(page_index).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("❌ Page {} request failed: {}", page_index, e);
                Page::empty(page_index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn source(endpoint: String) -> SourceConfig {
        SourceConfig {
            endpoint,
            timeout_seconds: 5,
            headers: BTreeMap::from([("User-Agent".to_string(), "small-harvest-test/0.1".to_string())]),
            parameters: BTreeMap::from([("area".to_string(), "40".to_string())]),
            ..SourceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_filter_paging_and_header() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/vacancies")
                .query_param("area", "40")
                .query_param("page", "3")
                .query_param("per_page", "2")
                .header("User-Agent", "small-harvest-test/0.1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"items": [{"id": "1"}, {"id": "2"}], "found": 8}));
        });

        let fetcher = PageFetcher::new(source(server.url("/vacancies")), 2).unwrap();
        let page = fetcher.fetch(3).await;

        api_mock.assert();
        assert_eq!(page.index, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(page.records[1]["id"], json!("2"));
        // No total key configured: the count is ignored.
        assert_eq!(page.total_found, None);
    }

    #[tokio::test]
    async fn test_fetch_reads_total_when_configured() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/vacancies");
            then.status(200).json_body(json!({"items": [{"id": "1"}], "found": 41}));
        });

        let config = SourceConfig {
            total_key: Some("found".to_string()),
            ..source(server.url("/vacancies"))
        };
        let page = PageFetcher::new(config, 10).unwrap().fetch(0).await;

        assert_eq!(page.total_found, Some(41));
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_empty_page() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/vacancies");
            then.status(500);
        });

        let fetcher = PageFetcher::new(source(server.url("/vacancies")), 10).unwrap();
        let page = fetcher.fetch(0).await;

        api_mock.assert();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_degrades_to_empty_page() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/vacancies");
            then.status(200).body("<html>not json</html>");
        });

        let fetcher = PageFetcher::new(source(server.url("/vacancies")), 10).unwrap();
        assert!(fetcher.fetch(0).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades_to_empty_page() {
        let fetcher = PageFetcher::new(source("http://127.0.0.1:9/vacancies".to_string()), 10).unwrap();
        assert!(fetcher.fetch(0).await.is_empty());
    }

    #[test]
    fn test_malformed_header_is_rejected_at_construction() {
        let mut config = source("http://localhost/vacancies".to_string());
        config
            .headers
            .insert("User Agent".to_string(), "x".to_string());

        let result = PageFetcher::new(config, 10);
        assert!(matches!(
            result,
            Err(crate::utils::error::EtlError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_parse_page_without_results_key() {
        let fetcher = PageFetcher::new(source("http://localhost/x".to_string()), 10).unwrap();

        assert!(fetcher.parse_page(0, json!({"errors": []})).is_empty());
        assert!(fetcher.parse_page(0, json!({"items": "oops"})).is_empty());
        assert!(fetcher.parse_page(0, json!([1, 2, 3])).is_empty());
        assert_eq!(fetcher.parse_page(0, json!({"items": [1, 2, 3]})).len(), 3);
    }
}

use crate::domain::model::RawRecord;
use crate::domain::ports::PageSource;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Why the page walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestStop {
    /// A page came back empty (exhausted, or the fetch soft-failed).
    Empty,
    /// A page held fewer records than the page size.
    Short,
    /// The provider's total count was reached.
    TotalReached,
    /// The highest allowed page index was fetched.
    Limit,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    pub records: Vec<RawRecord>,
    pub pages_fetched: u32,
    pub stop: HarvestStop,
}

/// Walks pages `0, 1, 2, ...` one at a time and concatenates their records.
///
/// Stops on an empty page, on a short page (a heuristic: without a total
/// count a short page is assumed to be the last), when the provider's total
/// is reached, after page `max_pages`, or on cancellation. A full final page
/// therefore costs one extra, empty request. Between pages it sleeps for a
/// fixed interval.
pub struct ResultAccumulator<F: PageSource> {
    fetcher: F,
    page_size: usize,
    pacing: Duration,
    cancel: CancellationToken,
}

impl<F: PageSource> ResultAccumulator<F> {
    pub fn new(fetcher: F, page_size: usize, pacing: Duration) -> Self {
        Self {
            fetcher,
            page_size,
            pacing,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn harvest(&self, max_pages: u32) -> HarvestOutcome {
        let mut records: Vec<RawRecord> = Vec::new();
        let mut page_index: u32 = 0;
        let mut pages_fetched: u32 = 0;

        let stop = loop {
            if self.cancel.is_cancelled() {
                break HarvestStop::Cancelled;
            }

            tracing::info!("📡 Requesting page {}...", page_index);
            let page = self.fetcher.fetch(page_index).await;
            pages_fetched += 1;

            if page.is_empty() {
                tracing::info!("Empty page, stopping.");
                break HarvestStop::Empty;
            }

            let count = page.len();
            let total_found = page.total_found;
            records.extend(page.records);
            tracing::info!(
                "📥 Received {} records, {} accumulated",
                count,
                records.len()
            );

            match total_found {
                Some(total) if records.len() as u64 >= total => {
                    tracing::info!("Reached the provider's total of {} records.", total);
                    break HarvestStop::TotalReached;
                }
                Some(_) => {}
                None if count < self.page_size => {
                    tracing::info!("Short page, this looks like the last one.");
                    break HarvestStop::Short;
                }
                None => {}
            }

            page_index += 1;
            if page_index > max_pages {
                tracing::info!("Page limit {} reached.", max_pages);
                break HarvestStop::Limit;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break HarvestStop::Cancelled,
                _ = tokio::time::sleep(self.pacing) => {}
            }
        };

        if stop == HarvestStop::Cancelled {
            tracing::warn!(
                "🔶 Harvest cancelled after {} page(s), keeping {} records",
                pages_fetched,
                records.len()
            );
        }

        HarvestOutcome {
            records,
            pages_fetched,
            stop,
        }
    }
}

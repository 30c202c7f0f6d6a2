//! Crawl loop: read pagination, extract, dedup, decide, navigate.
//!
//! One crawl runs at a time and every step is sequential: page N is extracted
//! and merged before navigation to page N+1 starts. Cancellation is checked
//! only at the top of each iteration.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use scraper::Html;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use super::accumulator::ReviewAccumulator;
use super::state::{CrawlReport, CrawlState, StopReason};
use crate::domain::{CrawlConfig, PaginationState, ReviewRecord};
use crate::infrastructure::change_waiter::ChangeWaiter;
use crate::infrastructure::config::TimingConfig;
use crate::infrastructure::csv_encoder::encode_reviews;
use crate::infrastructure::download::{Exporter, SaveOutcome};
use crate::infrastructure::host_page::HostPage;
use crate::infrastructure::navigator::Navigator;
use crate::infrastructure::notifier::{Notification, Notifier};
use crate::infrastructure::parsing::{
    CompiledSelectors, ContextualParser, PaginationParser, ParsingConfig, ParsingResult,
    ReviewParseContext, ReviewParser,
};

/// Records collected by one run, before export.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub records: Vec<ReviewRecord>,
    pub pages_visited: u32,
    pub stop_reason: StopReason,
}

/// Uniform random delay in `[min_ms, max_ms]`.
pub fn jitter(min_ms: u64, max_ms: u64) -> Duration {
    if min_ms >= max_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(fastrand::u64(min_ms..=max_ms))
}

pub struct CrawlOrchestrator {
    page: Arc<dyn HostPage>,
    pagination: PaginationParser,
    reviews: ReviewParser,
    navigator: Navigator,
    timing: TimingConfig,
    state_tx: watch::Sender<CrawlState>,
}

impl CrawlOrchestrator {
    pub fn new(
        page: Arc<dyn HostPage>,
        parsing: &ParsingConfig,
        timing: TimingConfig,
    ) -> ParsingResult<Self> {
        let selectors = CompiledSelectors::compile(&parsing.selectors)?;
        let pagination = PaginationParser::new(selectors.clone());
        let navigator = Navigator::new(
            pagination.clone(),
            selectors.next_control.clone(),
            ChangeWaiter::new(selectors.reviews_container.clone(), timing.change_timeout()),
            timing.settle_delay(),
        );
        let (state_tx, _) = watch::channel(CrawlState::Running);

        Ok(Self {
            page,
            reviews: ReviewParser::with_selectors(&selectors, parsing),
            pagination,
            navigator,
            timing,
            state_tx,
        })
    }

    /// Live view of the state machine.
    pub fn state(&self) -> watch::Receiver<CrawlState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: CrawlState) {
        self.state_tx.send_replace(state);
    }

    /// Extract every rendered item and the pagination state of the same snapshot.
    fn extract(&self, with_images: bool) -> (Vec<ReviewRecord>, PaginationState) {
        let html = Html::parse_document(&self.page.markup());
        let context = ReviewParseContext::new(self.page.location(), with_images);
        let records = self.reviews.parse_with_context(&html, &context);
        (records, self.pagination.read(&html))
    }

    /// Crawl until a stop condition holds, returning everything collected.
    pub async fn run(&self, config: &CrawlConfig, cancel: &CancellationToken) -> CrawlOutcome {
        let mut accumulator = ReviewAccumulator::new();
        let mut pages_visited: u32 = 0;
        self.set_state(CrawlState::Running);

        let stop_reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Aborted;
            }

            self.set_state(CrawlState::Extracting);
            pages_visited += 1;

            tokio::time::sleep(jitter(
                self.timing.pre_extract_delay_min_ms,
                self.timing.pre_extract_delay_max_ms,
            ))
            .await;

            let (records, state) = self.extract(config.with_images);
            info!(
                "Scraping page {} of ~{}",
                state.current_page.unwrap_or(pages_visited),
                state
                    .total_pages
                    .map_or_else(|| "?".to_string(), |total| total.to_string())
            );
            let found = records.len();
            let added = accumulator.extend(records);
            debug!(
                "Page {}: {} items, {} new, {} total",
                pages_visited,
                found,
                added,
                accumulator.len()
            );

            if state.on_last_visible_page() {
                break StopReason::LastPageReached;
            }
            if state.next_disabled {
                break StopReason::NextDisabled;
            }
            if config.page_cap_reached(pages_visited) {
                break StopReason::MaxPagesReached;
            }

            self.set_state(CrawlState::Navigating);
            tokio::time::sleep(jitter(config.delay_min_ms, config.delay_max_ms)).await;
            if !self.navigator.advance(self.page.as_ref()).await {
                break StopReason::NavigationFailed;
            }
            self.set_state(CrawlState::Running);
        };

        self.set_state(CrawlState::Stopped(stop_reason));
        info!(
            "Crawl stopped ({}): {} reviews from {} pages",
            stop_reason,
            accumulator.len(),
            pages_visited
        );

        CrawlOutcome {
            records: accumulator.into_records(),
            pages_visited,
            stop_reason,
        }
    }

    /// Crawl, encode, hand off to the exporter and notify the user.
    pub async fn run_and_export(
        &self,
        config: &CrawlConfig,
        cancel: &CancellationToken,
        exporter: &Exporter,
        notifier: &dyn Notifier,
    ) -> CrawlReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("crawl", %run_id);

        async move {
            let started_at = Utc::now();
            let outcome = self.run(config, cancel).await;

            let save = match encode_reviews(&outcome.records) {
                Ok(encoded) => exporter.export(&encoded).await,
                Err(e) => {
                    error!("Failed to encode {} reviews: {}", outcome.records.len(), e);
                    SaveOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            match &save {
                SaveOutcome::Saved => notifier.notify(Notification::Saved { fallback: false }),
                SaveOutcome::SavedWithFallback { .. } => {
                    notifier.notify(Notification::Saved { fallback: true });
                }
                SaveOutcome::Failed { reason } => notifier.notify(Notification::SaveFailed {
                    reason: reason.clone(),
                }),
            }
            notifier.notify(Notification::Completed {
                records: outcome.records.len(),
                pages: outcome.pages_visited,
            });

            let report = CrawlReport {
                run_id,
                records: outcome.records.len(),
                pages_visited: outcome.pages_visited,
                stop_reason: outcome.stop_reason,
                save,
                started_at,
                finished_at: Utc::now(),
            };
            info!("Run finished in {} ms", report.elapsed().num_milliseconds());
            report
        }
        .instrument(span)
        .await
    }
}

//! Page advancement with change confirmation.

use std::time::Duration;

use scraper::Html;
use tracing::{debug, info};

use super::change_waiter::ChangeWaiter;
use super::host_page::HostPage;
use super::parsing::{PaginationParser, SelectorSet};

/// A navigation counts only when the container changed and the page number
/// did not stay put. Unknown page numbers on either side cannot contradict a
/// change.
pub fn navigation_confirmed(changed: bool, before: Option<u32>, after: Option<u32>) -> bool {
    changed
        && match (before, after) {
            (Some(before), Some(after)) => before != after,
            _ => true,
        }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    pagination: PaginationParser,
    next_control: SelectorSet,
    waiter: ChangeWaiter,
    settle_delay: Duration,
}

/// What the navigator needs from the pre-click snapshot.
struct Departure {
    current_page: Option<u32>,
    next_selector: Option<String>,
}

impl Navigator {
    pub fn new(
        pagination: PaginationParser,
        next_control: SelectorSet,
        waiter: ChangeWaiter,
        settle_delay: Duration,
    ) -> Self {
        Self {
            pagination,
            next_control,
            waiter,
            settle_delay,
        }
    }

    /// Click "next" and confirm that a different page rendered.
    ///
    /// Returns `false` without clicking when the next control is missing or
    /// disabled.
    pub async fn advance(&self, page: &dyn HostPage) -> bool {
        let Some(departure) = self.depart(&page.markup()) else {
            debug!("Next control disabled; not clicking");
            return false;
        };
        let Some(selector) = departure.next_selector else {
            return false;
        };

        let pending = self.waiter.arm(page);
        if !page.click(&selector).await {
            debug!("Next control '{}' vanished before the click", selector);
            return false;
        }
        let changed = match pending {
            Some(pending) => pending.wait().await,
            None => false,
        };
        tokio::time::sleep(self.settle_delay).await;

        let arrived = self.current_page(&page.markup());
        let confirmed = navigation_confirmed(changed, departure.current_page, arrived);
        if confirmed {
            info!("Advanced from page {:?} to {:?}", departure.current_page, arrived);
        } else {
            debug!(
                "Navigation not confirmed: changed={} before={:?} after={:?}",
                changed, departure.current_page, arrived
            );
        }
        confirmed
    }

    fn depart(&self, markup: &str) -> Option<Departure> {
        let html = Html::parse_document(markup);
        let state = self.pagination.read(&html);
        if state.next_disabled {
            return None;
        }
        Some(Departure {
            current_page: state.current_page,
            next_selector: self.next_control.matching_source(&html).map(str::to_string),
        })
    }

    fn current_page(&self, markup: &str) -> Option<u32> {
        self.pagination.read(&Html::parse_document(markup)).current_page
    }
}

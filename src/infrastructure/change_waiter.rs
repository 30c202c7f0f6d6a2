//! Wait for the reviews container to change, or give up at a deadline.

use std::time::Duration;

use scraper::Html;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{debug, trace};

use super::host_page::HostPage;
use super::parsing::SelectorSet;

/// Resolves `true` on the first content change of a container, `false` on
/// timeout. A timeout is a normal outcome, not an error.
#[derive(Debug, Clone)]
pub struct ChangeWaiter {
    container: SelectorSet,
    timeout: Duration,
}

/// Observation started before the triggering action.
pub struct PendingChange<'a> {
    page: &'a dyn HostPage,
    container: &'a SelectorSet,
    changes: watch::Receiver<u64>,
    baseline: String,
    deadline: Instant,
}

fn container_markup(container: &SelectorSet, markup: &str) -> Option<String> {
    let html = Html::parse_document(markup);
    container.first_in_document(&html).map(|el| el.inner_html())
}

impl ChangeWaiter {
    pub fn new(container: SelectorSet, timeout: Duration) -> Self {
        Self { container, timeout }
    }

    /// Start observing. `None` when the container is not rendered.
    ///
    /// Arm before triggering the change so a fast re-render is not missed.
    pub fn arm<'a>(&'a self, page: &'a dyn HostPage) -> Option<PendingChange<'a>> {
        let changes = page.subscribe();
        let Some(baseline) = container_markup(&self.container, &page.markup()) else {
            debug!("No {} element to observe", self.container.role());
            return None;
        };
        Some(PendingChange {
            page,
            container: &self.container,
            changes,
            baseline,
            deadline: Instant::now() + self.timeout,
        })
    }
}

impl PendingChange<'_> {
    pub async fn wait(mut self) -> bool {
        loop {
            match timeout_at(self.deadline, self.changes.changed()).await {
                Ok(Ok(())) => {
                    let current = container_markup(self.container, &self.page.markup());
                    // A removed container counts as changed.
                    if current.as_deref() != Some(self.baseline.as_str()) {
                        trace!("Container changed");
                        return true;
                    }
                }
                Ok(Err(_)) => {
                    // The page stopped reporting mutations; nothing can change.
                    sleep_until(self.deadline).await;
                    return false;
                }
                Err(_) => {
                    debug!("No change observed within the timeout");
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::host_page::SnapshotPage;
    use url::Url;

    const BEFORE: &str = r#"<div class="mod-reviews"><p>a</p></div>"#;
    const AFTER: &str = r#"<div class="mod-reviews"><p>b</p></div>"#;

    fn waiter(timeout_ms: u64) -> ChangeWaiter {
        ChangeWaiter::new(
            SelectorSet::compile("reviews_container", &[".mod-reviews".to_string()]).unwrap(),
            Duration::from_millis(timeout_ms),
        )
    }

    fn page(markup: &str) -> SnapshotPage {
        SnapshotPage::new(Url::parse("https://shop.example/").unwrap(), vec![markup.to_string()])
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_false_at_timeout() {
        let page = page(BEFORE);
        let waiter = waiter(8000);
        let pending = waiter.arm(&page).unwrap();
        let started = Instant::now();
        assert!(!pending.wait().await);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(8000));
        assert!(elapsed < Duration::from_millis(8100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_true_on_change() {
        let page = page(BEFORE);
        let waiter = waiter(8000);
        let pending = waiter.arm(&page).unwrap();

        let injector = page.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            injector.replace_markup(AFTER);
        });

        let started = Instant::now();
        assert!(pending.wait().await);
        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_rerender_is_not_a_change() {
        let page = page(BEFORE);
        let waiter = waiter(2000);
        let pending = waiter.arm(&page).unwrap();
        page.replace_markup(format!("{BEFORE}<footer>elsewhere</footer>"));
        assert!(!pending.wait().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_container_cannot_be_armed() {
        let page = page("<p>nothing here</p>");
        assert!(waiter(8000).arm(&page).is_none());
    }
}

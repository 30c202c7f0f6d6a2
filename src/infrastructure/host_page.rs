//! The rendered page the engine reads and drives.
//!
//! [`HostPage`] is implemented by whatever embeds the engine. [`SnapshotPage`]
//! is an in-memory host over saved page snapshots, used for offline replay
//! and tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tokio::sync::watch;
use tracing::{debug, trace};
use url::Url;

/// A live, asynchronously mutating document.
#[async_trait]
pub trait HostPage: Send + Sync {
    /// The page's own location.
    fn location(&self) -> Url;

    /// The currently rendered document.
    fn markup(&self) -> String;

    /// Structural mutation counter; bumped on every change to the document.
    fn subscribe(&self) -> watch::Receiver<u64>;

    /// Click the first element matching `selector`. Returns whether one was found.
    async fn click(&self, selector: &str) -> bool;
}

/// What a click on a [`SnapshotPage`] does once the render latency elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Render the next snapshot.
    Advance,
    /// Nothing happens.
    Stall,
    /// Replace the document without moving to another snapshot.
    Mutate(String),
}

#[derive(Debug)]
struct SnapshotState {
    snapshots: Vec<String>,
    index: usize,
    markup: String,
    clicks: usize,
    scripted: VecDeque<ClickOutcome>,
}

/// In-memory host over an ordered list of rendered snapshots.
///
/// Clicks consume scripted outcomes first and default to
/// [`ClickOutcome::Advance`]. Advancing past the last snapshot is a stall.
#[derive(Clone)]
pub struct SnapshotPage {
    location: Url,
    render_latency: Duration,
    state: Arc<Mutex<SnapshotState>>,
    mutations: Arc<watch::Sender<u64>>,
}

impl SnapshotPage {
    pub fn new(location: Url, snapshots: Vec<String>) -> Self {
        let markup = snapshots.first().cloned().unwrap_or_default();
        let (mutations, _) = watch::channel(0);
        Self {
            location,
            render_latency: Duration::ZERO,
            state: Arc::new(Mutex::new(SnapshotState {
                snapshots,
                index: 0,
                markup,
                clicks: 0,
                scripted: VecDeque::new(),
            })),
            mutations: Arc::new(mutations),
        }
    }

    /// Delay between a click and the resulting re-render.
    #[must_use]
    pub fn with_render_latency(mut self, latency: Duration) -> Self {
        self.render_latency = latency;
        self
    }

    /// Outcomes for the next clicks, in order.
    #[must_use]
    pub fn with_click_outcomes(self, outcomes: impl IntoIterator<Item = ClickOutcome>) -> Self {
        self.lock().scripted.extend(outcomes);
        self
    }

    /// Index of the snapshot currently rendered.
    pub fn current_index(&self) -> usize {
        self.lock().index
    }

    pub fn click_count(&self) -> usize {
        self.lock().clicks
    }

    /// Replace the document immediately, as a script on the page would.
    pub fn replace_markup(&self, markup: impl Into<String>) {
        self.lock().markup = markup.into();
        self.bump();
    }

    fn lock(&self) -> MutexGuard<'_, SnapshotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.mutations.send_modify(|count| *count += 1);
    }

    fn apply(&self, outcome: ClickOutcome) {
        let changed = {
            let mut state = self.lock();
            match outcome {
                ClickOutcome::Advance if state.index + 1 < state.snapshots.len() => {
                    state.index += 1;
                    state.markup = state.snapshots[state.index].clone();
                    true
                }
                ClickOutcome::Advance | ClickOutcome::Stall => false,
                ClickOutcome::Mutate(markup) => {
                    state.markup = markup;
                    true
                }
            }
        };
        if changed {
            self.bump();
        }
    }
}

fn document_matches(markup: &str, selector: &str) -> bool {
    let Ok(selector) = Selector::parse(selector) else {
        return false;
    };
    Html::parse_document(markup).select(&selector).next().is_some()
}

#[async_trait]
impl HostPage for SnapshotPage {
    fn location(&self) -> Url {
        self.location.clone()
    }

    fn markup(&self) -> String {
        self.lock().markup.clone()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.mutations.subscribe()
    }

    async fn click(&self, selector: &str) -> bool {
        let outcome = {
            let mut state = self.lock();
            if !document_matches(&state.markup, selector) {
                return false;
            }
            state.clicks += 1;
            state.scripted.pop_front().unwrap_or(ClickOutcome::Advance)
        };
        trace!("Click on '{}' scheduled {:?}", selector, outcome);

        let page = self.clone();
        let latency = self.render_latency;
        tokio::spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            page.apply(outcome);
        });
        true
    }
}

/// Read every `*.html` file in `dir`, ordered by file name.
pub async fn load_snapshots(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read snapshot directory {}", dir.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("html")) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut snapshots = Vec::with_capacity(paths.len());
    for path in &paths {
        let markup = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        snapshots.push(markup);
    }
    debug!("Loaded {} snapshots from {}", snapshots.len(), dir.display());
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(snapshots: &[&str]) -> SnapshotPage {
        SnapshotPage::new(
            Url::parse("https://shop.example/p.html").unwrap(),
            snapshots.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_advances_after_latency() {
        let page = page(&["<a id=n>1</a>", "<a id=n>2</a>"])
            .with_render_latency(Duration::from_millis(300));
        let mut changes = page.subscribe();

        assert!(page.click("#n").await);
        assert_eq!(page.current_index(), 0);

        changes.changed().await.unwrap();
        assert_eq!(page.current_index(), 1);
        assert!(page.markup().contains('2'));
        assert_eq!(page.click_count(), 1);
    }

    #[tokio::test]
    async fn test_click_without_target() {
        let page = page(&["<p>no links</p>"]);
        assert!(!page.click("#n").await);
        assert!(!page.click("[[bad").await);
        assert_eq!(page.click_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_outcomes() {
        let page = page(&["<a id=n>1</a>", "<a id=n>2</a>"])
            .with_click_outcomes([ClickOutcome::Stall, ClickOutcome::Mutate("<a id=n>ad</a>".into())]);
        let changes = page.subscribe();

        page.click("#n").await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!changes.has_changed().unwrap());

        page.click("#n").await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(changes.has_changed().unwrap());
        assert_eq!(page.current_index(), 0);
        assert!(page.markup().contains("ad"));
    }

    #[tokio::test]
    async fn test_load_snapshots_sorted() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("02.html"), "two").await.unwrap();
        tokio::fs::write(dir.path().join("01.html"), "one").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "skip").await.unwrap();

        let snapshots = load_snapshots(dir.path()).await.unwrap();
        assert_eq!(snapshots, vec!["one".to_string(), "two".to_string()]);
    }
}

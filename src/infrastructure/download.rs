//! Export hand-off: a possibly slow download sink with a synchronous fallback.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::config::{OutputConfig, TimingConfig};

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download rejected: {0}")]
    Rejected(String),
}

/// The platform's download mechanism. May be slow or never answer.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn save(&self, filename: &str, contents: &str) -> Result<(), DownloadError>;
}

/// Synchronous last-resort save path.
pub trait FallbackSaver: Send + Sync {
    fn save(&self, filename: &str, contents: &str) -> Result<PathBuf, DownloadError>;
}

/// Writes the export into a directory asynchronously.
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    directory: PathBuf,
}

impl FileDownloadSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl DownloadSink for FileDownloadSink {
    async fn save(&self, filename: &str, contents: &str) -> Result<(), DownloadError> {
        let path = self.directory.join(filename);
        let io_error = |source| DownloadError::Io {
            path: path.clone(),
            source,
        };
        tokio::fs::create_dir_all(&self.directory).await.map_err(io_error)?;
        tokio::fs::write(&path, contents).await.map_err(io_error)?;
        info!("Export written to {}", path.display());
        Ok(())
    }
}

/// Blocking write into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    directory: PathBuf,
}

impl DirectorySaver {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl FallbackSaver for DirectorySaver {
    fn save(&self, filename: &str, contents: &str) -> Result<PathBuf, DownloadError> {
        let path = self.directory.join(filename);
        std::fs::create_dir_all(&self.directory)
            .and_then(|()| std::fs::write(&path, contents))
            .map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    SavedWithFallback { reason: String },
    Failed { reason: String },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Hands the encoded export to the sink, falling back when the sink fails or
/// does not acknowledge in time.
#[derive(Clone)]
pub struct Exporter {
    sink: Arc<dyn DownloadSink>,
    fallback: Arc<dyn FallbackSaver>,
    filename: String,
    ack_timeout: Duration,
}

impl Exporter {
    pub fn new(
        sink: Arc<dyn DownloadSink>,
        fallback: Arc<dyn FallbackSaver>,
        filename: impl Into<String>,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            sink,
            fallback,
            filename: filename.into(),
            ack_timeout,
        }
    }

    pub fn from_config(output: &OutputConfig, timing: &TimingConfig) -> Self {
        Self::new(
            Arc::new(FileDownloadSink::new(&output.directory)),
            Arc::new(DirectorySaver::new(&output.fallback_directory)),
            output.filename.clone(),
            timing.download_ack_timeout(),
        )
    }

    pub async fn export(&self, contents: &str) -> SaveOutcome {
        let reason = match tokio::time::timeout(
            self.ack_timeout,
            self.sink.save(&self.filename, contents),
        )
        .await
        {
            Ok(Ok(())) => return SaveOutcome::Saved,
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "no acknowledgement within {}ms",
                self.ack_timeout.as_millis()
            ),
        };

        warn!("Download sink failed ({}); using fallback save", reason);
        match self.fallback.save(&self.filename, contents) {
            Ok(path) => {
                info!("Export saved via fallback to {}", path.display());
                SaveOutcome::SavedWithFallback { reason }
            }
            Err(e) => SaveOutcome::Failed {
                reason: format!("{reason}; fallback failed: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct SlowSink;

    #[async_trait]
    impl DownloadSink for SlowSink {
        async fn save(&self, _filename: &str, _contents: &str) -> Result<(), DownloadError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    struct RejectingSink;

    #[async_trait]
    impl DownloadSink for RejectingSink {
        async fn save(&self, _filename: &str, _contents: &str) -> Result<(), DownloadError> {
            Err(DownloadError::Rejected("quota".into()))
        }
    }

    #[derive(Default)]
    struct RecordingSaver {
        saved: Mutex<Vec<String>>,
    }

    impl FallbackSaver for RecordingSaver {
        fn save(&self, filename: &str, _contents: &str) -> Result<PathBuf, DownloadError> {
            self.saved.lock().unwrap().push(filename.to_string());
            Ok(PathBuf::from(filename))
        }
    }

    struct BrokenSaver;

    impl FallbackSaver for BrokenSaver {
        fn save(&self, filename: &str, _contents: &str) -> Result<PathBuf, DownloadError> {
            Err(DownloadError::Rejected(format!("cannot save {filename}")))
        }
    }

    fn exporter(sink: Arc<dyn DownloadSink>, fallback: Arc<dyn FallbackSaver>) -> Exporter {
        Exporter::new(sink, fallback, "reviews.csv", Duration::from_millis(1500))
    }

    #[tokio::test]
    async fn test_file_sink_writes_export() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let exporter = exporter(
            Arc::new(FileDownloadSink::new(&target)),
            Arc::new(BrokenSaver),
        );
        assert_eq!(exporter.export("a,b").await, SaveOutcome::Saved);
        assert_eq!(std::fs::read_to_string(target.join("reviews.csv")).unwrap(), "a,b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_sink_falls_back_after_timeout() {
        let saver = Arc::new(RecordingSaver::default());
        let started = tokio::time::Instant::now();
        let outcome = exporter(Arc::new(SlowSink), saver.clone()).export("x").await;

        assert!(matches!(outcome, SaveOutcome::SavedWithFallback { .. }));
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
        assert_eq!(*saver.saved.lock().unwrap(), vec!["reviews.csv".to_string()]);
        assert!(outcome.is_saved());
    }

    #[tokio::test]
    async fn test_rejected_then_failed_fallback() {
        let outcome = exporter(Arc::new(RejectingSink), Arc::new(BrokenSaver)).export("x").await;
        let SaveOutcome::Failed { reason } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(reason.contains("quota"));
        assert!(reason.contains("cannot save"));
        assert!(!SaveOutcome::Failed { reason }.is_saved());
    }

    #[test]
    fn test_directory_saver() {
        let dir = tempfile::tempdir().unwrap();
        let path = DirectorySaver::new(dir.path()).save("r.csv", "h").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "h");
    }
}

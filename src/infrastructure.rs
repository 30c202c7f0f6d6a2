//! Infrastructure layer: host page access, parsing, export and ambient services
//!
//! Everything here talks to something the engine does not own: the rendered
//! page, the download mechanism, the user's screen or the filesystem.

pub mod change_waiter;
pub mod config; // Configuration and defaults
pub mod csv_encoder;
pub mod download;
pub mod host_page;
pub mod logging;
pub mod navigator;
pub mod notifier;
pub mod parsing; // Page contract and field extraction

pub use change_waiter::{ChangeWaiter, PendingChange};
pub use config::{AppConfig, ConfigManager, LoggingConfig, OutputConfig, TimingConfig};
pub use csv_encoder::{EncodeError, encode_reviews};
pub use download::{
    DirectorySaver, DownloadError, DownloadSink, Exporter, FallbackSaver, FileDownloadSink,
    SaveOutcome,
};
pub use host_page::{ClickOutcome, HostPage, SnapshotPage, load_snapshots};
pub use logging::{get_log_directory, init_logging_with_config};
pub use navigator::Navigator;
pub use notifier::{ChannelNotifier, Notification, Notifier, TracingNotifier};
pub use parsing::{ParsingConfig, ParsingError, ParsingResult};

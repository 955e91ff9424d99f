// zipstamp - timestamped zip backups of a directory
// Archives are only written when a source file is newer than the last archive.

pub mod cli;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use anyhow::{Context, Result};

// Re-export commonly used types
pub use models::{
    ArchiveRequest, BackupError, BackupOptions, BackupOutcome, BackupResult, ErrorKind,
    ResolvedDestination,
};
pub use state::{check_staleness, StalenessReport};

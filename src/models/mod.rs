pub mod error;
pub mod request;

pub use error::{BackupError, BackupResult, ErrorKind};
pub use request::{
    ArchiveRequest, ArchiveSummary, BackupOptions, BackupOutcome, ResolvedDestination,
    ARCHIVE_EXTENSION, NAME_DELIMITER,
};

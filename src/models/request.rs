use std::path::{Path, PathBuf};

/// Extension every archive is written with
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Token between the base name and the timestamp in an archive file name.
///
/// A base name containing this token makes prior-archive matching ambiguous.
pub const NAME_DELIMITER: char = '&';

/// Raw user input for one backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    /// Directory to back up, exactly as given on the command line
    pub source_path: String,
    /// Destination hint: empty, a directory, or a path ending in `.zip`
    pub destination_input: String,
}

impl ArchiveRequest {
    pub fn new(source_path: impl Into<String>, destination_input: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            destination_input: destination_input.into(),
        }
    }

    /// Source path as a filesystem path
    pub fn source(&self) -> &Path {
        Path::new(&self.source_path)
    }
}

/// Where the new archive goes and which family of archives it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    /// Directory searched for prior archives and written to
    pub directory: PathBuf,
    /// Archive family name shared by every archive of this source
    pub base_name: String,
    /// Full path of the archive to create
    pub final_path: PathBuf,
    /// Timestamp embedded in `final_path`
    pub timestamp: String,
}

impl ResolvedDestination {
    /// File name of the archive to create
    pub fn file_name(&self) -> String {
        format!(
            "{}{}{}{}",
            self.base_name, NAME_DELIMITER, self.timestamp, ARCHIVE_EXTENSION
        )
    }
}

/// Run-level switches that do not change naming
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupOptions {
    /// Decide and report, but never write an archive
    pub dry_run: bool,
    /// Archive even when nothing changed since the last archive
    pub force: bool,
}

/// Totals for a written archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entries: usize,
    pub bytes: u64,
}

/// What a backup run ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A new archive was written
    Archived {
        path: PathBuf,
        summary: ArchiveSummary,
    },
    /// Nothing in the source is newer than the latest prior archive
    Unchanged,
    /// Dry run: an archive would have been written to `path`
    WouldArchive { path: PathBuf },
}

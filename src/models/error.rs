use std::path::PathBuf;

/// Result type for backup operations
pub type BackupResult<T> = Result<T, BackupError>;

/// Broad class of a [`BackupError`], used to pick the user-facing treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing command-line input
    Usage,
    /// Source or destination is missing or not a directory
    Path,
    /// Filesystem failure while scanning or archiving
    Io,
}

/// Errors that can occur while resolving, checking, or writing a backup
///
/// Every I/O failure aborts the run. Nothing is retried and no file is
/// skipped, so one unreadable source file blocks the whole backup.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Missing required --source parameter")]
    MissingSource,

    #[error("There was an error checking the directory '{}'! Make sure it exists", .path.display())]
    PathUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("Cannot derive an archive name from '{input}'")]
    InvalidArchiveName { input: String },

    #[error("Failed to list destination directory '{}': {source}", .path.display())]
    ListDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid archive name pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to walk source tree at '{}': {source}", .path.display())]
    WalkSource {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("There was an error checking file {}: {source}", .path.display())]
    StatSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to open file: {}: {source}", .path.display())]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create archive '{}': {source}", .path.display())]
    CreateArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("There was an error creating file in archive: {entry}: {source}")]
    AddEntry {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("There was an error copying file: {entry}: {source}")]
    CopyEntry {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to finish archive '{}': {source}", .path.display())]
    FinishArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to move archive into place at '{}': {source}", .path.display())]
    PersistArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackupError {
    /// Taxonomy class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackupError::MissingSource | BackupError::InvalidArchiveName { .. } => {
                ErrorKind::Usage
            }
            BackupError::PathUnavailable { .. } | BackupError::NotADirectory { .. } => {
                ErrorKind::Path
            }
            BackupError::ListDestination { .. }
            | BackupError::Pattern(_)
            | BackupError::WalkSource { .. }
            | BackupError::StatSource { .. }
            | BackupError::OpenSource { .. }
            | BackupError::CreateArchive { .. }
            | BackupError::AddEntry { .. }
            | BackupError::CopyEntry { .. }
            | BackupError::FinishArchive { .. }
            | BackupError::PersistArchive { .. } => ErrorKind::Io,
        }
    }
}

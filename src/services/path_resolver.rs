//! Path resolver - turns raw `--source`/`--destination` input into the
//! archive path for this run and the archive family name.
//!
//! Paths may use `/` or `\` regardless of host platform. The first split is
//! on `/`; only when that yields a single segment is `\` tried.

use crate::models::{
    ArchiveRequest, BackupError, BackupResult, ResolvedDestination, ARCHIVE_EXTENSION,
    NAME_DELIMITER,
};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fixed-width, sortable, filesystem-safe timestamp format (minute resolution)
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%dT%H_%M";

/// Resolve the destination archive for a request at time `now`
///
/// Reads the filesystem to validate directories but never writes.
pub fn resolve(request: &ArchiveRequest, now: NaiveDateTime) -> BackupResult<ResolvedDestination> {
    if request.source_path.is_empty() {
        return Err(BackupError::MissingSource);
    }

    ensure_directory(request.source())?;
    let source_name = source_dir_name(&request.source_path)?;
    let timestamp = format_timestamp(now);
    let destination = request.destination_input.as_str();

    let resolved = if destination.is_empty() {
        let file_name = archive_file_name(&source_name, &timestamp);
        ResolvedDestination {
            directory: PathBuf::from("."),
            base_name: source_name,
            final_path: PathBuf::from(file_name),
            timestamp,
        }
    } else if let Some(stripped) = destination.strip_suffix(ARCHIVE_EXTENSION) {
        let (directory, base_name) = split_last(stripped);
        if base_name.is_empty() {
            return Err(BackupError::InvalidArchiveName {
                input: destination.to_string(),
            });
        }
        ResolvedDestination {
            directory,
            base_name: base_name.to_string(),
            final_path: PathBuf::from(format!(
                "{}{}{}{}",
                stripped, NAME_DELIMITER, timestamp, ARCHIVE_EXTENSION
            )),
            timestamp,
        }
    } else {
        let directory = PathBuf::from(destination);
        ensure_directory(&directory)?;
        let final_path = directory.join(archive_file_name(&source_name, &timestamp));
        ResolvedDestination {
            directory,
            base_name: source_name,
            final_path,
            timestamp,
        }
    };

    if resolved.base_name.contains(NAME_DELIMITER) {
        warn!(
            base_name = %resolved.base_name,
            "Archive name contains '{}'; matching of prior archives may be ambiguous",
            NAME_DELIMITER
        );
    }

    debug!(
        directory = %resolved.directory.display(),
        base_name = %resolved.base_name,
        final_path = %resolved.final_path.display(),
        "Resolved destination"
    );

    Ok(resolved)
}

/// Format `now` as an archive timestamp
pub fn format_timestamp(now: NaiveDateTime) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Split a path on `/`, falling back to `\` when `/` does not split it
pub fn split_path(path: &str) -> Vec<&str> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() == 1 {
        path.split('\\').collect()
    } else {
        segments
    }
}

/// Name of the source directory itself, ignoring trailing separators
///
/// Relative forms like `.` or `..` have no usable name of their own, so
/// those are resolved through the filesystem.
pub fn source_dir_name(source: &str) -> BackupResult<String> {
    let name = split_path(source)
        .into_iter()
        .rev()
        .find(|segment| !segment.is_empty());

    match name {
        Some(name) if name != "." && name != ".." => Ok(name.to_string()),
        _ => std::fs::canonicalize(source)
            .ok()
            .and_then(|path| path.file_name().map(|n| n.to_string_lossy().to_string()))
            .ok_or_else(|| BackupError::InvalidArchiveName {
                input: source.to_string(),
            }),
    }
}

fn archive_file_name(base_name: &str, timestamp: &str) -> String {
    format!(
        "{}{}{}{}",
        base_name, NAME_DELIMITER, timestamp, ARCHIVE_EXTENSION
    )
}

/// Split off the last segment, returning (parent directory, last segment)
fn split_last(path: &str) -> (PathBuf, &str) {
    let separator = if path.contains('/') {
        '/'
    } else if path.contains('\\') {
        '\\'
    } else {
        return (PathBuf::from("."), path);
    };

    match path.rsplit_once(separator) {
        Some(("", last)) => (PathBuf::from(separator.to_string()), last),
        Some((parent, last)) => (PathBuf::from(parent), last),
        None => (PathBuf::from("."), path),
    }
}

fn ensure_directory(path: &Path) -> BackupResult<()> {
    let metadata = std::fs::metadata(path).map_err(|source| BackupError::PathUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Err(BackupError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

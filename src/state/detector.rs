//! Staleness detector - compares source mtimes against the newest prior
//! archive of the same family.

use crate::models::{BackupError, BackupResult, ResolvedDestination};
use crate::services::archiver::walk_files;
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Newest prior archive found in the destination directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorArchive {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Outcome of a staleness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalenessReport {
    /// Newest matching archive, `None` on a first run
    pub prior_archive: Option<PriorArchive>,
    /// First source file found newer than the prior archive
    pub newer_file: Option<PathBuf>,
}

impl StalenessReport {
    /// Whether a new archive is warranted
    pub fn is_stale(&self) -> bool {
        self.newer_file.is_some()
    }

    /// Modification time every source file is compared against
    ///
    /// `None` stands for the zero time: every file is newer.
    pub fn threshold(&self) -> Option<SystemTime> {
        self.prior_archive.as_ref().map(|prior| prior.modified)
    }
}

/// Decide whether `source` changed since the newest archive in `resolved`'s family
pub fn check_staleness(resolved: &ResolvedDestination, source: &Path) -> BackupResult<StalenessReport> {
    let prior_archive = find_prior_archive(&resolved.directory, &resolved.base_name)?;
    let threshold = prior_archive.as_ref().map(|prior| prior.modified);

    match &prior_archive {
        Some(prior) => debug!(archive = %prior.path.display(), "Found prior archive"),
        None => debug!(base_name = %resolved.base_name, "No prior archive found"),
    }

    let newer_file = find_newer_file(source, threshold)?;

    Ok(StalenessReport {
        prior_archive,
        newer_file,
    })
}

/// Newest non-directory entry of `directory` whose name matches `{base_name}*`
pub fn find_prior_archive(directory: &Path, base_name: &str) -> BackupResult<Option<PriorArchive>> {
    let pattern = Pattern::new(&format!("{}*", Pattern::escape(base_name)))?;
    let list_error = |source| BackupError::ListDestination {
        path: directory.to_path_buf(),
        source,
    };

    let mut newest: Option<PriorArchive> = None;
    for entry in std::fs::read_dir(directory).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        let name = entry.file_name();
        if !pattern.matches(&name.to_string_lossy()) {
            continue;
        }

        let metadata = entry.metadata().map_err(list_error)?;
        if metadata.is_dir() {
            continue;
        }
        let modified = metadata.modified().map_err(list_error)?;

        if newest.as_ref().map_or(true, |current| current.modified < modified) {
            newest = Some(PriorArchive {
                path: entry.path(),
                modified,
            });
        }
    }

    Ok(newest)
}

/// First regular file under `source` modified strictly after `threshold`
///
/// Stops at the first hit. Any walk or stat error aborts the scan.
pub fn find_newer_file(source: &Path, threshold: Option<SystemTime>) -> BackupResult<Option<PathBuf>> {
    for entry in walk_files(source) {
        let entry = entry?;
        if entry.is_dir {
            continue;
        }

        let is_newer = threshold.map_or(true, |threshold| entry.modified > threshold);
        if is_newer {
            debug!(file = %entry.path.display(), "Source file changed since last archive");
            return Ok(Some(entry.path));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn base_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    fn write_with_mtime(path: &Path, modified: SystemTime) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "content").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    fn resolved_in(directory: &Path, base_name: &str) -> ResolvedDestination {
        ResolvedDestination {
            directory: directory.to_path_buf(),
            base_name: base_name.to_string(),
            final_path: directory.join(format!("{}&2024_03_05T09_07.zip", base_name)),
            timestamp: "2024_03_05T09_07".to_string(),
        }
    }

    #[test]
    fn test_first_run_is_always_stale() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("docs");
        let dest = temp.path().join("backups");
        std::fs::create_dir_all(&dest).unwrap();
        write_with_mtime(&source.join("old.txt"), SystemTime::UNIX_EPOCH + Duration::from_secs(1));

        let report = check_staleness(&resolved_in(&dest, "docs"), &source).unwrap();
        assert!(report.prior_archive.is_none());
        assert!(report.threshold().is_none());
        assert!(report.is_stale());
    }

    #[test]
    fn test_unchanged_source_is_not_stale() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("docs");
        let dest = temp.path().join("backups");
        write_with_mtime(&source.join("a.txt"), base_time());
        write_with_mtime(&source.join("sub/b.txt"), base_time() - Duration::from_secs(60));
        write_with_mtime(&dest.join("docs&2023_11_14T22_13.zip"), base_time());

        let report = check_staleness(&resolved_in(&dest, "docs"), &source).unwrap();
        assert_eq!(report.threshold(), Some(base_time()));
        assert!(!report.is_stale());
    }

    #[test]
    fn test_single_newer_file_is_stale() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("docs");
        let dest = temp.path().join("backups");
        write_with_mtime(&source.join("a.txt"), base_time() - Duration::from_secs(60));
        write_with_mtime(&source.join("sub/b.txt"), base_time() + Duration::from_secs(1));
        write_with_mtime(&dest.join("docs&2023_11_14T22_13.zip"), base_time());

        let report = check_staleness(&resolved_in(&dest, "docs"), &source).unwrap();
        assert!(report.is_stale());
        assert_eq!(report.newer_file, Some(source.join("sub/b.txt")));
    }

    #[test]
    fn test_newest_matching_archive_wins() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("backups");
        write_with_mtime(&dest.join("docs&2023_01_01T00_00.zip"), base_time() - Duration::from_secs(3600));
        write_with_mtime(&dest.join("docs&2023_11_14T22_13.zip"), base_time());
        write_with_mtime(&dest.join("other&2024_01_01T00_00.zip"), base_time() + Duration::from_secs(3600));

        let prior = find_prior_archive(&dest, "docs").unwrap().unwrap();
        assert_eq!(prior.path, dest.join("docs&2023_11_14T22_13.zip"));
        assert_eq!(prior.modified, base_time());
    }

    #[test]
    fn test_matching_directories_are_ignored() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();

        assert!(find_prior_archive(temp.path(), "docs").unwrap().is_none());
    }

    #[test]
    fn test_base_name_is_matched_literally() {
        let temp = TempDir::new().unwrap();
        write_with_mtime(&temp.path().join("d&2024_01_01T00_00.zip"), base_time());

        assert!(find_prior_archive(temp.path(), "[d]").unwrap().is_none());
        assert!(find_prior_archive(temp.path(), "d").unwrap().is_some());
    }

    #[test]
    fn test_missing_destination_directory_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = find_prior_archive(&temp.path().join("missing"), "docs").unwrap_err();
        assert!(matches!(err, BackupError::ListDestination { .. }));
    }

    #[test]
    fn test_empty_source_is_never_stale() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("empty");
        std::fs::create_dir_all(source.join("nested")).unwrap();

        assert!(find_newer_file(&source, None).unwrap().is_none());
    }

    #[test]
    fn test_equal_mtime_is_not_newer() {
        let temp = TempDir::new().unwrap();
        write_with_mtime(&temp.path().join("a.txt"), base_time());

        assert!(find_newer_file(temp.path(), Some(base_time())).unwrap().is_none());
    }
}

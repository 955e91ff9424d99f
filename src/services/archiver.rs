//! Archiver - source tree enumeration and zip writing
//!
//! `walk_files` is shared by the staleness scan and the archiving pass so
//! both see the same entries with the same error policy: the first walk or
//! stat error is yielded and the caller aborts.

use crate::models::{ArchiveSummary, BackupError, BackupResult};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One entry found under the source root
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Path as produced by the walk (rooted at the source path)
    pub path: PathBuf,
    /// Zip-root-relative name, `/`-separated
    pub relative: String,
    pub is_dir: bool,
    /// Modification time, following symlinks
    pub modified: SystemTime,
}

/// Lazily enumerate every entry under `root`, directories included
///
/// Symlinks are not traversed, but a symlinked file reports the metadata of
/// its target.
pub fn walk_files(root: &Path) -> impl Iterator<Item = BackupResult<SourceEntry>> + '_ {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .map(move |entry| -> BackupResult<SourceEntry> {
            let entry = entry.map_err(|source| BackupError::WalkSource {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                source,
            })?;

            let path = entry.path().to_path_buf();
            let metadata = std::fs::metadata(&path).map_err(|source| BackupError::StatSource {
                path: path.clone(),
                source,
            })?;
            let modified = metadata
                .modified()
                .map_err(|source| BackupError::StatSource {
                    path: path.clone(),
                    source,
                })?;

            Ok(SourceEntry {
                relative: zip_relative_name(root, &path),
                is_dir: metadata.is_dir(),
                path,
                modified,
            })
        })
}

/// Strip `root` from `path` and join the rest with `/`
///
/// Non-UTF-8 segments are converted lossily, so two such names can map to
/// the same entry name; the zip writer then rejects the duplicate and the
/// run aborts.
pub fn zip_relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => {
                if part.to_str().is_none() {
                    warn!(path = %path.display(), "Entry name is not valid UTF-8, converting lossily");
                }
                Some(part.to_string_lossy().to_string())
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether an entry of `len` bytes must be written with ZIP64 extensions
pub fn needs_zip64(len: u64) -> bool {
    len >= u64::from(u32::MAX)
}

/// Write every regular file under `source` into a new zip at `output`
///
/// The archive is built in a temporary file next to `output` and moved into
/// place only once complete, so a failed run leaves nothing behind.
pub fn write_archive(source: &Path, output: &Path) -> BackupResult<ArchiveSummary> {
    let output_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(&output_dir).map_err(|source| {
        BackupError::CreateArchive {
            path: output.to_path_buf(),
            source,
        }
    })?;
    let temp_path = temp.path().to_path_buf();

    let mut writer = ZipWriter::new(BufWriter::new(temp.as_file_mut()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut summary = ArchiveSummary::default();

    for entry in walk_files(source) {
        let entry = entry?;
        if entry.is_dir || is_same_file(&entry.path, &temp_path) {
            continue;
        }

        let mut file = File::open(&entry.path).map_err(|source| BackupError::OpenSource {
            path: entry.path.clone(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| BackupError::StatSource {
                path: entry.path.clone(),
                source,
            })?
            .len();

        writer
            .start_file(entry.relative.as_str(), options.large_file(needs_zip64(len)))
            .map_err(|source| BackupError::AddEntry {
                entry: entry.relative.clone(),
                source,
            })?;

        let copied = io::copy(&mut file, &mut writer).map_err(|source| BackupError::CopyEntry {
            entry: entry.relative.clone(),
            source,
        })?;

        debug!(entry = %entry.relative, bytes = copied, "Added archive entry");
        summary.entries += 1;
        summary.bytes += copied;
    }

    let mut buffered = writer.finish().map_err(|source| BackupError::FinishArchive {
        path: output.to_path_buf(),
        source,
    })?;
    buffered.flush().map_err(|source| BackupError::CreateArchive {
        path: output.to_path_buf(),
        source,
    })?;
    drop(buffered);

    temp.persist(output)
        .map_err(|err| BackupError::PersistArchive {
            path: output.to_path_buf(),
            source: err.error,
        })?;

    Ok(summary)
}

/// Whether `candidate` is the in-progress archive at `archive`
fn is_same_file(candidate: &Path, archive: &Path) -> bool {
    if candidate.file_name() != archive.file_name() {
        return false;
    }
    match (std::fs::canonicalize(candidate), std::fs::canonicalize(archive)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

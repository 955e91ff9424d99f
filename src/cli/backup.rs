use crate::models::{ArchiveRequest, BackupOptions, BackupOutcome, BackupResult};
use crate::services::{path_resolver, write_archive};
use crate::state::check_staleness;
use crate::Result;
use chrono::{Local, NaiveDateTime};
use tracing::info;

/// Back up `request.source_path` if it changed since the last archive
pub fn run(request: &ArchiveRequest, options: BackupOptions) -> Result<BackupOutcome> {
    Ok(run_at(request, options, Local::now().naive_local())?)
}

/// Same as [`run`], with the clock supplied by the caller
pub fn run_at(
    request: &ArchiveRequest,
    options: BackupOptions,
    now: NaiveDateTime,
) -> BackupResult<BackupOutcome> {
    let resolved = path_resolver::resolve(request, now)?;
    let source = request.source();

    if !options.force {
        let report = check_staleness(&resolved, source)?;
        if !report.is_stale() {
            info!("There have been no changes in source since last archive");
            return Ok(BackupOutcome::Unchanged);
        }
    }

    if options.dry_run {
        info!(
            "{} would be archived to {}",
            request.source_path,
            resolved.final_path.display()
        );
        return Ok(BackupOutcome::WouldArchive {
            path: resolved.final_path,
        });
    }

    let summary = write_archive(source, &resolved.final_path)?;
    info!(
        entries = summary.entries,
        bytes = summary.bytes,
        "{} has been archived to {}",
        request.source_path,
        resolved.final_path.display()
    );

    Ok(BackupOutcome::Archived {
        path: resolved.final_path,
        summary,
    })
}

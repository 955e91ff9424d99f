//! Service layer for zipstamp
//!
//! Path resolution and archive writing. The staleness decision that sits
//! between them lives in [`crate::state`].

pub mod archiver;
pub mod path_resolver;

pub use archiver::{walk_files, write_archive, zip_relative_name, SourceEntry};
pub use path_resolver::{format_timestamp, resolve, source_dir_name, split_path, TIMESTAMP_FORMAT};

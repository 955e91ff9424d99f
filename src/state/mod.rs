//! Staleness detection
//!
//! The filesystem is the only state store: archive file names group prior
//! archives into families, and their mtimes record when each was taken.

mod detector;

pub use detector::{
    check_staleness, find_newer_file, find_prior_archive, PriorArchive, StalenessReport,
};

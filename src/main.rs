use clap::{ArgAction, Parser};
use colored::Colorize;
use zipstamp::{ArchiveRequest, BackupError, BackupOptions, ErrorKind};

#[derive(Parser)]
#[command(name = "zipstamp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Zip a directory into a timestamped archive when it has changed", long_about = None)]
struct Cli {
    /// Path to the directory you want to archive
    #[arg(long, value_name = "PATH")]
    source: Option<String>,

    /// Destination directory and/or archive name (ending in .zip).
    /// Defaults to the source directory's name in the current directory
    #[arg(long, value_name = "PATH")]
    destination: Option<String>,

    /// Report whether an archive would be written, without writing it
    #[arg(long)]
    dry_run: bool,

    /// Archive even if nothing changed since the last archive
    #[arg(short, long)]
    force: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    zipstamp::logging::init(cli.verbose, cli.quiet);

    let request = ArchiveRequest::new(
        cli.source.unwrap_or_default(),
        cli.destination.unwrap_or_default(),
    );
    let options = BackupOptions {
        dry_run: cli.dry_run,
        force: cli.force,
    };

    if let Err(e) = zipstamp::cli::backup::run(&request, options) {
        tracing::debug!(error = ?e, "backup failed");
        eprintln!("{}", format!("Error: {}", e).red());
        let code = match e.downcast_ref::<BackupError>().map(BackupError::kind) {
            Some(ErrorKind::Usage) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

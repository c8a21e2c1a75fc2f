//! Subcommand implementations.

use crate::cli::{AnalyticsArgs, HistoryArgs, RenameArgs};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use renamr_config::Config;
use renamr_ledger::{Analytics, History, Ledger};
use renamr_library::{
    ArchiveEvent, ArchiveOptions, Download, IntakeLimits, NameGenerator, RawInput, Session, SessionOptions,
};
use renamr_storage::BackendHandle;
use renamr_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::fmt;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use tokio_util::sync::CancellationToken;

const MIB: f64 = 1024.0 * 1024.0;

fn backend(name: &str, root: &Path, dry_run: bool) -> Result<BackendHandle> {
    let local: BackendHandle =
        Arc::new(LocalBackend::new(name, root).or_raise(|| ErrorKind::Storage(name.to_string()))?);
    if dry_run {
        return Ok(Arc::new(ReadOnlyBackend::new(local)));
    }
    Ok(local)
}

async fn open_ledger(config: &Config, dry_run: bool) -> Result<Ledger> {
    let directory = config.ledger_directory().or_raise(|| ErrorKind::Config)?;
    let backend = backend("ledger", &directory, dry_run)?;
    Ok(Ledger::open(backend, config.ledger.history_limit).await)
}

fn session_options(config: &Config, args: &RenameArgs) -> Result<SessionOptions> {
    let naming: NameGenerator = config.naming.template.parse::<NameGenerator>().or_raise(|| ErrorKind::Config)?;
    Ok(SessionOptions {
        limits: IntakeLimits {
            max_files: config.intake.max_files,
            max_file_size: config.intake.max_file_size,
            progress_threshold: config.intake.progress_threshold,
        },
        naming,
        archive: ArchiveOptions {
            batch_size: config.archive.batch_size,
            compression: args.compression.unwrap_or(config.archive.compression),
        },
    })
}

/// Ingest, rename and download in one go.
pub async fn rename(config: &Config, args: RenameArgs, cancel: CancellationToken) -> Result<Download> {
    let output_dir = std::path::absolute(&args.output).or_raise(|| ErrorKind::Storage("output".to_string()))?;
    let output = backend("output", &output_dir, args.dry_run)?;
    let ledger = open_ledger(config, args.dry_run).await?;
    let mut session = Session::new(session_options(config, &args)?, ledger);

    let inputs = args.inputs.iter().map(RawInput::from_path).collect();
    let report = session.ingest(inputs).await.or_raise(|| ErrorKind::Intake)?;
    for rejection in &report.rejected {
        eprintln!("skipped {rejection}");
    }

    session.set_filter(args.filter);
    for renamed in session.rename(&args.base).await.or_raise(|| ErrorKind::Naming)? {
        println!("{} -> {}", renamed.old_name, renamed.new_name);
    }

    let download = session
        .download_with(&args.base, &output, cancel, |event| match event {
            ArchiveEvent::Started { total } => eprintln!("archiving {total} files"),
            ArchiveEvent::Progress(percent) => {
                eprint!("\r{percent:>3}%");
                let _ = std::io::stderr().flush();
            },
            ArchiveEvent::Finalizing => eprint!("\rcompressing"),
            ArchiveEvent::Complete(_) => eprintln!("\rdone       "),
        })
        .await
        .or_raise(|| ErrorKind::Archive)?;

    let verb = if args.dry_run { "would write" } else { "wrote" };
    println!(
        "{verb} {} ({} files, {} bytes)",
        output_dir.join(&download.path).display(),
        download.entries,
        download.size
    );
    Ok(download)
}

pub async fn history(config: &Config, args: HistoryArgs) -> Result<()> {
    let ledger = open_ledger(config, true).await?;
    print!("{}", HistoryReport {
        history: ledger.history(),
        limit: args.limit,
    });
    Ok(())
}

pub async fn analytics(config: &Config, args: AnalyticsArgs) -> Result<()> {
    let ledger = open_ledger(config, true).await?;
    print!("{}", AnalyticsReport {
        analytics: ledger.analytics(),
        top: args.top,
    });
    Ok(())
}

pub fn config(config: &Config) -> Result<()> {
    let rendered = serde_json::to_string_pretty(config).or_raise(|| ErrorKind::Config)?;
    println!("{rendered}");
    Ok(())
}

/// The most recent history entries, one per line.
struct HistoryReport<'a> {
    history: &'a History,
    limit: usize,
}

impl fmt::Display for HistoryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.history.is_empty() {
            return writeln!(f, "no renames yet");
        }
        for entry in self.history.iter().take(self.limit) {
            let timestamp = entry.timestamp.format(&Rfc3339).unwrap_or_else(|_| entry.timestamp.to_string());
            writeln!(f, "{timestamp}  {} -> {}  ({})", entry.old_name, entry.new_name, entry.mime_type)?;
        }
        Ok(())
    }
}

/// Totals, rankings and the latest usage buckets.
struct AnalyticsReport<'a> {
    analytics: &'a Analytics,
    top: usize,
}

impl fmt::Display for AnalyticsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analytics = self.analytics;
        writeln!(f, "renames:      {}", analytics.total_renames)?;
        writeln!(f, "files:        {}", analytics.total_files)?;
        writeln!(f, "bytes:        {}", analytics.total_bytes)?;
        if let Some(average) = analytics.average_size() {
            writeln!(f, "average size: {:.2} MiB", average as f64 / MIB)?;
        }
        match analytics.success_rate() {
            Some(rate) => writeln!(
                f,
                "downloads:    {} ok, {} failed ({:.0}%)",
                analytics.successes,
                analytics.errors,
                rate * 100.0
            )?,
            None => writeln!(f, "downloads:    none")?,
        }
        let types = analytics.top_types(self.top);
        if !types.is_empty() {
            writeln!(f, "\ntop types:")?;
            for (mime_type, stats) in types {
                writeln!(f, "  {mime_type:<32} {:>6} files", stats.count)?;
            }
        }
        let names = analytics.top_base_names(self.top);
        if !names.is_empty() {
            writeln!(f, "\ntop base names:")?;
            for (name, count) in names {
                writeln!(f, "  {name:<32} {count:>6} times")?;
            }
        }
        if let Some((week, usage)) = analytics.weekly.iter().next_back() {
            writeln!(f, "\nlatest week {week}: {} renames, {} files", usage.operations, usage.files)?;
        }
        if let Some((month, usage)) = analytics.monthly.iter().next_back() {
            writeln!(f, "latest month {month}: {} renames, {} files", usage.operations, usage.files)?;
        }
        Ok(())
    }
}

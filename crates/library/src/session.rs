//! The working set of records and the operations on it.

use crate::archive::error::{ErrorKind as ArchiveErrorKind, Result as ArchiveResult};
use crate::archive::{self, Archive, ArchiveEvent, ArchiveOptions, Download, Job};
use crate::classify::{Filter, Groups, classify};
use crate::intake::error::{ErrorKind as IntakeErrorKind, Result as IntakeResult};
use crate::intake::{
    self, FileRecord, IngestReport, IntakeLimits, PreviewRegistry, ProgressRegistry, RawInput, RecordId,
};
use crate::naming::error::Result as NamingResult;
use crate::naming::{self, NameGenerator, Renamed, sanitize_base};
use exn::{OptionExt, ResultExt};
use futures::{Stream, TryStreamExt};
use renamr_ledger::{Analytics, History, Ledger, RenamedFile};
use renamr_storage::BackendHandle;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

#[derive(Debug, Default)]
pub struct SessionOptions {
    pub limits: IntakeLimits,
    pub naming: NameGenerator,
    pub archive: ArchiveOptions,
}

/// One user's working set of files.
///
/// Owns the records, their previews and progress tickers, and the ledger
/// that remembers past renames. Dropping the session revokes every preview
/// and stops every ticker.
pub struct Session {
    records: Vec<FileRecord>,
    next_id: u64,
    filter: Filter,
    previews: PreviewRegistry,
    progress: ProgressRegistry,
    ledger: Ledger,
    options: SessionOptions,
}

impl Session {
    pub fn new(options: SessionOptions, ledger: Ledger) -> Self {
        Self {
            records: Vec::new(),
            next_id: 0,
            filter: Filter::default(),
            previews: PreviewRegistry::new(),
            progress: ProgressRegistry::new(),
            ledger,
            options,
        }
    }

    /// Add inputs to the working set.
    ///
    /// Files larger than the size limit are left out and reported; the rest
    /// of the batch is admitted only if the total stays within the file
    /// limit. On error nothing is admitted. Must be called from within a
    /// tokio runtime.
    #[instrument(skip_all, fields(inputs = inputs.len(), admitted, rejected))]
    pub async fn ingest(&mut self, inputs: Vec<RawInput>) -> IntakeResult<IngestReport> {
        let limits = self.options.limits;
        let intake::Collected {
            candidates: admitted,
            rejected,
            ..
        } = intake::collect(inputs, limits.max_file_size).await?;

        let attempted = self.records.len() + admitted.len();
        if attempted > limits.max_files {
            exn::bail!(IntakeErrorKind::TooManyFiles {
                limit: limits.max_files,
                attempted,
            });
        }

        let mut report = IngestReport {
            admitted: Vec::with_capacity(admitted.len()),
            rejected,
        };
        for candidate in admitted {
            self.next_id += 1;
            let id = RecordId(self.next_id);
            let record = FileRecord {
                id,
                preview: candidate.mime_type.starts_with("image/").then(|| self.previews.issue(&candidate.name)),
                name: candidate.name,
                size: candidate.size,
                mime_type: candidate.mime_type,
                last_modified: candidate.last_modified,
                source: candidate.source,
                assigned_name: None,
            };
            if record.size > limits.progress_threshold {
                self.progress.start(id);
            }
            report.admitted.push(id);
            self.records.push(record);
        }
        tracing::Span::current().record("admitted", report.admitted.len()).record("rejected", report.rejected.len());
        Ok(report)
    }

    /// Remove one record, revoking its preview and stopping its ticker.
    pub fn remove(&mut self, id: RecordId) -> bool {
        let Some(position) = self.records.iter().position(|record| record.id == id) else {
            return false;
        };
        self.progress.cancel(id);
        self.records.remove(position);
        true
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.progress.clear();
        self.records.clear();
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&FileRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Records matching the current filter, in intake order.
    pub fn selection(&self) -> Vec<&FileRecord> {
        self.records.iter().filter(|record| self.filter.matches(record)).collect()
    }

    pub fn groups(&self) -> Groups<'_> {
        classify(&self.records)
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn progress(&self) -> &ProgressRegistry {
        &self.progress
    }

    pub fn history(&self) -> &History {
        self.ledger.history()
    }

    pub fn analytics(&self) -> &Analytics {
        self.ledger.analytics()
    }

    /// Give every selected record a sequential name derived from `base`.
    ///
    /// Names are computed for the whole selection before any record is
    /// touched. Records outside the filter keep their current name. The
    /// rename is recorded in the ledger, which is then persisted.
    #[instrument(skip(self), fields(selected))]
    pub async fn rename(&mut self, base: &str) -> NamingResult<Vec<Renamed>> {
        let base = sanitize_base(base)?;
        let selection = self.selection();
        tracing::Span::current().record("selected", selection.len());
        let renamed = naming::plan(&self.options.naming, &base, &selection)?;

        let mut files = Vec::with_capacity(renamed.len());
        for rename in &renamed {
            let Some(record) = self.records.iter_mut().find(|record| record.id == rename.id) else {
                continue;
            };
            record.assigned_name = Some(rename.new_name.clone());
            files.push(RenamedFile {
                old_name: rename.old_name.clone(),
                new_name: rename.new_name.clone(),
                mime_type: record.mime_type.clone(),
                size: record.size,
            });
        }
        self.ledger.record_rename(&base, &files);
        self.ledger.persist().await;
        Ok(renamed)
    }

    fn archive_job(&self, base: &str) -> ArchiveResult<Job> {
        let base = sanitize_base(base).or_raise(|| ArchiveErrorKind::EmptyBaseName)?;
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        for (position, record) in self.records.iter().enumerate() {
            if !self.filter.matches(record) {
                continue;
            }
            let name = match &record.assigned_name {
                Some(name) => name.clone(),
                None => self
                    .options
                    .naming
                    .generate(&base, position + 1, record.extension())
                    .or_raise(|| ArchiveErrorKind::Naming)?,
            };
            if !seen.insert(name.clone()) {
                exn::bail!(ArchiveErrorKind::DuplicateName(name));
            }
            entries.push((name, record.source.clone()));
        }
        if entries.is_empty() {
            exn::bail!(ArchiveErrorKind::EmptySelection);
        }
        Ok(Job {
            file_name: archive::archive_name(&base),
            entries,
        })
    }

    /// Build an archive of the current selection.
    ///
    /// Entries are named by their assigned name, or by the default naming
    /// formula at their position in the working set if they were never
    /// renamed. Two entries ending up with the same name is refused before
    /// anything is read. The returned stream owns everything it needs, so the session
    /// can be used (and mutated) while it runs.
    pub fn build_archive(
        &self,
        base: &str,
        cancel: CancellationToken,
    ) -> ArchiveResult<impl Stream<Item = ArchiveResult<ArchiveEvent>> + Send + 'static> {
        let job = self.archive_job(base)?;
        Ok(archive::build(job, self.options.archive, cancel))
    }

    /// Build the archive and write it to `backend` as `{base}_files.zip`.
    pub async fn download(
        &mut self,
        base: &str,
        backend: &BackendHandle,
        cancel: CancellationToken,
    ) -> ArchiveResult<Download> {
        self.download_with(base, backend, cancel, |_| {}).await
    }

    /// As [`download`](Self::download), handing every event to `observe`.
    #[instrument(skip(self, backend, cancel, observe), fields(backend = backend.name()))]
    pub async fn download_with(
        &mut self,
        base: &str,
        backend: &BackendHandle,
        cancel: CancellationToken,
        mut observe: impl FnMut(&ArchiveEvent),
    ) -> ArchiveResult<Download> {
        let result = self.download_inner(base, backend, cancel, &mut observe).await;
        let counted = match &result {
            Ok(download) => {
                tracing::info!(path = %download.path.display(), size = download.size, "Wrote archive");
                self.ledger.record_success();
                true
            },
            Err(err) if err.is_failure() => {
                self.ledger.record_failure();
                true
            },
            Err(_) => false,
        };
        if counted {
            self.ledger.persist().await;
        }
        result
    }

    async fn download_inner(
        &self,
        base: &str,
        backend: &BackendHandle,
        cancel: CancellationToken,
        observe: &mut impl FnMut(&ArchiveEvent),
    ) -> ArchiveResult<Download> {
        let events = self.build_archive(base, cancel)?;
        let mut events = std::pin::pin!(events);
        let mut archive: Option<Archive> = None;
        while let Some(event) = events.try_next().await? {
            observe(&event);
            if let ArchiveEvent::Complete(finished) = event {
                archive = Some(finished);
            }
        }
        let archive = archive.ok_or_raise(|| ArchiveErrorKind::Assemble)?;
        let path = PathBuf::from(&archive.file_name);
        backend.write(&path, &archive.bytes).await.or_raise(|| ArchiveErrorKind::Storage(path.clone()))?;
        Ok(Download {
            path,
            entries: archive.entries,
            size: archive.bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::intake::Rejection;
    use crate::intake::testing::zip_fixture;
    use crate::naming::error::ErrorKind as NamingErrorKind;
    use crate::source::ByteSource;
    use renamr_ledger::DEFAULT_HISTORY_LIMIT;
    use renamr_storage::StorageBackend;
    use renamr_storage::backend::MockBackend;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    async fn session_with(limits: IntakeLimits) -> (Session, BackendHandle) {
        let ledger_backend: BackendHandle = Arc::new(MockBackend::default().with_name("ledger"));
        let ledger = Ledger::open(ledger_backend.clone(), DEFAULT_HISTORY_LIMIT).await;
        let options = SessionOptions {
            limits,
            ..Default::default()
        };
        (Session::new(options, ledger), ledger_backend)
    }

    async fn session() -> Session {
        session_with(IntakeLimits::default()).await.0
    }

    fn blobs(names: &[&str]) -> Vec<RawInput> {
        names.iter().map(|name| RawInput::blob(*name, name.as_bytes().to_vec())).collect()
    }

    fn names<'a>(records: impl IntoIterator<Item = &'a FileRecord>) -> Vec<&'a str> {
        records.into_iter().map(|record| record.assigned_name().unwrap_or(record.name())).collect()
    }

    #[tokio::test]
    async fn test_vacation_scenario() {
        let (mut session, ledger_backend) = session_with(IntakeLimits::default()).await;
        session.ingest(blobs(&["IMG_01.jpg", "IMG_02.png", "notes.txt", "clip.mp4"])).await.unwrap();
        assert_eq!(session.previews().live(), 2);

        session.set_filter(Filter::Only(Category::Image));
        let renamed = session.rename("vacation").await.unwrap();
        let new_names: Vec<_> = renamed.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, ["vacation_1.jpg", "vacation_2.png"]);
        assert_eq!(names(session.records()), ["vacation_1.jpg", "vacation_2.png", "notes.txt", "clip.mp4"]);

        let output: BackendHandle = Arc::new(MockBackend::default().with_name("output"));
        let download = session.download("vacation", &output, CancellationToken::new()).await.unwrap();
        assert_eq!(download.path, PathBuf::from("vacation_files.zip"));
        assert_eq!(download.entries, 2);

        let bytes = output.read(Path::new("vacation_files.zip")).await.unwrap();
        assert_eq!(download.size, bytes.len() as u64);
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entries: Vec<_> = (0..zip.len()).map(|i| zip.by_index(i).unwrap().name().to_string()).collect();
        assert_eq!(entries, ["vacation_1.jpg", "vacation_2.png"]);

        let history: Vec<_> = session.history().iter().map(|e| (e.old_name.as_str(), e.new_name.as_str())).collect();
        assert_eq!(history, [("IMG_01.jpg", "vacation_1.jpg"), ("IMG_02.png", "vacation_2.png")]);
        assert_eq!(session.analytics().total_renames, 1);
        assert_eq!(session.analytics().successes, 1);
        assert_eq!(session.analytics().top_base_names(5), [("vacation", 1)]);
        assert!(ledger_backend.exists(Path::new(renamr_ledger::HISTORY_KEY)).await.unwrap());
        assert!(ledger_backend.exists(Path::new(renamr_ledger::ANALYTICS_KEY)).await.unwrap());
    }

    #[tokio::test]
    async fn test_three_image_vacation() {
        let mut session = session().await;
        session.ingest(blobs(&["IMG_01.jpg", "IMG_02.png", "IMG_03.gif"])).await.unwrap();
        session.set_filter(Filter::Only(Category::Image));
        let renamed = session.rename("vacation").await.unwrap();
        let new_names: Vec<_> = renamed.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, ["vacation_1.jpg", "vacation_2.png", "vacation_3.gif"]);

        let output: BackendHandle = Arc::new(MockBackend::default());
        let download = session.download("vacation", &output, CancellationToken::new()).await.unwrap();
        assert_eq!(download.path, PathBuf::from("vacation_files.zip"));
        assert_eq!(download.entries, 3);

        let bytes = output.read(Path::new("vacation_files.zip")).await.unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entries: Vec<_> = (0..zip.len()).map(|i| zip.by_index(i).unwrap().name().to_string()).collect();
        assert_eq!(entries, ["vacation_1.jpg", "vacation_2.png", "vacation_3.gif"]);
        let history: Vec<_> = session.history().iter().map(|e| (e.old_name.as_str(), e.new_name.as_str())).collect();
        assert_eq!(history, [
            ("IMG_01.jpg", "vacation_1.jpg"),
            ("IMG_02.png", "vacation_2.png"),
            ("IMG_03.gif", "vacation_3.gif"),
        ]);
    }

    #[tokio::test]
    async fn test_rename_is_idempotent() {
        let mut session = session().await;
        session.ingest(blobs(&["a.jpg", "b", "c.tar.gz"])).await.unwrap();
        let first = session.rename("trip").await.unwrap();
        let second = session.rename("trip").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(names(session.records()), ["trip_1.jpg", "trip_2", "trip_3.gz"]);
        assert_eq!(session.history().len(), 6);
    }

    #[tokio::test]
    async fn test_rename_refusals_leave_records_alone() {
        let mut session = session().await;
        session.ingest(blobs(&["a.jpg"])).await.unwrap();
        let err = session.rename(" /?* ").await.unwrap_err();
        assert_eq!(*err, NamingErrorKind::EmptyBaseName);

        session.set_filter(Filter::Only(Category::Video));
        let err = session.rename("trip").await.unwrap_err();
        assert_eq!(*err, NamingErrorKind::EmptySelection);

        assert_eq!(session.records()[0].assigned_name(), None);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_count_limit_is_strict() {
        let limits = IntakeLimits {
            max_files: 3,
            ..Default::default()
        };
        let (mut session, _) = session_with(limits).await;
        session.ingest(blobs(&["a.jpg", "b.jpg"])).await.unwrap();
        let err = session.ingest(blobs(&["c.jpg", "d.jpg"])).await.unwrap_err();
        assert_eq!(*err, IntakeErrorKind::TooManyFiles { limit: 3, attempted: 4 });
        assert_eq!(session.records().len(), 2);
        assert_eq!(session.previews().live(), 2);

        session.ingest(blobs(&["c.jpg"])).await.unwrap();
        assert_eq!(session.records().len(), 3);
    }

    #[tokio::test]
    async fn test_size_limit_is_inclusive() {
        let limits = IntakeLimits {
            max_file_size: 4,
            ..Default::default()
        };
        let (mut session, _) = session_with(limits).await;
        let inputs = vec![
            RawInput::blob("exact.bin", vec![0; 4]),
            RawInput::blob("over.bin", vec![0; 5]),
            RawInput::blob("under.bin", vec![0; 1]),
        ];
        let report = session.ingest(inputs).await.unwrap();
        assert_eq!(report.admitted.len(), 2);
        assert_eq!(report.rejected, [Rejection {
            name: "over.bin".to_string(),
            size: 5,
            limit: 4,
        }]);
        let names: Vec<_> = session.records().iter().map(|r| r.name()).collect();
        assert_eq!(names, ["exact.bin", "under.bin"]);
    }

    #[tokio::test]
    async fn test_oversized_files_do_not_count_towards_limit() {
        let limits = IntakeLimits {
            max_files: 1,
            max_file_size: 2,
            ..Default::default()
        };
        let (mut session, _) = session_with(limits).await;
        let inputs = vec![RawInput::blob("big.bin", vec![0; 3]), RawInput::blob("ok.bin", vec![0; 2])];
        let report = session.ingest(inputs).await.unwrap();
        assert_eq!(report.admitted.len(), 1);
        assert_eq!(report.rejected.len(), 1);
    }

    #[tokio::test]
    async fn test_zip_input_becomes_flat_records() {
        let mut session = session().await;
        let report = session.ingest(vec![RawInput::blob("bundle.zip", zip_fixture())]).await.unwrap();
        assert_eq!(report.admitted.len(), 3);
        let groups = session.groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.images.len(), 1);
        assert_eq!(groups.documents.len(), 2);
        let record = session.record(report.admitted[1]).unwrap();
        assert_eq!(record.name(), "b.txt");
        assert_eq!(record.source().read_text().await.unwrap(), "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_and_clear_release_resources() {
        let limits = IntakeLimits {
            progress_threshold: 2,
            ..Default::default()
        };
        let (mut session, _) = session_with(limits).await;
        let inputs = vec![
            RawInput::blob("big.jpg", vec![0; 10]),
            RawInput::blob("small.jpg", vec![0; 1]),
            RawInput::blob("big.pdf", vec![0; 10]),
        ];
        let report = session.ingest(inputs).await.unwrap();
        assert_eq!(session.previews().live(), 2);
        assert_eq!(session.progress().len(), 2);

        assert!(session.remove(report.admitted[0]));
        assert!(!session.remove(report.admitted[0]));
        assert_eq!(session.previews().live(), 1);
        assert_eq!(session.progress().len(), 1);
        assert_eq!(session.progress().percent(report.admitted[0]), None);

        session.clear();
        assert!(session.records().is_empty());
        assert_eq!(session.previews().live(), 0);
        assert!(session.progress().is_empty());
    }

    #[tokio::test]
    async fn test_dropping_session_revokes_previews() {
        let mut session = session().await;
        session.ingest(blobs(&["a.jpg", "b.png"])).await.unwrap();
        let previews = session.previews().clone();
        assert_eq!(previews.live(), 2);
        drop(session);
        assert_eq!(previews.live(), 0);
    }

    #[tokio::test]
    async fn test_archive_without_rename_uses_working_set_positions() {
        let mut session = session().await;
        session.ingest(blobs(&["notes.txt", "a.jpg", "b.jpg"])).await.unwrap();
        session.set_filter(Filter::Only(Category::Image));
        let output: BackendHandle = Arc::new(MockBackend::default());
        session.download("trip", &output, CancellationToken::new()).await.unwrap();
        let bytes = output.read(Path::new("trip_files.zip")).await.unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entries: Vec<_> = (0..zip.len()).map(|i| zip.by_index(i).unwrap().name().to_string()).collect();
        assert_eq!(entries, ["trip_2.jpg", "trip_3.jpg"]);
    }

    #[tokio::test]
    async fn test_colliding_entry_names_are_refused() {
        let mut session = session().await;
        let report = session.ingest(blobs(&["a.jpg", "b.jpg"])).await.unwrap();
        session.rename("trip").await.unwrap();
        assert!(session.remove(report.admitted[0]));
        session.ingest(blobs(&["c.jpg"])).await.unwrap();
        // b.jpg keeps trip_2.jpg; c.jpg now sits at position 2 as well.
        assert_eq!(names(session.records()), ["trip_2.jpg", "c.jpg"]);

        let output: BackendHandle = Arc::new(MockBackend::default());
        let err = session.download("trip", &output, CancellationToken::new()).await.unwrap_err();
        assert_eq!(*err, ArchiveErrorKind::DuplicateName("trip_2.jpg".to_string()));
        assert!(output.files().await.unwrap().is_empty());
        assert_eq!(session.analytics().errors, 0);
        assert_eq!(session.analytics().successes, 0);
    }

    #[tokio::test]
    async fn test_download_refusals_and_cancellation() {
        let mut session = session().await;
        let output: BackendHandle = Arc::new(MockBackend::default());
        let err = session.download("trip", &output, CancellationToken::new()).await.unwrap_err();
        assert_eq!(*err, ArchiveErrorKind::EmptySelection);

        session.ingest(blobs(&["a.jpg"])).await.unwrap();
        let err = session.download("  ", &output, CancellationToken::new()).await.unwrap_err();
        assert_eq!(*err, ArchiveErrorKind::EmptyBaseName);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = session.download("trip", &output, cancel).await.unwrap_err();
        assert_eq!(*err, ArchiveErrorKind::Cancelled);

        assert!(output.files().await.unwrap().is_empty());
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.analytics().errors, 0);
        assert_eq!(session.analytics().successes, 0);
    }

    #[tokio::test]
    async fn test_download_reports_events() {
        let mut session = session().await;
        session.ingest(blobs(&["a.jpg", "b.jpg"])).await.unwrap();
        let output: BackendHandle = Arc::new(MockBackend::default());
        let mut seen = Vec::new();
        session
            .download_with("trip", &output, CancellationToken::new(), |event| {
                seen.push(match event {
                    ArchiveEvent::Started { .. } => "started",
                    ArchiveEvent::Progress(_) => "progress",
                    ArchiveEvent::Finalizing => "finalizing",
                    ArchiveEvent::Complete(_) => "complete",
                })
            })
            .await
            .unwrap();
        assert_eq!(seen, ["started", "progress", "finalizing", "complete"]);
    }
}

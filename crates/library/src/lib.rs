//! Core pipeline of renamr.
//!
//! A [`Session`] holds the working set of files. Files enter through
//! [`intake`], are bucketed by [`classify`], renamed by [`naming`] and
//! bundled into a ZIP by [`archive`]. Past renames and usage counters are
//! kept in a [`renamr_ledger::Ledger`] owned by the session.
//!
//! ```no_run
//! use renamr_library::{Filter, RawInput, Session, SessionOptions};
//! use renamr_ledger::Ledger;
//! use renamr_storage::{BackendHandle, backend::LocalBackend};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state: BackendHandle = Arc::new(LocalBackend::new("ledger", "/var/lib/renamr")?);
//! let output: BackendHandle = Arc::new(LocalBackend::new("output", "/home/me/Downloads")?);
//! let mut session = Session::new(SessionOptions::default(), Ledger::open(state, 50).await);
//!
//! session.ingest(vec![RawInput::directory("/home/me/Pictures/Trip")]).await?;
//! session.set_filter("images".parse::<Filter>()?);
//! session.rename("vacation").await?;
//! session.download("vacation", &output, CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod classify;
pub mod intake;
pub mod naming;
mod session;
pub mod source;

pub use crate::archive::{Archive, ArchiveEvent, ArchiveOptions, Download};
pub use crate::classify::{Category, Filter, Groups};
pub use crate::intake::{FileRecord, IngestReport, IntakeLimits, RawInput, RecordId, Rejection};
pub use crate::naming::{NameGenerator, Renamed};
pub use crate::session::{Session, SessionOptions};

//! Storage backends for renamr.
//!
//! Everything renamr touches on disk goes through [`StorageBackend`]: walking
//! dropped directories, writing finished archives and persisting the ledger.
//! Paths are always relative to a backend root and validated before use.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::{validate as validate_path, validate_file_name};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;

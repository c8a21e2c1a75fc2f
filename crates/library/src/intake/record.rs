use super::mime;
use super::preview::PreviewHandle;
use crate::classify::Category;
use crate::source::SourceHandle;
use derive_more::Display;
use time::OffsetDateTime;

/// Session-unique record identifier, assigned in intake order.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("#{_0}")]
pub struct RecordId(pub(crate) u64);

/// One admitted input file.
///
/// Archive entries and directory leaves are flattened: `name` is always a
/// bare file name.
#[derive(Debug)]
pub struct FileRecord {
    pub(crate) id: RecordId,
    pub(crate) name: String,
    pub(crate) size: u64,
    pub(crate) mime_type: String,
    pub(crate) last_modified: OffsetDateTime,
    pub(crate) source: SourceHandle,
    pub(crate) preview: Option<PreviewHandle>,
    pub(crate) assigned_name: Option<String>,
}

impl FileRecord {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn last_modified(&self) -> OffsetDateTime {
        self.last_modified
    }

    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Name given by the last rename, if any.
    pub fn assigned_name(&self) -> Option<&str> {
        self.assigned_name.as_deref()
    }

    pub fn extension(&self) -> Option<&str> {
        mime::extension(&self.name)
    }

    pub fn category(&self) -> Category {
        Category::of(&self.mime_type)
    }
}

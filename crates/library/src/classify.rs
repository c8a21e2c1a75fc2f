//! Coarse type buckets for filtering the working set.

use crate::intake::FileRecord;
use derive_more::{Display, Error};
use std::str::FromStr;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[display("image")]
    Image,
    #[display("video")]
    Video,
    #[display("audio")]
    Audio,
    #[display("document")]
    Document,
    #[display("other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [Self::Image, Self::Video, Self::Audio, Self::Document, Self::Other];

    /// Bucket for a MIME type. Prefixes win over the document heuristics, so
    /// e.g. `video/x-msword` is still a video.
    pub fn of(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else if mime_type.starts_with("video/") {
            Self::Video
        } else if mime_type.starts_with("audio/") {
            Self::Audio
        } else if ["pdf", "word", "excel"].iter().any(|needle| mime_type.contains(needle)) || mime_type == "text/plain"
        {
            Self::Document
        } else {
            Self::Other
        }
    }
}

/// Records partitioned by [`Category`], each bucket in intake order.
#[derive(Debug, Default)]
pub struct Groups<'a> {
    pub images: Vec<&'a FileRecord>,
    pub videos: Vec<&'a FileRecord>,
    pub audio: Vec<&'a FileRecord>,
    pub documents: Vec<&'a FileRecord>,
    pub others: Vec<&'a FileRecord>,
}

impl<'a> Groups<'a> {
    pub fn get(&self, category: Category) -> &[&'a FileRecord] {
        match category {
            Category::Image => &self.images,
            Category::Video => &self.videos,
            Category::Audio => &self.audio,
            Category::Document => &self.documents,
            Category::Other => &self.others,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<&'a FileRecord> {
        match category {
            Category::Image => &mut self.images,
            Category::Video => &mut self.videos,
            Category::Audio => &mut self.audio,
            Category::Document => &mut self.documents,
            Category::Other => &mut self.others,
        }
    }

    /// Total number of records across all buckets.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `records` into [`Groups`]. Every record lands in exactly one
/// bucket.
pub fn classify<'a>(records: impl IntoIterator<Item = &'a FileRecord>) -> Groups<'a> {
    let mut groups = Groups::default();
    for record in records {
        groups.get_mut(record.category()).push(record);
    }
    groups
}

/// Which records the naming engine and archive builder operate on.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    #[display("all")]
    All,
    #[display("{}", filter_name(*_0))]
    Only(Category),
}

fn filter_name(category: Category) -> &'static str {
    match category {
        Category::Image => "images",
        Category::Video => "videos",
        Category::Audio => "audio",
        Category::Document => "documents",
        Category::Other => "others",
    }
}

impl Filter {
    pub fn matches(&self, record: &FileRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => record.category() == *category,
        }
    }
}

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
#[display("unknown filter `{_0}`, expected one of: all, images, videos, audio, documents, others")]
pub struct UnknownFilter(#[error(not(source))] pub String);

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let filter = match s.trim().to_ascii_lowercase().as_str() {
            "all" => Self::All,
            "images" | "image" => Self::Only(Category::Image),
            "videos" | "video" => Self::Only(Category::Video),
            "audio" | "audios" => Self::Only(Category::Audio),
            "documents" | "document" => Self::Only(Category::Document),
            "others" | "other" => Self::Only(Category::Other),
            _ => return Err(UnknownFilter(s.to_string())),
        };
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::testing::record;
    use rstest::rstest;

    #[rstest]
    #[case("image/png", Category::Image)]
    #[case("image/svg+xml", Category::Image)]
    #[case("video/mp4", Category::Video)]
    #[case("audio/wav", Category::Audio)]
    #[case("application/pdf", Category::Document)]
    #[case("application/msword", Category::Document)]
    #[case("application/vnd.ms-excel", Category::Document)]
    #[case("application/vnd.openxmlformats-officedocument.wordprocessingml.document", Category::Document)]
    #[case("text/plain", Category::Document)]
    #[case("text/html", Category::Other)]
    #[case("application/zip", Category::Other)]
    #[case("application/octet-stream", Category::Other)]
    #[case("", Category::Other)]
    fn test_category_of(#[case] mime: &str, #[case] expected: Category) {
        assert_eq!(Category::of(mime), expected);
    }

    #[test]
    fn test_classify_is_a_total_partition() {
        let records = [
            record(1, "a.jpg", "image/jpeg"),
            record(2, "b.mp4", "video/mp4"),
            record(3, "c.pdf", "application/pdf"),
            record(4, "d.png", "image/png"),
            record(5, "e.bin", "application/octet-stream"),
            record(6, "f.mp3", "audio/mpeg"),
        ];
        let groups = classify(&records);
        assert_eq!(groups.len(), records.len());
        let images: Vec<_> = groups.images.iter().map(|r| r.name()).collect();
        assert_eq!(images, ["a.jpg", "d.png"]);
        assert_eq!(groups.get(Category::Video).len(), 1);
        assert_eq!(groups.documents.len(), 1);
        assert_eq!(groups.audio.len(), 1);
        assert_eq!(groups.others.len(), 1);
    }

    #[rstest]
    #[case("all", Filter::All)]
    #[case("Images", Filter::Only(Category::Image))]
    #[case("video", Filter::Only(Category::Video))]
    #[case("audio", Filter::Only(Category::Audio))]
    #[case("documents", Filter::Only(Category::Document))]
    #[case("other", Filter::Only(Category::Other))]
    fn test_filter_from_str(#[case] input: &str, #[case] expected: Filter) {
        assert_eq!(input.parse::<Filter>().unwrap(), expected);
    }

    #[test]
    fn test_filter_display_round_trips() {
        for filter in std::iter::once(Filter::All).chain(Category::ALL.map(Filter::Only)) {
            assert_eq!(filter.to_string().parse::<Filter>().unwrap(), filter);
        }
        assert!("pictures".parse::<Filter>().is_err());
    }

    #[test]
    fn test_filter_matches() {
        let image = record(1, "a.jpg", "image/jpeg");
        assert!(Filter::All.matches(&image));
        assert!(Filter::Only(Category::Image).matches(&image));
        assert!(!Filter::Only(Category::Document).matches(&image));
    }
}

//! Sequential file naming.
//!
//! Every file in the selection is named `{base}_{n}.{ext}`, where `n` is its
//! 1-based position in the selection and `ext` is whatever followed the last
//! `.` of its original name. Names only ever depend on those three inputs,
//! so renaming the same selection twice gives the same result.
//!
//! The stem can be customised with an [upon] template. Only two variables
//! are available:
//!
//! | Variable | Type     | Description                          |
//! |----------|----------|--------------------------------------|
//! | `base`   | `String` | The sanitized base name              |
//! | `index`  | `u64`    | 1-based position in the selection    |
//!
//! ```
//! use renamr_library::naming::NameGenerator;
//!
//! let default = NameGenerator::default();
//! assert_eq!(default.generate("vacation", 2, Some("jpg")).unwrap(), "vacation_2.jpg");
//!
//! let padded: NameGenerator = "{{ index }}-{{ base }}".parse().unwrap();
//! assert_eq!(padded.generate("vacation", 2, None).unwrap(), "2-vacation");
//! ```

pub mod error;

use crate::intake::{FileRecord, RecordId};
use crate::naming::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use renamr_storage::validate_file_name;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

pub const DEFAULT_TEMPLATE: &str = "{{ base }}_{{ index }}";

/// Characters removed from base names.
const FORBIDDEN: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Strip characters that are unsafe in file names, then trim.
///
/// Returns [`EmptyBaseName`](ErrorKind::EmptyBaseName) if nothing is left.
pub fn sanitize_base(base: &str) -> Result<String> {
    let cleaned: String = base.chars().filter(|c| !FORBIDDEN.contains(c) && !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        exn::bail!(ErrorKind::EmptyBaseName);
    }
    Ok(cleaned.to_string())
}

/// Renders file names from a base name and a position.
///
/// The default generator formats names directly; a custom template is
/// compiled once, on construction via [`FromStr`].
#[derive(Default)]
pub struct NameGenerator {
    custom: Option<(Engine<'static>, Template<'static>, String)>,
}

impl FromStr for NameGenerator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim() == DEFAULT_TEMPLATE {
            return Ok(Self::default());
        }
        let engine = Engine::new();
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self {
            custom: Some((engine, template, s.to_string())),
        })
    }
}

impl std::fmt::Debug for NameGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameGenerator").field("template", &self.template()).finish()
    }
}

impl NameGenerator {
    pub fn template(&self) -> &str {
        self.custom.as_ref().map_or(DEFAULT_TEMPLATE, |(_, _, source)| source.as_str())
    }

    /// Render the name stem (no extension).
    pub fn stem(&self, base: &str, index: usize) -> Result<String> {
        let Some((engine, template, _)) = &self.custom else {
            return Ok(format!("{base}_{index}"));
        };
        let index = index as u64;
        let stem = template
            .render(engine, upon::value! { base: base, index: index })
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Ok(stem.trim().to_string())
    }

    /// Render the full file name, appending `extension` when present.
    pub fn generate(&self, base: &str, index: usize, extension: Option<&str>) -> Result<String> {
        let stem = self.stem(base, index)?;
        let name = match extension {
            Some(extension) => format!("{stem}.{extension}"),
            None => stem,
        };
        validate_file_name(&name).or_raise(|| ErrorKind::InvalidName(name.clone()))?;
        Ok(name)
    }
}

/// A record and the name it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    pub id: RecordId,
    pub old_name: String,
    pub new_name: String,
}

/// Work out new names for `selection`, in order, without touching anything.
///
/// `base` must already be sanitized.
#[instrument(skip(generator, selection), fields(selected = selection.len()))]
pub fn plan(generator: &NameGenerator, base: &str, selection: &[&FileRecord]) -> Result<Vec<Renamed>> {
    if selection.is_empty() {
        exn::bail!(ErrorKind::EmptySelection);
    }
    let mut seen = HashSet::with_capacity(selection.len());
    let mut renamed = Vec::with_capacity(selection.len());
    for (position, record) in selection.iter().enumerate() {
        let new_name = generator.generate(base, position + 1, record.extension())?;
        if !seen.insert(new_name.clone()) {
            exn::bail!(ErrorKind::DuplicateName(new_name));
        }
        renamed.push(Renamed {
            id: record.id(),
            old_name: record.name().to_string(),
            new_name,
        });
    }
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::testing::record;
    use rstest::rstest;

    #[rstest]
    #[case("vacation", "vacation")]
    #[case("  summer 2024  ", "summer 2024")]
    #[case("a<b>c:d\"e/f\\g|h?i*j", "abcdefghij")]
    #[case("tab\there\n", "tabhere")]
    fn test_sanitize_base(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_base(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("<>:\"/\\|?*")]
    #[case("\u{0}\u{7}")]
    fn test_sanitize_base_empty(#[case] input: &str) {
        let err = sanitize_base(input).unwrap_err();
        assert_eq!(*err, ErrorKind::EmptyBaseName);
    }

    #[test]
    fn test_default_generator() {
        let generator = NameGenerator::default();
        assert_eq!(generator.template(), DEFAULT_TEMPLATE);
        assert_eq!(generator.generate("trip", 1, Some("jpg")).unwrap(), "trip_1.jpg");
        assert_eq!(generator.generate("trip", 12, Some("tar.gz")).unwrap(), "trip_12.tar.gz");
        assert_eq!(generator.generate("trip", 3, None).unwrap(), "trip_3");
    }

    #[test]
    fn test_default_template_string_matches_builtin() {
        let parsed: NameGenerator = DEFAULT_TEMPLATE.parse().unwrap();
        let builtin = NameGenerator::default();
        for index in 1..5 {
            assert_eq!(
                parsed.generate("x", index, Some("png")).unwrap(),
                builtin.generate("x", index, Some("png")).unwrap()
            );
        }
    }

    #[test]
    fn test_custom_template() {
        let generator: NameGenerator = "{{ base }} ({{ index }})".parse().unwrap();
        assert_eq!(generator.generate("Trip", 4, Some("png")).unwrap(), "Trip (4).png");
    }

    #[test]
    fn test_invalid_template() {
        let err = "{{ base".parse::<NameGenerator>().unwrap_err();
        assert_eq!(*err, ErrorKind::Template);
        let generator: NameGenerator = "{{ nope }}".parse().unwrap();
        let err = generator.generate("x", 1, None).unwrap_err();
        assert_eq!(*err, ErrorKind::Template);
    }

    #[test]
    fn test_template_cannot_introduce_directories() {
        let generator: NameGenerator = "{{ base }}/{{ index }}".parse().unwrap();
        let err = generator.generate("x", 1, Some("jpg")).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidName("x/1.jpg".to_string()));
    }

    #[test]
    fn test_plan_is_sequential_and_idempotent() {
        let records = [
            record(1, "IMG_0001.jpg", "image/jpeg"),
            record(2, "notes", "text/plain"),
            record(3, "scan.final.PDF", "application/pdf"),
        ];
        let selection: Vec<_> = records.iter().collect();
        let first = plan(&NameGenerator::default(), "vacation", &selection).unwrap();
        let names: Vec<_> = first.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(names, ["vacation_1.jpg", "vacation_2", "vacation_3.PDF"]);
        assert_eq!(first[2].old_name, "scan.final.PDF");
        assert_eq!(first, plan(&NameGenerator::default(), "vacation", &selection).unwrap());
    }

    #[test]
    fn test_plan_empty_selection() {
        let err = plan(&NameGenerator::default(), "vacation", &[]).unwrap_err();
        assert_eq!(*err, ErrorKind::EmptySelection);
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        let generator: NameGenerator = "{{ base }}".parse().unwrap();
        let records = [record(1, "a.jpg", "image/jpeg"), record(2, "b.jpg", "image/jpeg")];
        let selection: Vec<_> = records.iter().collect();
        let err = plan(&generator, "same", &selection).unwrap_err();
        assert_eq!(*err, ErrorKind::DuplicateName("same.jpg".to_string()));
    }
}

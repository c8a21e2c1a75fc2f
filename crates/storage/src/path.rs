//! Path checks shared by every backend.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

fn has_nul(component: &std::ffi::OsStr) -> bool {
    component.as_encoded_bytes().contains(&0)
}

/// Resolve a backend-relative path, rejecting anything that would leave the
/// root.
///
/// `.` components and redundant separators are dropped and `..` is folded
/// into its parent. A leading `/` is ignored. Empty results, Windows
/// prefixes and NUL bytes are [`InvalidPath`](ErrorKind::InvalidPath).
///
/// ```
/// use renamr_storage::validate_path;
/// use std::path::Path;
///
/// assert_eq!(validate_path("trip/./day1//beach.jpg").unwrap(), Path::new("trip/day1/beach.jpg"));
/// assert_eq!(validate_path("trip/../history.json").unwrap(), Path::new("history.json"));
/// assert!(validate_path("trip/../../history.json").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut resolved: Vec<&std::ffi::OsStr> = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(part) if has_nul(part) => exn::bail!(invalid()),
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                if resolved.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
        }
    }
    if resolved.is_empty() {
        exn::bail!(invalid());
    }
    Ok(resolved.into_iter().collect())
}

/// Check that `name` is one plain file name with no directory part.
///
/// Generated names become archive entries and download targets, so a
/// separator, `.`, `..` or NUL is an [`InvalidPath`](ErrorKind::InvalidPath).
///
/// ```
/// use renamr_storage::validate_file_name;
///
/// assert!(validate_file_name("vacation_1.jpg").is_ok());
/// assert!(validate_file_name("trip/vacation_1.jpg").is_err());
/// ```
pub fn validate_file_name(name: &str) -> Result<&str> {
    if name.contains(['/', '\\']) {
        exn::bail!(ErrorKind::InvalidPath(PathBuf::from(name)));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if !has_nul(part) => Ok(name),
        _ => exn::bail!(ErrorKind::InvalidPath(PathBuf::from(name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("history.json", "history.json")]
    #[case("trip/day1/beach.jpg", "trip/day1/beach.jpg")]
    #[case("/trip/beach.jpg", "trip/beach.jpg")]
    #[case("trip//./beach.jpg/", "trip/beach.jpg")]
    #[case("trip/day1/..", "trip")]
    fn test_validate(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("/")]
    #[case("..")]
    #[case("../history.json")]
    #[case("trip/../../history.json")]
    #[case("trip/be\0ach.jpg")]
    fn test_validate_rejects(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[rstest]
    #[case("vacation_files.zip", true)]
    #[case("README", true)]
    #[case(".hidden", true)]
    #[case("", false)]
    #[case(".", false)]
    #[case("..", false)]
    #[case("trip/1.jpg", false)]
    #[case("trip\\1.jpg", false)]
    #[case("/1.jpg", false)]
    #[case("1\0.jpg", false)]
    fn test_validate_file_name(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(validate_file_name(name).is_ok(), valid);
    }
}

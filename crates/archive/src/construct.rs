use crate::Compression;
use crate::error::{Error, ErrorKind};
use std::path::Path;
use std::str::FromStr;

/// Local file header signature; the first bytes of any non-empty archive.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// End of central directory signature; the first bytes of an empty archive.
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

const ZIP_TYPES: [&str; 3] = ["application/zip", "application/x-zip-compressed", "application/x-zip"];

impl FromStr for Compression {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stored" | "store" | "none" => Ok(Compression::Stored),
            "deflate" | "deflated" => Ok(Compression::Deflate),
            #[cfg(feature = "bzip2")]
            "bz2" | "bzip2" => Ok(Compression::Bzip2),
            #[cfg(not(feature = "bzip2"))]
            "bz2" | "bzip2" => exn::bail!(ErrorKind::DisabledFormat(s.to_string())),
            #[cfg(feature = "zstd")]
            "zst" | "zstd" => Ok(Compression::Zstd),
            #[cfg(not(feature = "zstd"))]
            "zst" | "zstd" => exn::bail!(ErrorKind::DisabledFormat(s.to_string())),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Whether the file name carries a `.zip` extension (case-insensitive).
#[must_use]
pub fn is_archive_name(name: impl AsRef<Path>) -> bool {
    name.as_ref().extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Whether the declared MIME type is one of the ZIP aliases browsers and
/// operating systems hand out.
#[must_use]
pub fn is_archive_type(mime: &str) -> bool {
    let mime = mime.trim();
    ZIP_TYPES.iter().any(|t| t.eq_ignore_ascii_case(mime))
}

/// Whether `bytes` start with a ZIP signature.
///
/// Spanned and self-extracting archives are not detected.
#[must_use]
pub fn is_archive_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&ZIP_EMPTY_MAGIC)
}

/// Combined detection: name, then declared type, then magic bytes.
#[must_use]
pub fn is_archive(name: impl AsRef<Path>, declared_type: Option<&str>, head: &[u8]) -> bool {
    is_archive_name(name) || declared_type.is_some_and(is_archive_type) || is_archive_magic(head)
}

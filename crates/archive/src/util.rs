use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};
use zip::CompressionMethod;

// Moderate levels across the board: an archive is assembled once per
// download and the user is waiting on it.
const DEFLATE_LEVEL: u8 = 6;
#[cfg(feature = "bzip2")]
const BZIP2_LEVEL: u8 = 6;
#[cfg(feature = "zstd")]
const ZSTD_LEVEL: u8 = 3;

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Compression {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl Compression {
    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Stored => "stored",
            Compression::Deflate => "deflate",
            #[cfg(feature = "bzip2")]
            Compression::Bzip2 => "bzip2",
            #[cfg(feature = "zstd")]
            Compression::Zstd => "zstd",
        }
    }

    /// The ZIP compression method written into each entry header.
    #[must_use]
    pub fn method(&self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflate => CompressionMethod::Deflated,
            #[cfg(feature = "bzip2")]
            Compression::Bzip2 => CompressionMethod::Bzip2,
            #[cfg(feature = "zstd")]
            Compression::Zstd => CompressionMethod::Zstd,
        }
    }

    /// Compression level for the method, `None` when the method has no levels.
    #[must_use]
    pub fn level(&self) -> Option<u8> {
        match self {
            Compression::Stored => None,
            Compression::Deflate => Some(DEFLATE_LEVEL),
            #[cfg(feature = "bzip2")]
            Compression::Bzip2 => Some(BZIP2_LEVEL),
            #[cfg(feature = "zstd")]
            Compression::Zstd => Some(ZSTD_LEVEL),
        }
    }
}

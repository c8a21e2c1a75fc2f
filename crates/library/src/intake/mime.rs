//! MIME type resolution from file names.

pub const OCTET_STREAM: &str = "application/octet-stream";

/// The substring after the last `.` of a file name, if there is one.
///
/// A name without a dot, or ending in one, has no extension.
pub fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext).filter(|ext| !ext.is_empty())
}

/// MIME type for a file extension (case-insensitive).
pub fn from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        "rar" => "application/vnd.rar",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "xml" => "application/xml",
        _ => OCTET_STREAM,
    }
}

/// Declared type when present and non-empty, otherwise derived from the name.
pub fn resolve(name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim).filter(|declared| !declared.is_empty()) {
        Some(declared) => declared.to_string(),
        None => extension(name).map_or(OCTET_STREAM, from_extension).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.jpg", Some("jpg"))]
    #[case("archive.tar.gz", Some("gz"))]
    #[case(".bashrc", Some("bashrc"))]
    #[case("README", None)]
    #[case("trailing.", None)]
    fn test_extension(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(extension(name), expected);
    }

    #[rstest]
    #[case("IMG_0001.JPG", None, "image/jpeg")]
    #[case("clip.MoV", None, "video/quicktime")]
    #[case("report.docx", None, "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    #[case("index.htm", None, "text/html")]
    #[case("mystery.xyz", None, "application/octet-stream")]
    #[case("no-extension", None, "application/octet-stream")]
    #[case("photo.jpg", Some("image/webp"), "image/webp")]
    #[case("photo.jpg", Some(""), "image/jpeg")]
    #[case("photo.jpg", Some("   "), "image/jpeg")]
    fn test_resolve(#[case] name: &str, #[case] declared: Option<&str>, #[case] expected: &str) {
        assert_eq!(resolve(name, declared), expected);
    }
}

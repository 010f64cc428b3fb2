//! Content-Type lookup for served files.

use std::path::Path;

pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const SVG: &str = "image/svg+xml";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Extensions → Content-Type. Extensions are lowercase.
const BY_EXTENSION: &[(&[&str], &str)] = &[
    (&["html", "htm"], types::HTML),
    (&["css"], types::CSS),
    (&["js", "mjs"], "text/javascript; charset=utf-8"),
    (&["json", "map", "webmanifest"], types::JSON),
    (&["xml", "rss", "atom"], "application/xml"),
    (&["txt", "md"], types::PLAIN),
    (&["png"], "image/png"),
    (&["jpg", "jpeg"], "image/jpeg"),
    (&["gif"], "image/gif"),
    (&["webp"], "image/webp"),
    (&["avif"], "image/avif"),
    (&["svg"], types::SVG),
    (&["ico"], "image/x-icon"),
    (&["woff"], "font/woff"),
    (&["woff2"], "font/woff2"),
    (&["ttf"], "font/ttf"),
    (&["otf"], "font/otf"),
    (&["pdf"], "application/pdf"),
    (&["mp4"], "video/mp4"),
    (&["webm"], "video/webm"),
];

/// Guess the Content-Type from a file extension (case-insensitive).
pub fn from_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return types::OCTET_STREAM;
    };
    let ext = ext.to_ascii_lowercase();

    BY_EXTENSION
        .iter()
        .find(|(extensions, _)| extensions.contains(&ext.as_str()))
        .map_or(types::OCTET_STREAM, |(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(from_path(Path::new("INDEX.HTM")), types::HTML);
        assert_eq!(from_path(Path::new("style/main.css")), types::CSS);
        assert_eq!(from_path(Path::new("logo.svg")), types::SVG);
        assert_eq!(from_path(Path::new("content.json")), types::JSON);
        assert_eq!(from_path(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(from_path(Path::new("unknown.xyz")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new("Makefile")), types::OCTET_STREAM);
    }
}

//! Content record → site path resolution.
//!
//! | Record                               | Path                                  |
//! |--------------------------------------|---------------------------------------|
//! | broken                               | none (link is omitted)                |
//! | `home`, listing entry                | `/index.html`                         |
//! | `home`, bare link                    | `/`                                   |
//! | `blog-post/my-second-blog-post`, listing | `/blog-post/my-second-blog-post/index.html` |
//! | `author/bob`, bare link              | `/author/bob/`                        |
//!
//! Listing entries get an explicit `index.html` because their path is also
//! the output file path. Bare links stay directory-style.

use crate::content::ContentRecord;

/// Record type whose pages live at the site root.
const HOME_TYPE: &str = "home";

/// File name for records rendered as full pages.
const LISTING_FILENAME: &str = "index.html";

/// Maps a content record to its site-relative path.
///
/// Implementations must be deterministic: the same record always yields the
/// same path, independent of any other record.
pub trait LinkResolver: Send + Sync {
    fn resolve(&self, record: &ContentRecord) -> Option<String>;
}

impl<F> LinkResolver for F
where
    F: Fn(&ContentRecord) -> Option<String> + Send + Sync,
{
    fn resolve(&self, record: &ContentRecord) -> Option<String> {
        self(record)
    }
}

/// The default resolver: `/<type>/<uid>/` for links, `/<type>/<uid>/index.html` for pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentLinkResolver;

impl LinkResolver for DocumentLinkResolver {
    fn resolve(&self, record: &ContentRecord) -> Option<String> {
        resolve_document_link(record)
    }
}

/// Resolve a record to its canonical path. `None` for broken records.
pub fn resolve_document_link(record: &ContentRecord) -> Option<String> {
    if record.is_broken {
        return None;
    }

    let filename = if record.is_listing_entry() {
        LISTING_FILENAME
    } else {
        ""
    };

    let path = match record.record_type.as_str() {
        HOME_TYPE => format!("/{filename}"),
        record_type => format!("/{record_type}/{}/{filename}", record.identifier()),
    };
    Some(path)
}

/// Turn a resolved path into an output file key.
///
/// `/blog-post/x/index.html` → `blog-post/x/index.html`, `/author/bob/` →
/// `author/bob/index.html`, `/` → `index.html`.
pub fn output_path(resolved: &str) -> String {
    let trimmed = resolved.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        format!("{trimmed}{LISTING_FILENAME}")
    } else {
        trimmed.to_string()
    }
}

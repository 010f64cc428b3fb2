//! Root-relative link rewriting for deployable builds.
//!
//! The output may be served from any sub-path, so `href="/..."` is rewritten
//! relative to each file's own depth:
//!
//! | File                     | `href="/style/main.css"` becomes      |
//! |--------------------------|---------------------------------------|
//! | `index.html`             | `href="./style/main.css"`             |
//! | `blog/index.html`        | `href=".././style/main.css"`          |
//! | `blog/post-1/index.html` | `href="../.././style/main.css"`       |
//!
//! The prefix always ends in `.`, so the rewritten path keeps a `./`
//! segment. Browsers resolve it the same as without.
//!
//! This is plain byte substitution. It does not parse HTML, so occurrences
//! inside code samples or scripts are rewritten too.

use std::borrow::Cow;
use std::sync::LazyLock;

use anyhow::Result;
use regex::bytes::{NoExpand, Regex};

use crate::pipeline::{Files, PipelineContext, Stage};

const ROOT_HREF: &str = r#"href="/"#;

static ROOT_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&regex::escape(ROOT_HREF)).unwrap());

/// Number of `/` separators in an output path.
pub fn path_depth(path: &str) -> usize {
    path.bytes().filter(|&b| b == b'/').count()
}

/// `.` preceded by `../` once per level: `.`, `../.`, `../../.`.
pub fn path_prefix(depth: usize) -> String {
    let mut prefix = "../".repeat(depth);
    prefix.push('.');
    prefix
}

/// Rewrite every `href="/` in `contents` for a file `depth` levels deep.
/// Contents without a match are returned borrowed.
pub fn rewrite_root_hrefs(contents: &[u8], depth: usize) -> Cow<'_, [u8]> {
    let replacement = format!(r#"href="{}/"#, path_prefix(depth));
    ROOT_HREF_RE.replace_all(contents, NoExpand(replacement.as_bytes()))
}

pub struct DeployStage;

impl Stage for DeployStage {
    fn name(&self) -> &str {
        "deploy"
    }

    fn run(&self, files: &mut Files, _ctx: &PipelineContext<'_>) -> Result<()> {
        for (path, file) in files.iter_mut() {
            if let Cow::Owned(rewritten) = rewrite_root_hrefs(&file.contents, path_depth(path)) {
                file.contents = rewritten;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::ContentStore;
    use crate::link::DocumentLinkResolver;
    use crate::pipeline::OutputFile;

    const LINK: &str = r#"<link rel="stylesheet" href="/style/main.css">"#;

    #[test]
    fn test_path_depth_and_prefix() {
        assert_eq!(path_depth("index.html"), 0);
        assert_eq!(path_depth("blog/post-1/index.html"), 2);
        assert_eq!(path_prefix(0), ".");
        assert_eq!(path_prefix(1), "../.");
        assert_eq!(path_prefix(2), "../../.");
    }

    #[test]
    fn test_rewrite_nested() {
        let out = rewrite_root_hrefs(LINK.as_bytes(), path_depth("blog/post-1/index.html"));
        assert_eq!(
            out.as_ref(),
            br#"<link rel="stylesheet" href="../.././style/main.css">"#
        );
    }

    #[test]
    fn test_rewrite_root() {
        let out = rewrite_root_hrefs(LINK.as_bytes(), 0);
        assert_eq!(out.as_ref(), br#"<link rel="stylesheet" href="./style/main.css">"#);
    }

    #[test]
    fn test_rewrites_every_occurrence() {
        let src = br#"<a href="/">home</a><a href="/about/">about</a>"#;
        let out = rewrite_root_hrefs(src, 1);
        assert_eq!(
            out.as_ref(),
            br#"<a href=".././">home</a><a href=".././about/">about</a>"#
        );
    }

    #[test]
    fn test_untouched_is_borrowed() {
        let src = br#"<a href="https://example.com/">x</a><a href='/single'>y</a>"#;
        let out = rewrite_root_hrefs(src, 3);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), src);
    }

    #[test]
    fn test_dollar_in_prefix_is_literal() {
        // replacement is never interpreted as a capture reference
        let out = rewrite_root_hrefs(br#"href="/$1""#, 0);
        assert_eq!(out.as_ref(), br#"href="./$1""#);
    }

    #[test]
    fn test_stage_rewrites_all_files() {
        let mut files = Files::new();
        files.insert("index.html", OutputFile::new(LINK));
        files.insert("blog/post-1/index.html", OutputFile::new(LINK));
        files.insert("style/main.css", OutputFile::new("a { color: red }"));

        let config = SiteConfig::default();
        let content = ContentStore::default();
        let ctx = PipelineContext::new(&config, &content, &DocumentLinkResolver);
        DeployStage.run(&mut files, &ctx).unwrap();

        assert!(files.get("index.html").unwrap().text().unwrap().contains(r#"href="./style"#));
        assert!(
            files
                .get("blog/post-1/index.html")
                .unwrap()
                .text()
                .unwrap()
                .contains(r#"href="../.././style"#)
        );
        assert_eq!(files.get("style/main.css").unwrap().text(), Some("a { color: red }"));
    }
}

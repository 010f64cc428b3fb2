//! Built-in stages.
//!
//! | Stage         | Group    | Effect                                            |
//! |---------------|----------|---------------------------------------------------|
//! | `markdown`    | common   | `*.md` → `*.html` via pulldown-cmark              |
//! | `collections` | common   | content records → one page per record             |
//! | `layouts`     | common   | wrap pages in tera layouts (helpers injected)     |
//! | `sass`        | common   | non-partial `*.scss` → `style/<stem>.css` (grass) |
//! | `style`       | common   | vendor-prefix CSS for the configured browsers     |
//! | `beautify`    | common   | normalize HTML/CSS indentation and line endings   |
//! | `ignore`      | common   | drop files matching `[build] ignore` globs        |
//! | `deploy`      | deploy   | root-relative `href`s → file-relative             |

mod beautify;
mod collections;
mod deploy;
mod ignore;
mod layouts;
mod markdown;
mod sass;
mod style;

pub use beautify::BeautifyStage;
pub use collections::{CollectionsStage, collections_value};
pub use deploy::DeployStage;
pub use ignore::IgnoreStage;
pub use layouts::LayoutsStage;
pub use markdown::MarkdownStage;
pub use sass::SassStage;
pub use style::StyleStage;

use anyhow::Result;
use glob::MatchOptions;

use super::{COMMON_GROUP, DEPLOY_GROUP, Pipeline};
use crate::config::SiteConfig;
use crate::helpers::HelperRegistry;

/// Glob options shared by path-matching stages: `*` stops at `/`.
pub(crate) const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Extension of a forward-slash path, lowercased.
pub(crate) fn extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Assemble the standard stage groups from config.
///
/// `helpers` is installed into the layouts renderer only.
pub fn standard_pipeline(config: &SiteConfig, helpers: &HelperRegistry) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new()
        .with_group(COMMON_GROUP)
        .with_group(DEPLOY_GROUP);

    if config.markdown.enable {
        pipeline.push(COMMON_GROUP, MarkdownStage::new(&config.markdown));
    }
    pipeline.push(COMMON_GROUP, CollectionsStage);
    if config.layouts.enable {
        pipeline.push(COMMON_GROUP, LayoutsStage::new(&config.layouts, helpers)?);
    }
    if config.sass.enable {
        pipeline.push(COMMON_GROUP, SassStage::new(&config.sass));
    }
    if config.style.enable {
        pipeline.push(COMMON_GROUP, StyleStage::new(&config.style)?);
    }
    if config.beautify.enable {
        pipeline.push(COMMON_GROUP, BeautifyStage::new(&config.beautify));
    }
    if !config.build.ignore.is_empty() {
        pipeline.push(COMMON_GROUP, IgnoreStage::new(&config.build.ignore)?);
    }

    if config.deploy.relative_links {
        pipeline.push(DEPLOY_GROUP, DeployStage);
    }

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("a/b/post.MD").as_deref(), Some("md"));
        assert_eq!(extension("style.css").as_deref(), Some("css"));
        assert_eq!(extension("a.b/README"), None);
        assert_eq!(extension(".hidden"), None);
    }

    #[test]
    fn test_standard_pipeline_groups() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.layouts.directory = dir.path().join("layouts");
        config.layouts.partials = dir.path().join("partials");

        let pipeline = standard_pipeline(&config, &HelperRegistry::with_defaults()).unwrap();
        assert_eq!(
            pipeline.group(COMMON_GROUP).unwrap().stage_names(),
            vec!["markdown", "collections", "layouts", "sass", "style", "beautify", "ignore"]
        );
        assert_eq!(
            pipeline.group(DEPLOY_GROUP).unwrap().stage_names(),
            vec!["deploy"]
        );
    }

    #[test]
    fn test_deploy_group_empty_without_relative_links() {
        let mut config = SiteConfig::default();
        config.layouts.enable = false;
        config.deploy.relative_links = false;

        let pipeline = standard_pipeline(&config, &HelperRegistry::with_defaults()).unwrap();
        assert!(pipeline.group(DEPLOY_GROUP).unwrap().stage_names().is_empty());
    }
}

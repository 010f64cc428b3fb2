//! Site building orchestration.
//!
//! Build phases:
//! - **Load** - Walk the source directory, split frontmatter into metadata
//! - **Content** - Read content records
//! - **Pipeline** - Run `common` plus the command's extra groups
//! - **Write** - Clean the output directory and write every file in parallel

use crate::{
    config::SiteConfig,
    content::ContentStore,
    debug,
    helpers::HelperRegistry,
    link::DocumentLinkResolver,
    log,
    pipeline::{Files, OutputFile, PipelineContext, frontmatter, stage::standard_pipeline},
    utils::{path::relative_key, plural::plural_count},
};
use anyhow::{Context, Result};
use jwalk::WalkDir;
use rayon::prelude::*;
use std::{fs, path::Path, time::Instant};

/// Build the site into `[build] output`.
///
/// `extra_groups` run after `common` (`deploy` for `lathe build`).
/// Returns the number of files written.
pub fn build_site(config: &SiteConfig, extra_groups: &[&str], quiet: bool) -> Result<usize> {
    let started = Instant::now();

    let mut files = load_sources(&config.build.source, &config.build.output)?;
    debug!("build"; "loaded {}", plural_count(files.len(), "source file"));

    let content = ContentStore::load(&config.content.records)?;
    if !content.is_empty() {
        debug!("build"; "loaded {}", plural_count(content.len(), "content record"));
    }

    let helpers = HelperRegistry::with_defaults();
    let pipeline = standard_pipeline(config, &helpers)?;
    let ctx = PipelineContext::new(config, &content, &DocumentLinkResolver);
    pipeline.run(&mut files, &ctx, extra_groups)?;

    let count = files.len();
    write_output(files, &config.build.output, config.build.clean)?;

    if !quiet {
        log!(
            "build";
            "wrote {} to {} in {:.2?}",
            plural_count(count, "file"),
            config.root_relative(&config.build.output).display(),
            started.elapsed()
        );
    }
    Ok(count)
}

// ============================================================================
// Load
// ============================================================================

/// Read every non-hidden file under `source` into the output set.
///
/// Anything under `output` is skipped so an output directory nested in the
/// sources never feeds back into the build.
pub fn load_sources(source: &Path, output: &Path) -> Result<Files> {
    let mut files = Files::new();

    for entry in WalkDir::new(source)
        .skip_hidden(false)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.starts_with(output) {
            continue;
        }
        let Some(key) = relative_key(&path, source) else {
            continue;
        };
        if key.split('/').any(|part| part.starts_with('.')) {
            continue;
        }

        let bytes =
            fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        files.insert(&key, load_file(bytes).with_context(|| format!("Invalid frontmatter in {key}"))?);
    }

    Ok(files)
}

/// Split frontmatter off UTF-8 files; binary files pass through untouched.
fn load_file(bytes: Vec<u8>) -> Result<OutputFile> {
    let Ok(text) = std::str::from_utf8(&bytes) else {
        return Ok(OutputFile::new(bytes));
    };

    let (metadata, body) = frontmatter::extract(text)?;
    if metadata.is_empty() && body.len() == text.len() {
        return Ok(OutputFile::new(bytes));
    }
    Ok(OutputFile::new(body).with_metadata(metadata))
}

// ============================================================================
// Write
// ============================================================================

/// Write `files` below `output`, removing it first when `clean` is set.
pub fn write_output(files: Files, output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clean {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let files: Vec<(String, OutputFile)> = files.into_iter().collect();
    files.par_iter().try_for_each(|(key, file)| {
        let path = output.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DEPLOY_GROUP;

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load_sources_skips_hidden_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "index.md", "---\ntitle: Home\n---\n# Hi\n");
        write(root, "style/main.css", "a{}");
        write(root, ".git/HEAD", "ref");
        write(root, "build/old.html", "stale");

        let files = load_sources(root, &root.join("build")).unwrap();
        assert_eq!(files.paths(), vec!["index.md", "style/main.css"]);

        let index = files.get("index.md").unwrap();
        assert_eq!(index.meta_str("title"), Some("Home"));
        assert_eq!(index.text(), Some("# Hi\n"));
    }

    #[test]
    fn test_load_file_binary_untouched() {
        let bytes = vec![0xff, 0xfe, b'-', b'-', b'-'];
        let file = load_file(bytes.clone()).unwrap();
        assert_eq!(file.contents, bytes);
        assert!(file.metadata.is_empty());
    }

    #[test]
    fn test_load_sources_names_bad_frontmatter() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "post.md", "+++\ntitle = \n+++\nbody");

        let err = load_sources(dir.path(), &dir.path().join("build")).unwrap_err();
        assert!(format!("{err:#}").contains("post.md"));
    }

    #[test]
    fn test_write_output_cleans() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("build");
        write(&output, "stale.html", "old");

        let mut files = Files::new();
        files.insert("a/b/index.html", OutputFile::new("new"));
        write_output(files.clone(), &output, true).unwrap();
        assert!(!output.join("stale.html").exists());
        assert_eq!(fs::read_to_string(output.join("a/b/index.html")).unwrap(), "new");

        write(&output, "kept.html", "old");
        write_output(files, &output, false).unwrap();
        assert!(output.join("kept.html").exists());
    }

    #[test]
    fn test_build_site_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/index.md", "---\ntitle: Home\n---\n[style](/style/main.css)\n");
        write(root, "src/blog/post/index.md", "---\ntitle: Post\n---\n<a href=\"/index.html\">home</a>\n");
        write(root, "src/style/main.css", "a { color: red; }\n");
        write(root, "src/style/_vars.scss", "$accent: red;\n");
        write(root, "src/style/theme.scss", "@import 'vars';\nb { color: $accent; }\n");
        write(
            root,
            "layouts/default.html",
            "<html>\n  <head><title>{{ title | striptags }}</title></head>\n  <body>{{ contents | safe }}</body>\n</html>\n",
        );
        write(
            root,
            "content.json",
            r#"[{"type": "author", "uid": "bob", "data": {"name": "Bob"}}]"#,
        );

        let mut config = crate::config::test_parse_config("[layouts]\ndefault = \"default.html\"");
        config.normalize_paths(root);

        let count = build_site(&config, &[DEPLOY_GROUP], true).unwrap();
        let output = root.join("build");
        assert_eq!(count, 4);
        assert!(!output.join("style/_vars.scss").exists());
        assert!(!output.join("style/theme.scss").exists());
        let theme = fs::read_to_string(output.join("style/theme.css")).unwrap();
        assert!(theme.contains("color: red"));

        let index = fs::read_to_string(output.join("index.html")).unwrap();
        assert!(index.contains("<title>Home</title>"));
        assert!(index.contains("href=\"./style/main.css\""));

        let post = fs::read_to_string(output.join("blog/post/index.html")).unwrap();
        assert!(post.contains("href=\"../.././index.html\""));
        assert!(post.ends_with("</html>\n"));
    }
}

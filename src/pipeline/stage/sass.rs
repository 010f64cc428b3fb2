//! Sass compilation via grass.
//!
//! Every `*.scss` file whose name does not start with `_` compiles to
//! `<output_dir>/<stem>.css`. Partials are only reachable through `@use` or
//! `@import`, resolved on disk from the file's own source directory first,
//! then `[sass] load_paths`. The `.scss` sources stay in the set for the
//! ignore stage to drop.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use super::extension;
use crate::config::SassConfig;
use crate::debug;
use crate::pipeline::{Files, OutputFile, PipelineContext, Stage};

pub struct SassStage {
    output_dir: String,
    load_paths: Vec<PathBuf>,
}

impl SassStage {
    pub fn new(config: &SassConfig) -> Self {
        Self {
            output_dir: config.output_dir.trim_matches('/').to_string(),
            load_paths: config.load_paths.clone(),
        }
    }

    /// Compilable entry point: a `.scss` file that is not a partial.
    pub fn is_entry(path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        extension(path).as_deref() == Some("scss") && !name.starts_with('_')
    }

    /// `scss/theme/main.scss` → `<output_dir>/main.css`.
    pub fn output_path(&self, path: &str) -> String {
        let name = path.rsplit('/').next().unwrap_or(path);
        let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
        match self.output_dir.as_str() {
            "" | "." => format!("{stem}.css"),
            dir => format!("{dir}/{stem}.css"),
        }
    }

    /// Compile `source`, resolving imports from `dir` before the configured
    /// load paths.
    pub fn compile(&self, path: &str, source: &str, dir: &Path) -> Result<String> {
        let options = self
            .load_paths
            .iter()
            .fold(grass::Options::default().load_path(dir), |options, path| {
                options.load_path(path)
            });
        grass::from_string(source.to_string(), &options).map_err(|e| anyhow!("`{}`: {}", path, e))
    }
}

impl Stage for SassStage {
    fn name(&self) -> &str {
        "sass"
    }

    fn run(&self, files: &mut Files, ctx: &PipelineContext<'_>) -> Result<()> {
        let source_root = &ctx.config.build.source;

        for path in files.paths() {
            if !Self::is_entry(&path) {
                continue;
            }
            let Some(file) = files.get(&path) else {
                continue;
            };
            let source = file
                .text()
                .ok_or_else(|| anyhow!("`{path}` is not valid UTF-8"))?;
            let dir = match path.rsplit_once('/') {
                Some((parent, _)) => source_root.join(parent),
                None => source_root.clone(),
            };

            let css = self.compile(&path, source, &dir)?;
            let output = self.output_path(&path);
            debug!("sass"; "{} -> {}", path, output);
            files.insert(&output, OutputFile::new(css));
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
    use std::fs;

    #[test]
    fn test_is_entry() {
        assert!(SassStage::is_entry("style/main.scss"));
        assert!(SassStage::is_entry("main.SCSS"));
        assert!(!SassStage::is_entry("style/_vars.scss"));
        assert!(!SassStage::is_entry("style/main.css"));
    }

    #[test]
    fn test_output_path() {
        let stage = SassStage::new(&SassConfig::default());
        assert_eq!(stage.output_path("scss/theme/main.scss"), "style/main.css");
        assert_eq!(stage.output_path("print.scss"), "style/print.css");

        let stage = SassStage::new(&SassConfig {
            output_dir: "./".into(),
            ..SassConfig::default()
        });
        assert_eq!(stage.output_path("scss/main.scss"), "main.css");
    }

    #[test]
    fn test_compiles_with_partials_next_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let scss_dir = dir.path().join("scss");
        fs::create_dir_all(&scss_dir).unwrap();
        let main = "@import 'vars';\n.a { color: $accent; .b { margin: 0; } }\n";
        fs::write(scss_dir.join("_vars.scss"), "$accent: red;\n").unwrap();
        fs::write(scss_dir.join("main.scss"), main).unwrap();

        let mut files = Files::new();
        files.insert("scss/main.scss", OutputFile::new(main));
        files.insert("scss/_vars.scss", OutputFile::new("$accent: red;\n"));

        let mut config = SiteConfig::default();
        config.build.source = dir.path().to_path_buf();
        let content = ContentStore::default();
        let ctx = PipelineContext::new(&config, &content, &DocumentLinkResolver);
        SassStage::new(&config.sass).run(&mut files, &ctx).unwrap();

        let css = files.get("style/main.css").unwrap().text().unwrap();
        assert!(css.contains("color: red"));
        assert!(css.contains(".a .b"));
        assert!(!files.contains("style/_vars.css"));
        assert!(files.contains("scss/main.scss"));
    }

    #[test]
    fn test_configured_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("_theme.scss"), "$pad: 4px;\n").unwrap();

        let stage = SassStage::new(&SassConfig {
            load_paths: vec![shared],
            ..SassConfig::default()
        });
        let css = stage
            .compile("main.scss", "@import 'theme';\np { padding: $pad; }", dir.path())
            .unwrap();
        assert!(css.contains("padding: 4px"));
    }

    #[test]
    fn test_syntax_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let stage = SassStage::new(&SassConfig::default());
        let err = stage
            .compile("style/broken.scss", ".a { color: $missing; }", dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("style/broken.scss"));
    }
}

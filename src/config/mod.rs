//! Site configuration management for `lathe.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One module per TOML section
//! ├── types/         # ConfigError, diagnostics, field paths
//! ├── util.rs        # Config file discovery
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section       | Purpose                                           |
//! |---------------|---------------------------------------------------|
//! | `[site]`      | Title, url and free-form values for templates     |
//! | `[build]`     | Source and output directories, ignore globs       |
//! | `[markdown]`  | Markdown extensions                               |
//! | `[layouts]`   | Template directories, matching pattern, default   |
//! | `[sass]`      | Sass output directory and load paths              |
//! | `[style]`     | Browser targets for CSS prefixing                 |
//! | `[beautify]`  | Output indentation                                |
//! | `[content]`   | Content record export                             |
//! | `[serve]`     | Development server (interface, port, watch)       |
//! | `[deploy]`    | Deployable build rewriting                        |
//!
//! Every path is relative to the directory holding `lathe.toml`. Without a
//! config file, defaults apply relative to the current directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BeautifyConfig, BuildConfig, ContentConfig, DeployConfig, LayoutsConfig, MarkdownConfig,
    SassConfig, ServeConfig, SiteSection, StyleConfig,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::utils::path::normalize_path;
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Config file looked up when `-C` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "lathe.toml";

/// Root configuration structure representing lathe.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file; empty when running on defaults.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root: the config file's directory.
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub markdown: MarkdownConfig,

    #[serde(default)]
    pub layouts: LayoutsConfig,

    #[serde(default)]
    pub sass: SassConfig,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub beautify: BeautifyConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory. Without `lathe.toml` the defaults apply
    /// from cwd; a missing `-C` file is an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, root) = match find_config_file(&cli.config) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                (
                    Self {
                        config_path: normalize_path(&path),
                        ..config
                    },
                    root,
                )
            }
            None if cli.config != Path::new(DEFAULT_CONFIG_NAME) => {
                return Err(ConfigError::Validation(format!(
                    "config file `{}` not found",
                    cli.config.display()
                ))
                .into());
            }
            None => {
                debug!("config"; "{} not found, using defaults", DEFAULT_CONFIG_NAME);
                (Self::default(), cwd)
            }
        };

        config.finalize(cli, &root);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    pub fn get_root(&self) -> &Path {
        &self.root
    }

    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Path relative to the site root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Everything a rebuild depends on, for the dev watcher.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.build.source.clone()];
        if self.layouts.enable {
            paths.push(self.layouts.directory.clone());
            paths.push(self.layouts.partials.clone());
        }
        paths.push(self.content.records.clone());
        if self.sass.enable {
            paths.extend(self.sass.load_paths.iter().cloned());
        }
        if !self.config_path.as_os_str().is_empty() {
            paths.push(self.config_path.clone());
        }
        paths.retain(|path| path.exists());
        paths.dedup();
        paths
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn finalize(&mut self, cli: &Cli, root: &Path) {
        Self::update_option(&mut self.build.source, cli.source.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.normalize_paths(root);
        self.apply_command_options(cli);
    }

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Dev {
                build_args,
                interface,
                port,
                watch,
            } => {
                self.apply_build_args(build_args);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
            Commands::Prod {
                build_args,
                interface,
                port,
            } => {
                self.apply_build_args(build_args);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                self.serve.watch = false;
            }
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);
        Self::update_option(&mut self.build.clean, args.clean.as_ref());
        Self::update_option(&mut self.style.minify, args.minify.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Make every configured path absolute against `root`.
    pub(crate) fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);
        let join = |path: &Path| normalize_path(&root.join(path));

        self.build.source = join(&self.build.source);
        self.build.output = join(&self.build.output);
        self.layouts.directory = join(&self.layouts.directory);
        self.layouts.partials = join(&self.layouts.partials);
        self.content.records = join(&self.content.records);
        self.sass.load_paths = self.sass.load_paths.iter().map(|p| join(p)).collect();
        self.set_root(&root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.layouts.validate(&mut diag);
        self.sass.validate(&mut diag);
        self.style.validate(&mut diag);
        self.beautify.validate(&mut diag);
        self.serve.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config with a minimal `[site]` table.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let config = format!("[site]\ntitle = \"Test\"\n{extra}");
    let (parsed, ignored) = SiteConfig::parse_with_ignored(&config).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

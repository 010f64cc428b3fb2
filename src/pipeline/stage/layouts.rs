//! Layout rendering with tera.
//!
//! Templates come from `[layouts] directory`, includable fragments from
//! `[layouts] partials`. Both are named by their path relative to their own
//! directory (`post.html`, `blog/card.html`).
//!
//! A page picks its layout with `layout = "post.html"` in frontmatter, or
//! falls back to `[layouts] default`. The template sees:
//!
//! | Variable      | Value                                        |
//! |---------------|----------------------------------------------|
//! | *(metadata)*  | every frontmatter / stage key of the page    |
//! | `contents`    | page body (use `{{ contents \| safe }}`)      |
//! | `path`        | output path of the page                      |
//! | `site`        | `[site]` table                               |
//! | `collections` | record type → annotated records              |

use std::path::Path;

use anyhow::{Context as _, Result, anyhow};
use glob::Pattern;
use jwalk::WalkDir;
use tera::{Context, Tera};

use super::{MATCH_OPTIONS, collections_value};
use crate::config::LayoutsConfig;
use crate::debug;
use crate::helpers::HelperRegistry;
use crate::pipeline::{Files, PipelineContext, Stage};

const LAYOUT_KEY: &str = "layout";

pub struct LayoutsStage {
    tera: Tera,
    pattern: Pattern,
    default: Option<String>,
}

/// `(name, source)` for every file under `dir`. A missing directory is empty.
fn load_templates(dir: &Path) -> Result<Vec<(String, String)>> {
    if !dir.is_dir() {
        debug!("layouts"; "no templates at {}", dir.display());
        return Ok(Vec::new());
    }

    let mut templates = Vec::new();
    for entry in WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let name = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        templates.push((name, source));
    }
    Ok(templates)
}

impl LayoutsStage {
    pub fn new(config: &LayoutsConfig, helpers: &HelperRegistry) -> Result<Self> {
        // partials first so a layout of the same name wins
        let mut templates = load_templates(&config.partials)?;
        templates.extend(load_templates(&config.directory)?);
        Self::from_templates(templates, config, helpers)
    }

    /// Build from in-memory templates.
    pub fn from_templates<I>(templates: I, config: &LayoutsConfig, helpers: &HelperRegistry) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape_html);
        helpers.install(&mut tera);
        tera.add_raw_templates(templates)
            .map_err(|e| anyhow!("Failed to load layouts: {}", tera_chain(&e)))?;

        let pattern = Pattern::new(&config.pattern)
            .map_err(|e| anyhow!("invalid layouts pattern `{}`: {}", config.pattern, e))?;

        Ok(Self {
            tera,
            pattern,
            default: config.default.clone(),
        })
    }

    fn layout_for<'a>(&'a self, path: &str, layout: Option<&'a str>) -> Option<&'a str> {
        if !self.pattern.matches_with(path, MATCH_OPTIONS) {
            return None;
        }
        layout.or(self.default.as_deref())
    }
}

/// HTML escaping that leaves `/` alone, so printed URLs stay `href="/..."`
/// for the deploy rewrite.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            _ => out.push(c),
        }
    }
    out
}

/// tera puts the useful detail in the source chain.
fn tera_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl Stage for LayoutsStage {
    fn name(&self) -> &str {
        "layouts"
    }

    fn run(&self, files: &mut Files, ctx: &PipelineContext<'_>) -> Result<()> {
        let site = ctx.site_metadata();
        let collections = collections_value(ctx);

        for (path, file) in files.iter_mut() {
            let Some(layout) = self.layout_for(path, file.meta_str(LAYOUT_KEY)) else {
                continue;
            };
            let layout = layout.to_string();

            let contents = file
                .text()
                .ok_or_else(|| anyhow!("`{path}` is not valid UTF-8"))?;

            let mut context = Context::new();
            for (key, value) in &file.metadata {
                context.insert(key, value);
            }
            context.insert("contents", contents);
            context.insert("path", path);
            context.insert("site", &site);
            context.insert("collections", &collections);

            let rendered = self.tera.render(&layout, &context).map_err(|e| {
                anyhow!("Failed to render `{}` with layout `{}`: {}", path, layout, tera_chain(&e))
            })?;
            debug!("layouts"; "{} ← {}", path, layout);
            file.set_text(rendered);
        }
        Ok(())
    }
}

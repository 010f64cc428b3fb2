//! Markdown → HTML.

use anyhow::Result;
use pulldown_cmark::{Options, Parser, html};

use super::extension;
use crate::config::MarkdownConfig;
use crate::pipeline::{Files, PipelineContext, Stage};

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

pub struct MarkdownStage {
    options: Options,
}

impl MarkdownStage {
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        let flags = [
            (config.tables, Options::ENABLE_TABLES),
            (config.footnotes, Options::ENABLE_FOOTNOTES),
            (config.strikethrough, Options::ENABLE_STRIKETHROUGH),
            (config.task_lists, Options::ENABLE_TASKLISTS),
            (config.smart_punctuation, Options::ENABLE_SMART_PUNCTUATION),
            (config.heading_attributes, Options::ENABLE_HEADING_ATTRIBUTES),
        ];
        for (enabled, flag) in flags {
            if enabled {
                options.insert(flag);
            }
        }
        Self { options }
    }

    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// `a/post.md` → `a/post.html`.
fn html_path(path: &str) -> String {
    match path.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.html"),
        None => format!("{path}.html"),
    }
}

impl Stage for MarkdownStage {
    fn name(&self) -> &str {
        "markdown"
    }

    fn run(&self, files: &mut Files, _ctx: &PipelineContext<'_>) -> Result<()> {
        for path in files.paths() {
            let is_markdown = extension(&path)
                .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.as_str()));
            if !is_markdown {
                continue;
            }
            let Some(mut file) = files.remove(&path) else {
                continue;
            };
            let text = std::str::from_utf8(&file.contents)
                .map_err(|_| anyhow::anyhow!("`{path}` is not valid UTF-8"))?;
            let rendered = self.render(text);
            file.set_text(rendered);
            files.insert(&html_path(&path), file);
        }
        Ok(())
    }
}

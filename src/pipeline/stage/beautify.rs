//! Whitespace normalization for HTML and CSS output.
//!
//! HTML is not re-parsed: lines keep their order and relative nesting, only
//! the leading indentation is re-expressed in the configured unit. Lines
//! inside `<pre>` are left untouched.

use anyhow::Result;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

use super::extension;
use crate::config::BeautifyConfig;
use crate::debug;
use crate::pipeline::{Files, PipelineContext, Stage};

/// Columns a tab counts for when measuring source indentation.
const TAB_WIDTH: usize = 4;

pub struct BeautifyStage {
    unit: String,
    end_with_newline: bool,
    html: bool,
    css: bool,
}

impl BeautifyStage {
    pub fn new(config: &BeautifyConfig) -> Self {
        Self {
            unit: config.indent_char.repeat(config.indent_size),
            end_with_newline: config.end_with_newline,
            html: config.html,
            css: config.css,
        }
    }

    pub fn beautify_html(&self, source: &str) -> String {
        let lines: Vec<&str> = source.lines().collect();
        let base = base_indent(&lines);

        let mut out = String::with_capacity(source.len());
        let mut in_pre = false;
        let mut blank_run = false;

        for line in lines {
            if in_pre {
                out.push_str(line);
                out.push('\n');
                if line.contains("</pre>") {
                    in_pre = false;
                }
                continue;
            }

            let opens_pre = line.contains("<pre") && !line.contains("</pre>");
            // text after an opening <pre> is preformatted, trailing spaces included
            let content = if opens_pre {
                line.trim_start()
            } else {
                line.trim()
            };
            if content.is_empty() {
                // collapse runs, drop leading blank lines
                if !blank_run && !out.is_empty() {
                    out.push('\n');
                }
                blank_run = true;
                continue;
            }
            blank_run = false;

            let depth = base.map_or(0, |base| indent_width(line) / base);
            for _ in 0..depth {
                out.push_str(&self.unit);
            }
            out.push_str(content);
            out.push('\n');

            in_pre = opens_pre;
        }

        self.finish(out)
    }

    /// Reprint CSS with the configured indent unit. Unparseable input only
    /// gets its final newline adjusted.
    pub fn beautify_css(&self, path: &str, source: &str) -> String {
        let printed = StyleSheet::parse(source, ParserOptions::default())
            .ok()
            .and_then(|sheet| sheet.to_css(PrinterOptions::default()).ok());

        let Some(printed) = printed else {
            debug!("beautify"; "leaving unparseable css as is: {}", path);
            return self.finish(source.to_string());
        };

        // lightningcss indents with two spaces
        let mut out = String::with_capacity(printed.code.len());
        for line in printed.code.lines() {
            let trimmed = line.trim_start_matches(' ');
            let depth = (line.len() - trimmed.len()) / 2;
            for _ in 0..depth {
                out.push_str(&self.unit);
            }
            out.push_str(trimmed.trim_end());
            out.push('\n');
        }
        self.finish(out)
    }

    fn finish(&self, mut text: String) -> String {
        let len = text.trim_end_matches('\n').len();
        text.truncate(len);
        if self.end_with_newline && !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

/// Smallest non-zero indentation outside `<pre>`, the source's indent unit.
fn base_indent(lines: &[&str]) -> Option<usize> {
    let mut in_pre = false;
    let mut base: Option<usize> = None;
    for line in lines {
        if in_pre {
            in_pre = !line.contains("</pre>");
            continue;
        }
        let width = indent_width(line);
        if width > 0 && !line.trim().is_empty() {
            base = Some(base.map_or(width, |base| base.min(width)));
        }
        in_pre = line.contains("<pre") && !line.contains("</pre>");
    }
    base
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

impl Stage for BeautifyStage {
    fn name(&self) -> &str {
        "beautify"
    }

    fn run(&self, files: &mut Files, _ctx: &PipelineContext<'_>) -> Result<()> {
        for (path, file) in files.iter_mut() {
            let ext = extension(path);
            let beautified = match (ext.as_deref(), file.text()) {
                (Some("html" | "htm"), Some(text)) if self.html => self.beautify_html(text),
                (Some("css"), Some(text)) if self.css => self.beautify_css(path, text),
                _ => continue,
            };
            file.set_text(beautified);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(indent_size: usize, indent_char: &str) -> BeautifyStage {
        BeautifyStage::new(&BeautifyConfig {
            indent_size,
            indent_char: indent_char.to_string(),
            ..BeautifyConfig::default()
        })
    }

    #[test]
    fn test_html_reindent() {
        let src = "<ul>\n    <li>a</li>   \n    <li>\n        b\n    </li>\n</ul>";
        assert_eq!(
            stage(2, " ").beautify_html(src),
            "<ul>\n  <li>a</li>\n  <li>\n    b\n  </li>\n</ul>\n"
        );
        assert_eq!(
            stage(1, "\t").beautify_html(src),
            "<ul>\n\t<li>a</li>\n\t<li>\n\t\tb\n\t</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_html_collapses_blank_lines() {
        let src = "\n\n<p>a</p>\n\n\n\n<p>b</p>\n";
        assert_eq!(stage(2, " ").beautify_html(src), "<p>a</p>\n\n<p>b</p>\n");
    }

    #[test]
    fn test_html_pre_untouched() {
        let src = "<div>\n    <pre>\n  keep   \n\n\n    this</pre>\n</div>";
        assert_eq!(
            stage(2, " ").beautify_html(src),
            "<div>\n  <pre>\n  keep   \n\n\n    this</pre>\n</div>\n"
        );
    }

    #[test]
    fn test_html_pre_opening_line_keeps_trailing_spaces() {
        let src = "<pre><code>a = 1   \nb = 2\n</code></pre>\n";
        assert_eq!(stage(2, " ").beautify_html(src), src);

        let src = "<div>\n    <pre>x  \n</pre>\n</div>";
        assert_eq!(
            stage(2, " ").beautify_html(src),
            "<div>\n  <pre>x  \n</pre>\n</div>\n"
        );
    }

    #[test]
    fn test_without_final_newline() {
        let stage = BeautifyStage::new(&BeautifyConfig {
            end_with_newline: false,
            ..BeautifyConfig::default()
        });
        assert_eq!(stage.beautify_html("<p>a</p>\n\n"), "<p>a</p>");
    }

    #[test]
    fn test_css_reindent() {
        let out = stage(4, " ").beautify_css("main.css", ".a{color:red}");
        assert_eq!(out, ".a {\n    color: red;\n}\n");
    }
}

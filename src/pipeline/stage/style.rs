//! CSS vendor prefixing via lightningcss.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use super::extension;
use crate::config::StyleConfig;
use crate::pipeline::{Files, PipelineContext, Stage};

pub struct StyleStage {
    targets: Targets,
    minify: bool,
}

/// Resolve browserslist queries. No queries means no prefixing.
pub fn browser_targets(queries: &[String]) -> Result<Targets> {
    if queries.is_empty() {
        return Ok(Targets::default());
    }
    let browsers = Browsers::from_browserslist(queries)
        .map_err(|e| anyhow!("invalid browserslist query {:?}: {}", queries, e))?;
    Ok(browsers.map(Targets::from).unwrap_or_default())
}

impl StyleStage {
    pub fn new(config: &StyleConfig) -> Result<Self> {
        Ok(Self {
            targets: browser_targets(&config.browsers)?,
            minify: config.minify,
        })
    }

    pub fn process(&self, filename: &str, source: &str) -> Result<String> {
        let mut sheet = StyleSheet::parse(
            source,
            ParserOptions {
                filename: filename.to_string(),
                ..ParserOptions::default()
            },
        )
        .map_err(|e| anyhow!("`{}`: {}", filename, e))?;

        sheet
            .minify(MinifyOptions {
                targets: self.targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| anyhow!("`{}`: {}", filename, e))?;

        let result = sheet
            .to_css(PrinterOptions {
                minify: self.minify,
                targets: self.targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| anyhow!("`{}`: {}", filename, e))?;
        Ok(result.code)
    }
}

impl Stage for StyleStage {
    fn name(&self) -> &str {
        "style"
    }

    fn run(&self, files: &mut Files, _ctx: &PipelineContext<'_>) -> Result<()> {
        for (path, file) in files.iter_mut() {
            if extension(path).as_deref() != Some("css") {
                continue;
            }
            let css = {
                let source = file
                    .text()
                    .ok_or_else(|| anyhow!("`{path}` is not valid UTF-8"))?;
                self.process(path, source)?
            };
            file.set_text(css);
        }
        Ok(())
    }
}

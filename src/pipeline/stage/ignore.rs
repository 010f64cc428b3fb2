//! Drop files matching `[build] ignore` globs.

use anyhow::{Result, anyhow};
use glob::Pattern;

use super::MATCH_OPTIONS;
use crate::debug;
use crate::pipeline::{Files, PipelineContext, Stage};

pub struct IgnoreStage {
    patterns: Vec<Pattern>,
}

impl IgnoreStage {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(|e| anyhow!("invalid ignore pattern `{}`: {}", p, e)))
            .collect::<Result<_>>()?;
        Ok(Self { patterns })
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
    }
}

impl Stage for IgnoreStage {
    fn name(&self) -> &str {
        "ignore"
    }

    fn run(&self, files: &mut Files, _ctx: &PipelineContext<'_>) -> Result<()> {
        files.retain(|path, _| {
            let ignored = self.is_ignored(path);
            if ignored {
                debug!("ignore"; "{}", path);
            }
            !ignored
        });
        Ok(())
    }
}

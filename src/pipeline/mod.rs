//! In-memory build pipeline.
//!
//! The whole site is loaded into a [`Files`] set, passed through ordered
//! stage groups, then written out.
//!
//! ```text
//! ┌────────────┐   ┌──────────────────────────────────────────────┐   ┌────────────┐
//! │ read source│ → │ common: markdown → collections → layouts →   │ → │ write      │
//! │ (+ front-  │   │         sass → style → beautify → ignore     │   │ output dir │
//! │  matter)   │   │ deploy: relative links (build command only)  │   │            │
//! └────────────┘   └──────────────────────────────────────────────┘   └────────────┘
//! ```
//!
//! Stages run one at a time over the same `&mut Files`. The first failing
//! stage aborts the run; later stages never see the set.

pub mod frontmatter;
pub mod stage;

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::debug;
use crate::link::LinkResolver;

/// Group that every run executes first.
pub const COMMON_GROUP: &str = "common";

/// Group executed only for deployable builds.
pub const DEPLOY_GROUP: &str = "deploy";

// =============================================================================
// Files
// =============================================================================

/// One file of the output set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputFile {
    pub contents: Vec<u8>,
    /// Frontmatter and stage-provided values, visible to templates.
    pub metadata: Map<String, Value>,
}

impl OutputFile {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Contents as text, if valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }

    pub fn set_text(&mut self, text: String) {
        self.contents = text.into_bytes();
    }

    /// String metadata value.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// The output set, keyed by forward-slash path relative to the output root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Files {
    entries: BTreeMap<String, OutputFile>,
}

/// `a\b` → `a/b`, leading `/` and `./` removed.
fn normalize_key(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = path.trim_start_matches("./");
    path.trim_start_matches('/').to_string()
}

impl Files {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, file: OutputFile) -> Option<OutputFile> {
        self.entries.insert(normalize_key(path), file)
    }

    pub fn remove(&mut self, path: &str) -> Option<OutputFile> {
        self.entries.remove(&normalize_key(path))
    }

    pub fn get(&self, path: &str) -> Option<&OutputFile> {
        self.entries.get(&normalize_key(path))
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut OutputFile> {
        self.entries.get_mut(&normalize_key(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move a file to a new path. Returns false if `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.entries.remove(&normalize_key(from)) {
            Some(file) => {
                self.entries.insert(normalize_key(to), file);
                true
            }
            None => false,
        }
    }

    /// Snapshot of paths, for stages that add or remove while iterating.
    pub fn paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputFile)> {
        self.entries.iter().map(|(path, file)| (path.as_str(), file))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut OutputFile)> {
        self.entries
            .iter_mut()
            .map(|(path, file)| (path.as_str(), file))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &mut OutputFile) -> bool) {
        self.entries.retain(|path, file| keep(path, file));
    }
}

impl FromIterator<(String, OutputFile)> for Files {
    fn from_iter<I: IntoIterator<Item = (String, OutputFile)>>(iter: I) -> Self {
        let mut files = Self::new();
        for (path, file) in iter {
            files.insert(&path, file);
        }
        files
    }
}

impl IntoIterator for Files {
    type Item = (String, OutputFile);
    type IntoIter = std::collections::btree_map::IntoIter<String, OutputFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// Stages
// =============================================================================

/// Shared, read-only state for one pipeline run.
pub struct PipelineContext<'a> {
    pub config: &'a SiteConfig,
    pub content: &'a ContentStore,
    pub resolver: &'a dyn LinkResolver,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        config: &'a SiteConfig,
        content: &'a ContentStore,
        resolver: &'a dyn LinkResolver,
    ) -> Self {
        Self {
            config,
            content,
            resolver,
        }
    }

    /// Site-wide template values from `[site]`.
    pub fn site_metadata(&self) -> Value {
        self.config.site.to_value()
    }
}

/// A file-set transform. `Ok` signals completion; `Err` aborts the build.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, files: &mut Files, ctx: &PipelineContext<'_>) -> anyhow::Result<()>;
}

/// A stage backed by a closure.
pub struct FnStage<F> {
    name: String,
    run: F,
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&mut Files, &PipelineContext<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, files: &mut Files, ctx: &PipelineContext<'_>) -> anyhow::Result<()> {
        (self.run)(files, ctx)
    }
}

/// Wrap a closure as a named stage.
pub fn stage_fn<F>(name: impl Into<String>, run: F) -> FnStage<F>
where
    F: Fn(&mut Files, &PipelineContext<'_>) -> anyhow::Result<()> + Send + Sync,
{
    FnStage {
        name: name.into(),
        run,
    }
}

// =============================================================================
// Runner
// =============================================================================

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stage `{stage}` in group `{group}` failed")]
    Stage {
        group: String,
        stage: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unknown stage group `{0}`")]
    UnknownGroup(String),
}

/// Named, ordered list of stages.
pub struct StageGroup {
    name: String,
    stages: Vec<Box<dyn Stage>>,
}

impl StageGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }
}

/// Ordered stage groups.
#[derive(Default)]
pub struct Pipeline {
    groups: Vec<StageGroup>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to `group`, creating the group on first use.
    pub fn push(&mut self, group: &str, stage: impl Stage + 'static) {
        let boxed: Box<dyn Stage> = Box::new(stage);
        match self.groups.iter_mut().find(|g| g.name == group) {
            Some(existing) => existing.stages.push(boxed),
            None => self.groups.push(StageGroup {
                name: group.to_string(),
                stages: vec![boxed],
            }),
        }
    }

    /// Builder form of [`Pipeline::push`].
    pub fn with_stage(mut self, group: &str, stage: impl Stage + 'static) -> Self {
        self.push(group, stage);
        self
    }

    /// Declare a group without stages, so it can be requested by name.
    pub fn with_group(mut self, group: &str) -> Self {
        if self.group(group).is_none() {
            self.groups.push(StageGroup {
                name: group.to_string(),
                stages: Vec::new(),
            });
        }
        self
    }

    pub fn group(&self, name: &str) -> Option<&StageGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups(&self) -> &[StageGroup] {
        &self.groups
    }

    /// Run `common`, then each of `extra_groups` in order.
    ///
    /// Unknown group names are rejected before any stage runs.
    pub fn run(
        &self,
        files: &mut Files,
        ctx: &PipelineContext<'_>,
        extra_groups: &[&str],
    ) -> Result<(), PipelineError> {
        let mut selected: Vec<&StageGroup> = self.group(COMMON_GROUP).into_iter().collect();
        for name in extra_groups {
            let group = self
                .group(name)
                .ok_or_else(|| PipelineError::UnknownGroup((*name).to_string()))?;
            selected.push(group);
        }

        for group in selected {
            for stage in &group.stages {
                debug!("pipeline"; "{}/{} ({} files)", group.name, stage.name(), files.len());
                stage
                    .run(files, ctx)
                    .map_err(|err| PipelineError::Stage {
                        group: group.name.clone(),
                        stage: stage.name().to_string(),
                        source: err.into(),
                    })?;
            }
        }
        Ok(())
    }
}

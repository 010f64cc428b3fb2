//! Content records → pages.
//!
//! - `collection = "<type>"`: the file is a template for every non-broken
//!   record of that type, cloned to each record's resolved path.
//! - `document = "<type>"` (+ optional `uid`): the matching record is
//!   attached to the file in place.

use anyhow::{Result, bail};
use serde_json::{Map, Value};

use crate::debug;
use crate::link::output_path;
use crate::pipeline::{Files, PipelineContext, Stage};

const COLLECTION_KEY: &str = "collection";
const DOCUMENT_KEY: &str = "document";
const UID_KEY: &str = "uid";
const RECORD_KEY: &str = "record";
const URL_KEY: &str = "url";

pub struct CollectionsStage;

/// Record type → annotated records, in store order.
pub fn collections_value(ctx: &PipelineContext<'_>) -> Value {
    let mut collections = Map::new();
    for record_type in ctx.content.types() {
        let records = ctx
            .content
            .by_type(record_type)
            .map(|record| record.annotate(ctx.resolver))
            .collect();
        collections.insert(record_type.to_string(), Value::Array(records));
    }
    Value::Object(collections)
}

impl Stage for CollectionsStage {
    fn name(&self) -> &str {
        "collections"
    }

    fn run(&self, files: &mut Files, ctx: &PipelineContext<'_>) -> Result<()> {
        for path in files.paths() {
            let Some(file) = files.get(&path) else {
                continue;
            };

            if let Some(record_type) = file.meta_str(COLLECTION_KEY) {
                let record_type = record_type.to_string();
                let Some(template) = files.remove(&path) else {
                    continue;
                };

                let mut count = 0;
                for record in ctx.content.by_type(&record_type) {
                    // broken records have no page
                    let Some(url) = ctx.resolver.resolve(record) else {
                        continue;
                    };
                    let mut page = template.clone();
                    page.metadata
                        .insert(RECORD_KEY.into(), record.annotate(ctx.resolver));
                    page.metadata.insert(URL_KEY.into(), Value::String(url.clone()));
                    files.insert(&output_path(&url), page);
                    count += 1;
                }
                debug!("collections"; "{} → {} pages of `{}`", path, count, record_type);
                continue;
            }

            if let Some(record_type) = file.meta_str(DOCUMENT_KEY) {
                let uid = file.meta_str(UID_KEY);
                let Some(record) = ctx.content.find(record_type, uid) else {
                    match uid {
                        Some(uid) => bail!("`{path}`: no `{record_type}` record with uid `{uid}`"),
                        None => bail!("`{path}`: no `{record_type}` record"),
                    }
                };
                let annotated = record.annotate(ctx.resolver);
                if let Some(file) = files.get_mut(&path) {
                    file.metadata.insert(RECORD_KEY.into(), annotated);
                }
            }
        }
        Ok(())
    }
}

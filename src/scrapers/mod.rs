//! Headline sources and the schema-driven scraping pipeline.
//!
//! Every source is described by a declarative [`SiteSchema`]; one generic
//! extractor consumes it. Adding a site means adding a schema, not code.
//!
//! # Supported Sources
//!
//! | Source | Module | Container | Optional fields |
//! |--------|--------|-----------|-----------------|
//! | Finviz news | [`finviz`] | `table.styled-table-new` | url, timestamp |
//! | Benzinga recent | [`benzinga`] | `div.content-feed-list` | none |
//!
//! Further schemas can be loaded from a YAML file with [`load_schemas`].
//!
//! # Stages
//!
//! - [`fetch`]: one GET with browser-like headers and a timeout
//! - [`extract`]: DOM walk driven by the schema selectors
//! - [`collect`]: stamps each headline with its capture time

use crate::error::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

pub mod benzinga;
pub mod collect;
pub mod extract;
pub mod fetch;
pub mod finviz;

/// How to read one field out of an item node.
///
/// `selector` is a CSS selector evaluated inside the item; the first match
/// wins. With `attr` set the field is that attribute's value, otherwise it is
/// the element's whitespace-normalised text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

impl FieldSpec {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: None,
        }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attr: Some(attr.to_string()),
        }
    }
}

/// Structural knowledge needed to pull headlines off one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSchema {
    /// Display name used in logs.
    pub name: String,
    /// Page to fetch; also the base for resolving relative links.
    pub url: String,
    /// Selector of the element holding the news list (first match).
    pub container: String,
    /// Selector of the item nodes inside the container.
    pub item: String,
    /// Required headline field; items without it are skipped.
    pub headline: FieldSpec,
    #[serde(default)]
    pub link: Option<FieldSpec>,
    #[serde(default)]
    pub timestamp: Option<FieldSpec>,
    /// File name used when exporting into a directory.
    pub export_file: String,
}

impl SiteSchema {
    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }
}

/// Built-in sources selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    Finviz,
    Benzinga,
}

impl Source {
    pub fn schema(self) -> SiteSchema {
        match self {
            Source::Finviz => finviz::schema(),
            Source::Benzinga => benzinga::schema(),
        }
    }
}

/// Parse one or more YAML documents, each a [`SiteSchema`].
pub fn parse_schemas(yaml: &str) -> Result<Vec<SiteSchema>> {
    let mut schemas = Vec::new();
    for document in serde_yaml::Deserializer::from_str(yaml) {
        let schema = SiteSchema::deserialize(document)
            .map_err(|e| Error::Config(format!("invalid site schema: {e}")))?;
        schemas.push(schema);
    }
    if schemas.is_empty() {
        return Err(Error::Config("schema file defines no sites".to_string()));
    }
    Ok(schemas)
}

/// Load site schemas from a YAML file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_schemas(path: &Path) -> Result<Vec<SiteSchema>> {
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    let schemas = parse_schemas(&yaml)?;
    info!(count = schemas.len(), "Loaded site schemas");
    Ok(schemas)
}

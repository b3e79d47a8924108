//! Schema-driven headline extraction.
//!
//! A [`SiteSchema`] is compiled once into [`CompiledSchema`]; [`extract`]
//! then walks a page:
//!
//! 1. find the first container match (none: empty result, not an error)
//! 2. visit item matches inside it in document order
//! 3. read the headline field; skip the item when the node is missing or its
//!    text is blank
//! 4. read link/timestamp when the schema defines them, `""` when the node is
//!    missing
//!
//! Extraction stops once `max_count` headlines are produced (`0` = no cap).

use super::SiteSchema;
use crate::error::{Error, Result};
use crate::models::RawHeadline;
use crate::utils::normalize_text;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A [`FieldSpec`](super::FieldSpec) with its selector parsed.
#[derive(Debug)]
struct CompiledField {
    selector: Selector,
    attr: Option<String>,
}

impl CompiledField {
    fn compile(spec: &super::FieldSpec) -> Result<Self> {
        Ok(Self {
            selector: compile_selector(&spec.selector)?,
            attr: spec.attr.clone(),
        })
    }

    /// `None` when no node matches inside `item`.
    fn read(&self, item: ElementRef<'_>) -> Option<String> {
        let node = item.select(&self.selector).next()?;
        Some(match &self.attr {
            Some(attr) => node.value().attr(attr).unwrap_or_default().trim().to_string(),
            None => normalize_text(node.text()),
        })
    }
}

/// Why an item produced no headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    MissingNode,
    BlankText,
}

/// A schema ready to run against page content.
#[derive(Debug)]
pub struct CompiledSchema {
    name: String,
    base: Option<Url>,
    container: Selector,
    item: Selector,
    headline: CompiledField,
    link: Option<CompiledField>,
    timestamp: Option<CompiledField>,
}

impl CompiledSchema {
    /// Parse every selector in `schema`.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] when a selector is not valid CSS.
    pub fn compile(schema: &SiteSchema) -> Result<Self> {
        Ok(Self {
            name: schema.name.clone(),
            base: Url::parse(&schema.url).ok(),
            container: compile_selector(&schema.container)?,
            item: compile_selector(&schema.item)?,
            headline: CompiledField::compile(&schema.headline)?,
            link: schema.link.as_ref().map(CompiledField::compile).transpose()?,
            timestamp: schema
                .timestamp
                .as_ref()
                .map(CompiledField::compile)
                .transpose()?,
        })
    }

    fn headline_from(&self, item: ElementRef<'_>) -> std::result::Result<RawHeadline, Skip> {
        let headline = self.headline.read(item).ok_or(Skip::MissingNode)?;
        if headline.is_empty() {
            return Err(Skip::BlankText);
        }

        let url = self
            .link
            .as_ref()
            .map(|field| self.resolve(field.read(item).unwrap_or_default()));
        let timestamp = self
            .timestamp
            .as_ref()
            .map(|field| field.read(item).unwrap_or_default());

        Ok(RawHeadline {
            headline,
            url,
            timestamp,
        })
    }

    /// Absolute form of `href`; unchanged when empty or unresolvable.
    fn resolve(&self, href: String) -> String {
        if href.is_empty() {
            return href;
        }
        match self.base.as_ref().map(|base| base.join(&href)) {
            Some(Ok(resolved)) => resolved.to_string(),
            _ => href,
        }
    }
}

fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Parse(format!("invalid selector {selector:?}: {e}")))
}

/// Extract headlines from `html` in document order, at most `max_count`
/// of them when `max_count > 0`.
#[instrument(level = "info", skip_all, fields(source = %schema.name, max_count = max_count))]
pub fn extract(html: &str, schema: &CompiledSchema, max_count: usize) -> Vec<RawHeadline> {
    let document = Html::parse_document(html);

    let Some(container) = document.select(&schema.container).next() else {
        warn!("News container not found; page has nothing to extract");
        return Vec::new();
    };

    let mut headlines = Vec::new();
    let mut skipped = 0usize;
    for (index, item) in container.select(&schema.item).enumerate() {
        if max_count > 0 && headlines.len() >= max_count {
            debug!(max_count, "Reached headline cap");
            break;
        }
        match schema.headline_from(item) {
            Ok(headline) => headlines.push(headline),
            Err(reason) => {
                skipped += 1;
                debug!(index, ?reason, "Skipping item without headline");
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "Items without a headline were skipped; the site layout may have changed");
    }
    info!(count = headlines.len(), "Extracted headlines");
    headlines
}

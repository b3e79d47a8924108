//! Benzinga recent news.
//!
//! Headlines live in post cards inside the `content-feed-list` container.
//! Only the title text is taken; the cards expose no link or timestamp the
//! pipeline records.

use super::{FieldSpec, SiteSchema};

pub const NEWS_URL: &str = "https://www.benzinga.com/recent";

pub fn schema() -> SiteSchema {
    SiteSchema {
        name: "Benzinga".to_string(),
        url: NEWS_URL.to_string(),
        container: "div.content-feed-list".to_string(),
        item: "div.post-card-text".to_string(),
        headline: FieldSpec::text("div.post-card-title span"),
        link: None,
        timestamp: None,
        export_file: "benzinga_financial_news.csv".to_string(),
    }
}

//! Finviz market news.
//!
//! The news page renders headlines as rows of a `styled-table-new` table.
//! Each row carries a link cell (anchor text is the headline, `href` the
//! article) and a date cell with a free-form time such as `08:15AM` or
//! `Oct-17`.

use super::{FieldSpec, SiteSchema};

pub const NEWS_URL: &str = "https://finviz.com/news.ashx";

pub fn schema() -> SiteSchema {
    SiteSchema {
        name: "Finviz".to_string(),
        url: NEWS_URL.to_string(),
        container: "table.styled-table-new".to_string(),
        item: "tr".to_string(),
        headline: FieldSpec::text("td.news_link-cell a"),
        link: Some(FieldSpec::attr("td.news_link-cell a", "href")),
        timestamp: Some(FieldSpec::text("td.news_date-cell")),
        export_file: "finviz_financial_news.csv".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::extract::{CompiledSchema, extract};

    const PAGE: &str = r#"
        <html><body>
          <table class="styled-table-new is-rounded">
            <tr class="news_table-row">
              <td class="news_date-cell">08:15AM</td>
              <td class="news_link-cell">
                <a class="nn-tab-link" href="https://www.reuters.com/markets/fed">  Fed holds rates
                  steady </a>
              </td>
            </tr>
            <tr class="news_table-row">
              <td class="news_date-cell">Oct-17</td>
              <td class="news_link-cell"><a href="/news/123/oil-slides">Oil slides on supply glut</a></td>
            </tr>
            <tr class="news_table-row">
              <td class="news_link-cell"><a>Dollar firms</a></td>
            </tr>
            <tr class="ad-row"><td colspan="2">Advertisement</td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_extracts_rows_with_metadata() {
        let compiled = CompiledSchema::compile(&schema()).unwrap();
        let headlines = extract(PAGE, &compiled, 0);

        assert_eq!(headlines.len(), 3);
        assert_eq!(headlines[0].headline, "Fed holds rates steady");
        assert_eq!(
            headlines[0].url.as_deref(),
            Some("https://www.reuters.com/markets/fed")
        );
        assert_eq!(headlines[0].timestamp.as_deref(), Some("08:15AM"));
    }

    #[test]
    fn test_relative_links_resolve_against_news_page() {
        let compiled = CompiledSchema::compile(&schema()).unwrap();
        let headlines = extract(PAGE, &compiled, 0);

        assert_eq!(
            headlines[1].url.as_deref(),
            Some("https://finviz.com/news/123/oil-slides")
        );
    }

    #[test]
    fn test_missing_link_and_date_default_to_empty() {
        let compiled = CompiledSchema::compile(&schema()).unwrap();
        let headlines = extract(PAGE, &compiled, 0);

        assert_eq!(headlines[2].headline, "Dollar firms");
        assert_eq!(headlines[2].url.as_deref(), Some(""));
        assert_eq!(headlines[2].timestamp.as_deref(), Some(""));
    }
}

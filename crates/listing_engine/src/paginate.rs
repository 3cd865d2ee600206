use scraper::Html;
use url::Url;

use crate::extract::{create_selector, resolve_href};
use crate::PageContent;

/// Finds the "next page" control of a results page by its accessible label.
#[derive(Debug, Clone)]
pub struct PaginationResolver {
    labels: Vec<String>,
}

impl PaginationResolver {
    /// Labels are matched trimmed and ASCII case-insensitively.
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Absolute URL of the next results page, or `None` on the last page.
    pub fn next_page_url(&self, page: &PageContent) -> Option<String> {
        let selector = create_selector("a[aria-label]").ok()?;
        let doc = Html::parse_document(&page.html);
        let base = Url::parse(&page.url).ok();

        doc.select(&selector)
            .filter(|anchor| {
                anchor.value().attr("aria-label").is_some_and(|label| {
                    let label = label.trim();
                    self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
                })
            })
            .find_map(|anchor| {
                let href = anchor.value().attr("href")?;
                resolve_href(href, base.as_ref())
            })
    }
}

impl Default for PaginationResolver {
    fn default() -> Self {
        Self::with_labels(["Next", "Next Page"])
    }
}

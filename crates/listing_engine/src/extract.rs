use listing_core::Record;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::PageContent;

/// Where one optional card field is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// Trimmed text content of the first element matching the selector.
    Text(String),
    /// An attribute of the first element matching the selector.
    Attr { selector: String, attr: String },
}

impl FieldSource {
    pub fn text(selector: &str) -> Self {
        Self::Text(selector.to_string())
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        Self::Attr {
            selector: selector.to_string(),
            attr: attr.to_string(),
        }
    }
}

/// Markup signature of a results card. Each field lists sources tried in
/// order; the first non-empty value wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSelectors {
    pub card: String,
    pub title_anchor: Vec<String>,
    pub company: Vec<FieldSource>,
    pub location: Vec<FieldSource>,
    pub salary: Vec<FieldSource>,
    pub post_date: Vec<FieldSource>,
    pub summary: Vec<FieldSource>,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            card: "div.jobsearch-SerpJobCard".to_string(),
            title_anchor: vec!["h2 a".to_string(), "a.jobtitle".to_string()],
            company: vec![FieldSource::text(".company")],
            location: vec![
                FieldSource::attr("div.recJobLoc", "data-rc-loc"),
                FieldSource::text(".location"),
            ],
            salary: vec![FieldSource::text(".salarytext, .salaryText")],
            post_date: vec![FieldSource::text(".date")],
            summary: vec![FieldSource::text(".summary")],
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid css selector: {0}")]
pub struct SelectorError(pub String);

/// A card cut out of a results page, kept as its own HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCard {
    pub html: String,
}

/// A card that cannot become a [`Record`] because its identity URL is missing.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("card has no title anchor")]
    MissingTitleAnchor,
    #[error("title anchor has no href")]
    MissingHref,
    #[error("href {0:?} cannot be resolved to an absolute url")]
    UnresolvableHref(String),
}

enum CompiledSource {
    Text(Selector),
    Attr(Selector, String),
}

pub struct CardExtractor {
    card: Selector,
    title_anchor: Vec<Selector>,
    company: Vec<CompiledSource>,
    location: Vec<CompiledSource>,
    salary: Vec<CompiledSource>,
    post_date: Vec<CompiledSource>,
    summary: Vec<CompiledSource>,
}

impl CardExtractor {
    pub fn new(selectors: &CardSelectors) -> Result<Self, SelectorError> {
        Ok(Self {
            card: create_selector(&selectors.card)?,
            title_anchor: selectors
                .title_anchor
                .iter()
                .map(|s| create_selector(s))
                .collect::<Result<_, _>>()?,
            company: compile_sources(&selectors.company)?,
            location: compile_sources(&selectors.location)?,
            salary: compile_sources(&selectors.salary)?,
            post_date: compile_sources(&selectors.post_date)?,
            summary: compile_sources(&selectors.summary)?,
        })
    }

    /// All cards on the page, in document order. An empty page yields no cards.
    pub fn extract_cards(&self, page: &PageContent) -> Vec<RawCard> {
        let doc = Html::parse_document(&page.html);
        doc.select(&self.card)
            .map(|card| RawCard { html: card.html() })
            .collect()
    }

    /// Converts one card. Optional fields fall back to `""` independently;
    /// only a missing or unusable title link rejects the card.
    pub fn to_record(&self, card: &RawCard, base_url: &str) -> Result<Record, ExtractionFailure> {
        let fragment = Html::parse_fragment(&card.html);
        let root = fragment.root_element();

        let anchor = self
            .title_anchor
            .iter()
            .find_map(|sel| root.select(sel).next())
            .ok_or(ExtractionFailure::MissingTitleAnchor)?;

        let href = anchor
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(ExtractionFailure::MissingHref)?;
        let base = Url::parse(base_url).ok();
        let url = resolve_href(href, base.as_ref())
            .ok_or_else(|| ExtractionFailure::UnresolvableHref(href.to_string()))?;

        let title = anchor
            .value()
            .attr("title")
            .map(collapse_whitespace)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| element_text(anchor));

        Ok(Record::new(url)
            .with_title(title)
            .with_company(first_value(root, &self.company))
            .with_location(first_value(root, &self.location))
            .with_salary(first_value(root, &self.salary))
            .with_post_date(first_value(root, &self.post_date))
            .with_summary(first_value(root, &self.summary)))
    }
}

/// Text of the first element under `root` matching `selector`, or `None` when absent or blank.
pub fn find_text(root: ElementRef, selector: &Selector) -> Option<String> {
    root.select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Attribute of the first element under `root` matching `selector`, or `None` when absent or blank.
pub fn find_attr(root: ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    root.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(collapse_whitespace)
        .filter(|value| !value.is_empty())
}

fn first_value(root: ElementRef, sources: &[CompiledSource]) -> String {
    sources
        .iter()
        .find_map(|source| match source {
            CompiledSource::Text(sel) => find_text(root, sel),
            CompiledSource::Attr(sel, attr) => find_attr(root, sel, attr),
        })
        .unwrap_or_default()
}

fn element_text(el: ElementRef) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn compile_sources(sources: &[FieldSource]) -> Result<Vec<CompiledSource>, SelectorError> {
    sources
        .iter()
        .map(|source| match source {
            FieldSource::Text(sel) => Ok(CompiledSource::Text(create_selector(sel)?)),
            FieldSource::Attr { selector, attr } => Ok(CompiledSource::Attr(
                create_selector(selector)?,
                attr.clone(),
            )),
        })
        .collect()
}

pub(crate) fn create_selector(sel_str: &str) -> Result<Selector, SelectorError> {
    Selector::parse(sel_str).map_err(|_| SelectorError(sel_str.to_string()))
}

/// Absolute form of a link target, normalised by `url` (lowercase scheme and
/// host, dot segments removed). Fragment-only and `javascript:` targets are
/// not navigable and yield `None`.
pub(crate) fn resolve_href(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok()).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::{collapse_whitespace, resolve_href};
    use url::Url;

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(collapse_whitespace("  Senior\n   Engineer \t"), "Senior Engineer");
    }

    #[test]
    fn relative_hrefs_join_the_origin() {
        let base = Url::parse("https://www.indeed.com/jobs?q=rust&start=10").unwrap();
        assert_eq!(
            resolve_href("/rc/clk?jk=abc", Some(&base)).as_deref(),
            Some("https://www.indeed.com/rc/clk?jk=abc")
        );
        assert_eq!(
            resolve_href("https://other.example.com/x", Some(&base)).as_deref(),
            Some("https://other.example.com/x")
        );
        assert_eq!(resolve_href("#", Some(&base)), None);
        assert_eq!(resolve_href("javascript:void(0)", Some(&base)), None);
        assert_eq!(resolve_href("/rc/clk", None), None);
    }
}

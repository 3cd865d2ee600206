use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.indeed.com";

/// Free-text search parameters a crawl session starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub job_title: String,
    pub location: String,
}

impl SearchQuery {
    pub fn new(job_title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            location: location.into(),
        }
    }

    /// First results page: `{base}/jobs?q={title}&l={location}`, spaces encoded as `+`.
    pub fn start_url(&self, base: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(base)?.join("/jobs")?;
        url.query_pairs_mut()
            .clear()
            .append_pair("q", self.job_title.trim())
            .append_pair("l", self.location.trim());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchQuery, DEFAULT_BASE_URL};

    #[test]
    fn spaces_become_plus() {
        let query = SearchQuery::new("Data Scientist", "Charlotte NC");
        let url = query.start_url(DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.indeed.com/jobs?q=Data+Scientist&l=Charlotte+NC"
        );
    }

    #[test]
    fn base_path_and_query_are_replaced() {
        let query = SearchQuery::new("rust", "");
        let url = query.start_url("http://127.0.0.1:8080/ignored?x=1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/jobs?q=rust&l=");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let query = SearchQuery::new("C++ & Rust", "Paris");
        let url = query.start_url(DEFAULT_BASE_URL).unwrap();
        assert_eq!(url.query(), Some("q=C%2B%2B+%26+Rust&l=Paris"));
    }

    #[test]
    fn invalid_base_is_an_error() {
        assert!(SearchQuery::new("a", "b").start_url("not a url").is_err());
    }
}

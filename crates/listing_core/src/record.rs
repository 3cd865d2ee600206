/// Column names of the output file, in row order.
pub const RECORD_HEADER: [&str; 7] = [
    "JobTitle", "Company", "Location", "Salary", "PostDate", "Summary", "JobUrl",
];

/// One job posting extracted from a results card.
///
/// Every field except `url` may be empty. `url` is the identity key used for
/// deduplication within a crawl session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    title: String,
    company: String,
    location: String,
    salary: String,
    post_date: String,
    summary: String,
    url: String,
}

impl Record {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = salary.into();
        self
    }

    pub fn with_post_date(mut self, post_date: impl Into<String>) -> Self {
        self.post_date = post_date.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn salary(&self) -> &str {
        &self.salary
    }

    pub fn post_date(&self) -> &str {
        &self.post_date
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fields in [`RECORD_HEADER`] order.
    pub fn to_row(&self) -> [&str; 7] {
        [
            &self.title,
            &self.company,
            &self.location,
            &self.salary,
            &self.post_date,
            &self.summary,
            &self.url,
        ]
    }
}

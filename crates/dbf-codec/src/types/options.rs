//! Writer options.

use chrono::NaiveDate;

use crate::codepage::CodePage;

/// Options for writing DBF files.
#[derive(Debug, Clone, Default)]
pub struct DbfWriterOptions {
    /// Code page for names and text cells (default: UTF-8).
    pub code_page: CodePage,
    /// Last-update stamp for header bytes 1..=3 (default: today).
    pub last_update: Option<NaiveDate>,
}

impl DbfWriterOptions {
    /// Create writer options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the code page.
    #[must_use]
    pub fn with_code_page(mut self, code_page: CodePage) -> Self {
        self.code_page = code_page;
        self
    }

    /// Resolve and set the code page by label.
    #[must_use]
    pub fn with_code_page_label(mut self, label: &str) -> Self {
        self.code_page = CodePage::resolve(label);
        self
    }

    /// Fix the last-update stamp, making output reproducible.
    #[must_use]
    pub fn with_last_update(mut self, date: NaiveDate) -> Self {
        self.last_update = Some(date);
        self
    }

    /// Get the last-update date (today if not set).
    #[must_use]
    pub fn get_last_update(&self) -> NaiveDate {
        self.last_update
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

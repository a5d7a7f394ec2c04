use chrono::NaiveDate;

use crate::pipeline::EnrichedPosition;

/// Row selection by report date, ticker, owner, sector or industry.
///
/// Empty lists match everything. Sector and industry compare against the
/// display label, so `"Unknown"` selects unlabelled rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub date: Option<NaiveDate>,
    pub tickers: Vec<String>,
    pub owners: Vec<String>,
    pub sectors: Vec<String>,
    pub industries: Vec<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tickers = tickers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owners = owners.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn sectors<I, S>(mut self, sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sectors = sectors.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn industries<I, S>(mut self, industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.industries = industries.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, row: &EnrichedPosition) -> bool {
        fn allowed(list: &[String], value: &str) -> bool {
            list.is_empty() || list.iter().any(|v| v == value)
        }
        self.date.is_none_or(|d| d == row.date)
            && allowed(&self.tickers, &row.ticker)
            && allowed(&self.owners, &row.owner)
            && allowed(&self.sectors, row.sector_label())
            && allowed(&self.industries, row.industry_label())
    }

    /// The matching rows, in input order.
    pub fn apply<'a, I>(&self, rows: I) -> Vec<&'a EnrichedPosition>
    where
        I: IntoIterator<Item = &'a EnrichedPosition>,
    {
        rows.into_iter().filter(|r| self.matches(r)).collect()
    }
}

// src/fetch/urls.rs

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::fmt;
use url::Url;

/// One downloadable trip file: a (month, taxi type) pair and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub month: NaiveDate,
    pub taxi_type: String,
    pub url: Url,
}

impl SourceRef {
    /// The file name is appended to `base` as one path segment, so reserved
    /// characters in `taxi_type` are escaped instead of reshaping the URL.
    pub fn new(base: &Url, taxi_type: &str, month: NaiveDate) -> Result<Self> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot take path segments", base))?
            .pop_if_empty()
            .push(&file_name(taxi_type, month));
        Ok(Self {
            month,
            taxi_type: taxi_type.to_string(),
            url,
        })
    }

    pub fn year_month(&self) -> String {
        year_month(self.month)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.taxi_type, self.year_month())
    }
}

pub fn year_month(month: NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}

/// `{taxi_type}_tripdata_{YYYY-MM}.parquet`
pub fn file_name(taxi_type: &str, month: NaiveDate) -> String {
    format!("{}_tripdata_{}.parquet", taxi_type, year_month(month))
}

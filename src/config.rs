// src/config.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::months::MonthRange;

pub const DEFAULT_BASE_URL: &str = "https://d37ci6vzurychx.cloudfront.net/trip-data/";
pub const DEFAULT_TAXI_TYPE: &str = "yellow";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variables the host sets for each run.
pub const START_DATE_VAR: &str = "BRUIN_START_DATE";
pub const END_DATE_VAR: &str = "BRUIN_END_DATE";
pub const PIPELINE_VARS_VAR: &str = "BRUIN_VARS";

/// Local overrides, not set by the host.
pub const BASE_URL_VAR: &str = "TRIPFETCH_BASE_URL";
pub const TIMEOUT_VAR: &str = "TRIPFETCH_TIMEOUT_SECS";
pub const OUTPUT_VAR: &str = "TRIPFETCH_OUTPUT";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive date range for one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RunWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// First-of-month dates covered by this window. Each call starts over.
    pub fn months(&self) -> MonthRange {
        MonthRange::new(self.start, self.end)
    }
}

/// Everything the fetcher needs for a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// `None` when the host did not provide both boundaries.
    pub window: Option<RunWindow>,
    pub taxi_types: Vec<String>,
    /// Always ends in `/` so file names can be joined onto it.
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            window: None,
            taxi_types: default_taxi_types(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL should parse"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RunConfig {
    pub fn new(window: Option<RunWindow>, taxi_types: Vec<String>) -> Self {
        Self {
            window,
            taxi_types,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = normalize_base(base_url);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    ///
    /// A missing start or end date leaves the window unset; a present but
    /// malformed one is an error. The taxi type list falls back to
    /// `["yellow"]` whenever it cannot be read from the pipeline variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let window = match (get(START_DATE_VAR), get(END_DATE_VAR)) {
            (Some(start), Some(end)) => Some(RunWindow::new(
                parse_date(START_DATE_VAR, &start)?,
                parse_date(END_DATE_VAR, &end)?,
            )),
            _ => {
                debug!("run window not fully configured");
                None
            }
        };

        let taxi_types = parse_taxi_types(get(PIPELINE_VARS_VAR).as_deref());

        let mut config = Self::new(window, taxi_types);

        if let Some(raw) = get(BASE_URL_VAR) {
            let url = Url::parse(raw.trim())
                .with_context(|| format!("parsing {} {:?}", BASE_URL_VAR, raw))?;
            config = config.with_base_url(url);
        }

        if let Some(raw) = get(TIMEOUT_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("parsing {} {:?}", TIMEOUT_VAR, raw))?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[derive(Deserialize)]
struct PipelineVars {
    taxi_types: Option<Vec<String>>,
}

fn default_taxi_types() -> Vec<String> {
    vec![DEFAULT_TAXI_TYPE.to_string()]
}

fn parse_date(var: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("parsing {} {:?} as YYYY-MM-DD", var, raw))
}

/// Read `taxi_types` out of the pipeline variables JSON.
pub fn parse_taxi_types(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return default_taxi_types();
    };
    match serde_json::from_str::<PipelineVars>(raw) {
        Ok(PipelineVars {
            taxi_types: Some(types),
        }) => types,
        Ok(PipelineVars { taxi_types: None }) => default_taxi_types(),
        Err(e) => {
            warn!(error = %e, "unreadable {}; using default taxi types", PIPELINE_VARS_VAR);
            default_taxi_types()
        }
    }
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reads_window_and_taxi_types() -> Result<()> {
        let config = RunConfig::from_lookup(lookup_from(&[
            (START_DATE_VAR, "2023-01-01"),
            (END_DATE_VAR, "2023-02-28"),
            (PIPELINE_VARS_VAR, r#"{"taxi_types": ["yellow", "green"], "other": 1}"#),
        ]))?;

        assert_eq!(
            config.window,
            Some(RunWindow::new(date(2023, 1, 1), date(2023, 2, 28)))
        );
        assert_eq!(config.taxi_types, vec!["yellow", "green"]);
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        Ok(())
    }

    #[test]
    fn missing_boundary_leaves_window_unset() -> Result<()> {
        let only_start = RunConfig::from_lookup(lookup_from(&[(START_DATE_VAR, "2023-01-01")]))?;
        assert!(only_start.window.is_none());

        let blank_end = RunConfig::from_lookup(lookup_from(&[
            (START_DATE_VAR, "2023-01-01"),
            (END_DATE_VAR, "  "),
        ]))?;
        assert!(blank_end.window.is_none());
        Ok(())
    }

    #[test]
    fn malformed_date_is_an_error() {
        let err = RunConfig::from_lookup(lookup_from(&[
            (START_DATE_VAR, "2023/01/01"),
            (END_DATE_VAR, "2023-02-28"),
        ]))
        .unwrap_err();
        assert!(format!("{:#}", err).contains(START_DATE_VAR));
    }

    #[test]
    fn taxi_types_fall_back_to_yellow() {
        assert_eq!(parse_taxi_types(None), vec!["yellow"]);
        assert_eq!(parse_taxi_types(Some("{}")), vec!["yellow"]);
        assert_eq!(parse_taxi_types(Some("not json")), vec!["yellow"]);
        assert_eq!(
            parse_taxi_types(Some(r#"{"taxi_types": "green"}"#)),
            vec!["yellow"]
        );
        assert_eq!(
            parse_taxi_types(Some(r#"{"taxi_types": ["fhv"]}"#)),
            vec!["fhv"]
        );
    }

    #[test]
    fn overrides_base_url_and_timeout() -> Result<()> {
        let config = RunConfig::from_lookup(lookup_from(&[
            (BASE_URL_VAR, "http://localhost:9000/mirror"),
            (TIMEOUT_VAR, "12"),
        ]))?;
        assert_eq!(config.base_url.as_str(), "http://localhost:9000/mirror/");
        assert_eq!(config.request_timeout, Duration::from_secs(12));

        assert!(RunConfig::from_lookup(lookup_from(&[(TIMEOUT_VAR, "soon")])).is_err());
        Ok(())
    }
}

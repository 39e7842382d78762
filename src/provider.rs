//! Data providers: the seams between the rating engine and the outside world.
//!
//! The builder only ever talks to these traits, so tests feed it in-memory
//! rows while the binary wires the CSV files and the World Bank API.
use crate::error::{RatingError, Result};
use crate::types::{ApiObservation, LocalSeriesRow, ProjectionRow};
use crate::util::{parse_f64_safe, parse_year_header};
use csv::{ReaderBuilder, StringRecord};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wide file of series rows keyed by series code and country name.
pub trait LocalSource {
    fn series_rows(&self) -> Result<Vec<LocalSeriesRow>>;
}

/// Per-indicator time-series API.
pub trait RemoteSource {
    fn fetch_indicator(
        &self,
        indicator: &str,
        countries: &[String],
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<ApiObservation>>;
}

/// Projection sheet with one row per `COUNTRY.VARCODE` series.
pub trait ProjectionSource {
    fn projection_rows(&self) -> Result<Vec<ProjectionRow>>;
}

/// Header positions of a wide sheet: named metadata columns plus year columns.
struct WideHeader {
    named: BTreeMap<String, usize>,
    years: Vec<(usize, i32)>,
}

impl WideHeader {
    fn parse(headers: &StringRecord) -> Self {
        let mut named = BTreeMap::new();
        let mut years = Vec::new();
        for (idx, h) in headers.iter().enumerate() {
            match parse_year_header(h) {
                Some(y) => years.push((idx, y)),
                None => {
                    named.insert(h.trim().to_string(), idx);
                }
            }
        }
        Self { named, years }
    }

    fn require(&self, name: &str, path: &Path) -> Result<usize> {
        self.named.get(name).copied().ok_or_else(|| {
            RatingError::Config(format!("{} has no {} column", path.display(), name))
        })
    }

    fn year_values(&self, record: &StringRecord) -> BTreeMap<i32, Option<f64>> {
        self.years
            .iter()
            .map(|(idx, y)| (*y, parse_f64_safe(record.get(*idx))))
            .collect()
    }
}

fn open_wide(path: &Path) -> Result<(csv::Reader<std::fs::File>, WideHeader)> {
    if !path.exists() {
        return Err(RatingError::NotFound(path.display().to_string()));
    }
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let header = WideHeader::parse(rdr.headers()?);
    Ok((rdr, header))
}

/// Local indicator file exported as CSV (`SERIES_CODE`, `COUNTRY`, years...).
#[derive(Debug, Clone)]
pub struct CsvSeriesFile {
    path: PathBuf,
}

impl CsvSeriesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LocalSource for CsvSeriesFile {
    fn series_rows(&self) -> Result<Vec<LocalSeriesRow>> {
        let (mut rdr, header) = open_wide(&self.path)?;
        let code_idx = header.require("SERIES_CODE", &self.path)?;
        let country_idx = header.require("COUNTRY", &self.path)?;
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(LocalSeriesRow {
                series_code: record.get(code_idx).unwrap_or_default().to_string(),
                country: record.get(country_idx).unwrap_or_default().to_string(),
                values: header.year_values(&record),
            });
        }
        debug!(path = %self.path.display(), rows = rows.len(), "read local series file");
        Ok(rows)
    }
}

/// Projection sheet exported as CSV (`SERIES_CODE`, `COUNTRY`, years...).
#[derive(Debug, Clone)]
pub struct CsvProjectionFile {
    path: PathBuf,
}

impl CsvProjectionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProjectionSource for CsvProjectionFile {
    fn projection_rows(&self) -> Result<Vec<ProjectionRow>> {
        let (mut rdr, header) = open_wide(&self.path)?;
        let code_idx = header.require("SERIES_CODE", &self.path)?;
        let country_idx = header.require("COUNTRY", &self.path)?;
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(ProjectionRow {
                series_code: record.get(code_idx).unwrap_or_default().trim().to_string(),
                country_name: record.get(country_idx).unwrap_or_default().trim().to_string(),
                values: header.year_values(&record),
            });
        }
        debug!(path = %self.path.display(), rows = rows.len(), "read projection sheet");
        Ok(rows)
    }
}

/// World Bank v2 API client (WDI and WGI share the endpoint).
pub struct WorldBankClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl WorldBankClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl RemoteSource for WorldBankClient {
    fn fetch_indicator(
        &self,
        indicator: &str,
        countries: &[String],
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<ApiObservation>> {
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url,
            countries.join(";"),
            indicator
        );
        let body: Value = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("per_page", "20000".to_string()),
                ("date", format!("{}:{}", start_year, end_year)),
            ])
            .send()?
            .json()?;
        parse_api_payload(indicator, body)
    }
}

/// Decode the `[metadata, [records...]]` envelope of the API.
pub fn parse_api_payload(indicator: &str, body: Value) -> Result<Vec<ApiObservation>> {
    let malformed = |reason: &str| RatingError::Fetch {
        indicator: indicator.to_string(),
        reason: reason.to_string(),
    };
    let Value::Array(mut parts) = body else {
        return Err(malformed("payload is not an array"));
    };
    if parts.len() < 2 {
        return Err(malformed("payload has no record list"));
    }
    let records = parts.swap_remove(1);
    if !records.is_array() {
        return Err(malformed("record list is not an array"));
    }
    Ok(serde_json::from_value(records)?)
}

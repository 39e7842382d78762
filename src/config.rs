use crate::error::{RatingError, Result};
use crate::pipeline::Horizon;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings, read from the environment (a `.env` file is honoured
/// by the binary before this runs).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub outlook_path: PathBuf,
    pub api_base: String,
    pub horizon: Horizon,
    pub cache_ttl: Option<Duration>,
    pub log_level: String,
    pub log_format: String,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data.csv"),
            outlook_path: PathBuf::from("./outlook_data.csv"),
            api_base: "https://api.worldbank.org/v2".to_string(),
            horizon: Horizon { start_year: 2019, end_year: 2024, history_start_year: 1984 },
            cache_ttl: None,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RatingError::Config(format!("{} has an invalid value: {}", key, raw))),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from any key lookup; missing keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(v) = lookup("RATING_DATA_PATH") {
            s.data_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("RATING_OUTLOOK_PATH") {
            s.outlook_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("RATING_API_BASE") {
            s.api_base = v;
        }
        if let Some(v) = parsed(&lookup, "RATING_START_YEAR")? {
            s.horizon.start_year = v;
        }
        if let Some(v) = parsed(&lookup, "RATING_END_YEAR")? {
            s.horizon.end_year = v;
        }
        if let Some(v) = parsed(&lookup, "RATING_HISTORY_START_YEAR")? {
            s.horizon.history_start_year = v;
        }
        if let Some(secs) = parsed::<u64>(&lookup, "RATING_CACHE_TTL_SECS")? {
            s.cache_ttl = Some(Duration::from_secs(secs));
        }
        if let Some(v) = lookup("RATING_LOG_LEVEL") {
            s.log_level = v;
        }
        if let Some(v) = lookup("RATING_LOG_FORMAT") {
            s.log_format = v;
        }
        if let Some(v) = lookup("RATING_OUTPUT_DIR") {
            s.output_dir = PathBuf::from(v);
        }

        let h = s.horizon;
        if h.start_year > h.end_year || h.history_start_year > h.end_year {
            return Err(RatingError::Config(format!(
                "year range is empty (start {}, history start {}, end {})",
                h.start_year, h.history_start_year, h.end_year
            )));
        }
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let s = Settings::from_lookup(lookup(&[
            ("RATING_END_YEAR", "2023"),
            ("RATING_CACHE_TTL_SECS", "900"),
            ("RATING_DATA_PATH", "/tmp/weo.csv"),
        ]))
        .unwrap();
        assert_eq!(s.horizon.end_year, 2023);
        assert_eq!(s.cache_ttl, Some(Duration::from_secs(900)));
        assert_eq!(s.data_path, PathBuf::from("/tmp/weo.csv"));
    }

    #[test]
    fn bad_numbers_and_empty_ranges_are_rejected() {
        assert!(matches!(
            Settings::from_lookup(lookup(&[("RATING_START_YEAR", "twenty")])),
            Err(RatingError::Config(_))
        ));
        assert!(Settings::from_lookup(lookup(&[("RATING_START_YEAR", "2030")])).is_err());
    }
}

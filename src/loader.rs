use crate::countries::iso3_for_name;
use crate::error::Result;
use crate::indicators::{remote_indicators, LOCAL_PRECEDENCE, LOCAL_SERIES};
use crate::panel::Panel;
use crate::provider::{LocalSource, RemoteSource};
use crate::types::LocalSeriesRow;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Countries and year range a panel is built for.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub countries: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
}

impl Universe {
    fn contains_year(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub local_rows: usize,
    pub unmapped_rows: usize,
    pub remote_observations: usize,
    pub failed_indicators: Vec<String>,
    pub panel_rows: usize,
}

/// Reshape the local wide file into a panel with one column per local series.
///
/// Series codes match as case-insensitive substrings, so one series can pick
/// up several rows for the same country; the first non-missing value in file
/// order is kept for each (country, year).
pub fn build_local_panel(rows: &[LocalSeriesRow], universe: &Universe, report: &mut LoadReport) -> Panel {
    let mut panel = Panel::with_columns(LOCAL_SERIES.iter().map(|(name, _)| *name));
    let mut unmapped: HashSet<&str> = HashSet::new();

    for row in rows {
        report.local_rows += 1;
        let code = row.series_code.to_uppercase();
        let matching: Vec<&str> = LOCAL_SERIES
            .iter()
            .filter(|(_, series)| code.contains(series))
            .map(|(name, _)| *name)
            .collect();
        if matching.is_empty() {
            continue;
        }
        let Some(iso3) = iso3_for_name(&row.country) else {
            report.unmapped_rows += 1;
            unmapped.insert(row.country.as_str());
            continue;
        };
        for (&year, &value) in row.values.iter().filter(|(y, _)| universe.contains_year(**y)) {
            panel.ensure_row(iso3, year);
            for name in &matching {
                panel.set_if_missing(iso3, year, name, value);
            }
        }
    }

    if !unmapped.is_empty() {
        let mut names: Vec<&str> = unmapped.into_iter().collect();
        names.sort_unstable();
        debug!(count = names.len(), names = ?names, "dropped unmapped country names");
    }
    panel
}

/// Fetch every remote indicator and pivot the observations into columns.
///
/// A failed indicator is logged and skipped; its column stays declared but
/// empty. Repeated observations for one cell are averaged.
pub fn build_remote_panel(source: &dyn RemoteSource, universe: &Universe, report: &mut LoadReport) -> Panel {
    let wanted: HashSet<&str> = universe.countries.iter().map(String::as_str).collect();
    let mut cells: BTreeMap<(String, i32, &'static str), (f64, usize)> = BTreeMap::new();
    let mut panel = Panel::with_columns(remote_indicators().map(|(_, col)| col));

    for (code, column) in remote_indicators() {
        let observations = match source.fetch_indicator(code, &universe.countries, universe.start_year, universe.end_year) {
            Ok(obs) => obs,
            Err(e) => {
                warn!(indicator = code, error = %e, "skipping indicator");
                report.failed_indicators.push(code.to_string());
                continue;
            }
        };
        let mut kept = 0usize;
        for obs in observations {
            let (Some(country), Some(value)) = (obs.country, obs.value) else { continue };
            if !wanted.contains(country.as_str()) {
                continue;
            }
            let Some(year) = obs.date.as_deref().and_then(|d| d.trim().parse::<i32>().ok()) else {
                continue;
            };
            let e = cells.entry((country, year, column)).or_insert((0.0, 0));
            e.0 += value;
            e.1 += 1;
            kept += 1;
        }
        report.remote_observations += kept;
        debug!(indicator = code, observations = kept, "fetched indicator");
    }

    for ((country, year, column), (sum, n)) in cells {
        panel.set(&country, year, column, Some(sum / n as f64));
    }
    panel
}

/// Outer-join the local and remote panels. For the overlapping series the
/// local column wins: the remote column is dropped and the local one takes
/// the canonical name.
pub fn merge_sources(mut local: Panel, mut remote: Panel) -> Panel {
    for (local_name, canonical) in LOCAL_PRECEDENCE {
        remote.drop_column(canonical);
        local.rename_column(local_name, canonical);
    }
    local.outer_join(&remote)
}

/// Build the scoring-universe panel from both sources.
pub fn build_panel(
    local: &dyn LocalSource,
    remote: &dyn RemoteSource,
    universe: &Universe,
) -> Result<(Panel, LoadReport)> {
    let mut report = LoadReport::default();
    let rows = local.series_rows()?;
    let local_panel = build_local_panel(&rows, universe, &mut report);
    let remote_panel = build_remote_panel(remote, universe, &mut report);
    let panel = merge_sources(local_panel, remote_panel);
    report.panel_rows = panel.len();
    info!(
        rows = report.panel_rows,
        unmapped = report.unmapped_rows,
        failed = report.failed_indicators.len(),
        "built merged panel"
    );
    Ok((panel, report))
}

/// Build the long-history panel from the remote source alone.
pub fn build_history_panel(remote: &dyn RemoteSource, universe: &Universe) -> (Panel, LoadReport) {
    let mut report = LoadReport::default();
    let panel = build_remote_panel(remote, universe, &mut report);
    report.panel_rows = panel.len();
    info!(rows = report.panel_rows, failed = report.failed_indicators.len(), "built history panel");
    (panel, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RatingError;
    use crate::types::ApiObservation;
    use std::collections::HashMap;

    struct FakeRemote {
        data: HashMap<&'static str, Vec<ApiObservation>>,
    }

    impl RemoteSource for FakeRemote {
        fn fetch_indicator(&self, indicator: &str, _: &[String], _: i32, _: i32) -> Result<Vec<ApiObservation>> {
            self.data.get(indicator).cloned().ok_or_else(|| RatingError::Fetch {
                indicator: indicator.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    fn obs(country: &str, year: &str, value: Option<f64>) -> ApiObservation {
        ApiObservation {
            country: Some(country.to_string()),
            date: Some(year.to_string()),
            value,
        }
    }

    fn universe() -> Universe {
        Universe {
            countries: vec!["FRA".to_string(), "DEU".to_string()],
            start_year: 2019,
            end_year: 2020,
        }
    }

    fn local_row(code: &str, country: &str, values: &[(i32, Option<f64>)]) -> LocalSeriesRow {
        LocalSeriesRow {
            series_code: code.to_string(),
            country: country.to_string(),
            values: values.iter().copied().collect(),
        }
    }

    #[test]
    fn local_rows_keep_first_non_missing_value() {
        let rows = vec![
            local_row("fra.ggxwdg_ngdp.a", "France", &[(2019, None), (2020, Some(115.0))]),
            local_row("FRA.GGXWDG_NGDP.B", "France", &[(2019, Some(97.0)), (2020, Some(999.0))]),
            local_row("XXX.GGXWDG_NGDP", "Atlantis", &[(2019, Some(1.0))]),
            local_row("FRA.GGXWDG_NGDP", "France", &[(2018, Some(5.0))]),
        ];
        let mut report = LoadReport::default();
        let p = build_local_panel(&rows, &universe(), &mut report);
        assert_eq!(p.get("FRA", 2019, "Dette_publique_PIB"), Some(97.0));
        assert_eq!(p.get("FRA", 2020, "Dette_publique_PIB"), Some(115.0));
        assert_eq!(p.row("FRA", 2018), None);
        assert_eq!(report.unmapped_rows, 1);
        assert_eq!(p.columns().len(), LOCAL_SERIES.len());
    }

    #[test]
    fn bca_substring_also_matches_current_account_series() {
        let rows = vec![local_row("DEU.BCA_NGDPD", "Germany", &[(2020, Some(6.8))])];
        let mut report = LoadReport::default();
        let p = build_local_panel(&rows, &universe(), &mut report);
        assert_eq!(p.get("DEU", 2020, "Balance_courante_PIB"), Some(6.8));
        assert_eq!(p.get("DEU", 2020, "Balance_commerciale"), Some(6.8));
    }

    #[test]
    fn remote_failures_and_foreign_countries_are_skipped() {
        let mut data = HashMap::new();
        data.insert(
            "FP.CPI.TOTL.ZG",
            vec![
                obs("FRA", "2020", Some(0.5)),
                obs("FRA", "2020", Some(1.5)),
                obs("USA", "2020", Some(1.2)),
                obs("DEU", "2020", None),
                obs("DEU", "bad", Some(3.0)),
            ],
        );
        let remote = FakeRemote { data };
        let mut report = LoadReport::default();
        let p = build_remote_panel(&remote, &universe(), &mut report);
        assert_eq!(p.get("FRA", 2020, "Inflation"), Some(1.0));
        assert_eq!(p.row("USA", 2020), None);
        assert_eq!(p.row("DEU", 2020), None);
        assert_eq!(report.failed_indicators.len(), 15);
        assert!(p.has_column("Corruption"));
    }

    #[test]
    fn local_series_win_over_remote_duplicates() {
        let mut local = Panel::with_columns(LOCAL_SERIES.iter().map(|(n, _)| *n));
        local.set("FRA", 2020, "Dette_publique_PIB", Some(115.0));
        local.set("FRA", 2020, "Recettes_publiques", Some(52.0));
        let mut remote = Panel::with_columns(remote_indicators().map(|(_, c)| c));
        remote.set("FRA", 2020, "Dette_publique_PIB", Some(120.0));
        remote.set("FRA", 2020, "Recettes_publiques_PIB", Some(50.0));
        remote.set("FRA", 2021, "Depenses_publiques_PIB", Some(58.0));
        remote.set("FRA", 2020, "Inflation", Some(0.5));

        let merged = merge_sources(local, remote);
        assert_eq!(merged.get("FRA", 2020, "Dette_publique_PIB"), Some(115.0));
        assert_eq!(merged.get("FRA", 2020, "Recettes_publiques_PIB"), Some(52.0));
        assert_eq!(merged.get("FRA", 2021, "Depenses_publiques_PIB"), None);
        assert_eq!(merged.get("FRA", 2020, "Inflation"), Some(0.5));
        assert!(!merged.has_column("Recettes_publiques"));
        assert!(merged.has_column("BalanceCourante_PIB"));
        let unique: HashSet<&String> = merged.columns().iter().collect();
        assert_eq!(unique.len(), merged.columns().len());
    }
}

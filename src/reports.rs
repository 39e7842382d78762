use crate::countries::display_name;
use crate::error::{RatingError, Result};
use crate::indicators::{is_valid_indicator, z_column};
use crate::outlook::Outlook;
use crate::panel::{Panel, Row};
use crate::scoring::{RatingScale, ScoredRecord, ScoredTable};
use crate::trend::SlopeRecord;
use crate::types::{AgencyComparisonRow, GradeCount, OutlookRow, RankingRow, RunSummary, SlopeRow};
use crate::util::{format_number, format_opt};
use chrono::Utc;
use std::collections::HashMap;

/// History row of a focus country, enriched with its scoring-year result.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub country: String,
    pub name: Option<&'static str>,
    pub year: i32,
    pub values: Row,
    pub scored: Option<ScoredRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountrySnapshot {
    pub rows: Vec<SnapshotRow>,
}

impl CountrySnapshot {
    /// Left-join the scored cross-section onto the history panel.
    pub fn build(history: &Panel, scored: &ScoredTable) -> Self {
        let rows = history
            .rows()
            .map(|((country, year), values)| SnapshotRow {
                country: country.clone(),
                name: display_name(country),
                year: *year,
                values: values.clone(),
                scored: if *year == scored.year { scored.get(country).cloned() } else { None },
            })
            .collect();
        Self { rows }
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.rows.iter().map(|r| r.year).max()
    }

    /// The country's row in the latest snapshot year.
    pub fn latest(&self, country: &str) -> Result<&SnapshotRow> {
        let year = self
            .latest_year()
            .ok_or_else(|| RatingError::NoData("empty snapshot".to_string()))?;
        self.rows
            .iter()
            .find(|r| r.year == year && r.country == country)
            .ok_or_else(|| RatingError::UnknownCountry(country.to_string()))
    }

    pub fn countries(&self) -> Vec<String> {
        let mut out: Vec<String> = self.rows.iter().map(|r| r.country.clone()).collect();
        out.dedup();
        out
    }
}

const MACRO_PILLARS: &[&str] = &[
    "Croissance_PIB",
    "PIB_par_habitant",
    "Inflation",
    "Dette_publique_PIB",
    "BalanceCourante_PIB",
    "Reserves_sur_Importations",
];

const INSTITUTIONAL_PILLARS: &[&str] = &[
    "Voix_responsabilisation",
    "Stabilite_Politique",
    "Efficacite_Gouvernement",
    "Etat_de_droit",
    "Corruption",
];

/// Z-scores of one country mapped onto a 0–10 scale for the radar charts.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarProfile {
    pub country: String,
    pub macro_axes: Vec<(String, f64)>,
    pub institutional_axes: Vec<(String, f64)>,
}

pub fn z_to_ten(z: f64) -> f64 {
    (3.0 * z + 5.0).clamp(0.0, 10.0)
}

pub fn radar_profile(snapshot: &CountrySnapshot, country: &str) -> Result<RadarProfile> {
    let row = snapshot.latest(country)?;
    let axes = |pillars: &[&str]| -> Vec<(String, f64)> {
        pillars
            .iter()
            .map(|p| {
                let z = row.scored.as_ref().and_then(|s| s.z_of(p)).unwrap_or(0.0);
                (z_column(p), z_to_ten(z))
            })
            .collect()
    };
    Ok(RadarProfile {
        country: country.to_string(),
        macro_axes: axes(MACRO_PILLARS),
        institutional_axes: axes(INSTITUTIONAL_PILLARS),
    })
}

/// One indicator over every snapshot year, per country.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub indicator: String,
    pub years: Vec<i32>,
    pub series: Vec<(String, Vec<Option<f64>>)>,
}

pub fn time_series(snapshot: &CountrySnapshot, indicator: &str, countries: Option<&[String]>) -> Result<TimeSeries> {
    if !is_valid_indicator(indicator) {
        return Err(RatingError::InvalidIndicator(indicator.to_string()));
    }
    let mut years: Vec<i32> = snapshot.rows.iter().map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();

    let available = snapshot.countries();
    let selected: Vec<String> = match countries {
        Some(list) => list.iter().filter(|c| available.contains(c)).cloned().collect(),
        None => available,
    };

    let mut series = Vec::new();
    for country in selected {
        let by_year: HashMap<i32, f64> = snapshot
            .rows
            .iter()
            .filter(|r| r.country == country)
            .filter_map(|r| r.values.get(indicator).map(|v| (r.year, *v)))
            .collect();
        if by_year.is_empty() {
            continue;
        }
        let values = years.iter().map(|y| by_year.get(y).copied()).collect();
        series.push((country, values));
    }
    if series.is_empty() {
        return Err(RatingError::NoData(format!("no country has data for {}", indicator)));
    }
    Ok(TimeSeries { indicator: indicator.to_string(), years, series })
}

/// Published agency grades (Moody's, Fitch, S&P) used as the benchmark.
pub const AGENCY_RATINGS: &[(&str, &str, &str, &str)] = &[
    ("USA", "Aa1", "AA+", "AA+"),
    ("DEU", "Aaa", "AAA", "AAA"),
    ("FRA", "Aa3", "A+", "A+"),
    ("JPN", "A1", "A", "A+"),
    ("CAN", "Aaa", "AA+", "AAA"),
    ("IND", "Baa3", "BBB-", "BBB"),
    ("BRA", "Ba1", "BB", "BB"),
    ("ZAF", "Ba2", "BB-", "BB"),
    ("IDN", "Baa2", "BBB", "BBB"),
    ("MAR", "Ba1", "BB+", "BBB-"),
];

const MOODY_NOTCHES: &[&str] = &[
    "Aaa", "Aa1", "Aa2", "Aa3", "A1", "A2", "A3", "Baa1", "Baa2", "Baa3", "Ba1", "Ba2", "Ba3", "B1", "B2", "B3",
];

/// Position of an agency grade on the 22-step ladder (AAA/Aaa = 1, D = 22).
pub fn agency_notch(scale: &RatingScale, label: &str) -> Option<usize> {
    scale
        .notch(label)
        .or_else(|| MOODY_NOTCHES.iter().position(|m| *m == label).map(|i| i + 1))
}

pub fn agency_comparison(snapshot: &CountrySnapshot) -> Vec<AgencyComparisonRow> {
    let scale = RatingScale::default();
    AGENCY_RATINGS
        .iter()
        .map(|(country, moody, fitch, sp)| {
            let notches: Vec<f64> = [moody, fitch, sp]
                .iter()
                .filter_map(|l| agency_notch(&scale, l))
                .map(|n| n as f64)
                .collect();
            let average = crate::stats::mean(&notches);
            let model = snapshot
                .latest(country)
                .ok()
                .and_then(|r| r.scored.as_ref())
                .map(|s| s.rating);
            let model_notch = model.and_then(|m| scale.notch(m)).map(|n| n as f64);
            let gap = match (model_notch, average) {
                (Some(m), Some(a)) => Some(m - a),
                _ => None,
            };
            AgencyComparisonRow {
                country: country.to_string(),
                name: display_name(country).unwrap_or_default().to_string(),
                moody: moody.to_string(),
                fitch: fitch.to_string(),
                sp: sp.to_string(),
                agency_average: format_opt(average, 2),
                model_rating: model.unwrap_or_default().to_string(),
                model_notch: format_opt(model_notch, 0),
                gap: format_opt(gap, 2),
            }
        })
        .collect()
}

pub fn ranking_rows(scored: &ScoredTable) -> Vec<RankingRow> {
    scored
        .ranked()
        .into_iter()
        .enumerate()
        .map(|(idx, r)| RankingRow {
            rank: idx + 1,
            country: r.country.clone(),
            score: format_number(r.score, 2),
            rating: r.rating.to_string(),
        })
        .collect()
}

pub fn slope_rows(slopes: &[SlopeRecord]) -> Vec<SlopeRow> {
    slopes
        .iter()
        .map(|s| SlopeRow {
            country: s.country.clone(),
            growth: format_opt(s.growth, 4),
            debt: format_opt(s.debt, 4),
            inflation: format_opt(s.inflation, 4),
            reserves_coverage: format_opt(s.reserves_coverage, 4),
        })
        .collect()
}

pub fn outlook_row(country: &str, rating: Option<&str>, outlook: Outlook, comment: String) -> OutlookRow {
    OutlookRow {
        country: country.to_string(),
        rating: rating.unwrap_or_default().to_string(),
        outlook: outlook.to_string(),
        comment,
    }
}

pub fn generate_summary(scored: &ScoredTable) -> RunSummary {
    let grade_counts = RatingScale::default()
        .labels()
        .filter_map(|grade| {
            let countries = scored.records.iter().filter(|r| r.rating == grade).count();
            (countries > 0).then(|| GradeCount { grade: grade.to_string(), countries })
        })
        .collect();
    RunSummary {
        generated_at: Utc::now(),
        scoring_year: scored.year,
        countries_scored: scored.records.len(),
        effective_features: scored.effective_features.clone(),
        excluded_features: scored.excluded_features.clone(),
        grade_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::CountryGroups;
    use crate::scoring::score_cross_section;

    fn fixture() -> (Panel, ScoredTable) {
        let mut scoring = Panel::default();
        let mut history = Panel::default();
        for (c, gdp, stab) in [("USA", 80000.0, 0.2), ("MAR", 3800.0, -0.3), ("BRA", 9000.0, -0.5)] {
            scoring.set(c, 2024, "PIB_par_habitant", Some(gdp));
            scoring.set(c, 2024, "Stabilite_Politique", Some(stab));
            for year in 2022..=2024 {
                history.set(c, year, "Inflation", Some(year as f64 - 2020.0));
            }
        }
        history.set("JPN", 2023, "Inflation", Some(3.1));
        let scored = score_cross_section(&scoring, 2024, &CountryGroups::default());
        (history, scored)
    }

    #[test]
    fn snapshot_attaches_scores_to_scoring_year_only() {
        let (history, scored) = fixture();
        let snap = CountrySnapshot::build(&history, &scored);
        let usa: Vec<&SnapshotRow> = snap.rows.iter().filter(|r| r.country == "USA").collect();
        assert_eq!(usa.len(), 3);
        assert!(usa[0].scored.is_none());
        assert!(usa[2].scored.is_some());
        assert_eq!(usa[2].name, Some("États-Unis"));
        assert!(snap.latest("JPN").is_err());
    }

    #[test]
    fn radar_maps_z_to_ten_point_scale() {
        let (history, scored) = fixture();
        let snap = CountrySnapshot::build(&history, &scored);
        let r = radar_profile(&snap, "USA").unwrap();
        assert_eq!(r.macro_axes.len(), 6);
        assert_eq!(r.institutional_axes.len(), 5);
        assert!(r.macro_axes.iter().chain(&r.institutional_axes).all(|(_, v)| (0.0..=10.0).contains(v)));
        // corruption has no data, so its z is 0
        assert_eq!(r.institutional_axes[4], ("Corruption_z".to_string(), 5.0));
        assert!(matches!(radar_profile(&snap, "CHE"), Err(RatingError::UnknownCountry(_))));
        assert_eq!(z_to_ten(2.0), 10.0);
        assert_eq!(z_to_ten(-2.0), 0.0);
    }

    #[test]
    fn time_series_validates_indicator_first() {
        let (history, scored) = fixture();
        let snap = CountrySnapshot::build(&history, &scored);
        assert!(matches!(
            time_series(&snap, "Score_solvabilite", None),
            Err(RatingError::InvalidIndicator(_))
        ));
        assert!(matches!(time_series(&snap, "Corruption", None), Err(RatingError::NoData(_))));
        let ts = time_series(&snap, "Inflation", None).unwrap();
        assert_eq!(ts.years, vec![2022, 2023, 2024]);
        let jpn = ts.series.iter().find(|(c, _)| c == "JPN").unwrap();
        assert_eq!(jpn.1, vec![None, Some(3.1), None]);
        let only = time_series(&snap, "Inflation", Some(&["MAR".to_string(), "XXX".to_string()])).unwrap();
        assert_eq!(only.series.len(), 1);
    }

    #[test]
    fn agency_notches_cover_both_notations() {
        let s = RatingScale::default();
        assert_eq!(agency_notch(&s, "Aaa"), Some(1));
        assert_eq!(agency_notch(&s, "Baa3"), Some(10));
        assert_eq!(agency_notch(&s, "BBB-"), Some(10));
        assert_eq!(agency_notch(&s, "CCC"), Some(18));
    }

    #[test]
    fn agency_gap_is_model_minus_average() {
        let (history, scored) = fixture();
        let snap = CountrySnapshot::build(&history, &scored);
        let rows = agency_comparison(&snap);
        assert_eq!(rows.len(), 10);
        let mar = rows.iter().find(|r| r.country == "MAR").unwrap();
        assert_eq!(mar.agency_average, "10.67");
        let model = scale_notch(&scored, "MAR");
        assert_eq!(mar.gap, format_number(model - 32.0 / 3.0, 2));
        let deu = rows.iter().find(|r| r.country == "DEU").unwrap();
        assert_eq!(deu.gap, "");
    }

    fn scale_notch(scored: &ScoredTable, country: &str) -> f64 {
        let rating = scored.get(country).unwrap().rating;
        RatingScale::default().notch(rating).unwrap() as f64
    }

    #[test]
    fn ranking_rows_are_numbered_from_one() {
        let (_, scored) = fixture();
        let rows = ranking_rows(&scored);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].country, "USA");
        let summary = generate_summary(&scored);
        assert_eq!(summary.countries_scored, 3);
        assert_eq!(summary.grade_counts.iter().map(|g| g.countries).sum::<usize>(), 3);
    }

    #[test]
    fn grade_counts_follow_the_ladder() {
        let (_, scored) = fixture();
        let summary = generate_summary(&scored);
        let scale = RatingScale::default();
        let notches: Vec<usize> = summary.grade_counts.iter().map(|g| scale.notch(&g.grade).unwrap()).collect();
        assert!(notches.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(summary.grade_counts, generate_summary(&scored).grade_counts);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["grade_counts"].is_array());
    }
}

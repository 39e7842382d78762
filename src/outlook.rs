//! Outlook classification.
//!
//! Two independent mechanisms: threshold rules over latest levels and
//! full-history slopes, and a weighted score over the recent slopes of the
//! projection panel. They treat missing data differently: the rules read a
//! missing slope as 0, the projection score skips the indicator.
use crate::error::{RatingError, Result};
use crate::provider::ProjectionSource;
use crate::trend::SlopeRecord;
use crate::types::ProjectionRow;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outlook {
    Positive,
    Stable,
    Negative,
}

impl Outlook {
    pub fn name(&self) -> &'static str {
        match self {
            Outlook::Positive => "Positive",
            Outlook::Stable => "Stable",
            Outlook::Negative => "Negative",
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cut-offs of the rule-based outlook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleThresholds {
    pub max_debt_to_gdp: f64,
    pub max_inflation: f64,
    pub positive_growth_slope: f64,
    pub positive_debt_slope: f64,
    pub positive_reserves_slope: f64,
    pub negative_growth_slope: f64,
    pub negative_debt_slope: f64,
    pub negative_inflation_slope: f64,
}

pub const RULE_THRESHOLDS: RuleThresholds = RuleThresholds {
    max_debt_to_gdp: 140.0,
    max_inflation: 50.0,
    positive_growth_slope: 0.03,
    positive_debt_slope: -0.5,
    positive_reserves_slope: 0.0,
    negative_growth_slope: -0.01,
    negative_debt_slope: 0.5,
    negative_inflation_slope: 0.5,
};

/// Rule-based outlook from latest-year levels and full-history slopes.
///
/// Debt above 140% of GDP or inflation above 50% is Negative whatever the
/// trends. Missing levels never trigger the override; missing slopes count
/// as no trend.
pub fn rule_outlook(debt_to_gdp: Option<f64>, inflation: Option<f64>, slopes: &SlopeRecord) -> Outlook {
    let t = RULE_THRESHOLDS;
    if debt_to_gdp.unwrap_or(0.0) > t.max_debt_to_gdp || inflation.unwrap_or(0.0) > t.max_inflation {
        return Outlook::Negative;
    }

    let g = slopes.growth.unwrap_or(0.0);
    let d = slopes.debt.unwrap_or(0.0);
    let i = slopes.inflation.unwrap_or(0.0);
    let r = slopes.reserves_coverage.unwrap_or(0.0);

    if g > t.positive_growth_slope && d < t.positive_debt_slope && r > t.positive_reserves_slope {
        return Outlook::Positive;
    }
    if g < t.negative_growth_slope && d > t.negative_debt_slope && i > t.negative_inflation_slope {
        return Outlook::Negative;
    }
    Outlook::Stable
}

/// Projection series codes kept in the panel, as (code, variable).
pub const PROJECTION_VARIABLES: &[(&str, &str)] = &[
    ("GGXWDG_NGDP", "Dette_publique_PIB"),
    ("NGSD_NGDP", "Epargne_nationale_PIB"),
    ("GGXCNL_NGDP", "Solde_budgetaire_PIB"),
    ("NGDP_RPCH", "Croissance_PIB"),
    ("PCPIPCH", "Inflation_CPI"),
    ("LUR", "Taux_chomage"),
    ("BCA_NGDPD", "BalanceCourante_PIB"),
];

/// Signed weights of each projected variable's recent slope.
pub const PROJECTION_WEIGHTS: &[(&str, f64)] = &[
    ("Solde_budgetaire_PIB", 0.35),
    ("Dette_publique_PIB", -0.20),
    ("Epargne_nationale_PIB", 0.10),
    ("BalanceCourante_PIB", 0.10),
    ("Croissance_PIB", 0.10),
    ("Inflation_CPI", -0.07),
    ("Taux_chomage", -0.08),
];

/// Number of trailing observations the projection slope is fitted on.
pub const PROJECTION_WINDOW: usize = 5;
pub const PROJECTION_BAND: f64 = 0.20;

#[derive(Debug, Clone, Default, PartialEq)]
struct CountryProjection {
    name: String,
    series: BTreeMap<&'static str, BTreeMap<i32, f64>>,
}

/// Long-form projection data keyed by country code, year and variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionPanel {
    countries: BTreeMap<String, CountryProjection>,
}

impl ProjectionPanel {
    /// Reshape sheet rows: split `COUNTRY.VARCODE`, keep whitelisted
    /// variables, average duplicate cells.
    pub fn from_rows(rows: &[ProjectionRow]) -> Self {
        let mut acc: BTreeMap<(String, &'static str, i32), (f64, usize)> = BTreeMap::new();
        let mut names: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let mut parts = row.series_code.split('.');
            let (Some(code), Some(var_code)) = (parts.next(), parts.next()) else { continue };
            let Some((_, variable)) = PROJECTION_VARIABLES.iter().find(|(c, _)| *c == var_code) else {
                continue;
            };
            for (year, value) in &row.values {
                let Some(v) = value else { continue };
                let e = acc.entry((code.to_string(), *variable, *year)).or_insert((0.0, 0));
                e.0 += v;
                e.1 += 1;
                names.entry(code.to_string()).or_insert_with(|| row.country_name.clone());
            }
        }

        let mut countries: BTreeMap<String, CountryProjection> = BTreeMap::new();
        for ((code, variable, year), (sum, n)) in acc {
            let entry = countries.entry(code.clone()).or_insert_with(|| CountryProjection {
                name: names.get(&code).cloned().unwrap_or_default(),
                series: BTreeMap::new(),
            });
            entry.series.entry(variable).or_default().insert(year, sum / n as f64);
        }
        Self { countries }
    }

    pub fn load(source: &dyn ProjectionSource) -> Result<Self> {
        let rows = source.projection_rows()?;
        let panel = Self::from_rows(&rows);
        debug!(countries = panel.countries.len(), "loaded projection panel");
        Ok(panel)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.countries.contains_key(code)
    }

    pub fn country_codes(&self) -> Vec<String> {
        self.countries.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorContribution {
    pub variable: String,
    pub weight: f64,
    pub slope: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionOutlook {
    pub country_code: String,
    pub country_name: String,
    pub score: f64,
    pub outlook: Outlook,
    pub contributions: Vec<IndicatorContribution>,
    /// Every whitelisted variable present for the country, by year.
    pub series: BTreeMap<String, Vec<(i32, f64)>>,
}

/// Slope over the last `window` observations, against their position
/// (0, 1, ...). `None` when fewer than `window` observations exist.
pub fn recent_slope(series: &BTreeMap<i32, f64>, window: usize) -> Option<f64> {
    if window < 2 || series.len() < window {
        return None;
    }
    let tail: Vec<Option<f64>> = series.values().skip(series.len() - window).map(|v| Some(*v)).collect();
    let xs: Vec<f64> = (0..window).map(|i| i as f64).collect();
    crate::stats::ols_slope(&xs, &tail)
}

pub fn classify_projection_score(score: f64) -> Outlook {
    if score > PROJECTION_BAND {
        Outlook::Positive
    } else if score < -PROJECTION_BAND {
        Outlook::Negative
    } else {
        Outlook::Stable
    }
}

/// Projection-based outlook for one country code.
pub fn projection_outlook(panel: &ProjectionPanel, country_code: &str) -> Result<ProjectionOutlook> {
    let c = panel
        .countries
        .get(country_code)
        .ok_or_else(|| RatingError::UnknownCountry(country_code.to_string()))?;

    let mut score = 0.0;
    let mut contributions = Vec::new();
    for (variable, weight) in PROJECTION_WEIGHTS {
        let Some(series) = c.series.get(variable) else { continue };
        let Some(slope) = recent_slope(series, PROJECTION_WINDOW) else { continue };
        score += slope * weight;
        contributions.push(IndicatorContribution {
            variable: variable.to_string(),
            weight: *weight,
            slope,
            contribution: slope * weight,
        });
    }

    let series = c
        .series
        .iter()
        .map(|(var, s)| (var.to_string(), s.iter().map(|(y, v)| (*y, *v)).collect()))
        .collect();

    Ok(ProjectionOutlook {
        country_code: country_code.to_string(),
        country_name: c.name.clone(),
        score,
        outlook: classify_projection_score(score),
        contributions,
        series,
    })
}

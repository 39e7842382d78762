use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabled::Tabled;

/// One row of the local wide file: a series for one country, one cell per year.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSeriesRow {
    pub series_code: String,
    pub country: String,
    pub values: BTreeMap<i32, Option<f64>>,
}

/// One record of the remote API payload, as delivered.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiObservation {
    #[serde(rename = "countryiso3code")]
    pub country: Option<String>,
    pub date: Option<String>,
    pub value: Option<f64>,
}

/// One row of the projection sheet. `series_code` reads `COUNTRY.VARCODE`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRow {
    pub series_code: String,
    pub country_name: String,
    pub values: BTreeMap<i32, Option<f64>>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Pays")]
    #[tabled(rename = "Pays")]
    pub country: String,
    #[serde(rename = "Score_solvabilite")]
    #[tabled(rename = "Score_solvabilite")]
    pub score: String,
    #[serde(rename = "Rating_modele")]
    #[tabled(rename = "Rating_modele")]
    pub rating: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SlopeRow {
    #[serde(rename = "Pays")]
    #[tabled(rename = "Pays")]
    pub country: String,
    #[serde(rename = "slope_Croissance_PIB")]
    #[tabled(rename = "slope_Croissance_PIB")]
    pub growth: String,
    #[serde(rename = "slope_Dette_publique_PIB")]
    #[tabled(rename = "slope_Dette_publique_PIB")]
    pub debt: String,
    #[serde(rename = "slope_Inflation")]
    #[tabled(rename = "slope_Inflation")]
    pub inflation: String,
    #[serde(rename = "slope_Reserves_sur_Importations")]
    #[tabled(rename = "slope_Reserves_sur_Importations")]
    pub reserves_coverage: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OutlookRow {
    #[serde(rename = "Pays")]
    #[tabled(rename = "Pays")]
    pub country: String,
    #[serde(rename = "Rating_modele")]
    #[tabled(rename = "Rating_modele")]
    pub rating: String,
    #[serde(rename = "Outlook")]
    #[tabled(rename = "Outlook")]
    pub outlook: String,
    #[serde(rename = "Commentaire")]
    #[tabled(rename = "Commentaire")]
    pub comment: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AgencyComparisonRow {
    #[serde(rename = "Pays")]
    #[tabled(rename = "Pays")]
    pub country: String,
    #[serde(rename = "Pays_nom")]
    #[tabled(rename = "Pays_nom")]
    pub name: String,
    #[serde(rename = "Moody")]
    #[tabled(rename = "Moody")]
    pub moody: String,
    #[serde(rename = "Fitch")]
    #[tabled(rename = "Fitch")]
    pub fitch: String,
    #[serde(rename = "S&P")]
    #[tabled(rename = "S&P")]
    pub sp: String,
    #[serde(rename = "Moyenne_agences_num")]
    #[tabled(rename = "Moyenne_agences_num")]
    pub agency_average: String,
    #[serde(rename = "Rating_modele")]
    #[tabled(rename = "Rating_modele")]
    pub model_rating: String,
    #[serde(rename = "Model_num")]
    #[tabled(rename = "Model_num")]
    pub model_notch: String,
    #[serde(rename = "Ecart_model_vs_agences")]
    #[tabled(rename = "Ecart_model_vs_agences")]
    pub gap: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub scoring_year: i32,
    pub countries_scored: usize,
    pub effective_features: Vec<String>,
    pub excluded_features: Vec<String>,
    /// Grades that occur, best first.
    pub grade_counts: Vec<GradeCount>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GradeCount {
    pub grade: String,
    pub countries: usize,
}

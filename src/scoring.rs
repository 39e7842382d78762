//! Cross-sectional standardization, composite solvency score and rating grade.
//!
//! Scores are relative: every z-score is taken against the countries present
//! in the scoring year, so adding or removing a country moves everyone.
use crate::countries::{CountryGroups, CountryTags, Tag};
use crate::indicators::{z_column, FEATURES};
use crate::panel::{Panel, Row};
use crate::stats::{mean, population_std};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One term of the composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Term {
    /// Standardized value of a raw feature.
    Z(&'static str),
    /// 1 when the country carries the tag, else 0.
    Flag(Tag),
}

/// Weighted terms of the solvency score.
pub const SCORE_WEIGHTS: &[(Term, f64)] = &[
    (Term::Z("PIB_par_habitant"), 0.50),
    (Term::Z("Croissance_PIB"), 0.30),
    (Term::Z("Volatilite_Croissance"), -0.20),
    (Term::Z("Inflation"), -0.20),
    (Term::Z("Volatilite_Inflation"), -0.25),
    (Term::Z("Deficit_budgetaire_PIB"), -0.15),
    (Term::Z("Recettes_publiques_PIB"), 0.25),
    (Term::Z("Dette_publique_PIB"), -0.35),
    (Term::Z("BalanceCourante_PIB"), 0.25),
    (Term::Z("Reserves_sur_Importations"), 0.60),
    (Term::Z("Stabilite_Politique"), 1.2),
    (Term::Z("Efficacite_Gouvernement"), 1.0),
    (Term::Z("Etat_de_droit"), 1.1),
    (Term::Z("Voix_responsabilisation"), 0.8),
    (Term::Z("Corruption"), -0.6),
    (Term::Flag(Tag::Developed), 0.4),
    (Term::Z("PIB_total_$"), 0.3),
    (Term::Z("Balance_commerciale"), 0.3),
];

/// Bonuses added on top of the weighted terms.
pub const STRUCTURAL_BONUSES: &[(Tag, f64)] = &[
    (Tag::ReserveCurrency, 1.5),
    (Tag::SafeHaven, 0.2),
    (Tag::EuroCore, 0.3),
];

/// Lower bounds (exclusive) of each grade, best first.
const RATING_LADDER: &[(f64, &str)] = &[
    (7.4, "AAA"),
    (5.6, "AA+"),
    (4.7, "AA"),
    (4.0, "AA-"),
    (3.5, "A+"),
    (2.7, "A"),
    (2.0, "A-"),
    (1.3, "BBB+"),
    (0.7, "BBB"),
    (0.0, "BBB-"),
    (-0.3, "BB+"),
    (-0.8, "BB"),
    (-1.5, "BB-"),
    (-2.5, "B+"),
    (-3.5, "B"),
    (-4.5, "B-"),
    (-6.0, "CCC+"),
    (-7.5, "CCC"),
    (-9.0, "CCC-"),
    (-12.0, "CC"),
    (-15.0, "C"),
];

const TERMINAL_GRADE: &str = "D";

/// Ordered score→grade ladder with an unbounded floor.
#[derive(Debug, Clone)]
pub struct RatingScale {
    steps: &'static [(f64, &'static str)],
    floor: &'static str,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { steps: RATING_LADDER, floor: TERMINAL_GRADE }
    }
}

impl RatingScale {
    /// First grade whose lower bound the score strictly exceeds.
    pub fn grade(&self, score: f64) -> &'static str {
        self.steps
            .iter()
            .find(|(bound, _)| score > *bound)
            .map(|(_, label)| *label)
            .unwrap_or(self.floor)
    }

    /// 1-based position of a grade on the ladder, the floor included.
    pub fn notch(&self, label: &str) -> Option<usize> {
        if label == self.floor {
            return Some(self.steps.len() + 1);
        }
        self.steps.iter().position(|(_, l)| *l == label).map(|i| i + 1)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|(_, l)| *l).chain(std::iter::once(self.floor))
    }
}

/// One country scored in the cross-section.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub country: String,
    pub year: i32,
    /// Raw values of the scoring year, every panel column that had one.
    pub values: Row,
    /// `<feature>_z` for every declared feature, 0 for excluded ones.
    pub z: BTreeMap<String, f64>,
    pub tags: CountryTags,
    pub score: f64,
    pub rating: &'static str,
}

impl ScoredRecord {
    pub fn z_of(&self, feature: &str) -> Option<f64> {
        self.z.get(&z_column(feature)).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTable {
    pub year: i32,
    pub effective_features: Vec<String>,
    pub excluded_features: Vec<String>,
    /// Sorted by country code.
    pub records: Vec<ScoredRecord>,
}

impl ScoredTable {
    pub fn get(&self, country: &str) -> Option<&ScoredRecord> {
        self.records.iter().find(|r| r.country == country)
    }

    /// Records by descending score; ties keep country order.
    pub fn ranked(&self) -> Vec<&ScoredRecord> {
        let mut out: Vec<&ScoredRecord> = self.records.iter().collect();
        out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        out
    }
}

/// Weighted sum of the score terms plus structural bonuses.
pub fn composite_score(z: &BTreeMap<String, f64>, tags: CountryTags) -> f64 {
    let flag = |t: Tag| if tags.has(t) { 1.0 } else { 0.0 };
    let weighted: f64 = SCORE_WEIGHTS
        .iter()
        .map(|(term, w)| match term {
            Term::Z(feature) => w * z.get(&z_column(feature)).copied().unwrap_or(0.0),
            Term::Flag(tag) => w * flag(*tag),
        })
        .sum();
    let bonus: f64 = STRUCTURAL_BONUSES.iter().map(|(tag, w)| w * flag(*tag)).sum();
    weighted + bonus
}

/// Fill missing cells with the column mean, then standardize with the
/// population standard deviation. A constant column standardizes to 0.
pub fn standardize(values: &[Option<f64>]) -> Vec<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let Some(fill) = mean(&present) else {
        return vec![0.0; values.len()];
    };
    let filled: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill)).collect();
    let m = mean(&filled).unwrap_or(fill);
    let sd = population_std(&filled).unwrap_or(0.0);
    // rounding in the mean leaves a constant column with sd of a few ulps
    let scale = filled.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let constant = filled.iter().all(|v| *v == fill) || sd <= f64::EPSILON * scale * 10.0;
    if constant {
        return vec![0.0; values.len()];
    }
    filled.iter().map(|v| (v - m) / sd).collect()
}

/// Score every country observed in `year`.
pub fn score_cross_section(panel: &Panel, year: i32, groups: &CountryGroups) -> ScoredTable {
    let scale = RatingScale::default();
    let section = panel.cross_section(year);

    let (effective, excluded): (Vec<&str>, Vec<&str>) = FEATURES
        .iter()
        .copied()
        .partition(|f| section.iter().any(|(_, row)| row.contains_key(*f)));
    if !excluded.is_empty() {
        debug!(year, excluded = ?excluded, "features without data excluded from standardization");
    }

    let mut z_by_country: Vec<BTreeMap<String, f64>> = section
        .iter()
        .map(|_| FEATURES.iter().map(|f| (z_column(f), 0.0)).collect())
        .collect();
    for feature in &effective {
        let column: Vec<Option<f64>> = section.iter().map(|(_, row)| row.get(*feature).copied()).collect();
        for (slot, z) in z_by_country.iter_mut().zip(standardize(&column)) {
            slot.insert(z_column(feature), z);
        }
    }

    let records: Vec<ScoredRecord> = section
        .iter()
        .zip(z_by_country)
        .map(|((country, row), z)| {
            let tags = groups.tags(country);
            let score = composite_score(&z, tags);
            ScoredRecord {
                country: country.to_string(),
                year,
                values: (*row).clone(),
                z,
                tags,
                score,
                rating: scale.grade(score),
            }
        })
        .collect();

    info!(year, countries = records.len(), effective = effective.len(), "scored cross-section");
    ScoredTable {
        year,
        effective_features: effective.iter().map(|f| f.to_string()).collect(),
        excluded_features: excluded.iter().map(|f| f.to_string()).collect(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn groups() -> CountryGroups {
        CountryGroups::from_lists(&["AAA"], &["BBB"], &["BBB"], &["AAA", "BBB"])
    }

    fn sample_panel() -> Panel {
        let mut p = Panel::with_columns(FEATURES.iter().copied());
        let rows: &[(&str, f64, Option<f64>, f64)] = &[
            ("AAA", 60000.0, Some(2.1), 1.2),
            ("BBB", 45000.0, None, 0.8),
            ("CCC", 9000.0, Some(6.5), -0.7),
            ("DDD", 3000.0, Some(12.0), -1.4),
        ];
        for (c, gdp, infl, stab) in rows {
            p.set(c, 2024, "PIB_par_habitant", Some(*gdp));
            p.set(c, 2024, "Inflation", *infl);
            p.set(c, 2024, "Stabilite_Politique", Some(*stab));
            p.set(c, 2023, "PIB_par_habitant", Some(1.0));
        }
        p.set("EEE", 2023, "PIB_par_habitant", Some(1.0));
        p
    }

    #[test]
    fn only_the_cutoff_year_is_scored() {
        let t = score_cross_section(&sample_panel(), 2024, &groups());
        assert_eq!(t.records.len(), 4);
        assert!(t.get("EEE").is_none());
    }

    #[test]
    fn z_columns_have_zero_mean_unit_std() {
        let t = score_cross_section(&sample_panel(), 2024, &groups());
        for f in &t.effective_features {
            let col: Vec<f64> = t.records.iter().map(|r| r.z_of(f).unwrap()).collect();
            assert_abs_diff_eq!(mean(&col).unwrap(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(population_std(&col).unwrap(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn excluded_features_get_constant_zero_z() {
        let t = score_cross_section(&sample_panel(), 2024, &groups());
        assert_eq!(t.effective_features.len(), 3);
        assert_eq!(t.excluded_features.len(), FEATURES.len() - 3);
        for r in &t.records {
            assert_eq!(r.z.len(), FEATURES.len());
            assert_eq!(r.z_of("Corruption"), Some(0.0));
        }
    }

    #[test]
    fn missing_cell_takes_the_column_mean() {
        let t = score_cross_section(&sample_panel(), 2024, &groups());
        let bbb = t.get("BBB").unwrap();
        let expected = standardize(&[Some(2.1), None, Some(6.5), Some(12.0)])[1];
        assert_abs_diff_eq!(bbb.z_of("Inflation").unwrap(), expected, epsilon = 1e-12);
        assert!(!bbb.values.contains_key("Inflation"));
    }

    #[test]
    fn score_is_the_weighted_sum_of_terms() {
        let t = score_cross_section(&sample_panel(), 2024, &groups());
        for r in &t.records {
            let mut expected = 0.0;
            for (term, w) in SCORE_WEIGHTS {
                expected += w * match term {
                    Term::Z(f) => r.z_of(f).unwrap(),
                    Term::Flag(tag) => r.tags.has(*tag) as u8 as f64,
                };
            }
            for (tag, w) in STRUCTURAL_BONUSES {
                expected += w * r.tags.has(*tag) as u8 as f64;
            }
            assert_abs_diff_eq!(r.score, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn constant_columns_standardize_to_zero() {
        assert_eq!(standardize(&[Some(0.1), None, None]), vec![0.0; 3]);
        assert_eq!(standardize(&[Some(0.7); 3]), vec![0.0; 3]);
        assert_eq!(standardize(&[None, None]), vec![0.0; 2]);
        let z = standardize(&[Some(1e-20), Some(3e-20)]);
        assert_abs_diff_eq!(z[0], -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(z[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn single_reporter_feature_does_not_shift_scores() {
        let mut p = Panel::default();
        for (c, gdp) in [("BRA", 9000.0), ("FRA", 45000.0), ("MAR", 3800.0)] {
            p.set(c, 2024, "PIB_par_habitant", Some(gdp));
        }
        let base = score_cross_section(&p, 2024, &CountryGroups::from_lists(&[], &[], &[], &[]));
        p.set("FRA", 2024, "Stabilite_Politique", Some(0.1));
        let t = score_cross_section(&p, 2024, &CountryGroups::from_lists(&[], &[], &[], &[]));
        assert!(t.effective_features.iter().any(|f| f == "Stabilite_Politique"));
        for r in &t.records {
            assert_eq!(r.z_of("Stabilite_Politique"), Some(0.0));
            let before = base.get(&r.country).unwrap();
            assert_abs_diff_eq!(r.score, before.score, epsilon = 1e-12);
            assert_eq!(r.rating, before.rating);
        }
    }

    #[test]
    fn bonuses_apply_by_membership() {
        let zeros: BTreeMap<String, f64> = BTreeMap::new();
        let us = CountryTags { reserve_currency: true, ..Default::default() };
        assert_abs_diff_eq!(composite_score(&zeros, us), 1.5, epsilon = 1e-12);
        let de = CountryTags { safe_haven: true, euro_core: true, developed: true, ..Default::default() };
        assert_abs_diff_eq!(composite_score(&zeros, de), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn ladder_boundaries_are_right_open() {
        let s = RatingScale::default();
        assert_eq!(s.grade(7.41), "AAA");
        assert_eq!(s.grade(7.4), "AA+");
        assert_eq!(s.grade(0.0), "BB+");
        assert_eq!(s.grade(0.01), "BBB-");
        assert_eq!(s.grade(-15.0), "D");
        assert_eq!(s.grade(-14.99), "C");
        assert_eq!(s.grade(f64::NAN), "D");
    }

    #[test]
    fn grades_never_improve_as_score_falls() {
        let s = RatingScale::default();
        let mut prev = 0;
        let mut score = 9.0;
        while score > -17.0 {
            let notch = s.notch(s.grade(score)).unwrap();
            assert!(notch >= prev);
            prev = notch;
            score -= 0.05;
        }
        assert_eq!(s.labels().count(), 22);
        assert_eq!(s.notch("AAA"), Some(1));
        assert_eq!(s.notch("D"), Some(22));
        assert_eq!(s.notch("Aaa"), None);
    }

    #[test]
    fn ranking_is_by_descending_score() {
        let t = score_cross_section(&sample_panel(), 2024, &groups());
        let ranked = t.ranked();
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(ranked[0].country, "AAA");
    }
}

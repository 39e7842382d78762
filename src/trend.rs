//! Full-history linear trends per country.
use crate::indicators::{DEBT, GROWTH, INFLATION, RESERVES_TO_IMPORTS, TREND_INDICATORS};
use crate::panel::Panel;
use crate::stats::ols_slope;
use serde::Serialize;

/// OLS slopes of the four trend indicators against the year. `None` when a
/// country has fewer than two observations of the indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlopeRecord {
    pub country: String,
    pub growth: Option<f64>,
    pub debt: Option<f64>,
    pub inflation: Option<f64>,
    pub reserves_coverage: Option<f64>,
}

impl SlopeRecord {
    pub fn slope(&self, indicator: &str) -> Option<f64> {
        match indicator {
            GROWTH => self.growth,
            DEBT => self.debt,
            INFLATION => self.inflation,
            RESERVES_TO_IMPORTS => self.reserves_coverage,
            _ => None,
        }
    }
}

/// Slope of one country's column over every year the panel holds for it.
pub fn country_slope(panel: &Panel, country: &str, column: &str) -> Option<f64> {
    let xs: Vec<f64> = panel.country_years(country).iter().map(|y| *y as f64).collect();
    let ys = panel.country_series(country, column);
    ols_slope(&xs, &ys)
}

pub fn compute_slopes(panel: &Panel) -> Vec<SlopeRecord> {
    panel
        .countries()
        .into_iter()
        .map(|country| {
            let mut s: [Option<f64>; 4] = [None; 4];
            for (slot, column) in s.iter_mut().zip(TREND_INDICATORS) {
                *slot = country_slope(panel, &country, column);
            }
            SlopeRecord {
                country,
                growth: s[0],
                debt: s[1],
                inflation: s[2],
                reserves_coverage: s[3],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn slope_is_fitted_on_present_points_only() {
        let mut p = Panel::default();
        p.set("ZAF", 2000, DEBT, Some(40.0));
        p.ensure_row("ZAF", 2001);
        p.set("ZAF", 2002, DEBT, Some(44.0));
        p.set("ZAF", 2003, DEBT, Some(46.0));
        let s = compute_slopes(&p);
        assert_eq!(s.len(), 1);
        assert_abs_diff_eq!(s[0].debt.unwrap(), 2.0, epsilon = 1e-9);
        assert_eq!(s[0].slope(DEBT), s[0].debt);
    }

    #[test]
    fn a_single_point_gives_no_slope() {
        let mut p = Panel::default();
        p.set("MAR", 2010, GROWTH, Some(3.0));
        p.ensure_row("MAR", 2011);
        let s = compute_slopes(&p);
        assert_eq!(s[0].growth, None);
        assert_eq!(s[0].inflation, None);
    }
}

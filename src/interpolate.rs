//! Per-country gap filling and derived indicators.
use crate::indicators::{
    GROWTH, GROWTH_VOLATILITY, IMPORTS, INFLATION, INFLATION_VOLATILITY, RESERVES, RESERVES_TO_IMPORTS,
};
use crate::panel::Panel;
use crate::stats::{interpolate_interior, rolling_sample_std};

const VOLATILITY_WINDOW: usize = 5;
const VOLATILITY_MIN_PERIODS: usize = 2;

/// Interpolate every column within each country, then add the reserve
/// coverage ratio and the rolling volatilities.
pub fn interpolate_panel(panel: &Panel) -> Panel {
    let mut out = panel.clone();
    for country in panel.countries() {
        let years = panel.country_years(&country);
        let xs: Vec<f64> = years.iter().map(|y| *y as f64).collect();
        for column in panel.columns() {
            let mut ys = panel.country_series(&country, column);
            interpolate_interior(&xs, &mut ys);
            for (year, v) in years.iter().zip(ys) {
                out.set(&country, *year, column, v);
            }
        }
    }
    derive_indicators(&mut out);
    out
}

/// Add `Reserves_sur_Importations`, `Volatilite_Croissance` and
/// `Volatilite_Inflation`. The columns are declared even when their inputs
/// are absent from the schema.
pub fn derive_indicators(panel: &mut Panel) {
    for column in [RESERVES_TO_IMPORTS, GROWTH_VOLATILITY, INFLATION_VOLATILITY] {
        panel.ensure_column(column);
    }
    for country in panel.countries() {
        let years = panel.country_years(&country);

        let reserves = panel.country_series(&country, RESERVES);
        let imports = panel.country_series(&country, IMPORTS);
        for (i, year) in years.iter().enumerate() {
            let ratio = match (reserves[i], imports[i]) {
                (Some(r), Some(m)) if m != 0.0 => Some(r / m),
                _ => None,
            };
            panel.set(&country, *year, RESERVES_TO_IMPORTS, ratio);
        }

        for (source, target) in [(GROWTH, GROWTH_VOLATILITY), (INFLATION, INFLATION_VOLATILITY)] {
            let series = panel.country_series(&country, source);
            let vol = rolling_sample_std(&series, VOLATILITY_WINDOW, VOLATILITY_MIN_PERIODS);
            for (year, v) in years.iter().zip(vol) {
                panel.set(&country, *year, target, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn never_extrapolates_beyond_observed_years() {
        let mut p = Panel::with_columns(["Inflation"]);
        for year in 2012..=2023 {
            p.ensure_row("BRA", year);
        }
        p.set("BRA", 2015, "Inflation", Some(9.0));
        p.set("BRA", 2020, "Inflation", Some(4.0));
        let out = interpolate_panel(&p);
        assert_eq!(out.get("BRA", 2014, "Inflation"), None);
        assert_eq!(out.get("BRA", 2021, "Inflation"), None);
        assert_abs_diff_eq!(out.get("BRA", 2017, "Inflation").unwrap(), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn gaps_are_filled_within_each_country_only() {
        let mut p = Panel::with_columns(["Croissance_PIB"]);
        p.set("CAN", 2019, "Croissance_PIB", Some(1.0));
        p.ensure_row("CAN", 2020);
        p.set("DEU", 2020, "Croissance_PIB", Some(5.0));
        p.set("DEU", 2021, "Croissance_PIB", Some(7.0));
        let out = interpolate_panel(&p);
        assert_eq!(out.get("CAN", 2020, "Croissance_PIB"), None);
    }

    #[test]
    fn derived_columns_exist_without_inputs() {
        let mut p = Panel::with_columns(["Corruption"]);
        p.set("MAR", 2020, "Corruption", Some(-0.3));
        let out = interpolate_panel(&p);
        for c in [RESERVES_TO_IMPORTS, GROWTH_VOLATILITY, INFLATION_VOLATILITY] {
            assert!(out.has_column(c));
            assert_eq!(out.get("MAR", 2020, c), None);
        }
    }

    #[test]
    fn ratio_and_volatility_follow_country_history() {
        let mut p = Panel::default();
        for (i, year) in (2019..=2021).enumerate() {
            p.set("IDN", year, RESERVES, Some(100.0 + i as f64 * 10.0));
            p.set("IDN", year, IMPORTS, Some(50.0));
            p.set("IDN", year, GROWTH, Some([5.0, -2.0, 3.7][i]));
        }
        let out = interpolate_panel(&p);
        assert_abs_diff_eq!(out.get("IDN", 2020, RESERVES_TO_IMPORTS).unwrap(), 2.2, epsilon = 1e-12);
        assert_eq!(out.get("IDN", 2019, GROWTH_VOLATILITY), None);
        let expected = crate::stats::sample_std(&[5.0, -2.0]).unwrap();
        assert_abs_diff_eq!(out.get("IDN", 2020, GROWTH_VOLATILITY).unwrap(), expected, epsilon = 1e-12);
    }
}

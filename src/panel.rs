//! Wide country/year table.
//!
//! A `Panel` keeps an ordered list of declared columns separately from the
//! cells, so a column can exist in the schema while holding no value at all.
//! Rows are keyed by (ISO3, year) and iterate in that order.
use std::collections::BTreeMap;

pub type RowKey = (String, i32);
pub type Row = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    columns: Vec<String>,
    rows: BTreeMap<RowKey, Row>,
}

impl Panel {
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut p = Panel::default();
        for c in columns {
            p.ensure_column(&c.into());
        }
        p
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Declare a column if absent. Existing cells are untouched.
    pub fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    /// Create the (country, year) row if absent, with no values.
    pub fn ensure_row(&mut self, country: &str, year: i32) {
        self.rows.entry((country.to_string(), year)).or_default();
    }

    pub fn get(&self, country: &str, year: i32, column: &str) -> Option<f64> {
        self.rows
            .get(&(country.to_string(), year))
            .and_then(|r| r.get(column))
            .copied()
    }

    /// Store a cell, declaring its column and row if needed. Non-finite
    /// values are treated as missing.
    pub fn set(&mut self, country: &str, year: i32, column: &str, value: Option<f64>) {
        self.ensure_column(column);
        let row = self.rows.entry((country.to_string(), year)).or_default();
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                row.insert(column.to_string(), v);
            }
            None => {
                row.remove(column);
            }
        }
    }

    /// Store a cell only when the slot is still empty.
    pub fn set_if_missing(&mut self, country: &str, year: i32, column: &str, value: Option<f64>) {
        if self.get(country, year, column).is_none() {
            self.set(country, year, column, value);
        } else {
            self.ensure_column(column);
        }
    }

    pub fn row(&self, country: &str, year: i32) -> Option<&Row> {
        self.rows.get(&(country.to_string(), year))
    }

    pub fn rows(&self) -> impl Iterator<Item = (&RowKey, &Row)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn countries(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (country, _) in self.rows.keys() {
            if out.last() != Some(country) {
                out.push(country.clone());
            }
        }
        out
    }

    pub fn years(&self) -> Vec<i32> {
        let mut ys: Vec<i32> = self.rows.keys().map(|(_, y)| *y).collect();
        ys.sort_unstable();
        ys.dedup();
        ys
    }

    pub fn max_year(&self) -> Option<i32> {
        self.rows.keys().map(|(_, y)| *y).max()
    }

    /// Years present for one country, ascending.
    pub fn country_years(&self, country: &str) -> Vec<i32> {
        self.rows
            .range((country.to_string(), i32::MIN)..=(country.to_string(), i32::MAX))
            .map(|((_, y), _)| *y)
            .collect()
    }

    /// One country's values for `column`, aligned with `country_years`.
    pub fn country_series(&self, country: &str, column: &str) -> Vec<Option<f64>> {
        self.rows
            .range((country.to_string(), i32::MIN)..=(country.to_string(), i32::MAX))
            .map(|(_, row)| row.get(column).copied())
            .collect()
    }

    /// Rows observed in a single year, by country.
    pub fn cross_section(&self, year: i32) -> Vec<(&str, &Row)> {
        self.rows
            .iter()
            .filter(|((_, y), _)| *y == year)
            .map(|((c, _), row)| (c.as_str(), row))
            .collect()
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        if from == to || !self.has_column(from) {
            return;
        }
        self.drop_column(to);
        for c in self.columns.iter_mut() {
            if c == from {
                *c = to.to_string();
            }
        }
        for row in self.rows.values_mut() {
            if let Some(v) = row.remove(from) {
                row.insert(to.to_string(), v);
            }
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        self.columns.retain(|c| c != name);
        for row in self.rows.values_mut() {
            row.remove(name);
        }
    }

    /// Outer join on (country, year). Columns of `other` are appended after
    /// ours; where both sides hold the same cell, `self` wins.
    pub fn outer_join(mut self, other: &Panel) -> Panel {
        for c in &other.columns {
            self.ensure_column(c);
        }
        for (key, row) in &other.rows {
            let target = self.rows.entry(key.clone()).or_default();
            for (col, v) in row {
                target.entry(col.clone()).or_insert(*v);
            }
        }
        self
    }

    /// Keep only the rows of the given year.
    pub fn filter_year(&self, year: i32) -> Panel {
        Panel {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|((_, y), _)| *y == year)
                .map(|(k, r)| (k.clone(), r.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_columns_survive_without_values() {
        let mut p = Panel::with_columns(["A", "B"]);
        p.set("USA", 2020, "A", Some(1.0));
        assert!(p.has_column("B"));
        assert_eq!(p.get("USA", 2020, "B"), None);
    }

    #[test]
    fn non_finite_values_are_missing() {
        let mut p = Panel::default();
        p.set("USA", 2020, "A", Some(f64::INFINITY));
        assert_eq!(p.get("USA", 2020, "A"), None);
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn outer_join_unions_rows_and_keeps_left_cells() {
        let mut l = Panel::with_columns(["A"]);
        l.set("FRA", 2020, "A", Some(1.0));
        let mut r = Panel::with_columns(["A", "B"]);
        r.set("FRA", 2020, "A", Some(9.0));
        r.set("FRA", 2021, "B", Some(2.0));
        let j = l.outer_join(&r);
        assert_eq!(j.columns(), &["A".to_string(), "B".to_string()]);
        assert_eq!(j.get("FRA", 2020, "A"), Some(1.0));
        assert_eq!(j.get("FRA", 2021, "B"), Some(2.0));
        assert_eq!(j.len(), 2);
    }

    #[test]
    fn rename_moves_cells() {
        let mut p = Panel::with_columns(["old"]);
        p.set("DEU", 2019, "old", Some(3.0));
        p.rename_column("old", "new");
        assert!(!p.has_column("old"));
        assert_eq!(p.get("DEU", 2019, "new"), Some(3.0));
    }

    #[test]
    fn country_series_is_chronological() {
        let mut p = Panel::default();
        p.set("JPN", 2021, "x", Some(2.0));
        p.set("JPN", 2019, "x", Some(1.0));
        p.set("IND", 2020, "x", Some(5.0));
        assert_eq!(p.country_years("JPN"), vec![2019, 2021]);
        assert_eq!(p.country_series("JPN", "x"), vec![Some(1.0), Some(2.0)]);
        assert_eq!(p.countries(), vec!["IND".to_string(), "JPN".to_string()]);
    }
}

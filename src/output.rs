use crate::error::Result;
use crate::indicators::{z_column, FEATURES};
use crate::panel::Panel;
use crate::reports::CountrySnapshot;
use crate::scoring::{ScoredRecord, ScoredTable};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

const FLAG_COLUMNS: &[&str] = &["Monnaie_reserve", "Safe_haven", "Euro_core", "Developpe"];

fn cell(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Long-format panel dump: `Pays`, `Annee`, then every declared column.
/// Missing cells are written empty.
pub fn write_panel_csv(path: &Path, panel: &Panel) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["Pays".to_string(), "Annee".to_string()];
    header.extend(panel.columns().iter().cloned());
    wtr.write_record(&header)?;
    for ((country, year), row) in panel.rows() {
        let mut record = vec![country.clone(), year.to_string()];
        record.extend(panel.columns().iter().map(|c| cell(row.get(c).copied())));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// The scored cross-section: raw features, their z-scores, structural flags,
/// then score and grade.
pub fn write_scored_csv(path: &Path, scored: &ScoredTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["Pays".to_string(), "Annee".to_string()];
    header.extend(FEATURES.iter().map(|f| f.to_string()));
    header.extend(FEATURES.iter().map(|f| z_column(f)));
    header.extend(FLAG_COLUMNS.iter().map(|f| f.to_string()));
    header.push("Score_solvabilite".to_string());
    header.push("Rating_modele".to_string());
    wtr.write_record(&header)?;

    for r in &scored.records {
        let mut record = vec![r.country.clone(), r.year.to_string()];
        record.extend(FEATURES.iter().map(|f| cell(r.values.get(*f).copied())));
        record.extend(scored_cells(Some(r)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// `_z` columns, flags, score and grade; empty cells for an unscored row.
fn scored_cells(r: Option<&ScoredRecord>) -> Vec<String> {
    let Some(r) = r else {
        return vec![String::new(); FEATURES.len() + FLAG_COLUMNS.len() + 2];
    };
    let mut out: Vec<String> = FEATURES.iter().map(|f| cell(r.z_of(f))).collect();
    for b in [r.tags.reserve_currency, r.tags.safe_haven, r.tags.euro_core, r.tags.developed] {
        out.push(flag(b).to_string());
    }
    out.push(r.score.to_string());
    out.push(r.rating.to_string());
    out
}

/// Latest snapshot year only: history values, then the scoring results
/// where the country was scored.
pub fn write_snapshot_csv(path: &Path, snapshot: &CountrySnapshot) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let year = snapshot.latest_year();
    let rows: Vec<_> = snapshot.rows.iter().filter(|r| Some(r.year) == year).collect();
    let columns: BTreeSet<&String> = rows.iter().copied().flat_map(|r| r.values.keys()).collect();

    let mut header = vec!["Pays".to_string(), "Pays_nom".to_string(), "Annee".to_string()];
    header.extend(columns.iter().map(|c| c.to_string()));
    header.extend(FEATURES.iter().map(|f| z_column(f)));
    header.extend(FLAG_COLUMNS.iter().map(|f| f.to_string()));
    header.push("Score_solvabilite".to_string());
    header.push("Rating_modele".to_string());
    wtr.write_record(&header)?;

    for r in rows {
        let mut record = vec![r.country.clone(), r.name.unwrap_or_default().to_string(), r.year.to_string()];
        record.extend(columns.iter().map(|c| cell(r.values.get(*c).copied())));
        record.extend(scored_cells(r.scored.as_ref()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn preview_table<T>(report_no: usize, title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\nReport {}: {}", report_no, title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

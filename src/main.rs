// Entry point and interactive menu.
//
// - Option [1] builds and scores the panel, printing load diagnostics.
// - Option [2] writes the report files and prints previews.
// - Option [3] shows the outlook and comment for one country.
// - Option [4] shows one indicator over time for the focus countries.
// - Option [5] drops every cached stage so the next request refetches.
use sovereign_rating::config::Settings;
use sovereign_rating::countries::{display_name, focus_codes};
use sovereign_rating::logging::init_logging;
use sovereign_rating::pipeline::Pipeline;
use sovereign_rating::provider::{CsvProjectionFile, CsvSeriesFile, WorldBankClient};
use sovereign_rating::types::OutlookRow;
use sovereign_rating::util::{format_int, format_number, format_opt};
use sovereign_rating::{output, reports, Result};
use std::io::{self, Write};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{error, info};

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Option [1]: build and score the scoring-year cross-section.
fn handle_load(pipeline: &mut Pipeline) -> Result<()> {
    let raw = pipeline.raw_panel()?;
    let report = &raw.1;
    println!(
        "Processing dataset... ({} local rows, {} remote observations, {} panel rows)",
        format_int(report.local_rows),
        format_int(report.remote_observations),
        format_int(report.panel_rows)
    );
    if report.unmapped_rows > 0 {
        println!("Note: {} local rows had no ISO3 mapping.", format_int(report.unmapped_rows));
    }
    if !report.failed_indicators.is_empty() {
        println!("Warning: skipped indicators: {}", report.failed_indicators.join(", "));
    }
    let scored = pipeline.scored()?;
    println!(
        "Scored {} countries for {} ({} features used, {} excluded).\n",
        format_int(scored.records.len()),
        scored.year,
        scored.effective_features.len(),
        scored.excluded_features.len()
    );
    Ok(())
}

fn outlook_rows(pipeline: &mut Pipeline) -> Vec<OutlookRow> {
    let mut rows = Vec::new();
    for code in focus_codes() {
        match pipeline.assess(&code) {
            Ok(a) => rows.push(reports::outlook_row(&a.country, a.rating, a.outlook, a.comment)),
            Err(e) => info!(country = %code, error = %e, "no outlook for country"),
        }
    }
    rows
}

/// Option [2]: write every report and print short previews.
fn handle_generate_reports(pipeline: &mut Pipeline, settings: &Settings) -> Result<()> {
    let dir = &settings.output_dir;
    std::fs::create_dir_all(dir)?;
    println!("Generating reports...");
    println!("Outputs saved to {}\n", dir.display());

    let raw = pipeline.raw_panel()?;
    output::write_panel_csv(&dir.join("panel_raw.csv"), &raw.0)?;
    let interpolated = pipeline.interpolated_panel()?;
    output::write_panel_csv(&dir.join("panel_interpolated.csv"), &interpolated)?;
    let history = pipeline.history()?;
    output::write_panel_csv(&dir.join("panel_history.csv"), &history.0)?;

    let scored = pipeline.scored()?;
    output::write_scored_csv(&dir.join("scored.csv"), &scored)?;
    let ranking = reports::ranking_rows(&scored);
    output::write_csv(&dir.join("ranking.csv"), &ranking)?;
    output::preview_table(1, "Model Rating Ranking", Some(&format!("Scoring year {}", scored.year)), &ranking, 5);

    let slopes = pipeline.slopes()?;
    let slope_rows = reports::slope_rows(&slopes);
    output::write_csv(&dir.join("slopes.csv"), &slope_rows)?;
    output::preview_table(2, "Indicator Trends", Some("OLS slope per year"), &slope_rows, 3);

    let outlooks = outlook_rows(pipeline);
    output::write_csv(&dir.join("outlook.csv"), &outlooks)?;
    output::preview_table(3, "Outlook and Comment", None, &outlooks, 3);

    let snapshot = pipeline.snapshot()?;
    output::write_snapshot_csv(&dir.join("snapshot_latest.csv"), &snapshot)?;
    let agencies = reports::agency_comparison(&snapshot);
    output::write_csv(&dir.join("agency_comparison.csv"), &agencies)?;
    output::preview_table(4, "Model vs Agencies", Some("Notch 1 = AAA"), &agencies, 3);

    let summary = reports::generate_summary(&scored);
    output::write_json(&dir.join("summary.json"), &summary)?;
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"scoring_year\": {}, \"countries_scored\": {}, \"excluded_features\": {}}}\n",
        summary.scoring_year,
        format_int(summary.countries_scored),
        summary.excluded_features.len()
    );
    Ok(())
}

/// Option [3]: rule-based outlook, comment, radar axes and projection outlook.
fn handle_country(pipeline: &mut Pipeline) -> Result<()> {
    let code = read_line("Country ISO3 code: ").to_uppercase();
    let a = pipeline.assess(&code)?;
    println!(
        "\n{} ({}): {} / outlook {}",
        code,
        display_name(&code).unwrap_or("?"),
        a.rating.unwrap_or("N/A"),
        a.outlook
    );
    println!("{}", a.comment);

    let snapshot = pipeline.snapshot()?;
    let radar = reports::radar_profile(&snapshot, &code)?;
    for (axis, v) in radar.macro_axes.iter().chain(radar.institutional_axes.iter()) {
        println!("  {:<28} {}", axis, format_number(*v, 1));
    }

    match pipeline.projection_outlook(&code) {
        Ok(p) => {
            println!("Projection outlook: {} (score {})", p.outlook, format_number(p.score, 3));
            for c in &p.contributions {
                println!(
                    "  {:<10} slope {} x {} = {}",
                    c.variable,
                    format_number(c.slope, 3),
                    format_number(c.weight, 2),
                    format_number(c.contribution, 3)
                );
            }
        }
        Err(e) => println!("Projection outlook unavailable: {}", e),
    }
    println!();
    Ok(())
}

/// Option [4]: one indicator over the history window.
fn handle_time_series(pipeline: &mut Pipeline) -> Result<()> {
    let indicator = read_line("Indicator: ");
    let snapshot = pipeline.snapshot()?;
    let ts = reports::time_series(&snapshot, &indicator, None)?;

    let mut builder = Builder::default();
    let mut header = vec!["Annee".to_string()];
    header.extend(ts.series.iter().map(|(c, _)| c.clone()));
    builder.push_record(header);
    for (i, year) in ts.years.iter().enumerate() {
        let mut record = vec![year.to_string()];
        record.extend(ts.series.iter().map(|(_, values)| format_opt(values[i], 2)));
        builder.push_record(record);
    }
    println!("{}\n", builder.build().with(Style::markdown()));
    Ok(())
}

fn report_error(result: Result<()>) {
    if let Err(e) = result {
        error!(error = %e, "request failed");
        println!("Error: {}\n", e);
    }
}

fn main() {
    dotenvy::dotenv().ok();
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    init_logging(&settings.log_level, &settings.log_format);
    info!(data = %settings.data_path.display(), api = %settings.api_base, "starting");

    let mut pipeline = Pipeline::new(
        Box::new(CsvSeriesFile::new(&settings.data_path)),
        Box::new(WorldBankClient::new(&settings.api_base)),
        Box::new(CsvProjectionFile::new(&settings.outlook_path)),
        settings.horizon,
        settings.cache_ttl,
    );

    loop {
        println!("Sovereign Rating Model:");
        println!("[1] Build and score panel");
        println!("[2] Generate Reports");
        println!("[3] Country outlook");
        println!("[4] Indicator time series");
        println!("[5] Refresh data");
        println!("[0] Exit\n");
        match read_line("Enter choice: ").as_str() {
            "1" => report_error(handle_load(&mut pipeline)),
            "2" => {
                println!();
                report_error(handle_generate_reports(&mut pipeline, &settings));
            }
            "3" => report_error(handle_country(&mut pipeline)),
            "4" => report_error(handle_time_series(&mut pipeline)),
            "5" => {
                pipeline.invalidate();
                println!("Cache cleared.\n");
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0 to 5.\n"),
        }
    }
}

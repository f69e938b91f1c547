// Interactive front end.
//
// - Option [1] reads the export, parses it and prints diagnostics. A failed
//   load keeps whatever was loaded before.
// - Option [2] narrows the data by date range, country and campaign.
// - Option [3] builds every dashboard chart, previews it as Markdown and
//   exports CSV series plus a JSON bundle.
use ads_dashboard::aliases::HeaderAliasTable;
use ads_dashboard::error::AppError;
use ads_dashboard::filter::FilterState;
use ads_dashboard::session::Session;
use ads_dashboard::util::{format_int, format_number};
use ads_dashboard::{loader, output, reports};
use chrono::NaiveDate;
use clap::Parser;
use log::LevelFilter;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Parser)]
#[command(name = "ads_dashboard", about = "Chart-ready summaries of ad performance exports")]
struct Cli {
    /// CSV or TSV export to load.
    #[arg(short, long, default_value = "ads_export.csv")]
    input: PathBuf,

    /// JSON object of extra header aliases, e.g. {"País": "country"}.
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Directory for exported series.
    #[arg(long, default_value = "charts")]
    out_dir: PathBuf,

    /// Points shown per chart preview.
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,
}

struct AppState {
    session: Session,
    table: HeaderAliasTable,
}

// Loaded once, reused across menu rounds.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        session: Session::new(),
        table: HeaderAliasTable::builtin().clone(),
    })
});

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn init_logging() {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_module("ads_dashboard", LevelFilter::Info);
    }
    let _ = builder.format_timestamp_millis().try_init();
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load_aliases(path: &Path) -> Result<HeaderAliasTable, AppError> {
    let extra = HeaderAliasTable::from_json_reader(File::open(path)?)?;
    Ok(HeaderAliasTable::builtin().with_overrides(&extra))
}

fn handle_load(cli: &Cli) {
    let grid = match loader::read_grid(&cli.input) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Failed to read {}: {}\n", cli.input.display(), e);
            return;
        }
    };
    let mut guard = state();
    let AppState { session, table } = &mut *guard;
    let outcome = session
        .load(table, &grid.header, &grid.rows)
        .cloned();
    match outcome {
        Ok(report) => {
            println!(
                "Processing dataset... ({} rows read, {} records)",
                format_int(report.total_rows),
                format_int(report.records)
            );
            println!(
                "Recognized {} column(s); ignored {}.",
                report.recognized_columns.len(),
                report.ignored_columns.len()
            );
            if report.filled_dates > 0 {
                println!(
                    "Note: {} row(s) had no readable reporting date and were grouped under today.",
                    format_int(report.filled_dates)
                );
            }
            let summary = session.summary();
            println!(
                "{} countries, {} campaigns, total spend {} USD\n",
                summary.countries.len(),
                summary.campaigns.len(),
                format_number(summary.total_spend, 2)
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if session.has_data() {
                eprintln!(
                    "Keeping previously loaded data ({} records).",
                    format_int(session.records().len())
                );
            }
            println!();
        }
    }
}

fn parse_date_input(label: &str, current: Option<NaiveDate>) -> Option<NaiveDate> {
    let shown = current.map(|d| d.to_string()).unwrap_or_else(|| "none".into());
    loop {
        let input = prompt(&format!("{} (YYYY-MM-DD, blank keeps {}): ", label, shown));
        if input.is_empty() {
            return current;
        }
        match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
            Ok(d) => return Some(d),
            Err(_) => println!("Invalid date."),
        }
    }
}

fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn handle_filters() {
    let mut guard = state();
    let session = &mut guard.session;
    if !session.has_data() {
        println!("Error: No data loaded. Please load a file first (option 1).\n");
        return;
    }
    let summary = session.summary().clone();
    println!("Countries: {}", summary.countries.join(", "));
    println!("Campaigns: {}", summary.campaigns.join(", "));
    if prompt("Clear all filters? (Y/N): ").eq_ignore_ascii_case("y") {
        session.clear_filters();
        println!();
        return;
    }

    let current = session.filters().clone();
    let start = parse_date_input("Start date", current.date_range.map(|r| r.0).or(summary.min_date));
    let end = parse_date_input("End date", current.date_range.map(|r| r.1).or(summary.max_date));
    let countries = parse_list(&prompt("Countries (comma separated, blank for all): "));
    let campaigns = parse_list(&prompt("Campaigns (comma separated, blank for all): "));
    session.set_filters(FilterState {
        date_range: start.zip(end),
        countries,
        campaigns,
    });
    println!("{} record(s) selected.\n", format_int(session.selected().len()));
}

#[derive(Serialize)]
struct DashboardBundle<'a> {
    summary: &'a reports::DatasetSummary,
    filters: &'a FilterState,
    charts: &'a [reports::Chart],
}

fn handle_generate(cli: &Cli) {
    let guard = state();
    let session = &guard.session;
    if !session.has_data() {
        println!("Error: No data loaded. Please load a file first (option 1).\n");
        return;
    }
    let selected = session.selected();
    if selected.is_empty() {
        println!("No data matches the current filters.\n");
        return;
    }

    let charts = reports::build_dashboard(&selected);
    for chart in &charts {
        output::preview_chart(chart, cli.preview_rows);
    }
    let files = match output::export_charts(&cli.out_dir, &charts) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Write error: {}", e);
            return;
        }
    };
    output::preview_overview(&charts, &files);

    let bundle = DashboardBundle {
        summary: session.summary(),
        filters: session.filters(),
        charts: &charts,
    };
    let json_path = cli.out_dir.join("dashboard.json");
    if let Err(e) = output::write_json(&json_path, &bundle) {
        eprintln!("Write error: {}", e);
    }
    println!("(Series exported to {})\n", cli.out_dir.display());
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Some(path) = &cli.aliases {
        match load_aliases(path) {
            Ok(table) => state().table = table,
            Err(e) => {
                eprintln!("Failed to load aliases from {}: {}", path.display(), e);
                std::process::exit(2);
            }
        }
    }

    loop {
        println!("Ad Performance Dashboard:");
        println!("[1] Load the file");
        println!("[2] Set filters");
        println!("[3] Generate charts\n");
        match prompt("Enter choice: ").as_str() {
            "1" => handle_load(&cli),
            "2" => handle_filters(),
            "3" => {
                println!();
                handle_generate(&cli);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}

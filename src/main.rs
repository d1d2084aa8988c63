// Entry point and high-level CLI flow.
//
// - Option [1] loads the national KPI dump and the per-state dump,
//   printing load diagnostics.
// - Option [2] prints the KPI cards and the state table, and exports
//   them next to a JSON summary.
// - `--batch` runs both steps once and exits.
mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Cli;
use kpi_report::config::DashboardConfig;
use kpi_report::loader::{self, LoadReport};
use kpi_report::output::{self, MarkdownRenderer, Renderer};
use kpi_report::reports;
use kpi_report::types::{KpiSnapshot, RegionRow};
use kpi_report::util::format_int;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;

// Loaded datasets survive between menu rounds so reports can be regenerated
// without reloading.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    snapshot: Option<KpiSnapshot>,
    regions: Option<Vec<RegionRow>>,
}

fn state() -> MutexGuard<'static, AppState> {
    // A poisoned lock only means an earlier round panicked mid-print; the
    // data itself is still whole.
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

/// `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_report(what: &str, report: &LoadReport) {
    println!(
        "{}: {} rows read, {} kept",
        what,
        format_int(report.total_rows),
        format_int(report.filtered_rows)
    );
    if report.coerced_values > 0 {
        println!(
            "Note: {} non-numeric values read as 0.",
            format_int(report.coerced_values)
        );
    }
    if report.unnamed_regions > 0 {
        println!(
            "Note: {} rows without a state name.",
            format_int(report.unnamed_regions)
        );
    }
    if report.skipped_rows > 0 {
        println!(
            "Note: {} empty rows skipped.",
            format_int(report.skipped_rows)
        );
    }
}

/// Handle option [1]. Each file loads independently so one bad dump does not
/// hide the other.
fn handle_load(cli: &Cli) {
    let mut st = state();
    match loader::load_kpi(&cli.kpi) {
        Ok((snapshot, report)) => {
            print_load_report("National KPI", &report);
            st.snapshot = Some(snapshot);
        }
        Err(e) => {
            tracing::error!(path = %cli.kpi.display(), error = %e, "failed to load kpi payload");
            eprintln!("Failed to load {}: {}", cli.kpi.display(), e);
        }
    }
    match loader::load_regions(&cli.regions, cli.estado.as_deref()) {
        Ok((regions, report)) => {
            print_load_report("State summary", &report);
            st.regions = Some(regions);
        }
        Err(e) => {
            tracing::error!(path = %cli.regions.display(), error = %e, "failed to load regional payload");
            eprintln!("Failed to load {}: {}", cli.regions.display(), e);
        }
    }
    println!();
}

/// Handle option [2]: print previews and write `kpi_cards.csv`,
/// `resumen_estatal.csv` and `summary.json`.
fn handle_generate_reports(cli: &Cli, cfg: &DashboardConfig) -> Result<()> {
    let (snapshot, regions) = {
        let st = state();
        (st.snapshot.clone(), st.regions.clone())
    };
    if snapshot.is_none() && regions.is_none() {
        bail!("no data loaded; load the files first (option 1)");
    }
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let stdout = io::stdout();
    let mut renderer = MarkdownRenderer::new(stdout.lock()).with_max_rows(10);

    if let Some(snapshot) = &snapshot {
        let cards = reports::build_kpi_cards(snapshot, cfg);
        renderer.render_cards(&cards)?;
        let path = cli.out_dir.join("kpi_cards.csv");
        output::write_csv(&path, &reports::card_rows(&cards))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("(Cards exported to {})\n", path.display());
    }

    let rows = regions.unwrap_or_default();
    if !rows.is_empty() {
        let table = reports::build_region_table(&rows, cfg);
        renderer.render_table(&table)?;
        let path = cli.out_dir.join("resumen_estatal.csv");
        output::write_csv(&path, &reports::summary_rows(&table))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("(Full table exported to {})\n", path.display());
    }

    let generated_at = chrono::Local::now().to_rfc3339();
    let summary = reports::generate_summary(&rows, snapshot.as_ref(), cfg, generated_at);
    let path = cli.out_dir.join("summary.json");
    output::write_json(&path, &summary).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), regions = summary.total_regions, "summary written");
    println!("Summary Stats ({}):", path.display());
    if let Some(leader) = &summary.leader {
        println!("Leader: {}", leader);
    }
    if let Some(laggard) = &summary.laggard {
        println!("Laggard: {}", laggard);
    }
    println!();
    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so report tables on stdout stay clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default_ref().clone(),
    };

    if cli.batch {
        handle_load(&cli);
        return handle_generate_reports(&cli, &cfg);
    }

    loop {
        println!("Select an option:");
        println!("[1] Load the files");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&cli),
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&cli, &cfg) {
                    eprintln!("Error: {:#}\n", e);
                    continue;
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
    Ok(())
}

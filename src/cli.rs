use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_KPI_PATH: &str = "kpi_nacional.json";
pub const DEFAULT_REGIONS_PATH: &str = "resumen_por_estado.json";

#[derive(Debug, Parser)]
#[command(
    name = "kpi_report",
    about = "Build the national KPI cards and the per-state summary table from reporting API dumps.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(long, value_name = "FILE", default_value = DEFAULT_KPI_PATH, help = "National KPI payload (JSON object from /api/kpi/).")]
    pub kpi: PathBuf,
    #[arg(long, value_name = "FILE", default_value = DEFAULT_REGIONS_PATH, help = "Per-state payload (JSON array or {\"resultados\": [...]}).")]
    pub regions: PathBuf,
    #[arg(long, value_name = "FILE", help = "Dashboard configuration JSON (palette, thresholds, ranking).")]
    pub config: Option<PathBuf>,
    #[arg(long, value_name = "DIR", default_value = ".", help = "Directory for the exported CSV and JSON files.")]
    pub out_dir: PathBuf,
    #[arg(long, value_name = "NAME", help = "Only keep this state in the summary table.")]
    pub estado: Option<String>,
    #[arg(long, help = "Load and generate once, without the interactive menu.")]
    pub batch: bool,
}

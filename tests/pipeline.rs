use kpi_report::config::DashboardConfig;
use kpi_report::loader;
use kpi_report::output::{self, MarkdownRenderer, Renderer};
use kpi_report::reports;
use kpi_report::Category;
use std::fs;

const REGIONS: &str = r#"{"resultados": [
    {"estado": "Guerrero", "meta_total_ton": "1,000.00", "abasto": 950.5, "entregado": 900,
     "meta_dh": 2000, "dh_apoyados": 1900, "meta_ha": 3000, "ha_apoyadas": 2500,
     "pct_entregado": 90},
    {"estado": "Oaxaca", "meta_total_ton": 500, "abasto": 300, "entregado": 100,
     "meta_dh": 1000, "dh_apoyados": 200, "meta_ha": 1000, "ha_apoyadas": "sin dato",
     "pct_entregado": 20},
    {"estado": "Morelos", "meta_total_ton": 0, "abasto": 10, "entregado": 10,
     "meta_dh": 0, "dh_apoyados": 0, "meta_ha": 0, "ha_apoyadas": 0}
]}"#;

const KPI: &str = r#"{"meta_total_ton": 1500, "abasto_recibido": 1260.5, "entregado": 1010,
    "meta_dh": 3000, "derechohabientes_apoyados": 2100,
    "meta_ha": 4000, "superficie_beneficiada": 2500}"#;

#[test]
fn files_to_exports() {
    let dir = tempfile::tempdir().unwrap();
    let regions_path = dir.path().join("resumen.json");
    let kpi_path = dir.path().join("kpi.json");
    fs::write(&regions_path, REGIONS).unwrap();
    fs::write(&kpi_path, KPI).unwrap();

    let cfg = DashboardConfig::default();
    let (rows, report) = loader::load_regions(&regions_path, None).unwrap();
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.coerced_values, 1);
    let (snapshot, _) = loader::load_kpi(&kpi_path).unwrap();

    let table = reports::build_region_table(&rows, &cfg);
    let order: Vec<&str> = table.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, ["Guerrero", "Oaxaca", "Morelos"]);

    let total = table.total.cell(Category::Delivered).unwrap();
    assert_eq!(total.goal_fmt, "1,500.00");
    assert_eq!(total.achieved_fmt, "1,010.00");
    assert_eq!(total.pending_fmt, "490.00");
    assert_eq!(total.percent_label, "67.3%");

    let cards = reports::build_kpi_cards(&snapshot, &cfg);
    assert_eq!(cards[0].value_fmt, "1,260.50");
    assert_eq!(cards[2].percent_label, "70%");

    let csv_path = dir.path().join("resumen_estatal.csv");
    output::write_csv(&csv_path, &reports::summary_rows(&table)).unwrap();
    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "Estado");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 4);
    assert_eq!(&records[3][0], "TOTAL NACIONAL");

    let summary = reports::generate_summary(&rows, Some(&snapshot), &cfg, "now".to_string());
    let json_path = dir.path().join("summary.json");
    output::write_json(&json_path, &summary).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v["total_regions"], 3);
    assert_eq!(v["leader"], "Guerrero");
    assert_eq!(v["national"][2]["category"], "beneficiaries");
    assert_eq!(v["national"][2]["status"], "amber");

    let mut r = MarkdownRenderer::new(Vec::new());
    r.render_cards(&cards).unwrap();
    r.render_table(&table).unwrap();
    let text = String::from_utf8(r.into_inner()).unwrap();
    assert!(text.contains("Guerrero"));
    assert!(text.contains("1,260.50"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = loader::load_kpi(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, kpi_report::ReportError::Io(_)));
}

#[test]
fn config_file_changes_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.json");
    fs::write(&cfg_path, r#"{"rank_by": "supply", "table_percent_decimals": 0}"#).unwrap();
    let cfg = DashboardConfig::load(&cfg_path).unwrap();

    let (rows, _) = loader::parse_regions(REGIONS, None).unwrap();
    let table = reports::build_region_table(&rows, &cfg);
    // Morelos has no goal, so it still ranks last by supply.
    assert_eq!(table.rows[2].name, "Morelos");
    assert_eq!(table.ranked_by, Category::Supply);
    assert_eq!(table.rows[0].cell(Category::Supply).unwrap().percent_label, "95%");
}

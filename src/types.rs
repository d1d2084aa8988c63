use crate::util::Lenient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

/// The four program metrics tracked on every dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Supply,
    Delivered,
    Beneficiaries,
    Surface,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Supply,
        Category::Delivered,
        Category::Beneficiaries,
        Category::Surface,
    ];

    /// Short key used by the dashboard palette and exported files.
    pub fn key(self) -> &'static str {
        match self {
            Category::Supply => "abasto",
            Category::Delivered => "entregado",
            Category::Beneficiaries => "dh",
            Category::Surface => "superficie",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Supply => "Abasto Recibido (t)",
            Category::Delivered => "Fertilizante Entregado (t)",
            Category::Beneficiaries => "Derechohabientes",
            Category::Surface => "Superficie (ha)",
        }
    }

    /// Tonnage shows two decimals; counts and hectares are whole numbers.
    pub fn decimals(self) -> usize {
        match self {
            Category::Supply | Category::Delivered => 2,
            Category::Beneficiaries | Category::Surface => 0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A goal/achieved pair for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricRecord {
    pub category: Category,
    pub goal: f64,
    pub achieved: f64,
}

/// Derived view of a metric: what is left and how far along it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricValue {
    pub goal: f64,
    pub achieved: f64,
    pub pending: f64,
    pub percent: f64,
}

/// One state (or operational unit) with a record per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    pub name: String,
    records: [MetricRecord; 4],
}

/// Sum of every region; same shape as a region row.
pub type NationalTotal = RegionRow;

/// The national KPI snapshot returned by the dashboard endpoint. Same shape as
/// a region, named after the whole country.
pub type KpiSnapshot = RegionRow;

impl RegionRow {
    pub fn new(name: impl Into<String>) -> Self {
        let records = Category::ALL.map(|category| MetricRecord {
            category,
            goal: 0.0,
            achieved: 0.0,
        });
        RegionRow {
            name: name.into(),
            records,
        }
    }

    pub fn with(mut self, category: Category, goal: f64, achieved: f64) -> Self {
        self.set(category, goal, achieved);
        self
    }

    pub fn set(&mut self, category: Category, goal: f64, achieved: f64) {
        let r = &mut self.records[category.index()];
        r.goal = goal;
        r.achieved = achieved;
    }

    pub fn record(&self, category: Category) -> &MetricRecord {
        &self.records[category.index()]
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }
}

/// Lenient number stored under the first of `keys` that holds a non-null
/// value. The API has shipped both spellings of some fields, sometimes in the
/// same object.
fn pick(map: &Map<String, Value>, keys: &[&str]) -> Lenient {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
        .map(Lenient::from_value)
        .unwrap_or_default()
}

/// Raw national payload (`/api/kpi/`).
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RawKpi {
    pub meta_total_ton: Lenient,
    pub abasto_recibido: Lenient,
    pub entregado: Lenient,
    pub meta_dh: Lenient,
    pub derechohabientes_apoyados: Lenient,
    pub meta_ha: Lenient,
    pub superficie_beneficiada: Lenient,
    pub error: Option<String>,
}

impl From<Map<String, Value>> for RawKpi {
    fn from(map: Map<String, Value>) -> Self {
        let error = match map.get("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        RawKpi {
            meta_total_ton: pick(&map, &["meta_total_ton"]),
            abasto_recibido: pick(&map, &["abasto_recibido", "abasto"]),
            entregado: pick(&map, &["entregado"]),
            meta_dh: pick(&map, &["meta_dh"]),
            derechohabientes_apoyados: pick(&map, &["derechohabientes_apoyados", "dh_apoyados"]),
            meta_ha: pick(&map, &["meta_ha"]),
            superficie_beneficiada: pick(&map, &["superficie_beneficiada", "ha_apoyadas"]),
            error,
        }
    }
}

/// Raw per-state row (`/api/kpi/resumen-por-estado/`).
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RawRegionRow {
    pub estado: Option<String>,
    pub meta_total_ton: Lenient,
    pub abasto: Lenient,
    pub entregado: Lenient,
    pub meta_dh: Lenient,
    pub dh_apoyados: Lenient,
    pub meta_ha: Lenient,
    pub ha_apoyadas: Lenient,
}

impl From<Map<String, Value>> for RawRegionRow {
    fn from(map: Map<String, Value>) -> Self {
        let estado = match map.get("estado") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        RawRegionRow {
            estado,
            meta_total_ton: pick(&map, &["meta_total_ton"]),
            abasto: pick(&map, &["abasto", "abasto_recibido"]),
            entregado: pick(&map, &["entregado"]),
            meta_dh: pick(&map, &["meta_dh"]),
            dh_apoyados: pick(&map, &["dh_apoyados", "derechohabientes_apoyados"]),
            meta_ha: pick(&map, &["meta_ha"]),
            ha_apoyadas: pick(&map, &["ha_apoyadas", "superficie_beneficiada"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Green,
    Amber,
    Red,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Green => "verde",
            Status::Amber => "ambar",
            Status::Red => "rojo",
        }
    }
}

/// Achieved vs pending arc segments of a donut chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DonutSegments {
    pub achieved: f64,
    pub pending: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiCard {
    pub category: Category,
    pub title: String,
    pub color: String,
    pub metric: MetricValue,
    pub value_fmt: String,
    pub goal_fmt: String,
    pub pending_fmt: String,
    pub percent_label: String,
    pub status: Status,
    pub donut: DonutSegments,
}

/// Flat card row for CSV export and console previews.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiCardRow {
    #[serde(rename = "Indicador")]
    #[tabled(rename = "Indicador")]
    pub title: String,
    #[serde(rename = "Avance")]
    #[tabled(rename = "Avance")]
    pub value: String,
    #[serde(rename = "Meta")]
    #[tabled(rename = "Meta")]
    pub goal: String,
    #[serde(rename = "Pendiente")]
    #[tabled(rename = "Pendiente")]
    pub pending: String,
    #[serde(rename = "Porcentaje")]
    #[tabled(rename = "Porcentaje")]
    pub percent: String,
    #[serde(rename = "Semaforo")]
    #[tabled(rename = "Semaforo")]
    pub status: String,
}

impl From<&KpiCard> for KpiCardRow {
    fn from(c: &KpiCard) -> Self {
        KpiCardRow {
            title: c.title.clone(),
            value: c.value_fmt.clone(),
            goal: c.goal_fmt.clone(),
            pending: c.pending_fmt.clone(),
            percent: c.percent_label.clone(),
            status: c.status.label().to_string(),
        }
    }
}

/// One category's four columns in the regional table.
#[derive(Debug, Clone, Serialize)]
pub struct TableCell {
    pub category: Category,
    pub metric: MetricValue,
    pub goal_fmt: String,
    pub achieved_fmt: String,
    pub pending_fmt: String,
    pub percent_label: String,
    /// Progress bar width, percent clamped to `[0, 100]`.
    pub bar_width: f64,
    /// Bar too short to hold its label in contrast colors.
    pub dark_label: bool,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub name: String,
    pub is_total: bool,
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn cell(&self, category: Category) -> Option<&TableCell> {
        self.cells.iter().find(|c| c.category == category)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionTable {
    pub ranked_by: Category,
    pub rows: Vec<TableRow>,
    pub total: TableRow,
}

/// Flattened regional row for CSV export and console previews.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionSummaryRow {
    #[serde(rename = "Estado")]
    #[tabled(rename = "Estado")]
    pub estado: String,
    #[serde(rename = "MetaTon")]
    #[tabled(rename = "MetaTon")]
    pub meta_ton: String,
    #[serde(rename = "Abasto")]
    #[tabled(rename = "Abasto")]
    pub abasto: String,
    #[serde(rename = "PctAbasto")]
    #[tabled(rename = "PctAbasto")]
    pub pct_abasto: String,
    #[serde(rename = "Entregado")]
    #[tabled(rename = "Entregado")]
    pub entregado: String,
    #[serde(rename = "PendienteTon")]
    #[tabled(rename = "PendienteTon")]
    pub pendiente_ton: String,
    #[serde(rename = "PctEntregado")]
    #[tabled(rename = "PctEntregado")]
    pub pct_entregado: String,
    #[serde(rename = "MetaDH")]
    #[tabled(rename = "MetaDH")]
    pub meta_dh: String,
    #[serde(rename = "DHApoyados")]
    #[tabled(rename = "DHApoyados")]
    pub dh_apoyados: String,
    #[serde(rename = "PctDH")]
    #[tabled(rename = "PctDH")]
    pub pct_dh: String,
    #[serde(rename = "MetaHa")]
    #[tabled(rename = "MetaHa")]
    pub meta_ha: String,
    #[serde(rename = "HaApoyadas")]
    #[tabled(rename = "HaApoyadas")]
    pub ha_apoyadas: String,
    #[serde(rename = "PctHa")]
    #[tabled(rename = "PctHa")]
    pub pct_ha: String,
}

impl From<&TableRow> for RegionSummaryRow {
    fn from(row: &TableRow) -> Self {
        let text = |c: Category, f: fn(&TableCell) -> &String| {
            row.cell(c).map(|cell| f(cell).clone()).unwrap_or_default()
        };
        RegionSummaryRow {
            estado: row.name.clone(),
            meta_ton: text(Category::Delivered, |c| &c.goal_fmt),
            abasto: text(Category::Supply, |c| &c.achieved_fmt),
            pct_abasto: text(Category::Supply, |c| &c.percent_label),
            entregado: text(Category::Delivered, |c| &c.achieved_fmt),
            pendiente_ton: text(Category::Delivered, |c| &c.pending_fmt),
            pct_entregado: text(Category::Delivered, |c| &c.percent_label),
            meta_dh: text(Category::Beneficiaries, |c| &c.goal_fmt),
            dh_apoyados: text(Category::Beneficiaries, |c| &c.achieved_fmt),
            pct_dh: text(Category::Beneficiaries, |c| &c.percent_label),
            meta_ha: text(Category::Surface, |c| &c.goal_fmt),
            ha_apoyadas: text(Category::Surface, |c| &c.achieved_fmt),
            pct_ha: text(Category::Surface, |c| &c.percent_label),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub metric: MetricValue,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub generated_at: String,
    pub total_regions: usize,
    pub national: Vec<CategoryTotal>,
    pub leader: Option<String>,
    pub laggard: Option<String>,
}

use crate::error::{ReportError, Result};
use crate::types::{Category, KpiSnapshot, RawKpi, RawRegionRow, RegionRow};
use crate::util::Lenient;
use serde_json::Value;
use std::path::Path;

pub const NATIONAL_NAME: &str = "NACIONAL";
const UNKNOWN_REGION: &str = "Sin estado";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub filtered_rows: usize,
    /// Numeric fields that held something non-numeric and were read as 0.
    pub coerced_values: usize,
    pub unnamed_regions: usize,
    /// Array entries that were not objects (e.g. `null`) and were dropped.
    pub skipped_rows: usize,
}

/// Adds up coercions while lenient values are unpacked.
#[derive(Default)]
struct Tally(usize);

impl Tally {
    fn take(&mut self, l: Lenient) -> f64 {
        if l.coerced {
            self.0 += 1;
        }
        l.value
    }
}

pub fn parse_kpi(s: &str) -> Result<(KpiSnapshot, LoadReport)> {
    let raw: RawKpi = serde_json::from_str(s)?;
    if let Some(msg) = raw.error {
        tracing::warn!(error = %msg, "kpi payload carries an API error");
        return Err(ReportError::Api(msg));
    }
    let mut tally = Tally::default();
    let ton = tally.take(raw.meta_total_ton);
    let snapshot = RegionRow::new(NATIONAL_NAME)
        .with(Category::Supply, ton, tally.take(raw.abasto_recibido))
        .with(Category::Delivered, ton, tally.take(raw.entregado))
        .with(
            Category::Beneficiaries,
            tally.take(raw.meta_dh),
            tally.take(raw.derechohabientes_apoyados),
        )
        .with(
            Category::Surface,
            tally.take(raw.meta_ha),
            tally.take(raw.superficie_beneficiada),
        );
    if tally.0 > 0 {
        tracing::debug!(coerced = tally.0, "non-numeric kpi fields read as 0");
    }
    let report = LoadReport {
        total_rows: 1,
        filtered_rows: 1,
        coerced_values: tally.0,
        unnamed_regions: 0,
        skipped_rows: 0,
    };
    Ok((snapshot, report))
}

fn region_from_raw(row: RawRegionRow, tally: &mut Tally) -> (RegionRow, bool) {
    let name = row
        .estado
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let unnamed = name.is_none();
    let ton = tally.take(row.meta_total_ton);
    let region = RegionRow::new(name.unwrap_or_else(|| UNKNOWN_REGION.to_string()))
        .with(Category::Supply, ton, tally.take(row.abasto))
        .with(Category::Delivered, ton, tally.take(row.entregado))
        .with(
            Category::Beneficiaries,
            tally.take(row.meta_dh),
            tally.take(row.dh_apoyados),
        )
        .with(
            Category::Surface,
            tally.take(row.meta_ha),
            tally.take(row.ha_apoyadas),
        );
    (region, unnamed)
}

/// Row values of the regional payload: a bare array, or an object whose
/// `resultados` may be missing or `null` (both meaning no rows).
fn region_entries(payload: Value) -> Result<Vec<Value>> {
    match payload {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => {
            match map.get("error") {
                None | Some(Value::Null) => {}
                Some(e) => {
                    let msg = e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string());
                    tracing::warn!(error = %msg, "regional payload carries an API error");
                    return Err(ReportError::Api(msg));
                }
            }
            match map.remove("resultados") {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(rows)) => Ok(rows),
                Some(other) => Err(ReportError::Api(format!(
                    "`resultados` must be an array of rows, got {}",
                    other
                ))),
            }
        }
        other => Err(ReportError::Api(format!(
            "regional payload must be an array or an object, got {}",
            other
        ))),
    }
}

/// Parse the regional payload, keeping only `estado` when given (matched
/// case-insensitively on the trimmed name).
pub fn parse_regions(s: &str, estado: Option<&str>) -> Result<(Vec<RegionRow>, LoadReport)> {
    let payload: Value = serde_json::from_str(s)?;
    let entries = region_entries(payload)?;
    let total_rows = entries.len();
    let wanted = estado
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut tally = Tally::default();
    let mut unnamed_regions = 0usize;
    let mut skipped_rows = 0usize;
    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(map) = entry else {
            skipped_rows += 1;
            continue;
        };
        let (region, unnamed) = region_from_raw(RawRegionRow::from(map), &mut tally);
        if unnamed {
            unnamed_regions += 1;
        }
        if let Some(w) = &wanted {
            if region.name.to_lowercase() != *w {
                continue;
            }
        }
        rows.push(region);
    }
    if tally.0 > 0 {
        tracing::debug!(coerced = tally.0, "non-numeric region fields read as 0");
    }
    if skipped_rows > 0 {
        tracing::debug!(skipped = skipped_rows, "non-object region rows dropped");
    }
    let report = LoadReport {
        total_rows,
        filtered_rows: rows.len(),
        coerced_values: tally.0,
        unnamed_regions,
        skipped_rows,
    };
    tracing::info!(
        total = report.total_rows,
        kept = report.filtered_rows,
        "regional payload parsed"
    );
    Ok((rows, report))
}

pub fn load_kpi(path: &Path) -> Result<(KpiSnapshot, LoadReport)> {
    let s = std::fs::read_to_string(path)?;
    parse_kpi(&s)
}

pub fn load_regions(path: &Path, estado: Option<&str>) -> Result<(Vec<RegionRow>, LoadReport)> {
    let s = std::fs::read_to_string(path)?;
    parse_regions(&s, estado)
}

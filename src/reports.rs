use crate::config::DashboardConfig;
use crate::metrics::{aggregate_regions, compute_metric, rank_by_completion};
use crate::types::{
    Category, CategoryTotal, DonutSegments, KpiCard, KpiCardRow, KpiSnapshot, RegionRow,
    RegionSummaryRow, RegionTable, ReportSummary, TableCell, TableRow,
};
use crate::util::{format_number, format_percent};

/// One card per category, in dashboard order.
pub fn build_kpi_cards(snapshot: &KpiSnapshot, cfg: &DashboardConfig) -> Vec<KpiCard> {
    Category::ALL
        .iter()
        .map(|&category| {
            let record = snapshot.record(category);
            let goal = match cfg.fallback_goals.for_category(category) {
                Some(fallback) if record.goal <= 0.0 => fallback,
                _ => record.goal,
            };
            let metric = compute_metric(goal, record.achieved);
            let decimals = category.decimals();
            KpiCard {
                category,
                title: category.title().to_string(),
                color: cfg.palette.color(category).to_string(),
                metric,
                value_fmt: format_number(metric.achieved, decimals),
                goal_fmt: format_number(metric.goal, decimals),
                pending_fmt: format_number(metric.pending, decimals),
                percent_label: format_percent(metric.percent, cfg.card_percent_decimals),
                status: cfg.thresholds.status(metric.percent),
                donut: DonutSegments {
                    achieved: metric.achieved.max(0.0),
                    pending: metric.pending,
                },
            }
        })
        .collect()
}

fn table_row(row: &RegionRow, is_total: bool, cfg: &DashboardConfig) -> TableRow {
    let cells = Category::ALL
        .iter()
        .map(|&category| {
            let metric = row.metric(category);
            let decimals = category.decimals();
            let bar_width = metric.percent.clamp(0.0, 100.0);
            TableCell {
                category,
                metric,
                goal_fmt: format_number(metric.goal, decimals),
                achieved_fmt: format_number(metric.achieved, decimals),
                pending_fmt: format_number(metric.pending, decimals),
                percent_label: format_percent(metric.percent, cfg.table_percent_decimals),
                bar_width,
                dark_label: bar_width < cfg.dark_label_below,
                color: cfg.palette.color(category).to_string(),
            }
        })
        .collect();
    TableRow {
        name: row.name.clone(),
        is_total,
        cells,
    }
}

/// Ranked state rows followed by the national total.
pub fn build_region_table(rows: &[RegionRow], cfg: &DashboardConfig) -> RegionTable {
    let ranked = rank_by_completion(rows, cfg.rank_by);
    let total = aggregate_regions(rows);
    RegionTable {
        ranked_by: cfg.rank_by,
        rows: ranked.iter().map(|r| table_row(r, false, cfg)).collect(),
        total: table_row(&total, true, cfg),
    }
}

pub fn card_rows(cards: &[KpiCard]) -> Vec<KpiCardRow> {
    cards.iter().map(KpiCardRow::from).collect()
}

/// Table rows flattened for export, total last.
pub fn summary_rows(table: &RegionTable) -> Vec<RegionSummaryRow> {
    table
        .rows
        .iter()
        .chain(std::iter::once(&table.total))
        .map(RegionSummaryRow::from)
        .collect()
}

/// National figures plus best/worst region by the ranking category.
///
/// When a national snapshot is available it is used as-is; otherwise the
/// national figures are the sum of the regions.
pub fn generate_summary(
    rows: &[RegionRow],
    snapshot: Option<&KpiSnapshot>,
    cfg: &DashboardConfig,
    generated_at: String,
) -> ReportSummary {
    let aggregated;
    let national = match snapshot {
        Some(s) => s,
        None => {
            aggregated = aggregate_regions(rows);
            &aggregated
        }
    };
    let totals = Category::ALL
        .iter()
        .map(|&category| {
            let metric = national.metric(category);
            CategoryTotal {
                category,
                metric,
                status: cfg.thresholds.status(metric.percent),
            }
        })
        .collect();
    let ranked = rank_by_completion(rows, cfg.rank_by);
    ReportSummary {
        generated_at,
        total_regions: rows.len(),
        national: totals,
        leader: ranked.first().map(|r| r.name.clone()),
        laggard: ranked.last().map(|r| r.name.clone()),
    }
}

// Pure KPI arithmetic: pending, percent-of-goal, national totals and ranking.
use crate::types::{Category, MetricRecord, MetricValue, NationalTotal, RegionRow};
use crate::util::finite_or_zero;

pub const NATIONAL_TOTAL_NAME: &str = "TOTAL NACIONAL";

/// Derive pending and percent-of-goal for one goal/achieved pair.
///
/// Pending never goes below zero and a zero goal yields 0%, never NaN. The
/// percent is left uncapped; clamping is a display concern.
pub fn compute_metric(goal: f64, achieved: f64) -> MetricValue {
    let goal = finite_or_zero(goal);
    let achieved = finite_or_zero(achieved);
    let pending = (goal - achieved).max(0.0);
    let percent = if goal > 0.0 {
        // Scaling first keeps whole-number ratios exact; huge inputs overflow
        // that way and take the divide-first path.
        let scaled = achieved * 100.0 / goal;
        if scaled.is_finite() {
            scaled
        } else {
            finite_or_zero(achieved / goal * 100.0)
        }
    } else {
        0.0
    };
    MetricValue {
        goal,
        achieved,
        pending,
        percent,
    }
}

impl MetricRecord {
    pub fn value(&self) -> MetricValue {
        compute_metric(self.goal, self.achieved)
    }
}

impl RegionRow {
    pub fn metric(&self, category: Category) -> MetricValue {
        self.record(category).value()
    }
}

/// Sum of `values` in sorted order, bit-identical for any permutation.
fn order_independent_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().map(finite_or_zero).sum()
}

/// Sum goal and achieved per category across every row.
pub fn aggregate_regions(rows: &[RegionRow]) -> NationalTotal {
    let mut total = RegionRow::new(NATIONAL_TOTAL_NAME);
    for category in Category::ALL {
        let (goals, achieved): (Vec<f64>, Vec<f64>) = rows
            .iter()
            .flat_map(RegionRow::records)
            .filter(|rec| rec.category == category)
            .map(|rec| (rec.goal, rec.achieved))
            .unzip();
        total.set(
            category,
            order_independent_sum(goals),
            order_independent_sum(achieved),
        );
    }
    total
}

/// Rows sorted by completion of `category`, best first. Ties keep their input
/// order.
pub fn rank_by_completion(rows: &[RegionRow], category: Category) -> Vec<RegionRow> {
    let mut ranked: Vec<(f64, RegionRow)> = rows
        .iter()
        .map(|r| (r.metric(category).percent, r.clone()))
        .collect();
    // `sort_by` is stable; percents are finite so `total_cmp` is a plain order.
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(name: &str, goal: f64, achieved: f64) -> RegionRow {
        RegionRow::new(name).with(Category::Delivered, goal, achieved)
    }

    #[test]
    fn goal_100_achieved_40() {
        let m = compute_metric(100.0, 40.0);
        assert_eq!(m.pending, 60.0);
        assert_eq!(m.percent, 40.0);
    }

    #[test]
    fn pending_is_never_negative() {
        for (goal, achieved) in [(0.0, 0.0), (10.0, 25.0), (25.0, 10.0), (1e9, 1e9 + 1.0)] {
            let m = compute_metric(goal, achieved);
            assert!(m.pending >= 0.0);
            assert_eq!(m.pending, (goal - achieved).max(0.0));
        }
    }

    #[test]
    fn zero_goal_means_zero_percent() {
        assert_eq!(compute_metric(0.0, 0.0).percent, 0.0);
        assert_eq!(compute_metric(0.0, 500.0).percent, 0.0);
        assert_eq!(compute_metric(0.0, 500.0).pending, 0.0);
    }

    #[test]
    fn percent_is_not_capped() {
        assert_eq!(compute_metric(50.0, 75.0).percent, 150.0);
    }

    #[test]
    fn non_finite_inputs_become_zero() {
        let m = compute_metric(f64::NAN, f64::INFINITY);
        assert_eq!((m.goal, m.achieved, m.pending, m.percent), (0.0, 0.0, 0.0, 0.0));
        let m = compute_metric(100.0, f64::NAN);
        assert_eq!(m.percent, 0.0);
        assert_eq!(m.pending, 100.0);
    }

    #[test]
    fn huge_inputs_keep_their_ratio() {
        assert_eq!(compute_metric(1e307, 1e307).percent, 100.0);
        assert_eq!(compute_metric(f64::MAX, f64::MAX / 2.0).percent, 50.0);
        assert_eq!(compute_metric(1e-300, 1e300).percent, 0.0);
    }

    #[test]
    fn aggregate_keeps_categories_apart() {
        let rows = vec![
            RegionRow::new("A")
                .with(Category::Supply, 10.0, 1.0)
                .with(Category::Surface, 20.0, 2.0),
            RegionRow::new("B").with(Category::Surface, 30.0, 3.0),
        ];
        let total = aggregate_regions(&rows);
        for rec in total.records() {
            let expected = match rec.category {
                Category::Supply => (10.0, 1.0),
                Category::Surface => (50.0, 5.0),
                Category::Delivered | Category::Beneficiaries => (0.0, 0.0),
            };
            assert_eq!((rec.goal, rec.achieved), expected, "{:?}", rec.category);
        }
    }

    #[test]
    fn aggregates_two_regions() {
        let rows = vec![region("A", 50.0, 50.0), region("B", 50.0, 0.0)];
        let total = aggregate_regions(&rows).metric(Category::Delivered);
        assert_eq!(total.goal, 100.0);
        assert_eq!(total.achieved, 50.0);
        assert_eq!(total.pending, 50.0);
        assert_eq!(total.percent, 50.0);
    }

    #[test]
    fn aggregation_ignores_row_order() {
        let a = region("A", 0.1, 0.7);
        let b = region("B", 0.2, 1e16);
        let c = region("C", 0.3, -1e16);
        let forward = aggregate_regions(&[a.clone(), b.clone(), c.clone()]);
        let reversed = aggregate_regions(&[c.clone(), a.clone(), b.clone()]);
        assert_eq!(forward, reversed);
        assert_eq!(
            aggregate_regions(&[a.clone(), b.clone()]),
            aggregate_regions(&[b, a])
        );
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        let total = aggregate_regions(&[]);
        assert_eq!(total.name, NATIONAL_TOTAL_NAME);
        for c in Category::ALL {
            assert_eq!(total.metric(c).percent, 0.0);
            assert_eq!(total.metric(c).goal, 0.0);
        }
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let rows = vec![
            region("Low", 100.0, 10.0),
            region("TieFirst", 100.0, 50.0),
            region("High", 100.0, 90.0),
            region("TieSecond", 200.0, 100.0),
            region("NoGoal", 0.0, 30.0),
        ];
        let ranked = rank_by_completion(&rows, Category::Delivered);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["High", "TieFirst", "TieSecond", "Low", "NoGoal"]);
        let pcts: Vec<f64> = ranked
            .iter()
            .map(|r| r.metric(Category::Delivered).percent)
            .collect();
        assert!(pcts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn ranking_uses_requested_category() {
        let rows = vec![
            RegionRow::new("A")
                .with(Category::Delivered, 100.0, 90.0)
                .with(Category::Surface, 100.0, 5.0),
            RegionRow::new("B")
                .with(Category::Delivered, 100.0, 10.0)
                .with(Category::Surface, 100.0, 95.0),
        ];
        let ranked = rank_by_completion(&rows, Category::Surface);
        assert_eq!(ranked[0].name, "B");
    }
}

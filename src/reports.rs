use crate::types::{
    AvgRevenueRow, NetIncomeRow, ProfitableWeekRow, SummaryStats, TidyRecord, TotalRevenueRow,
    WeeklyRevenueRow,
};
use crate::util::average;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

pub const REVENUE: &str = "Revenue";
pub const NET_INCOME: &str = "Net Income";
pub const TOTAL_NET_INCOME: &str = "Total Net Income";

/// Which records a query looks at. Comparison ignores ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKey<'a> {
    /// Decomposed metric name, across all channels.
    Name(&'a str),
    /// Full composite label as it appeared in the export.
    Label(&'a str),
}

impl MetricKey<'_> {
    pub fn matches(&self, r: &TidyRecord) -> bool {
        match self {
            MetricKey::Name(n) => r.metric_name.eq_ignore_ascii_case(n),
            MetricKey::Label(l) => r.metric.eq_ignore_ascii_case(l),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Max,
    Min,
}

/// Defined values of the selected metric, grouped by `group`.
fn grouped<K: Ord>(
    data: &[TidyRecord],
    key: MetricKey<'_>,
    group: impl Fn(&TidyRecord) -> K,
) -> BTreeMap<K, Vec<f64>> {
    let mut map: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for r in data.iter().filter(|r| key.matches(r)) {
        if let Some(v) = r.value {
            map.entry(group(r)).or_default().push(v);
        }
    }
    map
}

/// Sum per year. Missing values are skipped, and a year with none is absent.
pub fn sum_by_year(data: &[TidyRecord], key: MetricKey<'_>) -> BTreeMap<i32, f64> {
    grouped(data, key, |r| r.year)
        .into_iter()
        .map(|(year, vals)| (year, vals.iter().sum()))
        .collect()
}

pub fn average_by_year(data: &[TidyRecord], key: MetricKey<'_>) -> BTreeMap<i32, f64> {
    grouped(data, key, |r| r.year)
        .into_iter()
        .filter_map(|(year, vals)| average(&vals).map(|avg| (year, avg)))
        .collect()
}

/// The record with the largest (or smallest) value.
///
/// Ties go to the earliest (year, week, source), then to whichever comes
/// first in `data`.
pub fn extremum<'a>(
    data: &'a [TidyRecord],
    key: MetricKey<'_>,
    direction: Direction,
) -> Option<&'a TidyRecord> {
    let mut best: Option<(&TidyRecord, f64)> = None;
    for r in data.iter().filter(|r| key.matches(r)) {
        let Some(v) = r.value else { continue };
        let better = match best {
            None => true,
            Some((b, bv)) => {
                let by_value = match direction {
                    Direction::Max => v.partial_cmp(&bv),
                    Direction::Min => bv.partial_cmp(&v),
                }
                .unwrap_or(Ordering::Equal);
                match by_value {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => {
                        (r.year, r.week, r.source_ordinal) < (b.year, b.week, b.source_ordinal)
                    }
                }
            }
        };
        if better {
            best = Some((r, v));
        }
    }
    best.map(|(r, _)| r)
}

/// Per-week sums in ascending (year, week) order.
pub fn weekly_series(data: &[TidyRecord], key: MetricKey<'_>) -> Vec<((i32, u32), f64)> {
    grouped(data, key, |r| (r.year, r.week))
        .into_iter()
        .map(|(yw, vals)| (yw, vals.iter().sum()))
        .collect()
}

pub fn total_revenue_per_year(data: &[TidyRecord]) -> Vec<TotalRevenueRow> {
    sum_by_year(data, MetricKey::Name(REVENUE))
        .into_iter()
        .map(|(year, total_revenue)| TotalRevenueRow {
            year,
            total_revenue,
        })
        .collect()
}

pub fn total_net_income_per_year(data: &[TidyRecord]) -> Vec<NetIncomeRow> {
    sum_by_year(data, MetricKey::Name(NET_INCOME))
        .into_iter()
        .map(|(year, net_income)| NetIncomeRow { year, net_income })
        .collect()
}

pub fn most_profitable_week(data: &[TidyRecord]) -> Vec<ProfitableWeekRow> {
    extremum(data, MetricKey::Name(NET_INCOME), Direction::Max)
        .and_then(|r| {
            r.value.map(|net_income| ProfitableWeekRow {
                year: r.year,
                week: r.week,
                net_income,
            })
        })
        .into_iter()
        .collect()
}

pub fn avg_weekly_revenue(data: &[TidyRecord]) -> Vec<AvgRevenueRow> {
    average_by_year(data, MetricKey::Name(REVENUE))
        .into_iter()
        .map(|(year, avg_weekly_revenue)| AvgRevenueRow {
            year,
            avg_weekly_revenue,
        })
        .collect()
}

pub fn weekly_revenue(data: &[TidyRecord]) -> Vec<WeeklyRevenueRow> {
    weekly_series(data, MetricKey::Name(REVENUE))
        .into_iter()
        .map(|((year, week), weekly_revenue)| WeeklyRevenueRow {
            year,
            week,
            weekly_revenue,
        })
        .collect()
}

pub fn generate_summary(
    data: &[TidyRecord],
    files_ingested: usize,
    reports: &[&str],
) -> SummaryStats {
    let weeks: BTreeSet<(i32, u32)> = data.iter().map(|r| (r.year, r.week)).collect();
    let mut weeks_by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for (year, _) in &weeks {
        *weeks_by_year.entry(*year).or_insert(0) += 1;
    }
    SummaryStats {
        files_ingested,
        total_weeks: weeks.len(),
        weeks_by_year,
        revenue_by_year: sum_by_year(data, MetricKey::Name(REVENUE)),
        total_net_income_by_year: sum_by_year(data, MetricKey::Label(TOTAL_NET_INCOME)),
        reports: reports.iter().map(|r| r.to_string()).collect(),
    }
}

use crate::config::Config;
use crate::error::Result;
use crate::loader::{load_and_clean, LoadReport};
use crate::output::{ensure_out_dir, render_summary, write_json, write_report_csv, write_text};
use crate::reports;
use crate::types::{
    AvgRevenueRow, NetIncomeRow, ProfitableWeekRow, SummaryStats, TidyRecord, TotalRevenueRow,
    WeeklyRevenueRow,
};
use std::path::PathBuf;
use tracing::info;

pub const CLEAN_FILE: &str = "weekly_metrics_clean.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const SUMMARY_TEXT: &str = "project_summary.txt";

/// Report names with their column headers, in output order.
pub const REPORTS: [(&str, &[&str]); 5] = [
    ("total_revenue_per_year", &["year", "total_revenue"]),
    ("total_net_income_per_year", &["year", "net_income"]),
    ("most_profitable_week", &["year", "week", "net_income"]),
    ("avg_weekly_revenue", &["year", "avg_weekly_revenue"]),
    ("weekly_revenue", &["year", "week", "weekly_revenue"]),
];

#[derive(Debug, Clone)]
pub struct ReportSet {
    pub total_revenue: Vec<TotalRevenueRow>,
    pub total_net_income: Vec<NetIncomeRow>,
    pub most_profitable_week: Vec<ProfitableWeekRow>,
    pub avg_weekly_revenue: Vec<AvgRevenueRow>,
    pub weekly_revenue: Vec<WeeklyRevenueRow>,
}

impl ReportSet {
    pub fn generate(data: &[TidyRecord]) -> Self {
        Self {
            total_revenue: reports::total_revenue_per_year(data),
            total_net_income: reports::total_net_income_per_year(data),
            most_profitable_week: reports::most_profitable_week(data),
            avg_weekly_revenue: reports::avg_weekly_revenue(data),
            weekly_revenue: reports::weekly_revenue(data),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub records: Vec<TidyRecord>,
    pub load: LoadReport,
    pub reports: ReportSet,
    pub summary: SummaryStats,
    pub out_dir: PathBuf,
}

/// Full batch: load every source, write the tidy table, the five reports
/// and the summary. Every output is replaced, never appended to.
pub fn run(cfg: &Config) -> Result<RunOutcome> {
    let (records, load) = load_and_clean(cfg)?;

    ensure_out_dir(&cfg.out_dir)?;
    let out = |name: &str| cfg.out_dir.join(name);

    write_report_csv(
        &out(CLEAN_FILE),
        &["year", "week", "channel", "metric_name", "value", "metric"],
        &records,
    )?;
    info!(path = %out(CLEAN_FILE).display(), rows = records.len(), "wrote tidy table");

    let set = ReportSet::generate(&records);
    let report_path = |name: &str| cfg.out_dir.join(format!("{}.csv", name));
    let [r1, r2, r3, r4, r5] = REPORTS;
    write_report_csv(&report_path(r1.0), r1.1, &set.total_revenue)?;
    write_report_csv(&report_path(r2.0), r2.1, &set.total_net_income)?;
    write_report_csv(&report_path(r3.0), r3.1, &set.most_profitable_week)?;
    write_report_csv(&report_path(r4.0), r4.1, &set.avg_weekly_revenue)?;
    write_report_csv(&report_path(r5.0), r5.1, &set.weekly_revenue)?;
    info!(count = REPORTS.len(), "wrote reports");

    let names: Vec<&str> = REPORTS.iter().map(|(name, _)| *name).collect();
    let summary = reports::generate_summary(&records, load.files_ingested, &names);
    write_json(&out(SUMMARY_JSON), &summary)?;
    write_text(&out(SUMMARY_TEXT), &render_summary(&summary))?;

    Ok(RunOutcome {
        records,
        load,
        reports: set,
        summary,
        out_dir: cfg.out_dir.clone(),
    })
}


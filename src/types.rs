use crate::util::{display_opt_channel, display_opt_money, format_number};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

/// Business-line tag that prefixes some composite metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "CB")]
    Cb,
    #[serde(rename = "BG")]
    Bg,
    #[serde(rename = "DS")]
    Ds,
    Total,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Cb => "CB",
            Channel::Bg => "BG",
            Channel::Ds => "DS",
            Channel::Total => "Total",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingested source table, exactly as read.
///
/// `headers[0]` is the metric label column; the rest are period headers
/// or export placeholders. Rows may be shorter than the header row.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }
}

/// Canonical atomic observation. Field order is the persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct TidyRecord {
    pub year: i32,
    pub week: u32,
    #[tabled(display_with = "display_opt_channel")]
    pub channel: Option<Channel>,
    pub metric_name: String,
    #[tabled(display_with = "display_opt_money")]
    pub value: Option<f64>,
    pub metric: String,
    /// Position of the source file in ingestion order; not persisted.
    #[serde(skip)]
    #[tabled(skip)]
    pub source_ordinal: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TotalRevenueRow {
    pub year: i32,
    #[tabled(display_with = "money")]
    pub total_revenue: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct NetIncomeRow {
    pub year: i32,
    #[tabled(display_with = "money")]
    pub net_income: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ProfitableWeekRow {
    pub year: i32,
    pub week: u32,
    #[tabled(display_with = "money")]
    pub net_income: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct AvgRevenueRow {
    pub year: i32,
    #[tabled(display_with = "money")]
    pub avg_weekly_revenue: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct WeeklyRevenueRow {
    pub year: i32,
    pub week: u32,
    #[tabled(display_with = "money")]
    pub weekly_revenue: f64,
}

fn money(v: &f64) -> String {
    format_number(*v, 2)
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryStats {
    pub files_ingested: usize,
    pub total_weeks: usize,
    pub weeks_by_year: BTreeMap<i32, usize>,
    pub revenue_by_year: BTreeMap<i32, f64>,
    pub total_net_income_by_year: BTreeMap<i32, f64>,
    pub reports: Vec<String>,
}

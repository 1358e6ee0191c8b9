use crate::types::TidyRecord;
use serde::Deserialize;

/// Retention window: all of `primary_year`, plus `extended_year` up to and
/// including `extended_year_cutoff_week`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScopeFilter {
    pub primary_year: i32,
    pub extended_year: i32,
    pub extended_year_cutoff_week: u32,
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self {
            primary_year: 2024,
            extended_year: 2025,
            extended_year_cutoff_week: 31,
        }
    }
}

impl ScopeFilter {
    pub fn retains(&self, year: i32, week: u32) -> bool {
        year == self.primary_year
            || (year == self.extended_year && week <= self.extended_year_cutoff_week)
    }

    pub fn apply(&self, records: Vec<TidyRecord>) -> Vec<TidyRecord> {
        records
            .into_iter()
            .filter(|r| self.retains(r.year, r.week))
            .collect()
    }
}

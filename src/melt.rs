//! Wide-to-long reshaping of one export table.
use crate::channel::MetricDecomposer;
use crate::types::{RawTable, TidyRecord};
use crate::util::{parse_currency, parse_week_label};
use tracing::warn;

/// What melting absorbed instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeltStats {
    pub records: usize,
    pub dropped_rows: usize,
    pub placeholder_columns: usize,
    /// Triples dropped because their period header did not parse.
    pub unparsable_headers: usize,
    /// Records kept with no value.
    pub undefined_values: usize,
}

impl MeltStats {
    pub fn absorb(&mut self, other: &MeltStats) {
        self.records += other.records;
        self.dropped_rows += other.dropped_rows;
        self.placeholder_columns += other.placeholder_columns;
        self.unparsable_headers += other.unparsable_headers;
        self.undefined_values += other.undefined_values;
    }
}

/// Export tools name header-less columns `Unnamed: N` or leave them blank.
pub fn is_placeholder_header(header: &str) -> bool {
    let h = header.trim();
    h.is_empty() || h.starts_with("Unnamed")
}

/// Melt `table` into tidy records, one per (metric row, period column).
///
/// `source_ordinal` tags every record with the table's ingestion position.
/// Rows without a metric label and placeholder columns are dropped first.
/// Columns whose header is not a week label drop all their cells; cells
/// that are not amounts become records with no value.
pub fn melt_table(
    table: &RawTable,
    source_ordinal: usize,
    decomposer: &MetricDecomposer,
) -> (Vec<TidyRecord>, MeltStats) {
    let mut stats = MeltStats::default();

    let mut periods: Vec<(usize, u32, i32)> = Vec::new();
    let mut unparsable_cols = 0usize;
    for (col, header) in table.headers.iter().enumerate().skip(1) {
        if is_placeholder_header(header) {
            stats.placeholder_columns += 1;
            continue;
        }
        match parse_week_label(header) {
            Some((week, year)) => periods.push((col, week, year)),
            None => unparsable_cols += 1,
        }
    }
    if unparsable_cols > 0 {
        warn!(
            source = %table.source,
            columns = unparsable_cols,
            "period headers without a week label were skipped"
        );
    }

    let mut records = Vec::new();
    for row in 0..table.rows.len() {
        let Some(metric) = table.cell(row, 0).filter(|m| !m.trim().is_empty()) else {
            stats.dropped_rows += 1;
            continue;
        };
        stats.unparsable_headers += unparsable_cols;
        let parts = decomposer.decompose(metric);
        for &(col, week, year) in &periods {
            let value = parse_currency(table.cell(row, col));
            if value.is_none() {
                stats.undefined_values += 1;
            }
            records.push(TidyRecord {
                year,
                week,
                channel: parts.channel,
                metric_name: parts.metric_name.to_string(),
                value,
                metric: metric.to_string(),
                source_ordinal,
            });
        }
    }
    stats.records = records.len();
    (records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channel;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            source: "test.csv".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| {
                    r.iter()
                        .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn melts_rows_by_period() {
        let t = table(
            &["Metric", "Week 1, 2024", "Week 2, 2024"],
            &[
                &["CB Revenue", "$100", "$200"],
                &["Total Net Income", "$50", "(10)"],
            ],
        );
        let (recs, stats) = melt_table(&t, 0, &MetricDecomposer::default());
        assert_eq!(recs.len(), 4);
        assert_eq!(stats.records, 4);
        assert_eq!(
            recs[0],
            TidyRecord {
                year: 2024,
                week: 1,
                channel: Some(Channel::Cb),
                metric_name: "Revenue".into(),
                value: Some(100.0),
                metric: "CB Revenue".into(),
                source_ordinal: 0,
            }
        );
        assert_eq!(recs[3].channel, None);
        assert_eq!(recs[3].metric_name, "Total Net Income");
        assert_eq!(recs[3].value, Some(-10.0));
    }

    #[test]
    fn drops_placeholders_blank_metrics_and_bad_headers() {
        let t = table(
            &["Metric", "Week 1, 2024", "Q1 2024", "Unnamed: 3", ""],
            &[
                &["BG Revenue", "1", "2", "x", "y"],
                &["", "3", "4", "", ""],
                &["DS Revenue", "N/A", "5"],
            ],
        );
        let (recs, stats) = melt_table(&t, 0, &MetricDecomposer::default());
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.week == 1 && r.year == 2024));
        assert_eq!(stats.dropped_rows, 1);
        assert_eq!(stats.placeholder_columns, 2);
        assert_eq!(stats.unparsable_headers, 2);
        assert_eq!(stats.undefined_values, 1);
        assert_eq!(recs[1].value, None);
    }

    #[test]
    fn short_rows_yield_undefined_values() {
        let t = table(&["Metric", "Week 1, 2024", "Week 2, 2024"], &[&["Revenue", "7"]]);
        let (recs, _) = melt_table(&t, 0, &MetricDecomposer::default());
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].value, Some(7.0));
        assert_eq!(recs[1].value, None);
    }

    #[test]
    fn metric_label_is_kept_as_exported() {
        let t = table(&["Metric", "Week 1, 2024"], &[&["  CB Revenue ", "1"], &["   ", "2"]]);
        let (recs, stats) = melt_table(&t, 3, &MetricDecomposer::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(stats.dropped_rows, 1);
        assert_eq!(recs[0].metric, "  CB Revenue ");
        assert_eq!(recs[0].channel, None);
        assert_eq!(recs[0].metric_name, "  CB Revenue ");
        assert_eq!(recs[0].source_ordinal, 3);
    }

    #[test]
    fn header_only_table_is_empty() {
        let t = table(&["Metric"], &[]);
        let (recs, stats) = melt_table(&t, 0, &MetricDecomposer::default());
        assert!(recs.is_empty());
        assert_eq!(stats, MeltStats::default());
    }
}

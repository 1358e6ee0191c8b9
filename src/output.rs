use crate::error::{EtlError, Result};
use crate::types::SummaryStats;
use crate::util::format_number;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tempfile::NamedTempFile;

/// Create the output directory if it is missing. Safe to call repeatedly.
pub fn ensure_out_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| EtlError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write through a temporary file in the target directory, then rename it
/// over `path`. Readers see either the old file or the new one.
fn replace_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> std::result::Result<(), std::io::Error>,
{
    let persist_err = |source| EtlError::Persist {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(persist_err)?;
    fill(&mut tmp).map_err(persist_err)?;
    tmp.as_file().sync_all().map_err(persist_err)?;
    tmp.persist(path).map_err(|e| persist_err(e.error))?;
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    replace_atomically(path, |tmp| {
        let mut wtr = csv::Writer::from_writer(tmp);
        for r in rows {
            wtr.serialize(r).map_err(std::io::Error::other)?;
        }
        wtr.flush()
    })
}

/// Like [`write_csv`], but writes `header` even when there are no rows, so
/// an empty report still documents its columns.
pub fn write_report_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    if !rows.is_empty() {
        return write_csv(path, rows);
    }
    replace_atomically(path, |tmp| {
        let mut wtr = csv::Writer::from_writer(tmp);
        wtr.write_record(header).map_err(std::io::Error::other)?;
        wtr.flush()
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    write_text(path, &s)
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    replace_atomically(path, |tmp| tmp.write_all(text.as_bytes()))
}

fn render_map<V>(map: &BTreeMap<i32, V>, fmt: impl Fn(&V) -> String) -> String {
    let parts: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", k, fmt(v)))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

pub fn render_summary(summary: &SummaryStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "PROJECT SUMMARY:");
    let _ = writeln!(out, "- Files ingested: {}", summary.files_ingested);
    let _ = writeln!(
        out,
        "- Total weeks (after scope filter): {}",
        summary.total_weeks
    );
    let _ = writeln!(
        out,
        "- Weeks by year: {}",
        render_map(&summary.weeks_by_year, |n| n.to_string())
    );
    let _ = writeln!(
        out,
        "- Total revenue by year: {}",
        render_map(&summary.revenue_by_year, |v| format_number(*v, 2))
    );
    let _ = writeln!(
        out,
        "- Total net income (Total Net Income): {}",
        render_map(&summary.total_net_income_by_year, |v| format_number(*v, 2))
    );
    let _ = writeln!(out, "\nREPORTS SAVED:");
    for name in &summary.reports {
        let _ = writeln!(out, "- {}.csv", name);
    }
    out
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

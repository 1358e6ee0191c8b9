use crate::config::Config;
use crate::error::{EtlError, Result};
use crate::melt::{melt_table, MeltStats};
use crate::types::{RawTable, TidyRecord};
use csv::ReaderBuilder;
use glob::glob;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub files_ingested: usize,
    pub melt: MeltStats,
    pub scoped_records: usize,
}

/// Windows-1252 code points for bytes 0x80..=0x9F; `None` marks the five
/// bytes the code page leaves undefined.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// All `*.csv` files directly under `dir`, sorted by path.
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("*.csv");
    let mut files = Vec::new();
    for entry in glob(&pattern.to_string_lossy())? {
        let path = entry.map_err(|e| EtlError::Io {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(EtlError::MissingInput {
            dir: dir.to_path_buf(),
        });
    }
    Ok(files)
}

/// Decode export bytes, trying UTF-8, UTF-8 with BOM, then Windows-1252.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(s) = std::str::from_utf8(body) {
        return Some(s.to_string());
    }
    body.iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            _ => Some(b as char),
        })
        .collect()
}

/// Parse decoded CSV text into a table tagged with `source`.
pub fn parse_table(source: &str, text: &str) -> std::result::Result<RawTable, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|cell| {
                if cell.trim().is_empty() {
                    None
                } else {
                    Some(cell.to_string())
                }
            })
            .collect();
        rows.push(row);
    }
    Ok(RawTable {
        source: source.to_string(),
        headers,
        rows,
    })
}

pub fn read_table(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode_text(&bytes).ok_or_else(|| EtlError::SourceDecode {
        path: path.to_path_buf(),
    })?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_table(&source, &text).map_err(|source| EtlError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Discover, read, melt, scope and sort every source under `cfg.raw_dir`.
///
/// Any source that fails to read aborts the whole load; nothing is
/// dropped silently. The result is sorted by (year, week, metric); each
/// record keeps its source's ingestion position in `source_ordinal`.
pub fn load_and_clean(cfg: &Config) -> Result<(Vec<TidyRecord>, LoadReport)> {
    let files = discover_sources(&cfg.raw_dir)?;
    info!(count = files.len(), dir = %cfg.raw_dir.display(), "discovered sources");

    let tables = files
        .iter()
        .map(|p| read_table(p))
        .collect::<Result<Vec<_>>>()?;

    let decomposer = cfg.decomposer();
    let melted: Vec<(Vec<TidyRecord>, MeltStats)> = tables
        .par_iter()
        .enumerate()
        .map(|(ordinal, t)| {
            let span = info_span!("melt", source = %t.source);
            let _enter = span.enter();
            let out = melt_table(t, ordinal, &decomposer);
            debug!(records = out.0.len(), "melted");
            out
        })
        .collect();

    let mut stats = MeltStats::default();
    let mut records = Vec::new();
    for (recs, s) in melted {
        stats.absorb(&s);
        records.extend(recs);
    }

    let mut records = cfg.scope.apply(records);
    records.sort_by(|a, b| {
        (a.year, a.week, &a.metric).cmp(&(b.year, b.week, &b.metric))
    });

    let report = LoadReport {
        files_ingested: tables.len(),
        melt: stats,
        scoped_records: records.len(),
    };
    info!(
        files = report.files_ingested,
        melted = report.melt.records,
        kept = report.scoped_records,
        "load complete"
    );
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_and_strips_bom() {
        assert_eq!(
            decode_text(b"\xEF\xBB\xBFMetric,Week 1, 2024").unwrap(),
            "Metric,Week 1, 2024"
        );
        assert_eq!(decode_text("caf\u{e9}".as_bytes()).unwrap(), "caf\u{e9}");
    }

    #[test]
    fn falls_back_to_cp1252() {
        // 0x80 is the euro sign, 0xE9 is e-acute.
        assert_eq!(decode_text(b"\x80100 caf\xE9").unwrap(), "\u{20AC}100 caf\u{e9}");
    }

    #[test]
    fn undefined_cp1252_bytes_are_undecodable() {
        assert_eq!(decode_text(b"\xC3\x28 \x81"), None);
    }

    #[test]
    fn parses_ragged_rows_and_blank_cells() {
        let text = "Metric,\"Week 1, 2024\",\"Week 2, 2024\",Unnamed: 3\nCB Revenue,\"$1,000\"\n,5,6\n";
        let t = parse_table("a.csv", text).unwrap();
        assert_eq!(t.source, "a.csv");
        assert_eq!(t.headers, vec!["Metric", "Week 1, 2024", "Week 2, 2024", "Unnamed: 3"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.cell(0, 1), Some("$1,000"));
        assert_eq!(t.cell(0, 2), None);
        assert_eq!(t.cell(1, 0), None);
    }

    #[test]
    fn missing_dir_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_sources(dir.path()).unwrap_err();
        assert!(matches!(err, EtlError::MissingInput { .. }));
    }

    #[test]
    fn discovery_sorts_files_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "Metric\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "Metric\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("old.csv")).unwrap();
        let files = discover_sources(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn undecodable_file_surfaces_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, b"Metric,\x81\xFF\n").unwrap();
        let err = read_table(&path).unwrap_err();
        assert!(matches!(err, EtlError::SourceDecode { .. }));
    }
}

//! Tab-separated measure tables: one header row, user id in column 0,
//! numeric measure in column 1. The shared exchange format between
//! pipeline stages and the downstream statistics tooling.

use crate::records::UserId;
use ahash::AHashMap;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Write rows as a TSV file, optionally prefixed by a header row.
pub fn write_tsv<S: AsRef<str>>(path: &Path, rows: &[Vec<String>], headers: Option<&[S]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    if let Some(headers) = headers {
        let line: Vec<&str> = headers.iter().map(|h| h.as_ref()).collect();
        writeln!(w, "{}", line.join("\t"))?;
    }
    for row in rows {
        writeln!(w, "{}", row.join("\t"))?;
    }
    w.flush()?;
    Ok(())
}

/// Read a two-column measure table (skipping one header row) into a map.
pub fn read_measure_table(path: &Path) -> Result<AHashMap<UserId, f64>> {
    let mut measures = AHashMap::default();
    for row in read_rows(path, 1)? {
        if row.len() < 2 {
            bail!("short row in {}: {:?}", path.display(), row);
        }
        let uid: UserId = row[0].trim().parse().with_context(|| format!("bad user id {:?}", row[0]))?;
        let v: f64 = row[1].trim().parse().with_context(|| format!("bad measure {:?}", row[1]))?;
        measures.insert(uid, v);
    }
    Ok(measures)
}

/// Read one column of a TSV file, skipping `skip_rows` header rows.
pub fn read_column(path: &Path, col: usize, skip_rows: usize) -> Result<Vec<String>> {
    let mut items = Vec::new();
    for row in read_rows(path, skip_rows)? {
        if col >= row.len() {
            bail!("column {} out of range in {}: {:?}", col, path.display(), row);
        }
        items.push(row[col].clone());
    }
    Ok(items)
}

/// All rows of a TSV file after `skip_rows` header rows. Blank lines are
/// dropped.
pub fn read_rows(path: &Path, skip_rows: usize) -> Result<Vec<Vec<String>>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let r = BufReader::new(f);
    let mut rows = Vec::new();
    for (i, line) in r.lines().enumerate() {
        let line = line?;
        if i < skip_rows || line.trim().is_empty() {
            continue;
        }
        rows.push(line.split('\t').map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

/// Convert a JSON `uid -> value` map into the two-column TSV convention.
pub fn measure_json_to_tsv(json_path: &Path, tsv_path: &Path, headers: &[&str]) -> Result<()> {
    let f = File::open(json_path).with_context(|| format!("open {}", json_path.display()))?;
    let map: AHashMap<UserId, f64> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse {}", json_path.display()))?;

    let mut rows: Vec<(UserId, f64)> = map.into_iter().collect();
    rows.sort_by_key(|(uid, _)| *uid);
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|(uid, v)| vec![uid.to_string(), v.to_string()])
        .collect();
    write_tsv(tsv_path, &rows, Some(headers))
}

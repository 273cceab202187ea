//! Reduce-by-key over tab-separated key/value files.
//!
//! The reduction strategy is a fixed enumerated set dispatched through a
//! tagged variant. Earlier tooling accepted arbitrary code for the reducer;
//! that is exactly the kind of input this module refuses to take.

use crate::tsv::{read_rows, write_tsv};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// How two values with the same key are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReduceFn {
    /// Numeric sum.
    Sum,
    /// Numeric maximum.
    Max,
    /// Numeric minimum.
    Min,
    /// String concatenation, comma-joined.
    Concat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Unsorted,
    /// Ascending by reduced value.
    Ascending,
    /// Descending by reduced value.
    Descending,
}

/// Reduced values keep their string form for `Concat` and a parsed numeric
/// form otherwise, so sorting and output stay faithful to the strategy.
#[derive(Clone, Debug)]
enum Reduced {
    Number(f64),
    Text(String),
}

impl Reduced {
    fn render(&self) -> String {
        match self {
            Reduced::Number(v) => v.to_string(),
            Reduced::Text(s) => s.clone(),
        }
    }
}

/// A reduce-by-key batch: read `key \t value` rows from every source,
/// combine values per key, and write a single TSV.
#[derive(Clone, Debug)]
pub struct ReduceJob {
    pub sources: Vec<PathBuf>,
    pub reduce: ReduceFn,
    pub sort: SortOrder,
    pub skip_rows: usize,
    pub headers: Option<Vec<String>>,
}

impl ReduceJob {
    pub fn new(sources: Vec<PathBuf>, reduce: ReduceFn) -> Self {
        Self { sources, reduce, sort: SortOrder::Unsorted, skip_rows: 0, headers: None }
    }
    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort = order;
        self
    }
    pub fn skip_rows(mut self, n: usize) -> Self {
        self.skip_rows = n;
        self
    }
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Expand directory sources into their files, in sorted order.
    fn expand_sources(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for src in &self.sources {
            if !src.exists() {
                bail!("source does not exist: {}", src.display());
            }
            if src.is_dir() {
                let mut entries: Vec<PathBuf> = std::fs::read_dir(src)?
                    .filter_map(|e| e.ok().map(|e| e.path()))
                    .filter(|p| p.is_file())
                    .collect();
                entries.sort();
                files.extend(entries);
            } else {
                files.push(src.clone());
            }
        }
        Ok(files)
    }

    fn combine(&self, acc: &mut Reduced, value: &str) -> Result<()> {
        match (self.reduce, acc) {
            (ReduceFn::Concat, Reduced::Text(s)) => {
                s.push(',');
                s.push_str(value);
            }
            (_, Reduced::Number(n)) => {
                let v: f64 = value.trim().parse().with_context(|| format!("non-numeric value {:?}", value))?;
                *n = match self.reduce {
                    ReduceFn::Sum => *n + v,
                    ReduceFn::Max => n.max(v),
                    ReduceFn::Min => n.min(v),
                    ReduceFn::Concat => unreachable!("concat never holds a number"),
                };
            }
            _ => unreachable!("accumulator variant fixed by strategy"),
        }
        Ok(())
    }

    fn initial(&self, value: &str) -> Result<Reduced> {
        match self.reduce {
            ReduceFn::Concat => Ok(Reduced::Text(value.to_string())),
            _ => {
                let v: f64 = value.trim().parse().with_context(|| format!("non-numeric value {:?}", value))?;
                Ok(Reduced::Number(v))
            }
        }
    }

    pub fn run(&self, dest: &Path) -> Result<()> {
        let files = self.expand_sources()?;
        tracing::info!(files = files.len(), dest = %dest.display(), "reducing key/value files");

        let mut reduced = BTreeMap::<String, Reduced>::new();
        for file in &files {
            for row in read_rows(file, self.skip_rows)? {
                if row.len() < 2 {
                    bail!("short row in {}: {:?}", file.display(), row);
                }
                let key = row[0].clone();
                match reduced.get_mut(&key) {
                    Some(acc) => self.combine(acc, &row[1])
                        .with_context(|| format!("reducing key {:?} in {}", key, file.display()))?,
                    None => {
                        let init = self.initial(&row[1])
                            .with_context(|| format!("reducing key {:?} in {}", key, file.display()))?;
                        reduced.insert(key, init);
                    }
                }
            }
        }

        let mut rows: Vec<(String, Reduced)> = reduced.into_iter().collect();
        match self.sort {
            SortOrder::Unsorted => {}
            SortOrder::Ascending => rows.sort_by(|a, b| cmp_reduced(&a.1, &b.1)),
            SortOrder::Descending => rows.sort_by(|a, b| cmp_reduced(&b.1, &a.1)),
        }

        let out: Vec<Vec<String>> = rows.into_iter().map(|(k, v)| vec![k, v.render()]).collect();
        write_tsv(dest, &out, self.headers.as_deref())
    }
}

fn cmp_reduced(a: &Reduced, b: &Reduced) -> std::cmp::Ordering {
    match (a, b) {
        (Reduced::Number(x), Reduced::Number(y)) => x.total_cmp(y),
        (Reduced::Text(x), Reduced::Text(y)) => x.cmp(y),
        (Reduced::Number(_), Reduced::Text(_)) => std::cmp::Ordering::Less,
        (Reduced::Text(_), Reduced::Number(_)) => std::cmp::Ordering::Greater,
    }
}

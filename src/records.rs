//! Core dataset types: stripped shares keyed by user id, plus load/save and
//! kind-based filtering.

use crate::config::ShareKinds;
use ahash::AHashMap;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub type UserId = u64;

/// One stripped post: the canonical domains it shared, and the original
/// poster's id when the post was a retweet or a quote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retweeted: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted: Option<UserId>,
}

impl Share {
    pub fn is_retweet(&self) -> bool {
        self.retweeted.is_some()
    }
    pub fn is_quote(&self) -> bool {
        self.quoted.is_some()
    }
    pub fn is_standalone(&self) -> bool {
        !self.is_retweet() && !self.is_quote()
    }
}

/// All shares of a corpus, keyed by user id. JSON form is an object with
/// decimal-string keys, as produced by the stripping stage.
pub type ShareDataset = AHashMap<UserId, Vec<Share>>;

/// Shares dropped by `filter_dataset`, by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkippedCounts {
    pub standalone: u64,
    pub retweets: u64,
    pub quotes: u64,
}

/// Keep only the share kinds enabled in `keep`. Users stay in the dataset
/// even when all their shares are dropped; downstream stages skip empty
/// users themselves.
pub fn filter_dataset(dataset: &ShareDataset, keep: ShareKinds) -> (ShareDataset, SkippedCounts) {
    let mut out = ShareDataset::default();
    let mut skipped = SkippedCounts::default();

    for (&uid, shares) in dataset {
        let kept = out.entry(uid).or_default();
        for share in shares {
            if share.is_retweet() {
                if keep.retweets {
                    kept.push(share.clone());
                } else {
                    skipped.retweets += 1;
                }
            } else if share.is_quote() {
                if keep.quotes {
                    kept.push(share.clone());
                } else {
                    skipped.quotes += 1;
                }
            } else if keep.standalone {
                kept.push(share.clone());
            } else {
                skipped.standalone += 1;
            }
        }
    }

    tracing::debug!(?skipped, "filtered dataset");
    (out, skipped)
}

pub fn load_dataset(path: &Path) -> Result<ShareDataset> {
    let f = File::open(path).with_context(|| format!("open dataset {}", path.display()))?;
    let dataset = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse dataset {}", path.display()))?;
    Ok(dataset)
}

pub fn save_dataset(path: &Path, dataset: &ShareDataset) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create dataset {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, dataset)?;
    w.flush()?;
    Ok(())
}

/// Bot scores from a comma-separated export (header row; uid in column 0,
/// score in column 3). Duplicate uids indicate a broken export.
pub fn load_bot_scores(path: &Path) -> Result<AHashMap<UserId, f64>> {
    let f = File::open(path).with_context(|| format!("open bot scores {}", path.display()))?;
    let mut scores = AHashMap::default();
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if i == 0 || line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split(',').collect();
        if cols.len() < 4 {
            bail!("short bot-score row in {}: {:?}", path.display(), line);
        }
        let uid: UserId = cols[0].trim().parse().with_context(|| format!("bad uid {:?}", cols[0]))?;
        let score: f64 = cols[3].trim().parse().with_context(|| format!("bad score {:?}", cols[3]))?;
        if scores.insert(uid, score).is_some() {
            bail!("duplicate bot score for user {} in {}", uid, path.display());
        }
    }
    Ok(scores)
}

/// Keep only users with a known bot score below `threshold`. Users without
/// a score are dropped; an unknown account is not assumed human.
pub fn remove_bot_users(
    dataset: &ShareDataset,
    scores: &AHashMap<UserId, f64>,
    threshold: f64,
) -> ShareDataset {
    let kept: ShareDataset = dataset
        .iter()
        .filter(|(uid, _)| scores.get(uid).map(|s| *s < threshold).unwrap_or(false))
        .map(|(&uid, shares)| (uid, shares.clone()))
        .collect();
    tracing::debug!(before = dataset.len(), after = kept.len(), "removed bot users");
    kept
}

/// Merge per-shard stripped JSON maps from a directory into one dataset.
/// A uid appearing in two shards indicates a broken sharding run.
pub fn load_sharded_dataset(paths: &[std::path::PathBuf]) -> Result<ShareDataset> {
    let mut users = ShareDataset::default();
    for path in paths {
        let part = load_dataset(path)?;
        for (uid, shares) in part {
            if users.insert(uid, shares).is_some() {
                bail!("duplicate user {} while merging {}", uid, path.display());
            }
        }
    }
    Ok(users)
}

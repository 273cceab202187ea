//! Per-user behavioral measures: partisanship from the political valences of
//! shared domains, ideology from the scored accounts a user follows, and
//! misinformation exposure from a blocklist of known misinformation sites.

use crate::domain::canonical_domain;
use crate::jsonl::for_each_line;
use crate::network::FriendGraph;
use crate::paths::FileJob;
use crate::records::{ShareDataset, UserId};
use crate::stats::mean;
use crate::strip::RawPost;
use crate::tsv::read_rows;
use ahash::{AHashMap, AHashSet};
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Political valence per domain, from a TSV of `domain \t valence`.
/// Duplicate domains keep the first value seen.
pub fn read_valences(path: &Path) -> Result<AHashMap<String, f64>> {
    let mut valences = AHashMap::default();
    for row in read_rows(path, 1)? {
        if row.len() < 2 {
            bail!("short valence row in {}: {:?}", path.display(), row);
        }
        let domain = row[0].trim().to_lowercase();
        let valence: f64 = row[1].trim().parse()?;
        if valences.contains_key(&domain) {
            tracing::debug!(%domain, "valence already read, keeping first");
        } else {
            valences.insert(domain, valence);
        }
    }
    Ok(valences)
}

/// Share-weighted mean valence of the listed domains each user shared:
/// `sum over listed d of (count[d] / total_shares) * valence[d]`.
///
/// Users with fewer than `min_share_count` total domain shares are skipped.
/// A qualifying user who shared no listed domain scores 0.0; their row still
/// reaches the downstream tables.
pub fn compute_partisanship(
    dataset: &ShareDataset,
    valences: &AHashMap<String, f64>,
    min_share_count: u64,
) -> AHashMap<UserId, f64> {
    let mut scores = AHashMap::default();

    for (&uid, shares) in dataset {
        let mut total: u64 = 0;
        let mut news_visits = AHashMap::<&str, u64>::default();
        for share in shares {
            for d in &share.domains {
                total += 1;
                if valences.contains_key(d.as_str()) {
                    *news_visits.entry(d.as_str()).or_insert(0) += 1;
                }
            }
        }

        if total < min_share_count {
            tracing::info!(uid, total, min_share_count, "below minimum share count, skipping");
            continue;
        }

        let mut score = 0.0;
        for (d, count) in news_visits {
            score += (count as f64 / total as f64) * valences[d];
        }
        scores.insert(uid, score);
    }
    scores
}

/// Per-user fraction of shared URLs that resolve to a listed misinformation
/// domain, over one raw post shard. Users below `min_post_count` total URLs
/// are skipped.
pub fn compute_misinfo_exposure(
    job: &FileJob,
    misinfo_sites: &AHashSet<String>,
    min_post_count: u64,
    read_buf: usize,
) -> Result<AHashMap<UserId, f64>> {
    tracing::debug!(path = %job.path.display(), sites = misinfo_sites.len(), "computing misinfo exposure");

    let mut total_counts = AHashMap::<UserId, u64>::default();
    let mut misinfo_counts = AHashMap::<UserId, u64>::default();

    for_each_line(&job.path, read_buf, |line| {
        let post: RawPost = match serde_json::from_str(line) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "couldn't parse post line, skipping");
                return Ok(());
            }
        };
        let Some(uid) = post.user.as_ref().and_then(|u| u.id) else {
            return Ok(());
        };
        total_counts.entry(uid).or_insert(0);
        misinfo_counts.entry(uid).or_insert(0);

        if let Some(urls) = post.entities.as_ref().and_then(|e| e.urls.as_ref()) {
            for u in urls {
                if let Some(raw) = &u.expanded_url {
                    *total_counts.entry(uid).or_insert(0) += 1;
                    if misinfo_sites.contains(&canonical_domain(raw)) {
                        *misinfo_counts.entry(uid).or_insert(0) += 1;
                    }
                }
            }
        }
        Ok(())
    })?;

    let mut scores = AHashMap::default();
    for (uid, &hits) in &misinfo_counts {
        let total = total_counts.get(uid).copied().unwrap_or(0);
        if total < min_post_count {
            tracing::info!(uid, total, min_post_count, "below minimum post count, skipping");
            continue;
        }
        scores.insert(*uid, hits as f64 / total as f64);
    }
    Ok(scores)
}

/// Account ideology scores from a comma-separated export (header row; uid in
/// column 0, score in column 1).
pub fn read_ideology_scores(path: &Path) -> Result<AHashMap<UserId, f64>> {
    let f = File::open(path).with_context(|| format!("open ideology scores {}", path.display()))?;
    let mut scores = AHashMap::default();
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if i == 0 || line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split(',').collect();
        if cols.len() < 2 {
            bail!("short ideology row in {}: {:?}", path.display(), line);
        }
        let uid: UserId = cols[0].trim().parse().with_context(|| format!("bad uid {:?}", cols[0]))?;
        let score: f64 = cols[1].trim().parse().with_context(|| format!("bad score {:?}", cols[1]))?;
        scores.insert(uid, score);
    }
    Ok(scores)
}

/// Mean ideology score of the accounts each user follows, over the followed
/// accounts with a known score. Users following no scored account get no row.
pub fn compute_ideology(
    users: &[UserId],
    friends: &FriendGraph,
    scores: &AHashMap<UserId, f64>,
) -> AHashMap<UserId, f64> {
    let mut out = AHashMap::default();
    for &uid in users {
        let Some(followed) = friends.get(&uid) else {
            continue;
        };
        let known: Vec<f64> = followed.iter().filter_map(|f| scores.get(f).copied()).collect();
        if known.is_empty() {
            continue;
        }
        out.insert(uid, mean(&known));
    }
    out
}

/// Count how many of `domains` hit the lookup set; weighted when counts are
/// supplied.
pub fn domain_count<'a, I>(domains: I, lookup: &AHashSet<String>) -> u64
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    domains
        .into_iter()
        .filter(|(d, _)| lookup.contains(*d))
        .map(|(_, count)| count)
        .sum()
}

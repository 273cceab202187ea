//! Raw-post ingestion: turn JSONL post shards into stripped per-user share
//! datasets (canonical domains plus retweet/quote provenance only).

use crate::domain::canonical_domain;
use crate::jsonl::for_each_line;
use crate::records::{Share, ShareDataset, UserId};
use ahash::AHashSet;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The slice of a raw post this pipeline cares about. Everything else on the
/// line is ignored by serde.
#[derive(Debug, Deserialize)]
pub struct RawPost {
    pub user: Option<PostUser>,
    pub entities: Option<PostEntities>,
    pub retweeted_status: Option<Box<RawPost>>,
    pub quoted_status: Option<Box<RawPost>>,
}

#[derive(Debug, Deserialize)]
pub struct PostUser {
    pub id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct PostEntities {
    pub urls: Option<Vec<PostUrl>>,
}

#[derive(Debug, Deserialize)]
pub struct PostUrl {
    pub expanded_url: Option<String>,
}

/// Counters accumulated while stripping one or more shards. The eq/neq pairs
/// track how often a retweet/quote shared exactly the same domain set as the
/// wrapping post.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StripStats {
    pub total_posts: u64,
    pub skipped_lines: u64,
    pub no_domain_posts: u64,
    pub retweet_eq: u64,
    pub retweet_neq: u64,
    pub quote_eq: u64,
    pub quote_neq: u64,
}

impl StripStats {
    pub fn merge(&mut self, other: StripStats) {
        self.total_posts += other.total_posts;
        self.skipped_lines += other.skipped_lines;
        self.no_domain_posts += other.no_domain_posts;
        self.retweet_eq += other.retweet_eq;
        self.retweet_neq += other.retweet_neq;
        self.quote_eq += other.quote_eq;
        self.quote_neq += other.quote_neq;
    }
}

/// Author id and canonical domain set of one post (ignoring any nested post).
pub fn extract_post_domains(post: &RawPost) -> Option<(UserId, AHashSet<String>)> {
    let uid = post.user.as_ref()?.id?;
    let mut domains = AHashSet::new();
    if let Some(urls) = post.entities.as_ref().and_then(|e| e.urls.as_ref()) {
        for u in urls {
            if let Some(raw) = &u.expanded_url {
                domains.insert(canonical_domain(raw));
            }
        }
    }
    Some((uid, domains))
}

/// Shard stem of a raw post file (`123.json.zst` -> `123`).
fn shard_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    Some(name.split('.').next().unwrap_or(name))
}

/// Strip one raw shard into a `uid -> [Share]` JSON map at `dest`.
///
/// Shards are named by the trailing digits of the user ids they hold; a post
/// whose author does not belong in this shard is a corpus defect and fails
/// the job. Unparseable lines are logged and skipped.
pub fn strip_file(src: &Path, dest: &Path, read_buf: usize, write_buf: usize) -> Result<StripStats> {
    tracing::info!(src = %src.display(), dest = %dest.display(), "stripping shard");

    let suffix = match shard_stem(src) {
        Some(stem) if stem.bytes().all(|b| b.is_ascii_digit()) => Some(stem.to_string()),
        _ => None,
    };

    let mut data = ShareDataset::default();
    let mut stats = StripStats::default();

    for_each_line(src, read_buf, |line| {
        let post: RawPost = match serde_json::from_str(line) {
            Ok(p) => p,
            Err(e) => {
                stats.skipped_lines += 1;
                tracing::warn!(error = %e, "couldn't parse post line, skipping");
                return Ok(());
            }
        };

        let Some((uid, mut domains)) = extract_post_domains(&post) else {
            stats.skipped_lines += 1;
            tracing::warn!("post without author id, skipping");
            return Ok(());
        };

        if let Some(suffix) = &suffix {
            if !uid.to_string().ends_with(suffix.as_str()) {
                bail!("user {} does not belong in shard {}", uid, src.display());
            }
        }

        if domains.is_empty() || (domains.len() == 1 && domains.contains("")) {
            stats.no_domain_posts += 1;
            return Ok(());
        }
        stats.total_posts += 1;

        let mut share = Share { domains: Vec::new(), retweeted: None, quoted: None };
        if let Some(quoted) = &post.quoted_status {
            if let Some((quid, qdomains)) = extract_post_domains(quoted) {
                if qdomains == domains {
                    stats.quote_eq += 1;
                } else {
                    stats.quote_neq += 1;
                }
                domains.extend(qdomains);
                share.quoted = Some(quid);
            }
        } else if let Some(retweeted) = &post.retweeted_status {
            if let Some((ruid, rdomains)) = extract_post_domains(retweeted) {
                if rdomains == domains {
                    stats.retweet_eq += 1;
                } else {
                    stats.retweet_neq += 1;
                }
                domains.extend(rdomains);
                share.retweeted = Some(ruid);
            }
        }

        let mut sorted: Vec<String> = domains.into_iter().filter(|d| !d.is_empty()).collect();
        sorted.sort();
        share.domains = sorted;
        data.entry(uid).or_default().push(share);
        Ok(())
    })?;

    let f = File::create(dest).with_context(|| format!("create {}", dest.display()))?;
    let mut w = BufWriter::with_capacity(write_buf, f);
    serde_json::to_writer(&mut w, &data)?;
    w.flush()?;
    Ok(stats)
}

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One shard file of the corpus, named by the trailing digits of the user
/// ids it holds (`042.json`, `042.jsonl`, `042.json.zst`).
#[derive(Clone, Debug)]
pub struct FileJob {
    pub stem: String,
    pub path: PathBuf,
}

/// Discover shard files directly under `dir`, sorted by stem. Non-matching
/// names are ignored.
pub fn discover_shards(dir: &Path) -> Vec<FileJob> {
    // Shard files: digits + .json / .jsonl, optionally .zst compressed.
    let re = Regex::new(r"^(\d+)\.jsonl?(\.zst)?$").unwrap();
    let mut jobs = Vec::new();
    if !dir.exists() {
        return jobs;
    }
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter().flatten() {
        if let Some(name) = entry.file_name().to_str() {
            if let Some(caps) = re.captures(name) {
                jobs.push(FileJob { stem: caps[1].to_string(), path: entry.path().to_path_buf() });
            }
        }
    }
    jobs.sort_by(|a, b| a.stem.cmp(&b.stem));
    jobs
}

/// Pair each discovered shard with an output path under `dest_dir`, keeping
/// the shard stem (`042.json.zst` -> `dest_dir/042.json`).
pub fn plan_outputs(jobs: &[FileJob], dest_dir: &Path) -> Vec<(FileJob, PathBuf)> {
    jobs.iter()
        .map(|j| (j.clone(), dest_dir.join(format!("{}.json", j.stem))))
        .collect()
}

pub fn total_file_size(jobs: &[FileJob]) -> u64 {
    jobs.iter()
        .map(|j| std::fs::metadata(&j.path).map(|m| m.len()).unwrap_or(0))
        .sum()
}

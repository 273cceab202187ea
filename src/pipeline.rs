//! Batch pipeline facade: one chainable entry point wiring the corpus
//! stages together (strip, bot removal, tf-idf similarity, measures,
//! network reductions, anonymization). Every operation is file-in/file-out
//! against explicit paths; there is no ambient data-root environment.

use crate::anonymize::{anonymize_friends, anonymize_shares, IdMapping};
use crate::concurrency::run_jobs_limited;
use crate::config::PipelineOptions;
use crate::measures::{
    compute_ideology, compute_misinfo_exposure, compute_partisanship, read_ideology_scores,
    read_valences,
};
use crate::network::{clustering_coefficients, load_friends, reciprocal_graph, save_friends};
use crate::paths::{discover_shards, plan_outputs, total_file_size};
use crate::progress::{make_count_progress, make_progress_bar_labeled};
use crate::records::{
    filter_dataset, load_bot_scores, load_dataset, remove_bot_users, save_dataset, UserId,
};
use crate::strip::{strip_file, StripStats};
use crate::tfidf::{average_similarities, compute_tfidf, inverted_terms, pairwise_similarities};
use crate::tsv::{read_column, read_measure_table, write_tsv};
use crate::util::{init_tracing_once, write_atomic};
use ahash::{AHashMap, AHashSet};
use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use std::fs;
use std::path::Path;

#[derive(Clone, Default)]
pub struct SharePipeline {
    pub(crate) opts: PipelineOptions,
}

impl SharePipeline {
    pub fn new() -> Self {
        Self { opts: PipelineOptions::default() }
    }

    // -------- Builder methods --------
    pub fn data_root(mut self, root: impl AsRef<Path>) -> Self { self.opts = self.opts.with_data_root(root); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn share_kinds(mut self, kinds: crate::config::ShareKinds) -> Self { self.opts = self.opts.with_share_kinds(kinds); self }
    pub fn min_share_count(mut self, n: u64) -> Self { self.opts = self.opts.with_min_share_count(n); self }
    pub fn bot_score_threshold(mut self, t: f64) -> Self { self.opts = self.opts.with_bot_score_threshold(t); self }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self { self.opts = self.opts.with_io_buffers(read_bytes, write_bytes); self }

    fn prepare(&self) {
        init_tracing_once();
        if let Some(n) = self.opts.parallelism {
            if n > 0 {
                rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok();
            }
        }
    }

    fn root(&self, rel: impl AsRef<Path>) -> std::path::PathBuf {
        self.opts.data_root.join(rel)
    }

    /// Strip every raw post shard under `src_dir` into per-user share maps
    /// under `dest_dir`. All shards run; a report naming every failed shard
    /// is returned as the error when any fail.
    pub fn strip_dataset(&self, src_dir: impl AsRef<Path>, dest_dir: impl AsRef<Path>) -> Result<StripStats> {
        self.prepare();
        let src_dir = self.root(src_dir);
        let dest_dir = self.root(dest_dir);
        fs::create_dir_all(&dest_dir)?;

        let jobs = discover_shards(&src_dir);
        if jobs.is_empty() {
            tracing::warn!(dir = %src_dir.display(), "no shards found, nothing to strip");
            return Ok(StripStats::default());
        }
        tracing::info!(shards = jobs.len(), "stripping dataset");

        let outputs: AHashMap<String, std::path::PathBuf> = plan_outputs(&jobs, &dest_dir)
            .into_iter()
            .map(|(job, out)| (job.stem, out))
            .collect();

        let pb = self.opts.progress.then(|| {
            make_progress_bar_labeled(
                total_file_size(&jobs),
                Some(self.opts.progress_label.as_deref().unwrap_or("Stripping shards")),
            )
        });

        let stats = Mutex::new(StripStats::default());
        let read_buf = self.opts.read_buffer_bytes;
        let write_buf = self.opts.write_buffer_bytes;

        let report = run_jobs_limited(&jobs, self.opts.file_concurrency, |job| {
            let dest = outputs
                .get(&job.stem)
                .with_context(|| format!("no planned output for shard {}", job.stem))?;
            let part = strip_file(&job.path, dest, read_buf, write_buf)
                .with_context(|| format!("stripping {}", job.path.display()))?;
            stats.lock().merge(part);
            if let Some(pb) = &pb {
                pb.inc(fs::metadata(&job.path).map(|m| m.len()).unwrap_or(0));
            }
            Ok(())
        });
        if let Some(pb) = pb {
            pb.finish_with_message("strip done");
        }

        report.into_result()?;
        Ok(stats.into_inner())
    }

    /// Merge per-shard stripped maps under `src_dir` into one dataset file.
    pub fn merge_stripped(&self, src_dir: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
        self.prepare();
        let jobs = discover_shards(&self.root(src_dir));
        let paths: Vec<std::path::PathBuf> = jobs.into_iter().map(|j| j.path).collect();
        let merged = crate::records::load_sharded_dataset(&paths)?;
        tracing::info!(shards = paths.len(), users = merged.len(), "merged stripped shards");
        write_atomic(&self.root(dest), |tmp| save_dataset(tmp, &merged))
    }

    /// Drop users whose bot score is missing or at/above the configured
    /// threshold, writing the cleaned dataset to `dest`.
    pub fn remove_bots(
        &self,
        dataset_file: impl AsRef<Path>,
        bot_scores_file: impl AsRef<Path>,
        dest: impl AsRef<Path>,
    ) -> Result<()> {
        self.prepare();
        let dataset = load_dataset(&self.root(dataset_file))?;
        let scores = load_bot_scores(&self.root(bot_scores_file))?;
        let cleaned = remove_bot_users(&dataset, &scores, self.opts.bot_score_threshold);
        tracing::info!(before = dataset.len(), after = cleaned.len(), "bot removal");
        write_atomic(&self.root(dest), |tmp| save_dataset(tmp, &cleaned))
    }

    /// TF-IDF weights, pairwise similarities and per-user averages over the
    /// configured share kinds. Writes four outputs under `out_dir`:
    /// `tfidf-<suffix>.json`, `similarities-<suffix>.json`,
    /// `average-similarity-<suffix>.json` and `tfidf-<suffix>.tab`.
    pub fn tfidf_similarity(&self, dataset_file: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<()> {
        self.prepare();
        let out_dir = self.root(out_dir);
        fs::create_dir_all(&out_dir)?;
        let suffix = self.opts.share_kinds.file_suffix();

        tracing::info!("loading shares");
        let dataset = load_dataset(&self.root(dataset_file))?;
        tracing::info!(users = dataset.len(), "loaded");

        let (dataset, skipped) = filter_dataset(&dataset, self.opts.share_kinds);
        tracing::info!(users = dataset.len(), ?skipped, "filtered by share kind");

        tracing::info!("computing inverted index for terms");
        let terms = inverted_terms(&dataset);
        tracing::info!(domains = terms.len(), "domains found");

        tracing::info!("computing tfidf");
        let tfidf = compute_tfidf(&dataset, &terms);
        write_atomic(&out_dir.join(format!("tfidf-{suffix}.json")), |tmp| {
            crate::util::write_json_map(tmp, &tfidf)
        })?;

        tracing::info!(users = tfidf.len(), "computing pairwise similarities");
        let sims = pairwise_similarities(&tfidf);
        write_atomic(&out_dir.join(format!("similarities-{suffix}.json")), |tmp| {
            crate::util::write_json_map(tmp, &sims)
        })?;

        let avgs = average_similarities(&sims);
        let avg_path = out_dir.join(format!("average-similarity-{suffix}.json"));
        write_atomic(&avg_path, |tmp| crate::util::write_json_map(tmp, &avgs))?;

        crate::tsv::measure_json_to_tsv(
            &avg_path,
            &out_dir.join(format!("tfidf-{suffix}.tab")),
            &["user id", "average similarity"],
        )
    }

    /// Partisanship scores from a stripped dataset and a domain-valence
    /// table, written as a two-column TSV.
    pub fn partisanship(
        &self,
        dataset_file: impl AsRef<Path>,
        valence_file: impl AsRef<Path>,
        dest: impl AsRef<Path>,
    ) -> Result<()> {
        self.prepare();
        let dataset = load_dataset(&self.root(dataset_file))?;
        let valence_path = self.root(valence_file);
        let valences = read_valences(&valence_path)?;
        if valences.is_empty() {
            bail!("no valences in {}", valence_path.display());
        }
        let scores = compute_partisanship(&dataset, &valences, self.opts.min_share_count);
        write_measure_tsv(&self.root(dest), &scores, &["user id", "partisanship"])
    }

    /// Mean ideology of the scored accounts each user follows, restricted to
    /// the users already present in `measure_file` (an existing measure
    /// table, typically partisanship).
    pub fn ideology(
        &self,
        measure_file: impl AsRef<Path>,
        friends_file: impl AsRef<Path>,
        scores_file: impl AsRef<Path>,
        dest: impl AsRef<Path>,
    ) -> Result<()> {
        self.prepare();
        let table = read_measure_table(&self.root(measure_file))?;
        let mut users: Vec<UserId> = table.keys().copied().collect();
        users.sort_unstable();

        let friends = load_friends(&self.root(friends_file))?;
        let scores_path = self.root(scores_file);
        let scores = read_ideology_scores(&scores_path)?;
        if scores.is_empty() {
            bail!("no ideology scores in {}", scores_path.display());
        }

        let measure = compute_ideology(&users, &friends, &scores);
        tracing::info!(users = users.len(), scored = measure.len(), "ideology");
        write_measure_tsv(&self.root(dest), &measure, &["user id", "ideology"])
    }

    /// Misinformation exposure over raw post shards: per-user fraction of
    /// shared URLs resolving to a listed misinformation domain.
    pub fn misinfo_exposure(
        &self,
        posts_dir: impl AsRef<Path>,
        misinfo_file: impl AsRef<Path>,
        dest: impl AsRef<Path>,
    ) -> Result<()> {
        self.prepare();
        let sites: AHashSet<String> = read_column(&self.root(misinfo_file), 0, 1)?
            .into_iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        if sites.is_empty() {
            bail!("empty misinformation site list");
        }

        let jobs = discover_shards(&self.root(posts_dir));
        let pb = self
            .opts
            .progress
            .then(|| make_count_progress(jobs.len() as u64, "Misinfo exposure"));

        let merged = Mutex::new(AHashMap::<UserId, f64>::default());
        let min_posts = self.opts.min_share_count;
        let read_buf = self.opts.read_buffer_bytes;

        let report = run_jobs_limited(&jobs, self.opts.file_concurrency, |job| {
            let part = compute_misinfo_exposure(job, &sites, min_posts, read_buf)?;
            merged.lock().extend(part);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            Ok(())
        });
        if let Some(pb) = pb {
            pb.finish_with_message("misinfo done");
        }
        report.into_result()?;

        write_measure_tsv(&self.root(dest), &merged.into_inner(), &["user id", "misinfo share"])
    }

    /// Reduce a follower graph to its mutual edges.
    pub fn reciprocal_network(&self, friends_file: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
        self.prepare();
        let friends = load_friends(&self.root(friends_file))?;
        let reciprocal = reciprocal_graph(&friends);
        tracing::info!(users = friends.len(), reciprocal_users = reciprocal.len(), "reciprocal network");
        write_atomic(&self.root(dest), |tmp| save_friends(tmp, &reciprocal))
    }

    /// Per-user local clustering coefficients of a follower graph.
    pub fn clustering(&self, friends_file: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
        self.prepare();
        let friends = load_friends(&self.root(friends_file))?;
        let coeffs = clustering_coefficients(&friends);
        write_atomic(&self.root(dest), |tmp| crate::util::write_json_map(tmp, &coeffs))
    }

    /// Remap shares and friends onto a dense shuffled id space, writing
    /// `anonymized-shares.json` and `anonymized-friends.json` to `out_dir`.
    pub fn anonymize(
        &self,
        dataset_file: impl AsRef<Path>,
        friends_file: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<()> {
        self.prepare();
        let out_dir = self.root(out_dir);
        fs::create_dir_all(&out_dir)?;

        let shares = load_dataset(&self.root(dataset_file))?;
        let friends = load_friends(&self.root(friends_file))?;

        let mut rng = rand::rng();
        let mapping = IdMapping::build(&shares, &friends, &mut rng);
        tracing::info!(mappings = mapping.len(), "built id mapping");

        let anon_shares = anonymize_shares(&shares, &mapping)?;
        write_atomic(&out_dir.join("anonymized-shares.json"), |tmp| save_dataset(tmp, &anon_shares))?;

        let anon_friends = anonymize_friends(&friends, &mapping)?;
        write_atomic(&out_dir.join("anonymized-friends.json"), |tmp| save_friends(tmp, &anon_friends))
    }
}

/// Sorted two-column measure TSV with a header row.
fn write_measure_tsv(dest: &Path, measure: &AHashMap<UserId, f64>, headers: &[&str]) -> Result<()> {
    let mut rows: Vec<(UserId, f64)> = measure.iter().map(|(&u, &v)| (u, v)).collect();
    rows.sort_by_key(|(uid, _)| *uid);
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|(uid, v)| vec![uid.to_string(), v.to_string()])
        .collect();
    write_tsv(dest, &rows, Some(headers))
}

mod anonymize;
mod concurrency;
mod config;
mod domain;
mod jsonl;
mod measures;
mod network;
mod paths;
mod pipeline;
mod progress;
mod records;
mod reduce;
mod stats;
mod strip;
mod tfidf;
mod tsv;
mod util;

pub use crate::config::{PipelineOptions, ShareKinds};
pub use crate::pipeline::SharePipeline;

pub use crate::domain::{
    canonical_domain, change_domain_level, domain_level, is_exception, is_ip_address,
    nth_level_domain, parents,
};

pub use crate::records::{
    filter_dataset, load_bot_scores, load_dataset, load_sharded_dataset, remove_bot_users,
    save_dataset, Share, ShareDataset, SkippedCounts, UserId,
};
pub use crate::strip::{extract_post_domains, strip_file, RawPost, StripStats};

pub use crate::tfidf::{
    average_similarities, compute_sim, compute_tfidf, inverted_terms, pairwise_similarities,
    term_freqs, InvertedTerms, Similarities, Tfidf,
};

pub use crate::measures::{
    compute_ideology, compute_misinfo_exposure, compute_partisanship, domain_count,
    read_ideology_scores, read_valences,
};
pub use crate::network::{
    clustering_coefficients, load_friends, reciprocal_graph, save_friends, FriendGraph,
};
pub use crate::anonymize::{anonymize_friends, anonymize_shares, IdMapping};
pub use crate::stats::{cohens_d, mean, min_max_scale, zscore};

// Batch plumbing: shard discovery and bounded fan-out with per-file error capture.
pub use crate::concurrency::{run_jobs_limited, BatchReport};
pub use crate::paths::{discover_shards, plan_outputs, FileJob};

// Reduce-by-key over TSV files (fixed strategy set, no dynamic dispatch).
pub use crate::reduce::{ReduceFn, ReduceJob, SortOrder};

// Tabular + JSONL I/O helpers for application code.
pub use crate::jsonl::for_each_line;
pub use crate::tsv::{measure_json_to_tsv, read_column, read_measure_table, read_rows, write_tsv};

// Expose progress helpers so binaries can share one MultiProgress.
pub use crate::progress::{make_count_progress, make_progress_bar_labeled, set_global_multiprogress};

pub use crate::util::init_tracing_once;

use std::path::{Path, PathBuf};

/// Which kinds of shares survive dataset filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareKinds {
    pub standalone: bool,
    pub retweets: bool,
    pub quotes: bool,
}

impl ShareKinds {
    pub fn all() -> Self {
        Self { standalone: true, retweets: true, quotes: true }
    }
    pub fn without_retweets() -> Self {
        Self { standalone: true, retweets: false, quotes: true }
    }
    /// Suffix used in derived-output filenames (`tfidf-with-retweets.json` etc.).
    pub fn file_suffix(&self) -> &'static str {
        if self.retweets { "with-retweets" } else { "without-retweets" }
    }
}

impl Default for ShareKinds {
    fn default() -> Self {
        Self::all()
    }
}

/// User-facing options with sensible defaults and builder chaining.
/// Replaces the ad-hoc data-root environment variable of earlier tooling:
/// every batch operation resolves paths against `data_root` explicitly.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub data_root: PathBuf,
    pub parallelism: Option<usize>,    // Some(N) to set rayon threads, None to use default
    pub file_concurrency: usize,       // limit number of shard files processed concurrently
    pub progress: bool,                // show progress bar
    pub progress_label: Option<String>,

    pub share_kinds: ShareKinds,       // which share kinds feed derived measures
    pub min_share_count: u64,          // minimum shares for a user to enter a measure
    pub bot_score_threshold: f64,      // users at/above this bot score are dropped

    // IO tuning
    pub read_buffer_bytes: usize,      // BufReader capacity
    pub write_buffer_bytes: usize,     // BufWriter capacity
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./data"),
            parallelism: None,
            file_concurrency: 1, // safe default for wide .zst shards
            progress: true,
            progress_label: None,

            share_kinds: ShareKinds::all(),
            min_share_count: 10,
            bot_score_threshold: 0.8,

            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl PipelineOptions {
    pub fn with_data_root(mut self, root: impl AsRef<Path>) -> Self {
        self.data_root = root.as_ref().to_path_buf();
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_share_kinds(mut self, kinds: ShareKinds) -> Self {
        self.share_kinds = kinds;
        self
    }
    pub fn with_min_share_count(mut self, n: u64) -> Self {
        self.min_share_count = n;
        self
    }
    pub fn with_bot_score_threshold(mut self, t: f64) -> Self {
        self.bot_score_threshold = t;
        self
    }
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }
}

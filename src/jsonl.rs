//! Line streaming over raw post files, plain or zstd-compressed.
//!
//! Malformed JSON lines are the caller's concern; this layer only delivers
//! raw lines. A zstd decode error mid-file is logged and the rest of the
//! file is skipped; open failures and errors returned by the callback
//! propagate to the caller.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use zstd::stream::read::Decoder;

fn warn_decode_skip(path: &Path, e: &std::io::Error) {
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    tracing::warn!(path = %abs.display(), error = %e, "skipping rest of file after decode error");
}

/// Stream a JSONL file line-by-line, calling `on_line` with each raw line
/// (trailing `\r?\n` stripped, empty lines skipped). Files ending in `.zst`
/// are decoded on the fly. An error from `on_line` aborts the stream.
pub fn for_each_line(
    path: &Path,
    read_buf_bytes: usize,
    mut on_line: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().map(|e| e == "zst").unwrap_or(false) {
        let mut decoder = match Decoder::new(file) {
            Ok(d) => d,
            Err(e) => {
                warn_decode_skip(path, &e);
                return Ok(());
            }
        };
        decoder.window_log_max(31)?;
        Box::new(decoder)
    } else {
        Box::new(file)
    };
    let mut reader = BufReader::with_capacity(read_buf_bytes.max(8 * 1024), reader);

    let mut buf = String::with_capacity(16 * 1024);
    loop {
        buf.clear();
        let n = match reader.read_line(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn_decode_skip(path, &e);
                return Ok(());
            }
        };
        if n == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        on_line(line)?;
    }
    Ok(())
}

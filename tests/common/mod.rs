#![allow(dead_code)]

use serde_json::json;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a plain JSONL file from the provided lines.
pub fn write_jsonl(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Write a zstd-compressed JSONL file, mirroring compressed corpus shards.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

pub fn write_text(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// A raw standalone post by `uid` sharing the given URLs.
pub fn post(uid: u64, urls: &[&str]) -> String {
    json!({
        "user": {"id": uid},
        "entities": {"urls": urls.iter().map(|u| json!({"expanded_url": u})).collect::<Vec<_>>()},
        "text": "…",
    })
    .to_string()
}

/// A retweet: `uid` reposts `ruid`'s post; each side carries its own URLs.
pub fn retweet(uid: u64, urls: &[&str], ruid: u64, rurls: &[&str]) -> String {
    let mut v: serde_json::Value = serde_json::from_str(&post(uid, urls)).unwrap();
    v["retweeted_status"] = serde_json::from_str(&post(ruid, rurls)).unwrap();
    v.to_string()
}

/// A quote: `uid` quotes `quid`'s post.
pub fn quote(uid: u64, urls: &[&str], quid: u64, qurls: &[&str]) -> String {
    let mut v: serde_json::Value = serde_json::from_str(&post(uid, urls)).unwrap();
    v["quoted_status"] = serde_json::from_str(&post(quid, qurls)).unwrap();
    v.to_string()
}

/// Build a tiny raw corpus under `<base>/raw-posts` with two shards:
/// - `101.json`: users 1101 and 2101 (standalone + retweet + quote posts)
/// - `102.json.zst`: user 1102, compressed, including one malformed line
pub fn make_corpus_basic() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.keep();

    let shard_101 = vec![
        post(1101, &["http://www.nytimes.com/a", "https://snopes.com/x?y=1"]),
        post(1101, &["http://nytimes.com:80/b"]),
        retweet(2101, &["http://foxnews.com/c"], 9009, &["http://breitbart.com/d"]),
        quote(2101, &["http://www.snopes.com/e"], 9009, &["http://www.snopes.com/e"]),
    ];
    write_jsonl(&base.join("raw-posts").join("101.json"), &shard_101);

    let shard_102 = vec![
        post(1102, &["https://bbc.co.uk/news"]),
        "{not json at all".to_string(),
        post(1102, &["https://nytimes.com/f", "https://nytimes.com/g"]),
    ];
    write_zst_lines(&base.join("raw-posts").join("102.json.zst"), &shard_102);

    base
}

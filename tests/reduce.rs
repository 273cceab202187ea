#[path = "common/mod.rs"]
mod common;

use common::write_text;
use sharelens::{read_rows, ReduceFn, ReduceJob, SortOrder};
use std::path::PathBuf;

fn sources(base: &std::path::Path) -> Vec<PathBuf> {
    let a = base.join("a.tab");
    let b = base.join("b.tab");
    write_text(&a, "id\tcount\n1\t2\n2\t5\n3\t1\n");
    write_text(&b, "id\tcount\n1\t3\n3\t4\n");
    vec![a, b]
}

#[test]
fn sum_reduces_across_files() {
    let base = tempfile::tempdir().unwrap();
    let dest = base.path().join("out.tab");
    ReduceJob::new(sources(base.path()), ReduceFn::Sum)
        .skip_rows(1)
        .headers(["id", "total"])
        .run(&dest)
        .unwrap();

    let rows = read_rows(&dest, 1).unwrap();
    assert_eq!(rows, vec![
        vec!["1".to_string(), "5".to_string()],
        vec!["2".to_string(), "5".to_string()],
        vec!["3".to_string(), "5".to_string()],
    ]);
}

#[test]
fn max_min_and_sorting() {
    let base = tempfile::tempdir().unwrap();
    let dest = base.path().join("max.tab");
    ReduceJob::new(sources(base.path()), ReduceFn::Max)
        .skip_rows(1)
        .sort(SortOrder::Descending)
        .run(&dest)
        .unwrap();
    let rows = read_rows(&dest, 0).unwrap();
    // Descending by reduced value: 2 -> 5, 3 -> 4, 1 -> 3.
    assert_eq!(rows[0], vec!["2", "5"]);
    assert_eq!(rows[1], vec!["3", "4"]);
    assert_eq!(rows[2], vec!["1", "3"]);

    let dest = base.path().join("min.tab");
    ReduceJob::new(sources(base.path()), ReduceFn::Min)
        .skip_rows(1)
        .sort(SortOrder::Ascending)
        .run(&dest)
        .unwrap();
    let rows = read_rows(&dest, 0).unwrap();
    assert_eq!(rows[0], vec!["3", "1"]);
    assert_eq!(rows[2], vec!["2", "5"]);
}

#[test]
fn concat_joins_values() {
    let base = tempfile::tempdir().unwrap();
    let src = base.path().join("tags.tab");
    write_text(&src, "1\tnews\n2\tsports\n1\tpolitics\n");
    let dest = base.path().join("out.tab");
    ReduceJob::new(vec![src], ReduceFn::Concat).run(&dest).unwrap();

    let rows = read_rows(&dest, 0).unwrap();
    assert_eq!(rows[0], vec!["1", "news,politics"]);
    assert_eq!(rows[1], vec!["2", "sports"]);
}

#[test]
fn directory_sources_expand_and_missing_sources_fail() {
    let base = tempfile::tempdir().unwrap();
    let dir = base.path().join("parts");
    write_text(&dir.join("p1.tab"), "1\t1\n");
    write_text(&dir.join("p2.tab"), "1\t2\n");

    let dest = base.path().join("out.tab");
    ReduceJob::new(vec![dir.clone()], ReduceFn::Sum).run(&dest).unwrap();
    assert_eq!(read_rows(&dest, 0).unwrap(), vec![vec!["1", "3"]]);

    let missing = base.path().join("nope.tab");
    assert!(ReduceJob::new(vec![missing], ReduceFn::Sum).run(&dest).is_err());
}

#[test]
fn non_numeric_values_fail_numeric_strategies() {
    let base = tempfile::tempdir().unwrap();
    let src = base.path().join("bad.tab");
    write_text(&src, "1\tnot-a-number\n");
    let dest = base.path().join("out.tab");
    assert!(ReduceJob::new(vec![src], ReduceFn::Sum).run(&dest).is_err());
}

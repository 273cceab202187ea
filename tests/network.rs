#[path = "common/mod.rs"]
mod common;

use common::write_text;
use sharelens::{
    clustering_coefficients, load_friends, reciprocal_graph, FriendGraph, SharePipeline,
};
use ahash::AHashSet;

fn graph(edges: &[(u64, &[u64])]) -> FriendGraph {
    edges
        .iter()
        .map(|(u, fs)| (*u, fs.iter().copied().collect::<AHashSet<u64>>()))
        .collect()
}

#[test]
fn reciprocal_keeps_only_mutual_edges() {
    let g = graph(&[
        (1, &[2, 3]),
        (2, &[1]),
        (3, &[4]), // 3 -> 1 missing, 3 -> 4 unreciprocated
        (4, &[]),
    ]);
    let r = reciprocal_graph(&g);

    assert_eq!(r.len(), 2);
    assert!(r[&1].contains(&2));
    assert!(r[&2].contains(&1));
    assert!(!r.contains_key(&3));
    assert!(!r.contains_key(&4));
}

#[test]
fn clustering_counts_closed_triangles() {
    // Triangle 1-2-3 plus a pendant 4 attached to 1.
    let g = graph(&[
        (1, &[2, 3, 4]),
        (2, &[1, 3]),
        (3, &[1, 2]),
        (4, &[1]),
    ]);
    let cc = clustering_coefficients(&g);

    // Node 1 has neighbors {2,3,4}; only the 2-3 pair is linked: 1/3.
    assert!((cc[&1] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(cc[&2], 1.0);
    assert_eq!(cc[&3], 1.0);
    // Degree-1 node.
    assert_eq!(cc[&4], 0.0);
}

#[test]
fn clustering_treats_directed_edges_as_undirected() {
    // Directed cycle 1 -> 2 -> 3 -> 1 closes one undirected triangle.
    let g = graph(&[(1, &[2]), (2, &[3]), (3, &[1])]);
    let cc = clustering_coefficients(&g);
    for uid in [1, 2, 3] {
        assert_eq!(cc[&uid], 1.0, "node {uid}");
    }
}

#[test]
fn pipeline_writes_reciprocal_and_clustering_files() {
    let base = tempfile::tempdir().unwrap().keep();
    write_text(
        &base.join("friends.json"),
        r#"{"1": [2, 3], "2": [1], "3": [1]}"#,
    );

    let p = SharePipeline::new().data_root(&base).progress(false);
    p.reciprocal_network("friends.json", "friends-reciprocal.json").unwrap();
    p.clustering("friends-reciprocal.json", "clustering.json").unwrap();

    let r = load_friends(&base.join("friends-reciprocal.json")).unwrap();
    assert_eq!(r.len(), 3);
    assert_eq!(r[&1], [2, 3].into_iter().collect::<AHashSet<u64>>());

    let cc: ahash::AHashMap<u64, f64> = serde_json::from_reader(std::io::BufReader::new(
        std::fs::File::open(base.join("clustering.json")).unwrap(),
    ))
    .unwrap();
    // 2 and 3 are not linked to each other: no triangles anywhere.
    assert_eq!(cc[&1], 0.0);
    assert_eq!(cc[&2], 0.0);
}

//! Follower-graph measures: reciprocal (mutual-edge) reduction and local
//! clustering coefficients over the undirected view.

use crate::records::UserId;
use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Directed adjacency: `u -> set of users u follows`.
pub type FriendGraph = AHashMap<UserId, AHashSet<UserId>>;

pub fn load_friends(path: &Path) -> Result<FriendGraph> {
    let f = File::open(path).with_context(|| format!("open friends {}", path.display()))?;
    let raw: AHashMap<UserId, Vec<UserId>> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse friends {}", path.display()))?;
    Ok(raw.into_iter().map(|(uid, fs)| (uid, fs.into_iter().collect())).collect())
}

pub fn save_friends(path: &Path, graph: &FriendGraph) -> Result<()> {
    let mut lists: AHashMap<UserId, Vec<UserId>> = AHashMap::default();
    for (&uid, friends) in graph {
        let mut fs: Vec<UserId> = friends.iter().copied().collect();
        fs.sort_unstable();
        lists.insert(uid, fs);
    }
    let f = File::create(path).with_context(|| format!("create friends {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, &lists)?;
    w.flush()?;
    Ok(())
}

/// Keep only mutual follow edges; the result is symmetric by construction.
/// Users with no reciprocal edge are absent from the result.
pub fn reciprocal_graph(friends: &FriendGraph) -> FriendGraph {
    let mut reciprocal = FriendGraph::default();
    for (&uid, friend_ids) in friends {
        for &fuid in friend_ids {
            let mutual = friends.get(&fuid).map(|fs| fs.contains(&uid)).unwrap_or(false);
            if mutual {
                reciprocal.entry(uid).or_default().insert(fuid);
                reciprocal.entry(fuid).or_default().insert(uid);
            }
        }
    }
    reciprocal
}

/// Undirected view of a graph: every edge present in both directions.
fn undirected(graph: &FriendGraph) -> FriendGraph {
    let mut und = FriendGraph::default();
    for (&uid, friends) in graph {
        und.entry(uid).or_default();
        for &fuid in friends {
            und.entry(uid).or_default().insert(fuid);
            und.entry(fuid).or_default().insert(uid);
        }
    }
    und
}

/// Local clustering coefficient of every node over the undirected view:
/// closed neighbor pairs / possible neighbor pairs. 0.0 for degree < 2.
/// Self-loops are ignored.
pub fn clustering_coefficients(graph: &FriendGraph) -> AHashMap<UserId, f64> {
    let und = undirected(graph);
    let mut coeffs = AHashMap::default();

    for (&uid, neighbors) in &und {
        let nbrs: Vec<UserId> = neighbors.iter().copied().filter(|&n| n != uid).collect();
        let k = nbrs.len();
        if k < 2 {
            coeffs.insert(uid, 0.0);
            continue;
        }
        let mut links: u64 = 0;
        for (i, &a) in nbrs.iter().enumerate() {
            for &b in &nbrs[i + 1..] {
                if und.get(&a).map(|s| s.contains(&b)).unwrap_or(false) {
                    links += 1;
                }
            }
        }
        coeffs.insert(uid, 2.0 * links as f64 / (k as f64 * (k as f64 - 1.0)));
    }
    coeffs
}

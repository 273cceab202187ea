//! TF-IDF weighting of per-user shared-domain vectors and pairwise user
//! similarity over those vectors.
//!
//! The similarity normalization divides by the product of the two vector
//! cardinalities rather than their norms. That matches the measure this
//! pipeline has always produced; it is not true cosine similarity.

use crate::records::{Share, ShareDataset, UserId};
use ahash::{AHashMap, AHashSet};

/// Posting lists: domain -> users who shared it at least once.
pub type InvertedTerms = AHashMap<String, AHashSet<UserId>>;

/// Per-user tf-idf weights: user -> domain -> weight.
pub type Tfidf = AHashMap<UserId, AHashMap<String, f64>>;

/// Pairwise similarities, symmetric: `sims[u1][u2] == sims[u2][u1]`.
pub type Similarities = AHashMap<UserId, AHashMap<UserId, f64>>;

/// Build the posting list for every domain across the whole dataset.
pub fn inverted_terms(shares: &ShareDataset) -> InvertedTerms {
    let mut terms = InvertedTerms::default();
    for (&uid, user_shares) in shares {
        for share in user_shares {
            for d in &share.domains {
                terms.entry(d.clone()).or_default().insert(uid);
            }
        }
    }
    terms
}

/// Raw term frequency of each domain across one user's shares.
pub fn term_freqs(user_shares: &[Share]) -> AHashMap<String, u64> {
    let mut freqs = AHashMap::default();
    for share in user_shares {
        for d in &share.domains {
            *freqs.entry(d.clone()).or_insert(0) += 1;
        }
    }
    freqs
}

/// Weight every user's domain vector:
/// `(0.5 + 0.5 * freq / max_freq) * log10(N / posting_len)`.
///
/// Users with no domains at all are excluded from the result. `N` is the
/// total user count of `shares`; a domain present in `freqs` is present in
/// at least one posting list, so the idf denominator is never zero.
pub fn compute_tfidf(shares: &ShareDataset, terms: &InvertedTerms) -> Tfidf {
    let n = shares.len() as f64;
    let mut tfidf = Tfidf::default();

    for (&uid, user_shares) in shares {
        let freqs = term_freqs(user_shares);
        if freqs.is_empty() {
            continue;
        }
        let max_freq = freqs.values().copied().max().unwrap_or(1) as f64;

        let weights = tfidf.entry(uid).or_default();
        for (d, dfreq) in freqs {
            let posting_len = terms.get(&d).map(|u| u.len()).unwrap_or(1) as f64;
            let tf = 0.5 + 0.5 * (dfreq as f64 / max_freq);
            let idf = (n / posting_len).log10();
            weights.insert(d, tf * idf);
        }
    }
    tfidf
}

/// Similarity of two weighted vectors: dot product over their common domains
/// divided by the product of the vector cardinalities. Both users must be
/// present in `tfidf`.
pub fn compute_sim(u1: UserId, u2: UserId, tfidf: &Tfidf) -> f64 {
    let (Some(v1), Some(v2)) = (tfidf.get(&u1), tfidf.get(&u2)) else {
        return 0.0;
    };
    let (small, large) = if v1.len() <= v2.len() { (v1, v2) } else { (v2, v1) };
    let dot: f64 = small
        .iter()
        .filter_map(|(d, w)| large.get(d).map(|w2| w * w2))
        .sum();
    dot / (v1.len() as f64 * v2.len() as f64)
}

/// Whether two users share at least one weighted domain.
fn has_overlap(v1: &AHashMap<String, f64>, v2: &AHashMap<String, f64>) -> bool {
    let (small, large) = if v1.len() <= v2.len() { (v1, v2) } else { (v2, v1) };
    small.keys().any(|d| large.contains_key(d))
}

/// Similarity of every unordered user pair with a nonzero domain overlap,
/// computed once per pair and mirrored into both directions. A user is never
/// paired with itself.
pub fn pairwise_similarities(tfidf: &Tfidf) -> Similarities {
    let mut uids: Vec<UserId> = tfidf.keys().copied().collect();
    uids.sort_unstable();

    let mut sims = Similarities::default();
    for (i, &u1) in uids.iter().enumerate() {
        sims.entry(u1).or_default();
        for &u2 in &uids[i + 1..] {
            sims.entry(u2).or_default();
            // Overlap check is cheap relative to the weighted dot product and
            // keeps zero rows out of the averages.
            let (v1, v2) = (&tfidf[&u1], &tfidf[&u2]);
            if !has_overlap(v1, v2) {
                continue;
            }
            let s = compute_sim(u1, u2, tfidf);
            if let Some(m) = sims.get_mut(&u1) {
                m.insert(u2, s);
            }
            if let Some(m) = sims.get_mut(&u2) {
                m.insert(u1, s);
            }
        }
    }
    sims
}

/// Per-user mean similarity over all stored counterparts. Users with no
/// overlapping counterpart are excluded.
pub fn average_similarities(sims: &Similarities) -> AHashMap<UserId, f64> {
    let mut avgs = AHashMap::default();
    for (&uid, counterparts) in sims {
        if counterparts.is_empty() {
            continue;
        }
        let sum: f64 = counterparts.values().sum();
        avgs.insert(uid, sum / counterparts.len() as f64);
    }
    avgs
}

use sharelens::{
    average_similarities, compute_sim, compute_tfidf, inverted_terms, pairwise_similarities,
    Share, ShareDataset,
};

fn share(domains: &[&str]) -> Share {
    Share { domains: domains.iter().map(|d| d.to_string()).collect(), ..Default::default() }
}

fn dataset(users: &[(u64, Vec<Share>)]) -> ShareDataset {
    users.iter().cloned().collect()
}

#[test]
fn inverted_terms_builds_posting_lists() {
    let data = dataset(&[
        (1, vec![share(&["a.com", "b.com"]), share(&["a.com"])]),
        (2, vec![share(&["b.com"])]),
        (3, vec![]),
    ]);
    let terms = inverted_terms(&data);
    assert_eq!(terms.len(), 2);
    assert_eq!(terms["a.com"].len(), 1);
    assert!(terms["a.com"].contains(&1));
    assert_eq!(terms["b.com"].len(), 2);
}

#[test]
fn tfidf_excludes_users_with_no_domains() {
    let data = dataset(&[
        (1, vec![share(&["a.com"])]),
        (2, vec![]),
        (3, vec![share(&[])]),
    ]);
    let terms = inverted_terms(&data);
    let tfidf = compute_tfidf(&data, &terms);
    assert!(tfidf.contains_key(&1));
    assert!(!tfidf.contains_key(&2));
    assert!(!tfidf.contains_key(&3));
}

#[test]
fn tfidf_weight_formula() {
    // User 1 shares a.com twice and b.com once; user 2 shares b.com once.
    let data = dataset(&[
        (1, vec![share(&["a.com", "b.com"]), share(&["a.com"])]),
        (2, vec![share(&["b.com"])]),
    ]);
    let terms = inverted_terms(&data);
    let tfidf = compute_tfidf(&data, &terms);

    let n = 2.0f64;
    // a.com: tf = 0.5 + 0.5 * 2/2 = 1.0, idf = log10(2/1)
    let expected_a = 1.0 * (n / 1.0).log10();
    assert!((tfidf[&1]["a.com"] - expected_a).abs() < 1e-12);
    // b.com for user 1: tf = 0.5 + 0.5 * 1/2 = 0.75, idf = log10(2/2) = 0
    assert!((tfidf[&1]["b.com"] - 0.0).abs() < 1e-12);
}

#[test]
fn two_user_similarity_is_finite_symmetric_nonnegative() {
    let data = dataset(&[
        (1, vec![share(&["a.com"])]),
        (2, vec![share(&["a.com"])]),
    ]);
    let terms = inverted_terms(&data);
    let tfidf = compute_tfidf(&data, &terms);

    let s12 = compute_sim(1, 2, &tfidf);
    let s21 = compute_sim(2, 1, &tfidf);
    assert!(s12.is_finite());
    assert!(s12 >= 0.0);
    assert_eq!(s12, s21);
}

#[test]
fn pairwise_is_memoized_symmetric_and_skips_self() {
    let data = dataset(&[
        (1, vec![share(&["a.com", "b.com"])]),
        (2, vec![share(&["a.com"])]),
        (3, vec![share(&["c.com"])]),
    ]);
    let terms = inverted_terms(&data);
    let tfidf = compute_tfidf(&data, &terms);
    let sims = pairwise_similarities(&tfidf);

    // Self-similarity is never computed.
    for (uid, counterparts) in &sims {
        assert!(!counterparts.contains_key(uid));
    }
    // Mirrored values.
    assert_eq!(sims[&1][&2], sims[&2][&1]);
    // User 3 overlaps nobody: present with an empty row.
    assert!(sims[&3].is_empty());
}

#[test]
fn averages_cover_only_overlapping_users() {
    let data = dataset(&[
        (1, vec![share(&["a.com"])]),
        (2, vec![share(&["a.com"])]),
        (3, vec![share(&["z.com"])]),
    ]);
    let terms = inverted_terms(&data);
    let tfidf = compute_tfidf(&data, &terms);
    let sims = pairwise_similarities(&tfidf);
    let avgs = average_similarities(&sims);

    assert!(avgs.contains_key(&1));
    assert!(avgs.contains_key(&2));
    assert!(!avgs.contains_key(&3));
    assert_eq!(avgs[&1], sims[&1][&2]);
}

#[test]
fn sim_normalizes_by_vector_cardinality_product() {
    // u1 has 2 weighted domains, u2 has 1; only a.com is common.
    let data = dataset(&[
        (1, vec![share(&["a.com", "b.com"])]),
        (2, vec![share(&["a.com"])]),
        (3, vec![share(&["b.com"])]),
    ]);
    let terms = inverted_terms(&data);
    let tfidf = compute_tfidf(&data, &terms);

    let expected = tfidf[&1]["a.com"] * tfidf[&2]["a.com"]
        / (tfidf[&1].len() as f64 * tfidf[&2].len() as f64);
    assert!((compute_sim(1, 2, &tfidf) - expected).abs() < 1e-12);
}

use sharelens::{
    anonymize_friends, anonymize_shares, FriendGraph, IdMapping, Share, ShareDataset,
};
use ahash::AHashSet;

fn fixture() -> (ShareDataset, FriendGraph) {
    let mut shares = ShareDataset::default();
    shares.insert(10, vec![
        Share { domains: vec!["a.com".into()], retweeted: Some(30), quoted: None },
        Share { domains: vec!["b.com".into()], retweeted: None, quoted: Some(40) },
    ]);
    shares.insert(20, vec![Share { domains: vec!["c.com".into()], ..Default::default() }]);

    let mut friends = FriendGraph::default();
    friends.insert(10, [20, 50].into_iter().collect());
    friends.insert(20, [10].into_iter().collect());
    (shares, friends)
}

#[test]
fn mapping_covers_every_referenced_id() {
    let (shares, friends) = fixture();
    let mut rng = rand::rng();
    let mapping = IdMapping::build(&shares, &friends, &mut rng);

    // 10, 20, 30 (retweeted), 40 (quoted), 50 (friend-only).
    assert_eq!(mapping.len(), 5);
    for uid in [10, 20, 30, 40, 50] {
        let anon = mapping.get(uid).unwrap();
        assert!((1..=5).contains(&anon));
    }
}

#[test]
fn anonymized_datasets_are_structure_preserving() {
    let (shares, friends) = fixture();
    let mut rng = rand::rng();
    let mapping = IdMapping::build(&shares, &friends, &mut rng);

    let anon_shares = anonymize_shares(&shares, &mapping).unwrap();
    assert_eq!(anon_shares.len(), 2);
    let u10 = mapping.get(10).unwrap();
    assert_eq!(anon_shares[&u10].len(), 2);
    assert_eq!(anon_shares[&u10][0].domains, vec!["a.com"]);
    assert_eq!(anon_shares[&u10][0].retweeted, Some(mapping.get(30).unwrap()));
    assert_eq!(anon_shares[&u10][1].quoted, Some(mapping.get(40).unwrap()));

    let anon_friends = anonymize_friends(&friends, &mapping).unwrap();
    let expected: AHashSet<u64> =
        [mapping.get(20).unwrap(), mapping.get(50).unwrap()].into_iter().collect();
    assert_eq!(anon_friends[&u10], expected);
}

#[test]
fn unmapped_reference_is_an_error() {
    let (shares, friends) = fixture();
    let mut rng = rand::rng();
    // Build the mapping without the friends graph: friend-only id 50 is unmapped.
    let mapping = IdMapping::build(&shares, &FriendGraph::default(), &mut rng);
    assert!(mapping.get(50).is_err());
    assert!(anonymize_friends(&friends, &mapping).is_err());
    // Shares alone still anonymize fine.
    assert!(anonymize_shares(&shares, &mapping).is_ok());
}

#[test]
fn anonymized_ids_are_dense_from_one() {
    let (shares, friends) = fixture();
    let mut rng = rand::rng();
    let mapping = IdMapping::build(&shares, &friends, &mut rng);
    let anon = anonymize_shares(&shares, &mapping).unwrap();
    for uid in anon.keys() {
        assert!((1..=5).contains(uid));
    }
}

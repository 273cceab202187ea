//! Dataset anonymization: remap every user id (authors, friends, retweet and
//! quote provenance) onto a dense shuffled id space starting at 1.

use crate::network::FriendGraph;
use crate::records::{Share, ShareDataset, UserId};
use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Original id -> anonymized id. Built over the union of every id the
/// datasets reference, so lookups during remapping never miss.
#[derive(Debug)]
pub struct IdMapping {
    map: AHashMap<UserId, UserId>,
}

impl IdMapping {
    pub fn build<R: Rng>(shares: &ShareDataset, friends: &FriendGraph, rng: &mut R) -> Self {
        let mut uids = AHashSet::<UserId>::default();
        for (&uid, friend_ids) in friends {
            uids.insert(uid);
            uids.extend(friend_ids.iter().copied());
        }
        for (&uid, user_shares) in shares {
            uids.insert(uid);
            for s in user_shares {
                if let Some(ruid) = s.retweeted {
                    uids.insert(ruid);
                }
                if let Some(quid) = s.quoted {
                    uids.insert(quid);
                }
            }
        }

        let mut uids: Vec<UserId> = uids.into_iter().collect();
        uids.sort_unstable(); // deterministic base order before the shuffle
        uids.shuffle(rng);

        let map = uids.into_iter().zip(1u64..).collect();
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, uid: UserId) -> Result<UserId> {
        self.map.get(&uid).copied().with_context(|| format!("unmapped user id {}", uid))
    }
}

/// Remap a share dataset through the mapping. Provenance ids must all be
/// mapped; a miss means the mapping was built over the wrong inputs.
pub fn anonymize_shares(shares: &ShareDataset, mapping: &IdMapping) -> Result<ShareDataset> {
    let mut anon = ShareDataset::default();
    for (&uid, user_shares) in shares {
        let new_uid = mapping.get(uid)?;
        let mut new_shares = Vec::with_capacity(user_shares.len());
        for s in user_shares {
            new_shares.push(Share {
                domains: s.domains.clone(),
                retweeted: s.retweeted.map(|r| mapping.get(r)).transpose()?,
                quoted: s.quoted.map(|q| mapping.get(q)).transpose()?,
            });
        }
        anon.insert(new_uid, new_shares);
    }
    Ok(anon)
}

pub fn anonymize_friends(friends: &FriendGraph, mapping: &IdMapping) -> Result<FriendGraph> {
    let mut anon = FriendGraph::default();
    for (&uid, friend_ids) in friends {
        let new_uid = mapping.get(uid)?;
        let mut new_friends = AHashSet::default();
        for &fuid in friend_ids {
            new_friends.insert(mapping.get(fuid)?);
        }
        anon.insert(new_uid, new_friends);
    }
    Ok(anon)
}

//! Random letter-keyed maps and the max-wins merge.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rand::Rng;

pub type LetterMap = BTreeMap<char, u32>;

pub const DICT_COUNT: RangeInclusive<usize> = 2..=10;
pub const KEYS_PER_DICT: RangeInclusive<usize> = 2..=8;
pub const VALUES: RangeInclusive<u32> = 0..=100;

const LETTERS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// One map with distinct random lowercase letter keys.
pub fn random_dict(rng: &mut (impl Rng + ?Sized)) -> LetterMap {
    let num_keys = rng.random_range(KEYS_PER_DICT);
    rand::seq::index::sample(rng, LETTERS.len(), num_keys)
        .iter()
        .map(|i| (char::from(LETTERS[i]), rng.random_range(VALUES)))
        .collect()
}

pub fn random_dicts(rng: &mut (impl Rng + ?Sized)) -> Vec<LetterMap> {
    let count = rng.random_range(DICT_COUNT);
    (0..count).map(|_| random_dict(rng)).collect()
}

/// Merge maps into one.
///
/// A key present in a single map is kept as is. A key present in several
/// becomes `<key>_<n>` holding the largest value, where `n` is the 1-based
/// position of the map it came from; on ties the earliest map wins.
pub fn merge(dicts: &[LetterMap]) -> BTreeMap<String, u32> {
    // key -> (number of maps holding it, max value, index of that map)
    let mut seen: BTreeMap<char, (usize, u32, usize)> = BTreeMap::new();
    for (idx, dict) in dicts.iter().enumerate() {
        for (&key, &value) in dict {
            seen.entry(key)
                .and_modify(|(count, max, max_idx)| {
                    *count += 1;
                    if *max < value {
                        *max = value;
                        *max_idx = idx;
                    }
                })
                .or_insert((1, value, idx));
        }
    }

    seen.into_iter()
        .map(|(key, (count, max, max_idx))| {
            if count == 1 {
                (key.to_string(), max)
            } else {
                (format!("{key}_{}", max_idx + 1), max)
            }
        })
        .collect()
}

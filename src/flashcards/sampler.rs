//! Mixed-subject sampling
//!
//! Picks a bounded practice set from a student's cards in two passes:
//!
//! 1. Diversify: visit subjects in random order and take one random card
//!    from each until the limit is reached.
//! 2. Fill: if slots remain, take random cards from everything not yet
//!    picked.
//!
//! A subject that dominates the pool therefore cannot crowd out the others.
//! The random source is supplied by the caller so a seeded RNG gives a
//! reproducible sample.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use super::models::FlashcardRecord;

/// Select up to `limit` cards from `records`, one per subject first.
///
/// The result holds `min(max(limit, 0), distinct records)` cards, never the
/// same card twice, and covers `min(limit, distinct subjects)` subjects.
/// Records sharing an id count once. Order is random.
pub fn sample<'a, R>(records: &'a [FlashcardRecord], limit: i64, rng: &mut R) -> Vec<&'a FlashcardRecord>
where
    R: Rng + ?Sized,
{
    if limit <= 0 || records.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let distinct: Vec<&FlashcardRecord> = records.iter().filter(|r| seen.insert(r.id)).collect();
    let limit = usize::try_from(limit)
        .unwrap_or(usize::MAX)
        .min(distinct.len());

    // Buckets of indices into `distinct`, subjects in first-seen order
    let mut subjects: Vec<&str> = Vec::new();
    let mut buckets: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, record) in distinct.iter().enumerate() {
        buckets
            .entry(record.subject.as_str())
            .or_insert_with(|| {
                subjects.push(record.subject.as_str());
                Vec::new()
            })
            .push(idx);
    }

    subjects.shuffle(rng);

    let mut picked = vec![false; distinct.len()];
    let mut result = Vec::with_capacity(limit);

    for subject in &subjects {
        if result.len() >= limit {
            break;
        }
        let Some(bucket) = buckets.get_mut(subject) else {
            continue;
        };
        if bucket.is_empty() {
            continue;
        }
        let idx = bucket.swap_remove(rng.gen_range(0..bucket.len()));
        picked[idx] = true;
        result.push(distinct[idx]);
    }

    if result.len() < limit {
        let mut pool: Vec<usize> = (0..distinct.len()).filter(|&i| !picked[i]).collect();
        pool.shuffle(rng);
        let missing = limit - result.len();
        result.extend(pool.into_iter().take(missing).map(|i| distinct[i]));
    }

    result
}

/// Distinct subjects present in `records`, in first-seen order
pub fn subjects_of<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a FlashcardRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.subject.as_str()))
        .map(|r| r.subject.clone())
        .collect()
}

// src/engine/draw.rs

use rand::Rng;
use thiserror::Error;

use crate::models::question::{Difficulty, QuestionRecord};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("question pool exhausted")]
pub struct ExhaustionError;

/// Remaining, not-yet-drawn questions of a session, bucketed by difficulty.
///
/// Every record lives in exactly one bucket. Drawing removes it.
#[derive(Debug, Clone, Default)]
pub struct QuestionPool {
    buckets: [Vec<QuestionRecord>; 3],
}

fn slot(tier: Difficulty) -> usize {
    match tier {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

impl QuestionPool {
    pub fn partition(records: impl IntoIterator<Item = QuestionRecord>) -> Self {
        let mut pool = Self::default();
        for record in records {
            pool.buckets[slot(record.difficulty)].push(record);
        }
        pool
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len_of(&self, tier: Difficulty) -> usize {
        self.buckets[slot(tier)].len()
    }

    fn take_from<R: Rng>(
        &mut self,
        tier: Difficulty,
        rng: &mut R,
    ) -> Option<QuestionRecord> {
        let bucket = &mut self.buckets[slot(tier)];
        if bucket.is_empty() {
            return None;
        }
        let i = rng.random_range(0..bucket.len());
        Some(bucket.swap_remove(i))
    }

    /// Takes one record, searching tiers in `order` and then any tier at all.
    fn take_one<R: Rng>(
        &mut self,
        order: &[Difficulty],
        rng: &mut R,
    ) -> Option<QuestionRecord> {
        order
            .iter()
            .chain(Difficulty::ALL.iter())
            .find_map(|tier| self.take_from(*tier, rng))
    }
}

/// Draws up to `count` records from `pool`, preferring tiers in `order`.
///
/// Returns fewer than `count` records when the pool runs dry part-way.
/// Fails only when nothing at all could be drawn.
pub fn draw<R: Rng>(
    pool: &mut QuestionPool,
    order: &[Difficulty],
    count: usize,
    rng: &mut R,
) -> Result<Vec<QuestionRecord>, ExhaustionError> {
    let mut drawn = Vec::with_capacity(count);
    while drawn.len() < count {
        match pool.take_one(order, rng) {
            Some(record) => drawn.push(record),
            None => break,
        }
    }

    if drawn.is_empty() && count > 0 {
        return Err(ExhaustionError);
    }
    Ok(drawn)
}

/// Draws exactly one record rooted at `order`.
pub fn draw_one<R: Rng>(
    pool: &mut QuestionPool,
    order: &[Difficulty],
    rng: &mut R,
) -> Result<QuestionRecord, ExhaustionError> {
    pool.take_one(order, rng).ok_or(ExhaustionError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    use Difficulty::*;

    fn record(text: &str, difficulty: Difficulty) -> QuestionRecord {
        QuestionRecord {
            text: text.to_string(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 0,
            difficulty,
            hint: None,
            explanation: None,
            tags: vec![],
        }
    }

    fn pool(easy: usize, medium: usize, hard: usize) -> QuestionPool {
        let mut records = Vec::new();
        for i in 0..easy {
            records.push(record(&format!("e{}", i), Easy));
        }
        for i in 0..medium {
            records.push(record(&format!("m{}", i), Medium));
        }
        for i in 0..hard {
            records.push(record(&format!("h{}", i), Hard));
        }
        QuestionPool::partition(records)
    }

    #[test]
    fn test_partition_buckets() {
        let p = pool(2, 3, 4);
        assert_eq!(p.len_of(Easy), 2);
        assert_eq!(p.len_of(Medium), 3);
        assert_eq!(p.len_of(Hard), 4);
        assert_eq!(p.len(), 9);
    }

    #[test]
    fn test_draw_prefers_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = pool(3, 5, 5);

        let drawn = draw(&mut p, &[Easy, Medium], 5, &mut rng).unwrap();

        assert_eq!(drawn.iter().filter(|r| r.difficulty == Easy).count(), 3);
        assert_eq!(drawn.iter().filter(|r| r.difficulty == Medium).count(), 2);
        assert_eq!(p.len_of(Easy), 0);
        assert_eq!(p.len_of(Medium), 3);
        assert_eq!(p.len_of(Hard), 5);
    }

    #[test]
    fn test_draw_falls_back_outside_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = pool(1, 1, 5);

        let drawn = draw(&mut p, &[Easy, Medium], 5, &mut rng).unwrap();

        assert_eq!(drawn.len(), 5);
        assert_eq!(drawn.iter().filter(|r| r.difficulty == Hard).count(), 3);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_draw_partial_and_exhausted() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = pool(0, 2, 0);

        let drawn = draw(&mut p, &[Easy, Medium], 5, &mut rng).unwrap();
        assert_eq!(drawn.len(), 2);
        assert!(p.is_empty());

        assert_eq!(draw(&mut p, &[Hard], 1, &mut rng), Err(ExhaustionError));
        assert_eq!(draw_one(&mut p, &[Hard], &mut rng), Err(ExhaustionError));
    }

    #[test]
    fn test_draw_one_fallback_chain() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut p = pool(1, 1, 0);

        let first = draw_one(&mut p, &[Hard, Medium, Easy], &mut rng).unwrap();
        assert_eq!(first.difficulty, Medium);
        let second = draw_one(&mut p, &[Hard, Medium, Easy], &mut rng).unwrap();
        assert_eq!(second.difficulty, Easy);
    }

    #[test]
    fn test_draw_never_repeats() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut p = pool(4, 4, 4);
        let mut seen = HashSet::new();

        while let Ok(r) = draw_one(&mut p, &[Medium, Easy, Hard], &mut rng) {
            assert!(seen.insert(r.text.clone()), "{} drawn twice", r.text);
        }
        assert_eq!(seen.len(), 12);
    }
}

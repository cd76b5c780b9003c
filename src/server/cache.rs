//! In-memory cache of mixed-subject responses using moka.
//!
//! Entries are keyed by student, effective limit and the student's cache
//! generation, and live for a fixed TTL. Creating a card bumps the
//! student's generation, so responses computed before the create are never
//! served again, even when they are stored after it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::sync::Cache;

use crate::flashcards::FlashcardView;

#[derive(Clone)]
struct CachedCards {
    stored_at: Instant,
    cards: Vec<FlashcardView>,
}

type CacheKey = (String, i64, u64);

pub struct ResponseCache {
    ttl: Duration,
    entries: Cache<CacheKey, CachedCards>,
    /// Current generation per student; absent means 0
    generations: Cache<String, u64>,
    next_generation: AtomicU64,
}

impl ResponseCache {
    /// A zero TTL disables caching
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .time_to_live(ttl.max(Duration::from_millis(1)))
            .support_invalidation_closures()
            .build();
        // Outlives any entry stored under an older generation
        let generations = Cache::builder()
            .time_to_live(ttl.max(Duration::from_millis(1)).saturating_mul(2))
            .build();

        Self {
            ttl,
            entries,
            generations,
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generation to pass to [`insert`](Self::insert) for a response computed from now on
    pub fn generation(&self, student_id: &str) -> u64 {
        self.generations.get(student_id).unwrap_or(0)
    }

    /// Cached cards and how long they stay valid
    pub fn get(&self, student_id: &str, limit: i64) -> Option<(Vec<FlashcardView>, Duration)> {
        if self.ttl.is_zero() {
            return None;
        }
        let key = (student_id.to_string(), limit, self.generation(student_id));
        let entry = self.entries.get(&key)?;
        let remaining = self.ttl.checked_sub(entry.stored_at.elapsed())?;
        if remaining.is_zero() {
            return None;
        }
        Some((entry.cards, remaining))
    }

    /// Store a response computed while the student was at `generation`
    pub fn insert(&self, student_id: String, limit: i64, generation: u64, cards: Vec<FlashcardView>) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            (student_id, limit, generation),
            CachedCards {
                stored_at: Instant::now(),
                cards,
            },
        );
    }

    /// Forget every cached response for `student_id`
    pub fn invalidate_student(&self, student_id: &str) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.generations.insert(student_id.to_string(), generation);

        let student = student_id.to_string();
        if let Err(e) = self
            .entries
            .invalidate_entries_if(move |(id, _, _), _| *id == student)
        {
            log::warn!("Failed to drop cached responses for {}: {}", student_id, e);
        }
    }
}

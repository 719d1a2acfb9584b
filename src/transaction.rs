//! Transaction identifier sources
//!
//! Every request carries a fresh 16-bit transaction id. A response is only
//! accepted if it echoes the id of the request that is currently
//! outstanding, so stale replies from an earlier timed-out request are
//! rejected instead of being mistaken for the current answer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the transaction id for each new request
pub trait TransactionIdGenerator: Send + Sync {
    fn next_id(&mut self) -> u16;
}

/// Pseudo-random ids, seeded from the wall clock by default
#[derive(Debug, Clone)]
pub struct RandomTransactionIds {
    rng: StdRng,
}

impl RandomTransactionIds {
    /// Seed from the current time
    pub fn new() -> Self {
        let seed = chrono::Utc::now().timestamp_micros() as u64;
        Self::with_seed(seed)
    }

    /// Deterministic sequence, for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomTransactionIds {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionIdGenerator for RandomTransactionIds {
    fn next_id(&mut self) -> u16 {
        self.rng.gen::<u16>()
    }
}

/// Incrementing ids that wrap at 0xFFFF
#[derive(Debug, Clone, Default)]
pub struct SequentialTransactionIds {
    next: u16,
}

impl SequentialTransactionIds {
    pub fn starting_at(first: u16) -> Self {
        Self { next: first }
    }
}

impl TransactionIdGenerator for SequentialTransactionIds {
    fn next_id(&mut self) -> u16 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

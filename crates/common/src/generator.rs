//! Identifier generation capabilities.
//!
//! Identifier types never reach for process-global randomness themselves;
//! callers hand them an [`IdGenerator`] instead.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Produces raw identifier values.
pub trait IdGenerator: Send + Sync {
    /// Returns the next identifier value.
    fn next_id(&self) -> String;
}

/// Generates random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Generates `prefix-1`, `prefix-2`, ... in order.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator starting at `prefix-1`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, next)
    }
}

/// Adapts a plain function into an [`IdGenerator`].
pub struct FnIdGenerator<F>(pub F);

impl<F> IdGenerator for FnIdGenerator<F>
where
    F: Fn() -> String + Send + Sync,
{
    fn next_id(&self) -> String {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_generator_creates_unique_ids() {
        let generator = UuidGenerator;
        assert_ne!(generator.next_id(), generator.next_id());
    }

    #[test]
    fn sequential_generator_counts_up() {
        let generator = SequentialIdGenerator::new("player");
        assert_eq!(generator.next_id(), "player-1");
        assert_eq!(generator.next_id(), "player-2");
        assert_eq!(generator.next_id(), "player-3");
    }

    #[test]
    fn functions_are_generators() {
        let generator = FnIdGenerator(|| "fixed".to_string());
        assert_eq!(generator.next_id(), "fixed");
    }
}

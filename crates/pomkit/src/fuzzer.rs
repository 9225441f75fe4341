//! Deterministic random test data.
//!
//! Randomized fills (menu item picks, filler words) draw from a seeded
//! xorshift generator so a failing run can be replayed with the same seed.
//!
//! # Example
//!
//! ```
//! use pomkit::fuzzer::{random_words, Seed, Xorshift64};
//!
//! let mut rng = Xorshift64::new(Seed::from_u64(42));
//! let words = random_words(&mut rng, 3);
//! assert_eq!(words.split(' ').count(), 3);
//! ```

/// Filler vocabulary for [`random_words`]
pub const WORDS: [&str; 10] = [
    "apple",
    "banana",
    "cherry",
    "date",
    "elderberry",
    "fig",
    "grapefruit",
    "honeydew",
    "imbe",
    "jackfruit",
];

/// Deterministic seed for reproducible runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Seed(u64);

impl Seed {
    /// Create a seed from a u64 value
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Fresh seed from a v4 UUID
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(uuid::Uuid::new_v4().as_u128() as u64)
    }

    /// Get the raw seed value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Simple xorshift64 PRNG
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Create a generator; a zero seed is mapped to 1
    #[must_use]
    pub const fn new(seed: Seed) -> Self {
        // Ensure non-zero state
        let state = if seed.0 == 0 { 1 } else { seed.0 };
        Self { state }
    }

    /// Next raw value
    pub const fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Value in `min..max`, or `min` when the range is empty
    pub const fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        min + (self.next() % (max - min))
    }

    /// Index in `0..len`, or 0 when `len` is 0
    #[allow(clippy::cast_possible_truncation)]
    pub const fn next_index(&mut self, len: usize) -> usize {
        self.next_range(0, len as u64) as usize
    }
}

/// `count` space-separated words drawn from [`WORDS`]
pub fn random_words(rng: &mut Xorshift64, count: usize) -> String {
    (0..count)
        .map(|_| WORDS[rng.next_index(WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod seed_tests {
        use super::*;

        #[test]
        fn test_seed_from_u64() {
            assert_eq!(Seed::from_u64(12345).value(), 12345);
        }

        #[test]
        fn test_seed_default() {
            assert_eq!(Seed::default().value(), 0);
        }
    }

    mod xorshift_tests {
        use super::*;

        #[test]
        fn test_xorshift_deterministic() {
            let mut a = Xorshift64::new(Seed::from_u64(42));
            let mut b = Xorshift64::new(Seed::from_u64(42));
            for _ in 0..100 {
                assert_eq!(a.next(), b.next());
            }
        }

        #[test]
        fn test_zero_seed_is_not_stuck() {
            let mut rng = Xorshift64::new(Seed::from_u64(0));
            assert_ne!(rng.next(), 0);
        }

        #[test]
        fn test_next_index_bounds() {
            let mut rng = Xorshift64::new(Seed::from_u64(7));
            for _ in 0..1000 {
                assert!(rng.next_index(3) < 3);
            }
            assert_eq!(rng.next_index(0), 0);
        }
    }

    mod word_tests {
        use super::*;

        #[test]
        fn test_random_words_count_and_vocabulary() {
            let mut rng = Xorshift64::new(Seed::from_u64(99));
            let words = random_words(&mut rng, 5);
            let parts: Vec<&str> = words.split(' ').collect();
            assert_eq!(parts.len(), 5);
            assert!(parts.iter().all(|w| WORDS.contains(w)));
        }

        #[test]
        fn test_random_words_zero() {
            let mut rng = Xorshift64::new(Seed::from_u64(1));
            assert_eq!(random_words(&mut rng, 0), "");
        }
    }
}

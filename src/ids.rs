//! Random id generation.
//!
//! Ids are URL-safe, uniform-random strings. The distilled spec calls for a
//! "Base62-ish" alphabet; `rand`'s [`Alphanumeric`] distribution samples
//! exactly `[A-Za-z0-9]`, which is URL-safe and matches the teacher's own
//! use of `Alphanumeric` for random suffixes (`mimeparser.rs`).

use rand::distributions::{Alphanumeric, DistString};

/// Generate a fresh uniform-random id of `len` characters.
pub fn generate_id(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        let id = generate_id(16);
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ids_are_not_trivially_repeated() {
        let a = generate_id(16);
        let b = generate_id(16);
        assert_ne!(a, b);
    }
}

//! Per-visitor seeding for sticky assignment.
//!
//! Not a security boundary: the seed only spreads visitors across arms
//! reproducibly. Do not reuse it for anything secret.

use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

/// Stable 64-bit seed: the first eight bytes of SHA-256(visitor_id).
pub fn visitor_seed(visitor_id: &str) -> u64 {
    let digest = Sha256::digest(visitor_id.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// A fresh generator owned by this call, seeded from the visitor id.
pub fn visitor_rng(visitor_id: &str) -> StdRng {
    StdRng::seed_from_u64(visitor_seed(visitor_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::collections::HashSet;

    #[test]
    fn test_seed_is_stable() {
        assert_eq!(visitor_seed("visitor-123"), visitor_seed("visitor-123"));
        // SHA-256("") = e3b0c442 98fc1c14 ...
        assert_eq!(visitor_seed(""), 0xe3b0_c442_98fc_1c14);
    }

    #[test]
    fn test_seeds_spread_across_visitors() {
        let seeds: HashSet<u64> = (0..1000).map(|i| visitor_seed(&format!("visitor{i}"))).collect();
        assert_eq!(seeds.len(), 1000);
    }

    #[test]
    fn test_rng_streams_replay() {
        let a: Vec<u32> = visitor_rng("v").sample_iter(rand::distributions::Standard).take(8).collect();
        let b: Vec<u32> = visitor_rng("v").sample_iter(rand::distributions::Standard).take(8).collect();
        assert_eq!(a, b);
    }
}

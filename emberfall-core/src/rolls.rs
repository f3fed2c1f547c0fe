//! Random rolls. Every function takes the RNG as a parameter so callers
//! can pass a seeded generator and replay an exact sequence of outcomes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform integer in `min..=max`. Degenerate ranges (`min >= max`)
/// return `min`.
pub fn uniform<R: Rng>(rng: &mut R, min: u32, max: u32) -> u32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

/// Independent probability check: true with probability `chance`.
/// Values at or above 1.0 always pass, at or below 0.0 never do.
pub fn check<R: Rng>(rng: &mut R, chance: f64) -> bool {
    if chance >= 1.0 {
        return true;
    }
    if chance <= 0.0 {
        return false;
    }
    rng.gen::<f64>() < chance
}

/// A deterministic generator from a seed, for tests and replays.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A generator seeded from the OS, for live play.
pub fn from_entropy() -> StdRng {
    StdRng::from_entropy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_bounds() {
        let mut rng = seeded(7);
        for _ in 0..200 {
            let v = uniform(&mut rng, 2, 9);
            assert!((2..=9).contains(&v));
        }
    }

    #[test]
    fn test_uniform_degenerate() {
        let mut rng = seeded(7);
        assert_eq!(uniform(&mut rng, 5, 5), 5);
        assert_eq!(uniform(&mut rng, 8, 3), 8);
    }

    #[test]
    fn test_check_extremes() {
        let mut rng = seeded(7);
        for _ in 0..50 {
            assert!(check(&mut rng, 1.0));
            assert!(check(&mut rng, 1.5));
            assert!(!check(&mut rng, 0.0));
            assert!(!check(&mut rng, -0.2));
        }
    }

    #[test]
    fn test_seeded_repeatable() {
        let a: Vec<u32> = {
            let mut rng = seeded(42);
            (0..20).map(|_| uniform(&mut rng, 0, 100)).collect()
        };
        let b: Vec<u32> = {
            let mut rng = seeded(42);
            (0..20).map(|_| uniform(&mut rng, 0, 100)).collect()
        };
        assert_eq!(a, b);
    }
}

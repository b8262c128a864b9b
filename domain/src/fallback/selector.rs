//! Weighted random selection over fallback responses

use super::pool::{FallbackPool, FallbackResponse};
use rand::Rng;

/// Pick one candidate with probability proportional to its weight.
///
/// Draws `r` uniformly from `[0, total)` and returns the first candidate
/// whose cumulative weight exceeds `r`. Returns `None` only when the
/// candidates have no positive weight.
pub fn weighted_pick<'a, R>(candidates: &[&'a FallbackResponse], rng: &mut R) -> Option<&'a FallbackResponse>
where
    R: Rng + ?Sized,
{
    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }

    let r = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for candidate in candidates {
        cumulative += candidate.weight;
        if cumulative > r {
            return Some(*candidate);
        }
    }
    // Rounding can leave r at the very top of the range
    candidates.iter().rev().find(|c| c.weight > 0.0).copied()
}

impl FallbackPool {
    /// Narrow by context type and mood, then make a weighted pick.
    ///
    /// Infallible: a pool always has a positive total weight, and narrowing
    /// never produces a candidate set without one.
    pub fn pick<R>(&self, context_type: Option<&str>, mood: Option<&str>, rng: &mut R) -> &FallbackResponse
    where
        R: Rng + ?Sized,
    {
        let candidates = self.narrow(context_type, mood);
        weighted_pick(&candidates, rng).unwrap_or(&self.responses()[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn pool() -> FallbackPool {
        FallbackPool::new(vec![
            FallbackResponse::new("three", 3.0),
            FallbackResponse::new("two", 2.0),
            FallbackResponse::new("zero", 0.0),
            FallbackResponse::new("one", 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let pool = pool();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let seq_a: Vec<_> = (0..20).map(|_| pool.pick(None, None, &mut a).text.clone()).collect();
        let seq_b: Vec<_> = (0..20).map(|_| pool.pick(None, None, &mut b).text.clone()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_zero_weight_never_picked() {
        let pool = pool();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5_000 {
            assert_ne!(pool.pick(None, None, &mut rng).text, "zero");
        }
    }

    #[test]
    fn test_distribution_converges_to_weights() {
        let pool = pool();
        let mut rng = StdRng::seed_from_u64(2024);
        let draws = 60_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(pool.pick(None, None, &mut rng).text.clone()).or_default() += 1;
        }

        for (text, weight) in [("three", 3.0), ("two", 2.0), ("one", 1.0)] {
            let expected = weight / 6.0;
            let observed = counts.get(text).copied().unwrap_or(0) as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "{text}: observed {observed:.4}, expected {expected:.4}"
            );
        }
    }

    #[test]
    fn test_plain_request_never_gets_tagged_entries() {
        let pool = FallbackPool::new(vec![
            FallbackResponse::new("general", 1.0),
            FallbackResponse::new("urgent", 1.0).with_context_type("high_priority"),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            assert_eq!(pool.pick(None, None, &mut rng).text, "general");
        }
        let picked = pool.pick(Some("high_priority"), None, &mut rng);
        assert_eq!(picked.text, "urgent");
    }

    #[test]
    fn test_single_candidate_always_selected() {
        let pool = FallbackPool::new(vec![FallbackResponse::new("only", 0.5)]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(pool.pick(None, None, &mut rng).text, "only");
        }
    }

    #[test]
    fn test_weighted_pick_none_without_weight() {
        let zero = FallbackResponse::new("zero", 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(weighted_pick(&[&zero], &mut rng).is_none());
        assert!(weighted_pick(&[], &mut rng).is_none());
    }
}

//! Uniform selection of which legacy spawn slots become tanks.

use rand::seq::SliceRandom;
use rand::Rng;

/// Pick `min(desired, total_slots)` distinct slots from `1..=total_slots`,
/// uniformly at random, returned in ascending order.
pub fn select_burst_positions<R: Rng + ?Sized>(rng: &mut R, total_slots: u32, desired: u32) -> Vec<u32> {
    if total_slots == 0 || desired == 0 {
        return Vec::new();
    }
    let mut slots: Vec<u32> = (1..=total_slots).collect();
    slots.shuffle(rng);
    slots.truncate(desired.min(total_slots) as usize);
    slots.sort_unstable();
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_exact_count_sorted_unique() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for (total, desired) in [(10, 3), (5, 5), (4, 9), (1, 1), (22, 4)] {
            let picks = select_burst_positions(&mut rng, total, desired);
            assert_eq!(picks.len(), desired.min(total) as usize);
            assert!(picks.windows(2).all(|w| w[0] < w[1]), "ascending and unique: {picks:?}");
            assert!(picks.iter().all(|&p| (1..=total).contains(&p)));
        }
    }

    #[test]
    fn test_zero_inputs_yield_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(select_burst_positions(&mut rng, 0, 3).is_empty());
        assert!(select_burst_positions(&mut rng, 10, 0).is_empty());
    }

    #[test]
    fn test_every_slot_is_reachable() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut hits = [0u32; 8];
        for _ in 0..4000 {
            for p in select_burst_positions(&mut rng, 8, 2) {
                hits[(p - 1) as usize] += 1;
            }
        }
        // 8000 picks over 8 slots: each should land near 1000.
        for (slot, &count) in hits.iter().enumerate() {
            assert!((800..1200).contains(&count), "slot {} picked {count} times", slot + 1);
        }
    }
}

use rand::{Rng, RngCore};

use crate::assert_interval;
use crate::table::QTable;

/// Exploration policy result
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy
///
/// Chooses a uniformly random action with probability epsilon, and the greedy
/// action otherwise. Randomness comes from the caller-supplied generator so
/// runs can be made deterministic.
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy with a fixed exploration rate
    ///
    /// **Panics** if `epsilon` is not in the interval `[0,1]`
    pub fn new(epsilon: f64) -> Self {
        assert_interval!(epsilon, 0.0, 1.0);
        Self { epsilon }
    }

    /// Invoke epsilon greedy policy
    pub fn choose(&self, rng: &mut dyn RngCore) -> Choice {
        if rng.gen::<f64>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Select an action for `state`: random on explore, greedy on the Q-table
    /// row on exploit
    pub fn select(&self, q: &QTable, state: usize, rng: &mut dyn RngCore) -> usize {
        match self.choose(rng) {
            Choice::Explore => rng.gen_range(0..q.num_actions()),
            Choice::Exploit => q.greedy_action(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_epsilon_always_exploits() {
        let exploration = EpsilonGreedy::new(0.0);
        let q = QTable::from_rows(vec![vec![0.0, 2.0, 1.0]]);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            assert_eq!(exploration.select(&q, 0, &mut rng), 1);
        }
    }

    #[test]
    fn full_epsilon_always_explores() {
        let exploration = EpsilonGreedy::new(1.0);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            assert!(matches!(exploration.choose(&mut rng), Choice::Explore));
        }
    }

    #[test]
    #[should_panic]
    fn epsilon_outside_interval_panics() {
        EpsilonGreedy::new(1.5);
    }
}

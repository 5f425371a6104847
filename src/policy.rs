use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;
use thiserror::Error;

use crate::table::QTable;

/// Tolerance for checking that a policy row sums to one
pub const ROW_TOLERANCE: f64 = 1e-9;

/// Errors raised when constructing a [`Policy`] from explicit rows
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("policy must have at least one state and one action")]
    Empty,
    #[error("policy row {state} has a different length than the first row")]
    RaggedRow { state: usize },
    #[error("policy row {state} contains probability {prob} outside [0, 1]")]
    InvalidProbability { state: usize, prob: f64 },
    #[error("policy row {state} sums to {sum}, expected 1")]
    UnnormalizedRow { state: usize, sum: f64 },
}

/// A tabular policy: one probability distribution over actions per state
///
/// Planning algorithms read it as a stochastic matrix; control algorithms
/// write one-hot rows into it via [`Policy::set_greedy`].
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    num_actions: usize,
    rows: Vec<Vec<f64>>,
}

impl Policy {
    /// The uniform random policy
    ///
    /// **Panics** if either space is empty
    pub fn uniform(num_states: usize, num_actions: usize) -> Self {
        assert!(num_states > 0, "policy must have at least one state");
        assert!(num_actions > 0, "policy must have at least one action");
        let p = 1.0 / num_actions as f64;
        Self {
            num_actions,
            rows: vec![vec![p; num_actions]; num_states],
        }
    }

    /// A deterministic policy taking `actions[s]` in state `s`
    ///
    /// **Panics** if any action is out of bounds
    pub fn deterministic(num_actions: usize, actions: &[usize]) -> Self {
        assert!(!actions.is_empty(), "policy must have at least one state");
        let rows = actions
            .iter()
            .map(|&a| {
                assert!(a < num_actions, "action {} is out of bounds", a);
                let mut row = vec![0.0; num_actions];
                row[a] = 1.0;
                row
            })
            .collect();
        Self { num_actions, rows }
    }

    /// The policy that is greedy with respect to a Q-table, ties broken toward
    /// the lowest action index
    pub fn greedy(q: &QTable) -> Self {
        let actions = (0..q.num_states())
            .map(|s| q.greedy_action(s))
            .collect::<Vec<_>>();
        Self::deterministic(q.num_actions(), &actions)
    }

    /// Build a policy from explicit rows, checking that each row is a
    /// probability distribution
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PolicyError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(PolicyError::Empty);
        }
        let num_actions = rows[0].len();
        for (s, row) in rows.iter().enumerate() {
            if row.len() != num_actions {
                return Err(PolicyError::RaggedRow { state: s });
            }
            if let Some(&prob) = row.iter().find(|p| !(0.0..=1.0).contains(*p)) {
                return Err(PolicyError::InvalidProbability { state: s, prob });
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_TOLERANCE {
                return Err(PolicyError::UnnormalizedRow { state: s, sum });
            }
        }
        Ok(Self { num_actions, rows })
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn prob(&self, state: usize, action: usize) -> f64 {
        self.rows[state][action]
    }

    pub fn row(&self, state: usize) -> &[f64] {
        &self.rows[state]
    }

    /// Overwrite the row for `state` with a one-hot distribution at `action`
    pub fn set_greedy(&mut self, state: usize, action: usize) {
        let row = &mut self.rows[state];
        row.fill(0.0);
        row[action] = 1.0;
    }

    /// The highest-probability action for a state, ties broken toward the
    /// lowest index
    pub fn greedy_action(&self, state: usize) -> usize {
        crate::util::argmax(&self.rows[state])
    }

    /// Draw an action for `state` from the row distribution
    pub fn sample(&self, state: usize, rng: &mut dyn RngCore) -> usize {
        WeightedIndex::new(&self.rows[state])
            .expect("policy row is always a valid distribution")
            .sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn uniform_rows_are_distributions() {
        let policy = Policy::uniform(2, 4);
        assert_eq!(policy.num_states(), 2);
        assert_eq!(policy.num_actions(), 4);
        assert_eq!(policy.prob(0, 3), 0.25);
    }

    #[test]
    fn deterministic_rows_are_one_hot() {
        let policy = Policy::deterministic(3, &[2, 0]);
        assert_eq!(policy.row(0), &[0.0, 0.0, 1.0]);
        assert_eq!(policy.row(1), &[1.0, 0.0, 0.0]);
        assert_eq!(policy.greedy_action(0), 2);
    }

    #[test]
    fn from_rows_validates_distributions() {
        assert_eq!(Policy::from_rows(vec![]), Err(PolicyError::Empty));
        assert_eq!(
            Policy::from_rows(vec![vec![0.5, 0.5], vec![1.0]]),
            Err(PolicyError::RaggedRow { state: 1 })
        );
        assert_eq!(
            Policy::from_rows(vec![vec![0.7, 0.7]]),
            Err(PolicyError::UnnormalizedRow { state: 0, sum: 1.4 })
        );
        assert_eq!(
            Policy::from_rows(vec![vec![1.5, -0.5]]),
            Err(PolicyError::InvalidProbability {
                state: 0,
                prob: 1.5
            })
        );
        assert!(Policy::from_rows(vec![vec![0.3, 0.7]]).is_ok());
    }

    #[test]
    fn greedy_follows_q_table_with_lowest_index_ties() {
        let q = QTable::from_rows(vec![vec![1.0, 1.0], vec![0.0, 3.0]]);
        let policy = Policy::greedy(&q);
        assert_eq!(policy.greedy_action(0), 0);
        assert_eq!(policy.greedy_action(1), 1);
    }

    #[test]
    fn set_greedy_overwrites_row() {
        let mut policy = Policy::uniform(1, 3);
        policy.set_greedy(0, 1);
        assert_eq!(policy.row(0), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn sample_respects_support() {
        let policy = Policy::from_rows(vec![vec![0.0, 1.0, 0.0]]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(policy.sample(0, &mut rng), 1);
        }
    }
}

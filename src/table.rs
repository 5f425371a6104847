use crate::util::argmax;

/// A tabular action-value function Q(s, a)
///
/// Also doubles as the shape for state-action eligibility traces, which share
/// the same indexing and update discipline.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    num_states: usize,
    num_actions: usize,
    rows: Vec<Vec<f64>>,
}

impl QTable {
    /// A zero-initialized table over the given state and action spaces
    ///
    /// **Panics** if either space is empty
    pub fn zeros(num_states: usize, num_actions: usize) -> Self {
        assert!(num_states > 0, "table must have at least one state");
        assert!(num_actions > 0, "table must have at least one action");
        Self {
            num_states,
            num_actions,
            rows: vec![vec![0.0; num_actions]; num_states],
        }
    }

    /// Build a table from explicit rows
    ///
    /// **Panics** if the rows are empty or ragged
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        assert!(!rows.is_empty(), "table must have at least one state");
        let num_actions = rows[0].len();
        assert!(num_actions > 0, "table must have at least one action");
        assert!(
            rows.iter().all(|r| r.len() == num_actions),
            "table rows must all have the same length"
        );
        Self {
            num_states: rows.len(),
            num_actions,
            rows,
        }
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.rows[state][action]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        self.rows[state][action] = value;
    }

    pub fn add(&mut self, state: usize, action: usize, delta: f64) {
        self.rows[state][action] += delta;
    }

    pub fn row(&self, state: usize) -> &[f64] {
        &self.rows[state]
    }

    /// The greedy action for a state, breaking ties toward the lowest index
    pub fn greedy_action(&self, state: usize) -> usize {
        argmax(&self.rows[state])
    }

    /// The largest action value in a state's row
    pub fn row_max(&self, state: usize) -> f64 {
        let row = &self.rows[state];
        row.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Elementwise mean of two tables of the same shape
    ///
    /// **Panics** if the shapes differ
    pub fn mean_with(&self, other: &QTable) -> QTable {
        assert_eq!(self.num_states, other.num_states, "table shapes differ");
        assert_eq!(self.num_actions, other.num_actions, "table shapes differ");
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| (x + y) / 2.0).collect())
            .collect();
        QTable {
            num_states: self.num_states,
            num_actions: self.num_actions,
            rows,
        }
    }
}

use thiserror::Error;

/// Tolerance for checking that outgoing transition probabilities sum to one
pub const PROB_TOLERANCE: f64 = 1e-9;

/// Errors raised when constructing or validating an [`Mdp`]
#[derive(Debug, Error, PartialEq)]
pub enum MdpError {
    #[error("state index {state} is out of bounds for {num_states} states")]
    StateOutOfBounds { state: usize, num_states: usize },
    #[error("action index {action} is out of bounds for {num_actions} actions")]
    ActionOutOfBounds { action: usize, num_actions: usize },
    #[error("transition probability {prob} for state {state} action {action} is outside [0, 1]")]
    InvalidProbability {
        state: usize,
        action: usize,
        prob: f64,
    },
    #[error("outgoing probabilities for state {state} action {action} sum to {sum}, expected 1")]
    UnnormalizedTransitions {
        state: usize,
        action: usize,
        sum: f64,
    },
}

/// A single possible result of taking an action in a state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub next_state: usize,
    pub prob: f64,
    pub reward: f64,
}

/// A finite Markov decision process with sparse transition dynamics
///
/// Only the non-zero entries of the transition tensor are stored: each
/// `(state, action)` pair maps to a list of [`Outcome`]s, and a pair with no
/// outcomes is simply one the dynamics never leave (absorbing by omission).
/// Rewards are carried per `(s, a, s')` on the outcome.
#[derive(Debug, Clone)]
pub struct Mdp {
    num_states: usize,
    num_actions: usize,
    dynamics: Vec<Vec<Vec<Outcome>>>,
}

impl Mdp {
    /// Initialize an empty model over the given state and action spaces
    ///
    /// **Panics** if either space is empty
    pub fn new(num_states: usize, num_actions: usize) -> Self {
        assert!(num_states > 0, "MDP must have at least one state");
        assert!(num_actions > 0, "MDP must have at least one action");
        Self {
            num_states,
            num_actions,
            dynamics: vec![vec![Vec::new(); num_actions]; num_states],
        }
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Record that taking `action` in `state` can lead to `next_state` with
    /// probability `prob`, yielding `reward`
    pub fn add_outcome(
        &mut self,
        state: usize,
        action: usize,
        next_state: usize,
        prob: f64,
        reward: f64,
    ) -> Result<(), MdpError> {
        self.check_state(state)?;
        self.check_state(next_state)?;
        self.check_action(action)?;
        if !(0.0..=1.0).contains(&prob) {
            return Err(MdpError::InvalidProbability {
                state,
                action,
                prob,
            });
        }
        self.dynamics[state][action].push(Outcome {
            next_state,
            prob,
            reward,
        });
        Ok(())
    }

    /// The possible outcomes of taking `action` in `state`
    ///
    /// An empty slice means the dynamics never leave this pair.
    pub fn outcomes(&self, state: usize, action: usize) -> &[Outcome] {
        &self.dynamics[state][action]
    }

    /// One-step lookahead: the expected return of taking `action` in `state`
    /// and following values `v` afterwards, discounted by `gamma`
    pub fn action_value(&self, state: usize, action: usize, gamma: f64, v: &[f64]) -> f64 {
        self.dynamics[state][action]
            .iter()
            .map(|o| o.prob * (o.reward + gamma * v[o.next_state]))
            .sum()
    }

    /// Check that every `(state, action)` pair with any outcome has outgoing
    /// probabilities summing to one within [`PROB_TOLERANCE`]
    pub fn validate(&self) -> Result<(), MdpError> {
        for (s, actions) in self.dynamics.iter().enumerate() {
            for (a, outcomes) in actions.iter().enumerate() {
                if outcomes.is_empty() {
                    continue;
                }
                let sum: f64 = outcomes.iter().map(|o| o.prob).sum();
                if (sum - 1.0).abs() > PROB_TOLERANCE {
                    return Err(MdpError::UnnormalizedTransitions {
                        state: s,
                        action: a,
                        sum,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_state(&self, state: usize) -> Result<(), MdpError> {
        if state >= self.num_states {
            return Err(MdpError::StateOutOfBounds {
                state,
                num_states: self.num_states,
            });
        }
        Ok(())
    }

    fn check_action(&self, action: usize) -> Result<(), MdpError> {
        if action >= self.num_actions {
            return Err(MdpError::ActionOutOfBounds {
                action,
                num_actions: self.num_actions,
            });
        }
        Ok(())
    }
}

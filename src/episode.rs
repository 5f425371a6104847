/// A complete trajectory as three aligned sequences
///
/// `states` and `rewards` always have the same length; `actions` may be one
/// entry shorter when the final entry is a terminal state where no action was
/// taken. `rewards[t]` is the reward observed at step `t`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Episode {
    pub states: Vec<usize>,
    pub actions: Vec<usize>,
    pub rewards: Vec<f64>,
}

impl Episode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step where `action` was taken in `state` and `reward` observed
    pub fn push_step(&mut self, state: usize, action: usize, reward: f64) {
        self.states.push(state);
        self.actions.push(action);
        self.rewards.push(reward);
    }

    /// Append a terminal entry where no action was taken
    pub fn push_terminal(&mut self, state: usize, reward: f64) {
        self.states.push(state);
        self.rewards.push(reward);
    }

    /// Number of entries in the trajectory, terminal entry included
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, t: usize) -> usize {
        self.states[t]
    }

    /// The action taken at step `t`, or `None` for an actionless entry
    pub fn action(&self, t: usize) -> Option<usize> {
        self.actions.get(t).copied()
    }

    /// The reward observed at step `t`
    ///
    /// A position past the end of the reward sequence reads as zero; a source
    /// that omits trailing rewards is not an error.
    pub fn reward(&self, t: usize) -> f64 {
        self.rewards.get(t).copied().unwrap_or(0.0)
    }
}

use rand::RngCore;
use rand_distr::{Distribution, WeightedAliasIndex};

use crate::env::{EpisodeSource, Simulator, Step};
use crate::episode::Episode;
use crate::mdp::{Mdp, MdpError};
use crate::policy::Policy;

/// Default cap on episode length, keeping trajectories finite even under
/// policies that never reach a terminal state
const DEFAULT_STEP_CAP: usize = 10_000;

/// Drives the [`EpisodeSource`] and [`Simulator`] contracts by sampling a
/// validated [`Mdp`]
///
/// Next states are drawn from alias tables built once per `(state, action)`
/// pair at construction, so repeated sampling is cheap. Episodes start from a
/// fixed start state (unless injected), follow the supplied policy, and end
/// with an actionless terminal entry carrying zero reward.
pub struct MdpSimulator {
    mdp: Mdp,
    start_state: usize,
    terminal: Vec<bool>,
    step_cap: usize,
    samplers: Vec<Vec<Option<WeightedAliasIndex<f64>>>>,
}

impl MdpSimulator {
    /// Build a simulator over a model, designating the terminal states
    ///
    /// Validates the model's transition probabilities and checks all indices.
    pub fn new(mdp: Mdp, start_state: usize, terminal_states: &[usize]) -> Result<Self, MdpError> {
        mdp.validate()?;
        let num_states = mdp.num_states();
        if start_state >= num_states {
            return Err(MdpError::StateOutOfBounds {
                state: start_state,
                num_states,
            });
        }
        let mut terminal = vec![false; num_states];
        for &s in terminal_states {
            if s >= num_states {
                return Err(MdpError::StateOutOfBounds {
                    state: s,
                    num_states,
                });
            }
            terminal[s] = true;
        }

        let samplers = (0..num_states)
            .map(|s| {
                (0..mdp.num_actions())
                    .map(|a| {
                        let outcomes = mdp.outcomes(s, a);
                        if outcomes.is_empty() {
                            return None;
                        }
                        let weights = outcomes.iter().map(|o| o.prob).collect();
                        Some(
                            WeightedAliasIndex::new(weights)
                                .expect("validated transitions form a distribution"),
                        )
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            mdp,
            start_state,
            terminal,
            step_cap: DEFAULT_STEP_CAP,
            samplers,
        })
    }

    /// Override the episode length cap
    pub fn with_step_cap(mut self, step_cap: usize) -> Self {
        assert!(step_cap > 0, "step cap must be positive");
        self.step_cap = step_cap;
        self
    }

    pub fn start_state(&self) -> usize {
        self.start_state
    }

    pub fn is_terminal(&self, state: usize) -> bool {
        self.terminal[state]
    }

    fn roll_out(
        &mut self,
        policy: &Policy,
        mut state: usize,
        mut action: Option<usize>,
        rng: &mut dyn RngCore,
    ) -> Episode {
        let mut ep = Episode::new();
        while !self.terminal[state] && ep.len() < self.step_cap {
            let a = action.take().unwrap_or_else(|| policy.sample(state, rng));
            let step = self.step(state, a, rng);
            ep.push_step(state, a, step.reward);
            state = step.next_state;
            if step.terminal {
                break;
            }
        }
        ep.push_terminal(state, 0.0);
        ep
    }
}

impl Simulator for MdpSimulator {
    fn step(&mut self, state: usize, action: usize, rng: &mut dyn RngCore) -> Step {
        // A terminal state or a pair with no recorded dynamics absorbs.
        let sampler = match &self.samplers[state][action] {
            Some(sampler) if !self.terminal[state] => sampler,
            _ => {
                return Step {
                    next_state: state,
                    reward: 0.0,
                    terminal: true,
                };
            }
        };
        let outcome = self.mdp.outcomes(state, action)[sampler.sample(rng)];
        Step {
            next_state: outcome.next_state,
            reward: outcome.reward,
            terminal: self.terminal[outcome.next_state],
        }
    }
}

impl EpisodeSource for MdpSimulator {
    fn episode(&mut self, policy: &Policy, rng: &mut dyn RngCore) -> Episode {
        self.roll_out(policy, self.start_state, None, rng)
    }

    fn episode_from(
        &mut self,
        policy: &Policy,
        state: usize,
        action: usize,
        rng: &mut dyn RngCore,
    ) -> Episode {
        self.roll_out(policy, state, Some(action), rng)
    }
}

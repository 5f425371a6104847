use rand::RngCore;

use crate::episode::Episode;
use crate::policy::Policy;

/// The result of a single environment transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub next_state: usize,
    pub reward: f64,
    pub terminal: bool,
}

/// A collaborator that produces complete trajectories
///
/// The returned [`Episode`] must be finite and end at a terminal state. The
/// core treats the source as opaque: its sampling logic is its own business,
/// and any panic it raises propagates to the caller.
pub trait EpisodeSource {
    /// Generate one episode under the given policy
    fn episode(&mut self, policy: &Policy, rng: &mut dyn RngCore) -> Episode;

    /// Generate one episode that starts in `state` and takes `action` first,
    /// then follows the policy (exploring starts)
    fn episode_from(
        &mut self,
        policy: &Policy,
        state: usize,
        action: usize,
        rng: &mut dyn RngCore,
    ) -> Episode;
}

/// A collaborator that simulates one transition at a time
pub trait Simulator {
    /// Take `action` in `state`, producing the next state, the reward, and
    /// whether the next state is terminal
    fn step(&mut self, state: usize, action: usize, rng: &mut dyn RngCore) -> Step;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// An episode source that replays canned trajectories in order, cycling
    /// when it runs out; exploring-start injection is ignored
    pub struct ScriptedSource {
        pub episodes: Vec<Episode>,
        pub cursor: usize,
    }

    impl ScriptedSource {
        pub fn new(episodes: Vec<Episode>) -> Self {
            Self {
                episodes,
                cursor: 0,
            }
        }
    }

    impl EpisodeSource for ScriptedSource {
        fn episode(&mut self, _policy: &Policy, _rng: &mut dyn RngCore) -> Episode {
            let ep = self.episodes[self.cursor % self.episodes.len()].clone();
            self.cursor += 1;
            ep
        }

        fn episode_from(
            &mut self,
            policy: &Policy,
            _state: usize,
            _action: usize,
            rng: &mut dyn RngCore,
        ) -> Episode {
            self.episode(policy, rng)
        }
    }
}

//! Monte Carlo methods
//!
//! Both routines consume complete episodes from an [`EpisodeSource`] and walk
//! each trajectory backward, folding rewards into the discounted return
//! `G = gamma * G + r` as they go.

use log::trace;
use rand::{Rng, RngCore};

use crate::assert_interval;
use crate::env::EpisodeSource;
use crate::policy::Policy;
use crate::step_size::StepSize;
use crate::table::QTable;

/// Every-visit Monte Carlo prediction
///
/// Updates the value of every state occurrence in each episode toward the
/// discounted return observed from that point, weighted by the step-size
/// strategy and a per-state visit counter.
///
/// ### Parameters
/// - `source` - The episode source to sample from
/// - `policy` - The policy the source should follow
/// - `initial_v` - The starting value function, consumed and returned updated
/// - `gamma` - The discount factor - must be between 0 and 1
/// - `step` - Step-size strategy for the value updates
/// - `num_episodes` - How many episodes to consume
///
/// **Panics** if `gamma` is not in `[0,1]` or `initial_v` does not match the
/// policy's state count
pub fn every_visit_prediction<S: EpisodeSource>(
    source: &mut S,
    policy: &Policy,
    initial_v: Vec<f64>,
    gamma: f64,
    step: StepSize,
    num_episodes: u32,
    rng: &mut dyn RngCore,
) -> Vec<f64> {
    assert_interval!(gamma, 0.0, 1.0);
    assert_eq!(initial_v.len(), policy.num_states());

    let mut v = initial_v;
    let mut visits = vec![0u32; v.len()];

    for ep_idx in 0..num_episodes {
        let ep = source.episode(policy, rng);
        let mut g = 0.0;
        for t in (0..ep.len()).rev() {
            let s = ep.state(t);
            g = gamma * g + ep.reward(t);
            visits[s] += 1;
            v[s] += step.rate(visits[s]) * (g - v[s]);
        }
        trace!("mc prediction episode {}: {} entries", ep_idx + 1, ep.len());
    }

    v
}

/// Monte Carlo control with exploring starts
///
/// Each episode begins from a uniformly random state-action pair so every pair
/// keeps being explored. Q is updated with first-visit semantics: a pair is
/// only credited at its earliest occurrence within the episode. After every Q
/// update the policy row for that state is immediately made greedy on the
/// current Q row, rather than improving in a separate batch phase.
///
/// Returns the learned Q-table and the greedy policy.
pub fn exploring_starts<S: EpisodeSource>(
    source: &mut S,
    initial_q: QTable,
    initial_policy: Policy,
    gamma: f64,
    step: StepSize,
    num_episodes: u32,
    rng: &mut dyn RngCore,
) -> (QTable, Policy) {
    assert_interval!(gamma, 0.0, 1.0);
    assert_eq!(initial_policy.num_states(), initial_q.num_states());
    assert_eq!(initial_policy.num_actions(), initial_q.num_actions());

    let mut q = initial_q;
    let mut policy = initial_policy;
    let (num_states, num_actions) = (q.num_states(), q.num_actions());
    let mut visits = vec![vec![0u32; num_actions]; num_states];

    for ep_idx in 0..num_episodes {
        let start_state = rng.gen_range(0..num_states);
        let start_action = rng.gen_range(0..num_actions);
        let ep = source.episode_from(&policy, start_state, start_action, rng);

        let mut g = 0.0;
        for t in (0..ep.len()).rev() {
            g = gamma * g + ep.reward(t);
            let s = ep.state(t);
            let Some(a) = ep.action(t) else {
                continue;
            };

            let first_visit = (0..t).all(|p| ep.state(p) != s || ep.action(p) != Some(a));
            if first_visit {
                visits[s][a] += 1;
                let rate = step.rate(visits[s][a]);
                q.add(s, a, rate * (g - q.get(s, a)));
                policy.set_greedy(s, q.greedy_action(s));
            }
        }
        trace!("exploring starts episode {}: {} entries", ep_idx + 1, ep.len());
    }

    (q, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::tests::ScriptedSource;
    use crate::episode::Episode;
    use crate::mdp::Mdp;
    use crate::sim::MdpSimulator;
    use float_eq::assert_float_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 0 -> 1 -> 0 -> terminal(2), rewards [3, -1, 2, 0]
    fn fixed_episode() -> Episode {
        let mut ep = Episode::new();
        ep.push_step(0, 0, 3.0);
        ep.push_step(1, 0, -1.0);
        ep.push_step(0, 0, 2.0);
        ep.push_terminal(2, 0.0);
        ep
    }

    #[test]
    fn every_visit_matches_hand_computed_returns_fixed_rate() {
        let mut source = ScriptedSource::new(vec![fixed_episode()]);
        let policy = Policy::uniform(3, 1);
        let mut rng = StdRng::seed_from_u64(0);

        // Backward with gamma = 0.5: G hits state 2 with 0, state 0 with 2,
        // state 1 with 0, then state 0 again with 3.
        let v = every_visit_prediction(
            &mut source,
            &policy,
            vec![0.0; 3],
            0.5,
            StepSize::Fixed(0.5),
            1,
            &mut rng,
        );
        assert_float_eq!(v[0], 2.0, abs <= 1e-12);
        assert_float_eq!(v[1], 0.0, abs <= 1e-12);
        assert_float_eq!(v[2], 0.0, abs <= 1e-12);
    }

    #[test]
    fn every_visit_matches_hand_computed_returns_sample_average() {
        let mut source = ScriptedSource::new(vec![fixed_episode()]);
        let policy = Policy::uniform(3, 1);
        let mut rng = StdRng::seed_from_u64(0);

        let v = every_visit_prediction(
            &mut source,
            &policy,
            vec![0.0; 3],
            0.5,
            StepSize::SampleAverage,
            1,
            &mut rng,
        );
        // First visit of state 0 (backward) averages to 2, the second nudges
        // it to 2 + (3 - 2) / 2.
        assert_float_eq!(v[0], 2.5, abs <= 1e-12);
        assert_float_eq!(v[1], 0.0, abs <= 1e-12);
        assert_float_eq!(v[2], 0.0, abs <= 1e-12);
    }

    /// Corridor: states 0, 1 and terminal 2; action 1 moves right, action 0
    /// moves back to 0. Step costs 1, reaching the goal pays 10.
    fn corridor() -> MdpSimulator {
        let mut mdp = Mdp::new(3, 2);
        mdp.add_outcome(0, 0, 0, 1.0, -1.0).unwrap();
        mdp.add_outcome(0, 1, 1, 1.0, -1.0).unwrap();
        mdp.add_outcome(1, 0, 0, 1.0, -1.0).unwrap();
        mdp.add_outcome(1, 1, 2, 1.0, 10.0).unwrap();
        MdpSimulator::new(mdp, 0, &[2]).unwrap().with_step_cap(200)
    }

    #[test]
    fn exploring_starts_learns_the_greedy_corridor_policy() {
        let mut sim = corridor();
        let mut rng = StdRng::seed_from_u64(42);

        let (q, policy) = exploring_starts(
            &mut sim,
            QTable::zeros(3, 2),
            Policy::uniform(3, 2),
            0.9,
            StepSize::SampleAverage,
            300,
            &mut rng,
        );

        assert_eq!(policy.greedy_action(0), 1);
        assert_eq!(policy.greedy_action(1), 1);
        assert!(q.get(1, 1) > q.get(1, 0));
        assert!(q.get(0, 1) > q.get(0, 0));
    }
}

//! On-policy control: SARSA and SARSA(lambda)

use log::trace;
use rand::RngCore;

use crate::assert_interval;
use crate::env::{Simulator, Step};
use crate::exploration::EpsilonGreedy;
use crate::table::QTable;

/// The result of a SARSA run: the learned Q-table plus per-episode step counts
/// and cumulative rewards
#[derive(Debug, Clone, PartialEq)]
pub struct SarsaOutcome {
    pub q: QTable,
    pub steps: Vec<u32>,
    pub rewards: Vec<f64>,
}

/// One-step SARSA
///
/// Actions are selected epsilon-greedily at every decision point, and each
/// update bootstraps on the Q-value of the next state paired with the action
/// actually selected there (the on-policy target).
///
/// ### Parameters
/// - `sim` - The single-step environment simulator
/// - `initial_q` - The starting Q-table, consumed and returned updated
/// - `initial_state` - Where every episode begins
/// - `num_episodes` - How many episodes to run
/// - `gamma` - The discount factor - must be between 0 and 1
/// - `alpha` - The learning rate - must be between 0 and 1
/// - `epsilon` - The exploration rate - must be between 0 and 1
///
/// **Panics** if a hyperparameter is outside `[0,1]` or `initial_state` is out
/// of bounds
#[allow(clippy::too_many_arguments)]
pub fn sarsa<S: Simulator>(
    sim: &mut S,
    initial_q: QTable,
    initial_state: usize,
    num_episodes: u32,
    gamma: f64,
    alpha: f64,
    epsilon: f64,
    rng: &mut dyn RngCore,
) -> SarsaOutcome {
    assert_interval!(gamma, 0.0, 1.0);
    assert_interval!(alpha, 0.0, 1.0);
    assert!(initial_state < initial_q.num_states());
    let exploration = EpsilonGreedy::new(epsilon);

    let mut q = initial_q;
    let mut steps = vec![0u32; num_episodes as usize];
    let mut rewards = vec![0.0; num_episodes as usize];

    for ep in 0..num_episodes as usize {
        let mut s = initial_state;
        let mut a = exploration.select(&q, s, rng);

        loop {
            let Step {
                next_state: sp,
                reward: r,
                terminal,
            } = sim.step(s, a, rng);
            let ap = exploration.select(&q, sp, rng);

            let target = r + gamma * q.get(sp, ap);
            q.add(s, a, alpha * (target - q.get(s, a)));
            (s, a) = (sp, ap);

            rewards[ep] += r;
            steps[ep] += 1;
            if terminal {
                break;
            }
        }
        trace!(
            "sarsa episode {}: {} steps, reward {}",
            ep + 1,
            steps[ep],
            rewards[ep]
        );
    }

    SarsaOutcome { q, steps, rewards }
}

/// SARSA(lambda) with accumulating eligibility traces
///
/// The trace matrix starts every episode at exactly zero. Each step the
/// visited pair's trace is incremented by one, the TD error is applied to
/// every state-action pair scaled by its trace, and all traces are then
/// decayed by `gamma * lambda`. With `lambda = 0` this degenerates to plain
/// [`sarsa`].
#[allow(clippy::too_many_arguments)]
pub fn sarsa_lambda<S: Simulator>(
    sim: &mut S,
    initial_q: QTable,
    initial_state: usize,
    num_episodes: u32,
    gamma: f64,
    alpha: f64,
    lambda: f64,
    epsilon: f64,
    rng: &mut dyn RngCore,
) -> SarsaOutcome {
    assert_interval!(gamma, 0.0, 1.0);
    assert_interval!(alpha, 0.0, 1.0);
    assert_interval!(lambda, 0.0, 1.0);
    assert!(initial_state < initial_q.num_states());
    let exploration = EpsilonGreedy::new(epsilon);

    let mut q = initial_q;
    let (num_states, num_actions) = (q.num_states(), q.num_actions());
    let mut steps = vec![0u32; num_episodes as usize];
    let mut rewards = vec![0.0; num_episodes as usize];

    for ep in 0..num_episodes as usize {
        let mut traces = QTable::zeros(num_states, num_actions);
        let mut s = initial_state;
        let mut a = exploration.select(&q, s, rng);

        loop {
            let Step {
                next_state: sp,
                reward: r,
                terminal,
            } = sim.step(s, a, rng);
            let ap = exploration.select(&q, sp, rng);

            let delta = r + gamma * q.get(sp, ap) - q.get(s, a);
            traces.add(s, a, 1.0);
            for s2 in 0..num_states {
                for a2 in 0..num_actions {
                    q.add(s2, a2, alpha * delta * traces.get(s2, a2));
                    traces.set(s2, a2, gamma * lambda * traces.get(s2, a2));
                }
            }
            (s, a) = (sp, ap);

            rewards[ep] += r;
            steps[ep] += 1;
            if terminal {
                break;
            }
        }
        trace!(
            "sarsa(lambda) episode {}: {} steps, reward {}",
            ep + 1,
            steps[ep],
            rewards[ep]
        );
    }

    SarsaOutcome { q, steps, rewards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::Mdp;
    use crate::sim::MdpSimulator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corridor() -> MdpSimulator {
        let mut mdp = Mdp::new(3, 2);
        mdp.add_outcome(0, 0, 0, 1.0, -1.0).unwrap();
        mdp.add_outcome(0, 1, 1, 1.0, -1.0).unwrap();
        mdp.add_outcome(1, 0, 0, 1.0, -1.0).unwrap();
        mdp.add_outcome(1, 1, 2, 1.0, 10.0).unwrap();
        MdpSimulator::new(mdp, 0, &[2]).unwrap().with_step_cap(500)
    }

    #[test]
    fn sarsa_learns_the_corridor() {
        let mut sim = corridor();
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = sarsa(
            &mut sim,
            QTable::zeros(3, 2),
            0,
            300,
            0.9,
            0.5,
            0.1,
            &mut rng,
        );

        assert_eq!(outcome.q.greedy_action(0), 1);
        assert_eq!(outcome.q.greedy_action(1), 1);
        assert_eq!(outcome.steps.len(), 300);
        assert_eq!(outcome.rewards.len(), 300);
        // Late episodes should be close to the optimal two-step path.
        let late_steps: u32 = outcome.steps[250..].iter().sum();
        assert!(late_steps < 50 * 10, "late episodes still wandering");
    }

    #[test]
    fn lambda_zero_matches_plain_sarsa() {
        let mut sim_a = corridor();
        let mut rng_a = StdRng::seed_from_u64(11);
        let plain = sarsa(
            &mut sim_a,
            QTable::zeros(3, 2),
            0,
            50,
            0.9,
            0.5,
            0.1,
            &mut rng_a,
        );

        let mut sim_b = corridor();
        let mut rng_b = StdRng::seed_from_u64(11);
        let traced = sarsa_lambda(
            &mut sim_b,
            QTable::zeros(3, 2),
            0,
            50,
            0.9,
            0.5,
            0.0,
            0.1,
            &mut rng_b,
        );

        // Identical draws and a degenerate trace mean bitwise-equal results.
        assert_eq!(plain, traced);
    }

    #[test]
    fn sarsa_lambda_learns_the_corridor() {
        let mut sim = corridor();
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = sarsa_lambda(
            &mut sim,
            QTable::zeros(3, 2),
            0,
            300,
            0.9,
            0.5,
            0.8,
            0.1,
            &mut rng,
        );

        assert_eq!(outcome.q.greedy_action(0), 1);
        assert_eq!(outcome.q.greedy_action(1), 1);
    }
}

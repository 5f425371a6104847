//! Off-policy control: Q-learning and double Q-learning

use log::trace;
use rand::{Rng, RngCore};

use crate::assert_interval;
use crate::env::{Simulator, Step};
use crate::exploration::{Choice, EpsilonGreedy};
use crate::table::QTable;
use crate::util::argmax;

/// The result of a Q-learning run: the learned Q-table plus per-episode step
/// counts and cumulative rewards
#[derive(Debug, Clone, PartialEq)]
pub struct QLearningOutcome {
    pub q: QTable,
    pub steps: Vec<u32>,
    pub rewards: Vec<f64>,
}

/// The result of a double Q-learning run
///
/// `blended` is the elementwise mean of the two tables, materialized only
/// after the final episode finishes; it is `None` when no episodes were run.
/// Intermediate episodes never expose a blended table.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleQOutcome {
    pub q1: QTable,
    pub q2: QTable,
    pub blended: Option<QTable>,
}

/// One-step Q-learning
///
/// Behaves epsilon-greedily but bootstraps every update on the maximum
/// Q-value of the next state, regardless of which action is actually taken
/// there (the off-policy, greedy target).
///
/// **Panics** if a hyperparameter is outside `[0,1]` or `initial_state` is out
/// of bounds
#[allow(clippy::too_many_arguments)]
pub fn q_learning<S: Simulator>(
    sim: &mut S,
    initial_q: QTable,
    initial_state: usize,
    num_episodes: u32,
    gamma: f64,
    alpha: f64,
    epsilon: f64,
    rng: &mut dyn RngCore,
) -> QLearningOutcome {
    assert_interval!(gamma, 0.0, 1.0);
    assert_interval!(alpha, 0.0, 1.0);
    assert!(initial_state < initial_q.num_states());
    let exploration = EpsilonGreedy::new(epsilon);

    let mut q = initial_q;
    let mut steps = vec![0u32; num_episodes as usize];
    let mut rewards = vec![0.0; num_episodes as usize];

    for ep in 0..num_episodes as usize {
        let mut s = initial_state;

        loop {
            let a = exploration.select(&q, s, rng);
            let Step {
                next_state: sp,
                reward: r,
                terminal,
            } = sim.step(s, a, rng);

            let target = r + gamma * q.row_max(sp);
            q.add(s, a, alpha * (target - q.get(s, a)));
            s = sp;

            rewards[ep] += r;
            steps[ep] += 1;
            if terminal {
                break;
            }
        }
        trace!(
            "q-learning episode {}: {} steps, reward {}",
            ep + 1,
            steps[ep],
            rewards[ep]
        );
    }

    QLearningOutcome { q, steps, rewards }
}

/// Double Q-learning
///
/// Keeps two independent tables to de-correlate the maximization bias of
/// plain Q-learning: actions are selected against their sum, and each step a
/// fair coin picks which table to update, bootstrapping on the other table
/// evaluated at the updated table's own greedy action.
#[allow(clippy::too_many_arguments)]
pub fn double_q_learning<S: Simulator>(
    sim: &mut S,
    initial_q1: QTable,
    initial_q2: QTable,
    initial_state: usize,
    num_episodes: u32,
    gamma: f64,
    alpha: f64,
    epsilon: f64,
    rng: &mut dyn RngCore,
) -> DoubleQOutcome {
    assert_interval!(gamma, 0.0, 1.0);
    assert_interval!(alpha, 0.0, 1.0);
    assert_eq!(initial_q1.num_states(), initial_q2.num_states());
    assert_eq!(initial_q1.num_actions(), initial_q2.num_actions());
    assert!(initial_state < initial_q1.num_states());
    let exploration = EpsilonGreedy::new(epsilon);

    let mut q1 = initial_q1;
    let mut q2 = initial_q2;
    let num_actions = q1.num_actions();

    for ep in 0..num_episodes {
        let mut s = initial_state;

        loop {
            let a = match exploration.choose(rng) {
                Choice::Explore => rng.gen_range(0..num_actions),
                Choice::Exploit => {
                    let summed = q1
                        .row(s)
                        .iter()
                        .zip(q2.row(s))
                        .map(|(x, y)| x + y)
                        .collect::<Vec<_>>();
                    argmax(&summed)
                }
            };
            let Step {
                next_state: sp,
                reward: r,
                terminal,
            } = sim.step(s, a, rng);

            // Fair coin picks the table to update; the other evaluates.
            if rng.gen::<f64>() < 0.5 {
                let a_star = q1.greedy_action(sp);
                q1.add(s, a, alpha * (r + gamma * q2.get(sp, a_star) - q1.get(s, a)));
            } else {
                let a_star = q2.greedy_action(sp);
                q2.add(s, a, alpha * (r + gamma * q1.get(sp, a_star) - q2.get(s, a)));
            }
            s = sp;

            if terminal {
                break;
            }
        }
        trace!("double q-learning episode {} finished", ep + 1);
    }

    let blended = (num_episodes > 0).then(|| q1.mean_with(&q2));
    DoubleQOutcome { q1, q2, blended }
}

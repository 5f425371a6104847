//! Dynamic programming solvers
//!
//! These operate on the full model dynamics, sweeping the entire state space
//! each iteration. Loops that run out of their iteration budget before meeting
//! the convergence threshold return the partial result silently; that is the
//! documented behavior, not a failure.

use log::debug;

use crate::assert_interval;
use crate::mdp::Mdp;
use crate::policy::Policy;
use crate::util::argmax;

/// Synchronous policy evaluation via repeated Bellman expectation sweeps
///
/// Starts from a zero value function and sweeps every state against a snapshot
/// of the previous sweep's values until the largest per-state change drops
/// below `theta` or `max_iter` sweeps have run.
///
/// **Panics** if `gamma` is not in `[0,1]`, `theta` is not positive, or the
/// policy shape does not match the model
pub fn policy_evaluation(
    mdp: &Mdp,
    policy: &Policy,
    gamma: f64,
    theta: f64,
    max_iter: u32,
) -> Vec<f64> {
    assert_interval!(gamma, 0.0, 1.0);
    assert!(theta > 0.0, "theta must be positive");
    assert_eq!(policy.num_states(), mdp.num_states());
    assert_eq!(policy.num_actions(), mdp.num_actions());

    let mut v = vec![0.0; mdp.num_states()];
    let mut delta = f64::INFINITY;
    let mut sweeps = 0;

    while delta > theta && sweeps < max_iter {
        delta = 0.0;
        let old_v = v.clone();
        for s in 0..mdp.num_states() {
            let new_value = (0..mdp.num_actions())
                .map(|a| policy.prob(s, a) * mdp.action_value(s, a, gamma, &old_v))
                .sum();
            v[s] = new_value;
            delta = delta.max((old_v[s] - new_value).abs());
        }
        sweeps += 1;
    }

    debug!("policy evaluation: {sweeps} sweeps, final delta {delta:.3e}");
    v
}

/// Greedy policy improvement by one-step lookahead
///
/// Returns the improved policy and whether it is identical to the input policy
/// (`policy_stable`). Ties are broken toward the lowest action index.
pub fn policy_improvement(mdp: &Mdp, gamma: f64, policy: &Policy, v: &[f64]) -> (Policy, bool) {
    assert_interval!(gamma, 0.0, 1.0);
    assert_eq!(v.len(), mdp.num_states());

    let best_actions = (0..mdp.num_states())
        .map(|s| {
            let action_values = (0..mdp.num_actions())
                .map(|a| mdp.action_value(s, a, gamma, v))
                .collect::<Vec<_>>();
            argmax(&action_values)
        })
        .collect::<Vec<_>>();

    let improved = Policy::deterministic(mdp.num_actions(), &best_actions);
    let stable = (0..mdp.num_states()).all(|s| policy.row(s) == improved.row(s));
    (improved, stable)
}

/// Policy iteration: alternate evaluation and improvement until the policy
/// stops changing or `max_iter` rounds have run
///
/// Each round re-runs [`policy_evaluation`] to convergence from scratch on the
/// current policy. Returns the final policy and its value function.
pub fn policy_iteration(
    mdp: &Mdp,
    gamma: f64,
    theta: f64,
    initial_policy: Policy,
    max_iter: u32,
) -> (Policy, Vec<f64>) {
    let mut policy = initial_policy;
    let mut v = vec![0.0; mdp.num_states()];
    let mut stable = false;
    let mut rounds = 0;

    while !stable && rounds < max_iter {
        rounds += 1;
        debug!("policy iteration round {rounds}");
        v = policy_evaluation(mdp, &policy, gamma, theta, u32::MAX);
        (policy, stable) = policy_improvement(mdp, gamma, &policy, &v);
    }

    (policy, v)
}

/// In-place value iteration
///
/// Each sweep writes the best one-step lookahead value directly into the
/// vector being swept, so later states in the same sweep see earlier updates.
/// Returns the greedy action per state (lowest-index ties) alongside the
/// converged values; no separate improvement phase is needed.
pub fn value_iteration(
    mdp: &Mdp,
    gamma: f64,
    theta: f64,
    initial_v: Vec<f64>,
    max_iter: u32,
) -> (Vec<usize>, Vec<f64>) {
    assert_interval!(gamma, 0.0, 1.0);
    assert!(theta > 0.0, "theta must be positive");
    assert_eq!(initial_v.len(), mdp.num_states());

    let mut v = initial_v;
    let mut best_actions = vec![0; mdp.num_states()];
    let mut delta = f64::INFINITY;
    let mut sweeps = 0;

    while delta > theta && sweeps < max_iter {
        delta = 0.0;
        for s in 0..mdp.num_states() {
            let old_value = v[s];
            let action_values = (0..mdp.num_actions())
                .map(|a| mdp.action_value(s, a, gamma, &v))
                .collect::<Vec<_>>();
            let best = argmax(&action_values);
            v[s] = action_values[best];
            best_actions[s] = best;
            delta = delta.max((old_value - v[s]).abs());
        }
        sweeps += 1;
    }

    debug!("value iteration: {sweeps} sweeps, final delta {delta:.3e}");
    (best_actions, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    /// Two-state chain with a single action: 0 hops to 1 for reward 2, and 1
    /// self-loops for reward 1. With gamma = 0.5 the closed form is
    /// V(1) = 1 / (1 - 0.5) = 2 and V(0) = 2 + 0.5 * V(1) = 3.
    fn two_state_chain() -> Mdp {
        let mut mdp = Mdp::new(2, 1);
        mdp.add_outcome(0, 0, 1, 1.0, 2.0).unwrap();
        mdp.add_outcome(1, 0, 1, 1.0, 1.0).unwrap();
        mdp
    }

    /// Three states, two actions, one stochastic transition. State 2 absorbs
    /// with zero reward. Worked by hand: V* = [1/0.19, 0.9/0.19, 0] with the
    /// optimal policy taking action 0 in state 0 and action 1 in state 1.
    fn two_action_mdp() -> Mdp {
        let mut mdp = Mdp::new(3, 2);
        mdp.add_outcome(0, 0, 1, 1.0, 1.0).unwrap();
        mdp.add_outcome(0, 1, 2, 0.5, 4.0).unwrap();
        mdp.add_outcome(0, 1, 0, 0.5, 0.0).unwrap();
        mdp.add_outcome(1, 0, 2, 1.0, 2.0).unwrap();
        mdp.add_outcome(1, 1, 0, 1.0, 0.0).unwrap();
        mdp.add_outcome(2, 0, 2, 1.0, 0.0).unwrap();
        mdp.add_outcome(2, 1, 2, 1.0, 0.0).unwrap();
        mdp
    }

    #[test]
    fn evaluation_matches_closed_form() {
        let mdp = two_state_chain();
        let policy = Policy::uniform(2, 1);
        let v = policy_evaluation(&mdp, &policy, 0.5, 1e-6, u32::MAX);

        assert_float_eq!(v[0], 3.0, abs <= 1e-5);
        assert_float_eq!(v[1], 2.0, abs <= 1e-5);
    }

    #[test]
    fn evaluation_with_zero_discount_is_expected_immediate_reward() {
        let mdp = two_action_mdp();
        let policy = Policy::deterministic(2, &[1, 0, 0]);
        let v = policy_evaluation(&mdp, &policy, 0.0, 1e-9, u32::MAX);

        assert_float_eq!(v[0], 2.0, abs <= 1e-8); // 0.5 * 4
        assert_float_eq!(v[1], 2.0, abs <= 1e-8);
        assert_float_eq!(v[2], 0.0, abs <= 1e-8);
    }

    #[test]
    fn evaluation_truncates_at_iteration_budget() {
        let mdp = two_state_chain();
        let policy = Policy::uniform(2, 1);
        let v = policy_evaluation(&mdp, &policy, 0.5, 1e-12, 1);

        // One sweep from zeros: just the immediate rewards.
        assert_float_eq!(v[0], 2.0, abs <= 1e-12);
        assert_float_eq!(v[1], 1.0, abs <= 1e-12);
    }

    #[test]
    fn iteration_finds_the_optimal_policy() {
        let mdp = two_action_mdp();
        let (policy, v) = policy_iteration(&mdp, 0.9, 1e-10, Policy::uniform(3, 2), 100);

        assert_eq!(policy.greedy_action(0), 0);
        assert_eq!(policy.greedy_action(1), 1);
        assert_float_eq!(v[0], 1.0 / 0.19, abs <= 1e-6);
        assert_float_eq!(v[1], 0.9 / 0.19, abs <= 1e-6);
        assert_float_eq!(v[2], 0.0, abs <= 1e-6);
    }

    #[test]
    fn improvement_is_idempotent_at_the_optimum() {
        let mdp = two_action_mdp();
        let (policy, v) = policy_iteration(&mdp, 0.9, 1e-10, Policy::uniform(3, 2), 100);

        let (again, stable) = policy_improvement(&mdp, 0.9, &policy, &v);
        assert!(stable);
        assert_eq!(again, policy);
    }

    #[test]
    fn value_iteration_agrees_with_policy_iteration() {
        let mdp = two_action_mdp();
        let (policy, v_pi) = policy_iteration(&mdp, 0.9, 1e-10, Policy::uniform(3, 2), 100);
        let (actions, v_vi) = value_iteration(&mdp, 0.9, 1e-10, vec![0.0; 3], u32::MAX);

        for s in 0..3 {
            assert_float_eq!(v_vi[s], v_pi[s], abs <= 1e-6);
            assert_eq!(actions[s], policy.greedy_action(s));
        }
    }
}

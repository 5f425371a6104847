//! Temporal-difference prediction
//!
//! All three routines consume completed episodes from an [`EpisodeSource`]
//! and differ only in how far each update looks ahead: one step for TD(0), a
//! truncated n-step return for n-step TD, and a trace-weighted mixture of all
//! lookaheads for backward-view TD(lambda).

use log::trace;
use rand::RngCore;

use crate::assert_interval;
use crate::env::EpisodeSource;
use crate::policy::Policy;

/// TD(0): one-step bootstrap applied forward through each episode
///
/// For every non-terminal index `t`, nudges `v[s_t]` toward
/// `r_t + gamma * v[s_{t+1}]`.
pub fn td_zero<S: EpisodeSource>(
    source: &mut S,
    policy: &Policy,
    initial_v: Vec<f64>,
    gamma: f64,
    alpha: f64,
    num_episodes: u32,
    rng: &mut dyn RngCore,
) -> Vec<f64> {
    assert_interval!(gamma, 0.0, 1.0);
    assert_interval!(alpha, 0.0, 1.0);
    assert_eq!(initial_v.len(), policy.num_states());

    let mut v = initial_v;
    for ep_idx in 0..num_episodes {
        let ep = source.episode(policy, rng);
        for t in 0..ep.len().saturating_sub(1) {
            let s = ep.state(t);
            let sp = ep.state(t + 1);
            v[s] += alpha * (ep.reward(t) + gamma * v[sp] - v[s]);
        }
        trace!("td(0) episode {}: {} entries", ep_idx + 1, ep.len());
    }
    v
}

/// n-step TD with terminal-index correction
///
/// Maintains a pointer `tau` lagging the step counter by `n - 1`, so each
/// state is updated once n steps of future reward have been observed. The
/// lookahead is capped at the true horizon: episodes shorter than `n` fall
/// back to the full observed return with no bootstrap term.
///
/// **Panics** if `n` is zero or a hyperparameter is outside `[0,1]`
#[allow(clippy::too_many_arguments)]
pub fn td_n<S: EpisodeSource>(
    source: &mut S,
    policy: &Policy,
    initial_v: Vec<f64>,
    n: usize,
    gamma: f64,
    alpha: f64,
    num_episodes: u32,
    rng: &mut dyn RngCore,
) -> Vec<f64> {
    assert!(n > 0, "lookahead must be at least one step");
    assert_interval!(gamma, 0.0, 1.0);
    assert_interval!(alpha, 0.0, 1.0);
    assert_eq!(initial_v.len(), policy.num_states());

    let mut v = initial_v;
    for ep_idx in 0..num_episodes {
        let ep = source.episode(policy, rng);
        if ep.len() < 2 {
            continue;
        }
        // Index of the terminal entry.
        let horizon = ep.len() - 1;

        let mut t = 0;
        loop {
            if t + 1 >= n {
                let tau = t + 1 - n;
                let mut g = 0.0;
                for i in tau..usize::min(tau + n, horizon) {
                    g += gamma.powi((i - tau) as i32) * ep.reward(i);
                }
                if tau + n < horizon {
                    g += gamma.powi(n as i32) * v[ep.state(tau + n)];
                }
                let s = ep.state(tau);
                v[s] += alpha * (g - v[s]);

                if tau == horizon - 1 {
                    break;
                }
            }
            t += 1;
        }
        trace!("td({n}) episode {}: {} entries", ep_idx + 1, ep.len());
    }
    v
}

/// Backward-view TD(lambda) with accumulating per-state traces
///
/// The trace vector starts every episode at exactly zero. Each step decays
/// all traces by `gamma * lambda`, bumps the visited state's trace by one,
/// and applies the scalar TD error across the whole value vector scaled by
/// the traces. With `lambda = 0` this degenerates to [`td_zero`].
#[allow(clippy::too_many_arguments)]
pub fn td_lambda<S: EpisodeSource>(
    source: &mut S,
    policy: &Policy,
    initial_v: Vec<f64>,
    lambda: f64,
    gamma: f64,
    alpha: f64,
    num_episodes: u32,
    rng: &mut dyn RngCore,
) -> Vec<f64> {
    assert_interval!(lambda, 0.0, 1.0);
    assert_interval!(gamma, 0.0, 1.0);
    assert_interval!(alpha, 0.0, 1.0);
    assert_eq!(initial_v.len(), policy.num_states());

    let mut v = initial_v;
    for ep_idx in 0..num_episodes {
        let ep = source.episode(policy, rng);
        let mut traces = vec![0.0; v.len()];

        for t in 0..ep.len().saturating_sub(1) {
            let s = ep.state(t);
            let sp = ep.state(t + 1);
            let delta = ep.reward(t) + gamma * v[sp] - v[s];

            for e in traces.iter_mut() {
                *e *= gamma * lambda;
            }
            traces[s] += 1.0;
            for (value, e) in v.iter_mut().zip(&traces) {
                *value += alpha * delta * e;
            }
        }
        trace!("td(lambda) episode {}: {} entries", ep_idx + 1, ep.len());
    }
    v
}

/// Dynamic programming over a full model: policy evaluation, policy
/// improvement, policy iteration, value iteration
pub mod dp;

/// Monte Carlo methods: every-visit prediction and exploring-starts control
pub mod mc;

/// Off-policy control: Q-learning and double Q-learning
pub mod q;

/// On-policy control: SARSA and SARSA(lambda)
pub mod sarsa;

/// Temporal-difference prediction: TD(0), n-step TD, and TD(lambda)
pub mod td;

/// Implemented RL algorithms
pub mod algo;

/// Episodes produced by episode sources
pub mod episode;

/// Environment contracts
pub mod env;

/// Exploration policies
pub mod exploration;

/// Finite Markov decision process model
pub mod mdp;

/// Tabular policies
pub mod policy;

/// Model-backed environment simulation
pub mod sim;

/// Step-size strategies
pub mod step_size;

/// Action-value tables
pub mod table;

mod util;

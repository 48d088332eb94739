pub mod automaton;
pub mod mcmc;
pub mod version;

pub mod agent;
pub mod provider;
pub mod tooling;

//! picktrack — analyst pick performance tracker and portfolio simulator.
//!
//! Hexagonal architecture: calculation logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;

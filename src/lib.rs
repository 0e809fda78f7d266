//! Command-line front end for the Thai lottery draw registry.

pub mod bench;
pub mod cli;

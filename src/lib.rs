mod algorithm;
pub mod common;
pub mod config;
pub mod distribution;
pub mod dynamics;
pub mod graph;
pub mod oracle;
pub mod scenario;
pub mod solver;
pub mod stat;

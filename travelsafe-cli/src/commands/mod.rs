//! CLI command implementations.

pub mod common;
pub mod config;
pub mod hazards;
pub mod passcode;
pub mod route;
pub mod run;
pub mod search;

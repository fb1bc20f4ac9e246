//! mobilehub-cli
//!
//! Project configuration, AWS credential resolution, and command dispatch
//! for the `mobilehub` binary.

pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;

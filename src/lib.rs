//! varitree: a tree of explored chess lines with a movable cursor
//!
//! Layers, innermost first:
//! - [`domain`]: the variation tree, cursor navigation and the tree builder
//! - [`application`]: the analysis session and its script commands
//! - [`infrastructure`]: the shakmaty rules adapter and service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod render;
pub mod util;

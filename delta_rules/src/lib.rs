//! # Delta Rules
//!
//! The rulebook crate - the player record, scoring arithmetic, answer matching
//! and game configuration. This crate is the single source of truth for what a
//! valid progression state looks like and does not drive any interaction.

pub mod config;
pub mod error;
pub mod mechanics;
pub mod progress;

pub use config::*;
pub use error::*;
pub use mechanics::*;
pub use progress::*;

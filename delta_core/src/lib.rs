//! # Delta Core
//!
//! The engine of the layered puzzle game. This crate reads and writes player
//! records through `delta_rules`, holds the table of challenges indexed by
//! layer, and drives the present / verify / reward cycle for one operator.
//!
//! ## Core Components
//!
//! - **challenge**: The `Challenge` contract, the layer table and every puzzle
//! - **store**: Durable mapping from player handle to progression state
//! - **runner**: The per-layer state machine and the terminal session loop
//! - **form**: Round-based adapter for form-submission front-ends
//! - **events**: Log events written at layer boundaries
//! - **twin**: Flavour voice whose tone follows the player's divergence
//!
//! ## Design Philosophy
//!
//! - **Commit at boundaries**: Progress is written once per resolved layer, never mid-challenge
//! - **Table-driven**: Which challenge runs at layer K is a lookup, not a chain of conditionals
//! - **Injectable noise**: Every random draw goes through a caller-supplied `RngCore`

pub mod challenge;
pub mod events;
pub mod form;
pub mod runner;
pub mod store;
pub mod twin;

pub use challenge::*;
pub use events::*;
pub use form::*;
pub use runner::*;
pub use store::*;
pub use twin::*;

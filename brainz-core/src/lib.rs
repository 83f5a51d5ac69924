//! # brainz Core Library
//!
//! Game-agnostic decision-making for NPCs living on a 2-D tile grid.
//!
//! Every agent owns one brain and, each tick, turns a [`Perception`] into an
//! [`Action`], then learns from the resulting [`Outcome`]:
//!
//! - **Rule-based** ([`BehaviorTreeBrain`]): fixed-priority need arbitration
//!   backed by a spatial memory of food, shelter, and danger.
//! - **Vector** ([`NeuralBrain`]): attention over an episodic buffer, a
//!   policy distribution reshaped by a valence/arousal/dominance mood,
//!   reward-driven mood adaptation, and learned relationship embeddings.
//!
//! Both brains route with the same bounded 8-connected A* ([`pathfinding`])
//! and never fail during a decision: missing targets degrade to exploring,
//! idling, or resting in place.
//!
//! ## Performance Contract
//!
//! All decision-time operations are synchronous and allocation-light:
//! - A* search: bounded by `max_expansions` node pops
//! - Memory decay pass: linear in stored memories
//! - One decision (either brain): well under a millisecond on a 200×150 grid

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod brain;
pub mod config;
pub mod emotion;
pub mod error;
pub mod inference;
pub mod memory;
pub mod needs;
pub mod pathfinding;
pub mod perception;
pub mod persistence;
pub mod social;
pub mod types;
pub mod world;

pub use action::{Action, ActionKind, Outcome};
pub use brain::{AgentBrain, BehaviorTreeBrain, Brain, BrainKind, BrainState, NeuralBrain};
pub use config::BrainzConfig;
pub use error::BrainzError;
pub use needs::{NeedKind, Needs};
pub use perception::{Perception, Weather};
pub use types::*;
pub use world::{GridView, TerrainKind, Tile, TileGrid};

//! # brainz-sim: Tile-World Host for brainz
//!
//! This crate provides the integration layer between the game-agnostic
//! `brainz-core` library and a concrete tile world: it owns agents, turns
//! world state into perceptions, applies chosen actions back to the world,
//! and records every decision.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Simulation                 │
//! │  ┌───────────────────────────────────┐  │
//! │  │  ┌─────────────┐ ┌─────────────┐  │  │
//! │  │  │ Components  │ │   Systems   │  │  │
//! │  │  └──────┬──────┘ └──────┬──────┘  │  │
//! │  │         ▼               ▼         │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │      brainz-core        │    │  │
//! │  │    └─────────────────────────┘    │  │
//! │  └───────────────────────────────────┘  │
//! │        DecisionRecord / SimEvent        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components`: agents and their mood
//! - `systems`: perception, action execution, the per-tick step
//! - `events`: decision records and world events
//! - `simulation`: a ready-made world loop
//! - `config`: host tuning and shared world conditions
//! - `logging`: tracing subscriber setup

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod simulation;
pub mod systems;

pub use components::{Agent, Mood};
pub use config::{Environment, SimConfig};
pub use error::SimError;
pub use events::{DecisionRecord, SimEvent};
pub use simulation::Simulation;

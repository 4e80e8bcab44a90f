//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The host loop drives it through [`GameEngine`] and reacts to the [`Signal`]s it returns.

pub mod config;
pub mod direction;
pub mod engine;
pub mod rng;
pub mod state;

// Re-export commonly used types
pub use config::{GRID_HEIGHT, GRID_WIDTH, GameConfig};
pub use direction::Direction;
pub use engine::{GameEngine, START_DIRECTION, Signal, StepInfo, StepResult};
pub use rng::{RandomSource, ScriptedSource};
pub use state::{CollisionType, EndReason, GameState, GameStatus, Position, Snake};

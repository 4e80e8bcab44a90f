//! Snake Arcade - the classic snake game in the terminal
//!
//! This library provides:
//! - Core game logic with an injected random source (game module)
//! - Sound sinks reacting to game signals (audio module)
//! - Keyboard mapping (input module) and TUI rendering (render module)
//! - Per-session statistics (metrics module)
//! - The interactive host loop (modes module)

pub mod audio;
pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;

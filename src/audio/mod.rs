//! Sound side of the game
//!
//! The engine only reports [`Signal`]s; a sink decides what, if anything, to
//! play for them. Sinks must return immediately.

pub mod sink;

pub use sink::{AudioSink, Muted, TerminalBell};

pub mod renderer;

pub use renderer::{CellKind, Renderer};

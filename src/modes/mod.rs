pub mod clock;
pub mod play;

pub use clock::TickClock;
pub use play::PlayMode;

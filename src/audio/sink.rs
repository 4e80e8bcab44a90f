use std::io::Write;

use tracing::warn;

use crate::game::Signal;

/// Something that reacts to game signals with sound
pub trait AudioSink {
    fn play(&mut self, signal: Signal);
}

/// Discards every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl AudioSink for Muted {
    fn play(&mut self, _signal: Signal) {}
}

/// Rings the terminal bell
///
/// Both eating and collisions ring; the eat chime can be switched off.
pub struct TerminalBell<W: Write> {
    out: W,
    chime_on_eat: bool,
}

impl TerminalBell<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            chime_on_eat: true,
        }
    }

    /// Keep quiet on eating, ring on collisions only
    pub fn without_eat_chime(mut self) -> Self {
        self.chime_on_eat = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, signal: Signal) {
        let ring = match signal {
            Signal::Collision => true,
            Signal::Eat => self.chime_on_eat,
        };
        if !ring {
            return;
        }
        if let Err(err) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            warn!(?signal, "failed to ring terminal bell: {err}");
        }
    }
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn play(&mut self, signal: Signal) {
        (**self).play(signal)
    }
}

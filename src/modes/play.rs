use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::{interval, sleep_until};
use tracing::{debug, info};

use super::clock::TickClock;
use crate::audio::AudioSink;
use crate::game::{GameEngine, RandomSource};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Render at roughly 30 FPS, independent of the game speed
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Interactive game in the terminal
pub struct PlayMode<A: AudioSink, R: RandomSource> {
    engine: GameEngine<R>,
    audio: A,
    clock: TickClock,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl<A: AudioSink, R: RandomSource> PlayMode<A, R> {
    pub fn new(engine: GameEngine<R>, audio: A) -> Self {
        Self {
            engine,
            audio,
            clock: TickClock::new(Instant::now()),
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        info!(
            width = self.engine.config().grid_width,
            height = self.engine.config().grid_height,
            "starting game"
        );
        let result = self.run_game_loop(&mut terminal).await;

        // Restore the terminal even when the loop failed
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut render_timer = interval(FRAME_INTERVAL);
        self.clock.restart(Instant::now());

        while !self.should_quit {
            let deadline =
                tokio::time::Instant::from_std(self.clock.deadline(self.engine.tick_interval()));

            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                _ = sleep_until(deadline) => {
                    self.on_clock(Instant::now());
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.engine.state(), &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }
        }

        info!(
            games = self.metrics.games_played,
            best = self.metrics.best_score,
            "leaving game"
        );
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            let action = self.input_handler.handle_key_event(key);
            self.apply(action, Instant::now());
        }
    }

    fn apply(&mut self, action: KeyAction, now: Instant) {
        match action {
            KeyAction::Steer(direction) => self.engine.handle_input(direction),
            KeyAction::Restart => self.restart(now),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    /// Tick the engine if its interval has elapsed
    fn on_clock(&mut self, now: Instant) {
        if !self.clock.is_due(now, self.engine.tick_interval()) {
            return;
        }
        self.clock.restart(now);

        let was_running = self.engine.status().is_running();
        let result = self.engine.tick();

        if let Some(signal) = result.signal() {
            self.audio.play(signal);
        }
        if was_running && result.terminated {
            self.metrics.on_game_over(self.engine.state().score);
        }
    }

    fn restart(&mut self, now: Instant) {
        debug!(score = self.engine.state().score, "restart requested");
        self.engine.reset();
        self.metrics.on_game_start();
        self.clock.restart(now);
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

use std::time::{Duration, Instant};

/// Tracks when the engine last ticked
///
/// The host asks whether a tick is due against whatever interval the engine
/// reports at that moment, so a speed-up takes effect on the very next tick.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    last_tick: Instant,
}

impl TickClock {
    pub fn new(now: Instant) -> Self {
        Self { last_tick: now }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_tick)
    }

    pub fn is_due(&self, now: Instant, interval: Duration) -> bool {
        self.elapsed(now) >= interval
    }

    /// When the next tick should fire
    pub fn deadline(&self, interval: Duration) -> Instant {
        self.last_tick + interval
    }

    pub fn restart(&mut self, now: Instant) {
        self.last_tick = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_after_interval() {
        let start = Instant::now();
        let clock = TickClock::new(start);
        let interval = Duration::from_millis(150);

        assert!(!clock.is_due(start, interval));
        assert!(!clock.is_due(start + Duration::from_millis(149), interval));
        assert!(clock.is_due(start + interval, interval));
        assert_eq!(clock.deadline(interval), start + interval);
    }

    #[test]
    fn test_restart_moves_deadline() {
        let start = Instant::now();
        let mut clock = TickClock::new(start);
        let later = start + Duration::from_millis(200);

        clock.restart(later);

        assert_eq!(clock.elapsed(later), Duration::ZERO);
        assert_eq!(
            clock.deadline(Duration::from_millis(50)),
            later + Duration::from_millis(50)
        );
    }

    #[test]
    fn test_time_before_last_tick_counts_as_zero() {
        let start = Instant::now();
        let clock = TickClock::new(start + Duration::from_secs(1));
        assert_eq!(clock.elapsed(start), Duration::ZERO);
    }
}

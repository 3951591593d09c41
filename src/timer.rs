//! Interval timing on top of a free-running millisecond counter.

/// Point on a wrapping millisecond timeline.
pub type Instant = fugit::TimerInstantU32<1_000>;
/// Millisecond interval.
pub type Duration = fugit::MillisDurationU32;

/// Free-running millisecond counter. Wraps around at `u32::MAX`.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Detects that a configured interval has elapsed since the last reset.
pub trait IntervalTimer {
    /// Change the interval. The elapsed-time baseline is left alone.
    fn set_timeout(&mut self, duration: Duration);

    /// Restart the elapsed-time baseline from now.
    fn reset(&mut self);

    fn has_timed_out(&self) -> bool;
}

/// [`IntervalTimer`] driven by a [`Clock`].
#[derive(Debug, Clone)]
pub struct Timeout<C> {
    clock: C,
    start: Instant,
    duration: Duration,
}

impl<C: Clock> Timeout<C> {
    pub fn new(clock: C) -> Self {
        let start = clock.now();
        Self {
            clock,
            start,
            duration: Duration::from_ticks(0),
        }
    }

    /// The interval currently armed.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time since the last reset, correct across one counter roll-over.
    pub fn elapsed(&self) -> Duration {
        self.clock
            .now()
            .checked_duration_since(self.start)
            .unwrap_or(Duration::from_ticks(0))
    }
}

impl<C: Clock> IntervalTimer for Timeout<C> {
    fn set_timeout(&mut self, duration: Duration) {
        self.duration = duration;
    }

    fn reset(&mut self) {
        self.start = self.clock.now();
    }

    fn has_timed_out(&self) -> bool {
        self.elapsed() >= self.duration
    }
}

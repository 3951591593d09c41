//! RP2040 backend.

use rp2040_hal::timer::Timer;

use crate::timer::{Clock, Instant};

/// Millisecond [`Clock`] over the RP2040 64-bit microsecond timer.
#[derive(Clone, Copy)]
pub struct TimerClock<'a> {
    timer: &'a Timer,
}

impl<'a> TimerClock<'a> {
    pub fn new(timer: &'a Timer) -> Self {
        Self { timer }
    }
}

impl Clock for TimerClock<'_> {
    fn now(&self) -> Instant {
        let millis = self.timer.get_counter().duration_since_epoch().to_millis();
        // the millisecond timeline wraps at u32::MAX
        Instant::from_ticks(millis as u32)
    }
}

use heapless::Vec;

use crate::random::{EntropySource, RandomSource, XorShift32};
use crate::timer::{Duration, IntervalTimer};
use crate::trace::{NoTrace, Trace, TraceEvent};
use crate::{Level, PinId};

/// Draws are taken from `[0, PROBA_RANGE)`.
const PROBA_RANGE: u32 = 100;

/// Receives the level the engine wants on its pins whenever it toggles.
pub trait ApplyLevel {
    type Error;

    fn apply_level(&mut self, pins: &[PinId], level: Level) -> Result<(), Self::Error>;

    /// Make `pins` usable as outputs and drive them to `level`.
    fn init_pins(&mut self, pins: &[PinId], level: Level) -> Result<(), Self::Error> {
        self.apply_level(pins, level)
    }
}

/// Timing and probability state machine behind a blinking output.
///
/// The engine has no notion of hardware. Each time the armed interval
/// elapses it runs one activation trial and, when the trial succeeds, flips
/// its state and hands the new level to its [`ApplyLevel`] output. The
/// delay cursor advances on every elapsed interval whether or not the trial
/// succeeded, so one pass over the delay cycle always takes the same time.
///
/// `PINS` and `DELAYS` size the pin and delay storage. Entries beyond them
/// are dropped.
#[derive(Debug, Clone)]
pub struct BlinkEngine<O, T, const PINS: usize, const DELAYS: usize, R = XorShift32, D = NoTrace> {
    pins: Vec<PinId, PINS>,
    delays: Vec<u32, DELAYS>,
    delay_index: usize,
    delay_multiplier: f32,
    is_on: bool,
    start_level: Level,
    second_level: Level,
    proba: u32,
    output: O,
    timer: T,
    rng: R,
    trace: D,
}

fn owned<const N: usize>(items: &[u32], what: &str) -> Vec<u32, N> {
    let mut owned = Vec::new();
    owned.extend(items.iter().copied().take(N));
    assert!(!owned.is_empty(), "{} must not be empty", what);
    owned
}

fn scaled(delay: u32, multiplier: f32) -> Duration {
    Duration::from_ticks((delay as f32 * multiplier) as u32)
}

impl<O, T, const PINS: usize, const DELAYS: usize> BlinkEngine<O, T, PINS, DELAYS>
where
    O: ApplyLevel,
    T: IntervalTimer,
{
    /// One pin, one delay repeated forever.
    pub fn new(pin: PinId, delay: u32, proba: u32, output: O, timer: T) -> Self {
        Self::with_pins(&[pin], &[delay], proba, output, timer)
    }

    /// One pin, cycling through `delays`.
    ///
    /// # Panics
    ///
    /// If `delays` is empty.
    pub fn with_delays(pin: PinId, delays: &[u32], proba: u32, output: O, timer: T) -> Self {
        Self::with_pins(&[pin], delays, proba, output, timer)
    }

    /// Several pins blinking in unison, cycling through `delays`.
    ///
    /// # Panics
    ///
    /// If `pins` or `delays` is empty.
    pub fn with_pins(pins: &[PinId], delays: &[u32], proba: u32, output: O, timer: T) -> Self {
        Self {
            pins: owned(pins, "pins"),
            delays: owned(delays, "delays"),
            delay_index: 0,
            delay_multiplier: 1.0,
            is_on: false,
            start_level: Level::High,
            second_level: Level::Low,
            proba,
            output,
            timer,
            rng: XorShift32::default(),
            trace: NoTrace,
        }
    }
}

impl<O, T, const PINS: usize, const DELAYS: usize, R, D> BlinkEngine<O, T, PINS, DELAYS, R, D>
where
    O: ApplyLevel,
    T: IntervalTimer,
    R: RandomSource,
    D: Trace,
{
    /// Replace the random source used for the activation trials.
    pub fn with_random<R2: RandomSource>(self, rng: R2) -> BlinkEngine<O, T, PINS, DELAYS, R2, D> {
        BlinkEngine {
            pins: self.pins,
            delays: self.delays,
            delay_index: self.delay_index,
            delay_multiplier: self.delay_multiplier,
            is_on: self.is_on,
            start_level: self.start_level,
            second_level: self.second_level,
            proba: self.proba,
            output: self.output,
            timer: self.timer,
            rng,
            trace: self.trace,
        }
    }

    /// Attach a diagnostic sink.
    pub fn with_trace<D2: Trace>(self, trace: D2) -> BlinkEngine<O, T, PINS, DELAYS, R, D2> {
        BlinkEngine {
            pins: self.pins,
            delays: self.delays,
            delay_index: self.delay_index,
            delay_multiplier: self.delay_multiplier,
            is_on: self.is_on,
            start_level: self.start_level,
            second_level: self.second_level,
            proba: self.proba,
            output: self.output,
            timer: self.timer,
            rng: self.rng,
            trace,
        }
    }

    /// Arm the timer with the first delay and seed the random source.
    ///
    /// Call once before the first [`update`](Self::update).
    pub fn begin<E: EntropySource>(&mut self, entropy: &mut E) {
        self.timer.set_timeout(Duration::from_ticks(self.delays[0]));
        self.timer.reset();
        self.rng.seed(entropy.read_entropy());

        self.trace.record(&TraceEvent::Pins(&self.pins));
        self.trace.record(&TraceEvent::Delays(&self.delays));
    }

    /// Poll the engine. Never blocks.
    ///
    /// Returns the level that was applied when the state toggled. An output
    /// error is reported only after the timer has been re-armed, so a failing
    /// write does not stall the cycle.
    pub fn update(&mut self) -> Result<Option<Level>, O::Error> {
        if !self.timer.has_timed_out() {
            return Ok(None);
        }

        let mut toggled = None;
        let mut applied = Ok(());
        if self.rng.random_below(PROBA_RANGE) < self.proba {
            self.is_on = !self.is_on;
            let level = self.active_level();
            for &pin in self.pins.iter() {
                self.trace.record(&TraceEvent::PinLevel { pin, level });
            }
            applied = self.output.apply_level(&self.pins, level);
            toggled = Some(level);
        }

        self.delay_index += 1;
        if self.delay_index == self.delays.len() {
            self.delay_index = 0;
        }

        let timeout = scaled(self.delays[self.delay_index], self.delay_multiplier);
        self.trace.record(&TraceEvent::DelayNumber(self.delay_index));
        self.trace.record(&TraceEvent::DelayValue(timeout.ticks()));

        self.timer.set_timeout(timeout);
        self.timer.reset();

        applied.map(|()| toggled)
    }

    /// Set every pin up as an output at the start level.
    pub fn init_outputs(&mut self) -> Result<(), O::Error> {
        self.trace.record(&TraceEvent::SettingPinModes);
        self.output.init_pins(&self.pins, self.start_level)
    }

    /// Hand `level` to the output for every pin, bypassing timer and trials.
    pub fn force_level(&mut self, level: Level) -> Result<(), O::Error> {
        self.output.apply_level(&self.pins, level)
    }

    /// `second_level` while on, `start_level` while off.
    pub fn active_level(&self) -> Level {
        if self.is_on {
            self.second_level
        } else {
            self.start_level
        }
    }

    /// Scale applied from the next re-arm on. The running interval keeps
    /// its duration.
    pub fn set_delay_multiplier(&mut self, delay_multiplier: f32) {
        self.delay_multiplier = delay_multiplier;
    }

    /// Chance in percent that an elapsed interval toggles the output.
    /// Values above 100 always toggle.
    pub fn set_blink_proba(&mut self, proba: u32) {
        self.proba = proba;
    }

    /// Levels for the off and on states, for active-low or active-high wiring.
    pub fn set_levels(&mut self, start_level: Level, second_level: Level) {
        self.start_level = start_level;
        self.second_level = second_level;
    }

    /// Swap in a new delay cycle, starting over at its first entry on the
    /// next re-arm.
    ///
    /// # Panics
    ///
    /// If `delays` is empty.
    pub fn set_delays(&mut self, delays: &[u32]) {
        self.delays = owned(delays, "delays");
        self.delay_index = 0;
    }

    /// The pins driven together, in the order they were given.
    pub fn pins(&self) -> &[PinId] {
        &self.pins
    }

    /// The delay cycle in milliseconds, before scaling.
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Position in the delay cycle of the interval currently armed.
    pub fn delay_index(&self) -> usize {
        self.delay_index
    }

    /// Scale applied to each delay when it is armed.
    pub fn delay_multiplier(&self) -> f32 {
        self.delay_multiplier
    }

    /// Toggle chance in percent.
    pub fn blink_proba(&self) -> u32 {
        self.proba
    }

    /// Whether the output currently sits at the second level.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Level while off, and the level `init_outputs` drives.
    pub fn start_level(&self) -> Level {
        self.start_level
    }

    /// Level while on.
    pub fn second_level(&self) -> Level {
        self.second_level
    }

    /// The interval timer, armed with the running delay.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The output the levels are handed to.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Direct access to the output, e.g. to reach the GPIO behind it.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// The random source behind the activation trials.
    pub fn random(&self) -> &R {
        &self.rng
    }

    /// The diagnostic sink, to read back what a buffering sink collected.
    pub fn trace(&self) -> &D {
        &self.trace
    }
}

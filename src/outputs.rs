//! Binding of a [`BlinkEngine`] to physical output pins.

use core::fmt;

use embedded_hal::digital::v2::OutputPin;
use heapless::Vec;

use crate::engine::{ApplyLevel, BlinkEngine};
use crate::random::{EntropySource, RandomSource, XorShift32};
use crate::timer::IntervalTimer;
use crate::trace::{NoTrace, Trace};
use crate::{Level, PinId};

/// Platform GPIO addressed by pin number.
pub trait Gpio {
    type Error;

    /// Put `pin` in output mode.
    fn set_output(&mut self, pin: PinId) -> Result<(), Self::Error>;

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error>;
}

impl<G: Gpio + ?Sized> Gpio for &mut G {
    type Error = G::Error;

    fn set_output(&mut self, pin: PinId) -> Result<(), Self::Error> {
        (**self).set_output(pin)
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error> {
        (**self).write(pin, level)
    }
}

/// [`ApplyLevel`] that writes the level to every engine pin through a [`Gpio`].
#[derive(Debug, Clone)]
pub struct GpioOutput<G> {
    gpio: G,
}

impl<G: Gpio> GpioOutput<G> {
    pub fn new(gpio: G) -> Self {
        Self { gpio }
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }
}

impl<G: Gpio> ApplyLevel for GpioOutput<G> {
    type Error = G::Error;

    fn apply_level(&mut self, pins: &[PinId], level: Level) -> Result<(), G::Error> {
        for &pin in pins {
            self.gpio.write(pin, level)?;
        }
        Ok(())
    }

    fn init_pins(&mut self, pins: &[PinId], level: Level) -> Result<(), G::Error> {
        for &pin in pins {
            self.gpio.set_output(pin)?;
            self.gpio.write(pin, level)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalPinError<E> {
    /// No pin was registered under this number.
    UnknownPin(PinId),
    Pin(E),
}

impl<E: fmt::Debug> fmt::Display for HalPinError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalPinError::UnknownPin(pin) => write!(f, "no output registered for pin {}", pin),
            HalPinError::Pin(e) => write!(f, "pin write failed: {:?}", e),
        }
    }
}

/// [`Gpio`] over embedded-hal output pins, each registered under a number.
///
/// The pins are already in output mode by type, so `set_output` only checks
/// that the number is known.
pub struct HalPins<P, const N: usize> {
    pins: Vec<(PinId, P), N>,
}

impl<P: OutputPin, const N: usize> HalPins<P, N> {
    pub fn new() -> Self {
        Self { pins: Vec::new() }
    }

    /// Register `pin` under `id`. Hands the pin back when full.
    pub fn insert(&mut self, id: PinId, pin: P) -> Result<(), P> {
        self.pins.push((id, pin)).map_err(|(_, pin)| pin)
    }

    fn find(&mut self, id: PinId) -> Result<&mut P, HalPinError<P::Error>> {
        self.pins
            .iter_mut()
            .find(|(pin_id, _)| *pin_id == id)
            .map(|(_, pin)| pin)
            .ok_or(HalPinError::UnknownPin(id))
    }

    /// Give back the registered pins.
    pub fn release(self) -> Vec<(PinId, P), N> {
        self.pins
    }
}

impl<P: OutputPin, const N: usize> Default for HalPins<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin, const N: usize> Gpio for HalPins<P, N> {
    type Error = HalPinError<P::Error>;

    fn set_output(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.find(pin).map(|_| ())
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error> {
        self.find(pin)?
            .set_state(level.into())
            .map_err(HalPinError::Pin)
    }
}

/// A [`BlinkEngine`] driving GPIO pins.
///
/// Holds at most `PINS` pins and `DELAYS` delays; see [`BlinkEngine`].
#[derive(Debug, Clone)]
pub struct PinOutputs<G, T, const PINS: usize, const DELAYS: usize, R = XorShift32, D = NoTrace> {
    engine: BlinkEngine<GpioOutput<G>, T, PINS, DELAYS, R, D>,
}

impl<G, T, const PINS: usize, const DELAYS: usize> PinOutputs<G, T, PINS, DELAYS>
where
    G: Gpio,
    T: IntervalTimer,
{
    pub fn new(pin: PinId, delay: u32, proba: u32, gpio: G, timer: T) -> Self {
        Self {
            engine: BlinkEngine::new(pin, delay, proba, GpioOutput::new(gpio), timer),
        }
    }

    pub fn with_delays(pin: PinId, delays: &[u32], proba: u32, gpio: G, timer: T) -> Self {
        Self {
            engine: BlinkEngine::with_delays(pin, delays, proba, GpioOutput::new(gpio), timer),
        }
    }

    pub fn with_pins(pins: &[PinId], delays: &[u32], proba: u32, gpio: G, timer: T) -> Self {
        Self {
            engine: BlinkEngine::with_pins(pins, delays, proba, GpioOutput::new(gpio), timer),
        }
    }
}

impl<G, T, const PINS: usize, const DELAYS: usize, R, D> PinOutputs<G, T, PINS, DELAYS, R, D>
where
    G: Gpio,
    T: IntervalTimer,
    R: RandomSource,
    D: Trace,
{
    pub fn with_random<R2: RandomSource>(self, rng: R2) -> PinOutputs<G, T, PINS, DELAYS, R2, D> {
        PinOutputs {
            engine: self.engine.with_random(rng),
        }
    }

    pub fn with_trace<D2: Trace>(self, trace: D2) -> PinOutputs<G, T, PINS, DELAYS, R, D2> {
        PinOutputs {
            engine: self.engine.with_trace(trace),
        }
    }

    /// Switch every pin to output at the start level, then arm the engine.
    pub fn begin<E: EntropySource>(&mut self, entropy: &mut E) -> Result<(), G::Error> {
        self.engine.init_outputs()?;
        self.engine.begin(entropy);
        Ok(())
    }

    pub fn update(&mut self) -> Result<Option<Level>, G::Error> {
        self.engine.update()
    }

    /// Drive every pin to `level` right away, outside the blink schedule.
    /// The engine state is left untouched.
    pub fn set_pins(&mut self, level: Level) -> Result<(), G::Error> {
        self.engine.force_level(level)
    }

    pub fn set_delay_multiplier(&mut self, delay_multiplier: f32) {
        self.engine.set_delay_multiplier(delay_multiplier);
    }

    pub fn set_blink_proba(&mut self, proba: u32) {
        self.engine.set_blink_proba(proba);
    }

    pub fn set_levels(&mut self, start_level: Level, second_level: Level) {
        self.engine.set_levels(start_level, second_level);
    }

    pub fn active_level(&self) -> Level {
        self.engine.active_level()
    }

    pub fn engine(&self) -> &BlinkEngine<GpioOutput<G>, T, PINS, DELAYS, R, D> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut BlinkEngine<GpioOutput<G>, T, PINS, DELAYS, R, D> {
        &mut self.engine
    }

    pub fn gpio(&self) -> &G {
        self.engine.output().gpio()
    }
}

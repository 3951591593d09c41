//! Timed, optionally probabilistic blinking of digital outputs.
//!
//! A [`BlinkEngine`] walks a cyclic list of delays. Every time the current
//! delay elapses it runs a weighted coin flip and, on success, toggles its
//! output between two levels. [`PinOutputs`] binds the engine to GPIO pins.
//!
//! Nothing here blocks: call `update` from the main loop as often as
//! possible, alongside whatever else the firmware does.
//!
//! ```
//! use core::cell::Cell;
//! use core::convert::Infallible;
//! use blink_pin::{Clock, FixedEntropy, Gpio, Instant, Level, PinId, PinOutputs, Timeout};
//!
//! struct Ticker(Cell<u32>);
//!
//! impl Clock for Ticker {
//!     fn now(&self) -> Instant {
//!         Instant::from_ticks(self.0.get())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Port([bool; 32]);
//!
//! impl Gpio for Port {
//!     type Error = Infallible;
//!
//!     fn set_output(&mut self, _pin: PinId) -> Result<(), Infallible> {
//!         Ok(())
//!     }
//!
//!     fn write(&mut self, pin: PinId, level: Level) -> Result<(), Infallible> {
//!         self.0[pin as usize] = level.is_high();
//!         Ok(())
//!     }
//! }
//!
//! // one pin, up to four delays
//! type Led<'a> = PinOutputs<Port, Timeout<&'a Ticker>, 1, 4>;
//!
//! let millis = Ticker(Cell::new(0));
//! let mut led = Led::with_delays(5, &[50, 150, 300], 100, Port::default(), Timeout::new(&millis));
//! led.begin(&mut FixedEntropy(42)).unwrap();
//! assert!(led.gpio().0[5]);
//!
//! millis.0.set(50);
//! assert_eq!(led.update().unwrap(), Some(Level::Low));
//! assert!(!led.gpio().0[5]);
//! ```
#![no_std]

pub mod engine;
pub mod level;
pub mod outputs;
pub mod random;
#[cfg(feature = "rp2040")]
pub mod rp2040;
pub mod timer;
pub mod trace;

/// Pin number as understood by the platform [`Gpio`].
pub type PinId = u32;

pub use engine::{ApplyLevel, BlinkEngine};
pub use level::Level;
pub use outputs::{Gpio, GpioOutput, HalPinError, HalPins, PinOutputs};
pub use random::{AnalogEntropy, EntropySource, FixedEntropy, RandomSource, XorShift32};
pub use timer::{Clock, Duration, Instant, IntervalTimer, Timeout};
#[cfg(feature = "defmt")]
pub use trace::DefmtTrace;
pub use trace::{FmtTrace, NoTrace, Trace, TraceEvent};

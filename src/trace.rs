//! Diagnostic tracing of the blink state machine.
//!
//! Tracing only observes. Nothing recorded here feeds back into timing or
//! the activation trials.

use core::fmt;

use crate::{Level, PinId};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TraceEvent<'a> {
    SettingPinModes,
    Pins(&'a [PinId]),
    Delays(&'a [u32]),
    /// Cursor position after the advance.
    DelayNumber(usize),
    /// Duration the timer was re-armed with.
    DelayValue(u32),
    PinLevel { pin: PinId, level: Level },
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Blink] ")?;
        match self {
            TraceEvent::SettingPinModes => f.write_str("Setting pin modes."),
            TraceEvent::Pins(pins) => {
                f.write_str("Pins:")?;
                for pin in pins.iter() {
                    write!(f, " {}", pin)?;
                }
                Ok(())
            }
            TraceEvent::Delays(delays) => {
                f.write_str("Delays:")?;
                for delay in delays.iter() {
                    write!(f, " {}", delay)?;
                }
                Ok(())
            }
            TraceEvent::DelayNumber(index) => write!(f, "Delay Number: {}", index),
            TraceEvent::DelayValue(value) => write!(f, "Delay Value: {}", value),
            TraceEvent::PinLevel { pin, level } => {
                write!(f, "Pin: {}    Level: {}", pin, u8::from(*level))
            }
        }
    }
}

pub trait Trace {
    fn record(&mut self, event: &TraceEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl Trace for NoTrace {
    #[inline(always)]
    fn record(&mut self, _event: &TraceEvent<'_>) {}
}

/// Writes one line per event to a [`fmt::Write`] sink, e.g. a serial port.
#[derive(Debug, Default, Clone)]
pub struct FmtTrace<W> {
    writer: W,
}

impl<W: fmt::Write> FmtTrace<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: fmt::Write> Trace for FmtTrace<W> {
    fn record(&mut self, event: &TraceEvent<'_>) {
        // a full or broken sink must not disturb the blink
        let _ = writeln!(self.writer, "{}", event);
    }
}

/// Forwards events to the `defmt` logger at debug level.
#[cfg(feature = "defmt")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DefmtTrace;

#[cfg(feature = "defmt")]
impl Trace for DefmtTrace {
    fn record(&mut self, event: &TraceEvent<'_>) {
        defmt::debug!("{}", event);
    }
}

impl<T: Trace + ?Sized> Trace for &mut T {
    fn record(&mut self, event: &TraceEvent<'_>) {
        (**self).record(event)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::String;

    use super::*;

    #[test]
    fn renders_lines() {
        let mut trace = FmtTrace::new(String::new());
        trace.record(&TraceEvent::Pins(&[5, 6]));
        trace.record(&TraceEvent::Delays(&[50, 150]));
        trace.record(&TraceEvent::DelayNumber(1));
        trace.record(&TraceEvent::DelayValue(150));
        trace.record(&TraceEvent::PinLevel {
            pin: 5,
            level: Level::High,
        });
        trace.record(&TraceEvent::SettingPinModes);

        assert_eq!(
            trace.into_inner(),
            "[Blink] Pins: 5 6\n\
             [Blink] Delays: 50 150\n\
             [Blink] Delay Number: 1\n\
             [Blink] Delay Value: 150\n\
             [Blink] Pin: 5    Level: 1\n\
             [Blink] Setting pin modes.\n"
        );
    }
}

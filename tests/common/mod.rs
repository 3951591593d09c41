#![allow(dead_code)]

use std::cell::Cell;

use blink_pin::{Clock, Gpio, Instant, Level, PinId, PinOutputs, RandomSource, Timeout};

/// Clock the test moves by hand.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn at(now: u32) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: u32) {
        self.now.set(self.now.get().wrapping_add(by));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.now.get())
    }
}

/// Pin outputs as the tests build them: up to four pins, up to 64 delays.
pub type Led<'a> = PinOutputs<RecordingGpio, Timeout<&'a ManualClock>, 4, 64>;

/// Replays a fixed list of draws, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<u32>,
    next: usize,
    pub seeds: Vec<u32>,
}

impl ScriptedRandom {
    pub fn new(draws: &[u32]) -> Self {
        Self {
            draws: draws.to_vec(),
            next: 0,
            seeds: Vec::new(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn seed(&mut self, seed: u32) {
        self.seeds.push(seed);
    }

    fn random_below(&mut self, bound: u32) -> u32 {
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        assert!(draw < bound, "scripted draw {} out of [0, {})", draw, bound);
        draw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    SetOutput(PinId),
    Write(PinId, Level),
}

/// Records every GPIO call. Writes to pins listed in `broken` fail.
#[derive(Debug, Default, Clone)]
pub struct RecordingGpio {
    pub calls: Vec<GpioCall>,
    pub broken: Vec<PinId>,
}

impl RecordingGpio {
    pub fn writes(&self) -> Vec<(PinId, Level)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                GpioCall::Write(pin, level) => Some((pin, level)),
                GpioCall::SetOutput(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct WriteFailed(pub PinId);

impl Gpio for RecordingGpio {
    type Error = WriteFailed;

    fn set_output(&mut self, pin: PinId) -> Result<(), WriteFailed> {
        self.calls.push(GpioCall::SetOutput(pin));
        Ok(())
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), WriteFailed> {
        if self.broken.contains(&pin) {
            return Err(WriteFailed(pin));
        }
        self.calls.push(GpioCall::Write(pin, level));
        Ok(())
    }
}

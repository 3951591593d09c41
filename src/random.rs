//! Random draws for the blink trials and the entropy used to seed them.

use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};

/// Uniform integer source used for the activation trials.
pub trait RandomSource {
    fn seed(&mut self, seed: u32);

    /// Uniform draw in `[0, bound)`. Returns 0 when `bound` is 0.
    fn random_below(&mut self, bound: u32) -> u32;
}

/// One-time entropy reading used to seed a [`RandomSource`].
pub trait EntropySource {
    fn read_entropy(&mut self) -> u32;
}

/// Marsaglia xorshift generator. Not suitable for anything but blinking.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct XorShift32 {
    state: u32,
}

// xorshift never leaves the all-zero state
const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        let mut rng = Self { state: 0 };
        rng.seed(seed);
        rng
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl Default for XorShift32 {
    fn default() -> Self {
        Self::new(ZERO_SEED_REPLACEMENT)
    }
}

impl RandomSource for XorShift32 {
    fn seed(&mut self, seed: u32) {
        self.state = if seed == 0 {
            ZERO_SEED_REPLACEMENT
        } else {
            seed
        };
    }

    fn random_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // Widening multiply instead of `%` keeps the draw close to uniform.
        ((u64::from(self.next_u32()) * u64::from(bound)) >> 32) as u32
    }
}

/// Constant entropy, for reproducible blink patterns.
#[derive(Debug, Clone, Copy)]
pub struct FixedEntropy(pub u32);

impl EntropySource for FixedEntropy {
    fn read_entropy(&mut self) -> u32 {
        self.0
    }
}

const ANALOG_READ_ATTEMPTS: usize = 64;

/// Entropy from the noise on an unconnected analog input.
///
/// The conversion is retried a bounded number of times; if the ADC never
/// produces a sample the reading is 0.
pub struct AnalogEntropy<Adc, Pin, Kind> {
    adc: Adc,
    pin: Pin,
    _kind: PhantomData<Kind>,
}

impl<Adc, Pin, Kind> AnalogEntropy<Adc, Pin, Kind>
where
    Adc: OneShot<Kind, u16, Pin>,
    Pin: Channel<Kind>,
{
    pub fn new(adc: Adc, pin: Pin) -> Self {
        Self {
            adc,
            pin,
            _kind: PhantomData,
        }
    }

    /// Give back the ADC and the input once seeding is done.
    pub fn release(self) -> (Adc, Pin) {
        (self.adc, self.pin)
    }
}

impl<Adc, Pin, Kind> EntropySource for AnalogEntropy<Adc, Pin, Kind>
where
    Adc: OneShot<Kind, u16, Pin>,
    Pin: Channel<Kind>,
{
    fn read_entropy(&mut self) -> u32 {
        for _ in 0..ANALOG_READ_ATTEMPTS {
            if let Ok(sample) = self.adc.read(&mut self.pin) {
                return u32::from(sample);
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ADC generic over the sample word, like the RP2040 HAL's.
    struct NoisyAdc {
        samples: [Option<u16>; 4],
        next: usize,
    }

    struct FloatingInput;

    impl Channel<NoisyAdc> for FloatingInput {
        type ID = u8;

        fn channel() -> u8 {
            0
        }
    }

    impl<Word, Src> OneShot<NoisyAdc, Word, Src> for NoisyAdc
    where
        Word: From<u16>,
        Src: Channel<NoisyAdc, ID = u8>,
    {
        type Error = ();

        fn read(&mut self, _pin: &mut Src) -> nb::Result<Word, ()> {
            let sample = self.samples[self.next % self.samples.len()];
            self.next += 1;
            sample.map(Word::from).ok_or(nb::Error::WouldBlock)
        }
    }

    #[test]
    fn analog_entropy_waits_for_a_sample() {
        let adc = NoisyAdc {
            samples: [None, None, Some(0x0A5C), Some(1)],
            next: 0,
        };
        let mut entropy = AnalogEntropy::new(adc, FloatingInput);
        assert_eq!(entropy.read_entropy(), 0x0A5C);
        assert_eq!(entropy.read_entropy(), 1);

        let (adc, _pin) = entropy.release();
        assert_eq!(adc.next, 4);
    }

    #[test]
    fn analog_entropy_gives_up_on_a_silent_adc() {
        let adc = NoisyAdc {
            samples: [None; 4],
            next: 0,
        };
        let mut entropy = AnalogEntropy::new(adc, FloatingInput);
        assert_eq!(entropy.read_entropy(), 0);
        assert_eq!(entropy.release().0.next, ANALOG_READ_ATTEMPTS);
    }

    #[test]
    fn draws_stay_below_bound() {
        let mut rng = XorShift32::new(12345);
        for _ in 0..10_000 {
            assert!(rng.random_below(100) < 100);
        }
        assert_eq!(rng.random_below(0), 0);
        assert_eq!(rng.random_below(1), 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = XorShift32::new(7);
        let mut b = XorShift32::new(1);
        b.seed(7);
        for _ in 0..100 {
            assert_eq!(a.random_below(100), b.random_below(100));
        }
    }

    #[test]
    fn zero_seed_does_not_lock_up() {
        let mut rng = XorShift32::new(0);
        let first = rng.random_below(1_000_000);
        let hits = (0..100)
            .filter(|_| rng.random_below(1_000_000) != first)
            .count();
        assert!(hits > 0);
    }

    #[test]
    fn draws_cover_the_range() {
        let mut rng = XorShift32::new(42);
        let mut seen = [false; 100];
        for _ in 0..10_000 {
            seen[rng.random_below(100) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}

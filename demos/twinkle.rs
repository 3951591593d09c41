//! Twinkles the Pico on-board LED together with an LED on GP15.
//!
//! The random source is seeded from the floating ADC0 input on GP26, so
//! leave that pin unconnected.
#![no_std]
#![no_main]

use blink_pin::rp2040::TimerClock;
use blink_pin::{AnalogEntropy, DefmtTrace, HalPins, Level, PinOutputs, Timeout};
use defmt::*;
use defmt_rtt as _;
use panic_probe as _;

// Provide an alias for our BSP so we can switch targets quickly.
// Uncomment the BSP you included in Cargo.toml, the rest of the code does not need to change.
use rp_pico as bsp;
// use sparkfun_pro_micro_rp2040 as bsp;

use bsp::entry;
use bsp::hal::{
    adc::{Adc, AdcPin},
    clocks::init_clocks_and_plls,
    pac,
    sio::Sio,
    timer::Timer,
    watchdog::Watchdog,
};

const ONBOARD_LED: u32 = 25;
const EXTERNAL_LED: u32 = 15;
const TWINKLE_MS: [u32; 6] = [40, 80, 40, 400, 120, 900];
const TWINKLE_PROBA: u32 = 60;

#[entry]
fn main() -> ! {
    info!("Program start");
    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    // External high-speed crystal on the Pico board is 12 Mhz
    let external_xtal_freq_hz = 12_000_000u32;
    let clocks = init_clocks_and_plls(
        external_xtal_freq_hz,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let adc = Adc::new(pac.ADC, &mut pac.RESETS);
    let noise = AdcPin::new(pins.gpio26.into_floating_input());
    let mut entropy = AnalogEntropy::new(adc, noise);

    let mut leds: HalPins<_, 2> = HalPins::new();
    leds.insert(ONBOARD_LED, pins.led.into_push_pull_output().into_dyn_pin())
        .ok()
        .unwrap();
    leds.insert(EXTERNAL_LED, pins.gpio15.into_push_pull_output().into_dyn_pin())
        .ok()
        .unwrap();

    let mut twinkle = PinOutputs::<_, _, 2, { TWINKLE_MS.len() }>::with_pins(
        &[ONBOARD_LED, EXTERNAL_LED],
        &TWINKLE_MS,
        TWINKLE_PROBA,
        leds,
        Timeout::new(TimerClock::new(&timer)),
    )
    .with_trace(DefmtTrace);
    // both LEDs are wired from the pin to ground, so high means lit
    twinkle.set_levels(Level::Low, Level::High);
    twinkle.begin(&mut entropy).unwrap();

    let mut slowed = false;
    loop {
        twinkle.update().unwrap();

        // calm down after the first ten seconds
        if !slowed && timer.get_counter().ticks() > 10_000_000 {
            info!("Slowing down");
            twinkle.set_delay_multiplier(3.0);
            slowed = true;
        }
    }
}

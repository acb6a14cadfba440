//! Tick source: the private timer of the calling core

use cortex_a9::ptimer::{self, PTIMER};

/// Clock of the private timers
///
/// `mpu_periph_clk` is a quarter of the MPU clock. This assumes the 800 MHz MPU clock the boot
/// loader's handoff configures on the Arria 10 SoC development kit; other clock trees need a
/// different value here.
pub const PERIPH_CLOCK_HZ: u32 = 200_000_000;

/// Interrupt raised on every period
pub const INTERRUPT: u16 = ptimer::INTERRUPT;

fn cycles(period_ms: u32) -> u32 {
    (PERIPH_CLOCK_HZ / 1_000).saturating_mul(period_ms.max(1))
}

/// Starts raising [`INTERRUPT`] every `period_ms` milliseconds
///
/// The callback registered for [`INTERRUPT`] must call [`acknowledge`].
pub fn start(period_ms: u32) {
    unsafe { PTIMER::steal() }.start_periodic(cycles(period_ms));
}

pub fn stop() {
    unsafe { PTIMER::steal() }.stop();
}

/// Clears the timer event of the current period
pub fn acknowledge() {
    unsafe { PTIMER::steal() }.clear_event();
}

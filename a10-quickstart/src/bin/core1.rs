//! Core 1 image
//!
//! Waits for core 0's handshake, announces itself and then counts its main loop iterations and
//! ticks into the Shared Control Block, logging a heartbeat every second.
//!
//! Expected output
//!
//! ``` text
//! $ tail -f dcc1.log
//! [INFO core1] core0 ready after 0 polls
//! [INFO core1] alive, 3071 loops
//! [INFO core1] alive, 6140 loops
//! ```

#![no_main]
#![no_std]

use a10_rt::{
    entry,
    interrupt::{self, Trigger},
    logger, timer,
};
use amp::{
    config, handshake,
    sched::{Kind, Scheduler},
    shm::ControlBlock,
    tick::Ticks,
};
use log::{error, info};
use panic_dcc as _;

static TICKS: Ticks = Ticks::new();

fn on_tick() {
    timer::acknowledge();
    let now = TICKS.advance();

    // NOTE(unsafe) core 1 is the only writer of `core1_timer`
    unsafe { ControlBlock::steal() }.set_core1_timer(now);
}

fn heartbeat() {
    let shm = unsafe { ControlBlock::steal() };

    info!("alive, {} loops", shm.trig_count());
}

#[entry]
fn main() -> ! {
    logger::init();

    // NOTE(unsafe) core 1 is the only writer of `core1_ready` and `trig_count`
    let shm = unsafe { ControlBlock::steal() };

    let polls = handshake::wait_for_primary(&shm);
    info!("core0 ready after {} polls", polls);

    interrupt::init();
    if let Err(e) = interrupt::start(timer::INTERRUPT, on_tick, Trigger::Edge) {
        error!("tick: {}", e);
    }
    timer::start(config::TICK_PERIOD_MS);
    unsafe { cortex_a9::enable_irq() }

    let mut sched: Scheduler<fn(), _> = Scheduler::new(&TICKS);
    if let Err(e) = sched.insert(Kind::Periodic, heartbeat, 1000) {
        error!("{}", e);
    }

    handshake::announce(&shm);

    loop {
        shm.bump_trig_count();
        sched.run_once();
    }
}

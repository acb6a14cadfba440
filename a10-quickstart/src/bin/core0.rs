//! Core 0 image
//!
//! Loads core 1's image from QSPI flash and releases core 1, then runs its own scheduler: a
//! heartbeat every 300 ms and, one second after start, a check for core 1's announcement.
//!
//! Expected output
//!
//! ``` text
//! $ tail -f dcc0.log
//! [INFO core0] core1 released: 131072 bytes @ 0x20000000, entry 0x20000000
//! [INFO core0] heartbeat 1
//! [INFO core0] heartbeat 2
//! [INFO core0] heartbeat 3
//! [INFO core0] core1 is up (trig_count = 1843, timer = 998)
//! [INFO core0] heartbeat 4
//! ```

#![no_main]
#![no_std]

use core::{
    slice,
    sync::atomic::{AtomicU32, Ordering},
};

use a10_rt::{
    entry,
    interrupt::{self, Trigger},
    logger,
    soc::{Caches, Physical, QspiFlash},
    timer,
};
use amp::{
    boot::{Layout, Orchestrator},
    config, handshake,
    sched::{Kind, Scheduler},
    shm::ControlBlock,
    tick::Ticks,
};
use log::{error, info, warn};
use panic_dcc as _;

static TICKS: Ticks = Ticks::new();

static BEATS: AtomicU32 = AtomicU32::new(0);

fn on_tick() {
    timer::acknowledge();
    TICKS.advance();
}

fn heartbeat() {
    info!("heartbeat {}", BEATS.fetch_add(1, Ordering::Relaxed) + 1);
}

fn check_core1() {
    let shm = unsafe { ControlBlock::steal() };

    if handshake::secondary_ready(&shm) {
        info!(
            "core1 is up (trig_count = {}, timer = {})",
            shm.trig_count(),
            shm.core1_timer()
        );
    } else {
        warn!("core1 has not announced itself");
    }
}

#[entry]
fn main() -> ! {
    logger::init();

    // NOTE(unsafe) core 0 is the only writer of `magic` and `core0_ready`
    let shm = unsafe { ControlBlock::steal() };

    let layout = Layout::default();
    // NOTE(unsafe) nothing else uses core 1's window while core 1 is held in reset
    let image = unsafe {
        slice::from_raw_parts_mut(
            layout.load_address as usize as *mut u8,
            layout.size as usize,
        )
    };
    let flash = unsafe { QspiFlash::steal() };

    if Orchestrator::new(Physical, Caches, flash, image, layout)
        .bring_up_secondary_core(&shm)
        .is_err()
    {
        warn!("continuing without core1");
    }

    interrupt::init();
    if let Err(e) = interrupt::start(timer::INTERRUPT, on_tick, Trigger::Edge) {
        error!("tick: {}", e);
    }
    timer::start(config::TICK_PERIOD_MS);
    unsafe { cortex_a9::enable_irq() }

    let mut sched: Scheduler<fn(), _> = Scheduler::new(&TICKS);
    let tasks: [(Kind, fn(), u32); 2] = [
        (Kind::Periodic, heartbeat, 300),
        (Kind::OneShot, check_core1, 1000),
    ];
    for (kind, action, delay) in tasks {
        if let Err(e) = sched.insert(kind, action, delay) {
            error!("{}", e);
        }
    }

    loop {
        sched.run_once();
    }
}

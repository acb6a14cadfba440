//! `log` sink over the Debug Communications Channel
//!
//! Records are written as `[LEVEL coreN] message`. The channel blocks until the host drains it,
//! so nothing is sent unless a debugger is attached.

use arm_dcc::dprintln;
use cortex_a9::register::{dbgdscr, mpidr};
use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "verbose")]
const MAX_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(feature = "verbose"))]
const MAX_LEVEL: LevelFilter = LevelFilter::Info;

struct Dcc;

static LOGGER: Dcc = Dcc;

impl Log for Dcc {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= MAX_LEVEL
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || !dbgdscr::read().debugger_connected() {
            return;
        }

        // NOTE(free) keeps the records of thread code and interrupt handlers apart
        cortex_a9::free(|| {
            dprintln!(
                "[{} core{}] {}",
                record.level(),
                mpidr::read().cpu_id(),
                record.args()
            );
        });
    }

    fn flush(&self) {}
}

/// Installs the logger; must run after `.data` and `.bss` are initialized
///
/// Calling this more than once has no effect.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(MAX_LEVEL);
    }
}

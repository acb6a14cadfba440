//! Interrupt lines
//!
//! Each image keeps its own table of callbacks, indexed by interrupt ID. Thread code only touches
//! the table with IRQs masked, so the IRQ handler never finds it locked.

use core::fmt;

use cortex_a9::{
    asm,
    gic::{ICC, ICD},
    register::mpidr,
};
use log::{debug, warn};
use spin::Mutex;

/// Interrupt IDs implemented by the GIC of the Arria 10 HPS
pub const LINES: u16 = 256;

/// Software Generated Interrupts are IDs `0..SGI_END`
const SGI_END: u16 = 16;

/// Priority given to every started line
const PRIORITY: u8 = 0x80;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Level,
    Edge,
    /// Software Generated Interrupts only
    Software,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    InvalidLine(u16),
    UnsupportedTrigger { line: u16, trigger: Trigger },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidLine(line) => write!(f, "no interrupt line {}", line),
            Error::UnsupportedTrigger { line, trigger } => {
                write!(f, "line {} can't be {:?} triggered", line, trigger)
            }
        }
    }
}

static HANDLERS: Mutex<[Option<fn()>; LINES as usize]> = Mutex::new([None; LINES as usize]);

/// Enables this core's CPU interface, accepting every priority; core 0 also enables the
/// distributor
pub fn init() {
    unsafe {
        ICC::set_iccpmr(0xFF);
        ICC::set_iccbpr(0);
        ICC::steal().enable();
    }

    if mpidr::read().cpu_id() == 0 {
        if let Some(mut icd) = ICD::take() {
            icd.enable();
        }
    }

    asm::dsb_isb();
}

/// Whether `line` must be configured as edge triggered
fn edge_triggered(line: u16, trigger: Trigger) -> Result<bool, Error> {
    if line >= LINES {
        return Err(Error::InvalidLine(line));
    }

    match trigger {
        Trigger::Level => Ok(false),
        Trigger::Edge => Ok(true),
        Trigger::Software if line < SGI_END => Ok(true),
        Trigger::Software => Err(Error::UnsupportedTrigger { line, trigger }),
    }
}

/// Registers `callback` for `line` and enables the line, routed to the calling core
pub fn start(line: u16, callback: fn(), trigger: Trigger) -> Result<(), Error> {
    let edge = edge_triggered(line, trigger)?;

    ICD::mask(line);
    ICD::unpend(line);

    cortex_a9::free(|| HANDLERS.lock()[usize::from(line)] = Some(callback));

    unsafe {
        // NOTE the configuration of SGIs is fixed
        if line >= SGI_END {
            ICD::set_edge_triggered(line, edge);
        }
        ICD::set_priority(line, PRIORITY);
        ICD::set_targets(line, 1 << mpidr::read().cpu_id());
    }

    ICD::unmask(line);
    asm::dsb_isb();

    debug!("line {} started ({:?})", line, trigger);

    Ok(())
}

/// Disables `line` and forgets its callback
pub fn stop(line: u16) -> Result<(), Error> {
    if line >= LINES {
        return Err(Error::InvalidLine(line));
    }

    ICD::mask(line);
    asm::dsb_isb();

    cortex_a9::free(|| HANDLERS.lock()[usize::from(line)] = None);

    Ok(())
}

fn handler(table: &[Option<fn()>], id: u16) -> Option<fn()> {
    table.get(usize::from(id)).copied().flatten()
}

/// IRQ entry, called from `IrqHandler` with IRQs masked
#[cfg_attr(not(target_arch = "arm"), allow(dead_code))]
pub(crate) unsafe extern "C" fn irq() {
    let icciar = ICC::get_icciar();

    if !icciar.is_spurious() {
        let id = icciar.ackintid();
        let callback = handler(&*HANDLERS.lock(), id);

        match callback {
            Some(f) => f(),
            None => warn!("interrupt {} has no handler", id),
        }
    }

    // NOTE spurious IDs are also signaled back, always with the value that was read
    ICC::set_icceoir(icciar);
}

#[cfg(test)]
mod tests {
    use super::{Error, Trigger, LINES};

    fn nop() {}

    #[test]
    fn triggers() {
        assert_eq!(super::edge_triggered(29, Trigger::Edge), Ok(true));
        assert_eq!(super::edge_triggered(29, Trigger::Level), Ok(false));
        assert_eq!(super::edge_triggered(72, Trigger::Level), Ok(false));
        assert_eq!(super::edge_triggered(0, Trigger::Software), Ok(true));
        assert_eq!(super::edge_triggered(15, Trigger::Software), Ok(true));
        assert_eq!(
            super::edge_triggered(16, Trigger::Software),
            Err(Error::UnsupportedTrigger {
                line: 16,
                trigger: Trigger::Software
            })
        );
        assert_eq!(
            super::edge_triggered(LINES, Trigger::Edge),
            Err(Error::InvalidLine(LINES))
        );
    }

    #[test]
    fn lookup() {
        let mut table = [None; LINES as usize];
        table[29] = Some(nop as fn());

        assert!(super::handler(&table, 29).is_some());
        assert!(super::handler(&table, 30).is_none());
        // IDs past the implemented lines
        assert!(super::handler(&table, 1019).is_none());
    }
}

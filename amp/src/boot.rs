//! Secondary core bring-up, run once by core 0
//!
//! Core 1 is held in reset while its image is copied from flash into its private SDRAM window and
//! pushed out of the data caches. SDRAM is then mapped at address 0, a two-word trampoline is
//! planted at CPU1's reset vector, the boot ROM is pointed at the image entry and the Snoop Control
//! Unit is enabled before the reset is released. Barriers separate every step whose effect must
//! be visible to the other core or to the hardware before the next one starts.

use log::{error, info};

use crate::{
    config,
    hal::{Cache, Mmio, Storage},
    handshake::Mailbox,
    map, BootError, StorageError,
};

/// `ldr pc, [pc, #-4]`: jumps to the word that follows it
pub const TRAMPOLINE_LDR_PC: u32 = 0xE51F_F004;

/// Bytes cleaned around the trampoline (one cache line)
const TRAMPOLINE_CLEAN: u32 = 32;

/// `Address Filtering Start` value: filtering enabled, SDRAM from address 0
const ADDR_FILTERING_START: u32 = 0x0000_0001;

/// `Address Filtering End` value: SDRAM window ends at 3 GiB
const ADDR_FILTERING_END: u32 = 0xC000_0000;

const SCU_ENABLE: u32 = 1 << 0;

/// Where core 1's image comes from and where it goes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Physical address the image is copied to
    pub load_address: u32,
    /// Bytes to copy
    pub size: u32,
    /// Offset of the image in flash
    pub flash_offset: u32,
    /// First instruction core 1 executes
    pub entry: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            load_address: config::CORE1_DDR_BASE,
            size: config::CORE1_IMAGE_SIZE,
            flash_offset: config::CORE1_FLASH_OFFSET,
            entry: config::CORE1_DDR_BASE,
        }
    }
}

/// Reset Manager control of CPU1
pub struct ResetControl;

impl ResetControl {
    pub fn hold_core1<M>(mmio: &mut M)
    where
        M: Mmio + ?Sized,
    {
        mmio.modify32(map::RSTMGR_MPUMODRST, |r| r | map::MPUMODRST_CPU1)
    }

    pub fn release_core1<M>(mmio: &mut M)
    where
        M: Mmio + ?Sized,
    {
        mmio.modify32(map::RSTMGR_MPUMODRST, |r| r & !map::MPUMODRST_CPU1)
    }

    pub fn core1_held<M>(mmio: &M) -> bool
    where
        M: Mmio + ?Sized,
    {
        mmio.read32(map::RSTMGR_MPUMODRST) & map::MPUMODRST_CPU1 != 0
    }
}

/// Boot ROM start address of CPU1
pub struct BootTarget;

impl BootTarget {
    pub fn read<M>(mmio: &M) -> u32
    where
        M: Mmio + ?Sized,
    {
        mmio.read32(map::SYSMGR_ROM_CPU1STARTADDR)
    }

    pub fn write<M>(mmio: &mut M, entry: u32)
    where
        M: Mmio + ?Sized,
    {
        mmio.write32(map::SYSMGR_ROM_CPU1STARTADDR, entry)
    }
}

/// Maps SDRAM, rather than the boot ROM, at address 0 for every master behind the L2
pub fn map_sdram_at_zero<M>(mmio: &mut M)
where
    M: Mmio + ?Sized,
{
    mmio.write32(map::L2_ADDR_FILTERING_START, ADDR_FILTERING_START);
    mmio.write32(map::L2_ADDR_FILTERING_END, ADDR_FILTERING_END);
}

/// Turns on the Snoop Control Unit (coherency between the L1s of both cores)
pub fn enable_scu<M>(mmio: &mut M)
where
    M: Mmio + ?Sized,
{
    mmio.modify32(map::SCU_CONTROL, |r| r | SCU_ENABLE)
}

/// Core 0's side of the bring-up
pub struct Orchestrator<'a, M, C, S> {
    mmio: M,
    cache: C,
    storage: S,
    // core 1's window, as seen by core 0
    image: &'a mut [u8],
    layout: Layout,
}

impl<'a, M, C, S> Orchestrator<'a, M, C, S>
where
    M: Mmio,
    C: Cache,
    S: Storage,
{
    /// `image` must be the memory at `layout.load_address`, at least `layout.size` bytes long
    pub fn new(mmio: M, cache: C, storage: S, image: &'a mut [u8], layout: Layout) -> Self {
        Orchestrator {
            mmio,
            cache,
            storage,
            image,
            layout,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Loads core 1's image and releases core 1 from reset
    ///
    /// `core0_ready` is published on both outcomes. If the image cannot be read core 1 stays in
    /// reset and the error is returned; core 0 is expected to continue without it.
    pub fn bring_up_secondary_core<B>(&mut self, mailbox: &B) -> Result<(), BootError>
    where
        B: Mailbox + ?Sized,
    {
        mailbox.initialize();

        ResetControl::hold_core1(&mut self.mmio);
        self.cache.dsb_isb();

        let res = self.load_and_release();

        mailbox.set_core0_ready();

        res
    }

    fn load_and_release(&mut self) -> Result<(), BootError> {
        if let Err(e) = self.load_image() {
            error!("core1 image load failed: {}; core1 stays in reset", e);
            return Err(e.into());
        }

        let start = cortex_a9::cache::align_down(self.layout.load_address as usize) as u32;
        let end = cortex_a9::cache::align_up(
            self.layout.load_address as usize + self.layout.size as usize,
        ) as u32;
        self.cache.clean(start, end - start);
        self.cache.invalidate_icache();
        self.cache.dsb_isb();

        map_sdram_at_zero(&mut self.mmio);
        self.cache.dsb_isb();

        self.write_trampoline();

        BootTarget::write(&mut self.mmio, self.layout.entry);
        self.cache.dsb_isb();

        enable_scu(&mut self.mmio);
        self.cache.dsb_isb();

        ResetControl::release_core1(&mut self.mmio);
        self.cache.dsb_isb();

        info!(
            "core1 released: {} bytes @ {:#010x}, entry {:#010x}",
            self.layout.size, self.layout.load_address, self.layout.entry
        );

        Ok(())
    }

    fn load_image(&mut self) -> Result<(), StorageError> {
        let size = self.layout.size as usize;
        let offset = self.layout.flash_offset;

        // NOTE stale bytes from a previous boot cycle must not survive a short image
        self.image.fill(0);

        let dst = self
            .image
            .get_mut(..size)
            .ok_or(StorageError::OutOfRange { offset, len: size })?;

        self.storage.read(dst, offset)
    }

    fn write_trampoline(&mut self) {
        self.mmio.write32(map::RESET_VECTOR, TRAMPOLINE_LDR_PC);
        self.mmio.write32(map::RESET_VECTOR + 4, self.layout.entry);
        self.cache.clean(map::RESET_VECTOR, TRAMPOLINE_CLEAN);
        self.cache.dsb_isb();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeMap, mem};

    use super::{BootTarget, Layout, Orchestrator, ResetControl, TRAMPOLINE_LDR_PC};
    use crate::{
        config,
        hal::{Cache, Mmio, Storage},
        handshake::Mailbox,
        map,
        shm::{self, ControlBlock},
        BootError, StorageError,
    };

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Event {
        Write(u32, u32),
        Clean(u32, u32),
        InvalidateICache,
        Dsb,
        Isb,
        Read { offset: u32, len: usize },
        Initialize,
        Core0Ready,
    }

    type Log = RefCell<Vec<Event>>;

    struct Bus<'a> {
        regs: BTreeMap<u32, u32>,
        log: &'a Log,
    }

    impl Mmio for Bus<'_> {
        fn read32(&self, addr: u32) -> u32 {
            self.regs.get(&addr).copied().unwrap_or(0)
        }

        fn write32(&mut self, addr: u32, value: u32) {
            self.regs.insert(addr, value);
            self.log.borrow_mut().push(Event::Write(addr, value));
        }
    }

    struct Caches<'a> {
        log: &'a Log,
    }

    impl Cache for Caches<'_> {
        fn clean(&mut self, start: u32, len: u32) {
            self.log.borrow_mut().push(Event::Clean(start, len));
        }

        fn invalidate_icache(&mut self) {
            self.log.borrow_mut().push(Event::InvalidateICache);
        }

        fn dsb(&mut self) {
            self.log.borrow_mut().push(Event::Dsb);
        }

        fn isb(&mut self) {
            self.log.borrow_mut().push(Event::Isb);
        }
    }

    struct Flash<'a> {
        contents: Result<u8, StorageError>,
        log: &'a Log,
    }

    impl Storage for Flash<'_> {
        fn read(&mut self, dst: &mut [u8], offset: u32) -> Result<(), StorageError> {
            self.log.borrow_mut().push(Event::Read {
                offset,
                len: dst.len(),
            });
            let byte = self.contents?;
            dst.fill(byte);
            Ok(())
        }
    }

    struct Recorder<'a> {
        log: &'a Log,
    }

    impl Mailbox for Recorder<'_> {
        fn initialize(&self) {
            self.log.borrow_mut().push(Event::Initialize);
        }

        fn is_initialized(&self) -> bool {
            unreachable!()
        }

        fn core0_ready(&self) -> bool {
            unreachable!()
        }

        fn set_core0_ready(&self) {
            self.log.borrow_mut().push(Event::Core0Ready);
        }

        fn core1_ready(&self) -> bool {
            unreachable!()
        }

        fn set_core1_ready(&self) {
            unreachable!()
        }
    }

    const LAYOUT: Layout = Layout {
        load_address: 0x2000_0000,
        size: 0x100,
        flash_offset: 0x00B0_0000,
        entry: 0x2000_0000,
    };

    fn position(log: &[Event], event: Event) -> usize {
        log.iter()
            .position(|e| *e == event)
            .unwrap_or_else(|| panic!("{:?} not in {:?}", event, log))
    }

    fn followed_by_barriers(log: &[Event], event: Event) -> bool {
        let i = position(log, event);
        log[i + 1..].starts_with(&[Event::Dsb, Event::Isb])
    }

    #[test]
    fn sequence() {
        let log = RefCell::new(vec![]);
        let mut bus = Bus {
            regs: BTreeMap::new(),
            log: &log,
        };
        bus.regs.insert(map::SCU_CONTROL, 0x10);
        let mut image = vec![0xAA; 0x200];

        Orchestrator::new(
            &mut bus,
            Caches { log: &log },
            Flash {
                contents: Ok(0x5A),
                log: &log,
            },
            &mut image,
            LAYOUT,
        )
        .bring_up_secondary_core(&Recorder { log: &log })
        .unwrap();

        let log = log.borrow().clone();
        let hold = Event::Write(map::RSTMGR_MPUMODRST, map::MPUMODRST_CPU1);
        let read = Event::Read {
            offset: 0x00B0_0000,
            len: 0x100,
        };
        let clean = Event::Clean(0x2000_0000, 0x100);
        let filter_start = Event::Write(map::L2_ADDR_FILTERING_START, 1);
        let filter_end = Event::Write(map::L2_ADDR_FILTERING_END, 0xC000_0000);
        let ldr = Event::Write(0, TRAMPOLINE_LDR_PC);
        let target = Event::Write(map::SYSMGR_ROM_CPU1STARTADDR, 0x2000_0000);
        let scu = Event::Write(map::SCU_CONTROL, 0x11);
        let release = Event::Write(map::RSTMGR_MPUMODRST, 0);

        let order = [
            Event::Initialize,
            hold,
            read,
            clean,
            Event::InvalidateICache,
            filter_start,
            filter_end,
            ldr,
            Event::Write(4, 0x2000_0000),
            Event::Clean(0, 32),
            target,
            scu,
            release,
            Event::Core0Ready,
        ];
        for pair in order.windows(2) {
            assert!(
                position(&log, pair[0]) < position(&log, pair[1]),
                "{:?} must precede {:?}",
                pair[0],
                pair[1]
            );
        }

        for event in [
            hold,
            Event::InvalidateICache,
            filter_end,
            Event::Clean(0, 32),
            target,
            scu,
            release,
        ] {
            assert!(followed_by_barriers(&log, event), "no barrier after {:?}", event);
        }

        assert!(!ResetControl::core1_held(&bus));
        assert_eq!(BootTarget::read(&bus), 0x2000_0000);
        assert_eq!(bus.regs[&0], TRAMPOLINE_LDR_PC);
        assert_eq!(bus.regs[&4], 0x2000_0000);

        // loaded, and zero-filled past the image
        assert!(image[..0x100].iter().all(|b| *b == 0x5A));
        assert!(image[0x100..].iter().all(|b| *b == 0));
    }

    #[test]
    fn storage_failure() {
        let log = RefCell::new(vec![]);
        let mut bus = Bus {
            regs: BTreeMap::new(),
            log: &log,
        };
        let mut image = vec![0xAA; 0x100];

        let res = Orchestrator::new(
            &mut bus,
            Caches { log: &log },
            Flash {
                contents: Err(StorageError::Device(-2)),
                log: &log,
            },
            &mut image,
            LAYOUT,
        )
        .bring_up_secondary_core(&Recorder { log: &log });

        assert_eq!(
            res,
            Err(BootError::StorageReadFailure(StorageError::Device(-2)))
        );

        let log = log.borrow().clone();
        assert_eq!(log.first(), Some(&Event::Initialize));
        assert_eq!(log.last(), Some(&Event::Core0Ready));

        // nothing past the read reached the hardware
        let read = position(
            &log,
            Event::Read {
                offset: 0x00B0_0000,
                len: 0x100,
            },
        );
        assert!(log[read + 1..]
            .iter()
            .all(|e| matches!(e, Event::Core0Ready)));
        assert!(ResetControl::core1_held(&bus));
        assert!(image.iter().all(|b| *b == 0));
    }

    #[test]
    fn image_window_too_small() {
        let log = RefCell::new(vec![]);
        let mut bus = Bus {
            regs: BTreeMap::new(),
            log: &log,
        };
        let mut image = vec![0; 0x80];

        let res = Orchestrator::new(
            &mut bus,
            Caches { log: &log },
            Flash {
                contents: Ok(1),
                log: &log,
            },
            &mut image,
            LAYOUT,
        )
        .bring_up_secondary_core(&Recorder { log: &log });

        assert_eq!(
            res,
            Err(BootError::StorageReadFailure(StorageError::OutOfRange {
                offset: 0x00B0_0000,
                len: 0x100,
            }))
        );
        assert!(ResetControl::core1_held(&bus));
    }

    #[test]
    fn unaligned_image_is_cleaned_by_whole_lines() {
        let log = RefCell::new(vec![]);
        let mut bus = Bus {
            regs: BTreeMap::new(),
            log: &log,
        };
        let mut image = vec![0; 0x100];
        let layout = Layout {
            load_address: 0x2000_0010,
            size: 0x30,
            ..LAYOUT
        };

        Orchestrator::new(
            &mut bus,
            Caches { log: &log },
            Flash {
                contents: Ok(1),
                log: &log,
            },
            &mut image,
            layout,
        )
        .bring_up_secondary_core(&Recorder { log: &log })
        .unwrap();

        assert!(log.borrow().contains(&Event::Clean(0x2000_0000, 0x40)));
    }

    #[test]
    fn publishes_control_block() {
        let log = RefCell::new(vec![]);
        let mut bus = Bus {
            regs: BTreeMap::new(),
            log: &log,
        };
        let regs: shm::Registers = unsafe { mem::zeroed() };
        unsafe {
            regs.core1_ready.write(1);
            regs.trig_count.write(99);
        }
        let shm = ControlBlock::new(&regs);
        let mut image = vec![0; 0x100];

        Orchestrator::new(
            &mut bus,
            Caches { log: &log },
            Flash {
                contents: Ok(0),
                log: &log,
            },
            &mut image,
            LAYOUT,
        )
        .bring_up_secondary_core(&shm)
        .unwrap();

        assert_eq!(regs.magic.read(), config::SHM_MAGIC);
        assert_eq!(regs.core0_ready.read(), 1);
        assert_eq!(regs.core1_ready.read(), 0);
        assert_eq!(regs.trig_count.read(), 0);
    }

    #[test]
    fn default_layout() {
        let layout = Layout::default();

        assert_eq!(layout.load_address, 0x2000_0000);
        assert_eq!(layout.entry, 0x2000_0000);
        assert_eq!(layout.size, 0x2_0000);
        assert_eq!(layout.flash_offset, 0x00B0_0000);
    }
}

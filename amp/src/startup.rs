//! Secondary core startup sequence
//!
//! Core 1 comes out of reset in one of two situations: released by core 0 after its image was
//! loaded (orchestrated), or started by an external agent such as a debugger that loaded the
//! image itself (autonomous). The path is chosen from hardware state alone, so running the same
//! image either way needs no rebuild.
//!
//! The first three stages (vectors, stacks) run before any Rust code; `a10-rt` covers them. This
//! module covers the rest.

use crate::config;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    ResetEntry,
    VectorsInstalled,
    StacksInitialized,
    PathDecision,
    Orchestrated,
    Autonomous,
    StartupDone,
}

impl Stage {
    /// Whether `next` may directly follow `self`
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;

        matches!(
            (self, next),
            (ResetEntry, VectorsInstalled)
                | (VectorsInstalled, StacksInitialized)
                | (StacksInitialized, PathDecision)
                | (PathDecision, Orchestrated)
                | (PathDecision, Autonomous)
                | (Orchestrated, StartupDone)
                | (Autonomous, StartupDone)
        )
    }
}

/// Outcome of the path decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Path {
    /// Jump to the entry address published in the boot target register
    Orchestrated { entry: u32 },
    /// Set up memory and run this image's own steady-state entry
    Autonomous,
}

/// Hardware state the decision is made from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inputs {
    /// Contents of the boot target (CPU1 start address) register
    pub boot_target: u32,
    /// `magic` field of the Shared Control Block
    pub magic: u32,
    pub debugger_attached: bool,
}

/// Addresses an orchestrated jump may land on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: u32,
    /// Exclusive
    pub end: u32,
    /// Where the running image was linked; jumping there would restart ourselves
    pub image_base: u32,
}

impl Window {
    /// Core 1's SDRAM window
    pub const fn core1(image_base: u32) -> Self {
        Window {
            start: config::CORE1_DDR_BASE,
            end: config::CORE1_DDR_END,
            image_base,
        }
    }

    pub fn accepts(&self, target: u32) -> bool {
        self.start <= target && target < self.end && target % 4 == 0 && target != self.image_base
    }
}

/// Chooses the startup path; a pure function of `inputs` and `window`
pub fn decide(inputs: &Inputs, window: &Window) -> Path {
    if inputs.debugger_attached {
        return Path::Autonomous;
    }

    if inputs.magic != config::SHM_MAGIC {
        return Path::Autonomous;
    }

    if !window.accepts(inputs.boot_target) {
        return Path::Autonomous;
    }

    Path::Orchestrated {
        entry: inputs.boot_target,
    }
}

/// What the startup sequence needs from the core it runs on
pub trait Platform {
    fn boot_target(&self) -> u32;

    fn magic(&self) -> u32;

    /// Is this core halted under an external debugger?
    fn debugger_attached(&self) -> bool;

    fn invalidate_icache(&mut self);

    /// Transfers control to `entry`; does not return on hardware
    fn jump(&mut self, entry: u32);

    /// Copies `.data` and zeroes `.bss`
    fn init_memory(&mut self);

    /// Runs the steady-state entry point; does not return on hardware
    fn enter_main(&mut self);

    /// Called on every stage transition
    fn stage(&mut self, _stage: Stage) {}
}

struct Sequencer<'p, P>
where
    P: Platform + ?Sized,
{
    platform: &'p mut P,
    stage: Stage,
}

impl<P> Sequencer<'_, P>
where
    P: Platform + ?Sized,
{
    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "{:?} -> {:?}",
            self.stage,
            next
        );
        self.stage = next;
        self.platform.stage(next);
    }
}

/// Runs the sequence from `PathDecision` to `StartupDone`
///
/// Expects vectors and stacks to be in place. Returns the chosen path, which only happens when
/// `platform` hands control back (that is, off target).
pub fn run<P>(platform: &mut P, window: &Window) -> Path
where
    P: Platform + ?Sized,
{
    let mut seq = Sequencer {
        platform,
        stage: Stage::StacksInitialized,
    };

    seq.advance(Stage::PathDecision);

    let inputs = Inputs {
        boot_target: seq.platform.boot_target(),
        magic: seq.platform.magic(),
        debugger_attached: seq.platform.debugger_attached(),
    };
    let path = decide(&inputs, window);

    match path {
        Path::Orchestrated { entry } => {
            seq.advance(Stage::Orchestrated);
            seq.advance(Stage::StartupDone);
            seq.platform.jump(entry);
        }
        Path::Autonomous => {
            seq.advance(Stage::Autonomous);
            seq.platform.invalidate_icache();
            seq.platform.init_memory();
            seq.advance(Stage::StartupDone);
            seq.platform.enter_main();
        }
    }

    path
}

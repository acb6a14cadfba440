//! Reset handlers, vector table and IRQ entry
//!
//! Everything in the assembly block runs before any exception can be taken: it masks IRQ/FIQ,
//! points VBAR at `VECTORS` and gives every processor mode its own stack. Rust code starts at
//! `init_memory` (core 0) or `startup_core1` (core 1).

use core::ptr;

use amp::{
    boot::BootTarget,
    shm::ControlBlock,
    startup::{self, Platform, Window},
};
use cortex_a9::{cache, register::dbgdscr};

use crate::soc::Physical;

core::arch::global_asm!(
    ".arm",
    ".set MODE_FIQ, 0x11",
    ".set MODE_IRQ, 0x12",
    ".set MODE_SVC, 0x13",
    ".set MODE_ABT, 0x17",
    ".set MODE_UND, 0x1B",
    ".set MODE_SYS, 0x1F",
    ".set STACK_SIZE, 0x400",
    "",
    // IRQ stack at the top; SVC (thread mode) gets everything below the other modes
    ".macro SETUP_STACKS",
    "  ldr r0, =_stack_top",
    "  cps #MODE_IRQ",
    "  mov sp, r0",
    "  sub r0, r0, #STACK_SIZE",
    "  cps #MODE_FIQ",
    "  mov sp, r0",
    "  sub r0, r0, #STACK_SIZE",
    "  cps #MODE_ABT",
    "  mov sp, r0",
    "  sub r0, r0, #STACK_SIZE",
    "  cps #MODE_UND",
    "  mov sp, r0",
    "  sub r0, r0, #STACK_SIZE",
    "  cps #MODE_SYS",
    "  mov sp, r0",
    "  sub r0, r0, #STACK_SIZE",
    "  cps #MODE_SVC",
    "  mov sp, r0",
    ".endm",
    "",
    ".macro INSTALL_VECTORS",
    "  ldr r0, =VECTORS",
    "  mcr p15, 0, r0, c12, c0, 0", // VBAR
    "  mrc p15, 0, r0, c1, c0, 0", // SCTLR
    "  bic r0, r0, #(1 << 13)", // V = 0: vectors at VBAR
    "  mcr p15, 0, r0, c1, c0, 0",
    "  isb",
    ".endm",
    "",
    ".section .vectors, \"ax\"",
    ".global VECTORS",
    ".align 5",
    "VECTORS:",
    "  ldr pc, =ResetHandler",
    "  ldr pc, =Undefined",
    "  ldr pc, =SVC",
    "  ldr pc, =PrefetchAbort",
    "  ldr pc, =DataAbort",
    "  nop",
    "  ldr pc, =IrqHandler",
    "  ldr pc, =FIQ",
    ".ltorg",
    "",
    ".section .text._start, \"ax\"",
    ".global _start",
    ".type _start, %function",
    "_start:",
    "  cpsid if",
    "  INSTALL_VECTORS",
    "  SETUP_STACKS",
    "  bl {init_memory}",
    "  bl main",
    "  b .",
    ".ltorg",
    "",
    ".section .text._start_core1, \"ax\"",
    ".global _start_core1",
    ".type _start_core1, %function",
    "_start_core1:",
    "  cpsid if",
    "  INSTALL_VECTORS",
    "  SETUP_STACKS",
    "  b {startup_core1}",
    ".ltorg",
    "",
    // thread code runs in SVC mode; the handler runs on the SVC stack with IRQs masked
    ".section .text.IrqHandler, \"ax\"",
    ".global IrqHandler",
    ".type IrqHandler, %function",
    "IrqHandler:",
    "  sub lr, lr, #4",
    "  srsdb sp!, #MODE_SVC",
    "  cps #MODE_SVC",
    "  push {{r0-r3, r12, lr}}",
    "  and r1, sp, #4",
    "  sub sp, sp, r1",
    "  push {{r1, r2}}",
    "  bl {irq}",
    "  pop {{r1, r2}}",
    "  add sp, sp, r1",
    "  pop {{r0-r3, r12, lr}}",
    "  rfeia sp!",
    init_memory = sym init_memory,
    startup_core1 = sym startup_core1,
    irq = sym crate::interrupt::irq,
);

/// Copies `.data` from its load address and zeroes `.bss`
unsafe extern "C" fn init_memory() {
    extern "C" {
        static mut _sbss: u32;
        static mut _ebss: u32;
        static mut _sdata: u32;
        static mut _edata: u32;
        static _sidata: u32;
    }

    let mut bss = ptr::addr_of_mut!(_sbss);
    let ebss = ptr::addr_of_mut!(_ebss);
    while bss < ebss {
        ptr::write_volatile(bss, 0);
        bss = bss.add(1);
    }

    let mut data = ptr::addr_of_mut!(_sdata);
    let edata = ptr::addr_of_mut!(_edata);
    let mut sidata = ptr::addr_of!(_sidata);
    // NOTE the images are loaded into RAM as a whole, so `.data` is usually already in place
    if sidata != data as *const u32 {
        while data < edata {
            ptr::write_volatile(data, ptr::read_volatile(sidata));
            data = data.add(1);
            sidata = sidata.add(1);
        }
    }
}

unsafe extern "C" fn startup_core1() -> ! {
    extern "C" {
        static VECTORS: u8;
    }

    let image_base = ptr::addr_of!(VECTORS) as usize as u32;
    startup::run(&mut Core1, &Window::core1(image_base));

    crate::park()
}

/// Core 1, right out of reset
struct Core1;

impl Platform for Core1 {
    fn boot_target(&self) -> u32 {
        BootTarget::read(&Physical)
    }

    fn magic(&self) -> u32 {
        // NOTE(unsafe) read only
        unsafe { ControlBlock::steal() }.magic()
    }

    fn debugger_attached(&self) -> bool {
        // NOTE only a halted core counts; HDBGen is set on a core that keeps running
        dbgdscr::read().halted()
    }

    fn invalidate_icache(&mut self) {
        cache::invalidate_icache()
    }

    fn jump(&mut self, entry: u32) {
        jump(entry)
    }

    fn init_memory(&mut self) {
        unsafe { init_memory() }
    }

    fn enter_main(&mut self) {
        extern "C" {
            fn main() -> !;
        }

        unsafe { main() }
    }
}

fn jump(entry: u32) -> ! {
    unsafe { core::arch::asm!("bx {0}", in(reg) entry, options(noreturn, nostack)) }
}

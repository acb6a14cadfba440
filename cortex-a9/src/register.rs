pub mod cpsr;
pub mod dbgdscr;
pub mod mpidr;

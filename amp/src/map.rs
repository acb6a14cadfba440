//! Arria 10 HPS registers touched during bring-up

use core::mem::offset_of;

use cortex_a9::l2c;

/// Reset Manager `mpumodrst`
pub const RSTMGR_MPUMODRST: u32 = 0xFFD0_5020;

/// `mpumodrst` bit that holds CPU1 in reset
pub const MPUMODRST_CPU1: u32 = 1 << 1;

/// System Manager `romcode_cpu1startaddr`: where the boot ROM sends CPU1 out of reset
pub const SYSMGR_ROM_CPU1STARTADDR: u32 = 0xFFD0_6208;

/// L2C-310 Address Filtering Start
pub const L2_ADDR_FILTERING_START: u32 =
    (l2c::BASE_ADDRESS + offset_of!(l2c::Registers, addr_filtering_start)) as u32;

/// L2C-310 Address Filtering End
pub const L2_ADDR_FILTERING_END: u32 =
    (l2c::BASE_ADDRESS + offset_of!(l2c::Registers, addr_filtering_end)) as u32;

/// Snoop Control Unit Control Register
pub const SCU_CONTROL: u32 = cortex_a9::PERIPHBASE as u32;

/// Fixed reset vector of CPU1; SDRAM once the address filter is programmed
pub const RESET_VECTOR: u32 = 0x0000_0000;

#[cfg(test)]
mod tests {
    #[test]
    fn addresses() {
        assert_eq!(super::L2_ADDR_FILTERING_START, 0xFFFF_FC00);
        assert_eq!(super::L2_ADDR_FILTERING_END, 0xFFFF_FC04);
        assert_eq!(super::SCU_CONTROL, 0xFFFF_C000);
    }
}

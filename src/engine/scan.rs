//! Return-site scanning, region growth, and boundary trimming.
//!
//! Discovery pivots on the one instruction every function shares: the
//! `jr $ra` return. From each return site a region grows outward while
//! the words keep validating as CPU code, then the boundaries are
//! tightened with architectural reasoning about how functions begin and
//! end.

use crate::engine::prologue::count_invalid_start_instructions;
use crate::engine::validate::{is_valid_cpu, is_valid_rsp};
use crate::isa::cpu::CpuInstruction;
use crate::isa::patterns;
use crate::rom::{Rom, ROM_HEADER_SIZE};
use crate::types::{RomRegion, ScanOptions, INSTRUCTION_SIZE};

/// Find every plausible function return in the ROM.
///
/// A site qualifies when the word is exactly `jr $ra` and the following
/// delay-slot word validates as either CPU or RSP code. Offsets are
/// returned in ascending order.
pub fn find_return_locations(rom: &Rom) -> Vec<usize> {
    let mut locations = Vec::with_capacity(1024);

    if rom.len() < ROM_HEADER_SIZE + 2 * INSTRUCTION_SIZE {
        return locations;
    }

    // The last word that still has a delay slot after it.
    let last = rom.len() - 2 * INSTRUCTION_SIZE;
    let mut rom_addr = ROM_HEADER_SIZE;
    while rom_addr <= last {
        if rom.read32(rom_addr) == patterns::JR_RA {
            let delay_slot = rom.read32(rom_addr + INSTRUCTION_SIZE);
            if is_valid_cpu(delay_slot) || is_valid_rsp(delay_slot) {
                locations.push(rom_addr);
            }
        }
        rom_addr += INSTRUCTION_SIZE;
    }

    locations
}

/// Walk backwards from `rom_addr` while the preceding words validate as
/// CPU code. Returns the earliest accepted offset, clamped to the end of
/// the ROM header.
pub fn find_code_start(rom: &Rom, mut rom_addr: usize) -> usize {
    while rom_addr > ROM_HEADER_SIZE {
        let prev_addr = rom_addr - INSTRUCTION_SIZE;
        if !is_valid_cpu(rom.read32(prev_addr)) {
            return rom_addr;
        }
        rom_addr = prev_addr;
    }
    rom_addr
}

/// Walk forwards from `rom_addr` while the words validate as CPU code.
/// Returns the offset of the first rejected word (exclusive end), clamped
/// to the end of the ROM.
pub fn find_code_end(rom: &Rom, mut rom_addr: usize) -> usize {
    while rom_addr < rom.len() {
        if !is_valid_cpu(rom.read32(rom_addr)) {
            return rom_addr;
        }
        rom_addr += INSTRUCTION_SIZE;
    }
    rom_addr
}

fn is_unconditional_branch(word: u32) -> bool {
    CpuInstruction::decode(word).is_unconditional_branch()
}

/// Tighten a region's boundaries in place.
///
/// The start advances past implausible head instructions and leading zero
/// words. The end retreats until the region closes with an unconditional
/// non-linking branch (`b`, `j`, or `jr`) and its delay slot; anything
/// after such a branch would run into the invalid words that stopped the
/// forward growth.
pub fn trim_region(region: &mut RomRegion, rom: &Rom, options: &ScanOptions) {
    let invalid_start_count = count_invalid_start_instructions(region, rom, options);
    let mut start = region.rom_start + invalid_start_count * INSTRUCTION_SIZE;
    let mut end = region.rom_end;

    // Strip leading nop padding.
    while end > start && rom.read32(start) == 0 {
        start += INSTRUCTION_SIZE;
    }

    // Scan two instructions back from the end so the branch keeps its
    // delay slot.
    while end > start && !is_unconditional_branch(rom.read32(end - 2 * INSTRUCTION_SIZE)) {
        end -= INSTRUCTION_SIZE;
    }

    region.rom_start = start;
    region.rom_end = end;
}

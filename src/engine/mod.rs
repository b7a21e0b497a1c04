//! The code-region discovery engine.
//!
//! A single pass over the return sites drives everything: grow a region
//! around each site, trim its boundaries, decide whether it fuses with
//! its predecessor across a gap of valid code, and chase RSP microcode
//! past the end of flagged regions. The engine is total: it cannot fail,
//! and an empty result is a valid outcome.

pub mod prologue;
pub mod scan;
pub mod validate;

use tracing::debug;

use crate::rom::Rom;
use crate::types::{RomRegion, ScanOptions, INSTRUCTION_SIZE};

pub use prologue::count_invalid_start_instructions;
pub use scan::{find_code_end, find_code_start, find_return_locations, trim_region};
pub use validate::{check_range_cpu, check_range_rsp, is_valid_cpu, is_valid_rsp};

/// Find all code regions in the ROM using the default tuning.
pub fn find_code_regions(rom: &Rom) -> Vec<RomRegion> {
    find_code_regions_with(rom, &ScanOptions::default())
}

/// Find all code regions in the ROM.
///
/// Regions come back in ascending, non-overlapping address order. Each
/// covers words that validate as CPU code, except for a tail appended by
/// microcode extension, whose words validate as RSP code instead.
pub fn find_code_regions_with(rom: &Rom, options: &ScanOptions) -> Vec<RomRegion> {
    let return_addrs = find_return_locations(rom);
    debug!(returns = return_addrs.len(), "scanned return sites");

    let mut regions: Vec<RomRegion> = Vec::new();

    let mut it = 0;
    while it < return_addrs.len() {
        let addr = return_addrs[it];
        // Clamp backward growth at the previous region so an RSP tail
        // that also decodes as CPU code cannot be claimed twice.
        let floor = regions
            .last()
            .map_or(crate::rom::ROM_HEADER_SIZE, |prev| prev.rom_end);
        let start = find_code_start(rom, addr).max(floor);
        let end = find_code_end(rom, addr);
        regions.push(RomRegion::new(start, end));

        // Claim every return site the grown region swallowed.
        while it < return_addrs.len() && return_addrs[it] < end {
            it += 1;
        }

        trim_region(regions.last_mut().expect("region just pushed"), rom, options);

        // A small gap to the previous region that itself scans as code
        // means the two are one region. A gap of microcode flags the
        // predecessor as carrying RSP code.
        if regions.len() > 1 {
            let prev_end = regions[regions.len() - 2].rom_end;
            let cur = *regions.last().expect("at least two regions");
            if cur.rom_start >= prev_end
                && cur.rom_start - prev_end < options.microcode_check_threshold
            {
                let mut valid_gap = check_range_cpu(prev_end, cur.rom_start, rom);
                if !valid_gap {
                    valid_gap = check_range_rsp(prev_end, cur.rom_start, rom);
                    if valid_gap {
                        let prev_idx = regions.len() - 2;
                        regions[prev_idx].has_rsp = true;
                    }
                }
                if valid_gap {
                    debug!(
                        gap_start = prev_end,
                        gap_end = cur.rom_start,
                        "merged adjacent regions"
                    );
                    regions.pop();
                    let prev = regions.last_mut().expect("predecessor exists");
                    prev.rom_end = cur.rom_end;
                }
            }
        }

        // Regions flagged for microcode keep going while the words keep
        // validating as RSP code; the trailing trim then squares the end
        // off at the last branch.
        let last = regions.last_mut().expect("region exists");
        if last.has_rsp {
            while last.rom_end < rom.len() && is_valid_rsp(rom.read32(last.rom_end)) {
                last.rom_end += INSTRUCTION_SIZE;
            }
            trim_region(last, rom, options);
            let extended_end = regions.last().expect("region exists").rom_end;
            while it < return_addrs.len() && return_addrs[it] < extended_end {
                it += 1;
            }
        }

        // Optionally discard regions too short to be believable code.
        if let Some(min_instructions) = options.min_region_instructions {
            let last = *regions.last().expect("region exists");
            if last.len_instructions() < min_instructions {
                debug!(rom_start = last.rom_start, "discarded undersized region");
                regions.pop();
            }
        }
    }

    debug!(regions = regions.len(), "region discovery complete");
    regions
}

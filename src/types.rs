//! Core types for the code-region finder.

use serde::{Deserialize, Serialize};

/// Size of one MIPS instruction in bytes.
pub const INSTRUCTION_SIZE: usize = 4;

/// A contiguous range of ROM offsets deemed to contain code.
///
/// Bounds are byte offsets into the normalized ROM image, both multiples
/// of four, with `rom_start <= rom_end`. The half-open interval
/// `[rom_start, rom_end)` covers the instructions. `has_rsp` marks
/// regions where microcode was detected adjacent to or within the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomRegion {
    /// Byte offset of the first instruction.
    pub rom_start: usize,
    /// Byte offset one past the last instruction.
    pub rom_end: usize,
    /// Whether RSP microcode was detected in or after this region.
    pub has_rsp: bool,
}

impl RomRegion {
    /// Create a region with no microcode flag.
    pub fn new(rom_start: usize, rom_end: usize) -> Self {
        Self {
            rom_start,
            rom_end,
            has_rsp: false,
        }
    }

    /// Length of the region in bytes.
    pub fn len_bytes(&self) -> usize {
        self.rom_end - self.rom_start
    }

    /// Length of the region in instructions.
    pub fn len_instructions(&self) -> usize {
        self.len_bytes() / INSTRUCTION_SIZE
    }

    /// Whether the region covers no instructions.
    pub fn is_empty(&self) -> bool {
        self.rom_start == self.rom_end
    }
}

/// Tunables for the region discovery heuristics.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum gap, in bytes, across which two regions are considered for
    /// merging when the gap itself scans as valid code.
    pub microcode_check_threshold: usize,
    /// When set, discard regions shorter than this many instructions.
    pub min_region_instructions: Option<usize>,
    /// Treat `$v0` and `$fv0` as initialized when judging region starts.
    /// gcc uses these for the first reference to an uninitialized local,
    /// so leaving this on avoids rejecting such function heads.
    pub weak_uninitialized_check: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            microcode_check_threshold: 1024 * INSTRUCTION_SIZE,
            min_region_instructions: None,
            weak_uninitialized_check: true,
        }
    }
}

impl ScanOptions {
    /// Create options with the default tuning.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_lengths() {
        let region = RomRegion::new(0x1000, 0x1014);
        assert_eq!(region.len_bytes(), 0x14);
        assert_eq!(region.len_instructions(), 5);
        assert!(!region.is_empty());
        assert!(RomRegion::new(0x1000, 0x1000).is_empty());
    }

    #[test]
    fn test_default_options() {
        let opts = ScanOptions::new();
        assert_eq!(opts.microcode_check_threshold, 4096);
        assert!(opts.min_region_instructions.is_none());
        assert!(opts.weak_uninitialized_check);
    }
}

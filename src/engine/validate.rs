//! Instruction validity heuristics.
//!
//! These predicates decide whether a word plausibly belongs to real code
//! for each processor. They are deliberately stricter than the
//! architecture: encodings that are legal but never emitted for this
//! console (degenerate `$zero` addressing, trap instructions, linked-load
//! families) count as invalid, since matching on them drags data into
//! code regions.

use crate::isa::cpu::{CpuInstruction, CpuOpcode};
use crate::isa::registers::gpr;
use crate::isa::rsp::{RspInstruction, RspOpcode};
use crate::rom::Rom;
use crate::types::INSTRUCTION_SIZE;

/// Coprocessor-0 register indices that do not exist on the R4300i.
fn invalid_cpu_cop0_register(reg: u8) -> bool {
    reg == 7 || (21..=25).contains(&reg) || reg == 31
}

/// The RSP exposes only the first sixteen coprocessor-0 registers.
fn invalid_rsp_cop0_register(reg: u8) -> bool {
    reg > 15
}

/// Architecturally valid instructions that no retail N64 title uses.
fn is_unused_n64_instruction(id: CpuOpcode) -> bool {
    matches!(
        id,
        CpuOpcode::Ll | CpuOpcode::Sc | CpuOpcode::Lld | CpuOpcode::Scd | CpuOpcode::Syscall
    )
}

/// Check whether a word is plausible CPU code.
pub fn is_valid_cpu(word: u32) -> bool {
    is_valid_cpu_instruction(&CpuInstruction::decode(word))
}

/// Check whether a decoded CPU instruction is plausible code.
pub fn is_valid_cpu_instruction(instr: &CpuInstruction) -> bool {
    let id = instr.id();

    if id == CpuOpcode::Invalid || !instr.is_well_formed() {
        return false;
    }

    // Loads and stores with an offset from $zero are degenerate and
    // never emitted by compilers targeting this console.
    if (instr.does_load() || instr.does_store()) && instr.rs() == gpr::ZERO {
        return false;
    }

    // Arithmetic whose result lands in $zero would be a no-op.
    if arithmetic_writes_zero_cpu(instr) {
        return false;
    }

    // mtc0/mfc0 naming a nonexistent coprocessor-0 register.
    if matches!(id, CpuOpcode::Mtc0 | CpuOpcode::Mfc0)
        && invalid_cpu_cop0_register(instr.cop0_reg())
    {
        return false;
    }

    if is_unused_n64_instruction(id) {
        return false;
    }

    // cache carries a 3-bit operation and a 2-bit target selector; only
    // operations 0-6 and selectors 0-1 exist.
    if id == CpuOpcode::Cache {
        let param = instr.cache_op();
        if param >> 2 > 6 || param & 0x3 > 1 {
            return false;
        }
    }

    // The console's CPU has no coprocessor 2.
    if matches!(
        id,
        CpuOpcode::Lwc2 | CpuOpcode::Ldc2 | CpuOpcode::Swc2 | CpuOpcode::Sdc2
    ) {
        return false;
    }

    if instr.is_trap() {
        return false;
    }

    // ctc0 and cfc0 are not implemented on this CPU, nor is pref.
    if matches!(id, CpuOpcode::Ctc0 | CpuOpcode::Cfc0 | CpuOpcode::Pref) {
        return false;
    }

    true
}

/// Check whether a word is plausible RSP microcode.
pub fn is_valid_rsp(word: u32) -> bool {
    is_valid_rsp_instruction(&RspInstruction::decode(word))
}

/// Check whether a decoded RSP instruction is plausible microcode.
pub fn is_valid_rsp_instruction(instr: &RspInstruction) -> bool {
    let id = instr.id();

    if id == RspOpcode::Invalid || !instr.is_well_formed() {
        return false;
    }

    if arithmetic_writes_zero_rsp(instr) {
        return false;
    }

    if matches!(id, RspOpcode::Mtc0 | RspOpcode::Mfc0)
        && invalid_rsp_cop0_register(instr.cop0_reg())
    {
        return false;
    }

    // Encodings the RSP simply does not have.
    if matches!(
        id,
        RspOpcode::Lwc1 | RspOpcode::Swc1 | RspOpcode::Ctc0 | RspOpcode::Cfc0 | RspOpcode::Cache
    ) {
        return false;
    }

    true
}

fn arithmetic_writes_zero_cpu(instr: &CpuInstruction) -> bool {
    instr.is_arithmetic()
        && ((instr.modifies_rd() && instr.rd() == gpr::ZERO)
            || (instr.modifies_rt() && instr.rt() == gpr::ZERO))
}

fn arithmetic_writes_zero_rsp(instr: &RspInstruction) -> bool {
    instr.is_arithmetic()
        && ((instr.modifies_rd() && instr.rd() == gpr::ZERO)
            || (instr.modifies_rt() && instr.rt() == gpr::ZERO))
}

/// Check whether every word in `[rom_start, rom_end)` is plausible CPU code.
///
/// Three or more consecutive identical load or store words are a strong
/// signal of data misread as code, so the range is rejected. Repeated
/// identical arithmetic is allowed; compilers do emit it.
pub fn check_range_cpu(rom_start: usize, rom_end: usize, rom: &Rom) -> bool {
    let mut prev_word = None;
    let mut repeated = 1usize;
    for offset in (rom_start..rom_end).step_by(INSTRUCTION_SIZE) {
        let word = rom.read32(offset);
        let instr = CpuInstruction::decode(word);
        if !is_valid_cpu_instruction(&instr) {
            return false;
        }
        if prev_word == Some(word) {
            repeated += 1;
        } else {
            repeated = 1;
            prev_word = Some(word);
        }
        if repeated >= 3 && (instr.does_load() || instr.does_store()) {
            return false;
        }
    }
    true
}

/// Check whether every word in `[rom_start, rom_end)` is plausible RSP
/// microcode, with the same repeated-load/store rejection as
/// [`check_range_cpu`].
pub fn check_range_rsp(rom_start: usize, rom_end: usize, rom: &Rom) -> bool {
    let mut prev_word = None;
    let mut repeated = 1usize;
    for offset in (rom_start..rom_end).step_by(INSTRUCTION_SIZE) {
        let word = rom.read32(offset);
        let instr = RspInstruction::decode(word);
        if !is_valid_rsp_instruction(&instr) {
            return false;
        }
        if prev_word == Some(word) {
            repeated += 1;
        } else {
            repeated = 1;
            prev_word = Some(word);
        }
        if repeated >= 3 && (instr.does_load() || instr.does_store()) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::patterns;

    #[test]
    fn test_valid_cpu_basics() {
        assert!(is_valid_cpu(patterns::NOP));
        assert!(is_valid_cpu(patterns::JR_RA));
        assert!(is_valid_cpu(0x27BD_FFF8)); // addiu $sp, $sp, -8
        assert!(is_valid_cpu(0xAFBF_0000)); // sw $ra, 0($sp)
        assert!(!is_valid_cpu(0xFFFF_FFFF));
    }

    #[test]
    fn test_zero_base_memory_rejected() {
        // lw $t0, 0($zero)
        assert!(!is_valid_cpu(0x8C08_0000));
        // sw $t0, 0($zero)
        assert!(!is_valid_cpu(0xAC08_0000));
        // lw $t0, 0($t1) is fine
        assert!(is_valid_cpu(0x8D28_0000));
    }

    #[test]
    fn test_arithmetic_to_zero_rejected() {
        // addu $zero, $a0, $a1
        assert!(!is_valid_cpu(0x0085_0021));
        // addiu $zero, $a0, 1
        assert!(!is_valid_cpu(0x2480_0001));
        // addu $t0, $a0, $a1 is fine
        assert!(is_valid_cpu(0x0085_4021));
    }

    #[test]
    fn test_unused_n64_instructions_rejected() {
        assert!(!is_valid_cpu(0xC128_0000)); // ll $t0, 0($t1)
        assert!(!is_valid_cpu(0xE128_0000)); // sc $t0, 0($t1)
        assert!(!is_valid_cpu(0xD128_0000)); // lld $t0, 0($t1)
        assert!(!is_valid_cpu(0xF128_0000)); // scd $t0, 0($t1)
        assert!(!is_valid_cpu(0x0000_000C)); // syscall
    }

    #[test]
    fn test_cop0_register_rules() {
        assert!(is_valid_cpu(0x4088_6000)); // mtc0 $t0, $12
        assert!(!is_valid_cpu(0x4088_3800)); // mtc0 $t0, $7
        assert!(!is_valid_cpu(0x4008_F800)); // mfc0 $t0, $31
    }

    #[test]
    fn test_cache_parameter_rules() {
        assert!(is_valid_cpu(0xBC81_0000)); // cache 0x01, 0($a0)
        assert!(!is_valid_cpu(0xBC9F_0000)); // cache 0x1F, 0($a0)
        assert!(!is_valid_cpu(0xBC83_0000)); // cache 0x03, 0($a0): selector 3
    }

    #[test]
    fn test_cop2_and_traps_rejected() {
        assert!(!is_valid_cpu(0xC880_2000)); // lwc2
        assert!(!is_valid_cpu(0xE880_2000)); // swc2
        assert!(!is_valid_cpu(0x0109_0034)); // teq $t0, $t1
        assert!(!is_valid_cpu(0x050E_0000)); // tnei $t0, 0
    }

    #[test]
    fn test_missing_cpu_cop_moves_rejected() {
        assert!(!is_valid_cpu(0x4048_4000)); // cfc0 $t0, $8
        assert!(!is_valid_cpu(0x40C8_4000)); // ctc0 $t0, $8
        assert!(!is_valid_cpu(0xCC80_0000)); // pref 0, 0($a0)
    }

    #[test]
    fn test_valid_rsp_basics() {
        assert!(is_valid_rsp(patterns::NOP));
        assert!(is_valid_rsp(patterns::JR_RA));
        assert!(is_valid_rsp(0x4A00_0000)); // vmulf
        assert!(is_valid_rsp(0xC880_2000)); // lqv
        assert!(!is_valid_rsp(0xFFFF_FFFF));
    }

    #[test]
    fn test_rsp_missing_encodings_rejected() {
        assert!(!is_valid_rsp(0xC480_0000)); // lwc1
        assert!(!is_valid_rsp(0xE480_0000)); // swc1
        assert!(!is_valid_rsp(0xBC81_0000)); // cache
        assert!(!is_valid_rsp(0x4048_4000)); // cfc0
        assert!(!is_valid_rsp(0x40C8_4000)); // ctc0
    }

    #[test]
    fn test_rsp_cop0_register_limit() {
        assert!(is_valid_rsp(0x4008_2000)); // mfc0 $t0, $4
        assert!(!is_valid_rsp(0x4008_8000)); // mfc0 $t0, $16
    }

    #[test]
    fn test_rsp_arithmetic_to_zero_rejected() {
        assert!(!is_valid_rsp(0x0085_0021)); // addu $zero, $a0, $a1
        assert!(is_valid_rsp(0x0085_4021)); // addu $t0, $a0, $a1
    }

    fn rom_of_words(words: &[u32]) -> Rom {
        let mut bytes = Vec::new();
        for word in words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        Rom::new(bytes)
    }

    #[test]
    fn test_check_range_repeated_stores() {
        // Three identical sw words read like a data table.
        let rom = rom_of_words(&[0xAFBF_0000, 0xAFBF_0000, 0xAFBF_0000]);
        assert!(!check_range_cpu(0, rom.len(), &rom));

        // Two in a row are fine.
        let rom = rom_of_words(&[0xAFBF_0000, 0xAFBF_0000, 0x27BD_FFF8]);
        assert!(check_range_cpu(0, rom.len(), &rom));
    }

    #[test]
    fn test_check_range_repeated_arithmetic_allowed() {
        let rom = rom_of_words(&[0x2484_0004, 0x2484_0004, 0x2484_0004]);
        assert!(check_range_cpu(0, rom.len(), &rom));
    }

    #[test]
    fn test_check_range_rsp_microcode() {
        let rom = rom_of_words(&[0x4A00_0000, 0xC880_2000, 0x4A00_0010, 0xE880_2000]);
        assert!(check_range_rsp(0, rom.len(), &rom));
        // The vector words are not CPU code.
        assert!(!check_range_cpu(0, rom.len(), &rom));
    }
}

//! Start-boundary analysis for candidate regions.
//!
//! Backward region growth accepts any run of individually valid words, so
//! the first few "instructions" of a grown region are often data that
//! happens to decode. Real function heads obey the calling convention:
//! they only read registers the caller is obliged to have set. This
//! module walks the head of a region against a fixed abstract
//! register-initialization state and counts how many leading instructions
//! should be discarded.
//!
//! The state is not updated during the walk. The goal is a cheap boundary
//! check, not a dataflow analysis; the first instruction that looks like
//! a plausible function head ends the scan.

use crate::engine::validate::is_valid_cpu_instruction;
use crate::isa::cpu::{CpuInstruction, CpuOpcode};
use crate::isa::registers::{fpr, gpr};
use crate::rom::Rom;
use crate::types::{RomRegion, ScanOptions, INSTRUCTION_SIZE};

/// Abstract initialization state, one flag per register.
pub type RegisterStates = [bool; 32];

fn initial_gpr_states(options: &ScanOptions) -> RegisterStates {
    let mut states = [false; 32];

    // $zero is always its value, and the caller always provides a stack
    // pointer and return address.
    states[gpr::ZERO as usize] = true;
    states[gpr::SP as usize] = true;
    states[gpr::RA as usize] = true;

    // Argument registers may be read immediately.
    states[gpr::A0 as usize] = true;
    states[gpr::A1 as usize] = true;
    states[gpr::A2 as usize] = true;
    states[gpr::A3 as usize] = true;

    if options.weak_uninitialized_check {
        states[gpr::V0 as usize] = true;
    }

    states
}

fn initial_fpr_states(options: &ScanOptions) -> RegisterStates {
    let mut states = [false; 32];

    states[fpr::FA0 as usize] = true;
    states[fpr::FA0F as usize] = true;
    states[fpr::FA1 as usize] = true;
    states[fpr::FA1F as usize] = true;

    if options.weak_uninitialized_check {
        states[fpr::FV0 as usize] = true;
        states[fpr::FV0F as usize] = true;
    }

    states
}

/// Whether the instruction reads a register the abstract state has not
/// marked initialized.
///
/// Operand-to-input mapping: `rs` is always an input; `rd` and `rt` are
/// inputs when the instruction does not modify them; `fs` is an input
/// except for `mtc1`/`dmtc1`; `ft` is an input except for `lwc1`/`ldc1`;
/// `fd` is never an input.
fn references_uninitialized(
    instr: &CpuInstruction,
    gpr_states: &RegisterStates,
    fpr_states: &RegisterStates,
) -> bool {
    let id = instr.id();

    if instr.uses_rs() && !gpr_states[instr.rs() as usize] {
        return true;
    }
    if instr.uses_rd() && !instr.modifies_rd() && !gpr_states[instr.rd() as usize] {
        return true;
    }
    if instr.uses_rt() && !instr.modifies_rt() && !gpr_states[instr.rt() as usize] {
        return true;
    }
    if instr.uses_fs()
        && !matches!(id, CpuOpcode::Mtc1 | CpuOpcode::Dmtc1)
        && !fpr_states[instr.fs() as usize]
    {
        return true;
    }
    if instr.uses_ft()
        && !matches!(id, CpuOpcode::Lwc1 | CpuOpcode::Ldc1)
        && !fpr_states[instr.ft() as usize]
    {
        return true;
    }

    false
}

/// Whether the instruction writes `$zero` through either destination field.
fn has_zero_output(instr: &CpuInstruction) -> bool {
    (instr.modifies_rd() && instr.rd() == gpr::ZERO)
        || (instr.modifies_rt() && instr.rt() == gpr::ZERO)
}

/// Judge whether an instruction is implausible as the first instruction
/// of a function.
pub fn is_invalid_start_instruction(
    instr: &CpuInstruction,
    gpr_states: &RegisterStates,
    fpr_states: &RegisterStates,
) -> bool {
    let id = instr.id();

    // Functions rarely open with a nop; a stray one is recovered by the
    // leading-zero trim anyway.
    if id == CpuOpcode::Nop {
        return true;
    }

    if !is_valid_cpu_instruction(instr) {
        return true;
    }

    if has_zero_output(instr) {
        return true;
    }

    if references_uninitialized(instr, gpr_states, fpr_states) {
        return true;
    }

    // An unconditional branch cannot open a function.
    if matches!(id, CpuOpcode::B | CpuOpcode::J) {
        return true;
    }

    // A linked jump would clobber $ra before it was saved.
    if matches!(id, CpuOpcode::Jal | CpuOpcode::Jalr) {
        return true;
    }

    if id == CpuOpcode::Jr && instr.rs() == gpr::ZERO {
        return true;
    }

    // A shift of $zero by a non-zero amount computes nothing.
    if matches!(
        id,
        CpuOpcode::Sll
            | CpuOpcode::Srl
            | CpuOpcode::Sra
            | CpuOpcode::Dsll
            | CpuOpcode::Dsll32
            | CpuOpcode::Dsrl
            | CpuOpcode::Dsrl32
            | CpuOpcode::Dsra
            | CpuOpcode::Dsra32
    ) && instr.rt() == gpr::ZERO
        && instr.sa() != 0
    {
        return true;
    }

    if matches!(id, CpuOpcode::Mthi | CpuOpcode::Mtlo) {
        return true;
    }

    // The float condition flag cannot have been set yet.
    if matches!(
        id,
        CpuOpcode::Bc1t | CpuOpcode::Bc1f | CpuOpcode::Bc1tl | CpuOpcode::Bc1fl
    ) {
        return true;
    }

    // Compilers emit addu/subu; the overflow-trapping forms at a function
    // head are a strong sign of misread data.
    if matches!(id, CpuOpcode::Add | CpuOpcode::Sub) {
        return true;
    }

    false
}

/// Count how many leading instructions of the region are implausible as a
/// function head. The walk is bounded by the region length.
pub fn count_invalid_start_instructions(
    region: &RomRegion,
    rom: &Rom,
    options: &ScanOptions,
) -> usize {
    let gpr_states = initial_gpr_states(options);
    let fpr_states = initial_fpr_states(options);

    let limit = region.len_instructions();
    let mut index = 0;
    while index < limit {
        let word = rom.read32(region.rom_start + index * INSTRUCTION_SIZE);
        let instr = CpuInstruction::decode(word);
        if !is_invalid_start_instruction(&instr, &gpr_states, &fpr_states) {
            break;
        }
        index += 1;
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::patterns;

    fn states() -> (RegisterStates, RegisterStates) {
        let opts = ScanOptions::default();
        (initial_gpr_states(&opts), initial_fpr_states(&opts))
    }

    fn is_bad_start(word: u32) -> bool {
        let (gpr_states, fpr_states) = states();
        is_invalid_start_instruction(&CpuInstruction::decode(word), &gpr_states, &fpr_states)
    }

    #[test]
    fn test_plausible_function_heads() {
        assert!(!is_bad_start(0x27BD_FFF8)); // addiu $sp, $sp, -8
        assert!(!is_bad_start(0xAFBF_0000)); // sw $ra, 0($sp)
        assert!(!is_bad_start(0x3C08_8000)); // lui $t0, 0x8000
        assert!(!is_bad_start(0x0080_1021)); // addu $v0, $a0, $zero
    }

    #[test]
    fn test_nop_and_invalid_rejected() {
        assert!(is_bad_start(patterns::NOP));
        assert!(is_bad_start(0xFFFF_FFFF));
    }

    #[test]
    fn test_uninitialized_reads_rejected() {
        // addu $v1, $t0, $t1 reads two temporaries
        assert!(is_bad_start(0x0109_1821));
        // lw $t0, 0($t1) reads an uninitialized base
        assert!(is_bad_start(0x8D28_0000));
        // lw $t0, 0($a0) is fine
        assert!(!is_bad_start(0x8C88_0000));
    }

    #[test]
    fn test_weak_uninitialized_check() {
        // sw $v0, 0($sp) reads $v0
        let word = 0xAFA2_0000;
        assert!(!is_bad_start(word));

        let strict = ScanOptions {
            weak_uninitialized_check: false,
            ..ScanOptions::default()
        };
        let gpr_states = initial_gpr_states(&strict);
        let fpr_states = initial_fpr_states(&strict);
        assert!(is_invalid_start_instruction(
            &CpuInstruction::decode(word),
            &gpr_states,
            &fpr_states
        ));
    }

    #[test]
    fn test_control_flow_rejected() {
        assert!(is_bad_start(0x1000_0001)); // b
        assert!(is_bad_start(0x0800_0400)); // j
        assert!(is_bad_start(0x0C00_0400)); // jal
        assert!(is_bad_start(0x0000_0008)); // jr $zero
        assert!(!is_bad_start(patterns::JR_RA)); // jr $ra is a plausible head
    }

    #[test]
    fn test_suspicious_arithmetic_rejected() {
        assert!(is_bad_start(0x0000_4100)); // sll $t0, $zero, 4
        assert!(is_bad_start(0x0100_0011)); // mthi $t0
        assert!(is_bad_start(0x0085_4020)); // add $t0, $a0, $a1
        assert!(is_bad_start(0x4501_0000)); // bc1t
    }

    fn rom_with_head(words: &[u32]) -> (Rom, RomRegion) {
        let mut bytes = vec![0u8; 0x1000];
        for word in words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let end = bytes.len();
        (Rom::new(bytes), RomRegion::new(0x1000, end))
    }

    #[test]
    fn test_count_skips_leading_garbage() {
        let (rom, region) = rom_with_head(&[
            patterns::NOP,  // rejected
            0x0109_1821,    // addu $v1, $t0, $t1: uninitialized reads
            0x27BD_FFF8,    // addiu $sp, $sp, -8: plausible head
            0xAFBF_0000,    // sw $ra, 0($sp)
        ]);
        let opts = ScanOptions::default();
        assert_eq!(count_invalid_start_instructions(&region, &rom, &opts), 2);
    }

    #[test]
    fn test_count_bounded_by_region() {
        let (rom, region) = rom_with_head(&[patterns::NOP, patterns::NOP]);
        let opts = ScanOptions::default();
        assert_eq!(count_invalid_start_instructions(&region, &rom, &opts), 2);
    }
}

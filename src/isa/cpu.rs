//! R4300i (MIPS III) instruction decoding.
//!
//! Decoding is split in two: [`CpuInstruction::decode`] maps a word onto a
//! unique opcode id from the primary/secondary opcode fields, and
//! [`CpuInstruction::is_well_formed`] checks the fields the architecture
//! reserves as zero for that id. The code-region heuristics only ever ask
//! questions of the decoded view (operand fields, load/store class, which
//! operands are register inputs), so the decoder stays swappable.

use crate::isa::{get_funct, get_opcode, get_rd, get_rs, get_rt, get_sa};

/// Unique CPU opcode identifiers.
///
/// Covers the MIPS III encoding space as implemented by the R4300i, with
/// one id per instruction the heuristics can observe. Floating-point
/// arithmetic uses one id per operation across formats; the format field
/// is validated during decode. `Invalid` is the sentinel for undefined
/// encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CpuOpcode {
    Invalid,
    Nop,
    // Jumps and branches
    J,
    Jal,
    B,
    Beq,
    Bne,
    Blez,
    Bgtz,
    Beql,
    Bnel,
    Blezl,
    Bgtzl,
    Bltz,
    Bgez,
    Bltzl,
    Bgezl,
    Bltzal,
    Bgezal,
    Bltzall,
    Bgezall,
    Jr,
    Jalr,
    // Immediate arithmetic
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    Daddi,
    Daddiu,
    // Loads
    Lb,
    Lbu,
    Lh,
    Lhu,
    Lw,
    Lwu,
    Lwl,
    Lwr,
    Ld,
    Ldl,
    Ldr,
    Ll,
    Lld,
    Lwc1,
    Ldc1,
    Lwc2,
    Ldc2,
    // Stores
    Sb,
    Sh,
    Sw,
    Swl,
    Swr,
    Sd,
    Sdl,
    Sdr,
    Sc,
    Scd,
    Swc1,
    Sdc1,
    Swc2,
    Sdc2,
    Cache,
    Pref,
    // SPECIAL register arithmetic
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Dsll,
    Dsrl,
    Dsra,
    Dsll32,
    Dsrl32,
    Dsra32,
    Dsllv,
    Dsrlv,
    Dsrav,
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Dadd,
    Daddu,
    Dsub,
    Dsubu,
    Mult,
    Multu,
    Div,
    Divu,
    Dmult,
    Dmultu,
    Ddiv,
    Ddivu,
    Mfhi,
    Mthi,
    Mflo,
    Mtlo,
    Syscall,
    Break,
    Sync,
    // Traps
    Tge,
    Tgeu,
    Tlt,
    Tltu,
    Teq,
    Tne,
    Tgei,
    Tgeiu,
    Tlti,
    Tltiu,
    Teqi,
    Tnei,
    // Coprocessor 0
    Mfc0,
    Dmfc0,
    Mtc0,
    Dmtc0,
    Cfc0,
    Ctc0,
    Tlbr,
    Tlbwi,
    Tlbwr,
    Tlbp,
    Eret,
    // Coprocessor 1
    Mfc1,
    Dmfc1,
    Mtc1,
    Dmtc1,
    Cfc1,
    Ctc1,
    Bc1f,
    Bc1t,
    Bc1fl,
    Bc1tl,
    FpAdd,
    FpSub,
    FpMul,
    FpDiv,
    FpSqrt,
    FpAbs,
    FpMov,
    FpNeg,
    FpRoundL,
    FpTruncL,
    FpCeilL,
    FpFloorL,
    FpRoundW,
    FpTruncW,
    FpCeilW,
    FpFloorW,
    FpCvtS,
    FpCvtD,
    FpCvtW,
    FpCvtL,
    FpCond,
}

/// A decoded CPU instruction word.
#[derive(Debug, Clone, Copy)]
pub struct CpuInstruction {
    word: u32,
    id: CpuOpcode,
}

impl CpuInstruction {
    /// Decode a 32-bit instruction word.
    pub fn decode(word: u32) -> Self {
        Self {
            word,
            id: classify(word),
        }
    }

    /// The raw instruction word.
    pub fn word(&self) -> u32 {
        self.word
    }

    /// The unique opcode id, or [`CpuOpcode::Invalid`].
    pub fn id(&self) -> CpuOpcode {
        self.id
    }

    /// The `rs` register field.
    pub fn rs(&self) -> u8 {
        get_rs(self.word)
    }

    /// The `rt` register field.
    pub fn rt(&self) -> u8 {
        get_rt(self.word)
    }

    /// The `rd` register field.
    pub fn rd(&self) -> u8 {
        get_rd(self.word)
    }

    /// The shift amount field.
    pub fn sa(&self) -> u8 {
        get_sa(self.word)
    }

    /// The `fs` floating-point register field (the `rd` bit positions).
    pub fn fs(&self) -> u8 {
        get_rd(self.word)
    }

    /// The `ft` floating-point register field (the `rt` bit positions).
    pub fn ft(&self) -> u8 {
        get_rt(self.word)
    }

    /// The `fd` floating-point register field (the `sa` bit positions).
    pub fn fd(&self) -> u8 {
        get_sa(self.word)
    }

    /// The coprocessor-0 register index named by `mtc0`/`mfc0`.
    pub fn cop0_reg(&self) -> u8 {
        get_rd(self.word)
    }

    /// The operation field of a `cache` instruction (the `rt` bit positions).
    pub fn cache_op(&self) -> u8 {
        get_rt(self.word)
    }

    /// Whether the reserved fields for this opcode hold their required values.
    pub fn is_well_formed(&self) -> bool {
        use CpuOpcode::*;
        let rs = self.rs();
        let rt = self.rt();
        let rd = self.rd();
        let sa = self.sa();
        match self.id {
            Invalid => false,
            Nop => true,
            // Constant shifts encode the amount in sa; rs is reserved.
            Sll | Srl | Sra | Dsll | Dsrl | Dsra | Dsll32 | Dsrl32 | Dsra32 => rs == 0,
            // Variable shifts take the amount from rs; sa is reserved.
            Sllv | Srlv | Srav | Dsllv | Dsrlv | Dsrav => sa == 0,
            Jr => rt == 0 && rd == 0 && sa == 0,
            Jalr => rt == 0 && sa == 0,
            Mfhi | Mflo => rs == 0 && rt == 0 && sa == 0,
            Mthi | Mtlo => rt == 0 && rd == 0 && sa == 0,
            Mult | Multu | Div | Divu | Dmult | Dmultu | Ddiv | Ddivu => rd == 0 && sa == 0,
            Add | Addu | Sub | Subu | And | Or | Xor | Nor | Slt | Sltu | Dadd | Daddu | Dsub
            | Dsubu => sa == 0,
            Sync => rs == 0 && rt == 0 && rd == 0 && sa == 0,
            Blez | Bgtz | Blezl | Bgtzl => rt == 0,
            Lui => rs == 0,
            // Coprocessor moves reserve the low eleven bits.
            Mfc0 | Dmfc0 | Mtc0 | Dmtc0 | Cfc0 | Ctc0 | Mfc1 | Dmfc1 | Mtc1 | Dmtc1 | Cfc1
            | Ctc1 => self.word & 0x7FF == 0,
            Tlbr | Tlbwi | Tlbwr | Tlbp | Eret => self.word & 0x01FF_FFC0 == 0,
            // The condition-code bits of rt are reserved on this CPU.
            Bc1f | Bc1t | Bc1fl | Bc1tl => rt & 0x1C == 0,
            // Single-operand float ops reserve ft.
            FpSqrt | FpAbs | FpMov | FpNeg | FpRoundL | FpTruncL | FpCeilL | FpFloorL
            | FpRoundW | FpTruncW | FpCeilW | FpFloorW | FpCvtS | FpCvtD | FpCvtW | FpCvtL => {
                rt == 0
            }
            FpCond => sa == 0,
            _ => true,
        }
    }

    /// Whether this instruction writes the `rd` register.
    pub fn modifies_rd(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Sll | Srl
                | Sra
                | Sllv
                | Srlv
                | Srav
                | Dsll
                | Dsrl
                | Dsra
                | Dsll32
                | Dsrl32
                | Dsra32
                | Dsllv
                | Dsrlv
                | Dsrav
                | Add
                | Addu
                | Sub
                | Subu
                | And
                | Or
                | Xor
                | Nor
                | Slt
                | Sltu
                | Dadd
                | Daddu
                | Dsub
                | Dsubu
                | Jalr
                | Mfhi
                | Mflo
        )
    }

    /// Whether this instruction writes the `rt` register.
    pub fn modifies_rt(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Addi | Addiu
                | Slti
                | Sltiu
                | Andi
                | Ori
                | Xori
                | Lui
                | Daddi
                | Daddiu
                | Lb
                | Lbu
                | Lh
                | Lhu
                | Lw
                | Lwu
                | Lwl
                | Lwr
                | Ld
                | Ldl
                | Ldr
                | Ll
                | Lld
                | Sc
                | Scd
                | Mfc0
                | Dmfc0
                | Cfc0
                | Mfc1
                | Dmfc1
                | Cfc1
        )
    }

    /// Whether this instruction loads from memory.
    pub fn does_load(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Lb | Lbu | Lh | Lhu | Lw | Lwu | Lwl | Lwr | Ld | Ldl | Ldr | Ll | Lld | Lwc1 | Ldc1
        )
    }

    /// Whether this instruction stores to memory.
    pub fn does_store(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Sb | Sh | Sw | Swl | Swr | Sd | Sdl | Sdr | Sc | Scd | Swc1 | Sdc1
        )
    }

    /// Whether this instruction belongs to the floating-point unit.
    pub fn is_float(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Lwc1 | Ldc1
                | Swc1
                | Sdc1
                | Mfc1
                | Dmfc1
                | Mtc1
                | Dmtc1
                | Cfc1
                | Ctc1
                | Bc1f
                | Bc1t
                | Bc1fl
                | Bc1tl
                | FpAdd
                | FpSub
                | FpMul
                | FpDiv
                | FpSqrt
                | FpAbs
                | FpMov
                | FpNeg
                | FpRoundL
                | FpTruncL
                | FpCeilL
                | FpFloorL
                | FpRoundW
                | FpTruncW
                | FpCeilW
                | FpFloorW
                | FpCvtS
                | FpCvtD
                | FpCvtW
                | FpCvtL
                | FpCond
        )
    }

    /// Whether this instruction is a conditional trap.
    pub fn is_trap(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Tge | Tgeu | Tlt | Tltu | Teq | Tne | Tgei | Tgeiu | Tlti | Tltiu | Teqi | Tnei
        )
    }

    /// Whether this instruction is plain integer arithmetic (including
    /// shifts and immediate forms).
    pub fn is_arithmetic(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Sll | Srl
                | Sra
                | Sllv
                | Srlv
                | Srav
                | Dsll
                | Dsrl
                | Dsra
                | Dsll32
                | Dsrl32
                | Dsra32
                | Dsllv
                | Dsrlv
                | Dsrav
                | Add
                | Addu
                | Sub
                | Subu
                | And
                | Or
                | Xor
                | Nor
                | Slt
                | Sltu
                | Dadd
                | Daddu
                | Dsub
                | Dsubu
                | Addi
                | Addiu
                | Slti
                | Sltiu
                | Andi
                | Ori
                | Xori
                | Lui
                | Daddi
                | Daddiu
        )
    }

    /// Whether this instruction is an unconditional non-linking branch
    /// (`b`, `j`, or `jr`).
    pub fn is_unconditional_branch(&self) -> bool {
        use CpuOpcode::*;
        matches!(self.id, B | J | Jr)
    }

    /// Whether the encoding carries `rs` as a general-purpose register input.
    pub fn uses_rs(&self) -> bool {
        use CpuOpcode::*;
        if self.does_load() || self.does_store() {
            return true;
        }
        matches!(
            self.id,
            Lwc2 | Ldc2
                | Swc2
                | Sdc2
                | Cache
                | Pref
                | Addi
                | Addiu
                | Slti
                | Sltiu
                | Andi
                | Ori
                | Xori
                | Daddi
                | Daddiu
                | B
                | Beq
                | Bne
                | Blez
                | Bgtz
                | Beql
                | Bnel
                | Blezl
                | Bgtzl
                | Bltz
                | Bgez
                | Bltzl
                | Bgezl
                | Bltzal
                | Bgezal
                | Bltzall
                | Bgezall
                | Tgei
                | Tgeiu
                | Tlti
                | Tltiu
                | Teqi
                | Tnei
                | Sllv
                | Srlv
                | Srav
                | Dsllv
                | Dsrlv
                | Dsrav
                | Jr
                | Jalr
                | Mult
                | Multu
                | Div
                | Divu
                | Dmult
                | Dmultu
                | Ddiv
                | Ddivu
                | Add
                | Addu
                | Sub
                | Subu
                | And
                | Or
                | Xor
                | Nor
                | Slt
                | Sltu
                | Dadd
                | Daddu
                | Dsub
                | Dsubu
                | Mthi
                | Mtlo
                | Tge
                | Tgeu
                | Tlt
                | Tltu
                | Teq
                | Tne
        )
    }

    /// Whether the encoding carries `rt` as a general-purpose register
    /// operand (input or output).
    pub fn uses_rt(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Addi | Addiu
                | Slti
                | Sltiu
                | Andi
                | Ori
                | Xori
                | Lui
                | Daddi
                | Daddiu
                | Lb
                | Lbu
                | Lh
                | Lhu
                | Lw
                | Lwu
                | Lwl
                | Lwr
                | Ld
                | Ldl
                | Ldr
                | Ll
                | Lld
                | Sb
                | Sh
                | Sw
                | Swl
                | Swr
                | Sd
                | Sdl
                | Sdr
                | Sc
                | Scd
                | B
                | Beq
                | Bne
                | Beql
                | Bnel
                | Sll
                | Srl
                | Sra
                | Dsll
                | Dsrl
                | Dsra
                | Dsll32
                | Dsrl32
                | Dsra32
                | Sllv
                | Srlv
                | Srav
                | Dsllv
                | Dsrlv
                | Dsrav
                | Add
                | Addu
                | Sub
                | Subu
                | And
                | Or
                | Xor
                | Nor
                | Slt
                | Sltu
                | Dadd
                | Daddu
                | Dsub
                | Dsubu
                | Mult
                | Multu
                | Div
                | Divu
                | Dmult
                | Dmultu
                | Ddiv
                | Ddivu
                | Tge
                | Tgeu
                | Tlt
                | Tltu
                | Teq
                | Tne
                | Mfc0
                | Dmfc0
                | Mtc0
                | Dmtc0
                | Cfc0
                | Ctc0
                | Mfc1
                | Dmfc1
                | Mtc1
                | Dmtc1
                | Cfc1
                | Ctc1
        )
    }

    /// Whether the encoding carries `rd` as a general-purpose register
    /// operand.
    pub fn uses_rd(&self) -> bool {
        // Every rd-bearing CPU instruction writes it.
        self.modifies_rd()
    }

    /// Whether the encoding carries `fs` as a floating-point register
    /// operand.
    pub fn uses_fs(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            Mfc1 | Dmfc1
                | Mtc1
                | Dmtc1
                | FpAdd
                | FpSub
                | FpMul
                | FpDiv
                | FpSqrt
                | FpAbs
                | FpMov
                | FpNeg
                | FpRoundL
                | FpTruncL
                | FpCeilL
                | FpFloorL
                | FpRoundW
                | FpTruncW
                | FpCeilW
                | FpFloorW
                | FpCvtS
                | FpCvtD
                | FpCvtW
                | FpCvtL
                | FpCond
        )
    }

    /// Whether the encoding carries `ft` as a floating-point register
    /// operand.
    pub fn uses_ft(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            FpAdd | FpSub | FpMul | FpDiv | FpCond | Lwc1 | Ldc1 | Swc1 | Sdc1
        )
    }

    /// Whether the encoding carries `fd` as a floating-point register
    /// operand.
    pub fn uses_fd(&self) -> bool {
        use CpuOpcode::*;
        matches!(
            self.id,
            FpAdd
                | FpSub
                | FpMul
                | FpDiv
                | FpSqrt
                | FpAbs
                | FpMov
                | FpNeg
                | FpRoundL
                | FpTruncL
                | FpCeilL
                | FpFloorL
                | FpRoundW
                | FpTruncW
                | FpCeilW
                | FpFloorW
                | FpCvtS
                | FpCvtD
                | FpCvtW
                | FpCvtL
        )
    }
}

fn classify(word: u32) -> CpuOpcode {
    use CpuOpcode::*;
    if word == crate::isa::patterns::NOP {
        return Nop;
    }
    match get_opcode(word) {
        0x00 => classify_special(word),
        0x01 => classify_regimm(word),
        0x02 => J,
        0x03 => Jal,
        0x04 => {
            if get_rs(word) == 0 && get_rt(word) == 0 {
                B
            } else {
                Beq
            }
        }
        0x05 => Bne,
        0x06 => Blez,
        0x07 => Bgtz,
        0x08 => Addi,
        0x09 => Addiu,
        0x0A => Slti,
        0x0B => Sltiu,
        0x0C => Andi,
        0x0D => Ori,
        0x0E => Xori,
        0x0F => Lui,
        0x10 => classify_cop0(word),
        0x11 => classify_cop1(word),
        0x14 => Beql,
        0x15 => Bnel,
        0x16 => Blezl,
        0x17 => Bgtzl,
        0x18 => Daddi,
        0x19 => Daddiu,
        0x1A => Ldl,
        0x1B => Ldr,
        0x20 => Lb,
        0x21 => Lh,
        0x22 => Lwl,
        0x23 => Lw,
        0x24 => Lbu,
        0x25 => Lhu,
        0x26 => Lwr,
        0x27 => Lwu,
        0x28 => Sb,
        0x29 => Sh,
        0x2A => Swl,
        0x2B => Sw,
        0x2C => Sdl,
        0x2D => Sdr,
        0x2E => Swr,
        0x2F => Cache,
        0x30 => Ll,
        0x31 => Lwc1,
        0x32 => Lwc2,
        0x33 => Pref,
        0x34 => Lld,
        0x35 => Ldc1,
        0x36 => Ldc2,
        0x37 => Ld,
        0x38 => Sc,
        0x39 => Swc1,
        0x3A => Swc2,
        0x3C => Scd,
        0x3D => Sdc1,
        0x3E => Sdc2,
        0x3F => Sd,
        _ => Invalid,
    }
}

fn classify_special(word: u32) -> CpuOpcode {
    use CpuOpcode::*;
    match get_funct(word) {
        0x00 => Sll,
        0x02 => Srl,
        0x03 => Sra,
        0x04 => Sllv,
        0x06 => Srlv,
        0x07 => Srav,
        0x08 => Jr,
        0x09 => Jalr,
        0x0C => Syscall,
        0x0D => Break,
        0x0F => Sync,
        0x10 => Mfhi,
        0x11 => Mthi,
        0x12 => Mflo,
        0x13 => Mtlo,
        0x14 => Dsllv,
        0x16 => Dsrlv,
        0x17 => Dsrav,
        0x18 => Mult,
        0x19 => Multu,
        0x1A => Div,
        0x1B => Divu,
        0x1C => Dmult,
        0x1D => Dmultu,
        0x1E => Ddiv,
        0x1F => Ddivu,
        0x20 => Add,
        0x21 => Addu,
        0x22 => Sub,
        0x23 => Subu,
        0x24 => And,
        0x25 => Or,
        0x26 => Xor,
        0x27 => Nor,
        0x2A => Slt,
        0x2B => Sltu,
        0x2C => Dadd,
        0x2D => Daddu,
        0x2E => Dsub,
        0x2F => Dsubu,
        0x30 => Tge,
        0x31 => Tgeu,
        0x32 => Tlt,
        0x33 => Tltu,
        0x34 => Teq,
        0x36 => Tne,
        0x38 => Dsll,
        0x3A => Dsrl,
        0x3B => Dsra,
        0x3C => Dsll32,
        0x3E => Dsrl32,
        0x3F => Dsra32,
        _ => Invalid,
    }
}

fn classify_regimm(word: u32) -> CpuOpcode {
    use CpuOpcode::*;
    match get_rt(word) {
        0x00 => Bltz,
        0x01 => Bgez,
        0x02 => Bltzl,
        0x03 => Bgezl,
        0x08 => Tgei,
        0x09 => Tgeiu,
        0x0A => Tlti,
        0x0B => Tltiu,
        0x0C => Teqi,
        0x0E => Tnei,
        0x10 => Bltzal,
        0x11 => Bgezal,
        0x12 => Bltzall,
        0x13 => Bgezall,
        _ => Invalid,
    }
}

fn classify_cop0(word: u32) -> CpuOpcode {
    use CpuOpcode::*;
    let rs = get_rs(word);
    // CO bit set: TLB and exception control ops selected by funct.
    if rs & 0x10 != 0 {
        return match get_funct(word) {
            0x01 => Tlbr,
            0x02 => Tlbwi,
            0x06 => Tlbwr,
            0x08 => Tlbp,
            0x18 => Eret,
            _ => Invalid,
        };
    }
    match rs {
        0x00 => Mfc0,
        0x01 => Dmfc0,
        0x02 => Cfc0,
        0x04 => Mtc0,
        0x05 => Dmtc0,
        0x06 => Ctc0,
        _ => Invalid,
    }
}

fn classify_cop1(word: u32) -> CpuOpcode {
    use CpuOpcode::*;
    let fmt = get_rs(word);
    match fmt {
        0x00 => Mfc1,
        0x01 => Dmfc1,
        0x02 => Cfc1,
        0x04 => Mtc1,
        0x05 => Dmtc1,
        0x06 => Ctc1,
        0x08 => match get_rt(word) & 0x3 {
            0 => Bc1f,
            1 => Bc1t,
            2 => Bc1fl,
            _ => Bc1tl,
        },
        // Single and double formats carry the full arithmetic set.
        0x10 | 0x11 => classify_fp_arith(word, fmt),
        // Word and longword formats only convert.
        0x14 | 0x15 => match get_funct(word) {
            0x20 => FpCvtS,
            0x21 => FpCvtD,
            _ => Invalid,
        },
        _ => Invalid,
    }
}

fn classify_fp_arith(word: u32, fmt: u8) -> CpuOpcode {
    use CpuOpcode::*;
    match get_funct(word) {
        0x00 => FpAdd,
        0x01 => FpSub,
        0x02 => FpMul,
        0x03 => FpDiv,
        0x04 => FpSqrt,
        0x05 => FpAbs,
        0x06 => FpMov,
        0x07 => FpNeg,
        0x08 => FpRoundL,
        0x09 => FpTruncL,
        0x0A => FpCeilL,
        0x0B => FpFloorL,
        0x0C => FpRoundW,
        0x0D => FpTruncW,
        0x0E => FpCeilW,
        0x0F => FpFloorW,
        // Converting a format to itself is undefined.
        0x20 if fmt != 0x10 => FpCvtS,
        0x21 if fmt != 0x11 => FpCvtD,
        0x24 => FpCvtW,
        0x25 => FpCvtL,
        0x30..=0x3F => FpCond,
        _ => Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::patterns;

    #[test]
    fn test_decode_nop() {
        let instr = CpuInstruction::decode(patterns::NOP);
        assert_eq!(instr.id(), CpuOpcode::Nop);
        assert!(instr.is_well_formed());
    }

    #[test]
    fn test_decode_jr_ra() {
        let instr = CpuInstruction::decode(patterns::JR_RA);
        assert_eq!(instr.id(), CpuOpcode::Jr);
        assert_eq!(instr.rs(), 31);
        assert!(instr.is_well_formed());
        assert!(instr.is_unconditional_branch());
    }

    #[test]
    fn test_decode_addiu_sp() {
        // addiu $sp, $sp, -8
        let instr = CpuInstruction::decode(0x27BD_FFF8);
        assert_eq!(instr.id(), CpuOpcode::Addiu);
        assert_eq!(instr.rs(), 29);
        assert_eq!(instr.rt(), 29);
        assert!(instr.modifies_rt());
        assert!(instr.is_arithmetic());
    }

    #[test]
    fn test_decode_sw_ra() {
        // sw $ra, 0($sp)
        let instr = CpuInstruction::decode(0xAFBF_0000);
        assert_eq!(instr.id(), CpuOpcode::Sw);
        assert!(instr.does_store());
        assert!(!instr.modifies_rt());
        assert!(instr.uses_rt());
    }

    #[test]
    fn test_undefined_opcode_is_invalid() {
        assert_eq!(CpuInstruction::decode(0xFFFF_FFFF).id(), CpuOpcode::Invalid);
    }

    #[test]
    fn test_reserved_bits() {
        // sll $t0, $t1, 4 is well formed only with rs = 0
        let good = CpuInstruction::decode(0x0009_4100);
        assert_eq!(good.id(), CpuOpcode::Sll);
        assert!(good.is_well_formed());

        let bad = CpuInstruction::decode(0x0209_4100);
        assert_eq!(bad.id(), CpuOpcode::Sll);
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn test_branch_alias() {
        // beq $zero, $zero decodes as the unconditional b
        let b = CpuInstruction::decode(0x1000_0001);
        assert_eq!(b.id(), CpuOpcode::B);
        assert!(b.is_unconditional_branch());

        let beq = CpuInstruction::decode(0x1085_0001);
        assert_eq!(beq.id(), CpuOpcode::Beq);
        assert!(!beq.is_unconditional_branch());
    }

    #[test]
    fn test_cop0_moves() {
        // mtc0 $t0, $12 (Status)
        let instr = CpuInstruction::decode(0x4088_6000);
        assert_eq!(instr.id(), CpuOpcode::Mtc0);
        assert_eq!(instr.cop0_reg(), 12);
        assert!(instr.is_well_formed());
    }

    #[test]
    fn test_fp_decode() {
        // add.s $f0, $f2, $f4
        let add_s = CpuInstruction::decode(0x4604_1000);
        assert_eq!(add_s.id(), CpuOpcode::FpAdd);
        assert!(add_s.is_float());
        assert!(add_s.uses_fs() && add_s.uses_ft() && add_s.uses_fd());

        // cvt.s.s is undefined
        let cvt_s_s = CpuInstruction::decode(0x4600_0020);
        assert_eq!(cvt_s_s.id(), CpuOpcode::Invalid);
    }

    #[test]
    fn test_trap_detection() {
        // teq $t0, $t1
        let teq = CpuInstruction::decode(0x0109_0034);
        assert_eq!(teq.id(), CpuOpcode::Teq);
        assert!(teq.is_trap());
        // tnei $t0, 0
        let tnei = CpuInstruction::decode(0x050E_0000);
        assert_eq!(tnei.id(), CpuOpcode::Tnei);
        assert!(tnei.is_trap());
    }
}

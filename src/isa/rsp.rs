//! RSP instruction decoding.
//!
//! The Reality Signal Processor executes a reduced MIPS dialect: the
//! scalar core drops the 64-bit, multiply, and trap families, COP0 is the
//! DMA/status interface, and COP2 is the vector unit with its own loads,
//! stores, and computational ops. A handful of encodings that exist on
//! the CPU but not here (`lwc1`, `swc1`, `cache`, `cfc0`, `ctc0`) still
//! decode to named ids so callers can reject them by name.

use crate::isa::{get_funct, get_opcode, get_rd, get_rs, get_rt, get_sa};

/// Unique RSP opcode identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RspOpcode {
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
    Bltz,
    Bgez,
    Bltzal,
    Bgezal,
    Jr,
    Jalr,
    Break,
    // Scalar arithmetic
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
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
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    // Scalar memory
    Lb,
    Lbu,
    Lh,
    Lhu,
    Lw,
    Sb,
    Sh,
    Sw,
    // Coprocessor moves
    Mfc0,
    Mtc0,
    Cfc0,
    Ctc0,
    Mfc2,
    Mtc2,
    Cfc2,
    Ctc2,
    // Encodings absent from this processor, kept nameable
    Lwc1,
    Swc1,
    Cache,
    // Vector loads
    Lbv,
    Lsv,
    Llv,
    Ldv,
    Lqv,
    Lrv,
    Lpv,
    Luv,
    Lhv,
    Lfv,
    Ltv,
    // Vector stores
    Sbv,
    Ssv,
    Slv,
    Sdv,
    Sqv,
    Srv,
    Spv,
    Suv,
    Shv,
    Sfv,
    Swv,
    Stv,
    // Vector computational ops
    Vmulf,
    Vmulu,
    Vrndp,
    Vmulq,
    Vmudl,
    Vmudm,
    Vmudn,
    Vmudh,
    Vmacf,
    Vmacu,
    Vrndn,
    Vmacq,
    Vmadl,
    Vmadm,
    Vmadn,
    Vmadh,
    Vadd,
    Vsub,
    Vabs,
    Vaddc,
    Vsubc,
    Vsar,
    Vlt,
    Veq,
    Vne,
    Vge,
    Vcl,
    Vch,
    Vcr,
    Vmrg,
    Vand,
    Vnand,
    Vor,
    Vnor,
    Vxor,
    Vnxor,
    Vrcp,
    Vrcpl,
    Vrcph,
    Vmov,
    Vrsq,
    Vrsql,
    Vrsqh,
    Vnop,
}

/// A decoded RSP instruction word.
#[derive(Debug, Clone, Copy)]
pub struct RspInstruction {
    word: u32,
    id: RspOpcode,
}

impl RspInstruction {
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

    /// The unique opcode id, or [`RspOpcode::Invalid`].
    pub fn id(&self) -> RspOpcode {
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

    /// The coprocessor-0 register index named by `mtc0`/`mfc0`.
    pub fn cop0_reg(&self) -> u8 {
        get_rd(self.word)
    }

    /// Whether the reserved fields for this opcode hold their required values.
    pub fn is_well_formed(&self) -> bool {
        use RspOpcode::*;
        let rs = self.rs();
        let rt = self.rt();
        let rd = self.rd();
        let sa = self.sa();
        match self.id {
            Invalid => false,
            Nop => true,
            Sll | Srl | Sra => rs == 0,
            Sllv | Srlv | Srav => sa == 0,
            Jr => rt == 0 && rd == 0 && sa == 0,
            Jalr => rt == 0 && sa == 0,
            Add | Addu | Sub | Subu | And | Or | Xor | Nor | Slt | Sltu => sa == 0,
            Blez | Bgtz => rt == 0,
            Lui => rs == 0,
            Mfc0 | Mtc0 | Cfc0 | Ctc0 => self.word & 0x7FF == 0,
            // COP2 moves carry the vector element in the sa bits.
            Mfc2 | Mtc2 | Cfc2 | Ctc2 => self.word & 0x7F == 0,
            _ => true,
        }
    }

    /// Whether this instruction writes the `rd` register.
    pub fn modifies_rd(&self) -> bool {
        use RspOpcode::*;
        matches!(
            self.id,
            Sll | Srl
                | Sra
                | Sllv
                | Srlv
                | Srav
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
                | Jalr
        )
    }

    /// Whether this instruction writes the `rt` register.
    pub fn modifies_rt(&self) -> bool {
        use RspOpcode::*;
        matches!(
            self.id,
            Addi | Addiu
                | Slti
                | Sltiu
                | Andi
                | Ori
                | Xori
                | Lui
                | Lb
                | Lbu
                | Lh
                | Lhu
                | Lw
                | Mfc0
                | Cfc0
                | Mfc2
                | Cfc2
        )
    }

    /// Whether this instruction loads from memory (scalar or vector).
    pub fn does_load(&self) -> bool {
        use RspOpcode::*;
        matches!(
            self.id,
            Lb | Lbu | Lh | Lhu | Lw | Lbv | Lsv | Llv | Ldv | Lqv | Lrv | Lpv | Luv | Lhv | Lfv
                | Ltv
        )
    }

    /// Whether this instruction stores to memory (scalar or vector).
    pub fn does_store(&self) -> bool {
        use RspOpcode::*;
        matches!(
            self.id,
            Sb | Sh | Sw | Sbv | Ssv | Slv | Sdv | Sqv | Srv | Spv | Suv | Shv | Sfv | Swv | Stv
        )
    }

    /// Whether this instruction is plain scalar arithmetic.
    pub fn is_arithmetic(&self) -> bool {
        use RspOpcode::*;
        matches!(
            self.id,
            Sll | Srl
                | Sra
                | Sllv
                | Srlv
                | Srav
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
                | Addi
                | Addiu
                | Slti
                | Sltiu
                | Andi
                | Ori
                | Xori
                | Lui
        )
    }
}

fn classify(word: u32) -> RspOpcode {
    use RspOpcode::*;
    if word == crate::isa::patterns::NOP {
        return Nop;
    }
    match get_opcode(word) {
        0x00 => classify_special(word),
        0x01 => match get_rt(word) {
            0x00 => Bltz,
            0x01 => Bgez,
            0x10 => Bltzal,
            0x11 => Bgezal,
            _ => Invalid,
        },
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
        0x10 => match get_rs(word) {
            0x00 => Mfc0,
            0x02 => Cfc0,
            0x04 => Mtc0,
            0x06 => Ctc0,
            _ => Invalid,
        },
        0x12 => classify_cop2(word),
        0x20 => Lb,
        0x21 => Lh,
        0x23 => Lw,
        0x24 => Lbu,
        0x25 => Lhu,
        0x28 => Sb,
        0x29 => Sh,
        0x2B => Sw,
        0x2F => Cache,
        0x31 => Lwc1,
        0x32 => classify_vector_load(word),
        0x39 => Swc1,
        0x3A => classify_vector_store(word),
        _ => Invalid,
    }
}

fn classify_special(word: u32) -> RspOpcode {
    use RspOpcode::*;
    match get_funct(word) {
        0x00 => Sll,
        0x02 => Srl,
        0x03 => Sra,
        0x04 => Sllv,
        0x06 => Srlv,
        0x07 => Srav,
        0x08 => Jr,
        0x09 => Jalr,
        0x0D => Break,
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
        _ => Invalid,
    }
}

fn classify_cop2(word: u32) -> RspOpcode {
    use RspOpcode::*;
    // Bit 25 selects the vector computational ops.
    if get_rs(word) & 0x10 != 0 {
        return classify_vector_op(word);
    }
    match get_rs(word) {
        0x00 => Mfc2,
        0x02 => Cfc2,
        0x04 => Mtc2,
        0x06 => Ctc2,
        _ => Invalid,
    }
}

fn classify_vector_op(word: u32) -> RspOpcode {
    use RspOpcode::*;
    match get_funct(word) {
        0x00 => Vmulf,
        0x01 => Vmulu,
        0x02 => Vrndp,
        0x03 => Vmulq,
        0x04 => Vmudl,
        0x05 => Vmudm,
        0x06 => Vmudn,
        0x07 => Vmudh,
        0x08 => Vmacf,
        0x09 => Vmacu,
        0x0A => Vrndn,
        0x0B => Vmacq,
        0x0C => Vmadl,
        0x0D => Vmadm,
        0x0E => Vmadn,
        0x0F => Vmadh,
        0x10 => Vadd,
        0x11 => Vsub,
        0x13 => Vabs,
        0x14 => Vaddc,
        0x15 => Vsubc,
        0x1D => Vsar,
        0x20 => Vlt,
        0x21 => Veq,
        0x22 => Vne,
        0x23 => Vge,
        0x24 => Vcl,
        0x25 => Vch,
        0x26 => Vcr,
        0x27 => Vmrg,
        0x28 => Vand,
        0x29 => Vnand,
        0x2A => Vor,
        0x2B => Vnor,
        0x2C => Vxor,
        0x2D => Vnxor,
        0x30 => Vrcp,
        0x31 => Vrcpl,
        0x32 => Vrcph,
        0x33 => Vmov,
        0x34 => Vrsq,
        0x35 => Vrsql,
        0x36 => Vrsqh,
        0x37 => Vnop,
        _ => Invalid,
    }
}

fn classify_vector_load(word: u32) -> RspOpcode {
    use RspOpcode::*;
    match get_rd(word) {
        0x00 => Lbv,
        0x01 => Lsv,
        0x02 => Llv,
        0x03 => Ldv,
        0x04 => Lqv,
        0x05 => Lrv,
        0x06 => Lpv,
        0x07 => Luv,
        0x08 => Lhv,
        0x09 => Lfv,
        0x0B => Ltv,
        _ => Invalid,
    }
}

fn classify_vector_store(word: u32) -> RspOpcode {
    use RspOpcode::*;
    match get_rd(word) {
        0x00 => Sbv,
        0x01 => Ssv,
        0x02 => Slv,
        0x03 => Sdv,
        0x04 => Sqv,
        0x05 => Srv,
        0x06 => Spv,
        0x07 => Suv,
        0x08 => Shv,
        0x09 => Sfv,
        0x0A => Swv,
        0x0B => Stv,
        _ => Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::patterns;

    #[test]
    fn test_decode_scalar() {
        assert_eq!(RspInstruction::decode(patterns::NOP).id(), RspOpcode::Nop);
        assert_eq!(RspInstruction::decode(patterns::JR_RA).id(), RspOpcode::Jr);
        // addiu $sp, $sp, -8 decodes on the scalar core too
        assert_eq!(
            RspInstruction::decode(0x27BD_FFF8).id(),
            RspOpcode::Addiu
        );
    }

    #[test]
    fn test_decode_vector_op() {
        // vmulf $v0, $v0, $v0
        let instr = RspInstruction::decode(0x4A00_0000);
        assert_eq!(instr.id(), RspOpcode::Vmulf);
        assert!(instr.is_well_formed());
    }

    #[test]
    fn test_decode_vector_memory() {
        // lqv $v0, 0($a0)
        let lqv = RspInstruction::decode(0xC880_2000);
        assert_eq!(lqv.id(), RspOpcode::Lqv);
        assert!(lqv.does_load());

        // sqv $v0, 0($a0)
        let sqv = RspInstruction::decode(0xE880_2000);
        assert_eq!(sqv.id(), RspOpcode::Sqv);
        assert!(sqv.does_store());
    }

    #[test]
    fn test_missing_cpu_families() {
        // ld $t0, 0($t1): no 64-bit loads on this core
        assert_eq!(RspInstruction::decode(0xDD28_0000).id(), RspOpcode::Invalid);
        // mult $t0, $t1
        assert_eq!(RspInstruction::decode(0x0109_0018).id(), RspOpcode::Invalid);
        // beql $a0, $a1
        assert_eq!(RspInstruction::decode(0x5085_0001).id(), RspOpcode::Invalid);
    }

    #[test]
    fn test_nameable_foreign_encodings() {
        // lwc1 $f0, 0($a0)
        assert_eq!(RspInstruction::decode(0xC480_0000).id(), RspOpcode::Lwc1);
        // swc1 $f0, 0($a0)
        assert_eq!(RspInstruction::decode(0xE480_0000).id(), RspOpcode::Swc1);
        // cache 0x1, 0($a0)
        assert_eq!(RspInstruction::decode(0xBC81_0000).id(), RspOpcode::Cache);
    }

    #[test]
    fn test_cop0_moves() {
        // mfc0 $t0, $4 (SP_STATUS)
        let instr = RspInstruction::decode(0x4008_2000);
        assert_eq!(instr.id(), RspOpcode::Mfc0);
        assert_eq!(instr.cop0_reg(), 4);
    }
}

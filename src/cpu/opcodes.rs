// Opcode table for the 6502
//
// One entry per opcode byte: mnemonic, addressing mode, instruction length,
// base cycle cost, and whether an indexed page crossing adds a cycle. The
// penalty applies only to read instructions; stores and read-modify-write
// opcodes always take their fixed worst-case count.
//
// Undocumented opcodes are present with their conventional mnemonics. The
// twelve JAM opcodes are listed as KIL with a zero cost; executing one is an
// engine-level error, except $02 which is reserved as the host debug trap.

use super::addressing::AddressingMode;

/// Static description of one opcode
pub struct OpcodeInfo {
    /// Conventional mnemonic (undocumented opcodes keep their common names)
    pub mnemonic: &'static str,
    /// Addressing mode
    pub mode: AddressingMode,
    /// Instruction length in bytes (opcode + operands)
    pub bytes: u8,
    /// Base cycle cost
    pub cycles: u8,
    /// Add one cycle when the indexed address crosses a page
    pub page_cycle: bool,
    /// This opcode is not part of the documented 6502 set
    pub undocumented: bool,
}

const fn op(
    mnemonic: &'static str,
    mode: AddressingMode,
    bytes: u8,
    cycles: u8,
    page_cycle: bool,
) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        bytes,
        cycles,
        page_cycle,
        undocumented: false,
    }
}

const fn ill(
    mnemonic: &'static str,
    mode: AddressingMode,
    bytes: u8,
    cycles: u8,
    page_cycle: bool,
) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        bytes,
        cycles,
        page_cycle,
        undocumented: true,
    }
}

use AddressingMode::{
    Absolute as Abs, AbsoluteX as AbX, AbsoluteY as AbY, Accumulator as Acc, Immediate as Imm,
    Implied as Imp, IndexedIndirect as IzX, Indirect as Ind, IndirectIndexed as IzY,
    Relative as Rel, ZeroPage as Zpg, ZeroPageX as ZpX, ZeroPageY as ZpY,
};

/// The 256-entry opcode table, indexed by opcode byte
pub static OPCODE_TABLE: [OpcodeInfo; 256] = [
    // 0x00
    op("BRK", Imp, 1, 7, false),
    op("ORA", IzX, 2, 6, false),
    ill("TRP", Imp, 1, 2, false), // reserved host trap
    ill("SLO", IzX, 2, 8, false),
    ill("NOP", Zpg, 2, 3, false),
    op("ORA", Zpg, 2, 3, false),
    op("ASL", Zpg, 2, 5, false),
    ill("SLO", Zpg, 2, 5, false),
    op("PHP", Imp, 1, 3, false),
    op("ORA", Imm, 2, 2, false),
    op("ASL", Acc, 1, 2, false),
    ill("ANC", Imm, 2, 2, false),
    ill("NOP", Abs, 3, 4, false),
    op("ORA", Abs, 3, 4, false),
    op("ASL", Abs, 3, 6, false),
    ill("SLO", Abs, 3, 6, false),
    // 0x10
    op("BPL", Rel, 2, 2, false),
    op("ORA", IzY, 2, 5, true),
    ill("KIL", Imp, 1, 0, false),
    ill("SLO", IzY, 2, 8, false),
    ill("NOP", ZpX, 2, 4, false),
    op("ORA", ZpX, 2, 4, false),
    op("ASL", ZpX, 2, 6, false),
    ill("SLO", ZpX, 2, 6, false),
    op("CLC", Imp, 1, 2, false),
    op("ORA", AbY, 3, 4, true),
    ill("NOP", Imp, 1, 2, false),
    ill("SLO", AbY, 3, 7, false),
    ill("NOP", AbX, 3, 4, true),
    op("ORA", AbX, 3, 4, true),
    op("ASL", AbX, 3, 7, false),
    ill("SLO", AbX, 3, 7, false),
    // 0x20
    op("JSR", Abs, 3, 6, false),
    op("AND", IzX, 2, 6, false),
    ill("KIL", Imp, 1, 0, false),
    ill("RLA", IzX, 2, 8, false),
    op("BIT", Zpg, 2, 3, false),
    op("AND", Zpg, 2, 3, false),
    op("ROL", Zpg, 2, 5, false),
    ill("RLA", Zpg, 2, 5, false),
    op("PLP", Imp, 1, 4, false),
    op("AND", Imm, 2, 2, false),
    op("ROL", Acc, 1, 2, false),
    ill("ANC", Imm, 2, 2, false),
    op("BIT", Abs, 3, 4, false),
    op("AND", Abs, 3, 4, false),
    op("ROL", Abs, 3, 6, false),
    ill("RLA", Abs, 3, 6, false),
    // 0x30
    op("BMI", Rel, 2, 2, false),
    op("AND", IzY, 2, 5, true),
    ill("KIL", Imp, 1, 0, false),
    ill("RLA", IzY, 2, 8, false),
    ill("NOP", ZpX, 2, 4, false),
    op("AND", ZpX, 2, 4, false),
    op("ROL", ZpX, 2, 6, false),
    ill("RLA", ZpX, 2, 6, false),
    op("SEC", Imp, 1, 2, false),
    op("AND", AbY, 3, 4, true),
    ill("NOP", Imp, 1, 2, false),
    ill("RLA", AbY, 3, 7, false),
    ill("NOP", AbX, 3, 4, true),
    op("AND", AbX, 3, 4, true),
    op("ROL", AbX, 3, 7, false),
    ill("RLA", AbX, 3, 7, false),
    // 0x40
    op("RTI", Imp, 1, 6, false),
    op("EOR", IzX, 2, 6, false),
    ill("KIL", Imp, 1, 0, false),
    ill("SRE", IzX, 2, 8, false),
    ill("NOP", Zpg, 2, 3, false),
    op("EOR", Zpg, 2, 3, false),
    op("LSR", Zpg, 2, 5, false),
    ill("SRE", Zpg, 2, 5, false),
    op("PHA", Imp, 1, 3, false),
    op("EOR", Imm, 2, 2, false),
    op("LSR", Acc, 1, 2, false),
    ill("ALR", Imm, 2, 2, false),
    op("JMP", Abs, 3, 3, false),
    op("EOR", Abs, 3, 4, false),
    op("LSR", Abs, 3, 6, false),
    ill("SRE", Abs, 3, 6, false),
    // 0x50
    op("BVC", Rel, 2, 2, false),
    op("EOR", IzY, 2, 5, true),
    ill("KIL", Imp, 1, 0, false),
    ill("SRE", IzY, 2, 8, false),
    ill("NOP", ZpX, 2, 4, false),
    op("EOR", ZpX, 2, 4, false),
    op("LSR", ZpX, 2, 6, false),
    ill("SRE", ZpX, 2, 6, false),
    op("CLI", Imp, 1, 2, false),
    op("EOR", AbY, 3, 4, true),
    ill("NOP", Imp, 1, 2, false),
    ill("SRE", AbY, 3, 7, false),
    ill("NOP", AbX, 3, 4, true),
    op("EOR", AbX, 3, 4, true),
    op("LSR", AbX, 3, 7, false),
    ill("SRE", AbX, 3, 7, false),
    // 0x60
    op("RTS", Imp, 1, 6, false),
    op("ADC", IzX, 2, 6, false),
    ill("KIL", Imp, 1, 0, false),
    ill("RRA", IzX, 2, 8, false),
    ill("NOP", Zpg, 2, 3, false),
    op("ADC", Zpg, 2, 3, false),
    op("ROR", Zpg, 2, 5, false),
    ill("RRA", Zpg, 2, 5, false),
    op("PLA", Imp, 1, 4, false),
    op("ADC", Imm, 2, 2, false),
    op("ROR", Acc, 1, 2, false),
    ill("ARR", Imm, 2, 2, false),
    op("JMP", Ind, 3, 5, false),
    op("ADC", Abs, 3, 4, false),
    op("ROR", Abs, 3, 6, false),
    ill("RRA", Abs, 3, 6, false),
    // 0x70
    op("BVS", Rel, 2, 2, false),
    op("ADC", IzY, 2, 5, true),
    ill("KIL", Imp, 1, 0, false),
    ill("RRA", IzY, 2, 8, false),
    ill("NOP", ZpX, 2, 4, false),
    op("ADC", ZpX, 2, 4, false),
    op("ROR", ZpX, 2, 6, false),
    ill("RRA", ZpX, 2, 6, false),
    op("SEI", Imp, 1, 2, false),
    op("ADC", AbY, 3, 4, true),
    ill("NOP", Imp, 1, 2, false),
    ill("RRA", AbY, 3, 7, false),
    ill("NOP", AbX, 3, 4, true),
    op("ADC", AbX, 3, 4, true),
    op("ROR", AbX, 3, 7, false),
    ill("RRA", AbX, 3, 7, false),
    // 0x80
    ill("NOP", Imm, 2, 2, false),
    op("STA", IzX, 2, 6, false),
    ill("NOP", Imm, 2, 2, false),
    ill("SAX", IzX, 2, 6, false),
    op("STY", Zpg, 2, 3, false),
    op("STA", Zpg, 2, 3, false),
    op("STX", Zpg, 2, 3, false),
    ill("SAX", Zpg, 2, 3, false),
    op("DEY", Imp, 1, 2, false),
    ill("NOP", Imm, 2, 2, false),
    op("TXA", Imp, 1, 2, false),
    ill("XAA", Imm, 2, 2, false),
    op("STY", Abs, 3, 4, false),
    op("STA", Abs, 3, 4, false),
    op("STX", Abs, 3, 4, false),
    ill("SAX", Abs, 3, 4, false),
    // 0x90
    op("BCC", Rel, 2, 2, false),
    op("STA", IzY, 2, 6, false),
    ill("KIL", Imp, 1, 0, false),
    ill("SHA", IzY, 2, 6, false),
    op("STY", ZpX, 2, 4, false),
    op("STA", ZpX, 2, 4, false),
    op("STX", ZpY, 2, 4, false),
    ill("SAX", ZpY, 2, 4, false),
    op("TYA", Imp, 1, 2, false),
    op("STA", AbY, 3, 5, false),
    op("TXS", Imp, 1, 2, false),
    ill("TAS", AbY, 3, 5, false),
    ill("SHY", AbX, 3, 5, false),
    op("STA", AbX, 3, 5, false),
    ill("SHX", AbY, 3, 5, false),
    ill("SHA", AbY, 3, 5, false),
    // 0xA0
    op("LDY", Imm, 2, 2, false),
    op("LDA", IzX, 2, 6, false),
    op("LDX", Imm, 2, 2, false),
    ill("LAX", IzX, 2, 6, false),
    op("LDY", Zpg, 2, 3, false),
    op("LDA", Zpg, 2, 3, false),
    op("LDX", Zpg, 2, 3, false),
    ill("LAX", Zpg, 2, 3, false),
    op("TAY", Imp, 1, 2, false),
    op("LDA", Imm, 2, 2, false),
    op("TAX", Imp, 1, 2, false),
    ill("LXA", Imm, 2, 2, false),
    op("LDY", Abs, 3, 4, false),
    op("LDA", Abs, 3, 4, false),
    op("LDX", Abs, 3, 4, false),
    ill("LAX", Abs, 3, 4, false),
    // 0xB0
    op("BCS", Rel, 2, 2, false),
    op("LDA", IzY, 2, 5, true),
    ill("KIL", Imp, 1, 0, false),
    ill("LAX", IzY, 2, 5, true),
    op("LDY", ZpX, 2, 4, false),
    op("LDA", ZpX, 2, 4, false),
    op("LDX", ZpY, 2, 4, false),
    ill("LAX", ZpY, 2, 4, false),
    op("CLV", Imp, 1, 2, false),
    op("LDA", AbY, 3, 4, true),
    op("TSX", Imp, 1, 2, false),
    ill("LAS", AbY, 3, 4, true),
    op("LDY", AbX, 3, 4, true),
    op("LDA", AbX, 3, 4, true),
    op("LDX", AbY, 3, 4, true),
    ill("LAX", AbY, 3, 4, true),
    // 0xC0
    op("CPY", Imm, 2, 2, false),
    op("CMP", IzX, 2, 6, false),
    ill("NOP", Imm, 2, 2, false),
    ill("DCP", IzX, 2, 8, false),
    op("CPY", Zpg, 2, 3, false),
    op("CMP", Zpg, 2, 3, false),
    op("DEC", Zpg, 2, 5, false),
    ill("DCP", Zpg, 2, 5, false),
    op("INY", Imp, 1, 2, false),
    op("CMP", Imm, 2, 2, false),
    op("DEX", Imp, 1, 2, false),
    ill("SBX", Imm, 2, 2, false),
    op("CPY", Abs, 3, 4, false),
    op("CMP", Abs, 3, 4, false),
    op("DEC", Abs, 3, 6, false),
    ill("DCP", Abs, 3, 6, false),
    // 0xD0
    op("BNE", Rel, 2, 2, false),
    op("CMP", IzY, 2, 5, true),
    ill("KIL", Imp, 1, 0, false),
    ill("DCP", IzY, 2, 8, false),
    ill("NOP", ZpX, 2, 4, false),
    op("CMP", ZpX, 2, 4, false),
    op("DEC", ZpX, 2, 6, false),
    ill("DCP", ZpX, 2, 6, false),
    op("CLD", Imp, 1, 2, false),
    op("CMP", AbY, 3, 4, true),
    ill("NOP", Imp, 1, 2, false),
    ill("DCP", AbY, 3, 7, false),
    ill("NOP", AbX, 3, 4, true),
    op("CMP", AbX, 3, 4, true),
    op("DEC", AbX, 3, 7, false),
    ill("DCP", AbX, 3, 7, false),
    // 0xE0
    op("CPX", Imm, 2, 2, false),
    op("SBC", IzX, 2, 6, false),
    ill("NOP", Imm, 2, 2, false),
    ill("ISB", IzX, 2, 8, false),
    op("CPX", Zpg, 2, 3, false),
    op("SBC", Zpg, 2, 3, false),
    op("INC", Zpg, 2, 5, false),
    ill("ISB", Zpg, 2, 5, false),
    op("INX", Imp, 1, 2, false),
    op("SBC", Imm, 2, 2, false),
    op("NOP", Imp, 1, 2, false),
    ill("SBC", Imm, 2, 2, false),
    op("CPX", Abs, 3, 4, false),
    op("SBC", Abs, 3, 4, false),
    op("INC", Abs, 3, 6, false),
    ill("ISB", Abs, 3, 6, false),
    // 0xF0
    op("BEQ", Rel, 2, 2, false),
    op("SBC", IzY, 2, 5, true),
    ill("KIL", Imp, 1, 0, false),
    ill("ISB", IzY, 2, 8, false),
    ill("NOP", ZpX, 2, 4, false),
    op("SBC", ZpX, 2, 4, false),
    op("INC", ZpX, 2, 6, false),
    ill("ISB", ZpX, 2, 6, false),
    op("SED", Imp, 1, 2, false),
    op("SBC", AbY, 3, 4, true),
    ill("NOP", Imp, 1, 2, false),
    ill("ISB", AbY, 3, 7, false),
    ill("NOP", AbX, 3, 4, true),
    op("SBC", AbX, 3, 4, true),
    op("INC", AbX, 3, 7, false),
    ill("ISB", AbX, 3, 7, false),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_256_entries() {
        assert_eq!(OPCODE_TABLE.len(), 256);
    }

    #[test]
    fn test_documented_cycle_counts() {
        // Spot-check entries against the canonical timing table
        let cases: &[(u8, &str, u8, u8, bool)] = &[
            (0x00, "BRK", 1, 7, false),
            (0xA9, "LDA", 2, 2, false),
            (0xBD, "LDA", 3, 4, true),
            (0x9D, "STA", 3, 5, false),
            (0x91, "STA", 2, 6, false),
            (0x6C, "JMP", 3, 5, false),
            (0x20, "JSR", 3, 6, false),
            (0x60, "RTS", 1, 6, false),
            (0xFE, "INC", 3, 7, false),
            (0xEA, "NOP", 1, 2, false),
        ];
        for &(opcode, mnemonic, bytes, cycles, page_cycle) in cases {
            let info = &OPCODE_TABLE[opcode as usize];
            assert_eq!(info.mnemonic, mnemonic, "opcode {:02X}", opcode);
            assert_eq!(info.bytes, bytes, "opcode {:02X} length", opcode);
            assert_eq!(info.cycles, cycles, "opcode {:02X} cycles", opcode);
            assert_eq!(info.page_cycle, page_cycle, "opcode {:02X} page", opcode);
        }
    }

    #[test]
    fn test_stores_never_take_page_penalty() {
        for (opcode, info) in OPCODE_TABLE.iter().enumerate() {
            if matches!(info.mnemonic, "STA" | "STX" | "STY" | "SAX" | "SHA" | "SHX" | "SHY") {
                assert!(
                    !info.page_cycle,
                    "store opcode {:02X} must not take the page penalty",
                    opcode
                );
            }
        }
    }

    #[test]
    fn test_read_modify_write_never_takes_page_penalty() {
        for (opcode, info) in OPCODE_TABLE.iter().enumerate() {
            if matches!(
                info.mnemonic,
                "ASL" | "LSR" | "ROL" | "ROR" | "INC" | "DEC" | "SLO" | "RLA" | "SRE" | "RRA"
                    | "DCP" | "ISB"
            ) {
                assert!(
                    !info.page_cycle,
                    "RMW opcode {:02X} must not take the page penalty",
                    opcode
                );
            }
        }
    }

    #[test]
    fn test_instruction_lengths_match_modes() {
        use AddressingMode::*;
        for (opcode, info) in OPCODE_TABLE.iter().enumerate() {
            let expected = match info.mode {
                Implied | Accumulator => 1,
                Immediate | ZeroPage | ZeroPageX | ZeroPageY | Relative | IndexedIndirect
                | IndirectIndexed => 2,
                Absolute | AbsoluteX | AbsoluteY | Indirect => 3,
            };
            assert_eq!(info.bytes, expected, "opcode {:02X}", opcode);
        }
    }
}

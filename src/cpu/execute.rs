// CPU execution module: fetch, decode, dispatch
//
// One opcode per step. The cycle counter advances by the table cost, plus
// the page-cross penalty for the marked read opcodes, plus the taken-branch
// extras, plus any DMA stall cycles the bus accumulated during the
// instruction. After every instruction the pending cycle trigger is polled.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingMode;
use crate::cpu::opcodes::OPCODE_TABLE;
use crate::cpu::Cpu;

impl Cpu {
    /// Execute one instruction and return its cycle cost
    pub fn step(&mut self, bus: &mut Bus) -> u8 {
        if self.dump {
            println!("{}", crate::debug::trace_instruction(self, bus));
        }
        if self.step_mode {
            self.step_prompt();
        }

        let opcode = bus.read(self.pc);

        // $02 is reserved as the host debug trap; it only executes when a
        // handler is installed (conformance harness, NSF-style frontends).
        if opcode == 0x02 {
            if let Some(mut trap) = self.trap.take() {
                self.pc = self.pc.wrapping_add(1);
                trap(self, bus);
                if self.trap.is_none() {
                    self.trap = Some(trap);
                }
                self.cycles += 2;
                self.poll_trigger(bus);
                return 2;
            }
        }

        let opcode_info = &OPCODE_TABLE[opcode as usize];

        // A JAM opcode is an engine-level error: no real program reaches one
        if opcode_info.mnemonic == "KIL" || (opcode == 0x02 && self.trap.is_none()) {
            self.dump_state();
            panic!("unknown opcode {:02X} at {:04X}", opcode, self.pc);
        }

        self.pc = self.pc.wrapping_add(1);

        let addr_result = match opcode_info.mode {
            AddressingMode::Implied => self.addr_implied(),
            AddressingMode::Accumulator => self.addr_accumulator(),
            AddressingMode::Immediate => self.addr_immediate(bus),
            AddressingMode::ZeroPage => self.addr_zero_page(bus),
            AddressingMode::ZeroPageX => self.addr_zero_page_x(bus),
            AddressingMode::ZeroPageY => self.addr_zero_page_y(bus),
            AddressingMode::Relative => self.addr_relative(bus),
            AddressingMode::Absolute => self.addr_absolute(bus),
            AddressingMode::AbsoluteX => self.addr_absolute_x(bus),
            AddressingMode::AbsoluteY => self.addr_absolute_y(bus),
            AddressingMode::Indirect => self.addr_indirect(bus),
            AddressingMode::IndexedIndirect => self.addr_indexed_indirect(bus),
            AddressingMode::IndirectIndexed => self.addr_indirect_indexed(bus),
        };

        let extra_cycles = self.execute_instruction(opcode, &addr_result, bus);

        let mut cycles = opcode_info.cycles;
        if opcode_info.page_cycle && addr_result.page_crossed {
            cycles += 1;
        }
        cycles += extra_cycles;

        self.cycles += cycles as u64;

        // OAM DMA initiated by this instruction stalls the CPU
        self.cycles += bus.take_stall_cycles();

        self.poll_trigger(bus);

        cycles
    }

    /// Dispatch one decoded opcode; returns the extra cycles consumed by
    /// taken branches
    #[allow(clippy::too_many_lines)]
    fn execute_instruction(
        &mut self,
        opcode: u8,
        addr_result: &crate::cpu::addressing::AddressingResult,
        bus: &mut Bus,
    ) -> u8 {
        match opcode {
            // Load/Store instructions
            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => self.lda(bus, addr_result),
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => self.ldx(bus, addr_result),
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => self.ldy(bus, addr_result),
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => self.sta(bus, addr_result),
            0x86 | 0x96 | 0x8E => self.stx(bus, addr_result),
            0x84 | 0x94 | 0x8C => self.sty(bus, addr_result),

            // Arithmetic instructions
            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => self.adc(bus, addr_result),
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 => self.sbc(bus, addr_result),
            0xE6 | 0xF6 | 0xEE | 0xFE => self.inc(bus, addr_result),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xC6 | 0xD6 | 0xCE | 0xDE => self.dec(bus, addr_result),
            0xCA => self.dex(),
            0x88 => self.dey(),

            // Logical instructions
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => self.and(bus, addr_result),
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => self.ora(bus, addr_result),
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => self.eor(bus, addr_result),
            0x24 | 0x2C => self.bit(bus, addr_result),

            // Shift/Rotate instructions
            0x0A => self.asl(bus, addr_result, true),
            0x06 | 0x16 | 0x0E | 0x1E => self.asl(bus, addr_result, false),
            0x4A => self.lsr(bus, addr_result, true),
            0x46 | 0x56 | 0x4E | 0x5E => self.lsr(bus, addr_result, false),
            0x2A => self.rol(bus, addr_result, true),
            0x26 | 0x36 | 0x2E | 0x3E => self.rol(bus, addr_result, false),
            0x6A => self.ror(bus, addr_result, true),
            0x66 | 0x76 | 0x6E | 0x7E => self.ror(bus, addr_result, false),

            // Compare instructions
            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => self.cmp(bus, addr_result),
            0xE0 | 0xE4 | 0xEC => self.cpx(bus, addr_result),
            0xC0 | 0xC4 | 0xCC => self.cpy(bus, addr_result),

            // Branch instructions (return extra cycles)
            0x90 => return self.bcc(addr_result),
            0xB0 => return self.bcs(addr_result),
            0xF0 => return self.beq(addr_result),
            0x30 => return self.bmi(addr_result),
            0xD0 => return self.bne(addr_result),
            0x10 => return self.bpl(addr_result),
            0x50 => return self.bvc(addr_result),
            0x70 => return self.bvs(addr_result),

            // Jump/Subroutine instructions
            0x4C | 0x6C => self.jmp(addr_result),
            0x20 => self.jsr(bus, addr_result),
            0x60 => self.rts(bus),

            // Stack instructions
            0x48 => self.pha(bus),
            0x68 => self.pla(bus),
            0x08 => self.php(bus),
            0x28 => self.plp(bus),
            0x9A => self.txs(),
            0xBA => self.tsx(),

            // Transfer instructions
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0x8A => self.txa(),
            0x98 => self.tya(),

            // Flag instructions
            0x18 => self.clc(),
            0xD8 => self.cld(),
            0x58 => self.cli(),
            0xB8 => self.clv(),
            0x38 => self.sec(),
            0xF8 => self.sed(),
            0x78 => self.sei(),

            // Miscellaneous instructions
            0x00 => self.brk(bus),
            0x40 => self.rti(bus),
            0xEA => self.nop(),

            // Undocumented: double/triple NOPs (operand consumed by addressing)
            0x04 | 0x44 | 0x64 | 0x0C | 0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 | 0x1A | 0x3A
            | 0x5A | 0x7A | 0xDA | 0xFA | 0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 | 0x1C | 0x3C | 0x5C
            | 0x7C | 0xDC | 0xFC => self.nop(),

            // Undocumented: combined and unstable opcodes
            0xA7 | 0xB7 | 0xAF | 0xBF | 0xA3 | 0xB3 => self.lax(bus, addr_result),
            0x87 | 0x97 | 0x8F | 0x83 => self.sax(bus, addr_result),
            0xC7 | 0xD7 | 0xCF | 0xDF | 0xDB | 0xC3 | 0xD3 => self.dcp(bus, addr_result),
            0xE7 | 0xF7 | 0xEF | 0xFF | 0xFB | 0xE3 | 0xF3 => self.isb(bus, addr_result),
            0x07 | 0x17 | 0x0F | 0x1F | 0x1B | 0x03 | 0x13 => self.slo(bus, addr_result),
            0x27 | 0x37 | 0x2F | 0x3F | 0x3B | 0x23 | 0x33 => self.rla(bus, addr_result),
            0x47 | 0x57 | 0x4F | 0x5F | 0x5B | 0x43 | 0x53 => self.sre(bus, addr_result),
            0x67 | 0x77 | 0x6F | 0x7F | 0x7B | 0x63 | 0x73 => self.rra(bus, addr_result),
            0x0B | 0x2B => self.anc(bus, addr_result),
            0x4B => self.alr(bus, addr_result),
            0x6B => self.arr(bus, addr_result),
            0x8B => self.xaa(bus, addr_result),
            0xAB => self.lxa(bus, addr_result),
            0xBB => self.las(bus, addr_result),
            0xCB => self.sbx(bus, addr_result),
            0xEB => self.sbc(bus, addr_result),
            0x93 | 0x9F => self.sha(bus, addr_result),
            0x9E => self.shx(bus, addr_result),
            0x9C => self.shy(bus, addr_result),
            0x9B => self.tas(bus, addr_result),

            _ => {
                self.dump_state();
                panic!("unhandled opcode {:02X}", opcode);
            }
        }
        0
    }
}

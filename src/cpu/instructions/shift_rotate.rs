// Shift and rotate instructions
//
// Each comes in an accumulator form and a memory (read-modify-write) form;
// the `accumulator` argument selects between them.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// ASL - Arithmetic Shift Left. Flags: C, Z, N
    pub fn asl(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        let value = if accumulator {
            self.a
        } else {
            bus.read(addr_result.address)
        };
        let result = value << 1;
        self.set_carry(value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);
        if accumulator {
            self.a = result;
        } else {
            bus.write(addr_result.address, result);
        }
    }

    /// LSR - Logical Shift Right. Flags: C, Z, N (N always clear)
    pub fn lsr(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        let value = if accumulator {
            self.a
        } else {
            bus.read(addr_result.address)
        };
        let result = value >> 1;
        self.set_carry(value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);
        if accumulator {
            self.a = result;
        } else {
            bus.write(addr_result.address, result);
        }
    }

    /// ROL - Rotate Left through carry. Flags: C, Z, N
    pub fn rol(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        let value = if accumulator {
            self.a
        } else {
            bus.read(addr_result.address)
        };
        let result = (value << 1) | self.get_carry() as u8;
        self.set_carry(value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);
        if accumulator {
            self.a = result;
        } else {
            bus.write(addr_result.address, result);
        }
    }

    /// ROR - Rotate Right through carry. Flags: C, Z, N
    pub fn ror(&mut self, bus: &mut Bus, addr_result: &AddressingResult, accumulator: bool) {
        let value = if accumulator {
            self.a
        } else {
            bus.read(addr_result.address)
        };
        let result = (value >> 1) | ((self.get_carry() as u8) << 7);
        self.set_carry(value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);
        if accumulator {
            self.a = result;
        } else {
            bus.write(addr_result.address, result);
        }
    }
}

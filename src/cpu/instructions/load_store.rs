// Load and Store instructions
//
// Loads read a value from memory into a register and update the Zero and
// Negative flags. Stores write a register to memory and affect no flags.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// LDA - Load Accumulator. Flags: Z, N
    pub fn lda(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a = value;
        self.update_zero_and_negative_flags(value);
    }

    /// LDX - Load X Register. Flags: Z, N
    pub fn ldx(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.x = value;
        self.update_zero_and_negative_flags(value);
    }

    /// LDY - Load Y Register. Flags: Z, N
    pub fn ldy(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.y = value;
        self.update_zero_and_negative_flags(value);
    }

    /// STA - Store Accumulator. Flags: none
    pub fn sta(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        bus.write(addr_result.address, self.a);
    }

    /// STX - Store X Register. Flags: none
    pub fn stx(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        bus.write(addr_result.address, self.x);
    }

    /// STY - Store Y Register. Flags: none
    pub fn sty(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        bus.write(addr_result.address, self.y);
    }
}

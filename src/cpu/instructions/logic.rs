// Logical instructions

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// AND - Logical AND with accumulator. Flags: Z, N
    pub fn and(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// ORA - Logical OR with accumulator. Flags: Z, N
    pub fn ora(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// EOR - Exclusive OR with accumulator. Flags: Z, N
    pub fn eor(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// BIT - Bit Test: Z from A & M, N and V copied from the operand
    pub fn bit(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.update_flag(flags::ZERO, self.a & value == 0);
        self.update_flag(flags::NEGATIVE, value & 0x80 != 0);
        self.update_flag(flags::OVERFLOW, value & 0x40 != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_or_eor() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();

        cpu.a = 0b1100;
        cpu.and(&mut bus, &AddressingResult::immediate(0b1010));
        assert_eq!(cpu.a, 0b1000);

        cpu.ora(&mut bus, &AddressingResult::immediate(0b0011));
        assert_eq!(cpu.a, 0b1011);

        cpu.eor(&mut bus, &AddressingResult::immediate(0b1011));
        assert_eq!(cpu.a, 0);
        assert!(cpu.get_zero());
    }

    #[test]
    fn test_bit_copies_operand_high_bits() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        bus.write(0x0010, 0xC0);
        cpu.a = 0x00;
        cpu.bit(&mut bus, &AddressingResult::new(0x0010));
        assert!(cpu.get_zero(), "A & M == 0");
        assert!(cpu.get_negative(), "bit 7 of operand");
        assert!(cpu.get_overflow(), "bit 6 of operand");
    }
}

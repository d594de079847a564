// Arithmetic instructions
//
// ADC and SBC carry the optional decimal mode: it is compile-time present
// but gated on `enable_decimal`, which stays off for NES execution and is
// only switched on by the 6502 conformance harness.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// ADC - Add with Carry. Flags: C, Z, V, N
    pub fn adc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        if self.enable_decimal && self.get_flag(flags::DECIMAL) {
            self.adc_decimal(value);
        } else {
            self.add_binary(value);
        }
    }

    /// SBC - Subtract with Carry. Flags: C, Z, V, N
    pub fn sbc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        if self.enable_decimal && self.get_flag(flags::DECIMAL) {
            self.sbc_decimal(value);
        } else {
            // Binary subtraction is addition of the one's complement
            self.add_binary(!value);
        }
    }

    /// Shared binary add: A + value + C
    pub(crate) fn add_binary(&mut self, value: u8) {
        let carry_in = self.get_carry() as u16;
        let sum = self.a as u16 + value as u16 + carry_in;
        let result = sum as u8;

        self.set_carry(sum > 0xFF);
        self.update_flag(
            flags::OVERFLOW,
            (!(self.a ^ value) & (self.a ^ result) & 0x80) != 0,
        );
        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    /// BCD add, NMOS 6502 semantics: Z from the binary sum, N and V from
    /// the intermediate high digit
    fn adc_decimal(&mut self, value: u8) {
        let carry_in = self.get_carry() as u16;
        let binary_sum = self.a as u16 + value as u16 + carry_in;
        self.update_flag(flags::ZERO, (binary_sum & 0xFF) == 0);

        let mut low = (self.a & 0x0F) as u16 + (value & 0x0F) as u16 + carry_in;
        if low >= 0x0A {
            low = ((low + 0x06) & 0x0F) + 0x10;
        }
        let mut sum = (self.a & 0xF0) as u16 + (value & 0xF0) as u16 + low;

        self.update_flag(flags::NEGATIVE, sum & 0x80 != 0);
        self.update_flag(
            flags::OVERFLOW,
            (!(self.a ^ value) & (self.a ^ sum as u8) & 0x80) != 0,
        );

        if sum >= 0xA0 {
            sum += 0x60;
        }
        self.set_carry(sum >= 0x100);
        self.a = sum as u8;
    }

    /// BCD subtract, NMOS 6502 semantics: all flags from the binary result
    fn sbc_decimal(&mut self, value: u8) {
        let borrow = !self.get_carry() as i16;
        let binary_diff = self.a as i16 - value as i16 - borrow;
        let binary_result = binary_diff as u8;

        self.update_flag(
            flags::OVERFLOW,
            ((self.a ^ value) & (self.a ^ binary_result) & 0x80) != 0,
        );
        self.set_carry(binary_diff >= 0);
        self.update_zero_and_negative_flags(binary_result);

        let mut low = (self.a & 0x0F) as i16 - (value & 0x0F) as i16 - borrow;
        if low < 0 {
            low = ((low - 0x06) & 0x0F) - 0x10;
        }
        let mut diff = (self.a & 0xF0) as i16 - (value & 0xF0) as i16 + low;
        if diff < 0 {
            diff -= 0x60;
        }
        self.a = diff as u8;
    }

    /// INC - Increment Memory. Flags: Z, N
    pub fn inc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = bus.read(addr_result.address).wrapping_add(1);
        bus.write(addr_result.address, value);
        self.update_zero_and_negative_flags(value);
    }

    /// DEC - Decrement Memory. Flags: Z, N
    pub fn dec(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = bus.read(addr_result.address).wrapping_sub(1);
        bus.write(addr_result.address, value);
        self.update_zero_and_negative_flags(value);
    }

    /// INX - Increment X. Flags: Z, N
    pub fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// INY - Increment Y. Flags: Z, N
    pub fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    /// DEX - Decrement X. Flags: Z, N
    pub fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// DEY - Decrement Y. Flags: Z, N
    pub fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }
}

// Flag manipulation instructions

use crate::cpu::{flags, Cpu};

impl Cpu {
    /// CLC - Clear Carry
    pub fn clc(&mut self) {
        self.clear_flag(flags::CARRY);
    }

    /// SEC - Set Carry
    pub fn sec(&mut self) {
        self.set_flag(flags::CARRY);
    }

    /// CLI - Clear Interrupt Disable
    pub fn cli(&mut self) {
        self.clear_flag(flags::INTERRUPT_DISABLE);
    }

    /// SEI - Set Interrupt Disable
    pub fn sei(&mut self) {
        self.set_flag(flags::INTERRUPT_DISABLE);
    }

    /// CLD - Clear Decimal
    pub fn cld(&mut self) {
        self.clear_flag(flags::DECIMAL);
    }

    /// SED - Set Decimal
    pub fn sed(&mut self) {
        self.set_flag(flags::DECIMAL);
    }

    /// CLV - Clear Overflow
    pub fn clv(&mut self) {
        self.clear_flag(flags::OVERFLOW);
    }
}

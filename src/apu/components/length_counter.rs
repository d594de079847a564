// Length counter: silences a channel when it reaches zero

use crate::apu::constants::LENGTH_COUNTER_TABLE;
use crate::emulator::save_state::{StatePut, StateReader};

#[derive(Debug, Clone)]
pub struct LengthCounter {
    counter: u8,
    halt: bool,
}

impl LengthCounter {
    pub fn new() -> Self {
        LengthCounter {
            counter: 0,
            halt: false,
        }
    }

    /// Half-frame clock
    pub fn clock(&mut self) {
        if !self.halt && self.counter > 0 {
            self.counter -= 1;
        }
    }

    /// Load from the 5-bit table index
    pub fn load(&mut self, index: u8) {
        self.counter = LENGTH_COUNTER_TABLE[(index & 0x1F) as usize];
    }

    /// Zero the counter (channel disabled via $4015)
    pub fn clear(&mut self) {
        self.counter = 0;
    }

    pub fn is_active(&self) -> bool {
        self.counter > 0
    }

    pub fn value(&self) -> u8 {
        self.counter
    }

    pub fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    pub fn write_state(&self, out: &mut Vec<u8>) {
        out.put_u8(self.counter);
        out.put_bool(self.halt);
    }

    pub fn read_state(&mut self, r: &mut StateReader) {
        self.counter = r.take_u8();
        self.halt = r.take_bool();
    }
}

// Linear counter: the triangle channel's fine-grained gate

use crate::emulator::save_state::{StatePut, StateReader};

#[derive(Debug, Clone)]
pub struct LinearCounter {
    counter: u8,
    reload_value: u8,
    reload_flag: bool,
    /// Control (halt) bit: while set the reload flag is never cleared
    control: bool,
}

impl LinearCounter {
    pub fn new() -> Self {
        LinearCounter {
            counter: 0,
            reload_value: 0,
            reload_flag: false,
            control: false,
        }
    }

    /// Quarter-frame clock
    pub fn clock(&mut self) {
        if self.reload_flag {
            self.counter = self.reload_value;
        } else if self.counter > 0 {
            self.counter -= 1;
        }
        if !self.control {
            self.reload_flag = false;
        }
    }

    /// $4008 write: control bit and reload value
    pub fn write_control(&mut self, data: u8) {
        self.control = data & 0x80 != 0;
        self.reload_value = data & 0x7F;
    }

    /// Timer-high write sets the reload flag
    pub fn set_reload(&mut self) {
        self.reload_flag = true;
    }

    pub fn is_active(&self) -> bool {
        self.counter > 0
    }

    pub fn write_state(&self, out: &mut Vec<u8>) {
        out.put_u8(self.counter);
        out.put_u8(self.reload_value);
        out.put_bool(self.reload_flag);
        out.put_bool(self.control);
    }

    pub fn read_state(&mut self, r: &mut StateReader) {
        self.counter = r.take_u8();
        self.reload_value = r.take_u8();
        self.reload_flag = r.take_bool();
        self.control = r.take_bool();
    }
}

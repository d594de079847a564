// Input module - joypad and paddle wire protocol
//
// The core consumes a per-frame snapshot of button state; the $4016/$4017
// serial protocol lives here. Writing $4016 with bit 0 set captures the
// live buttons into the latches; writing with bit 0 clear loads the
// latches into the read shift registers. Each read of a port returns the
// next bit in D0 and shifts a 1 into the MSB.
//
// The paddle reports its button on D1 of $4016 and its position on D1 of
// $4017 as an inverted 8-bit value read MSB first; valid positions run
// from 98 (full counter-clockwise) to 242.

/// Joypad button bits, in latch order (A is read first)
pub mod buttons {
    pub const A: u8 = 0x01;
    pub const B: u8 = 0x02;
    pub const SELECT: u8 = 0x04;
    pub const START: u8 = 0x08;
    pub const UP: u8 = 0x10;
    pub const DOWN: u8 = 0x20;
    pub const LEFT: u8 = 0x40;
    pub const RIGHT: u8 = 0x80;
}

/// Paddle position limits
pub const PADDLE_MIN: u8 = 98;
pub const PADDLE_MAX: u8 = 242;

/// One standard controller: live buttons, the captured latch, and the
/// serial shift register
#[derive(Debug, Clone, Default)]
pub struct Controller {
    /// Live button state from the frontend
    buttons: u8,
    /// Captured by a strobe-high write
    latch: u8,
    /// Drained LSB-first by port reads
    shift: u8,
}

impl Controller {
    pub fn new() -> Self {
        Controller::default()
    }

    /// Frontend updates the live state once per frame
    pub fn set_buttons(&mut self, buttons: u8) {
        self.buttons = buttons;
    }

    fn capture(&mut self) {
        self.latch = self.buttons;
    }

    fn load_shift(&mut self) {
        self.shift = self.latch;
    }

    /// Pop the next serial bit; ones shift in from the top
    fn read_bit(&mut self) -> u8 {
        let bit = self.shift & 1;
        self.shift = (self.shift >> 1) | 0x80;
        bit
    }
}

/// The optional paddle: a position latch read out inverted, MSB first
#[derive(Debug, Clone, Default)]
pub struct Paddle {
    pub attached: bool,
    position: u8,
    pub button: bool,
    shift: u8,
}

impl Paddle {
    /// Clamp and store the position; out-of-range values are a frontend
    /// bug worth hearing about once
    pub fn set_position(&mut self, position: u8) {
        if !(PADDLE_MIN..=PADDLE_MAX).contains(&position) {
            log::warn!(
                target: "famicore::nes",
                "paddle position {} outside [{}..{}], clamping",
                position,
                PADDLE_MIN,
                PADDLE_MAX
            );
        }
        self.position = position.clamp(PADDLE_MIN, PADDLE_MAX);
    }

    /// Load the shift register: bit-reversed so LSB-first draining yields
    /// the value MSB first, then inverted per the wire protocol
    fn load_shift(&mut self) {
        self.shift = !self.position.reverse_bits();
    }

    fn read_bit(&mut self) -> u8 {
        let bit = self.shift & 1;
        self.shift >>= 1;
        bit
    }
}

/// Both joypad ports plus the paddle, as seen from the bus
#[derive(Debug, Clone, Default)]
pub struct ControllerIO {
    pub controller1: Controller,
    pub controller2: Controller,
    pub paddle: Paddle,
}

impl ControllerIO {
    pub fn new() -> Self {
        ControllerIO::default()
    }

    /// $4016 write
    pub fn write_strobe(&mut self, data: u8) {
        if data & 1 != 0 {
            self.controller1.capture();
            self.controller2.capture();
        } else {
            self.controller1.load_shift();
            self.controller2.load_shift();
            self.paddle.load_shift();
        }
    }

    /// $4016 read: controller 1 serial data, paddle button on D1, and the
    /// usual open-bus upper bits
    pub fn read_port1(&mut self) -> u8 {
        let mut data = self.controller1.read_bit();
        if self.paddle.attached && self.paddle.button {
            data |= 0x02;
        }
        data | 0x40
    }

    /// $4017 read: controller 2 serial data, paddle position on D1
    pub fn read_port2(&mut self) -> u8 {
        let mut data = self.controller2.read_bit();
        if self.paddle.attached {
            data |= self.paddle.read_bit() << 1;
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strobe(io: &mut ControllerIO) {
        io.write_strobe(1);
        io.write_strobe(0);
    }

    #[test]
    fn test_buttons_read_lsb_first() {
        let mut io = ControllerIO::new();
        io.controller1.set_buttons(buttons::A | buttons::START);
        strobe(&mut io);

        let bits: Vec<u8> = (0..8).map(|_| io.read_port1() & 1).collect();
        assert_eq!(bits, [1, 0, 0, 1, 0, 0, 0, 0], "A, B, Select, Start, ...");
    }

    #[test]
    fn test_ones_shift_in_after_eight_reads() {
        let mut io = ControllerIO::new();
        strobe(&mut io);
        for _ in 0..8 {
            io.read_port1();
        }
        assert_eq!(io.read_port1() & 1, 1, "ninth read returns 1");
    }

    #[test]
    fn test_strobe_high_recaptures() {
        let mut io = ControllerIO::new();
        io.controller1.set_buttons(buttons::A);
        strobe(&mut io);
        assert_eq!(io.read_port1() & 1, 1);

        // New frame state; without a strobe the shift keeps draining
        io.controller1.set_buttons(0);
        strobe(&mut io);
        assert_eq!(io.read_port1() & 1, 0, "restrobe picks up the new state");
    }

    #[test]
    fn test_port2_reads_controller2() {
        let mut io = ControllerIO::new();
        io.controller2.set_buttons(buttons::B);
        strobe(&mut io);
        assert_eq!(io.read_port2() & 1, 0);
        assert_eq!(io.read_port2() & 1, 1, "B is the second bit");
    }

    #[test]
    fn test_paddle_position_inverted_msb_first() {
        let mut io = ControllerIO::new();
        io.paddle.attached = true;
        io.paddle.set_position(146); // %10010010 -> inverted %01101101
        strobe(&mut io);

        let mut value = 0u8;
        for _ in 0..8 {
            let bit = (io.read_port2() >> 1) & 1;
            value = (value << 1) | bit;
        }
        assert_eq!(!value, 146, "un-inverting the MSB-first stream");
    }

    #[test]
    fn test_paddle_clamps_out_of_range() {
        let mut io = ControllerIO::new();
        io.paddle.attached = true;
        io.paddle.set_position(10);
        strobe(&mut io);
        let mut value = 0u8;
        for _ in 0..8 {
            value = (value << 1) | ((io.read_port2() >> 1) & 1);
        }
        assert_eq!(!value, PADDLE_MIN);
    }

    #[test]
    fn test_paddle_button_on_port1_d1() {
        let mut io = ControllerIO::new();
        io.paddle.attached = true;
        io.paddle.button = true;
        assert_eq!(io.read_port1() & 0x02, 0x02);

        io.paddle.button = false;
        assert_eq!(io.read_port1() & 0x02, 0);
    }

    #[test]
    fn test_port1_open_bus_bit() {
        let mut io = ControllerIO::new();
        assert_eq!(io.read_port1() & 0x40, 0x40);
    }
}

// PPU register handling (CPU-side view of $2000-$2007)

use super::constants::*;
use super::Ppu;

impl Ppu {
    /// Read from a PPU register (0-7, already masked by the bus)
    ///
    /// Write-only registers return 0; tests must not assert on open bus.
    pub fn read_register(&mut self, register: u16) -> u8 {
        match register {
            2 => {
                // $2002: reading returns the status bits, clears vblank and
                // resets the $2005/$2006 write toggle
                let value = self.status;
                self.status &= !status::VBLANK;
                self.write_latch = false;
                value
            }
            4 => self.oam[self.oam_addr as usize],
            7 => {
                // $2007: buffered for $0000-$3EFF, immediate for palette.
                // Palette reads still refill the buffer from the name-table
                // space underneath.
                let addr = self.v & 0x3FFF;
                let value = if addr >= 0x3F00 {
                    let fresh = self.read_ppu_memory(addr);
                    self.read_buffer = self.read_ppu_memory(addr & 0x2FFF);
                    fresh
                } else {
                    let buffered = self.read_buffer;
                    self.read_buffer = self.read_ppu_memory(addr);
                    buffered
                };
                self.v = self.v.wrapping_add(self.vram_increment()) & 0x7FFF;
                value
            }
            _ => 0,
        }
    }

    /// Write to a PPU register (0-7, already masked by the bus)
    pub fn write_register(&mut self, register: u16, data: u8) {
        match register {
            0 => {
                // $2000: the name-table bits land in T, the background
                // pattern selector is latched at the next line start
                self.ctrl1 = data;
                self.t = (self.t & !0x0C00) | (((data & ctrl1::NAMETABLE) as u16) << 10);
                self.bg_pattern_table = (data & ctrl1::BG_PATTERN != 0) as u8;
            }
            1 => {
                self.ctrl2 = data;
            }
            2 => {
                log::warn!(target: "famicore::ppu", "write to read-only $2002 ignored");
            }
            3 => {
                self.oam_addr = data;
            }
            4 => {
                if self.rendering_active() {
                    log::warn!(
                        target: "famicore::ppu",
                        "OAM write during rendering (line {})",
                        self.scanline
                    );
                }
                self.oam[self.oam_addr as usize] = data;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                // $2005: first write is X (coarse into T, fine into X),
                // second is Y (coarse and fine into T)
                if self.write_latch {
                    self.t = (self.t & !0x73E0)
                        | (((data >> 3) as u16) << 5)
                        | (((data & 0x07) as u16) << 12);
                } else {
                    self.t = (self.t & !0x001F) | ((data >> 3) as u16);
                    self.fine_x = data & 0x07;
                }
                self.write_latch = !self.write_latch;
            }
            6 => {
                // $2006: high six bits then low byte; the second write
                // copies T into V
                if self.write_latch {
                    self.t = (self.t & 0xFF00) | data as u16;
                    self.v = self.t;
                } else {
                    self.t = (self.t & 0x00FF) | (((data & 0x3F) as u16) << 8);
                }
                self.write_latch = !self.write_latch;
            }
            7 => {
                if self.rendering_active() {
                    log::warn!(
                        target: "famicore::ppu",
                        "VRAM write during rendering: [{:04X}] <= {:02X} (line {})",
                        self.v & 0x3FFF,
                        data,
                        self.scanline
                    );
                }
                self.write_ppu_memory(self.v, data);
                self.v = self.v.wrapping_add(self.vram_increment()) & 0x7FFF;
            }
            _ => unreachable!("register index masked to 0-7"),
        }
    }

    #[inline]
    fn vram_increment(&self) -> u16 {
        if self.ctrl1 & ctrl1::INCREMENT_32 != 0 {
            32
        } else {
            1
        }
    }

    /// Rendering layers on and outside vblank: the window where OAM/VRAM
    /// port writes corrupt on real hardware
    #[inline]
    fn rendering_active(&self) -> bool {
        self.rendering_enabled() && !self.in_vblank
    }
}

// Mapper 4 (MMC3) - 8KB PRG banking, fine CHR banking, scanline IRQ
//
// Memory Layout:
// - CPU $8000-$FFFF: four 8KB PRG regions; two switchable, two fixed to the
//   last banks. Bit 6 of the bank-select register swaps which end holds the
//   fixed banks.
// - PPU $0000-$1FFF: one 2KB+2KB / 1KB*4 arrangement, optionally flipped
//   between the two pattern tables by bit 7 of the bank-select register.
//
// Registers (address bit 0 distinguishes the even/odd register in each
// $2000-sized window):
// - $8000 even: bank select (bits 0-2 register index, bit 6 PRG mode,
//   bit 7 CHR A12 invert)
// - $8001 odd:  bank data for the selected register
// - $A000 even: mirroring (bit 0: 1 = horizontal)
// - $A001 odd:  PRG-RAM protect (not emulated)
// - $C000 even: IRQ reload value
// - $C001 odd:  request counter reload on the next scanline
// - $E000 even: disable and acknowledge IRQ
// - $E001 odd:  enable IRQ
//
// The scanline counter runs whenever rendering is enabled, even with IRQs
// disabled: a zero counter reloads from the latch, otherwise it decrements
// and asserts the IRQ line when it reaches zero with IRQs enabled.

use crate::cartridge::mappers::{ChrBanks, Mapper, PrgBanks};
use crate::cartridge::{Cartridge, Mirroring};
use crate::emulator::save_state::{StatePut, StateReader};

pub struct Mapper4 {
    prg: PrgBanks,
    chr: ChrBanks,

    /// Bank select register ($8000)
    bank_select: u8,
    /// The eight bank registers: R0-R5 CHR, R6-R7 PRG
    bank_regs: [u8; 8],
    mirroring: Mirroring,

    /// IRQ scanline counter state
    irq_latch: u8,
    irq_counter: u8,
    irq_reload_pending: bool,
    irq_enabled: bool,
    irq_asserted: bool,
}

impl Mapper4 {
    pub fn new(cartridge: Cartridge) -> Self {
        let mut mapper = Mapper4 {
            prg: PrgBanks::new(cartridge.prg_rom),
            chr: ChrBanks::new(cartridge.chr_rom, cartridge.chr_is_ram),
            bank_select: 0,
            bank_regs: [0; 8],
            mirroring: cartridge.mirroring,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload_pending: false,
            irq_enabled: false,
            irq_asserted: false,
        };
        mapper.apply_banks();
        mapper
    }

    /// Recompute the PRG and CHR slot tables from the bank registers
    fn apply_banks(&mut self) {
        let last = self.prg.count_8k().saturating_sub(1);
        let r6 = self.bank_regs[6] as usize;
        let r7 = self.bank_regs[7] as usize;

        if self.bank_select & 0x40 != 0 {
            // Fixed second-to-last bank at $8000, R6 at $C000
            self.prg.select_8k(0, last - 1);
            self.prg.select_8k(1, r7);
            self.prg.select_8k(2, r6);
            self.prg.select_8k(3, last);
        } else {
            // R6 at $8000, fixed second-to-last at $C000
            self.prg.select_8k(0, r6);
            self.prg.select_8k(1, r7);
            self.prg.select_8k(2, last - 1);
            self.prg.select_8k(3, last);
        }

        // CHR: two 2KB banks (R0, R1) and four 1KB banks (R2-R5), the whole
        // arrangement flipped across $1000 when the A12-invert bit is set.
        let invert = (self.bank_select & 0x80 != 0) as usize * 4;
        self.chr
            .select_2k(invert / 2, (self.bank_regs[0] >> 1) as usize);
        self.chr
            .select_2k((2 + invert) / 2, (self.bank_regs[1] >> 1) as usize);
        for (i, reg) in (2..6).enumerate() {
            let slot = (4 + i + invert) & 7;
            self.chr.select_1k(slot, self.bank_regs[reg] as usize);
        }
    }
}

impl Mapper for Mapper4 {
    fn number(&self) -> u8 {
        4
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        self.prg.read(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr < 0x8000 {
            return;
        }

        match (addr & 0xE000, addr & 1) {
            (0x8000, 0) => {
                self.bank_select = value;
                self.apply_banks();
            }
            (0x8000, 1) => {
                self.bank_regs[(self.bank_select & 0x07) as usize] = value;
                self.apply_banks();
            }
            (0xA000, 0) => {
                self.mirroring = if value & 1 != 0 {
                    Mirroring::Horizontal
                } else {
                    Mirroring::Vertical
                };
            }
            (0xA000, 1) => {
                // PRG-RAM protect: SRAM is always enabled here
            }
            (0xC000, 0) => {
                self.irq_latch = value;
                log::trace!(target: "famicore::mapper", "MMC3 IRQ latch {}", value);
            }
            (0xC000, 1) => {
                self.irq_counter = 0;
                self.irq_reload_pending = true;
            }
            (0xE000, 0) => {
                self.irq_enabled = false;
                self.irq_asserted = false;
            }
            (0xE000, 1) => {
                self.irq_enabled = true;
            }
            _ => unreachable!(),
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr.read(addr)
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.chr.write(addr, value);
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn scanline(&mut self, rendering_enabled: bool) -> bool {
        if !rendering_enabled {
            return false;
        }

        if self.irq_counter == 0 || self.irq_reload_pending {
            self.irq_counter = self.irq_latch;
            self.irq_reload_pending = false;
        } else {
            self.irq_counter -= 1;
            if self.irq_counter == 0 && self.irq_enabled {
                log::trace!(target: "famicore::mapper", "MMC3 IRQ asserted");
                self.irq_asserted = true;
            }
        }

        self.irq_asserted
    }

    fn write_state(&self, out: &mut Vec<u8>) {
        out.put_u8(self.bank_select);
        out.put_bytes(&self.bank_regs);
        out.put_u8(match self.mirroring {
            Mirroring::Horizontal => 1,
            _ => 0,
        });
        out.put_u8(self.irq_latch);
        out.put_u8(self.irq_counter);
        out.put_bool(self.irq_reload_pending);
        out.put_bool(self.irq_enabled);
        out.put_bool(self.irq_asserted);
    }

    fn read_state(&mut self, r: &mut StateReader) {
        self.bank_select = r.take_u8();
        r.take_bytes(&mut self.bank_regs);
        self.mirroring = if r.take_u8() != 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        };
        self.irq_latch = r.take_u8();
        self.irq_counter = r.take_u8();
        self.irq_reload_pending = r.take_bool();
        self.irq_enabled = r.take_bool();
        self.irq_asserted = r.take_bool();
    }

    fn restore(&mut self) {
        self.apply_banks();
    }
}

// Mapper 1 (MMC1) - serial shift-register mapper
//
// All writes to $8000-$FFFF go through a 5-bit serial interface: bit 0 is
// shifted in LSB first, and the fifth write commits the accumulated value to
// the register selected by address bits 13-14. Writing with bit 7 set resets
// the shift register and forces the fix-last-bank PRG mode; when reset and
// data arrive in the same write, reset wins.
//
// Control register ($8000-$9FFF):
//   bits 0-1: mirroring (0 = 1-screen A, 1 = 1-screen B, 2 = vertical, 3 = horizontal)
//   bits 2-3: PRG mode (0/1 = 32KB, 2 = fix first at $8000, 3 = fix last at $C000)
//   bit 4:    CHR mode (0 = 8KB, 1 = two 4KB banks)
//
// CHR bank 0 ($A000-$BFFF), CHR bank 1 ($C000-$DFFF): 5-bit bank selects.
// On 512KB SUROM boards bit 4 of CHR bank 0 instead selects the 256KB PRG
// page, and the usable CHR mask shrinks to 1 bit.
//
// PRG bank ($E000-$FFFF): bits 0-3 select a 16KB (or half of a 32KB) bank.

use crate::cartridge::mappers::{ChrBanks, Mapper, PrgBanks};
use crate::cartridge::{Cartridge, Mirroring};
use crate::emulator::save_state::{StatePut, StateReader};

pub struct Mapper1 {
    prg: PrgBanks,
    chr: ChrBanks,

    /// Serial interface: accumulated bits and write count
    shift: u8,
    shift_count: u8,

    /// Committed registers
    control: u8,
    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,

    /// SUROM 256KB page select (bit 4 of the CHR bank 0 register)
    prg_page_256k: u8,
}

impl Mapper1 {
    pub fn new(cartridge: Cartridge) -> Self {
        let mut mapper = Mapper1 {
            prg: PrgBanks::new(cartridge.prg_rom),
            chr: ChrBanks::new(cartridge.chr_rom, cartridge.chr_is_ram),
            shift: 0,
            shift_count: 0,
            // Power-on: fix last bank, 16KB PRG switching, header mirroring
            control: 0x0C
                | match cartridge.mirroring {
                    Mirroring::Vertical => 0x02,
                    _ => 0x03,
                },
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            prg_page_256k: 0,
        };
        mapper.apply_banks();
        mapper
    }

    /// 512KB SUROM boards repurpose CHR register bit 4 as a PRG page select
    fn is_512k(&self) -> bool {
        self.prg.count_16k() >= 32
    }

    fn chr_bank_mask(&self) -> u8 {
        if self.is_512k() {
            0x01
        } else {
            0x1F
        }
    }

    /// Recompute every bank offset from the committed registers
    fn apply_banks(&mut self) {
        // PRG layout
        let page = (self.prg_page_256k as usize) << 4;
        let bank = (self.prg_bank & 0x0F) as usize | page;
        match (self.control >> 2) & 0x03 {
            0 | 1 => {
                // 32KB mode, low bit of the bank number ignored
                self.prg.select_16k(0, bank & !1);
                self.prg.select_16k(1, (bank & !1) + 1);
            }
            2 => {
                // Fix first bank at $8000, switch at $C000
                self.prg.select_16k(0, page);
                self.prg.select_16k(1, bank);
            }
            _ => {
                // Fix last bank at $C000, switch at $8000. The fixed bank is
                // the last one within the current 256KB page.
                let last = page | ((self.prg.count_16k() - 1) & 0x0F);
                self.prg.select_16k(0, bank);
                self.prg.select_16k(1, last);
            }
        }

        // CHR layout
        if self.control & 0x10 != 0 {
            // 4KB mode
            self.chr
                .select_4k(0, (self.chr_bank_0 & self.chr_bank_mask()) as usize);
            self.chr
                .select_4k(1, (self.chr_bank_1 & self.chr_bank_mask()) as usize);
        } else {
            // 8KB mode, low bit ignored
            let bank = (self.chr_bank_0 & self.chr_bank_mask() & !1) as usize;
            self.chr.select_4k(0, bank);
            self.chr.select_4k(1, bank + 1);
        }
    }

    /// Commit the full shift register to the register selected by the address
    fn commit(&mut self, addr: u16, value: u8) {
        match (addr >> 13) & 0x03 {
            0 => {
                self.control = value;
                log::debug!(
                    target: "famicore::mapper",
                    "MMC1 control {:02X}: mirroring {:?}, prg mode {}, chr mode {}",
                    value,
                    self.mirroring(),
                    (value >> 2) & 3,
                    (value >> 4) & 1
                );
            }
            1 => {
                self.chr_bank_0 = value;
                if self.is_512k() {
                    self.prg_page_256k = (value >> 4) & 1;
                }
            }
            2 => self.chr_bank_1 = value,
            _ => self.prg_bank = value,
        }
        self.apply_banks();
    }
}

impl Mapper for Mapper1 {
    fn number(&self) -> u8 {
        1
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        self.prg.read(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr < 0x8000 {
            return;
        }

        if value & 0x80 != 0 {
            // Reset wins over any data bit in the same write
            self.shift = 0;
            self.shift_count = 0;
            self.control |= 0x0C;
            self.prg_page_256k = 0;
            self.apply_banks();
            return;
        }

        self.shift |= (value & 1) << self.shift_count;
        self.shift_count += 1;

        if self.shift_count == 5 {
            let data = self.shift;
            self.shift = 0;
            self.shift_count = 0;
            self.commit(addr, data);
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr.read(addr)
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.chr.write(addr, value);
    }

    fn mirroring(&self) -> Mirroring {
        match self.control & 0x03 {
            0 => Mirroring::SingleScreenA,
            1 => Mirroring::SingleScreenB,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }

    fn write_state(&self, out: &mut Vec<u8>) {
        out.put_u8(self.shift);
        out.put_u8(self.shift_count);
        out.put_u8(self.control);
        out.put_u8(self.chr_bank_0);
        out.put_u8(self.chr_bank_1);
        out.put_u8(self.prg_bank);
        out.put_u8(self.prg_page_256k);
    }

    fn read_state(&mut self, r: &mut StateReader) {
        self.shift = r.take_u8();
        self.shift_count = r.take_u8();
        self.control = r.take_u8();
        self.chr_bank_0 = r.take_u8();
        self.chr_bank_1 = r.take_u8();
        self.prg_bank = r.take_u8();
        self.prg_page_256k = r.take_u8();
    }

    fn restore(&mut self) {
        self.apply_banks();
    }
}

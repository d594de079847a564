// Mapper 7 (AxROM) - 32KB PRG switching with 1-screen mirroring
//
// Memory Layout:
// - CPU $8000-$FFFF: switchable 32KB PRG-ROM bank
// - PPU $0000-$1FFF: fixed 8KB CHR (usually CHR-RAM)
//
// Writes to $8000-$FFFF: bits 0-2 select the 32KB bank, bit 4 selects
// 1-screen name table A or B. Used by games like Battletoads.

use crate::cartridge::mappers::{ChrBanks, Mapper, PrgBanks};
use crate::cartridge::{Cartridge, Mirroring};
use crate::emulator::save_state::{StatePut, StateReader};

pub struct Mapper7 {
    prg: PrgBanks,
    chr: ChrBanks,
    /// Last written bank/mirror select value
    select: u8,
}

impl Mapper7 {
    pub fn new(cartridge: Cartridge) -> Self {
        let mut mapper = Mapper7 {
            prg: PrgBanks::new(cartridge.prg_rom),
            chr: ChrBanks::new(cartridge.chr_rom, cartridge.chr_is_ram),
            select: 0,
        };
        mapper.prg.select_32k(0);
        mapper
    }
}

impl Mapper for Mapper7 {
    fn number(&self) -> u8 {
        7
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        self.prg.read(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.select = value;
            self.prg.select_32k((value & 0x07) as usize);
            log::trace!(
                target: "famicore::mapper",
                "AxROM bank {} mirror {}",
                value & 0x07,
                (value >> 4) & 1
            );
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr.read(addr)
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.chr.write(addr, value);
    }

    fn mirroring(&self) -> Mirroring {
        if self.select & 0x10 != 0 {
            Mirroring::SingleScreenB
        } else {
            Mirroring::SingleScreenA
        }
    }

    fn write_state(&self, out: &mut Vec<u8>) {
        out.put_u8(self.select);
    }

    fn read_state(&mut self, r: &mut StateReader) {
        self.select = r.take_u8();
    }

    fn restore(&mut self) {
        self.prg.select_32k((self.select & 0x07) as usize);
    }
}

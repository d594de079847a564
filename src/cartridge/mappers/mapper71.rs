// Mapper 71 (Camerica) - UxROM clone
//
// Memory Layout:
// - CPU $8000-$BFFF: switchable 16KB PRG-ROM bank
// - CPU $C000-$FFFF: fixed last 16KB PRG-ROM bank
// - PPU $0000-$1FFF: 8KB CHR-RAM
//
// The bank-select register lives at $C000-$FFFF; writes below that are
// board control on real hardware and are ignored here.

use crate::cartridge::mappers::{ChrBanks, Mapper, PrgBanks};
use crate::cartridge::{Cartridge, Mirroring};
use crate::emulator::save_state::{StatePut, StateReader};

pub struct Mapper71 {
    prg: PrgBanks,
    chr: ChrBanks,
    mirroring: Mirroring,
    prg_bank: u8,
}

impl Mapper71 {
    pub fn new(cartridge: Cartridge) -> Self {
        Mapper71 {
            prg: PrgBanks::new(cartridge.prg_rom),
            chr: ChrBanks::new(cartridge.chr_rom, cartridge.chr_is_ram),
            mirroring: cartridge.mirroring,
            prg_bank: 0,
        }
    }
}

impl Mapper for Mapper71 {
    fn number(&self) -> u8 {
        71
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        self.prg.read(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0xC000 {
            self.prg_bank = value;
            self.prg.select_16k(0, value as usize);
            log::trace!(target: "famicore::mapper", "Camerica bank select {}", value);
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

    fn write_state(&self, out: &mut Vec<u8>) {
        out.put_u8(self.prg_bank);
    }

    fn read_state(&mut self, r: &mut StateReader) {
        self.prg_bank = r.take_u8();
    }

    fn restore(&mut self) {
        self.prg.select_16k(0, self.prg_bank as usize);
    }
}

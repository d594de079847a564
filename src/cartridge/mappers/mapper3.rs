// Mapper 3 (CNROM) - fixed PRG, switched CHR
//
// Memory Layout:
// - CPU $8000-$FFFF: fixed 16KB or 32KB PRG-ROM
// - PPU $0000-$1FFF: switchable 8KB CHR-ROM bank
//
// Any write to $8000-$FFFF selects the 8KB CHR bank.

use crate::cartridge::mappers::{ChrBanks, Mapper, PrgBanks};
use crate::cartridge::{Cartridge, Mirroring};
use crate::emulator::save_state::{StatePut, StateReader};

pub struct Mapper3 {
    prg: PrgBanks,
    chr: ChrBanks,
    mirroring: Mirroring,
    /// Currently selected 8KB CHR bank
    chr_bank: u8,
}

impl Mapper3 {
    pub fn new(cartridge: Cartridge) -> Self {
        Mapper3 {
            prg: PrgBanks::new(cartridge.prg_rom),
            chr: ChrBanks::new(cartridge.chr_rom, cartridge.chr_is_ram),
            mirroring: cartridge.mirroring,
            chr_bank: 0,
        }
    }
}

impl Mapper for Mapper3 {
    fn number(&self) -> u8 {
        3
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        self.prg.read(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.chr_bank = value;
            self.chr.select_8k(value as usize);
            log::trace!(target: "famicore::mapper", "CNROM CHR bank select {}", value);
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
        out.put_u8(self.chr_bank);
    }

    fn read_state(&mut self, r: &mut StateReader) {
        self.chr_bank = r.take_u8();
    }

    fn restore(&mut self) {
        self.chr.select_8k(self.chr_bank as usize);
    }
}

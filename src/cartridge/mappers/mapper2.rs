// Mapper 2 (UxROM) - switched low bank, fixed high bank
//
// Memory Layout:
// - CPU $8000-$BFFF: switchable 16KB PRG-ROM bank
// - CPU $C000-$FFFF: fixed last 16KB PRG-ROM bank
// - PPU $0000-$1FFF: 8KB CHR (usually CHR-RAM)
//
// Any write to $8000-$FFFF selects the low bank.

use crate::cartridge::mappers::{ChrBanks, Mapper, PrgBanks};
use crate::cartridge::{Cartridge, Mirroring};
use crate::emulator::save_state::{StatePut, StateReader};

pub struct Mapper2 {
    prg: PrgBanks,
    chr: ChrBanks,
    mirroring: Mirroring,
    /// Currently selected low 16KB bank
    prg_bank: u8,
}

impl Mapper2 {
    pub fn new(cartridge: Cartridge) -> Self {
        Mapper2 {
            prg: PrgBanks::new(cartridge.prg_rom),
            chr: ChrBanks::new(cartridge.chr_rom, cartridge.chr_is_ram),
            mirroring: cartridge.mirroring,
            prg_bank: 0,
        }
    }
}

impl Mapper for Mapper2 {
    fn number(&self) -> u8 {
        2
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        self.prg.read(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.prg_bank = value;
            self.prg.select_16k(0, value as usize);
            log::trace!(target: "famicore::mapper", "UxROM bank select {}", value);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mappers::test_cartridge;

    #[test]
    fn test_low_bank_switch_high_fixed() {
        let mut mapper = Mapper2::new(test_cartridge(2, 4, 0));
        assert_eq!(mapper.cpu_read(0xC000), 3, "high half fixed to last bank");

        mapper.cpu_write(0x8000, 2);
        assert_eq!(mapper.cpu_read(0x8000), 2);
        assert_eq!(mapper.cpu_read(0xC000), 3, "high half unaffected");
    }

    #[test]
    fn test_bank_select_wraps() {
        let mut mapper = Mapper2::new(test_cartridge(2, 4, 0));
        mapper.cpu_write(0x8000, 6);
        assert_eq!(mapper.cpu_read(0x8000), 2);
    }

    #[test]
    fn test_state_roundtrip() {
        let mut mapper = Mapper2::new(test_cartridge(2, 4, 0));
        mapper.cpu_write(0x8000, 1);

        let mut state = Vec::new();
        mapper.write_state(&mut state);

        let mut restored = Mapper2::new(test_cartridge(2, 4, 0));
        restored.read_state(&mut StateReader::new(&state));
        restored.restore();
        assert_eq!(restored.cpu_read(0x8000), 1);
    }
}

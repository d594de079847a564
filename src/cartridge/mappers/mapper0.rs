// Mapper 0 (NROM) - no bank switching
//
// Memory Layout:
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (mirror of the first for 16KB carts)
// - PPU $0000-$1FFF: 8KB CHR-ROM or CHR-RAM

use crate::cartridge::mappers::{ChrBanks, Mapper, PrgBanks};
use crate::cartridge::{Cartridge, Mirroring};
use crate::emulator::save_state::StateReader;

/// Mapper 0 implementation (NROM)
pub struct Mapper0 {
    prg: PrgBanks,
    chr: ChrBanks,
    /// Fixed mirroring from the iNES header
    mirroring: Mirroring,
}

impl Mapper0 {
    pub fn new(cartridge: Cartridge) -> Self {
        Mapper0 {
            prg: PrgBanks::new(cartridge.prg_rom),
            chr: ChrBanks::new(cartridge.chr_rom, cartridge.chr_is_ram),
            mirroring: cartridge.mirroring,
        }
    }
}

impl Mapper for Mapper0 {
    fn number(&self) -> u8 {
        0
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        self.prg.read(addr)
    }

    fn cpu_write(&mut self, _addr: u16, _value: u8) {
        // NROM has no mapper registers
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

    fn write_state(&self, _out: &mut Vec<u8>) {
        // No mutable register state
    }

    fn read_state(&mut self, _r: &mut StateReader) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mappers::test_cartridge;

    #[test]
    fn test_16kb_rom_mirrors_high_half() {
        let mapper = Mapper0::new(test_cartridge(0, 1, 1));
        assert_eq!(mapper.cpu_read(0x8000), 0);
        assert_eq!(mapper.cpu_read(0xC000), 0, "$C000 mirrors $8000");
    }

    #[test]
    fn test_32kb_rom_no_mirroring() {
        let mapper = Mapper0::new(test_cartridge(0, 2, 1));
        assert_eq!(mapper.cpu_read(0x8000), 0);
        assert_eq!(mapper.cpu_read(0xC000), 1);
    }

    #[test]
    fn test_writes_ignored() {
        let mut mapper = Mapper0::new(test_cartridge(0, 1, 1));
        mapper.cpu_write(0x8000, 0xFF);
        assert_eq!(mapper.cpu_read(0x8000), 0);
    }

    #[test]
    fn test_chr_ram_write() {
        let mut mapper = Mapper0::new(test_cartridge(0, 1, 0));
        mapper.ppu_write(0x0123, 0x42);
        assert_eq!(mapper.ppu_read(0x0123), 0x42);
    }
}

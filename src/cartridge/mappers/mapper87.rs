// Mapper 87 - fixed PRG with a 2-bit CHR select
//
// Memory Layout:
// - CPU $8000-$FFFF: fixed 16KB or 32KB PRG-ROM
// - PPU $0000-$1FFF: switchable 8KB CHR-ROM bank
//
// The register lives at $6000-$7FFF:
//
// ```text
//   [.... ..AB]
//     B = high CHR bit
//     A = low CHR bit
// ```
//
// Note the reversed bit order; most carts on this board only carry 16KB of
// CHR so the high bit is usually unused.

use crate::cartridge::mappers::{ChrBanks, Mapper, PrgBanks};
use crate::cartridge::{Cartridge, Mirroring};
use crate::emulator::save_state::{StatePut, StateReader};

pub struct Mapper87 {
    prg: PrgBanks,
    chr: ChrBanks,
    mirroring: Mirroring,
    chr_bank: u8,
}

impl Mapper87 {
    pub fn new(cartridge: Cartridge) -> Self {
        Mapper87 {
            prg: PrgBanks::new(cartridge.prg_rom),
            chr: ChrBanks::new(cartridge.chr_rom, cartridge.chr_is_ram),
            mirroring: cartridge.mirroring,
            chr_bank: 0,
        }
    }

    /// Decode the reversed-bit register value into an 8KB bank number
    fn decode_bank(value: u8) -> usize {
        (((value & 1) << 1) | ((value >> 1) & 1)) as usize
    }
}

impl Mapper for Mapper87 {
    fn number(&self) -> u8 {
        87
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        self.prg.read(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if (0x6000..0x8000).contains(&addr) {
            self.chr_bank = value & 0x03;
            self.chr.select_8k(Self::decode_bank(self.chr_bank));
            log::trace!(
                target: "famicore::mapper",
                "Mapper 87 CHR bank {} (reg {:02X})",
                Self::decode_bank(self.chr_bank),
                value
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
        self.mirroring
    }

    fn write_state(&self, out: &mut Vec<u8>) {
        out.put_u8(self.chr_bank);
    }

    fn read_state(&mut self, r: &mut StateReader) {
        self.chr_bank = r.take_u8();
    }

    fn restore(&mut self) {
        self.chr.select_8k(Self::decode_bank(self.chr_bank));
    }
}

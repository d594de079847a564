// PPU memory access: VRAM addressing, name-table mirroring, palette aliases

use super::constants::NAMETABLE_SIZE;
use super::Ppu;

impl Ppu {
    /// Collapse a name-table address ($2000-$2FFF) onto the two physical
    /// 1KB tables according to the current mirroring mode
    ///
    /// Mirroring is a pure function of (address, mode); it never reaches
    /// into the pattern-table region.
    pub(crate) fn mirror_nametable_addr(&self, addr: u16) -> usize {
        let addr = (addr & 0x0FFF) as usize;
        let logical = addr / NAMETABLE_SIZE;
        let offset = addr % NAMETABLE_SIZE;
        self.mirroring.physical_table(logical) * NAMETABLE_SIZE + offset
    }

    /// Collapse a palette address ($3F00-$3FFF) onto the 32-byte palette,
    /// with $3F10/$3F14/$3F18/$3F1C aliasing their background entries
    pub(crate) fn mirror_palette_addr(&self, addr: u16) -> usize {
        let addr = (addr & 0x001F) as usize;
        if addr >= 16 && addr % 4 == 0 {
            addr - 16
        } else {
            addr
        }
    }

    /// Read from PPU memory: pattern tables via the mapper, name tables,
    /// palette. $3000-$3EFF mirrors $2000-$2EFF.
    pub(crate) fn read_ppu_memory(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => match self.mapper {
                Some(ref mapper) => mapper.borrow().ppu_read(addr),
                None => 0,
            },
            0x2000..=0x2FFF => self.nametables[self.mirror_nametable_addr(addr)],
            0x3000..=0x3EFF => self.nametables[self.mirror_nametable_addr(addr - 0x1000)],
            0x3F00..=0x3FFF => self.palette_ram[self.mirror_palette_addr(addr)],
            _ => unreachable!(),
        }
    }

    /// Write to PPU memory
    pub(crate) fn write_ppu_memory(&mut self, addr: u16, data: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => {
                if let Some(ref mapper) = self.mapper {
                    mapper.borrow_mut().ppu_write(addr, data);
                }
            }
            0x2000..=0x2FFF => {
                let index = self.mirror_nametable_addr(addr);
                self.nametables[index] = data;
            }
            0x3000..=0x3EFF => {
                let index = self.mirror_nametable_addr(addr - 0x1000);
                self.nametables[index] = data;
            }
            0x3F00..=0x3FFF => {
                let index = self.mirror_palette_addr(addr);
                self.palette_ram[index] = data;
            }
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;

    #[test]
    fn test_vertical_mirroring() {
        let mut ppu = Ppu::new();
        ppu.mirroring = Mirroring::Vertical;

        ppu.write_ppu_memory(0x2000, 0x11);
        assert_eq!(ppu.read_ppu_memory(0x2800), 0x11, "$2000 and $2800 share table a");

        ppu.write_ppu_memory(0x2400, 0x22);
        assert_eq!(ppu.read_ppu_memory(0x2C00), 0x22, "$2400 and $2C00 share table b");
    }

    #[test]
    fn test_horizontal_mirroring() {
        let mut ppu = Ppu::new();
        ppu.mirroring = Mirroring::Horizontal;

        ppu.write_ppu_memory(0x2000, 0x33);
        assert_eq!(ppu.read_ppu_memory(0x2400), 0x33, "$2000 and $2400 share table a");

        ppu.write_ppu_memory(0x2800, 0x44);
        assert_eq!(ppu.read_ppu_memory(0x2C00), 0x44, "$2800 and $2C00 share table b");
        assert_ne!(ppu.read_ppu_memory(0x2000), 0x44);
    }

    #[test]
    fn test_single_screen_mirroring() {
        let mut ppu = Ppu::new();
        ppu.mirroring = Mirroring::SingleScreenA;
        ppu.write_ppu_memory(0x2000, 0x55);
        for base in [0x2400u16, 0x2800, 0x2C00] {
            assert_eq!(ppu.read_ppu_memory(base), 0x55);
        }

        ppu.mirroring = Mirroring::SingleScreenB;
        ppu.write_ppu_memory(0x2000, 0x66);
        assert_eq!(ppu.read_ppu_memory(0x2C00), 0x66);
        ppu.mirroring = Mirroring::SingleScreenA;
        assert_eq!(ppu.read_ppu_memory(0x2000), 0x55, "table a untouched");
    }

    #[test]
    fn test_3000_mirror_of_2000() {
        let mut ppu = Ppu::new();
        ppu.write_ppu_memory(0x2005, 0x77);
        assert_eq!(ppu.read_ppu_memory(0x3005), 0x77);
    }

    #[test]
    fn test_palette_aliases() {
        let mut ppu = Ppu::new();
        for (alias, base) in [(0x3F10u16, 0x3F00u16), (0x3F14, 0x3F04), (0x3F18, 0x3F08), (0x3F1C, 0x3F0C)] {
            ppu.write_ppu_memory(base, 0x2A);
            assert_eq!(ppu.read_ppu_memory(alias), 0x2A, "{:04X} aliases {:04X}", alias, base);

            ppu.write_ppu_memory(alias, 0x15);
            assert_eq!(ppu.read_ppu_memory(base), 0x15, "alias writes through");
        }
    }

    #[test]
    fn test_palette_mirrors_every_32_bytes() {
        let mut ppu = Ppu::new();
        ppu.write_ppu_memory(0x3F01, 0x0F);
        assert_eq!(ppu.read_ppu_memory(0x3F21), 0x0F);
        assert_eq!(ppu.read_ppu_memory(0x3FE1), 0x0F);
    }
}

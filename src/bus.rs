// Bus module - CPU address decoder
//
// Routes reads and writes to work RAM, the PPU and APU register files, the
// joypad ports, SRAM, and mapper-banked PRG-ROM. The bus owns the PPU, APU,
// controller ports and SRAM; the mapper is shared with the PPU (which reads
// pattern tables through it) behind an Rc<RefCell>.
//
// # NES Memory Map (CPU Address Space)
//
// ```text
// $0000-$07FF: 2KB work RAM, mirrored through $1FFF
// $2000-$2007: PPU registers, mirrored through $3FFF
// $4000-$4017: APU and I/O registers ($4014 OAM DMA, $4016/$4017 joypads)
// $4018-$5FFF: cartridge expansion (mapper-defined)
// $6000-$7FFF: cartridge SRAM (8KB)
// $8000-$FFFF: mapper-banked PRG-ROM
// ```
//
// The 6502 conformance harness runs against a flat 64KB RAM image instead
// of the NES map; `Bus::new_flat` selects that mode.

use crate::apu::Apu;
use crate::cartridge::Mapper;
use crate::emulator::save_state::{StatePut, StateReader};
use crate::input::ControllerIO;
use crate::ppu::Ppu;
use std::cell::RefCell;
use std::rc::Rc;

/// Work RAM size (2KB, mirrored to $1FFF)
pub const RAM_SIZE: usize = 0x0800;

/// Cartridge SRAM size (8KB at $6000-$7FFF)
pub const SRAM_SIZE: usize = 0x2000;

/// CPU cycles consumed by an OAM DMA transfer
pub const DMA_CYCLES: u64 = 512;

/// Main memory bus
pub struct Bus {
    /// 2KB internal work RAM
    ram: [u8; RAM_SIZE],
    /// 8KB cartridge SRAM, optionally battery-backed
    sram: [u8; SRAM_SIZE],
    /// Picture processing unit (registers at $2000-$2007)
    ppu: Ppu,
    /// Audio processing unit (registers at $4000-$4017)
    apu: Apu,
    /// Joypad ports ($4016/$4017)
    controllers: ControllerIO,
    /// Cartridge mapper, shared with the PPU
    mapper: Option<Rc<RefCell<Box<dyn Mapper>>>>,

    /// CPU stall cycles accumulated by DMA, collected after each opcode
    stall_cycles: u64,

    /// Flat 64KB address space for the conformance harness; bypasses the
    /// NES memory map entirely when present
    flat_ram: Option<Box<[u8; 0x10000]>>,
}

impl Bus {
    /// Create a bus with the NES memory map and no cartridge attached
    pub fn new() -> Self {
        Bus {
            ram: [0; RAM_SIZE],
            sram: [0; SRAM_SIZE],
            ppu: Ppu::new(),
            apu: Apu::new(),
            controllers: ControllerIO::new(),
            mapper: None,
            stall_cycles: 0,
            flat_ram: None,
        }
    }

    /// Create a bus backed by a flat 64KB RAM image (conformance harness)
    pub fn new_flat() -> Self {
        let mut bus = Bus::new();
        bus.flat_ram = Some(Box::new([0; 0x10000]));
        bus
    }

    /// Attach a cartridge mapper; the PPU shares it for pattern access
    pub fn attach_mapper(&mut self, mapper: Rc<RefCell<Box<dyn Mapper>>>) {
        self.ppu.attach_mapper(Rc::clone(&mapper));
        self.mapper = Some(mapper);
    }

    /// Read a byte from the bus
    pub fn read(&mut self, addr: u16) -> u8 {
        if let Some(ref flat) = self.flat_ram {
            return flat[addr as usize];
        }

        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.ppu.read_register(addr & 0x0007),
            0x4015 => self.apu.read_status(),
            0x4016 => self.controllers.read_port1(),
            0x4017 => self.controllers.read_port2(),
            0x4000..=0x4014 => 0, // write-only APU/DMA registers
            0x4018..=0x5FFF => 0, // cartridge expansion, unused by the supported boards
            0x6000..=0x7FFF => self.sram[(addr - 0x6000) as usize],
            0x8000..=0xFFFF => match self.mapper {
                Some(ref mapper) => mapper.borrow().cpu_read(addr),
                None => 0,
            },
        }
    }

    /// Write a byte to the bus
    pub fn write(&mut self, addr: u16, data: u8) {
        if let Some(ref mut flat) = self.flat_ram {
            flat[addr as usize] = data;
            return;
        }

        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,
            0x2000..=0x3FFF => self.ppu.write_register(addr & 0x0007, data),
            0x4014 => self.oam_dma(data),
            0x4016 => self.controllers.write_strobe(data),
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write_register(addr, data),
            0x4018..=0x5FFF => {
                if let Some(ref mapper) = self.mapper {
                    mapper.borrow_mut().cpu_write(addr, data);
                }
            }
            0x6000..=0x7FFF => {
                self.sram[(addr - 0x6000) as usize] = data;
                // Some boards (mapper 87) register in this window
                if let Some(ref mapper) = self.mapper {
                    mapper.borrow_mut().cpu_write(addr, data);
                    self.ppu.sync_mirroring();
                }
            }
            0x8000..=0xFFFF => {
                if let Some(ref mapper) = self.mapper {
                    mapper.borrow_mut().cpu_write(addr, data);
                    // A bank register may have changed the mirroring
                    self.ppu.sync_mirroring();
                }
            }
        }
    }

    /// OAM DMA ($4014): copy 256 bytes from page `n` into OAM at the
    /// current cursor and stall the CPU for 512 cycles
    fn oam_dma(&mut self, page: u8) {
        if self.ppu.rendering_enabled() && !self.ppu.in_vblank() {
            log::warn!(
                target: "famicore::ppu",
                "OAM DMA from page {:02X} outside vblank",
                page
            );
        }

        let base = (page as u16) << 8;
        for i in 0..256u16 {
            let value = self.read(base + i);
            self.ppu.oam_dma_write(i as u8, value);
        }
        self.stall_cycles += DMA_CYCLES;
    }

    /// Collect and clear the stall cycles accumulated during the current
    /// instruction
    pub fn take_stall_cycles(&mut self) -> u64 {
        std::mem::take(&mut self.stall_cycles)
    }

    /// The CPU's pending cycle trigger fired: expose the sprite-0 hit
    pub fn cpu_trigger_fired(&mut self) {
        self.ppu.set_sprite0_hit();
    }

    /// Generate APU samples, serving DMC fetches from the CPU's view of
    /// PRG memory. Returns the CPU cycles stolen by those fetches.
    pub fn fill_audio(&mut self, count: u32) -> u64 {
        let Bus {
            apu,
            mapper,
            sram,
            ram,
            ..
        } = self;
        let mut prg_read = |addr: u16| -> u8 {
            match addr {
                0x6000..=0x7FFF => sram[(addr - 0x6000) as usize],
                0x8000..=0xFFFF => match mapper {
                    Some(mapper) => mapper.borrow().cpu_read(addr),
                    None => 0,
                },
                _ => ram[(addr & 0x07FF) as usize],
            }
        };
        apu.fill_buffer(count, &mut prg_read)
    }

    /// Visible-scanline hook for the mapper; true when it asserts an IRQ
    pub fn mapper_scanline(&mut self) -> bool {
        let rendering = self.ppu.rendering_enabled();
        match self.mapper {
            Some(ref mapper) => mapper.borrow_mut().scanline(rendering),
            None => false,
        }
    }

    // ========================================
    // Component access
    // ========================================

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerIO {
        &mut self.controllers
    }

    pub fn sram(&self) -> &[u8; SRAM_SIZE] {
        &self.sram
    }

    pub fn sram_mut(&mut self) -> &mut [u8; SRAM_SIZE] {
        &mut self.sram
    }

    /// Work RAM view for the Blargg work-RAM status protocol
    pub fn work_ram(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    // ========================================
    // Save state: RAM, SRAM, then the mapper's registers
    // ========================================

    pub fn write_state(&self, out: &mut Vec<u8>) {
        out.put_bytes(&self.ram);
        out.put_bytes(&self.sram);
        match self.mapper {
            Some(ref mapper) => {
                let mapper = mapper.borrow();
                out.put_u8(mapper.number());
                mapper.write_state(out);
            }
            None => out.put_u8(0xFF),
        }
    }

    /// Restore RAM/SRAM/mapper state; the mapper rebuilds its bank tables.
    /// Returns the mapper number found in the payload for validation.
    pub fn read_state(&mut self, r: &mut StateReader) -> u8 {
        r.take_bytes(&mut self.ram);
        r.take_bytes(&mut self.sram);
        let number = r.take_u8();
        if let Some(ref mapper) = self.mapper {
            let mut mapper = mapper.borrow_mut();
            if number == mapper.number() {
                mapper.read_state(r);
                mapper.restore();
            }
        }
        number
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

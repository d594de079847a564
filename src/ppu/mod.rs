// PPU module - Picture Processing Unit implementation
//
// A scanline-accurate PPU. Rendering happens one row at a time, after the
// CPU has executed that line's cycle budget, which preserves the observable
// ordering rules:
//
// - scroll and address writes issued during a line take effect on the next
//   line (the horizontal loopy bits copy from T to V at line start);
// - the background pattern-table selector written to $2000 is latched at
//   start-of-line;
// - the sprite-0 hit becomes visible to the CPU at approximately the right
//   dot, via a cycle trigger scheduled on the CPU rather than a mid-line
//   status write.
//
// Scanline indexing follows the frame loop convention: line 0 is vblank
// onset, line 20 clears the in-vblank flags and reloads the vertical scroll,
// lines 21-260 render screen rows 0-239, line 261 is the pre-render line.
//
// ## Register Map ($2000-$2007, mirrored through $3FFF)
//
// | Address | Name       | Access  |
// |---------|------------|---------|
// | $2000   | Ctrl1      | Write   |
// | $2001   | Ctrl2      | Write   |
// | $2002   | Status     | Read    |
// | $2003   | OAMAddr    | Write   |
// | $2004   | OAMData    | R/W     |
// | $2005   | Scroll     | Write x2|
// | $2006   | Addr       | Write x2|
// | $2007   | Data       | R/W     |

pub mod constants;
mod memory;
mod registers;
mod rendering;

use crate::cartridge::{Mapper, Mirroring};
use crate::emulator::save_state::{StatePut, StateReader};
use constants::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Outcome of rendering one scanline: where sprite 0 first overlapped the
/// background, if it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite0 {
    /// No collision on this line
    Miss,
    /// Collision at this x coordinate; the caller schedules the status bit
    Hit { x: u16 },
}

/// PPU structure
pub struct Ppu {
    // ========================================
    // CPU-visible registers
    // ========================================
    /// $2000 control register 1
    pub(crate) ctrl1: u8,
    /// $2001 control register 2
    pub(crate) ctrl2: u8,
    /// $2002 status bits (vblank, sprite 0, overflow)
    pub(crate) status: u8,
    /// $2003 OAM cursor
    pub(crate) oam_addr: u8,

    // ========================================
    // Loopy address model
    // ========================================
    /// V: current VRAM address (15 bits)
    pub(crate) v: u16,
    /// T: latch / top-left scroll address
    pub(crate) t: u16,
    /// Fine X scroll (3 bits)
    pub(crate) fine_x: u8,
    /// S: background pattern-table selector, latched at start-of-line
    pub(crate) bg_pattern_table: u8,
    /// The latched S in effect for the line being rendered
    pub(crate) active_bg_pattern: u8,
    /// Double-write toggle for $2005/$2006
    pub(crate) write_latch: bool,
    /// One-byte read buffer for $2007 (palette reads bypass it)
    pub(crate) read_buffer: u8,

    // ========================================
    // Memory
    // ========================================
    /// 2KB of internal name-table RAM (two physical 1KB tables)
    pub(crate) nametables: [u8; NAMETABLE_SIZE * 2],
    /// 32 bytes of palette RAM
    pub(crate) palette_ram: [u8; PALETTE_SIZE],
    /// Object attribute memory
    pub(crate) oam: [u8; OAM_SIZE],
    /// Name-table mirroring, re-read from the mapper after bank writes
    pub(crate) mirroring: Mirroring,
    /// Pattern tables live in the cartridge; shared with the bus
    pub(crate) mapper: Option<Rc<RefCell<Box<dyn Mapper>>>>,

    // ========================================
    // Frame state
    // ========================================
    /// Rendered frame: one system-palette index per pixel
    pub(crate) frame_buffer: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// Current scanline (0-261, frame-loop convention)
    pub scanline: u16,
    /// Frame counter
    pub frame_count: u64,
    /// Inside vertical blank
    pub(crate) in_vblank: bool,
    /// Sprite-0 collision already found this frame
    pub(crate) sprite0_found: bool,

    /// Force a sprite-0 hit whenever sprite 0 is on a rendered line (debug)
    pub force_sprite0: bool,
}

impl Ppu {
    pub fn new() -> Self {
        Ppu {
            ctrl1: 0,
            ctrl2: 0,
            status: 0,
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            bg_pattern_table: 0,
            active_bg_pattern: 0,
            write_latch: false,
            read_buffer: 0,
            nametables: [0; NAMETABLE_SIZE * 2],
            palette_ram: [0; PALETTE_SIZE],
            oam: [0; OAM_SIZE],
            mirroring: Mirroring::Horizontal,
            mapper: None,
            frame_buffer: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            scanline: 0,
            frame_count: 0,
            in_vblank: false,
            sprite0_found: false,
            force_sprite0: false,
        }
    }

    /// Attach the cartridge's pattern-table view and take its mirroring
    pub fn attach_mapper(&mut self, mapper: Rc<RefCell<Box<dyn Mapper>>>) {
        self.mirroring = mapper.borrow().mirroring();
        self.mapper = Some(mapper);
    }

    /// Re-read mirroring from the mapper; called after PRG writes since a
    /// bank register may have changed it
    pub fn sync_mirroring(&mut self) {
        if let Some(ref mapper) = self.mapper {
            self.mirroring = mapper.borrow().mirroring();
        }
    }

    /// Background or sprite layer enabled
    #[inline]
    pub fn rendering_enabled(&self) -> bool {
        self.ctrl2 & (ctrl2::SHOW_BG | ctrl2::SHOW_SPRITES) != 0
    }

    /// NMI-on-vblank enabled in $2000
    #[inline]
    pub fn nmi_enabled(&self) -> bool {
        self.ctrl1 & ctrl1::NMI_ON_VBLANK != 0
    }

    #[inline]
    pub fn in_vblank(&self) -> bool {
        self.in_vblank
    }

    /// The rendered frame as system-palette indices
    pub fn frame(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.frame_buffer
    }

    /// Object attribute memory view
    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    /// Vblank onset (line 0): raise the status flag and reset the OAM
    /// cursor. The caller raises the CPU NMI when `nmi_enabled()`.
    pub fn begin_vblank(&mut self) {
        self.in_vblank = true;
        self.status |= status::VBLANK;
        self.oam_addr = 0;
        self.frame_count += 1;
        log::trace!(target: "famicore::ppu", "vblank onset, frame {}", self.frame_count);
    }

    /// Vertical reset (line 20): clear the vblank/sprite flags and reload
    /// the vertical scroll from T. The caller clears any scheduled
    /// sprite-0 trigger.
    pub fn vertical_reset(&mut self) {
        self.in_vblank = false;
        self.status &= !(status::VBLANK | status::SPRITE0_HIT | status::SPRITE_OVERFLOW);
        self.sprite0_found = false;
        if self.rendering_enabled() {
            self.v = self.t;
        }
    }

    /// Make the sprite-0 hit visible in $2002; the endpoint of the cycle
    /// trigger scheduled at collision time
    pub fn set_sprite0_hit(&mut self) {
        self.status |= status::SPRITE0_HIT;
    }

    /// Write a byte into OAM via the DMA port
    #[inline]
    pub(crate) fn oam_dma_write(&mut self, index: u8, value: u8) {
        self.oam[self.oam_addr.wrapping_add(index) as usize] = value;
    }

    // ========================================
    // Save state
    // ========================================

    pub fn write_state(&self, out: &mut Vec<u8>) {
        out.put_u8(self.ctrl1);
        out.put_u8(self.ctrl2);
        out.put_u8(self.status);
        out.put_u8(self.oam_addr);
        out.put_u16(self.v);
        out.put_u16(self.t);
        out.put_u8(self.fine_x);
        out.put_u8(self.bg_pattern_table);
        out.put_u8(self.active_bg_pattern);
        out.put_bool(self.write_latch);
        out.put_u8(self.read_buffer);
        out.put_bytes(&self.nametables);
        out.put_bytes(&self.palette_ram);
        out.put_bytes(&self.oam);
        out.put_u16(self.scanline);
        out.put_u64(self.frame_count);
        out.put_bool(self.in_vblank);
        out.put_bool(self.sprite0_found);
    }

    pub fn read_state(&mut self, r: &mut StateReader) {
        self.ctrl1 = r.take_u8();
        self.ctrl2 = r.take_u8();
        self.status = r.take_u8();
        self.oam_addr = r.take_u8();
        self.v = r.take_u16();
        self.t = r.take_u16();
        self.fine_x = r.take_u8();
        self.bg_pattern_table = r.take_u8();
        self.active_bg_pattern = r.take_u8();
        self.write_latch = r.take_bool();
        self.read_buffer = r.take_u8();
        r.take_bytes(&mut self.nametables);
        r.take_bytes(&mut self.palette_ram);
        r.take_bytes(&mut self.oam);
        self.scanline = r.take_u16();
        self.frame_count = r.take_u64();
        self.in_vblank = r.take_bool();
        self.sprite0_found = r.take_bool();
        // Mirroring is derived state; the mapper was restored first
        self.sync_mirroring();
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vblank_lifecycle() {
        let mut ppu = Ppu::new();

        ppu.begin_vblank();
        assert!(ppu.in_vblank());
        assert_ne!(ppu.status & status::VBLANK, 0);
        assert_eq!(ppu.oam_addr, 0);
        assert_eq!(ppu.frame_count, 1);

        ppu.status |= status::SPRITE0_HIT | status::SPRITE_OVERFLOW;
        ppu.vertical_reset();
        assert!(!ppu.in_vblank());
        assert_eq!(ppu.status & status::VBLANK, 0);
        assert_eq!(ppu.status & status::SPRITE0_HIT, 0);
        assert_eq!(ppu.status & status::SPRITE_OVERFLOW, 0);
    }

    #[test]
    fn test_vertical_reset_reloads_v_only_while_rendering() {
        let mut ppu = Ppu::new();
        ppu.t = 0x1234;
        ppu.v = 0;

        ppu.vertical_reset();
        assert_eq!(ppu.v, 0, "no reload while rendering is off");

        ppu.ctrl2 = ctrl2::SHOW_BG;
        ppu.vertical_reset();
        assert_eq!(ppu.v, 0x1234);
    }

    #[test]
    fn test_nmi_enable_bit() {
        let mut ppu = Ppu::new();
        assert!(!ppu.nmi_enabled());
        ppu.ctrl1 = ctrl1::NMI_ON_VBLANK;
        assert!(ppu.nmi_enabled());
    }

    #[test]
    fn test_state_roundtrip() {
        let mut ppu = Ppu::new();
        ppu.ctrl1 = 0x90;
        ppu.v = 0x2345;
        ppu.nametables[100] = 0xAB;
        ppu.palette_ram[5] = 0x17;
        ppu.oam[32] = 0x42;

        let mut state = Vec::new();
        ppu.write_state(&mut state);

        let mut restored = Ppu::new();
        restored.read_state(&mut StateReader::new(&state));
        assert_eq!(restored.ctrl1, 0x90);
        assert_eq!(restored.v, 0x2345);
        assert_eq!(restored.nametables[100], 0xAB);
        assert_eq!(restored.palette_ram[5], 0x17);
        assert_eq!(restored.oam[32], 0x42);

        let mut state2 = Vec::new();
        restored.write_state(&mut state2);
        assert_eq!(state, state2);
    }
}

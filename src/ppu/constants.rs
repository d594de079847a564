// PPU constants

/// Screen dimensions in pixels
pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

/// Scanlines per NTSC frame
pub const SCANLINES_PER_FRAME: u16 = 262;

/// PPU cycles (dots) per scanline
pub const PPU_CYCLES_PER_SCANLINE: i64 = 341;

/// Scanline indexing, source convention: the frame starts at vblank onset
pub const VBLANK_SCANLINE: u16 = 0;

/// First post-vblank line; flags clear and the vertical scroll reloads here
pub const VERTICAL_RESET_SCANLINE: u16 = 20;

/// First visible line; rows 0..239 render on lines 21..260
pub const FIRST_VISIBLE_SCANLINE: u16 = 21;

/// Last visible line
pub const LAST_VISIBLE_SCANLINE: u16 = 260;

/// Size of one physical name table
pub const NAMETABLE_SIZE: usize = 0x400;

/// Palette RAM size
pub const PALETTE_SIZE: usize = 32;

/// Object attribute memory size (64 sprites x 4 bytes)
pub const OAM_SIZE: usize = 256;

/// Sprite OAM Y values are stored minus one
pub const SPRITE_Y_OFFSET: u16 = 1;

/// Control register 1 ($2000) bits
pub mod ctrl1 {
    /// Base name table selector (bits 0-1, latched into T bits 10-11)
    pub const NAMETABLE: u8 = 0b0000_0011;
    /// VRAM address increment: 0 = +1, 1 = +32
    pub const INCREMENT_32: u8 = 0b0000_0100;
    /// Sprite pattern table for 8x8 sprites
    pub const SPRITE_PATTERN: u8 = 0b0000_1000;
    /// Background pattern table (the S field)
    pub const BG_PATTERN: u8 = 0b0001_0000;
    /// Sprite size: 0 = 8x8, 1 = 8x16
    pub const SPRITE_SIZE_16: u8 = 0b0010_0000;
    /// Raise NMI at vblank onset
    pub const NMI_ON_VBLANK: u8 = 0b1000_0000;
}

/// Control register 2 ($2001) bits
pub mod ctrl2 {
    /// Monochrome display
    pub const MONOCHROME: u8 = 0b0000_0001;
    /// Show background in the leftmost 8 pixels (0 = clip)
    pub const SHOW_BG_LEFT: u8 = 0b0000_0010;
    /// Show sprites in the leftmost 8 pixels (0 = clip)
    pub const SHOW_SPRITES_LEFT: u8 = 0b0000_0100;
    /// Background visible
    pub const SHOW_BG: u8 = 0b0000_1000;
    /// Sprites visible
    pub const SHOW_SPRITES: u8 = 0b0001_0000;
    /// Colour emphasis bits (stored, tinting not applied)
    pub const EMPHASIS: u8 = 0b1110_0000;
}

/// Status register ($2002) bits
pub mod status {
    /// Sprite overflow (more than 8 sprites on a line)
    pub const SPRITE_OVERFLOW: u8 = 0b0010_0000;
    /// Sprite 0 hit
    pub const SPRITE0_HIT: u8 = 0b0100_0000;
    /// In vertical blank
    pub const VBLANK: u8 = 0b1000_0000;
}

/// Sprite attribute byte bits
pub mod sprite_attr {
    /// Sprite palette (bits 0-1)
    pub const PALETTE: u8 = 0b0000_0011;
    /// Priority: 1 = behind background
    pub const BEHIND_BG: u8 = 0b0010_0000;
    /// Horizontal flip
    pub const FLIP_H: u8 = 0b0100_0000;
    /// Vertical flip
    pub const FLIP_V: u8 = 0b1000_0000;
}

// Background and sprite rendering
//
// One visible row is rendered at a time, after the CPU has run that line's
// budget. The background walks the loopy address horizontally from a local
// copy of V (the horizontal bits were reloaded from T at line start), and V
// itself takes the vertical increment at end of line. Sprites draw
// back-to-front so lower OAM indices win ties, and sprite-0 collision is
// evaluated against the background row before clipping is applied to it.

use super::constants::*;
use super::{Ppu, Sprite0};

impl Ppu {
    /// Render the current scanline into the frame buffer and report any
    /// sprite-0 collision. Only valid for visible lines (21-260).
    pub fn render_scanline(&mut self) -> Sprite0 {
        debug_assert!(
            (FIRST_VISIBLE_SCANLINE..=LAST_VISIBLE_SCANLINE).contains(&self.scanline),
            "render_scanline on non-visible line {}",
            self.scanline
        );
        let row = (self.scanline - FIRST_VISIBLE_SCANLINE) as usize;

        // Start-of-line latches: the $2000 pattern selector becomes active
        // and the horizontal loopy bits reload from T
        self.active_bg_pattern = self.bg_pattern_table;
        if self.rendering_enabled() {
            self.v = (self.v & !0x041F) | (self.t & 0x041F);
        }

        // Background palette-RAM offsets for this row; 0 = transparent
        let mut bg_row = [0u8; SCREEN_WIDTH];
        if self.ctrl2 & ctrl2::SHOW_BG != 0 {
            self.render_background_row(&mut bg_row);
        }

        // Sprite-0 collision is tested against the unclipped composite,
        // minus the left column when either clip is active
        let sprite0 = self.sprite0_collision(row, &bg_row);

        if self.ctrl2 & ctrl2::SHOW_BG_LEFT == 0 {
            bg_row[..8].fill(0);
        }

        let mut spr_row = [0u8; SCREEN_WIDTH];
        let mut spr_front = [false; SCREEN_WIDTH];
        if self.ctrl2 & ctrl2::SHOW_SPRITES != 0 {
            self.render_sprite_row(row, &mut spr_row, &mut spr_front);
        }

        // Compose into system-palette indices
        let backdrop = self.palette_ram[0] & 0x3F;
        let base = row * SCREEN_WIDTH;
        for x in 0..SCREEN_WIDTH {
            let bg = bg_row[x];
            let spr = spr_row[x];
            let index = if spr != 0 && (spr_front[x] || bg == 0) {
                self.palette_ram[spr as usize]
            } else if bg != 0 {
                self.palette_ram[bg as usize]
            } else {
                backdrop
            };
            self.frame_buffer[base + x] = index & 0x3F;
        }

        // The vertical loopy increment closes the line
        if self.rendering_enabled() {
            self.increment_y();
        }

        sprite0
    }

    /// Walk 33 tiles across the name table and emit 256 pixels offset by
    /// fine X. Pixels are palette-RAM offsets ($01-$0F), 0 for transparent.
    fn render_background_row(&mut self, bg_row: &mut [u8; SCREEN_WIDTH]) {
        let fine_y = (self.v >> 12) & 0x07;
        let pattern_base = self.active_bg_pattern as u16 * 0x1000;
        let fine_x = self.fine_x as usize;

        let mut pixels = [0u8; 33 * 8];
        let mut v = self.v;

        for tile in 0..33 {
            let tile_index = self.read_ppu_memory(0x2000 | (v & 0x0FFF)) as u16;

            // One attribute byte per 32x32 block, two bits per 16x16 quadrant
            let attr_addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
            let attr = self.read_ppu_memory(attr_addr);
            let quadrant = ((v >> 4) & 0x04) | (v & 0x02);
            let palette = (attr >> quadrant) & 0x03;

            let pattern_addr = pattern_base + tile_index * 16 + fine_y;
            let low = self.read_ppu_memory(pattern_addr);
            let high = self.read_ppu_memory(pattern_addr + 8);

            for bit in 0..8 {
                let pixel = (((high >> (7 - bit)) & 1) << 1) | ((low >> (7 - bit)) & 1);
                pixels[tile * 8 + bit] = if pixel == 0 {
                    0
                } else {
                    (palette << 2) | pixel
                };
            }

            // Coarse X increment, toggling the horizontal name table at 31
            if v & 0x001F == 31 {
                v = (v & !0x001F) ^ 0x0400;
            } else {
                v += 1;
            }
        }

        bg_row.copy_from_slice(&pixels[fine_x..fine_x + SCREEN_WIDTH]);
    }

    /// The loopy vertical increment: fine Y, then coarse Y with the row-29
    /// wrap toggling the vertical name table
    fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
        } else {
            self.v &= !0x7000;
            let mut coarse_y = (self.v >> 5) & 0x1F;
            if coarse_y == 29 {
                coarse_y = 0;
                self.v ^= 0x0800;
            } else if coarse_y == 31 {
                coarse_y = 0;
            } else {
                coarse_y += 1;
            }
            self.v = (self.v & !0x03E0) | (coarse_y << 5);
        }
    }

    /// Sprite height from the $2000 size bit
    #[inline]
    fn sprite_height(&self) -> u16 {
        if self.ctrl1 & ctrl1::SPRITE_SIZE_16 != 0 {
            16
        } else {
            8
        }
    }

    /// Fetch the two pattern bytes for one line of a sprite, honouring
    /// vertical flip and the 8x16 tile-pair layout
    fn sprite_pattern_line(&self, tile: u8, line: u16, flip_v: bool) -> (u8, u8) {
        let height = self.sprite_height();
        let line = if flip_v { height - 1 - line } else { line };

        let addr = if height == 16 {
            // Bit 0 of the tile index selects the pattern table; the pair
            // of tiles stacks vertically
            let table = (tile & 1) as u16 * 0x1000;
            let tile = (tile & !1) as u16;
            let tile = tile + (line >= 8) as u16;
            table + tile * 16 + (line & 7)
        } else {
            let table = (self.ctrl1 & ctrl1::SPRITE_PATTERN != 0) as u16 * 0x1000;
            table + tile as u16 * 16 + line
        };

        (self.read_ppu_memory(addr), self.read_ppu_memory(addr + 8))
    }

    /// Draw all sprites overlapping this row, back to front
    fn render_sprite_row(
        &mut self,
        row: usize,
        spr_row: &mut [u8; SCREEN_WIDTH],
        spr_front: &mut [bool; SCREEN_WIDTH],
    ) {
        let height = self.sprite_height();
        let row = row as u16;
        let clip_left = self.ctrl2 & ctrl2::SHOW_SPRITES_LEFT == 0;

        let mut on_line = 0u32;
        for sprite in (0..64).rev() {
            let entry = &self.oam[sprite * 4..sprite * 4 + 4];
            let y = entry[0] as u16 + SPRITE_Y_OFFSET;
            if row < y || row >= y + height {
                continue;
            }
            on_line += 1;

            let tile = entry[1];
            let attr = entry[2];
            let x = entry[3] as usize;
            let palette = attr & sprite_attr::PALETTE;
            let behind = attr & sprite_attr::BEHIND_BG != 0;
            let flip_h = attr & sprite_attr::FLIP_H != 0;

            let (low, high) =
                self.sprite_pattern_line(tile, row - y, attr & sprite_attr::FLIP_V != 0);

            for px in 0..8 {
                let x_c = x + px;
                if x_c >= SCREEN_WIDTH {
                    break;
                }
                if clip_left && x_c < 8 {
                    continue;
                }
                let bit = if flip_h { px } else { 7 - px };
                let pixel = (((high >> bit) & 1) << 1) | ((low >> bit) & 1);
                if pixel != 0 {
                    spr_row[x_c] = 0x10 | (palette << 2) | pixel;
                    spr_front[x_c] = !behind;
                }
            }
        }

        if on_line > 8 {
            self.status |= status::SPRITE_OVERFLOW;
        }
    }

    /// Sprite-0 collision test against the background row
    ///
    /// The hit requires both layers visible, a non-transparent background
    /// pixel under a non-transparent sprite-0 pixel, outside the clipped
    /// left column, and never at x = 255. Only the first hit per frame
    /// counts.
    fn sprite0_collision(&mut self, row: usize, bg_row: &[u8; SCREEN_WIDTH]) -> Sprite0 {
        if self.sprite0_found
            || self.ctrl2 & ctrl2::SHOW_BG == 0
            || self.ctrl2 & ctrl2::SHOW_SPRITES == 0
        {
            return Sprite0::Miss;
        }

        let height = self.sprite_height();
        let row = row as u16;
        let y = self.oam[0] as u16 + SPRITE_Y_OFFSET;
        if row < y || row >= y + height {
            return Sprite0::Miss;
        }

        let tile = self.oam[1];
        let attr = self.oam[2];
        let x = self.oam[3] as usize;
        let flip_h = attr & sprite_attr::FLIP_H != 0;
        let (low, high) = self.sprite_pattern_line(tile, row - y, attr & sprite_attr::FLIP_V != 0);

        if low | high == 0 {
            return Sprite0::Miss;
        }

        if self.force_sprite0 {
            self.sprite0_found = true;
            return Sprite0::Hit { x: 0 };
        }

        let clip_left = self.ctrl2 & (ctrl2::SHOW_BG_LEFT | ctrl2::SHOW_SPRITES_LEFT)
            != (ctrl2::SHOW_BG_LEFT | ctrl2::SHOW_SPRITES_LEFT);

        for px in 0..8 {
            let x_c = x + px;
            if x_c >= SCREEN_WIDTH - 1 {
                break; // x = 255 never reports a hit
            }
            if clip_left && x_c < 8 {
                continue;
            }
            let bit = if flip_h { px } else { 7 - px };
            let pixel = (((high >> bit) & 1) << 1) | ((low >> bit) & 1);
            if pixel != 0 && bg_row[x_c] != 0 {
                self.sprite0_found = true;
                log::trace!(
                    target: "famicore::ppu",
                    "sprite 0 hit at ({}, {})",
                    x_c,
                    row
                );
                return Sprite0::Hit { x: x_c as u16 };
            }
        }

        Sprite0::Miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mappers::create_mapper;
    use crate::cartridge::{Cartridge, Mirroring};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// PPU with CHR-RAM so tests can compose pattern data
    fn ppu_with_chr_ram() -> Ppu {
        let cartridge = Cartridge {
            prg_rom: vec![0; 16 * 1024],
            chr_rom: vec![0; 8 * 1024],
            chr_is_ram: true,
            mapper: 0,
            mirroring: Mirroring::Horizontal,
            has_battery: false,
        };
        let mapper = Rc::new(RefCell::new(create_mapper(cartridge).unwrap()));
        let mut ppu = Ppu::new();
        ppu.attach_mapper(mapper);
        ppu
    }

    /// Fill one 8x8 tile with a solid colour-1 pattern
    fn solid_tile(ppu: &mut Ppu, table: u16, tile: u16) {
        for line in 0..8 {
            ppu.write_ppu_memory(table * 0x1000 + tile * 16 + line, 0xFF);
        }
    }

    fn render_row(ppu: &mut Ppu, row: u16) -> Sprite0 {
        ppu.scanline = FIRST_VISIBLE_SCANLINE + row;
        ppu.render_scanline()
    }

    #[test]
    fn test_background_row_renders_palette_colours() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_BG | ctrl2::SHOW_BG_LEFT;

        solid_tile(&mut ppu, 0, 1);
        // Tile 1 everywhere on the first name-table row
        for col in 0..32 {
            ppu.write_ppu_memory(0x2000 + col, 0x01);
        }
        // Palette: universal = $0F, colour 1 of palette 0 = $21
        ppu.write_ppu_memory(0x3F00, 0x0F);
        ppu.write_ppu_memory(0x3F01, 0x21);

        render_row(&mut ppu, 0);
        assert_eq!(ppu.frame()[0], 0x21);
        assert_eq!(ppu.frame()[255], 0x21);
    }

    #[test]
    fn test_blank_background_uses_backdrop() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_BG | ctrl2::SHOW_BG_LEFT;
        ppu.write_ppu_memory(0x3F00, 0x0F);

        render_row(&mut ppu, 0);
        assert!(ppu.frame()[..SCREEN_WIDTH].iter().all(|&p| p == 0x0F));
    }

    #[test]
    fn test_left_clip_forces_backdrop() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_BG; // left clip active
        solid_tile(&mut ppu, 0, 1);
        for col in 0..32 {
            ppu.write_ppu_memory(0x2000 + col, 0x01);
        }
        ppu.write_ppu_memory(0x3F00, 0x0F);
        ppu.write_ppu_memory(0x3F01, 0x21);

        render_row(&mut ppu, 0);
        assert!(ppu.frame()[..8].iter().all(|&p| p == 0x0F), "left 8 clipped");
        assert_eq!(ppu.frame()[8], 0x21);
    }

    #[test]
    fn test_sprite_draws_over_backdrop() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_SPRITES | ctrl2::SHOW_SPRITES_LEFT;
        solid_tile(&mut ppu, 0, 2);
        ppu.write_ppu_memory(0x3F00, 0x0F);
        ppu.write_ppu_memory(0x3F11, 0x16); // sprite palette 0, colour 1

        // Sprite 5 at (40, 10): OAM y is stored minus one
        ppu.oam[20] = 9;
        ppu.oam[21] = 2;
        ppu.oam[22] = 0;
        ppu.oam[23] = 40;

        render_row(&mut ppu, 10);
        let base = 10 * SCREEN_WIDTH;
        assert_eq!(ppu.frame()[base + 40], 0x16);
        assert_eq!(ppu.frame()[base + 47], 0x16);
        assert_eq!(ppu.frame()[base + 48], 0x0F);
    }

    #[test]
    fn test_sprite_behind_background() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_BG | ctrl2::SHOW_SPRITES | ctrl2::SHOW_BG_LEFT
            | ctrl2::SHOW_SPRITES_LEFT;
        solid_tile(&mut ppu, 0, 1);
        for col in 0..32 {
            ppu.write_ppu_memory(0x2000 + col, 0x01);
        }
        ppu.write_ppu_memory(0x3F01, 0x21);
        ppu.write_ppu_memory(0x3F11, 0x16);

        // Behind-background sprite 1 (not sprite 0, which would hit)
        ppu.oam[4] = 0;
        ppu.oam[5] = 1;
        ppu.oam[6] = sprite_attr::BEHIND_BG;
        ppu.oam[7] = 100;

        render_row(&mut ppu, 1);
        let base = SCREEN_WIDTH;
        assert_eq!(
            ppu.frame()[base + 100],
            0x21,
            "opaque background wins over a behind-priority sprite"
        );
    }

    #[test]
    fn test_sprite0_never_fires_on_blank_background() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_BG | ctrl2::SHOW_SPRITES | ctrl2::SHOW_BG_LEFT
            | ctrl2::SHOW_SPRITES_LEFT;
        solid_tile(&mut ppu, 0, 1);

        // Sprite 0 at (10, 10) with a solid tile, background all transparent
        ppu.oam[0] = 9;
        ppu.oam[1] = 1;
        ppu.oam[2] = 0;
        ppu.oam[3] = 10;

        for row in 0..240 {
            assert_eq!(render_row(&mut ppu, row), Sprite0::Miss);
        }
        assert_eq!(ppu.status & status::SPRITE0_HIT, 0);
    }

    #[test]
    fn test_sprite0_hit_over_opaque_background() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_BG | ctrl2::SHOW_SPRITES | ctrl2::SHOW_BG_LEFT
            | ctrl2::SHOW_SPRITES_LEFT;
        solid_tile(&mut ppu, 0, 1);
        for addr in 0x2000..0x23C0 {
            ppu.write_ppu_memory(addr, 0x01);
        }

        ppu.oam[0] = 9;
        ppu.oam[1] = 1;
        ppu.oam[2] = 0;
        ppu.oam[3] = 10;

        assert_eq!(render_row(&mut ppu, 9), Sprite0::Miss, "line above the sprite");
        assert_eq!(render_row(&mut ppu, 10), Sprite0::Hit { x: 10 });
        assert_eq!(
            render_row(&mut ppu, 11),
            Sprite0::Miss,
            "only the first hit of the frame reports"
        );
    }

    #[test]
    fn test_sprite0_respects_left_clip() {
        let mut ppu = ppu_with_chr_ram();
        // Clips active: sprite 0 sits entirely in the left column
        ppu.ctrl2 = ctrl2::SHOW_BG | ctrl2::SHOW_SPRITES;
        solid_tile(&mut ppu, 0, 1);
        for addr in 0x2000..0x23C0 {
            ppu.write_ppu_memory(addr, 0x01);
        }
        ppu.oam[0] = 9;
        ppu.oam[1] = 1;
        ppu.oam[2] = 0;
        ppu.oam[3] = 4; // spans x 4-11; 4-7 fall inside the clipped column

        assert_eq!(render_row(&mut ppu, 10), Sprite0::Hit { x: 8 }, "first unclipped column");
    }

    #[test]
    fn test_scroll_writes_take_effect_next_line() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_BG | ctrl2::SHOW_BG_LEFT;
        solid_tile(&mut ppu, 0, 1);
        // Columns 0-15 tile 1, columns 16-31 transparent tile 0
        for col in 0..16 {
            ppu.write_ppu_memory(0x2000 + col, 0x01);
        }
        ppu.write_ppu_memory(0x3F00, 0x0F);
        ppu.write_ppu_memory(0x3F01, 0x21);

        render_row(&mut ppu, 0);
        assert_eq!(ppu.frame()[0], 0x21, "unscrolled row starts at column 0");

        // Mid-frame scroll to coarse X = 16: applies from the next line on
        ppu.write_register(5, 16 * 8);
        ppu.write_register(5, 0);
        render_row(&mut ppu, 1);
        assert_eq!(
            ppu.frame()[SCREEN_WIDTH],
            0x0F,
            "next line starts at the scrolled column"
        );
    }

    #[test]
    fn test_bg_pattern_selector_latched_at_line_start() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_BG | ctrl2::SHOW_BG_LEFT;
        // Tile 1 is solid in table 1, empty in table 0
        solid_tile(&mut ppu, 1, 1);
        for col in 0..32 {
            ppu.write_ppu_memory(0x2000 + col, 0x01);
        }
        ppu.write_ppu_memory(0x3F00, 0x0F);
        ppu.write_ppu_memory(0x3F01, 0x21);

        render_row(&mut ppu, 0);
        assert_eq!(ppu.frame()[0], 0x0F, "table 0 is empty");

        ppu.write_register(0, ctrl1::BG_PATTERN);
        render_row(&mut ppu, 1);
        assert_eq!(ppu.frame()[SCREEN_WIDTH], 0x21, "table 1 active from next line");
    }

    #[test]
    fn test_sprite_overflow_flag() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl2 = ctrl2::SHOW_SPRITES | ctrl2::SHOW_SPRITES_LEFT;
        solid_tile(&mut ppu, 0, 1);
        // Nine sprites on row 10
        for sprite in 0..9 {
            ppu.oam[sprite * 4] = 9;
            ppu.oam[sprite * 4 + 1] = 1;
            ppu.oam[sprite * 4 + 2] = 0;
            ppu.oam[sprite * 4 + 3] = (sprite * 16) as u8;
        }

        render_row(&mut ppu, 10);
        assert_ne!(ppu.status & status::SPRITE_OVERFLOW, 0);
    }

    #[test]
    fn test_8x16_sprite_uses_tile_pair() {
        let mut ppu = ppu_with_chr_ram();
        ppu.ctrl1 = ctrl1::SPRITE_SIZE_16;
        ppu.ctrl2 = ctrl2::SHOW_SPRITES | ctrl2::SHOW_SPRITES_LEFT;
        ppu.write_ppu_memory(0x3F00, 0x0F);
        ppu.write_ppu_memory(0x3F11, 0x16);

        // Tile pair 4/5 in table 0: only the bottom half is solid
        solid_tile(&mut ppu, 0, 5);
        ppu.oam[0] = 49;
        ppu.oam[1] = 4; // even tile, LSB 0 selects table 0
        ppu.oam[2] = 0;
        ppu.oam[3] = 60;

        render_row(&mut ppu, 52);
        assert_eq!(
            ppu.frame()[52 * SCREEN_WIDTH + 60],
            0x0F,
            "top half from empty tile 4"
        );

        render_row(&mut ppu, 60);
        assert_eq!(
            ppu.frame()[60 * SCREEN_WIDTH + 60],
            0x16,
            "bottom half from solid tile 5"
        );
    }
}

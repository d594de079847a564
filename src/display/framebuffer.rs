// Framebuffer conversion
//
// The PPU produces 256x240 system-palette indices; the presenter converts
// them to RGBA, optionally cropping the outermost 8 pixels on every side
// (the NTSC overscan region most televisions never showed).

use super::palette::{palette_to_rgb, rgb_to_rgba};
use crate::ppu::constants::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Pixels cropped from each edge unless `--nocrop` is given
pub const CROP_MARGIN: usize = 8;

/// A frame of palette indices plus its presentation settings
pub struct FrameBuffer {
    indices: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// Emit the full 256x240 frame instead of the cropped view
    pub nocrop: bool,
}

impl FrameBuffer {
    pub fn new(nocrop: bool) -> Self {
        FrameBuffer {
            indices: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            nocrop,
        }
    }

    /// Output width in pixels
    pub fn width(&self) -> usize {
        if self.nocrop {
            SCREEN_WIDTH
        } else {
            SCREEN_WIDTH - 2 * CROP_MARGIN
        }
    }

    /// Output height in pixels
    pub fn height(&self) -> usize {
        if self.nocrop {
            SCREEN_HEIGHT
        } else {
            SCREEN_HEIGHT - 2 * CROP_MARGIN
        }
    }

    /// Copy a rendered PPU frame in
    pub fn update(&mut self, frame: &[u8; SCREEN_WIDTH * SCREEN_HEIGHT]) {
        self.indices.copy_from_slice(frame);
    }

    /// Convert to RGBA into `dest`, which must hold width*height*4 bytes
    pub fn to_rgba(&self, dest: &mut [u8]) {
        let margin = if self.nocrop { 0 } else { CROP_MARGIN };
        let width = self.width();

        for (row, dest_row) in dest.chunks_exact_mut(width * 4).enumerate() {
            let src_row = (row + margin) * SCREEN_WIDTH + margin;
            for (x, pixel) in dest_row.chunks_exact_mut(4).enumerate() {
                let rgba = rgb_to_rgba(palette_to_rgb(self.indices[src_row + x]));
                pixel.copy_from_slice(&rgba);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cropped_dimensions() {
        let cropped = FrameBuffer::new(false);
        assert_eq!(cropped.width(), 240);
        assert_eq!(cropped.height(), 224);

        let full = FrameBuffer::new(true);
        assert_eq!(full.width(), 256);
        assert_eq!(full.height(), 240);
    }

    #[test]
    fn test_crop_skips_borders() {
        let mut frame = [0u8; SCREEN_WIDTH * SCREEN_HEIGHT];
        frame[0] = 0x20; // top-left corner, inside the cropped margin
        frame[(CROP_MARGIN * SCREEN_WIDTH) + CROP_MARGIN] = 0x16; // first visible pixel

        let mut buffer = FrameBuffer::new(false);
        buffer.update(&frame);

        let mut rgba = vec![0u8; buffer.width() * buffer.height() * 4];
        buffer.to_rgba(&mut rgba);

        let expected = rgb_to_rgba(palette_to_rgb(0x16));
        assert_eq!(&rgba[0..4], &expected);
    }

    #[test]
    fn test_nocrop_keeps_borders() {
        let mut frame = [0u8; SCREEN_WIDTH * SCREEN_HEIGHT];
        frame[0] = 0x20;

        let mut buffer = FrameBuffer::new(true);
        buffer.update(&frame);

        let mut rgba = vec![0u8; buffer.width() * buffer.height() * 4];
        buffer.to_rgba(&mut rgba);
        assert_eq!(&rgba[0..4], &rgb_to_rgba(palette_to_rgb(0x20)));
    }
}

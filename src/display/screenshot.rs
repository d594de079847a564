// Screenshot capture: the current frame as a PNG next to the ROM

use super::framebuffer::FrameBuffer;
use crate::ppu::constants::{SCREEN_HEIGHT, SCREEN_WIDTH};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Save the frame as `<stem>-<timestamp>.png` in the ROM's directory (or
/// the working directory without a ROM). Returns the written path.
pub fn save_screenshot(
    frame: &[u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    nocrop: bool,
    rom_path: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut buffer = FrameBuffer::new(nocrop);
    buffer.update(frame);

    let mut rgba = vec![0u8; buffer.width() * buffer.height() * 4];
    buffer.to_rgba(&mut rgba);

    let stem = rom_path
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("famicore");
    let dir = rom_path
        .and_then(|p| p.parent())
        .unwrap_or_else(|| Path::new("."));
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("{}-{}.png", stem, timestamp));

    let file = File::create(&path)?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        buffer.width() as u32,
        buffer.height() as u32,
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.write_header()?.write_image_data(&rgba)?;

    log::info!(target: "famicore::display", "screenshot saved to {}", path.display());
    Ok(path)
}

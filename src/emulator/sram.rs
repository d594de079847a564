// SRAM persistence
//
// Battery-backed cartridges keep their 8KB of SRAM in `<rom-path>.sram`:
// the "SRAM" magic, a 32-bit little-endian size (always 8192), then the
// raw bytes.

use super::save_state::{SaveStateError, STATE_MAGIC};
use crate::bus::SRAM_SIZE;
use std::fs;
use std::path::{Path, PathBuf};

/// SRAM file path for a ROM: `<rom-path>.sram`
pub fn sram_path_for_rom(rom_path: &Path) -> PathBuf {
    let mut path = rom_path.as_os_str().to_os_string();
    path.push(".sram");
    PathBuf::from(path)
}

/// Write the SRAM image to disk
pub fn save_sram(path: &Path, sram: &[u8; SRAM_SIZE]) -> Result<(), SaveStateError> {
    let mut file = Vec::with_capacity(8 + SRAM_SIZE);
    file.extend_from_slice(&STATE_MAGIC);
    file.extend_from_slice(&(SRAM_SIZE as u32).to_le_bytes());
    file.extend_from_slice(sram);
    fs::write(path, file)?;
    log::info!(target: "famicore::nes", "Saved SRAM to {}", path.display());
    Ok(())
}

/// Read an SRAM image from disk
pub fn load_sram(path: &Path) -> Result<[u8; SRAM_SIZE], SaveStateError> {
    let file = fs::read(path)?;
    if file.len() < 8 || file[0..4] != STATE_MAGIC {
        return Err(SaveStateError::BadHeader);
    }
    let size = u32::from_le_bytes(file[4..8].try_into().unwrap()) as usize;
    if size != SRAM_SIZE || file.len() < 8 + SRAM_SIZE {
        return Err(SaveStateError::Truncated);
    }

    let mut sram = [0u8; SRAM_SIZE];
    sram.copy_from_slice(&file[8..8 + SRAM_SIZE]);
    log::info!(target: "famicore::nes", "Read SRAM from {}", path.display());
    Ok(sram)
}

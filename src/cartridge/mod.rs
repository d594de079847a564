// Cartridge module - iNES ROM loading and the mapper abstraction
//
// A cartridge is parsed from an iNES image into PRG-ROM, CHR memory and a
// mapper number, then handed to the mapper factory which owns the data from
// that point on. The 16-byte header layout:
//
// ```text
// 0-3   "NES\x1A"
// 4     number of 16KB PRG-ROM banks
// 5     number of 8KB CHR-ROM banks (0 = 8KB CHR-RAM)
// 6     bit 0: vertical mirroring, bit 1: battery SRAM,
//       bit 2: 512-byte trainer, bit 3: four-screen,
//       bits 4-7: mapper low nibble
// 7     bits 4-7: mapper high nibble (ignored for old dumps, see below)
// 8     number of 8KB PRG-RAM banks
// 9     bit 0: PAL cartridge
// ```

pub mod mappers;

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

pub use mappers::{create_mapper, Mapper, MapperError};

/// Size of one PRG-ROM bank in the iNES header (16KB)
pub const PRG_ROM_BANK_SIZE: usize = 16 * 1024;

/// Size of one CHR-ROM bank in the iNES header (8KB)
pub const CHR_ROM_BANK_SIZE: usize = 8 * 1024;

/// Name-table mirroring arrangement
///
/// Maps the four logical name tables at $2000/$2400/$2800/$2C00 onto the
/// two physical 1KB tables of internal VRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// All four tables map to physical table 0
    SingleScreenA,
    /// All four tables map to physical table 1
    SingleScreenB,
    /// (a, b, a, b) - used by horizontally scrolling games
    Vertical,
    /// (a, a, b, b) - used by vertically scrolling games
    Horizontal,
}

impl Mirroring {
    /// Physical table (0 or 1) for a logical table index (0-3)
    #[inline]
    pub fn physical_table(self, logical: usize) -> usize {
        match self {
            Mirroring::SingleScreenA => 0,
            Mirroring::SingleScreenB => 1,
            Mirroring::Vertical => logical & 1,
            Mirroring::Horizontal => (logical >> 1) & 1,
        }
    }
}

/// Errors raised while parsing an iNES image
///
/// These are cartridge-compatibility errors: they abort the load with a
/// diagnostic and are never recovered from.
#[derive(Debug)]
pub enum INesError {
    /// I/O error reading the file
    Io(io::Error),
    /// Magic bytes are not "NES\x1A"
    BadMagic,
    /// File is shorter than the header declares
    Truncated { expected: usize, found: usize },
    /// PAL cartridges are not supported
    PalRom,
    /// Four-screen VRAM is not supported
    FourScreen,
    /// 512-byte trainers are not supported
    Trainer,
}

impl fmt::Display for INesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            INesError::Io(e) => write!(f, "I/O error: {}", e),
            INesError::BadMagic => write!(f, "not an iNES file (bad magic)"),
            INesError::Truncated { expected, found } => {
                write!(
                    f,
                    "truncated ROM image: header declares {} bytes, found {}",
                    expected, found
                )
            }
            INesError::PalRom => write!(f, "PAL cartridges are not supported"),
            INesError::FourScreen => write!(f, "four-screen mirroring is not supported"),
            INesError::Trainer => write!(f, "trainer cartridges are not supported"),
        }
    }
}

impl std::error::Error for INesError {}

impl From<io::Error> for INesError {
    fn from(e: io::Error) -> Self {
        INesError::Io(e)
    }
}

/// Parsed iNES header
#[derive(Debug, Clone, Copy)]
pub struct INesHeader {
    /// Number of 16KB PRG-ROM banks
    pub prg_banks: u8,
    /// Number of 8KB CHR-ROM banks (0 means the cartridge carries CHR-RAM)
    pub chr_banks: u8,
    /// Mapper number
    pub mapper: u8,
    /// Mirroring from header bit 0 (mappers may override at runtime)
    pub mirroring: Mirroring,
    /// Battery-backed SRAM present
    pub has_battery: bool,
    /// 512-byte trainer present
    pub has_trainer: bool,
    /// Four-screen VRAM layout requested
    pub four_screen: bool,
    /// PAL cartridge
    pub pal: bool,
}

impl INesHeader {
    /// Parse the 16-byte iNES header
    pub fn parse(bytes: &[u8]) -> Result<Self, INesError> {
        if bytes.len() < 16 || &bytes[0..4] != b"NES\x1A" {
            return Err(INesError::BadMagic);
        }

        // Old dumps store junk in bytes 7-15; when bytes 12-15 are non-zero
        // the high mapper nibble is unreliable and is treated as zero.
        let high_nibble_valid = bytes[12..16].iter().all(|&b| b == 0);
        let mapper_low = bytes[6] >> 4;
        let mapper_high = if high_nibble_valid { bytes[7] & 0xF0 } else { 0 };

        Ok(INesHeader {
            prg_banks: bytes[4],
            chr_banks: bytes[5],
            mapper: mapper_high | mapper_low,
            mirroring: if bytes[6] & 0x01 != 0 {
                Mirroring::Vertical
            } else {
                Mirroring::Horizontal
            },
            has_battery: bytes[6] & 0x02 != 0,
            has_trainer: bytes[6] & 0x04 != 0,
            four_screen: bytes[6] & 0x08 != 0,
            pal: bytes[9] & 0x01 != 0,
        })
    }
}

/// A loaded cartridge: the iNES payload plus its parsed header fields
///
/// The PRG and CHR vectors are moved into the mapper at creation time; the
/// mapper owns them for the rest of the emulator's life and swaps 4KB PRG /
/// 1KB CHR bank offsets into them without copying.
pub struct Cartridge {
    /// PRG-ROM data (multiple of 16KB)
    pub prg_rom: Vec<u8>,
    /// CHR-ROM data, or zero-filled 8KB CHR-RAM when the header declares none
    pub chr_rom: Vec<u8>,
    /// True when chr_rom is writable CHR-RAM
    pub chr_is_ram: bool,
    /// Mapper number from the header
    pub mapper: u8,
    /// Header mirroring
    pub mirroring: Mirroring,
    /// Battery-backed SRAM present
    pub has_battery: bool,
}

impl Cartridge {
    /// Load a cartridge from an iNES file on disk
    pub fn from_ines_file<P: AsRef<Path>>(path: P) -> Result<Self, INesError> {
        let data = fs::read(path)?;
        Self::from_ines_bytes(&data)
    }

    /// Load a cartridge from an iNES image in memory
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, INesError> {
        let header = INesHeader::parse(data)?;

        if header.pal {
            return Err(INesError::PalRom);
        }
        if header.four_screen {
            return Err(INesError::FourScreen);
        }
        if header.has_trainer {
            return Err(INesError::Trainer);
        }

        let prg_size = header.prg_banks as usize * PRG_ROM_BANK_SIZE;
        let chr_size = header.chr_banks as usize * CHR_ROM_BANK_SIZE;
        let expected = 16 + prg_size + chr_size;
        if data.len() < expected {
            return Err(INesError::Truncated {
                expected,
                found: data.len(),
            });
        }

        let prg_rom = data[16..16 + prg_size].to_vec();
        let chr_is_ram = header.chr_banks == 0;
        let chr_rom = if chr_is_ram {
            vec![0; CHR_ROM_BANK_SIZE]
        } else {
            data[16 + prg_size..16 + prg_size + chr_size].to_vec()
        };

        log::info!(
            target: "famicore::nes",
            "Loaded cartridge: mapper {}, {}KB PRG, {}KB {}, {:?} mirroring{}",
            header.mapper,
            prg_rom.len() / 1024,
            chr_rom.len() / 1024,
            if chr_is_ram { "CHR-RAM" } else { "CHR-ROM" },
            header.mirroring,
            if header.has_battery { ", battery" } else { "" },
        );

        Ok(Cartridge {
            prg_rom,
            chr_rom,
            chr_is_ram,
            mapper: header.mapper,
            mirroring: header.mirroring,
            has_battery: header.has_battery,
        })
    }
}

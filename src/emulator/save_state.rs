// Save state functionality
//
// A save state is a binary snapshot: the magic header "SRAM", a 32-bit
// little-endian payload size, then the component states concatenated in a
// fixed order (CPU registers, bus RAM + SRAM + mapper state, PPU state,
// APU state). Derived data (mapper bank offsets, PPU mirroring) is rebuilt
// on restore rather than stored, so save -> restore -> save is
// byte-identical.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Magic bytes shared by save states and SRAM files
pub const STATE_MAGIC: [u8; 4] = *b"SRAM";

/// Errors that can occur during save state operations
#[derive(Debug)]
pub enum SaveStateError {
    /// I/O error
    Io(io::Error),
    /// Magic header mismatch
    BadHeader,
    /// Payload shorter than the declared size
    Truncated,
    /// The state was taken from a different mapper
    MapperMismatch { expected: u8, found: u8 },
}

impl fmt::Display for SaveStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStateError::Io(e) => write!(f, "I/O error: {}", e),
            SaveStateError::BadHeader => write!(f, "bad save state header"),
            SaveStateError::Truncated => write!(f, "truncated save state"),
            SaveStateError::MapperMismatch { expected, found } => {
                write!(
                    f,
                    "save state mapper mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveStateError {}

impl From<io::Error> for SaveStateError {
    fn from(e: io::Error) -> Self {
        SaveStateError::Io(e)
    }
}

/// Little-endian byte appenders for state payloads
///
/// Implemented on `Vec<u8>` so component `write_state` methods can push
/// fields directly without an intermediate writer object.
pub trait StatePut {
    fn put_u8(&mut self, value: u8);
    fn put_u16(&mut self, value: u16);
    fn put_u32(&mut self, value: u32);
    fn put_u64(&mut self, value: u64);
    fn put_bool(&mut self, value: bool);
    fn put_bytes(&mut self, bytes: &[u8]);
}

impl StatePut for Vec<u8> {
    fn put_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn put_u16(&mut self, value: u16) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn put_u64(&mut self, value: u64) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn put_bool(&mut self, value: bool) {
        self.push(value as u8);
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Cursor over a state payload
///
/// Underruns panic: a state that passed the header and size checks but runs
/// short mid-payload indicates an engine bug in the write/read pairing.
pub struct StateReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StateReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        StateReader { data, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        assert!(
            self.pos + n <= self.data.len(),
            "save state payload underrun at offset {}",
            self.pos
        );
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        slice
    }

    pub fn take_u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    pub fn take_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take(2).try_into().unwrap())
    }

    pub fn take_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take(4).try_into().unwrap())
    }

    pub fn take_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take(8).try_into().unwrap())
    }

    pub fn take_bool(&mut self) -> bool {
        self.take_u8() != 0
    }

    pub fn take_bytes(&mut self, dest: &mut [u8]) {
        let n = dest.len();
        dest.copy_from_slice(self.take(n));
    }
}

/// Wrap a state payload in the on-disk container format
pub fn wrap_payload(payload: &[u8]) -> Vec<u8> {
    let mut file = Vec::with_capacity(8 + payload.len());
    file.extend_from_slice(&STATE_MAGIC);
    file.put_u32(payload.len() as u32);
    file.extend_from_slice(payload);
    file
}

/// Validate the container format and return the payload slice
pub fn unwrap_payload(file: &[u8]) -> Result<&[u8], SaveStateError> {
    if file.len() < 8 || file[0..4] != STATE_MAGIC {
        return Err(SaveStateError::BadHeader);
    }
    let size = u32::from_le_bytes(file[4..8].try_into().unwrap()) as usize;
    if file.len() < 8 + size {
        return Err(SaveStateError::Truncated);
    }
    Ok(&file[8..8 + size])
}

/// Write a wrapped payload to disk
pub fn write_state_file(path: &Path, payload: &[u8]) -> Result<(), SaveStateError> {
    fs::write(path, wrap_payload(payload))?;
    log::info!(target: "famicore::nes", "Saved state to {}", path.display());
    Ok(())
}

/// Read and unwrap a state file from disk
pub fn read_state_file(path: &Path) -> Result<Vec<u8>, SaveStateError> {
    let file = fs::read(path)?;
    let payload = unwrap_payload(&file)?;
    log::info!(target: "famicore::nes", "Restored state from {}", path.display());
    Ok(payload.to_vec())
}

/// Default save-state path for a ROM: `<rom-path>.state`
pub fn state_path_for_rom(rom_path: &Path) -> PathBuf {
    let mut path = rom_path.as_os_str().to_os_string();
    path.push(".state");
    PathBuf::from(path)
}

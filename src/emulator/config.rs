// Configuration management
//
// `EmulatorConfig` is the per-session configuration assembled from the
// command line; `Preferences` are the persistent user settings stored as
// TOML next to the binary and merged in underneath.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persistent preferences file
const PREFERENCES_FILE: &str = "famicore.toml";

/// Per-session configuration, assembled by the CLI layer
#[derive(Debug, Clone)]
pub struct EmulatorConfig {
    /// Break into the stepper on each opcode
    pub step: bool,
    /// Write a disassembly trace while running
    pub dump: bool,
    /// Run the 6502 conformance harness instead of a NES ROM
    pub test_6502: bool,
    /// Override the module the conformance harness loads next
    pub test_module: Option<String>,
    /// Abort after this many instructions (0 = unlimited)
    pub max_instructions: u64,
    /// Print a heartbeat every N instructions (0 = off)
    pub heartbeat: u64,
    /// Stop after this many frames (0 = unlimited)
    pub max_frames: u64,
    /// Extra per-frame sleep in milliseconds
    pub extra_frame_delay_ms: u64,
    /// Force a display flush every Nth scanline (0 = frame granularity)
    pub sync_every_scanlines: u32,
    /// Run flat out instead of pacing to 60 Hz
    pub novsync: bool,
    /// Treat mouse X as a paddle
    pub paddle: bool,
    /// Force a sprite-0 hit every frame (debug aid)
    pub force_sprite0: bool,
    /// Keep the sprite-0 trigger 4 cycles early (timing workaround for
    /// titles that poll just ahead of the hit)
    pub trigger_hack: bool,
    /// Emit the uncropped 256x240 frame
    pub nocrop: bool,
    /// Blargg self-test mode (1 or 2)
    pub blargg: Option<u8>,
    /// Open the enlarged debug window
    pub debug_window: bool,
    /// Disable audio output
    pub no_audio: bool,
    /// Dump audio to nes.wav
    pub wav: bool,
    /// Force the post-reset program counter
    pub force_pc: Option<u16>,
    /// Start fullscreen
    pub fullscreen: bool,
    /// ROM path
    pub rom_path: Option<PathBuf>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            step: false,
            dump: false,
            test_6502: false,
            test_module: None,
            max_instructions: 0,
            heartbeat: 0,
            max_frames: 0,
            extra_frame_delay_ms: 0,
            sync_every_scanlines: 0,
            novsync: false,
            paddle: false,
            force_sprite0: false,
            trigger_hack: false,
            nocrop: false,
            blargg: None,
            debug_window: false,
            no_audio: false,
            wav: false,
            force_pc: None,
            fullscreen: false,
            rom_path: None,
        }
    }
}

/// Persistent user preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Window scale factor (1-4)
    pub scale: u32,
    /// Audio volume (0.0-1.0)
    pub volume: f32,
    /// Pace frames to 60 Hz
    pub vsync: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            scale: 2,
            volume: 1.0,
            vsync: true,
        }
    }
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file is absent
    /// or unparsable
    pub fn load_or_default() -> Self {
        match fs::read_to_string(PREFERENCES_FILE) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(preferences) => preferences,
                Err(e) => {
                    log::warn!(
                        target: "famicore::main",
                        "ignoring malformed {}: {}",
                        PREFERENCES_FILE,
                        e
                    );
                    Preferences::default()
                }
            },
            Err(_) => Preferences::default(),
        }
    }

    /// Persist the preferences
    pub fn save(&self) -> std::io::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(PREFERENCES_FILE, contents)
    }
}

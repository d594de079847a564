// famicore - a cycle-accurate NES emulator
//
// The core is the tightly-coupled engine: the 6502 interpreter, the
// scanline-accurate PPU, the APU with its frame sequencer, the per-frame
// co-scheduling that interleaves the three clocks at the NTSC 3:1 ratio,
// and the mapper abstraction. The surrounding layers (audio transport,
// display presenter, persistence) talk to the core only through the bus
// and emulator interfaces.

// Public modules
pub mod apu;
pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod display;
pub mod emulator;
pub mod input;
pub mod ppu;

// Re-export main types for convenience
pub use apu::Apu;
#[cfg(feature = "audio")]
pub use audio::AudioOutput;
pub use audio::{SampleRing, WavWriter};
pub use bus::Bus;
pub use cartridge::{Cartridge, INesError, INesHeader, Mapper, MapperError, Mirroring};
pub use cpu::Cpu;
pub use debug::{disassemble_instruction, trace_instruction};
pub use display::{FrameBuffer, WindowConfig};
pub use emulator::{BlarggStatus, Emulator, EmulatorConfig, Preferences, SaveStateError};
pub use input::{Controller, ControllerIO, Paddle};
pub use ppu::Ppu;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        let _cpu = Cpu::new();
        let _ppu = Ppu::new();
        let _apu = Apu::new();
        let _bus = Bus::new();
        let _controllers = ControllerIO::new();
        let _emulator = Emulator::new(EmulatorConfig::default());
    }
}

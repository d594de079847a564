// Emulator module - owning container and frame scheduler
//
// The emulator owns CPU, bus (which owns PPU, APU, joypads, SRAM) and the
// shared mapper handle; every cross-component operation goes through here,
// so no component holds a back-pointer to a peer.
//
// The frame scheduler interleaves the three clocks at the NTSC 3:1
// PPU-to-CPU ratio: for each of the 262 scanlines it runs the CPU up to the
// line's cycle budget, renders the line, clocks the APU frame sequencer on
// the 240 Hz boundaries, lets the mapper observe the line, and enqueues the
// line's audio samples. The CPU always finishes its current opcode; the
// overshoot is corrected through the next line's budget, and the residue at
// frame end (29781 cycles per frame) carries into the next frame as
// surplus.

pub mod config;
mod harness;
mod recent_roms;
pub mod save_state;
pub mod sram;

pub use config::{EmulatorConfig, Preferences};
pub use harness::run_conformance_test;
pub use recent_roms::RecentRomsList;
pub use save_state::SaveStateError;

use crate::apu::samples_for_scanline;
use crate::audio::SampleRing;
use crate::bus::Bus;
use crate::cartridge::{create_mapper, Cartridge, INesError, Mapper, MapperError};
use crate::cpu::Cpu;
use crate::ppu::constants::{
    FIRST_VISIBLE_SCANLINE, LAST_VISIBLE_SCANLINE, PPU_CYCLES_PER_SCANLINE, SCANLINES_PER_FRAME,
    VBLANK_SCANLINE, VERTICAL_RESET_SCANLINE,
};
use crate::ppu::Sprite0;
use save_state::{StateReader, SaveStateError as StateError};
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// CPU cycles per NTSC frame (262 * 341 / 3, rounded up)
pub const CPU_CYCLES_PER_FRAME: i64 = 29781;

/// Frames to wait before honouring a Blargg soft-reset request
const BLARGG_RESET_DELAY_FRAMES: u32 = 5;

/// Errors surfaced while loading a ROM
#[derive(Debug)]
pub enum LoadError {
    Ines(INesError),
    Mapper(MapperError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Ines(e) => write!(f, "{}", e),
            LoadError::Mapper(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {}

/// Outcome of the per-frame Blargg status poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlarggStatus {
    /// Test still running (or not in Blargg mode)
    Running,
    /// Self-test passed
    Passed,
    /// Self-test failed with this status code
    Failed(u8),
}

/// Main emulator structure
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    /// Shared with the bus and PPU; kept here for save-state dispatch
    mapper: Option<Rc<RefCell<Box<dyn Mapper>>>>,

    config: EmulatorConfig,
    rom_path: Option<PathBuf>,
    has_battery: bool,

    // Frame scheduler state
    frame_surplus_cpu_cycles: i64,
    frame_start_cpu_cycle: u64,
    frame_cpu_cycle: i64,

    /// Audio ring shared with the output thread; the scheduler pushes (and
    /// signals) once per scanline batch
    audio_sink: Option<Arc<SampleRing>>,
    /// This frame's samples, for WAV dumping and tests
    frame_samples: Vec<i16>,

    /// Pending Blargg-requested soft reset, in frames
    soft_reset_delay: u32,
    /// Last Blargg SRAM status byte reported, to avoid log spam
    last_blargg_status: u8,
}

impl Emulator {
    pub fn new(config: EmulatorConfig) -> Self {
        let mut emulator = Emulator {
            cpu: Cpu::new(),
            bus: Bus::new(),
            mapper: None,
            config,
            rom_path: None,
            has_battery: false,
            frame_surplus_cpu_cycles: 0,
            frame_start_cpu_cycle: 0,
            frame_cpu_cycle: 0,
            audio_sink: None,
            frame_samples: Vec::new(),
            soft_reset_delay: 0,
            last_blargg_status: 0x80,
        };
        emulator.bus.ppu_mut().force_sprite0 = emulator.config.force_sprite0;
        emulator
    }

    /// Load an iNES ROM from disk and reset into it
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path).map_err(LoadError::Ines)?;
        self.rom_path = Some(path.to_path_buf());
        self.load_cartridge(cartridge)?;

        // Battery-backed carts resume their SRAM contents
        if self.has_battery {
            let sram_path = sram::sram_path_for_rom(path);
            match sram::load_sram(&sram_path) {
                Ok(data) => self.bus.sram_mut().copy_from_slice(&data),
                Err(e) => {
                    log::info!(
                        target: "famicore::nes",
                        "no SRAM restored from {}: {}",
                        sram_path.display(),
                        e
                    );
                }
            }
        }

        let mut recent = RecentRomsList::load_or_default();
        recent.add(path);
        if let Err(e) = recent.save() {
            log::warn!(target: "famicore::main", "failed to update recent ROMs: {}", e);
        }

        Ok(())
    }

    /// Install a cartridge that is already in memory (tests, harnesses)
    pub fn load_cartridge(&mut self, cartridge: Cartridge) -> Result<(), LoadError> {
        self.has_battery = cartridge.has_battery;
        let mapper = Rc::new(RefCell::new(
            create_mapper(cartridge).map_err(LoadError::Mapper)?,
        ));
        self.bus.attach_mapper(Rc::clone(&mapper));
        self.mapper = Some(mapper);
        self.soft_reset();
        Ok(())
    }

    /// Soft reset: CPU and APU transient state clear and the reset vector
    /// is re-read; video memory survives
    pub fn soft_reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.bus.apu_mut().reset();
        self.frame_surplus_cpu_cycles = 0;
        self.frame_cpu_cycle = 0;
        self.last_blargg_status = 0x80;

        if let Some(pc) = self.config.force_pc {
            log::info!(target: "famicore::nes", "forcing post-reset PC to {:04X}", pc);
            self.cpu.pc = pc;
        }
    }

    /// Hard reset: soft reset plus reinitialised display state
    pub fn hard_reset(&mut self) {
        let force_sprite0 = self.bus.ppu().force_sprite0;
        *self.bus.ppu_mut() = crate::ppu::Ppu::new();
        self.bus.ppu_mut().force_sprite0 = force_sprite0;
        if let Some(ref mapper) = self.mapper {
            self.bus.ppu_mut().attach_mapper(Rc::clone(mapper));
        }
        self.soft_reset();
    }

    /// Run one full frame: 262 scanlines of co-scheduled CPU, PPU, APU and
    /// mapper work
    pub fn run_frame(&mut self) {
        let mut offset: i64 = 0;
        let mut scanline_start_ppu_cycle: i64 = 0;
        self.frame_samples.clear();

        // A surplus from the previous frame runs first; its overshoot
        // offsets this frame's scanline budgets
        if self.frame_surplus_cpu_cycles > 0 {
            let before = self.cpu.cycles;
            self.cpu
                .run(&mut self.bus, self.frame_surplus_cpu_cycles as u64, false);
            offset = (self.cpu.cycles - before) as i64 - self.frame_surplus_cpu_cycles;
            self.frame_surplus_cpu_cycles = 0;
        }

        self.frame_start_cpu_cycle = self.cpu.cycles - offset as u64;
        self.frame_cpu_cycle = offset;
        scanline_start_ppu_cycle -= offset * 3;

        log::trace!(
            target: "famicore::nes",
            "frame {} starting at cycle {}",
            self.bus.ppu().frame_count,
            self.frame_start_cpu_cycle
        );

        for scanline in 0..SCANLINES_PER_FRAME {
            self.bus.ppu_mut().scanline = scanline;
            let scanline_start_cpu_cycle = self.cpu.cycles;

            if scanline == VBLANK_SCANLINE {
                self.bus.ppu_mut().begin_vblank();
                if self.bus.ppu().nmi_enabled() {
                    self.cpu.nmi(&mut self.bus);
                }
            } else if scanline == VERTICAL_RESET_SCANLINE {
                self.bus.ppu_mut().vertical_reset();
                self.cpu.clear_trigger();
            }

            // Run the CPU up to this line's share of the frame
            let next_ppu_scanline_cycle = scanline_start_ppu_cycle + PPU_CYCLES_PER_SCANLINE;
            let max_scanline_cpu_cycles =
                (next_ppu_scanline_cycle - self.frame_cpu_cycle * 3 + 2) / 3;

            if max_scanline_cpu_cycles > 0 {
                let hard_limit =
                    max_scanline_cpu_cycles + self.frame_cpu_cycle >= CPU_CYCLES_PER_FRAME;
                self.cpu
                    .run(&mut self.bus, max_scanline_cpu_cycles as u64, hard_limit);
            }

            self.frame_cpu_cycle = (self.cpu.cycles - self.frame_start_cpu_cycle) as i64;

            if scanline >= VERTICAL_RESET_SCANLINE {
                if (FIRST_VISIBLE_SCANLINE..=LAST_VISIBLE_SCANLINE).contains(&scanline) {
                    if let Sprite0::Hit { x } = self.bus.ppu_mut().render_scanline() {
                        self.schedule_sprite0(scanline_start_cpu_cycle, x);
                    }
                }

                // Quarter frame at 60 Hz = 240 Hz sequencer clock
                if scanline % 60 == 0 && self.bus.apu_mut().clock_sequencer() {
                    self.cpu.irq(&mut self.bus);
                }

                if self.bus.mapper_scanline() {
                    self.cpu.irq(&mut self.bus);
                }
            }

            // Enqueue this line's slice of the 735 samples per frame; DMC
            // fetches steal CPU cycles. The ring is signalled per batch.
            let stolen = self.bus.fill_audio(samples_for_scanline(scanline));
            self.cpu.cycles += stolen;
            let samples = self.bus.apu_mut().take_samples();
            if let Some(ref sink) = self.audio_sink {
                sink.push(&samples);
            }
            self.frame_samples.extend_from_slice(&samples);

            scanline_start_ppu_cycle = next_ppu_scanline_cycle;
        }

        self.frame_surplus_cpu_cycles = (CPU_CYCLES_PER_FRAME - self.frame_cpu_cycle).max(0);

        if self.soft_reset_delay > 0 {
            self.soft_reset_delay -= 1;
            if self.soft_reset_delay == 0 {
                log::info!(target: "famicore::nes", "Blargg-requested soft reset");
                self.soft_reset();
            }
        }
    }

    /// Sprite-0 became visible at `x` on a line that started at the given
    /// CPU cycle: make it observable at approximately the right dot
    fn schedule_sprite0(&mut self, scanline_start_cpu_cycle: u64, x: u16) {
        if x == 0 {
            self.bus.cpu_trigger_fired();
            return;
        }
        let mut trigger_cycle = scanline_start_cpu_cycle + (x as u64) / 3;
        if self.config.trigger_hack {
            trigger_cycle = trigger_cycle.saturating_sub(4);
        }
        self.cpu.set_trigger(trigger_cycle);
    }

    /// Poll the Blargg self-test status bytes
    ///
    /// SRAM protocol: status at offset 0 (0x80 = running, 0x81 = reset
    /// request, 0x00 = pass, other = fail), message text at offset 4.
    /// Work-RAM protocol (modes 1/2): a status byte at $F8/$F0, 0x01 =
    /// pass.
    pub fn poll_blargg(&mut self) -> BlarggStatus {
        let Some(mode) = self.config.blargg else {
            return BlarggStatus::Running;
        };

        let status = self.bus.sram()[0];
        if status != self.last_blargg_status {
            self.last_blargg_status = status;
            log::info!(target: "famicore::nes", "Blargg status: 0x{:02X}", status);
        }

        if status != 0x80 && status != 0xFF {
            let message: String = self.bus.sram()[4..]
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| b as char)
                .collect();
            if !message.is_empty() {
                log::info!(target: "famicore::nes", "Blargg message:\n{}", message);
                match status {
                    0x81 => {
                        if self.soft_reset_delay == 0 {
                            self.soft_reset_delay = BLARGG_RESET_DELAY_FRAMES;
                        }
                    }
                    0x00 => return BlarggStatus::Passed,
                    code => return BlarggStatus::Failed(code),
                }
            }
        }

        // Work-RAM variant used by the older CPU test ROMs
        let work_addr = if mode == 1 { 0x00F8 } else { 0x00F0 };
        let work_status = self.bus.work_ram()[work_addr];
        if work_status != 0 {
            return if work_status == 0x01 {
                BlarggStatus::Passed
            } else {
                BlarggStatus::Failed(work_status)
            };
        }

        BlarggStatus::Running
    }

    /// Persist SRAM for battery-backed cartridges (clean shutdown)
    pub fn save_sram(&self) -> Result<(), StateError> {
        if !self.has_battery {
            return Ok(());
        }
        let Some(ref rom_path) = self.rom_path else {
            return Ok(());
        };
        sram::save_sram(&sram::sram_path_for_rom(rom_path), self.bus.sram())
    }

    // ========================================
    // Save states
    // ========================================

    /// Serialize the full machine state
    pub fn save_state_bytes(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        self.cpu_write_state(&mut payload);
        self.bus.write_state(&mut payload);
        self.bus.ppu().write_state(&mut payload);
        self.bus.apu().write_state(&mut payload);
        payload
    }

    /// Restore the full machine state; mappers rebuild their bank tables
    /// and the PPU re-derives its mirroring
    pub fn restore_state_bytes(&mut self, payload: &[u8]) -> Result<(), StateError> {
        let expected = self
            .mapper
            .as_ref()
            .map(|m| m.borrow().number())
            .unwrap_or(0xFF);

        let mut r = StateReader::new(payload);
        self.cpu_read_state(&mut r);
        let found = self.bus.read_state(&mut r);
        if found != expected {
            return Err(StateError::MapperMismatch { expected, found });
        }
        self.bus.ppu_mut().read_state(&mut r);
        self.bus.apu_mut().read_state(&mut r);
        self.cpu.clear_trigger();
        Ok(())
    }

    /// Save the machine state to `<rom-path>.state`
    pub fn save_state(&self) -> Result<(), StateError> {
        let Some(ref rom_path) = self.rom_path else {
            return Ok(());
        };
        let path = save_state::state_path_for_rom(rom_path);
        save_state::write_state_file(&path, &self.save_state_bytes())
    }

    /// Restore the machine state from `<rom-path>.state`
    pub fn restore_state(&mut self) -> Result<(), StateError> {
        let Some(ref rom_path) = self.rom_path else {
            return Ok(());
        };
        let path = save_state::state_path_for_rom(rom_path);
        let payload = save_state::read_state_file(&path)?;
        self.restore_state_bytes(&payload)
    }

    fn cpu_write_state(&self, out: &mut Vec<u8>) {
        use save_state::StatePut;
        out.put_u8(self.cpu.a);
        out.put_u8(self.cpu.x);
        out.put_u8(self.cpu.y);
        out.put_u8(self.cpu.sp);
        out.put_u16(self.cpu.pc);
        out.put_u8(self.cpu.status);
        out.put_u64(self.cpu.cycles);
    }

    fn cpu_read_state(&mut self, r: &mut StateReader) {
        self.cpu.a = r.take_u8();
        self.cpu.x = r.take_u8();
        self.cpu.y = r.take_u8();
        self.cpu.sp = r.take_u8();
        self.cpu.pc = r.take_u16();
        self.cpu.status = r.take_u8();
        self.cpu.cycles = r.take_u64();
    }

    // ========================================
    // Component access
    // ========================================

    /// Attach the audio ring the scheduler pushes sample batches into
    pub fn set_audio_sink(&mut self, sink: Arc<SampleRing>) {
        self.audio_sink = Some(sink);
    }

    /// Take the samples generated during the last frame (WAV dump, tests)
    pub fn take_frame_samples(&mut self) -> Vec<i16> {
        std::mem::take(&mut self.frame_samples)
    }

    /// Execute a single CPU instruction outside the frame loop (debugger
    /// and test use)
    pub fn step_cpu(&mut self) -> u8 {
        self.cpu.step(&mut self.bus)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }

    /// Cycles executed during the most recently completed frame
    pub fn last_frame_cpu_cycles(&self) -> i64 {
        self.frame_cpu_cycle
    }
}

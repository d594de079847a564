// famicore - command-line entry point
//
// Parses the CLI into an EmulatorConfig, wires up logging zones, and
// dispatches to either the 6502 conformance harness or the windowed
// emulator. Exit code 0 on a normal quit or a Blargg pass, 1 on a Blargg
// failure or frame-budget expiry.

use clap::Parser;
use famicore::emulator::{run_conformance_test, Emulator, EmulatorConfig, Preferences};
use famicore::display::{run_emulator_window, WindowConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// Logging zones accepted by `-l`
const LOG_ZONES: &[&str] = &[
    "main", "misc", "6502", "c64", "mem", "nes", "mapper", "ppu", "apu", "display",
];

fn parse_hex_u16(value: &str) -> Result<u16, String> {
    let trimmed = value.trim_start_matches("0x").trim_start_matches('$');
    u16::from_str_radix(trimmed, 16).map_err(|e| format!("bad hex address '{}': {}", value, e))
}

fn parse_blargg_mode(value: &str) -> Result<u8, String> {
    match value {
        "1" => Ok(1),
        "2" => Ok(2),
        _ => Err(format!("bad Blargg mode: {} (expected 1 or 2)", value)),
    }
}

#[derive(Debug, Parser)]
#[command(name = "famicore", about = "A cycle-accurate NES emulator", version)]
struct Args {
    /// Break on each opcode
    #[arg(short = 's', long = "step")]
    step: bool,

    /// Write a disassembly trace
    #[arg(short = 'd', long = "dump")]
    dump: bool,

    /// Run the 6502 conformance harness (ROM argument is the testsuite directory)
    #[arg(short = 't', long = "test")]
    test: bool,

    /// Override the next module the test harness loads
    #[arg(short = 'o', value_name = "MODULE")]
    module: Option<String>,

    /// Maximum instructions before abort
    #[arg(short = 'm', value_name = "MAX", default_value_t = 0)]
    max_instructions: u64,

    /// Print a heartbeat every N instructions
    #[arg(short = 'b', value_name = "N", default_value_t = 0)]
    heartbeat: u64,

    /// Maximum frames to execute
    #[arg(short = 'f', value_name = "N", default_value_t = 0)]
    max_frames: u64,

    /// Enable logging for a zone (main, misc, 6502, c64, mem, nes, mapper,
    /// ppu, apu, display) or '*' for everything
    #[arg(short = 'l', value_name = "ZONE")]
    log_zones: Vec<String>,

    /// Extra ms of per-frame sleep
    #[arg(long = "delay", value_name = "N", default_value_t = 0)]
    delay: u64,

    /// Force a display flush every Nth scanline
    #[arg(long = "sync", value_name = "N", default_value_t = 0)]
    sync: u32,

    /// Run flat-out
    #[arg(short = 'v', long = "novsync")]
    novsync: bool,

    /// Treat mouse X as a paddle
    #[arg(short = 'p', long = "paddle")]
    paddle: bool,

    /// Force sprite-0 hit each frame (debug)
    #[arg(long = "sprite0")]
    sprite0: bool,

    /// Emit uncropped 256x240
    #[arg(long = "nocrop")]
    nocrop: bool,

    /// Run Blargg self-test mode 1 or 2; poll SRAM bytes for status
    #[arg(long = "blargg", value_name = "MODE", value_parser = parse_blargg_mode)]
    blargg: Option<u8>,

    /// Windowed 800x600 with extra debug panels
    #[arg(long = "debug")]
    debug: bool,

    /// Disable audio
    #[arg(long = "noaudio")]
    noaudio: bool,

    /// Dump audio to nes.wav
    #[arg(long = "wav")]
    wav: bool,

    /// Force the post-reset PC
    #[arg(long = "pc", value_name = "HEX", value_parser = parse_hex_u16)]
    pc: Option<u16>,

    /// Start fullscreen
    #[arg(long = "fullscreen")]
    fullscreen: bool,

    /// ROM path
    rom: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> EmulatorConfig {
        EmulatorConfig {
            step: self.step,
            dump: self.dump,
            test_6502: self.test,
            test_module: self.module,
            max_instructions: self.max_instructions,
            heartbeat: self.heartbeat,
            max_frames: self.max_frames,
            extra_frame_delay_ms: self.delay,
            sync_every_scanlines: self.sync,
            novsync: self.novsync,
            paddle: self.paddle,
            force_sprite0: self.sprite0,
            trigger_hack: false,
            nocrop: self.nocrop,
            blargg: self.blargg,
            debug_window: self.debug,
            no_audio: self.noaudio,
            wav: self.wav,
            force_pc: self.pc,
            fullscreen: self.fullscreen,
            rom_path: self.rom,
        }
    }
}

/// Translate `-l` zones into env_logger module filters
fn init_logging(zones: &[String]) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    builder.filter_level(log::LevelFilter::Warn);

    for zone in zones {
        if zone == "*" {
            builder.filter_level(log::LevelFilter::Debug);
            continue;
        }
        if !LOG_ZONES.contains(&zone.as_str()) {
            eprintln!("unknown log zone '{}'", zone);
            continue;
        }
        builder.filter_module(&format!("famicore::{}", zone), log::LevelFilter::Trace);
    }

    builder.init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_zones);
    let config = args.into_config();

    // The conformance harness replaces the whole NES machine
    if config.test_6502 {
        return match run_conformance_test(&config) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::from(1),
            Err(e) => {
                eprintln!("conformance harness failed: {}", e);
                ExitCode::from(1)
            }
        };
    }

    let Some(rom_path) = config.rom_path.clone() else {
        eprintln!("no ROM given; usage: famicore [OPTIONS] ROM");
        return ExitCode::from(1);
    };

    let mut emulator = Emulator::new(config.clone());
    if let Err(e) = emulator.load_rom(&rom_path) {
        eprintln!("failed to load {}: {}", rom_path.display(), e);
        return ExitCode::from(1);
    }

    emulator.cpu_mut().dump = config.dump;
    emulator.cpu_mut().step_mode = config.step;

    let preferences = Preferences::load_or_default();
    let window_config = WindowConfig {
        scale: preferences.scale,
        vsync: preferences.vsync && !config.novsync,
        fullscreen: config.fullscreen,
        debug_window: config.debug_window,
        volume: preferences.volume,
    };

    match run_emulator_window(emulator, window_config) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("emulator error: {}", e);
            ExitCode::from(1)
        }
    }
}

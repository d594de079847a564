// Shared builders for the integration tests
//
// Tests construct cartridges in memory rather than loading ROM files, so
// the suite runs without fixtures.

#![allow(dead_code)]

use famicore::cartridge::{Cartridge, Mirroring};
use famicore::emulator::{Emulator, EmulatorConfig};

/// PRG start address for programs placed at the top of the low bank
pub const PROGRAM_BASE: u16 = 0x8000;

/// 32KB NROM cartridge with `program` at $8000 and all vectors pointing
/// at $8000. Unused PRG bytes are NOP.
pub fn nrom_with_program(program: &[u8]) -> Cartridge {
    let mut prg_rom = vec![0xEA; 32 * 1024];
    prg_rom[..program.len()].copy_from_slice(program);

    for vector in [0x7FFA, 0x7FFC, 0x7FFE] {
        prg_rom[vector] = 0x00;
        prg_rom[vector + 1] = 0x80;
    }

    Cartridge {
        prg_rom,
        chr_rom: vec![0; 8 * 1024],
        chr_is_ram: true,
        mapper: 0,
        mirroring: Mirroring::Horizontal,
        has_battery: false,
    }
}

/// An infinite `JMP $8000` loop; every instruction costs 3 cycles
pub fn jmp_loop_cartridge() -> Cartridge {
    nrom_with_program(&[0x4C, 0x00, 0x80])
}

/// 128KB MMC3 cartridge (PRG bytes tag their 16KB bank, CHR bytes their
/// 1KB bank)
pub fn mmc3_cartridge() -> Cartridge {
    let mut prg_rom = Vec::with_capacity(128 * 1024);
    for bank in 0..8 {
        prg_rom.extend(std::iter::repeat(bank as u8).take(16 * 1024));
    }
    // Vectors live in the fixed last bank
    let len = prg_rom.len();
    for vector in [len - 6, len - 4, len - 2] {
        prg_rom[vector] = 0x00;
        prg_rom[vector + 1] = 0x80;
    }

    let mut chr_rom = Vec::with_capacity(32 * 1024);
    for bank in 0..32 {
        chr_rom.extend(std::iter::repeat(bank as u8).take(1024));
    }

    Cartridge {
        prg_rom,
        chr_rom,
        chr_is_ram: false,
        mapper: 4,
        mirroring: Mirroring::Horizontal,
        has_battery: false,
    }
}

/// Emulator with a cartridge installed and default configuration
pub fn emulator_with(cartridge: Cartridge) -> Emulator {
    let mut emulator = Emulator::new(EmulatorConfig::default());
    emulator.load_cartridge(cartridge).expect("cartridge loads");
    emulator
}

/// Emulator running the 3-cycle JMP loop
pub fn emulator_with_loop() -> Emulator {
    emulator_with(jmp_loop_cartridge())
}

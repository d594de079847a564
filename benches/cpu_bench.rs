// Interpreter benchmarks: dispatch cost for common instruction shapes

use criterion::{criterion_group, criterion_main, Criterion};
use famicore::{Bus, Cpu};
use std::hint::black_box;

/// CPU looping over `body` forever via a trailing JMP
fn looping_cpu(body: &[u8]) -> (Cpu, Bus) {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new_flat();

    let base = 0x0200u16;
    for (i, &byte) in body.iter().enumerate() {
        bus.write(base + i as u16, byte);
    }
    let end = base + body.len() as u16;
    bus.write(end, 0x4C); // JMP $0200
    bus.write(end + 1, 0x00);
    bus.write(end + 2, 0x02);

    cpu.pc = base;
    (cpu, bus)
}

fn bench_cpu_instructions(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_instructions");

    group.bench_function("nop", |b| {
        let (mut cpu, mut bus) = looping_cpu(&[0xEA; 64]);
        b.iter(|| cpu.step(black_box(&mut bus)));
    });

    group.bench_function("lda_immediate", |b| {
        let (mut cpu, mut bus) = looping_cpu(&[0xA9, 0x42].repeat(32));
        b.iter(|| cpu.step(black_box(&mut bus)));
    });

    group.bench_function("indexed_load_store", |b| {
        // LDA $1000,X / STA $1100,X
        let (mut cpu, mut bus) = looping_cpu(&[0xBD, 0x00, 0x10, 0x9D, 0x00, 0x11].repeat(16));
        cpu.x = 0x20;
        b.iter(|| cpu.step(black_box(&mut bus)));
    });

    group.bench_function("taken_branch", |b| {
        // SEC; BCS +0 (falls through to the next pair)
        let (mut cpu, mut bus) = looping_cpu(&[0x38, 0xB0, 0x00].repeat(20));
        b.iter(|| cpu.step(black_box(&mut bus)));
    });

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    use famicore::cartridge::{Cartridge, Mirroring};
    use famicore::emulator::{Emulator, EmulatorConfig};

    let mut prg_rom = vec![0xEA; 32 * 1024];
    prg_rom[0] = 0x4C;
    prg_rom[1] = 0x00;
    prg_rom[2] = 0x80;
    for vector in [0x7FFA, 0x7FFC, 0x7FFE] {
        prg_rom[vector] = 0x00;
        prg_rom[vector + 1] = 0x80;
    }
    let cartridge = Cartridge {
        prg_rom,
        chr_rom: vec![0; 8 * 1024],
        chr_is_ram: true,
        mapper: 0,
        mirroring: Mirroring::Horizontal,
        has_battery: false,
    };

    let mut emulator = Emulator::new(EmulatorConfig::default());
    emulator.load_cartridge(cartridge).unwrap();
    // Rendering on so the PPU path is exercised
    emulator.bus_mut().write(0x2001, 0x18);

    c.bench_function("full_frame", |b| {
        b.iter(|| {
            emulator.run_frame();
            black_box(emulator.take_frame_samples());
        });
    });
}

criterion_group!(benches, bench_cpu_instructions, bench_frame);
criterion_main!(benches);

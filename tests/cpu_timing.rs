// CPU timing conformance
//
// Executes every runnable opcode against a flat address space and checks
// the consumed cycles against the canonical table, then the page-cross and
// branch boundary behaviours.

use famicore::bus::Bus;
use famicore::cpu::addressing::AddressingMode;
use famicore::cpu::opcodes::OPCODE_TABLE;
use famicore::cpu::{flags, Cpu};

/// Fresh CPU at $0200 on a flat 64KB bus with vectors installed
fn setup() -> (Cpu, Bus) {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new_flat();
    // BRK/IRQ vector somewhere harmless
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0x90);
    cpu.pc = 0x0200;
    (cpu, bus)
}

#[test]
fn test_every_opcode_matches_table_base_cost() {
    for opcode in 0..=255u8 {
        let info = &OPCODE_TABLE[opcode as usize];
        if info.mnemonic == "KIL" || info.mnemonic == "TRP" {
            continue;
        }

        let (mut cpu, mut bus) = setup();
        bus.write(0x0200, opcode);
        // Zeroed operands: indexed bases resolve to page zero, so no
        // page crossings occur anywhere
        bus.write(0x0201, 0x00);
        bus.write(0x0202, 0x00);

        // Make every branch fall through: set the flags each branch tests
        // to the not-taken polarity
        cpu.status = match opcode {
            0x90 => flags::CARRY | flags::UNUSED,              // BCC
            0xB0 => flags::UNUSED,                             // BCS
            0xF0 => flags::UNUSED,                             // BEQ
            0xD0 => flags::ZERO | flags::UNUSED,               // BNE
            0x30 => flags::UNUSED,                             // BMI
            0x10 => flags::NEGATIVE | flags::UNUSED,           // BPL
            0x50 => flags::OVERFLOW | flags::UNUSED,           // BVC
            0x70 => flags::UNUSED,                             // BVS
            _ => cpu.status,
        };

        let before = cpu.cycles;
        let reported = cpu.step(&mut bus);
        let elapsed = cpu.cycles - before;

        assert_eq!(
            reported as u64, elapsed,
            "opcode {:02X}: reported and counted cycles disagree",
            opcode
        );
        assert_eq!(
            elapsed, info.cycles as u64,
            "opcode {:02X} ({}) took {} cycles, table says {}",
            opcode, info.mnemonic, elapsed, info.cycles
        );
    }
}

#[test]
fn test_page_cross_penalty_for_every_marked_opcode() {
    for opcode in 0..=255u8 {
        let info = &OPCODE_TABLE[opcode as usize];
        if !info.page_cycle {
            continue;
        }

        let (mut cpu, mut bus) = setup();
        bus.write(0x0200, opcode);
        match info.mode {
            AddressingMode::AbsoluteX => {
                bus.write(0x0201, 0xFF);
                bus.write(0x0202, 0x30);
                cpu.x = 0x01;
            }
            AddressingMode::AbsoluteY => {
                bus.write(0x0201, 0xFF);
                bus.write(0x0202, 0x30);
                cpu.y = 0x01;
            }
            AddressingMode::IndirectIndexed => {
                bus.write(0x0201, 0x40);
                bus.write(0x0040, 0xFF);
                bus.write(0x0041, 0x30);
                cpu.y = 0x01;
            }
            mode => panic!("unexpected page-cycle mode {:?} on {:02X}", mode, opcode),
        }

        let before = cpu.cycles;
        cpu.step(&mut bus);
        assert_eq!(
            cpu.cycles - before,
            info.cycles as u64 + 1,
            "opcode {:02X} ({}) must pay the page-cross penalty",
            opcode,
            info.mnemonic
        );
    }
}

#[test]
fn test_store_at_page_cross_keeps_fixed_cost() {
    // STA $30FF,X with X=1 crosses but stores always take the worst case
    let (mut cpu, mut bus) = setup();
    bus.write(0x0200, 0x9D);
    bus.write(0x0201, 0xFF);
    bus.write(0x0202, 0x30);
    cpu.x = 0x01;
    cpu.a = 0x55;

    let before = cpu.cycles;
    cpu.step(&mut bus);
    assert_eq!(cpu.cycles - before, 5);
    assert_eq!(bus.read(0x3100), 0x55);
}

#[test]
fn test_branch_cycle_matrix() {
    // Not taken: 2
    let (mut cpu, mut bus) = setup();
    cpu.status |= flags::ZERO;
    bus.write(0x0200, 0xD0); // BNE
    bus.write(0x0201, 0x10);
    let reported = cpu.step(&mut bus);
    assert_eq!(reported, 2);

    // Taken, same page: 3
    let (mut cpu, mut bus) = setup();
    bus.write(0x0200, 0xD0);
    bus.write(0x0201, 0x10);
    let reported = cpu.step(&mut bus);
    assert_eq!(reported, 3);
    assert_eq!(cpu.pc, 0x0212);
}

#[test]
fn test_branch_from_80fe_to_8101_costs_four() {
    let (mut cpu, mut bus) = setup();
    cpu.pc = 0x80FE;
    bus.write(0x80FE, 0xD0); // BNE +1
    bus.write(0x80FF, 0x01);
    let reported = cpu.step(&mut bus);
    assert_eq!(cpu.pc, 0x8101);
    assert_eq!(reported, 4, "2 base + 1 taken + 1 page cross");
}

#[test]
fn test_jmp_indirect_page_wrap_bug() {
    let (mut cpu, mut bus) = setup();
    bus.write(0x0200, 0x6C); // JMP ($30FF)
    bus.write(0x0201, 0xFF);
    bus.write(0x0202, 0x30);
    bus.write(0x30FF, 0x34);
    bus.write(0x3100, 0x56); // correct high byte, never fetched
    bus.write(0x3000, 0x12); // buggy high byte source

    cpu.step(&mut bus);
    assert_eq!(cpu.pc, 0x1234, "high byte from $3000, not $3100");
}

#[test]
fn test_stack_wraps_at_page_one() {
    let (mut cpu, mut bus) = setup();
    cpu.sp = 0x01;
    // JSR pushes two bytes, wrapping through $0100 -> $01FF
    bus.write(0x0200, 0x20); // JSR $4000
    bus.write(0x0201, 0x00);
    bus.write(0x0202, 0x40);
    cpu.step(&mut bus);

    assert_eq!(cpu.sp, 0xFF, "stack pointer wrapped");
    assert_eq!(bus.read(0x0101), 0x02, "return high byte at $0101");
    assert_eq!(bus.read(0x0100), 0x02, "return low byte at $0100");
    assert_eq!(cpu.pc, 0x4000);
}

#[test]
fn test_reserved_flag_always_reads_one() {
    let (mut cpu, mut bus) = setup();
    // PLP with a pushed status of zero
    cpu.stack_push(&mut bus, 0x00);
    bus.write(0x0200, 0x28); // PLP
    cpu.step(&mut bus);
    assert_ne!(cpu.status & flags::UNUSED, 0, "bit 5 reads as 1");
    assert_eq!(cpu.status & flags::BREAK, 0, "B reads as 0");

    // RTI likewise
    let (mut cpu, mut bus) = setup();
    cpu.stack_push_u16(&mut bus, 0x0300);
    cpu.stack_push(&mut bus, 0xFF);
    bus.write(0x0200, 0x40); // RTI
    cpu.step(&mut bus);
    assert_ne!(cpu.status & flags::UNUSED, 0);
    assert_eq!(cpu.status & flags::BREAK, 0);
    assert_eq!(cpu.pc, 0x0300);
}

#[test]
fn test_php_brk_push_b_set() {
    let (mut cpu, mut bus) = setup();
    let sp = cpu.sp;
    bus.write(0x0200, 0x08); // PHP
    cpu.step(&mut bus);
    let pushed = bus.read(0x0100 | sp as u16);
    assert_ne!(pushed & flags::BREAK, 0, "PHP pushes B set");

    let (mut cpu, mut bus) = setup();
    let sp = cpu.sp;
    bus.write(0x0200, 0x00); // BRK
    cpu.step(&mut bus);
    let pushed = bus.read(0x0100 | sp.wrapping_sub(2) as u16);
    assert_ne!(pushed & flags::BREAK, 0, "BRK pushes B set");
    assert_eq!(cpu.status & flags::BREAK, 0, "live B stays clear");
    assert_eq!(cpu.pc, 0x9000, "vectored through $FFFE");
}

#[test]
fn test_undocumented_lax_and_dcp_via_execution() {
    let (mut cpu, mut bus) = setup();
    bus.write(0x0200, 0xA7); // LAX $40
    bus.write(0x0201, 0x40);
    bus.write(0x0040, 0x81);
    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x81);
    assert_eq!(cpu.x, 0x81);

    let (mut cpu, mut bus) = setup();
    bus.write(0x0200, 0xC7); // DCP $40
    bus.write(0x0201, 0x40);
    bus.write(0x0040, 0x11);
    cpu.a = 0x10;
    cpu.step(&mut bus);
    assert_eq!(bus.read(0x0040), 0x10);
    assert!(cpu.get_zero(), "compare against the decremented value");
}

// Debug module - disassembly and execution tracing

mod disassembler;

pub use disassembler::{disassemble_instruction, trace_instruction, DisassembledInstruction};

// Shared channel building blocks: the units the frame sequencer clocks
// (envelope, sweep, length counter, linear counter), the CPU-cycle timer
// divider, and the frame sequencer itself.

mod envelope;
mod frame_counter;
mod length_counter;
mod linear_counter;
mod sweep;
mod timer;

pub use envelope::Envelope;
pub use frame_counter::{FrameCounter, SequencerClocks};
pub use length_counter::LengthCounter;
pub use linear_counter::LinearCounter;
pub use sweep::Sweep;
pub use timer::Timer;

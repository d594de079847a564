// Tone channels: two pulses, triangle, noise, and the delta-modulation
// channel. Each owns a CPU-cycle timer plus the frame-sequencer units that
// gate it, and produces a 4-bit (7-bit for DMC) DAC value sampled by the
// mixer.

mod dmc;
mod noise;
mod pulse;
mod triangle;

pub use dmc::DmcChannel;
pub use noise::NoiseChannel;
pub use pulse::PulseChannel;
pub use triangle::TriangleChannel;

// Audio module - sample transport and output
//
// The emulator thread is the single producer: it pushes each scanline's
// sample batch into a bounded ring. The host audio callback is the single
// consumer. Underflow plays silence, overflow overwrites the oldest
// samples; audio never backpressures emulation.

#[cfg(feature = "audio")]
mod output;
mod ring;
mod wav;

#[cfg(feature = "audio")]
pub use output::AudioOutput;
pub use ring::{SampleRing, RING_CAPACITY};
pub use wav::WavWriter;

// Display module - palette conversion, framebuffer, presenter window

pub mod framebuffer;
pub mod palette;
pub mod screenshot;
pub mod window;

pub use framebuffer::{FrameBuffer, CROP_MARGIN};
pub use palette::{palette_to_rgb, NES_PALETTE};
pub use window::{run_emulator_window, WindowConfig};

// Presenter window
//
// Drives the emulator at 60 Hz inside a winit event loop and blits each
// finished frame through a pixels surface. Keyboard state feeds the joypad
// latches once per frame; with `--paddle` the mouse X position feeds the
// paddle. This is the only place that paces emulation: vsync mode holds
// each frame to ~16.666 ms, `--novsync` runs flat out.

use super::framebuffer::FrameBuffer;
use crate::audio::SampleRing;
#[cfg(feature = "audio")]
use crate::audio::AudioOutput;
use crate::audio::WavWriter;
use crate::emulator::{BlarggStatus, Emulator};
use crate::input::{buttons, PADDLE_MAX, PADDLE_MIN};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

/// Target frame period for NTSC
const FRAME_PERIOD: Duration = Duration::from_micros(16_666);

/// Presenter configuration
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Integer scale factor (1-8)
    pub scale: u32,
    /// Pace frames to 60 Hz
    pub vsync: bool,
    /// Start fullscreen
    pub fullscreen: bool,
    /// Enlarged window with room for debug output
    pub debug_window: bool,
    /// Audio volume passed to the output stream
    pub volume: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            scale: 2,
            vsync: true,
            fullscreen: false,
            debug_window: false,
            volume: 1.0,
        }
    }
}

/// Map a key to a joypad button bit for one of the two pads
fn joypad_button(key: KeyCode) -> Option<(usize, u8)> {
    match key {
        // Player 1
        KeyCode::KeyX => Some((0, buttons::A)),
        KeyCode::KeyZ => Some((0, buttons::B)),
        KeyCode::ShiftRight => Some((0, buttons::SELECT)),
        KeyCode::Enter => Some((0, buttons::START)),
        KeyCode::ArrowUp => Some((0, buttons::UP)),
        KeyCode::ArrowDown => Some((0, buttons::DOWN)),
        KeyCode::ArrowLeft => Some((0, buttons::LEFT)),
        KeyCode::ArrowRight => Some((0, buttons::RIGHT)),
        // Player 2
        KeyCode::KeyU => Some((1, buttons::A)),
        KeyCode::KeyY => Some((1, buttons::B)),
        KeyCode::KeyO => Some((1, buttons::SELECT)),
        KeyCode::KeyP => Some((1, buttons::START)),
        KeyCode::KeyI => Some((1, buttons::UP)),
        KeyCode::KeyK => Some((1, buttons::DOWN)),
        KeyCode::KeyJ => Some((1, buttons::LEFT)),
        KeyCode::KeyL => Some((1, buttons::RIGHT)),
        _ => None,
    }
}

/// Application state for the presenter event loop
struct EmulatorApp {
    emulator: Emulator,
    config: WindowConfig,
    frame_buffer: FrameBuffer,

    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,

    ring: Arc<SampleRing>,
    #[cfg(feature = "audio")]
    audio: Option<AudioOutput>,
    wav: Option<WavWriter>,

    joypads: [u8; 2],
    paddle_enabled: bool,

    last_frame_time: Instant,
    frames_run: u64,
    exit_code: i32,
}

impl EmulatorApp {
    fn new(mut emulator: Emulator, config: WindowConfig) -> Self {
        let ring = SampleRing::new();
        emulator.set_audio_sink(Arc::clone(&ring));
        let nocrop = emulator.config().nocrop;
        let paddle_enabled = emulator.config().paddle;
        let wav = if emulator.config().wav {
            match WavWriter::create("nes.wav") {
                Ok(writer) => Some(writer),
                Err(e) => {
                    log::error!(target: "famicore::main", "cannot open nes.wav: {}", e);
                    None
                }
            }
        } else {
            None
        };

        EmulatorApp {
            emulator,
            config,
            frame_buffer: FrameBuffer::new(nocrop),
            window: None,
            pixels: None,
            ring,
            #[cfg(feature = "audio")]
            audio: None,
            wav,
            joypads: [0; 2],
            paddle_enabled,
            last_frame_time: Instant::now(),
            frames_run: 0,
            exit_code: 0,
        }
    }

    /// Advance the emulation by one frame and publish its outputs
    fn run_one_frame(&mut self, event_loop: &ActiveEventLoop) {
        // Latest input snapshot feeds the latches before the frame runs
        let controllers = self.emulator.bus_mut().controllers_mut();
        controllers.controller1.set_buttons(self.joypads[0]);
        controllers.controller2.set_buttons(self.joypads[1]);
        controllers.paddle.attached = self.paddle_enabled;

        self.emulator.run_frame();
        self.frames_run += 1;

        // The scheduler already pushed these into the ring scanline by
        // scanline; this copy feeds the WAV dump
        let samples = self.emulator.take_frame_samples();
        if let Some(ref mut wav) = self.wav {
            if let Err(e) = wav.write_samples(&samples) {
                log::error!(target: "famicore::main", "WAV write failed: {}", e);
                self.wav = None;
            }
        }

        self.frame_buffer.update(self.emulator.bus().ppu().frame());

        match self.emulator.poll_blargg() {
            BlarggStatus::Running => {}
            BlarggStatus::Passed => {
                println!("Blargg PASSED");
                self.exit_code = 0;
                event_loop.exit();
            }
            BlarggStatus::Failed(code) => {
                println!("Blargg FAILED: {:02X}", code);
                self.exit_code = 1;
                event_loop.exit();
            }
        }

        let max_frames = self.emulator.config().max_frames;
        if max_frames != 0 && self.frames_run >= max_frames {
            log::info!(target: "famicore::main", "frame budget of {} reached", max_frames);
            // Expiring inside a Blargg run means the test never concluded
            self.exit_code = if self.emulator.config().blargg.is_some() {
                1
            } else {
                0
            };
            event_loop.exit();
        }

        let delay = self.emulator.config().extra_frame_delay_ms;
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
    }

    fn render(&mut self) -> Result<(), pixels::Error> {
        if let Some(ref mut pixels) = self.pixels {
            self.frame_buffer.to_rgba(pixels.frame_mut());
            pixels.render()?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool, event_loop: &ActiveEventLoop) {
        if let Some((pad, bit)) = joypad_button(key) {
            if pressed {
                self.joypads[pad] |= bit;
            } else {
                self.joypads[pad] &= !bit;
            }
            return;
        }

        if !pressed {
            return;
        }
        match key {
            KeyCode::Escape => {
                event_loop.exit();
            }
            KeyCode::F5 => {
                if let Err(e) = self.emulator.save_state() {
                    log::error!(target: "famicore::main", "save state failed: {}", e);
                }
            }
            KeyCode::F7 => {
                if let Err(e) = self.emulator.restore_state() {
                    log::error!(target: "famicore::main", "restore state failed: {}", e);
                }
            }
            KeyCode::F8 => {
                self.emulator.soft_reset();
            }
            KeyCode::F9 => {
                let rom_path = self.emulator.rom_path().map(|p| p.to_path_buf());
                let nocrop = self.frame_buffer.nocrop;
                if let Err(e) = super::screenshot::save_screenshot(
                    self.emulator.bus().ppu().frame(),
                    nocrop,
                    rom_path.as_deref(),
                ) {
                    log::error!(target: "famicore::main", "screenshot failed: {}", e);
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for EmulatorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = if self.config.debug_window {
            (800, 600)
        } else {
            (
                self.frame_buffer.width() as u32 * self.config.scale,
                self.frame_buffer.height() as u32 * self.config.scale,
            )
        };

        let title = match self.emulator.rom_path() {
            Some(path) => format!(
                "famicore - {}",
                path.file_name().and_then(|n| n.to_str()).unwrap_or("?")
            ),
            None => "famicore".to_string(),
        };

        let mut attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(false);
        if self.config.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .expect("failed to create window"),
        );
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(
            self.frame_buffer.width() as u32,
            self.frame_buffer.height() as u32,
            surface,
        )
        .expect("failed to create pixel buffer");

        #[cfg(feature = "audio")]
        if !self.emulator.config().no_audio {
            match AudioOutput::new(Arc::clone(&self.ring), self.config.volume) {
                Ok(output) => self.audio = Some(output),
                Err(e) => log::error!(target: "famicore::main", "audio disabled: {}", e),
            }
        }

        self.window = Some(window);
        self.pixels = Some(pixels);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => {
                self.handle_key(key, state == ElementState::Pressed, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.paddle_enabled {
                    let width = self
                        .window
                        .as_ref()
                        .map(|w| w.inner_size().width.max(1))
                        .unwrap_or(1);
                    let range = (PADDLE_MAX - PADDLE_MIN) as f64;
                    let fraction = (position.x / width as f64).clamp(0.0, 1.0);
                    let value = PADDLE_MIN + (fraction * range) as u8;
                    self.emulator
                        .bus_mut()
                        .controllers_mut()
                        .paddle
                        .set_position(value);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if self.paddle_enabled && button == MouseButton::Left {
                    self.emulator.bus_mut().controllers_mut().paddle.button =
                        state == ElementState::Pressed;
                }
            }
            WindowEvent::RedrawRequested => {
                let due = !self.config.vsync
                    || self.last_frame_time.elapsed() >= FRAME_PERIOD;
                if due {
                    self.last_frame_time = Instant::now();
                    self.run_one_frame(event_loop);
                    if let Err(e) = self.render() {
                        log::error!(target: "famicore::display", "render error: {}", e);
                        self.exit_code = 1;
                        event_loop.exit();
                    }
                }
                if let Some(ref window) = self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

/// Run the presenter until quit; returns the process exit code
pub fn run_emulator_window(
    emulator: Emulator,
    config: WindowConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    if emulator.config().sync_every_scanlines != 0 {
        log::warn!(
            target: "famicore::display",
            "--sync has no effect with the frame-granularity presenter"
        );
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = EmulatorApp::new(emulator, config);
    event_loop.run_app(&mut app)?;

    // Clean shutdown: stop the audio thread, close the WAV, persist SRAM
    app.ring.shutdown();
    #[cfg(feature = "audio")]
    if let Some(audio) = app.audio.take() {
        audio.shutdown();
    }
    if let Some(mut wav) = app.wav.take() {
        wav.finalize()?;
    }
    app.emulator.save_sram()?;

    log::info!(target: "famicore::main", "quit after {} frames", app.frames_run);
    Ok(app.exit_code)
}

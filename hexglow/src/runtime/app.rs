use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorIcon, Window, WindowAttributes, WindowId};

use super::blit::Blitter;
use super::capture;
use super::config_watch::ConfigWatch;
use super::events::{
    RuntimeCommand, RuntimeCommandReceiver, RuntimeCommandSender,
    command_channel,
};
use super::frame_clock::FrameClock;
use super::present::{Presenter, TOGGLE_REGION, toggle_button_rect};
use super::storage::{self, ViewerSettings};
use super::theme_watch::{self, ThemeWatch};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::framework::logging;
use crate::glyph::IconCatalog;
use crate::input::ClickOutcome;
use crate::theme::Theme;
use crate::{debug_throttled, warn_once};

const DEFAULT_SIZE: (u32, u32) = (1280, 800);

/// Everything the viewer hands the runtime
pub struct RunOptions {
    pub title: String,
    pub config: EngineConfig,
    /// Watched for edits when present
    pub config_path: Option<PathBuf>,
    pub catalog: IconCatalog,
    /// Forces a theme instead of the saved or system one
    pub theme: Option<Theme>,
    pub fps: f32,
    /// Logical window size; the saved size or a default otherwise
    pub size: Option<(u32, u32)>,
}

impl RunOptions {
    pub fn new(catalog: IconCatalog) -> Self {
        Self {
            title: "hexglow".to_string(),
            config: EngineConfig::default(),
            config_path: None,
            catalog,
            theme: None,
            fps: 60.0,
            size: None,
        }
    }
}

struct HexglowRuntime {
    title: String,
    config: EngineConfig,
    config_path: Option<PathBuf>,
    catalog: Option<IconCatalog>,
    theme: Theme,
    system_theme: Theme,
    size: (u32, u32),
    settings: ViewerSettings,
    settings_dir: Option<PathBuf>,
    images_dir: PathBuf,
    command_tx: RuntimeCommandSender,
    command_rx: RuntimeCommandReceiver,
    engine: Option<Engine>,
    window: Option<Arc<Window>>,
    window_id: Option<WindowId>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    blitter: Option<Blitter>,
    presenter: Presenter,
    clock: FrameClock,
    scale_factor: f64,
    cursor: Option<(f32, f32)>,
    render_requested: bool,
    config_watch: Option<ConfigWatch>,
    theme_watch: Option<ThemeWatch>,
    shutdown_done: bool,
}

impl HexglowRuntime {
    // Resolves persisted settings and the starting theme before any window
    // exists.
    fn new(options: RunOptions) -> Self {
        let (command_tx, command_rx) = command_channel();
        let settings_dir = storage::config_dir();

        let settings = settings_dir
            .as_deref()
            .map(|dir| match storage::load_settings_if_exists(dir) {
                Ok(settings) => settings.unwrap_or_default(),
                Err(err) => {
                    warn!("ignoring unreadable viewer settings: {}", err);
                    ViewerSettings::default()
                }
            })
            .unwrap_or_default();

        let system_theme = theme_watch::detect_system_theme();
        let theme = options
            .theme
            .or(settings.theme)
            .unwrap_or(system_theme);

        let size = options
            .size
            .or(settings.window_size.map(|[w, h]| (w, h)))
            .unwrap_or(DEFAULT_SIZE);

        Self {
            title: options.title,
            config: options.config,
            config_path: options.config_path,
            catalog: Some(options.catalog),
            theme,
            system_theme,
            size,
            settings,
            settings_dir,
            images_dir: storage::default_images_dir(),
            command_tx,
            command_rx,
            engine: None,
            window: None,
            window_id: None,
            surface: None,
            surface_config: None,
            device: None,
            queue: None,
            blitter: None,
            presenter: Presenter::new(),
            clock: FrameClock::new(options.fps),
            scale_factor: 1.0,
            cursor: None,
            render_requested: false,
            config_watch: None,
            theme_watch: None,
            shutdown_done: false,
        }
    }

    // Single dispatcher for everything that changes runtime state. Returns
    // true when the event loop is exiting.
    fn on_command(
        &mut self,
        event_loop: &ActiveEventLoop,
        command: RuntimeCommand,
    ) -> bool {
        match command {
            RuntimeCommand::ToggleTheme => {
                self.apply_theme(self.theme.toggled());
                self.settings.theme = Some(self.theme);
                self.save_settings();
            }
            RuntimeCommand::SetTheme(theme) => {
                self.system_theme = theme;
                self.apply_theme(theme);
            }
            RuntimeCommand::ReloadConfig => self.reload_config(),
            RuntimeCommand::SaveImage => self.save_image(),
            RuntimeCommand::Quit => {
                self.shutdown(event_loop);
                return true;
            }
        }

        false
    }

    fn process_commands(&mut self, event_loop: &ActiveEventLoop) {
        while let Ok(command) = self.command_rx.try_recv() {
            if self.on_command(event_loop, command) {
                return;
            }
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        info!("switching to {} theme", theme);
        self.theme = theme;
        if let Some(engine) = self.engine.as_mut() {
            engine.on_theme_change(theme);
        }
    }

    fn reload_config(&mut self) {
        let Some(path) = self.config_path.as_ref() else {
            return;
        };

        match EngineConfig::load(path) {
            Ok(config) => {
                info!("reloaded config from {}", path.display());
                self.config = config;
                let scaled = self.config.scaled(self.scale_factor as f32);
                if let Some(engine) = self.engine.as_mut() {
                    engine.set_config(scaled);
                }
            }
            Err(err) => warn!("keeping previous config: {}", err),
        }
    }

    fn save_image(&self) {
        let (Some(canvas), Some(rgba)) =
            (self.presenter.canvas(), self.presenter.rgba())
        else {
            warn!("nothing rendered yet; skipping capture");
            return;
        };

        let path = capture::capture_path(&self.images_dir);
        capture::queue_png_save(
            path,
            canvas.width(),
            canvas.height(),
            rgba.to_vec(),
        );
    }

    fn save_settings(&self) {
        let Some(dir) = self.settings_dir.as_ref() else {
            return;
        };
        match storage::save_settings(dir, &self.settings) {
            Ok(path) => debug!("viewer settings saved to {}", path.display()),
            Err(err) => warn!("failed to save viewer settings: {}", err),
        }
    }

    fn handle_shortcut(
        &mut self,
        event_loop: &ActiveEventLoop,
        key_event: &KeyEvent,
    ) -> bool {
        if key_event.state != ElementState::Pressed || key_event.repeat {
            return false;
        }

        let PhysicalKey::Code(code) = key_event.physical_key else {
            return false;
        };

        let command = match code {
            KeyCode::KeyT => RuntimeCommand::ToggleTheme,
            KeyCode::KeyS => RuntimeCommand::SaveImage,
            KeyCode::Escape => RuntimeCommand::Quit,
            _ => return false,
        };

        self.on_command(event_loop, command)
    }

    fn on_click(&mut self, event_loop: &ActiveEventLoop) {
        let Some((x, y)) = self.cursor else {
            return;
        };
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if let ClickOutcome::Blocked(region) = engine.on_click(x, y) {
            if region == TOGGLE_REGION {
                self.on_command(event_loop, RuntimeCommand::ToggleTheme);
            }
        }
    }

    fn on_cursor_moved(&mut self, x: f32, y: f32) {
        self.cursor = Some((x, y));
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.on_pointer_move(x, y);

        if let Some(window) = self.window.as_ref() {
            let over_button = engine.hovered_region() == Some(TOGGLE_REGION);
            window.set_cursor(if over_button {
                CursorIcon::Pointer
            } else {
                CursorIcon::Default
            });
        }
    }

    fn register_toggle_button(&mut self, width: u32) {
        let rect = toggle_button_rect(width, self.scale_factor as f32);
        if let Some(engine) = self.engine.as_mut() {
            engine.regions_mut().insert(TOGGLE_REGION, rect);
        }
    }

    // Creates window, surface, device and engine.
    fn init_runtime(
        &mut self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(), String> {
        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1))
            .with_min_inner_size(LogicalSize::new(200, 150));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|err| err.to_string())?,
        );

        let instance =
            wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window.clone())
            .map_err(|err| err.to_string())?;

        let adapter = pollster::block_on(instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            },
        ))
        .map_err(|err| err.to_string())?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("hexglow-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::default(),
            },
        ))
        .map_err(|err| err.to_string())?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats)
            .ok_or_else(|| "surface has no supported formats".to_string())?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        let catalog = self
            .catalog
            .take()
            .ok_or_else(|| "icon catalog already consumed".to_string())?;

        self.scale_factor = window.scale_factor();
        let mut engine = Engine::new(
            self.config.scaled(self.scale_factor as f32),
            catalog,
            self.theme,
        );
        engine.init(width, height);

        self.blitter = Some(Blitter::new(&device, format));
        self.window_id = Some(window.id());
        self.window = Some(window);
        self.surface = Some(surface);
        self.surface_config = Some(surface_config);
        self.device = Some(device);
        self.queue = Some(queue);
        self.engine = Some(engine);
        self.register_toggle_button(width);

        Ok(())
    }

    fn start_watchers(&mut self) {
        if let Some(path) = self.config_path.clone() {
            match ConfigWatch::start(path, self.command_tx.clone()) {
                Ok(watch) => self.config_watch = Some(watch),
                Err(err) => warn!("config watching unavailable: {}", err),
            }
        }

        self.theme_watch = ThemeWatch::start(
            self.system_theme,
            theme_watch::POLL_INTERVAL,
            self.command_tx.clone(),
        );
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let Some(surface_config) = self.surface_config.as_mut() else {
            return;
        };
        let Some(device) = self.device.as_ref() else {
            return;
        };

        surface_config.width = new_size.width;
        surface_config.height = new_size.height;
        surface.configure(device, surface_config);

        if let Some(engine) = self.engine.as_mut() {
            engine.resize(new_size.width, new_size.height);
        }
        self.register_toggle_button(new_size.width);
    }

    fn rescale(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
        let scaled = self.config.scaled(scale_factor as f32);
        if let Some(engine) = self.engine.as_mut() {
            engine.set_config(scaled);
        }
        if let Some(width) = self.surface_config.as_ref().map(|c| c.width) {
            self.register_toggle_button(width);
        }
    }

    // Advances the engine, flattens it with the chrome, uploads and presents.
    fn render(&mut self, event_loop: &ActiveEventLoop) {
        if !self.render_requested {
            return;
        }
        self.render_requested = false;

        let now = Instant::now();
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.tick(self.clock.seconds(now));

        let Some(surface_config) = self.surface_config.as_ref() else {
            return;
        };
        let (width, height) = (surface_config.width, surface_config.height);
        let button = engine.regions().get(TOGGLE_REGION).map(|rect| {
            (rect, engine.hovered_region() == Some(TOGGLE_REGION))
        });

        let Some(canvas) = self.presenter.compose(
            width,
            height,
            self.theme,
            engine.frame(),
            button,
        ) else {
            warn_once!("presentation canvas could not be allocated");
            return;
        };

        let (Some(surface), Some(device), Some(queue), Some(blitter)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.queue.as_ref(),
            self.blitter.as_mut(),
        ) else {
            return;
        };

        blitter.upload(device, queue, width, height, canvas.data());

        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, surface_config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout while acquiring frame");
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory; exiting");
                self.shutdown(event_loop);
                return;
            }
            Err(wgpu::SurfaceError::Other) => {
                warn!("surface error while acquiring frame");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hexglow-frame-encoder"),
            });
        blitter.draw(&mut encoder, &view);
        queue.submit(Some(encoder.finish()));
        output.present();

        debug_throttled!(
            5000,
            "average fps: {:.1} over {} frames",
            self.clock.average_fps(),
            self.clock.frame_count()
        );
    }

    // Persists the window size, releases the engine, and exits.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if !self.shutdown_done {
            self.shutdown_done = true;

            if let Some(window) = self.window.as_ref() {
                let size: LogicalSize<u32> =
                    window.inner_size().to_logical(window.scale_factor());
                self.settings.window_size = Some([size.width, size.height]);
                self.save_settings();
            }

            self.theme_watch = None;
            self.config_watch = None;
            if let Some(engine) = self.engine.as_mut() {
                engine.dispose();
            }
        }

        event_loop.exit();
    }
}

impl ApplicationHandler for HexglowRuntime {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_runtime(event_loop) {
            error!("failed to initialize hexglow runtime: {}", err);
            event_loop.exit();
            return;
        }

        self.start_watchers();

        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_shortcut(event_loop, &event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                if let Some(engine) = self.engine.as_mut() {
                    engine.on_pointer_leave();
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.on_click(event_loop),
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.rescale(scale_factor);
            }
            WindowEvent::Occluded(occluded) => {
                debug!("window occluded: {}", occluded);
                self.clock.set_paused(occluded, Instant::now());
            }
            WindowEvent::RedrawRequested => self.render(event_loop),
            _ => {}
        }
    }

    // Drains commands and schedules the next frame.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.process_commands(event_loop);
        if self.shutdown_done {
            return;
        }

        if !self.render_requested {
            let tick = self.clock.tick(Instant::now());
            if tick.should_render {
                self.render_requested = true;
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
        }

        let deadline = if self.clock.paused() {
            Instant::now() + Duration::from_millis(250)
        } else {
            self.clock.next_deadline()
        };
        event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.theme_watch = None;
        self.config_watch = None;
    }
}

/// Opens the backdrop window and blocks until it closes
pub fn run(options: RunOptions) -> Result<(), String> {
    logging::init_logger();

    let event_loop = EventLoop::new().map_err(|err| err.to_string())?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut runtime = HexglowRuntime::new(options);

    event_loop
        .run_app(&mut runtime)
        .map_err(|err| err.to_string())
}

fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| *f == wgpu::TextureFormat::Bgra8UnormSrgb)
        .or_else(|| formats.iter().copied().find(|f| f.is_srgb()))
        .or_else(|| formats.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_bgra_srgb() {
        let formats = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
    }

    #[test]
    fn test_falls_back_to_any_srgb_then_first() {
        let formats = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&[wgpu::TextureFormat::Rgba16Float]),
            Some(wgpu::TextureFormat::Rgba16Float)
        );
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn test_run_options_defaults() {
        let options = RunOptions::new(IconCatalog::new());
        assert_eq!(options.fps, 60.0);
        assert!(options.theme.is_none());
        assert!(options.catalog.is_empty());
    }
}

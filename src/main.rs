//! SOFA scene viewer
//!
//! Runs a SOFA scene with a splash overlay and exits on Escape.

use std::time::Duration;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::WindowId,
};

use sofa_core::SimulationEngine;
use sofa_viewer::{
    config::AppConfig,
    error::AppError,
    input::{InputAction, InputMapper},
    startup::{engine_root, initialize_engine, preview_engine},
    systems::{FrameLoop, LoopHost, RenderSystem, SimulationSystem, WindowSystem},
};

/// Window-side application state, driven by winit callbacks
struct App {
    /// Application configuration
    config: AppConfig,
    engine: Box<dyn SimulationEngine>,
    // Released before the window
    render: Option<RenderSystem>,
    window: Option<WindowSystem>,
    /// Actions mapped from input since the last poll
    actions: Vec<InputAction>,
    /// Fatal error raised inside an event callback
    error: Option<AppError>,
}

impl App {
    fn new(config: AppConfig, engine: Box<dyn SimulationEngine>) -> Self {
        Self {
            config,
            engine,
            render: None,
            window: None,
            actions: Vec::new(),
            error: None,
        }
    }

    fn display_ready(&self) -> bool {
        self.render.is_some()
    }

    /// Open the window and present the splash frame
    fn init_display(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = WindowSystem::create(event_loop, &self.config.window)?;
        let render = RenderSystem::init_display(
            window.window().clone(),
            &self.config,
            self.engine.as_mut(),
        )?;
        self.window = Some(window);
        self.render = Some(render);
        Ok(())
    }

    fn take_error(&mut self) -> Result<(), AppError> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }

        if let Err(e) = self.init_display(event_loop) {
            self.error = Some(e);
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(action) = InputMapper::map_physical_key(event.physical_key, event.state) {
                    self.actions.push(action);
                }
            }

            WindowEvent::CloseRequested => {
                log::debug!("Close request ignored, press Escape to exit");
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(render) = &mut self.render {
                    render.resize(physical_size.width, physical_size.height);
                }
            }

            _ => {}
        }
    }
}

/// The event loop together with the state its callbacks mutate
struct Viewer {
    event_loop: EventLoop<()>,
    app: App,
}

impl Viewer {
    /// Pump events until the display is up; false if the event loop exited
    fn wait_for_display(&mut self) -> Result<bool, AppError> {
        // Window creation and the splash frame happen on the first resume
        while !self.app.display_ready() {
            let status = self.event_loop.pump_app_events(None, &mut self.app);
            self.app.take_error()?;
            if let PumpStatus::Exit(code) = status {
                log::info!("Event loop exited with code {} during startup", code);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl LoopHost for Viewer {
    fn engine(&mut self) -> &mut dyn SimulationEngine {
        self.app.engine.as_mut()
    }

    fn render(&mut self) -> Result<(), AppError> {
        if let Some(render) = &mut self.app.render {
            render.render_frame(self.app.engine.as_ref())?;
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Result<Vec<InputAction>, AppError> {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app);
        self.app.take_error()?;

        let mut actions = std::mem::take(&mut self.app.actions);
        if let PumpStatus::Exit(code) = status {
            log::info!("Event loop exited with code {}", code);
            actions.push(InputAction::Exit);
        }
        Ok(actions)
    }
}

fn init_logging(config: &AppConfig) {
    let env = env_logger::Env::default().default_filter_or(config.debug.log_level.as_str());
    env_logger::Builder::from_env(env).init();
}

fn run(config: AppConfig) -> Result<(), AppError> {
    let root = engine_root(&config.engine.root_env)?;
    log::info!("Engine root: {}", root.display());

    let mut engine = preview_engine(&config, &root);
    initialize_engine(&mut engine, &config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut viewer = Viewer {
        event_loop,
        app: App::new(config, Box::new(engine)),
    };

    let mut frame_loop = FrameLoop::new();
    if !viewer.wait_for_display()? {
        return Ok(());
    }
    frame_loop.initialized();
    for action in std::mem::take(&mut viewer.app.actions) {
        frame_loop.handle_action(action);
    }

    let mut simulation = SimulationSystem::new();
    frame_loop.run(&mut simulation, &mut viewer)?;

    log::info!(
        "Leaving main loop after {} iterations ({} simulation steps)",
        frame_loop.iterations(),
        simulation.steps()
    );
    Ok(())
}

fn main() {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    init_logging(&config);
    log::info!("Starting SOFA scene viewer");

    if let Err(e) = run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

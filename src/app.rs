use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::AppConfig;
use crate::controls::{Intent, collect_intents};
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::renderer::Renderer;
use crate::scene::Scene;

/// Opens the window and runs the demo until it is closed.
///
/// Returns the error that stopped the event loop, if any. Startup failures
/// (no adapter, bad shaders, an unusable shadow map) end up here.
///
/// # Example
/// ```no_run
/// use courtlight::{AppConfig, run};
///
/// run(AppConfig::new().title("Court").shadow_map_size(1024)).unwrap();
/// ```
pub fn run(config: AppConfig) -> Result<(), RenderError> {
    let event_loop = EventLoop::new().map_err(|err| RenderError::EventLoop(err.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = CourtApp::Pending { config };
    event_loop
        .run_app(&mut app)
        .map_err(|err| RenderError::EventLoop(err.to_string()))?;

    match app {
        CourtApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum CourtApp {
    Pending { config: AppConfig },
    Running(Box<Running>),
    Failed(RenderError),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    scene: Scene,
    input: Input,
    start_time: Instant,
    last_frame: Instant,
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, RenderError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|err| RenderError::Window(err.to_string()))?,
        );

        let gpu = GpuContext::new(window.clone())?;
        let mut renderer = Renderer::new(&gpu, &config.shaders, config.light.shadow_map_size)?;
        let mut scene = Scene::new(&mut renderer.uploader(&gpu), config);
        scene.resize(gpu.width(), gpu.height());

        let now = Instant::now();
        Ok(Self {
            window,
            gpu,
            renderer,
            scene,
            input: Input::new(),
            start_time: now,
            last_frame: now,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RenderError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let intents = collect_intents(&self.input, self.scene.camera_config(), dt);
        if intents.contains(&Intent::Quit) {
            event_loop.exit();
            return Ok(());
        }
        for intent in intents {
            self.scene.apply(intent);
        }

        self.scene.advance(self.start_time.elapsed().as_secs_f32());
        let plan = self.scene.plan_frame();
        self.renderer.render(&self.gpu, &plan)?;

        self.input.begin_frame();
        self.window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for CourtApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let CourtApp::Pending { config } = self else {
            return;
        };

        *self = match Running::start(event_loop, config) {
            Ok(running) => CourtApp::Running(Box::new(running)),
            Err(err) => {
                log::error!("startup failed: {err}");
                event_loop.exit();
                CourtApp::Failed(err)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let CourtApp::Running(running) = self else {
            return;
        };

        running.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    running.gpu.resize(size.width, size.height);
                    running.scene.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = running.redraw(event_loop) {
                    log::error!("render failed: {err}");
                    event_loop.exit();
                    *self = CourtApp::Failed(err);
                }
            }
            _ => (),
        }
    }
}

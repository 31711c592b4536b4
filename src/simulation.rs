//! Swarm builder and window runner.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    event::{MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::KeyCode,
    window::{Window, WindowId},
};

use crate::error::SwarmError;
use crate::gpu::{Camera, GpuState, SceneSettings};
use crate::input::Input;
use crate::kernel::SimParams;
use crate::mesh::Mesh;
use crate::pointer::PointerProjector;
use crate::sampler::OriginTexture;
use crate::state::GridSize;
use crate::textures::RoomTextures;
use crate::time::Time;
use crate::uniforms::FrameContext;
use crate::visuals::{Lighting, Shading, ShadowSettings};

/// Glyph height used by [`Swarm::with_text`].
pub const TEXT_SIZE: f32 = 1.0;
/// Extrusion depth used by [`Swarm::with_text`].
pub const TEXT_DEPTH: f32 = 0.25;

/// A particle swarm builder.
///
/// Use method chaining to configure, then call `.run()` to open a window.
///
/// ```ignore
/// Swarm::new()
///     .with_text("RUST")
///     .with_grid(512, 512)
///     .run()?;
/// ```
pub struct Swarm {
    grid: GridSize,
    mesh: Option<Mesh>,
    seed: Option<u64>,
    params: SimParams,
    shading: Shading,
    shadow: ShadowSettings,
    lighting: Lighting,
    pointer_radius: f32,
    fixed_delta: Option<f32>,
    room: RoomTextures,
    title: String,
}

impl Swarm {
    /// Create a new swarm with default settings and no shape.
    pub fn new() -> Self {
        Self {
            grid: GridSize::default(),
            mesh: None,
            seed: None,
            params: SimParams::default(),
            shading: Shading::default(),
            shadow: ShadowSettings::default(),
            lighting: Lighting::default(),
            pointer_radius: 0.2,
            fixed_delta: None,
            room: RoomTextures::default(),
            title: "shapeswarm".to_string(),
        }
    }

    /// Particle grid size. The particle count is `width * height`.
    pub fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.grid = GridSize::new(width, height);
        self
    }

    /// Target shape. The mesh is used as given; call [`Mesh::center`]
    /// first to put it on the origin.
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Target shape from extruded block letters, centered on the origin.
    pub fn with_text(mut self, text: &str) -> Self {
        self.mesh = Some(text_mesh(text));
        self
    }

    /// Seed the surface sampler for a reproducible origin texture.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_params(mut self, params: SimParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_shadow(mut self, shadow: ShadowSettings) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn with_lighting(mut self, lighting: Lighting) -> Self {
        self.lighting = lighting;
        self
    }

    /// Radius around the cursor inside which particles are pushed away.
    pub fn with_pointer_radius(mut self, radius: f32) -> Self {
        self.pointer_radius = radius.max(0.0);
        self
    }

    /// Advance the clock by `seconds` every frame instead of wall time,
    /// so runs replay the same phases.
    pub fn with_fixed_delta(mut self, seconds: f32) -> Self {
        self.fixed_delta = Some(seconds.max(0.0));
        self
    }

    pub fn with_room_textures(mut self, room: RoomTextures) -> Self {
        self.room = room;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Sample the target shape into an origin texture.
    pub fn build_origin(&self) -> Result<OriginTexture, SwarmError> {
        let mesh = self.mesh.as_ref().ok_or(SwarmError::NoShape)?;
        let origin = match self.seed {
            Some(seed) => {
                let mut rng = SmallRng::seed_from_u64(seed);
                OriginTexture::from_mesh_with_rng(mesh, self.grid, &mut rng)
            }
            None => OriginTexture::from_mesh(mesh, self.grid),
        };
        Ok(origin)
    }

    /// Run the swarm. Blocks until the window is closed.
    ///
    /// GPU initialization failures end the loop and are returned here.
    pub fn run(self) -> Result<(), SwarmError> {
        let origin = self.build_origin()?;
        log::info!(
            "sampled {} particles from {} triangles",
            self.grid.count(),
            self.mesh.as_ref().map_or(0, Mesh::len)
        );

        let settings = SceneSettings {
            params: self.params,
            shading: self.shading,
            shadow: self.shadow,
            lighting: self.lighting,
            room: self.room,
        };

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(origin, settings, self.pointer_radius, self.fixed_delta, self.title);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Swarm {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    /// Consumed when the GPU state is built.
    pending: Option<(OriginTexture, SceneSettings)>,
    params: SimParams,
    title: String,
    camera: Camera,
    input: Input,
    time: Time,
    pointer: PointerProjector,
    error: Option<SwarmError>,
}

impl App {
    fn new(
        origin: OriginTexture,
        settings: SceneSettings,
        pointer_radius: f32,
        fixed_delta: Option<f32>,
        title: String,
    ) -> Self {
        let mut time = Time::new();
        time.set_fixed_delta(fixed_delta);
        Self {
            window: None,
            gpu_state: None,
            params: settings.params,
            pending: Some((origin, settings)),
            title,
            camera: Camera::new(),
            input: Input::new(),
            time,
            pointer: PointerProjector::new(pointer_radius),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SwarmError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        if let Some((origin, settings)) = self.pending.take() {
            let gpu_state = pollster::block_on(GpuState::new(window, &origin, settings))?;
            self.gpu_state = Some(gpu_state);
        }
        Ok(())
    }

    /// Build this frame's context from the clock, camera and cursor.
    fn frame_context(&mut self, viewport: (u32, u32), pixel_ratio: f32) -> FrameContext {
        let (elapsed, _delta) = self.time.update();

        if let Some(ndc) = self.input.mouse_ndc() {
            self.pointer.set_cursor(ndc);
        }

        let aspect = viewport.0.max(1) as f32 / viewport.1.max(1) as f32;
        let view = self.camera.view_matrix();
        let proj = self.camera.projection(aspect);
        let pointer = self.pointer.update(proj * view);

        FrameContext {
            phase: self.params.phase(elapsed),
            pointer,
            view,
            proj,
            viewport,
            pixel_ratio,
            advance: !self.time.is_paused(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Space) {
            self.time.toggle_pause();
            log::info!("simulation {}", if self.time.is_paused() { "paused" } else { "resumed" });
        }
        if self.input.mouse_held(MouseButton::Left) {
            let delta = self.input.mouse_delta();
            self.camera.orbit(delta.x, delta.y);
        }

        let pixel_ratio = self.window.as_ref().map_or(1.0, |w| w.scale_factor() as f32);
        let Some(viewport) = self.gpu_state.as_ref().map(GpuState::viewport) else {
            return;
        };
        let ctx = self.frame_context(viewport, pixel_ratio);
        self.input.begin_frame();

        if let Some(gpu_state) = &mut self.gpu_state {
            match gpu_state.render(&ctx) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => gpu_state.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                Err(e) => log::error!("frame skipped: {:?}", e),
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { .. } if self.input.key_pressed(KeyCode::Escape) => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.input
                    .set_window_size(physical_size.width, physical_size.height);
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Centered block text mesh, as used by [`Swarm::with_text`].
pub fn text_mesh(text: &str) -> Mesh {
    let mut mesh = Mesh::block_text(text, TEXT_SIZE, TEXT_DEPTH);
    mesh.center();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_run_without_shape_fails() {
        let swarm = Swarm::new();
        assert!(matches!(swarm.build_origin(), Err(SwarmError::NoShape)));
    }

    #[test]
    fn test_seeded_origin_is_reproducible() {
        let swarm = Swarm::new().with_text("HI").with_grid(8, 8).with_seed(7);
        let a = swarm.build_origin().map(|o| o.texels().to_vec()).ok();
        let b = swarm.build_origin().map(|o| o.texels().to_vec()).ok();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_is_centered() {
        let mesh = text_mesh("RUST");
        let (min, max) = mesh.bounds().unwrap_or((Vec3::ONE, Vec3::ONE));
        assert!(((min + max) * 0.5).length() < 1e-5);
        assert!((max.y - min.y - TEXT_SIZE).abs() < 1e-5);
    }

    #[test]
    fn test_fixed_delta_drives_clock() {
        let swarm = Swarm::new().with_text("A").with_grid(2, 2).with_fixed_delta(0.5);
        assert_eq!(swarm.fixed_delta, Some(0.5));

        let origin = swarm.build_origin().unwrap();
        let mut app = App::new(
            origin,
            SceneSettings::default(),
            swarm.pointer_radius,
            swarm.fixed_delta,
            "test".to_string(),
        );
        app.time.update();
        let (elapsed, delta) = app.time.update();
        assert_eq!((elapsed, delta), (1.0, 0.5));
        assert_eq!(swarm.params.phase(elapsed), 0.75);
    }

    #[test]
    fn test_pointer_radius_not_negative() {
        let swarm = Swarm::new().with_pointer_radius(-1.0);
        assert_eq!(swarm.pointer_radius, 0.0);
    }
}

//! GPU rendering system
//!
//! Manages GPU rendering including:
//! - Render context and surface
//! - Overlay and mesh pipelines
//! - The startup splash frame and per-frame rendering

use std::sync::Arc;
use winit::window::Window;
use sofa_core::{EngineError, SimulationEngine};
use sofa_math::mat4::{self, Mat4};
use sofa_render::{
    context::{ContextError, RenderContext},
    frame::{overlay_projection, scene_projection},
    pipeline::{LightingSettings, MeshPipeline, OverlayPipeline},
    ClearFlags, ImageOverlay, ProjectionSettings, RenderState, TextureError,
};
use crate::config::AppConfig;

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// GPU device or surface could not be created
    Context(ContextError),
    /// The overlay image could not be loaded
    Texture(TextureError),
    /// The engine failed to prepare its visuals
    Engine(EngineError),
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// No surface texture became available in time
    Timeout,
    /// GPU out of memory
    OutOfMemory,
    /// Other surface error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Context(e) => write!(f, "GPU initialization failed: {}", e),
            RenderError::Texture(e) => write!(f, "Overlay failed: {}", e),
            RenderError::Engine(e) => write!(f, "Visual initialization failed: {}", e),
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::Timeout => write!(f, "Surface timed out"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Context(e) => Some(e),
            RenderError::Texture(e) => Some(e),
            RenderError::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ContextError> for RenderError {
    fn from(e: ContextError) -> Self {
        RenderError::Context(e)
    }
}

impl From<TextureError> for RenderError {
    fn from(e: TextureError) -> Self {
        RenderError::Texture(e)
    }
}

impl From<EngineError> for RenderError {
    fn from(e: EngineError) -> Self {
        RenderError::Engine(e)
    }
}

/// How a frame whose surface could not be acquired is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRecovery {
    /// Reconfigure the surface and skip the frame
    Reconfigure,
    /// Skip the frame
    Skip,
}

impl SurfaceRecovery {
    /// Recovery for a presentation error, `None` when it is fatal
    pub fn for_error(error: &RenderError) -> Option<Self> {
        match error {
            RenderError::SurfaceLost => Some(SurfaceRecovery::Reconfigure),
            RenderError::Timeout => Some(SurfaceRecovery::Skip),
            _ => None,
        }
    }
}

/// Per-frame drawing parameters taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct FrameSettings {
    pub clear_color: [f32; 4],
    pub projection: ProjectionSettings,
    pub lighting: LightingSettings,
}

impl FrameSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            clear_color: config.rendering.clear_color,
            projection: ProjectionSettings {
                fov_degrees: config.projection.fov,
                near: config.projection.near,
                far: config.projection.far,
            },
            lighting: LightingSettings {
                ambient: config.rendering.ambient_strength,
                diffuse: config.rendering.diffuse_strength,
            },
        }
    }
}

/// Modelview for the scene phase: identity times the camera's view, or
/// identity alone when the scene has no camera
pub fn scene_modelview(camera_view: Option<Mat4>) -> Mat4 {
    match camera_view {
        Some(view) => mat4::mul(mat4::IDENTITY, view),
        None => mat4::IDENTITY,
    }
}

/// Manages GPU rendering
pub struct RenderSystem {
    context: RenderContext,
    overlay_pipeline: OverlayPipeline,
    mesh_pipeline: MeshPipeline,
    overlay: ImageOverlay,
    settings: FrameSettings,
    frames: u64,
}

impl RenderSystem {
    /// Initialize the display and present the splash frame
    ///
    /// Creates the GPU context, loads the overlay and draws it once over a
    /// cleared background, then initializes the engine's visuals and uploads
    /// their meshes. Runs once, before the main loop.
    pub fn init_display(
        window: Arc<Window>,
        config: &AppConfig,
        engine: &mut dyn SimulationEngine,
    ) -> Result<Self, RenderError> {
        let context = pollster::block_on(RenderContext::new(window, config.window.vsync))?;

        let mut overlay_pipeline = OverlayPipeline::new(&context.device, context.config.format);
        let mut mesh_pipeline = MeshPipeline::new(&context.device, context.config.format);
        mesh_pipeline.ensure_depth_texture(
            &context.device,
            context.config.width,
            context.config.height,
        );

        let [x, y] = config.overlay.position;
        let overlay = {
            let mut backend = overlay_pipeline.frame(&context.device, &context.queue);
            let overlay = ImageOverlay::load(x, y, &config.overlay.image_path, &mut backend)?;
            overlay.draw(&mut backend);
            overlay
        };

        engine.init_visual()?;

        // Upload every visual now; the splash frame itself shows only the overlay
        engine.draw(&mut mesh_pipeline.frame(&context.device));
        mesh_pipeline.discard_queued();
        log::info!("Uploaded {} visual models", mesh_pipeline.uploaded_meshes());

        let settings = FrameSettings::from_config(config);
        let projection = scene_projection(&settings.projection, context.config.width, context.config.height);
        mesh_pipeline.prepare(&context.queue, mat4::IDENTITY, projection, RenderState::SCENE, settings.lighting);

        let mut system = Self {
            context,
            overlay_pipeline,
            mesh_pipeline,
            overlay,
            settings,
            frames: 0,
        };
        system.present_or_recover()?;
        log::info!("Display initialized");

        Ok(system)
    }

    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(winit::dpi::PhysicalSize::new(width, height));
        self.mesh_pipeline
            .ensure_depth_texture(&self.context.device, self.context.config.width, self.context.config.height);
    }

    /// Render one frame: overlay in pixel space, then the engine's scene
    pub fn render_frame(&mut self, engine: &dyn SimulationEngine) -> Result<(), RenderError> {
        let ctx = &self.context;
        self.overlay
            .draw(&mut self.overlay_pipeline.frame(&ctx.device, &ctx.queue));

        let view = scene_modelview(engine.camera_view_matrix());
        engine.draw(&mut self.mesh_pipeline.frame(&ctx.device));

        let projection = scene_projection(&self.settings.projection, ctx.config.width, ctx.config.height);
        self.mesh_pipeline.prepare(
            &ctx.queue,
            view,
            projection,
            RenderState::SCENE,
            self.settings.lighting,
        );

        self.present_or_recover()
    }

    /// Present, reconfiguring a lost or outdated surface and skipping the
    /// frame when the surface is unavailable
    fn present_or_recover(&mut self) -> Result<(), RenderError> {
        let Err(error) = self.present() else {
            return Ok(());
        };
        match SurfaceRecovery::for_error(&error) {
            Some(SurfaceRecovery::Reconfigure) => {
                log::warn!("{}, reconfiguring", error);
                self.overlay_pipeline.discard_pending();
                self.context.reconfigure();
                Ok(())
            }
            Some(SurfaceRecovery::Skip) => {
                log::warn!("{}, skipping frame", error);
                self.overlay_pipeline.discard_pending();
                Ok(())
            }
            None => Err(error),
        }
    }

    /// Encode queued overlay and mesh draws into one pass and present it
    fn present(&mut self) -> Result<(), RenderError> {
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                return Err(RenderError::SurfaceLost);
            }
            Err(wgpu::SurfaceError::Timeout) => return Err(RenderError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(e.to_string())),
        };

        let ctx = &self.context;
        self.overlay_pipeline.prepare(
            &ctx.device,
            &ctx.queue,
            overlay_projection(ctx.config.width, ctx.config.height),
        );

        let Some(depth_view) = self.mesh_pipeline.depth_view() else {
            return Err(RenderError::Other("depth texture not created".to_string()));
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let clear = ClearFlags::ALL;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: clear.color_load(self.settings.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: clear.depth_load(),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.overlay_pipeline.draw(&mut pass);
            self.mesh_pipeline.draw(&mut pass);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.frames += 1;
        log::trace!("presented frame {}", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sofa_math::Vec3;

    #[test]
    fn test_render_error_display() {
        assert_eq!(format!("{}", RenderError::SurfaceLost), "Surface lost");
        assert_eq!(format!("{}", RenderError::OutOfMemory), "Out of memory");
        assert_eq!(
            format!("{}", RenderError::Other("test".to_string())),
            "Render error: test"
        );
    }

    #[test]
    fn test_render_error_from_engine() {
        let err: RenderError = EngineError::NotInitialized.into();
        assert!(matches!(err, RenderError::Engine(EngineError::NotInitialized)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_render_error_from_texture() {
        let err: RenderError = TextureError::Empty.into();
        assert_eq!(err.to_string(), "Overlay failed: Image has zero width or height");
    }

    #[test]
    fn test_surface_recovery() {
        assert_eq!(
            SurfaceRecovery::for_error(&RenderError::SurfaceLost),
            Some(SurfaceRecovery::Reconfigure)
        );
        assert_eq!(
            SurfaceRecovery::for_error(&RenderError::Timeout),
            Some(SurfaceRecovery::Skip)
        );
        assert_eq!(SurfaceRecovery::for_error(&RenderError::OutOfMemory), None);
        assert_eq!(
            SurfaceRecovery::for_error(&RenderError::Other("validation".to_string())),
            None
        );
    }

    #[test]
    fn test_frame_settings_from_config() {
        let settings = FrameSettings::from_config(&AppConfig::default());
        assert_eq!(settings.clear_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(settings.projection, ProjectionSettings::default());
        assert_eq!(settings.lighting, LightingSettings::default());
    }

    #[test]
    fn test_modelview_without_camera_is_identity() {
        assert_eq!(scene_modelview(None), mat4::IDENTITY);
    }

    #[test]
    fn test_modelview_uses_camera_view() {
        let view = mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(scene_modelview(Some(view)), view);
    }
}

//! Main engine entry point.

use super::{Context, ContextError, RenderConfig, Renderer};
use crate::camera::PerspectiveCamera;
use crate::postprocessing::EffectComposer;
use crate::scene::Scene;

/// The main Fathom engine.
/// Owns the rendering context and the renderer, and drives frames.
pub struct Engine {
    /// The wgpu context.
    pub context: Context,
    /// The renderer.
    pub renderer: Renderer,
}

impl Engine {
    /// Create a new engine from a window handle.
    ///
    /// # Arguments
    /// * `window` - A window handle (e.g., from winit or web_sys::HtmlCanvasElement)
    /// * `width` - Initial width in pixels
    /// * `height` - Initial height in pixels
    ///
    /// # Safety
    /// The window must outlive the engine.
    pub async fn new<W>(window: W, width: u32, height: u32) -> Result<Self, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        Self::with_config(window, width, height, RenderConfig::default()).await
    }

    /// Create a new engine with custom configuration.
    pub async fn with_config<W>(
        window: W,
        width: u32,
        height: u32,
        config: RenderConfig,
    ) -> Result<Self, ContextError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        let context = Context::new(window, width, height, &config).await?;
        let renderer = Renderer::new(
            context.gpu.clone(),
            context.surface_format,
            width,
            height,
        );

        Ok(Self { context, renderer })
    }

    /// Create a new engine rendering into an HTML canvas.
    ///
    /// `width` and `height` are physical pixels (canvas CSS size times
    /// the device pixel ratio).
    #[cfg(all(feature = "web", target_arch = "wasm32"))]
    pub async fn from_canvas(
        canvas: web_sys::HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<Self, ContextError> {
        Self::new(wgpu::SurfaceTarget::Canvas(canvas), width, height).await
    }

    /// Handle resize. `width` and `height` are physical pixels, so the
    /// caller multiplies CSS size by the device pixel ratio. Composer
    /// and pass dimensions are updated through
    /// [`EffectComposer::set_size`] by the same handler.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 && (width != self.context.width || height != self.context.height)
        {
            self.context.resize(width, height);
            self.renderer.resize(width, height);
        }
    }

    /// Get current width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.context.width
    }

    /// Get current height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.context.height
    }

    /// Get aspect ratio.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.context.aspect_ratio()
    }

    /// Get the surface format.
    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.context.surface_format
    }

    /// Get the device.
    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.context.gpu.device
    }

    /// Get the queue.
    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.gpu.queue
    }

    /// Render one frame through a post-processing pipeline.
    pub fn render(
        &mut self,
        composer: &mut EffectComposer,
        scene: &mut Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), wgpu::SurfaceError> {
        scene.update_world_matrices();

        let output = self.context.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.begin_frame(view);
        composer.render(&mut self.renderer, scene, camera);
        self.renderer.end_frame();

        output.present();
        Ok(())
    }
}

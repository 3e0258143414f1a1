//! Effect composer for managing the post-processing pipeline.

use super::pass::{FrameContext, Pass};
use crate::camera::PerspectiveCamera;
use crate::core::{RenderTarget, SceneRenderer};
use crate::scene::Scene;

/// Manages an ordered chain of post-processing passes over two
/// ping-pong render targets.
///
/// Each enabled pass reads the previous stage's output from the read
/// buffer and writes into the write buffer; the buffers swap after the
/// pass unless it opts out via [`Pass::needs_swap`]. The final enabled
/// pass renders to the display surface when `render_to_screen` is set.
pub struct EffectComposer {
    /// Render passes in order.
    passes: Vec<Box<dyn Pass>>,
    /// Ping-pong render targets.
    targets: [RenderTarget; 2],
    /// Index of the current read target.
    read_index: usize,
    /// Whether the last enabled pass outputs to the display surface.
    render_to_screen: bool,
    /// Width of render targets in physical pixels.
    width: u32,
    /// Height of render targets in physical pixels.
    height: u32,
}

impl EffectComposer {
    /// Create a new effect composer. Dimensions are physical pixels
    /// (CSS size x device pixel ratio).
    pub fn new(width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            passes: Vec::new(),
            targets: [
                RenderTarget::new("Composer Target A", width, height, format),
                RenderTarget::new("Composer Target B", width, height, format),
            ],
            read_index: 0,
            render_to_screen: true,
            width,
            height,
        }
    }

    /// Add a pass to the end of the chain.
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Remove a pass by name.
    pub fn remove_pass(&mut self, name: &str) -> Option<Box<dyn Pass>> {
        let idx = self.passes.iter().position(|p| p.name() == name)?;
        Some(self.passes.remove(idx))
    }

    /// Get a pass by name.
    pub fn pass(&self, name: &str) -> Option<&dyn Pass> {
        self.passes
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Get a pass by name, downcast to its concrete type. Used by
    /// external tuning code to reach pass fields between frames.
    pub fn pass_mut<T: Pass + 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.passes
            .iter_mut()
            .find(|p| p.name() == name)
            .and_then(|p| p.as_any_mut().downcast_mut::<T>())
    }

    /// Set whether the final enabled pass renders to the display
    /// surface (default) or stays in the write buffer.
    pub fn set_render_to_screen(&mut self, render_to_screen: bool) {
        self.render_to_screen = render_to_screen;
    }

    /// Get the ping-pong target dimensions.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resize the ping-pong targets and every pass. Dimensions are
    /// physical pixels; disabled passes are resized too, so re-enabling
    /// one never draws through a stale-sized buffer.
    pub fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        for target in &mut self.targets {
            target.set_size(width, height);
        }
        for pass in &mut self.passes {
            pass.resize(width, height);
        }
    }

    /// Run all enabled passes in order.
    pub fn render(
        &mut self,
        renderer: &mut dyn SceneRenderer,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        let Some(last_enabled) = self.passes.iter().rposition(|p| p.enabled()) else {
            return;
        };
        let frame = FrameContext { scene, camera };
        let render_to_screen = self.render_to_screen;

        let Self {
            passes,
            targets,
            read_index,
            ..
        } = self;

        for (index, pass) in passes.iter_mut().enumerate() {
            if !pass.enabled() {
                continue;
            }
            let to_screen = render_to_screen && index == last_enabled;
            let (read, write) = split_targets(targets, *read_index);
            pass.render(renderer, &frame, read, write, to_screen);
            if pass.needs_swap() {
                *read_index = 1 - *read_index;
            }
        }
    }
}

/// Borrow the read and write targets simultaneously.
fn split_targets(
    targets: &mut [RenderTarget; 2],
    read_index: usize,
) -> (&mut RenderTarget, &mut RenderTarget) {
    let (a, b) = targets.split_at_mut(1);
    if read_index == 0 {
        (&mut a[0], &mut b[0])
    } else {
        (&mut b[0], &mut a[0])
    }
}

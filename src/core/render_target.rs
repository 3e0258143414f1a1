//! Off-screen render targets.

use super::Id;
use std::sync::Arc;

/// GPU textures backing a [`RenderTarget`]: a color attachment plus a
/// depth attachment for scene draws into the target.
pub struct TargetTexture {
    /// The color texture.
    pub color: wgpu::Texture,
    /// Color texture view.
    pub color_view: wgpu::TextureView,
    /// The depth texture.
    pub depth: wgpu::Texture,
    /// Depth texture view.
    pub depth_view: wgpu::TextureView,
}

/// An off-screen render target.
///
/// Dimensions are plain settable state: an external resize handler
/// updates them between frames and the GPU textures are reallocated the
/// next time the renderer binds the target. Nothing here touches the
/// device until then, so targets can be created and resized without one.
pub struct RenderTarget {
    id: Id,
    label: &'static str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    gpu: Option<Arc<TargetTexture>>,
}

impl RenderTarget {
    /// Create a new render target. Zero dimensions are clamped to 1.
    pub fn new(label: &'static str, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            id: Id::new(),
            label,
            width: width.max(1),
            height: height.max(1),
            format,
            gpu: None,
        }
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the pixel dimensions.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the color format.
    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Set the pixel dimensions. The backing textures are dropped and
    /// reallocated at the next bind; until then no GPU work happens.
    pub fn set_size(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.gpu = None;
        }
    }

    /// Get the backing textures, if allocated.
    #[inline]
    pub fn texture(&self) -> Option<&Arc<TargetTexture>> {
        self.gpu.as_ref()
    }

    /// Allocate the backing textures if they are missing or stale.
    pub fn ensure_allocated(&mut self, device: &wgpu::Device) -> &Arc<TargetTexture> {
        if self.gpu.is_none() {
            let size = wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            };
            let color = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(self.label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: self.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            let depth = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(self.label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Depth32Float,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
            let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
            self.gpu = Some(Arc::new(TargetTexture {
                color,
                color_view,
                depth,
                depth_view,
            }));
        }
        self.gpu.as_ref().unwrap()
    }
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("allocated", &self.gpu.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_size_drops_stale_textures() {
        let mut target =
            RenderTarget::new("Test Target", 640, 480, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(target.size(), (640, 480));
        assert!(target.texture().is_none());

        target.set_size(320, 240);
        assert_eq!(target.size(), (320, 240));
        assert!(target.texture().is_none());
    }

    #[test]
    fn test_zero_dimensions_clamped() {
        let mut target = RenderTarget::new("Test Target", 0, 0, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(target.size(), (1, 1));
        target.set_size(0, 7);
        assert_eq!(target.size(), (1, 7));
    }
}

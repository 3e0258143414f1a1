//! GPU geometry buffers.

use super::Vertex;
use crate::core::Id;
use wgpu::util::DeviceExt;

/// Geometry data held in GPU buffers.
///
/// A geometry without buffers is legal (the renderer skips it), which
/// keeps scene construction independent of device availability.
pub struct BufferGeometry {
    /// Unique ID.
    id: Id,
    /// Vertex buffer.
    vertex_buffer: Option<wgpu::Buffer>,
    /// Index buffer.
    index_buffer: Option<wgpu::Buffer>,
    /// Number of vertices.
    vertex_count: u32,
    /// Number of indices.
    index_count: u32,
}

impl Default for BufferGeometry {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferGeometry {
    /// Create an empty geometry.
    pub fn new() -> Self {
        Self {
            id: Id::new(),
            vertex_buffer: None,
            index_buffer: None,
            vertex_count: 0,
            index_count: 0,
        }
    }

    /// Create geometry from vertex data.
    pub fn from_vertices(device: &wgpu::Device, vertices: &[Vertex]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            id: Id::new(),
            vertex_buffer: Some(vertex_buffer),
            index_buffer: None,
            vertex_count: vertices.len() as u32,
            index_count: 0,
        }
    }

    /// Create indexed geometry from vertex and index data.
    pub fn from_indexed(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let mut geometry = Self::from_vertices(device, vertices);
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        geometry.index_buffer = Some(index_buffer);
        geometry.index_count = indices.len() as u32;
        geometry
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the vertex buffer.
    #[inline]
    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.vertex_buffer.as_ref()
    }

    /// Get the index buffer.
    #[inline]
    pub fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.index_buffer.as_ref()
    }

    /// Get the vertex count.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Get the index count.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Check if this geometry uses an index buffer.
    #[inline]
    pub fn has_indices(&self) -> bool {
        self.index_buffer.is_some()
    }
}

//! Scene graph nodes.

use super::Transform;
use crate::core::Id;
use crate::geometry::BufferGeometry;
use crate::material::MaterialRef;
use glam::Mat4;
use std::sync::{Arc, RwLock};

/// Shared handle to a scene object.
pub type ObjectHandle = Arc<RwLock<Object3D>>;

/// Drawable payload of a scene node: geometry plus the material the
/// renderer will use for the next draw.
///
/// `material` is the replaceable slot the depth pre-pass swaps;
/// `depth_material` is an optional per-node override used instead of
/// the shared depth material, and `skip_depth_of_field` opts the node
/// out of the swap entirely.
pub struct Drawable {
    /// Geometry data.
    pub geometry: Arc<BufferGeometry>,
    /// Current material.
    pub material: MaterialRef,
    /// Override material for the depth pre-pass.
    pub depth_material: Option<MaterialRef>,
    /// Excluded from depth-of-field processing.
    pub skip_depth_of_field: bool,
}

impl Drawable {
    /// Create a drawable with geometry and material.
    pub fn new(geometry: Arc<BufferGeometry>, material: MaterialRef) -> Self {
        Self {
            geometry,
            material,
            depth_material: None,
            skip_depth_of_field: false,
        }
    }

    /// Whether the depth pre-pass may swap this drawable's material.
    #[inline]
    pub fn eligible_for_depth_override(&self) -> bool {
        !self.skip_depth_of_field
    }
}

/// A node in the scene graph.
pub struct Object3D {
    /// Unique identifier.
    id: Id,
    /// Object name.
    name: String,
    /// Visibility flag.
    pub visible: bool,
    /// Transform component.
    transform: Transform,
    /// Child objects.
    children: Vec<ObjectHandle>,
    /// Drawable payload, if this node is renderable.
    drawable: Option<Drawable>,
}

impl Default for Object3D {
    fn default() -> Self {
        Self::new()
    }
}

impl Object3D {
    /// Create a new empty node.
    pub fn new() -> Self {
        Self {
            id: Id::new(),
            name: String::new(),
            visible: true,
            transform: Transform::new(),
            children: Vec::new(),
            drawable: None,
        }
    }

    /// Create a mesh node from geometry and material.
    pub fn mesh(geometry: Arc<BufferGeometry>, material: MaterialRef) -> Self {
        let mut object = Self::new();
        object.drawable = Some(Drawable::new(geometry, material));
        object
    }

    /// Wrap this node in a shared handle.
    pub fn into_handle(self) -> ObjectHandle {
        Arc::new(RwLock::new(self))
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the object name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the object name.
    #[inline]
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the transform.
    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Get mutable transform.
    #[inline]
    pub fn transform_mut(&mut self) -> &mut Transform {
        self.transform.mark_dirty();
        &mut self.transform
    }

    /// Get the drawable payload.
    #[inline]
    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }

    /// Get the mutable drawable payload.
    #[inline]
    pub fn drawable_mut(&mut self) -> Option<&mut Drawable> {
        self.drawable.as_mut()
    }

    /// Get children.
    #[inline]
    pub fn children(&self) -> &[ObjectHandle] {
        &self.children
    }

    /// Add a child.
    pub fn add(&mut self, child: ObjectHandle) {
        self.children.push(child);
    }

    /// Remove a child by ID.
    pub fn remove_by_id(&mut self, id: Id) -> Option<ObjectHandle> {
        let pos = self
            .children
            .iter()
            .position(|c| c.read().map(|guard| guard.id() == id).unwrap_or(false))?;
        Some(self.children.remove(pos))
    }

    /// Clear all children.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Update this node's world matrix and recurse into children.
    pub fn update_world_matrix(&mut self, parent_world: Option<&Mat4>) {
        self.transform.update_world_matrix(parent_world);
        let world = *self.transform.world_matrix();
        for child in &self.children {
            if let Ok(mut guard) = child.write() {
                guard.update_world_matrix(Some(&world));
            }
        }
    }
}

impl std::fmt::Debug for Object3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object3D")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("drawable", &self.drawable.is_some())
            .field("children", &self.children.len())
            .finish()
    }
}

//! Scene container - the root of the scene graph.

use super::{Object3D, ObjectHandle};
use crate::core::Id;
use crate::geometry::BufferGeometry;
use crate::material::MaterialRef;
use glam::Mat4;
use std::sync::Arc;

/// One scene draw: geometry, the material currently held by the node,
/// and its world matrix. Snapshotted at draw time so a renderer sees
/// exactly what each node holds at that moment.
pub struct DrawItem {
    /// Geometry data.
    pub geometry: Arc<BufferGeometry>,
    /// Material in effect for this draw.
    pub material: MaterialRef,
    /// World matrix.
    pub model: Mat4,
}

/// The scene - root container for all objects.
pub struct Scene {
    /// The root object.
    root: Object3D,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        let mut root = Object3D::new();
        root.set_name("Scene");
        Self { root }
    }

    /// Get the scene ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.root.id()
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: ObjectHandle) {
        self.root.add(object);
    }

    /// Remove an object from the scene by ID.
    pub fn remove(&mut self, id: Id) -> Option<ObjectHandle> {
        self.root.remove_by_id(id)
    }

    /// Clear all objects from the scene.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Get the top-level objects.
    #[inline]
    pub fn children(&self) -> &[ObjectHandle] {
        self.root.children()
    }

    /// Update all world matrices in the scene.
    pub fn update_world_matrices(&mut self) {
        self.root.update_world_matrix(None);
    }

    /// Visit every object in the scene read-only.
    pub fn traverse<F>(&self, mut callback: F)
    where
        F: FnMut(&Object3D),
    {
        for child in self.root.children() {
            Self::traverse_recursive(child, &mut callback);
        }
    }

    fn traverse_recursive<F>(handle: &ObjectHandle, callback: &mut F)
    where
        F: FnMut(&Object3D),
    {
        let Ok(guard) = handle.read() else { return };
        callback(&guard);
        for child in guard.children() {
            Self::traverse_recursive(child, callback);
        }
    }

    /// Visit every object in the scene with write access.
    ///
    /// Children are collected before the callback runs, so the callback
    /// may mutate the node (materials, flags) but structural edits only
    /// take effect on the next traversal.
    pub fn for_each_node<F>(&self, mut callback: F)
    where
        F: FnMut(&mut Object3D),
    {
        for child in self.root.children() {
            Self::for_each_node_recursive(child, &mut callback);
        }
    }

    fn for_each_node_recursive<F>(handle: &ObjectHandle, callback: &mut F)
    where
        F: FnMut(&mut Object3D),
    {
        let children: Vec<ObjectHandle> = {
            let Ok(guard) = handle.read() else { return };
            guard.children().to_vec()
        };
        if let Ok(mut guard) = handle.write() {
            callback(&mut guard);
        }
        for child in &children {
            Self::for_each_node_recursive(child, callback);
        }
    }

    /// Snapshot the drawable state of every visible node.
    pub fn collect_draws(&self) -> Vec<DrawItem> {
        let mut draws = Vec::new();
        self.traverse(|object| {
            if !object.visible {
                return;
            }
            if let Some(drawable) = object.drawable() {
                draws.push(DrawItem {
                    geometry: drawable.geometry.clone(),
                    material: drawable.material.clone(),
                    model: *object.transform().world_matrix(),
                });
            }
        });
        draws
    }

    /// Find an object by name.
    pub fn find_by_name(&self, name: &str) -> Option<ObjectHandle> {
        Self::find_recursive(self.root.children(), &mut |object| object.name() == name)
    }

    /// Find an object by ID.
    pub fn find_by_id(&self, id: Id) -> Option<ObjectHandle> {
        Self::find_recursive(self.root.children(), &mut |object| object.id() == id)
    }

    fn find_recursive(
        children: &[ObjectHandle],
        predicate: &mut impl FnMut(&Object3D) -> bool,
    ) -> Option<ObjectHandle> {
        for child in children {
            let Ok(guard) = child.read() else { continue };
            if predicate(&guard) {
                return Some(Arc::clone(child));
            }
            if let Some(found) = Self::find_recursive(guard.children(), predicate) {
                return Some(found);
            }
        }
        None
    }

    /// Count total objects in the scene.
    pub fn count_objects(&self) -> usize {
        let mut count = 0;
        self.traverse(|_| count += 1);
        count
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id())
            .field("children", &self.children().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{BasicMaterial, MaterialRef};
    use crate::math::Color;

    fn mesh_node(name: &str) -> ObjectHandle {
        let material: MaterialRef = Arc::new(BasicMaterial::new(Color::WHITE));
        let mut object = Object3D::mesh(Arc::new(BufferGeometry::new()), material);
        object.set_name(name);
        object.into_handle()
    }

    #[test]
    fn test_traverse_visits_nested_nodes() {
        let mut scene = Scene::new();
        let parent = mesh_node("parent");
        let child = mesh_node("child");
        parent.write().unwrap().add(child);
        scene.add(parent);
        scene.add(mesh_node("sibling"));

        assert_eq!(scene.count_objects(), 3);

        let mut names = Vec::new();
        scene.traverse(|object| names.push(object.name().to_string()));
        assert_eq!(names, vec!["parent", "child", "sibling"]);
    }

    #[test]
    fn test_for_each_node_can_mutate() {
        let mut scene = Scene::new();
        scene.add(mesh_node("a"));
        scene.add(mesh_node("b"));

        scene.for_each_node(|object| object.visible = false);

        let mut visible = 0;
        scene.traverse(|object| {
            if object.visible {
                visible += 1;
            }
        });
        assert_eq!(visible, 0);
        assert!(scene.collect_draws().is_empty());
    }

    #[test]
    fn test_collect_draws_skips_invisible() {
        let mut scene = Scene::new();
        let node = mesh_node("a");
        scene.add(node.clone());
        scene.add(mesh_node("b"));

        assert_eq!(scene.collect_draws().len(), 2);
        node.write().unwrap().visible = false;
        assert_eq!(scene.collect_draws().len(), 1);
    }

    #[test]
    fn test_find_and_remove() {
        let mut scene = Scene::new();
        let node = mesh_node("target");
        let id = node.read().unwrap().id();
        scene.add(node);

        assert!(scene.find_by_name("target").is_some());
        assert!(scene.remove(id).is_some());
        assert!(scene.find_by_id(id).is_none());
    }
}

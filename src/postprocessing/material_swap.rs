//! Transient material substitution for the depth pre-pass.

use crate::core::Id;
use crate::material::MaterialRef;
use crate::scene::Scene;
use std::collections::HashMap;

/// Swaps eligible drawables onto depth materials for the duration of a
/// depth capture, then restores the originals.
///
/// Saved materials live in a side table keyed by node ID rather than on
/// the nodes themselves, scoped to one `begin`/`end` pair. Both walks
/// apply the same eligibility test, so the restored node set is exactly
/// the swapped one; a mismatch (a node restored without having been
/// swapped) is a logic error, handled as a defensive no-op.
pub struct MaterialSwap {
    saved: HashMap<Id, MaterialRef>,
}

impl Default for MaterialSwap {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialSwap {
    /// Create an empty coordinator.
    pub fn new() -> Self {
        Self {
            saved: HashMap::new(),
        }
    }

    /// Number of nodes currently holding a swapped material.
    #[inline]
    pub fn swapped_count(&self) -> usize {
        self.saved.len()
    }

    /// Swap every eligible drawable onto its depth material: the node's
    /// own override when present, `generic_depth` otherwise.
    pub fn begin(&mut self, scene: &Scene, generic_depth: &MaterialRef) {
        debug_assert!(
            self.saved.is_empty(),
            "begin() while a previous capture is still active"
        );
        self.saved.clear();

        scene.for_each_node(|object| {
            let id = object.id();
            let Some(drawable) = object.drawable_mut() else {
                return;
            };
            if !drawable.eligible_for_depth_override() {
                return;
            }
            self.saved.insert(id, drawable.material.clone());
            drawable.material = drawable
                .depth_material
                .clone()
                .unwrap_or_else(|| generic_depth.clone());
        });
    }

    /// Restore every material saved by the matching [`begin`].
    ///
    /// [`begin`]: MaterialSwap::begin
    pub fn end(&mut self, scene: &Scene) {
        scene.for_each_node(|object| {
            let id = object.id();
            let Some(drawable) = object.drawable_mut() else {
                return;
            };
            if !drawable.eligible_for_depth_override() {
                return;
            }
            match self.saved.remove(&id) {
                Some(original) => drawable.material = original,
                None => {
                    debug_assert!(false, "restore for node {id} without a saved material");
                    log::warn!("material restore for node {id} without a saved material");
                }
            }
        });

        if !self.saved.is_empty() {
            debug_assert!(false, "{} swapped nodes left unrestored", self.saved.len());
            log::warn!("{} swapped nodes left unrestored", self.saved.len());
            self.saved.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BufferGeometry;
    use crate::material::{same_material, BasicMaterial, DepthMaterial, Material, MaterialRef};
    use crate::math::Color;
    use crate::scene::{Object3D, ObjectHandle};
    use std::sync::Arc;

    fn mesh_node(name: &str) -> ObjectHandle {
        let material: MaterialRef = Arc::new(BasicMaterial::new(Color::WHITE));
        let mut object = Object3D::mesh(Arc::new(BufferGeometry::new()), material);
        object.set_name(name);
        object.into_handle()
    }

    fn material_id_of(node: &ObjectHandle) -> crate::core::Id {
        node.read().unwrap().drawable().unwrap().material.id()
    }

    #[test]
    fn test_swap_and_restore_are_symmetric() {
        let mut scene = Scene::new();
        let nodes: Vec<ObjectHandle> = (0..4).map(|i| mesh_node(&format!("n{i}"))).collect();
        for node in &nodes {
            scene.add(node.clone());
        }
        let originals: Vec<_> = nodes.iter().map(material_id_of).collect();

        let depth: MaterialRef = Arc::new(DepthMaterial::new());
        let mut swap = MaterialSwap::new();

        swap.begin(&scene, &depth);
        assert_eq!(swap.swapped_count(), 4);
        for node in &nodes {
            assert_eq!(material_id_of(node), depth.id());
        }

        swap.end(&scene);
        assert_eq!(swap.swapped_count(), 0);
        for (node, original) in nodes.iter().zip(&originals) {
            assert_eq!(material_id_of(node), *original);
        }
    }

    #[test]
    fn test_excluded_node_is_never_touched() {
        let mut scene = Scene::new();
        let included = mesh_node("in");
        let excluded = mesh_node("out");
        excluded
            .write()
            .unwrap()
            .drawable_mut()
            .unwrap()
            .skip_depth_of_field = true;
        let excluded_original = material_id_of(&excluded);
        scene.add(included.clone());
        scene.add(excluded.clone());

        let depth: MaterialRef = Arc::new(DepthMaterial::new());
        let mut swap = MaterialSwap::new();

        swap.begin(&scene, &depth);
        assert_eq!(swap.swapped_count(), 1);
        assert_eq!(material_id_of(&excluded), excluded_original);
        assert_eq!(material_id_of(&included), depth.id());

        swap.end(&scene);
        assert_eq!(material_id_of(&excluded), excluded_original);
    }

    #[test]
    fn test_override_takes_precedence_over_generic_depth() {
        let mut scene = Scene::new();
        let node = mesh_node("override");
        let override_material: MaterialRef = Arc::new(DepthMaterial::new());
        node.write()
            .unwrap()
            .drawable_mut()
            .unwrap()
            .depth_material = Some(override_material.clone());
        scene.add(node.clone());

        let generic: MaterialRef = Arc::new(DepthMaterial::new());
        let mut swap = MaterialSwap::new();

        swap.begin(&scene, &generic);
        let swapped = node.read().unwrap().drawable().unwrap().material.clone();
        assert!(same_material(&swapped, &override_material));
        assert_ne!(swapped.id(), generic.id());

        swap.end(&scene);
    }

    #[test]
    fn test_nested_children_are_covered() {
        let mut scene = Scene::new();
        let parent = mesh_node("parent");
        let child = mesh_node("child");
        let child_original = material_id_of(&child);
        parent.write().unwrap().add(child.clone());
        scene.add(parent);

        let depth: MaterialRef = Arc::new(DepthMaterial::new());
        let mut swap = MaterialSwap::new();

        swap.begin(&scene, &depth);
        assert_eq!(swap.swapped_count(), 2);
        assert_eq!(material_id_of(&child), depth.id());

        swap.end(&scene);
        assert_eq!(material_id_of(&child), child_original);
    }
}

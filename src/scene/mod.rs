//! Transform Arena: the puzzle's scene graph.
//!
//! Every group and wedge lives in one arena and is addressed by [`NodeId`]
//! (slot index + generation), never by reference. Parent/child links are plain
//! ids, so the tree cannot form ownership cycles and a stale id left over from
//! a previous layout is detected instead of silently aliasing a new node.
//!
//! Each node stores only its *local* rotation + translation. World transforms
//! are composed on demand by walking the parent chain:
//!
//!   world(node) = world(parent) * local(node)
//!
//! [`SceneGraph::attach`] is the re-parent primitive: it moves a node under a
//! new parent and rewrites its local transform so that its world transform is
//! unchanged.

pub mod pick;

use glam::{Affine3A, Quat, Vec3};
use thiserror::Error;

// ── Ids & errors ──

/// Handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("unknown or removed scene node {0}")]
    UnknownNode(NodeId),
    #[error("cannot attach {node} under {parent}: parent is inside the node's subtree")]
    CycleDetected { node: NodeId, parent: NodeId },
    #[error("world transform of {0} is not invertible")]
    SingularTransform(NodeId),
    #[error("the root node cannot be re-parented")]
    RootImmutable,
}

// ── Transform ──

/// Rigid local transform: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_rotation_translation(self.rotation, self.translation)
    }

    /// Drops scale: every node in this graph is rigid.
    pub fn from_affine(affine: Affine3A) -> Self {
        let (_scale, rotation, translation) = affine.to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ── Arena ──

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Transform,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    node: Option<Node>,
}

/// Hierarchical transform tree with a single root.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    entries: Vec<Entry>,
    free: Vec<u32>,
    root: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            entries: vec![Entry {
                generation: 0,
                node: Some(Node {
                    name: String::from("root"),
                    parent: None,
                    children: Vec::new(),
                    local: Transform::IDENTITY,
                }),
            }],
            free: Vec::new(),
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.entries
            .get(id.index())
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.node.as_ref())
            .ok_or(SceneError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.entries
            .get_mut(id.index())
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.node.as_mut())
            .ok_or(SceneError::UnknownNode(id))
    }

    /// Create an empty group under `parent` with an identity local transform.
    pub fn create_group(&mut self, name: &str, parent: NodeId) -> Result<NodeId, SceneError> {
        self.create_node(name, parent, Transform::IDENTITY)
    }

    pub fn create_node(
        &mut self,
        name: &str,
        parent: NodeId,
        local: Transform,
    ) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        let node = Node {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            local,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.generation = entry.generation.wrapping_add(1);
                entry.node = Some(node);
                NodeId {
                    index,
                    generation: entry.generation,
                }
            }
            None => {
                let index = self.entries.len() as u32;
                self.entries.push(Entry {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    pub fn name(&self, id: NodeId) -> Result<&str, SceneError> {
        Ok(self.node(id)?.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(self.node(id)?.children.as_slice())
    }

    pub fn local(&self, id: NodeId) -> Result<Transform, SceneError> {
        Ok(self.node(id)?.local)
    }

    pub fn set_local(&mut self, id: NodeId, local: Transform) -> Result<(), SceneError> {
        self.node_mut(id)?.local = local;
        Ok(())
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<(), SceneError> {
        self.node_mut(id)?.local.rotation = rotation.normalize();
        Ok(())
    }

    pub fn set_position(&mut self, id: NodeId, translation: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.local.translation = translation;
        Ok(())
    }

    /// Rotate about the node's own (local) axis, composing with its current rotation.
    pub fn rotate_on_axis(&mut self, id: NodeId, axis: Vec3, angle: f32) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        node.local.rotation = (node.local.rotation * Quat::from_axis_angle(axis, angle)).normalize();
        Ok(())
    }

    pub fn rotate_z(&mut self, id: NodeId, angle: f32) -> Result<(), SceneError> {
        self.rotate_on_axis(id, Vec3::Z, angle)
    }

    pub fn world_transform(&self, id: NodeId) -> Result<Affine3A, SceneError> {
        let mut node = self.node(id)?;
        let mut world = node.local.to_affine();
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            world = node.local.to_affine() * world;
        }
        Ok(world)
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3, SceneError> {
        Ok(Vec3::from(self.world_transform(id)?.translation))
    }

    pub fn world_rotation(&self, id: NodeId) -> Result<Quat, SceneError> {
        Ok(Transform::from_affine(self.world_transform(id)?).rotation)
    }

    /// True if `ancestor` is `id` or lies on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> Result<bool, SceneError> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.node(current)?.parent;
        }
        Ok(false)
    }

    /// Move `id` under `new_parent`, keeping its world transform unchanged.
    pub fn attach(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        if self.is_ancestor(id, new_parent)? {
            return Err(SceneError::CycleDetected {
                node: id,
                parent: new_parent,
            });
        }

        let world = self.world_transform(id)?;
        let parent_world = self.world_transform(new_parent)?;
        let det = parent_world.matrix3.determinant();
        if !det.is_finite() || det.abs() < f32::EPSILON {
            return Err(SceneError::SingularTransform(new_parent));
        }
        let local = Transform::from_affine(parent_world.inverse() * world);

        let old_parent = self.node(id)?.parent;
        if let Some(old) = old_parent {
            self.node_mut(old)?.children.retain(|c| *c != id);
        }
        self.node_mut(new_parent)?.children.push(id);
        let node = self.node_mut(id)?;
        node.parent = Some(new_parent);
        node.local = local;
        Ok(())
    }

    /// Remove every descendant of `id`, keeping `id` itself.
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), SceneError> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.release_subtree(child)?;
        }
        Ok(())
    }

    fn release_subtree(&mut self, id: NodeId) -> Result<(), SceneError> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.entries[current.index()]
                .node
                .take()
                .ok_or(SceneError::UnknownNode(current))?;
            stack.extend(node.children);
            self.free.push(current.index);
        }
        Ok(())
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "expected {:?}, got {:?}", b, a);
    }

    #[test]
    fn world_transform_composes_parent_chain() {
        let mut scene = SceneGraph::new();
        let spin = scene.create_group("spin", scene.root()).unwrap();
        scene.set_rotation(spin, Quat::from_rotation_y(FRAC_PI_2)).unwrap();
        let offset = scene.create_group("offset", spin).unwrap();
        scene.set_position(offset, Vec3::new(0.0, 0.0, -1.0)).unwrap();

        // Yaw of +90° about Y maps -Z onto -X.
        assert_vec_close(scene.world_position(offset).unwrap(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn attach_preserves_world_transform() {
        let mut scene = SceneGraph::new();
        let a = scene.create_group("a", scene.root()).unwrap();
        scene.set_rotation(a, Quat::from_rotation_y(0.7)).unwrap();
        scene.set_position(a, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let b = scene.create_group("b", scene.root()).unwrap();
        scene.set_rotation(b, Quat::from_rotation_z(-1.1)).unwrap();
        let leaf = scene.create_group("leaf", a).unwrap();
        scene.set_position(leaf, Vec3::new(0.0, 0.0, -0.5)).unwrap();

        let before = scene.world_transform(leaf).unwrap();
        scene.attach(leaf, b).unwrap();
        let after = scene.world_transform(leaf).unwrap();

        assert_eq!(scene.parent(leaf).unwrap(), Some(b));
        assert!(scene.children(a).unwrap().is_empty());
        assert_eq!(scene.children(b).unwrap(), &[leaf]);
        assert!(after.abs_diff_eq(before, 1e-5));
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut scene = SceneGraph::new();
        let a = scene.create_group("a", scene.root()).unwrap();
        let b = scene.create_group("b", a).unwrap();
        assert_eq!(
            scene.attach(a, b),
            Err(SceneError::CycleDetected { node: a, parent: b })
        );
        assert_eq!(scene.attach(scene.root(), a), Err(SceneError::RootImmutable));
    }

    #[test]
    fn rotate_z_accumulates_in_local_frame() {
        let mut scene = SceneGraph::new();
        let pivot = scene.create_group("pivot", scene.root()).unwrap();
        scene.set_rotation(pivot, Quat::from_rotation_y(FRAC_PI_2)).unwrap();
        for _ in 0..4 {
            scene.rotate_z(pivot, PI / 4.0).unwrap();
        }
        let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_z(PI);
        assert!(scene.local(pivot).unwrap().rotation.dot(expected).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn removed_ids_go_stale() {
        let mut scene = SceneGraph::new();
        let group = scene.create_group("group", scene.root()).unwrap();
        let child = scene.create_group("child", group).unwrap();
        scene.clear_children(group).unwrap();
        assert!(!scene.contains(child));
        assert_eq!(scene.world_position(child), Err(SceneError::UnknownNode(child)));

        // The freed slot is reused under a new generation.
        let fresh = scene.create_group("fresh", group).unwrap();
        assert_eq!(fresh.index(), child.index());
        assert_ne!(fresh, child);
        assert!(!scene.contains(child));
        assert_eq!(scene.len(), 3);
    }
}

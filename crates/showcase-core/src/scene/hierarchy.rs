//! Arena-backed asset hierarchies

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlanError, PlanResult};
use crate::math::euler_to_quat;

use super::bounds::BoundingBox;

/// Local transform of a node (translation, XYZ Euler rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Offset from the parent origin
    pub translation: Vec3,
    /// Euler angles in radians, X applied first
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Pure translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Rotation as a quaternion
    pub fn to_quat(&self) -> Quat {
        euler_to_quat(self.rotation)
    }

    /// Local-to-parent matrix
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.to_quat(), self.translation)
    }
}

/// Geometry record shared between a node and all of its linked duplicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Handle shared by every linked duplicate
    pub id: Uuid,
    /// Mesh data name in the host
    pub name: String,
    /// Axis-aligned bounds in the owning node's local space
    pub local_bounds: BoundingBox,
}

impl Mesh {
    /// Create a mesh record with the given local bounds
    pub fn new(name: impl Into<String>, local_bounds: BoundingBox) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            local_bounds,
        }
    }
}

/// Index of a node inside its hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// A node in an asset hierarchy
#[derive(Debug, Clone)]
pub struct Node {
    /// Stable handle used when results are written back to the host
    pub id: Uuid,
    /// Object name
    pub name: String,
    /// Parent node, None for the root
    pub parent: Option<NodeId>,
    /// Child nodes in insertion order
    pub children: Vec<NodeId>,
    /// Transform relative to the parent
    pub local: Transform,
    /// Geometry carried by this node (None for empties)
    pub mesh: Option<Arc<Mesh>>,
}

/// One imported asset: an empty root owning a tree of nodes.
///
/// Nodes live in a flat arena. Parents are always pushed before their
/// children, so index order is a valid top-down traversal order.
#[derive(Debug, Clone)]
pub struct SceneHierarchy {
    name: String,
    nodes: Vec<Node>,
}

impl SceneHierarchy {
    /// Create a hierarchy with an empty root node named after the asset
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let root = Node {
            id: Uuid::new_v4(),
            name: name.clone(),
            parent: None,
            children: Vec::new(),
            local: Transform::IDENTITY,
            mesh: None,
        };
        Self {
            name,
            nodes: vec![root],
        }
    }

    /// Asset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root node (always present)
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Handle of the root node
    pub fn root_handle(&self) -> Uuid {
        self.nodes[0].id
    }

    /// Add a node under `parent`
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        local: Transform,
        mesh: Option<Arc<Mesh>>,
    ) -> PlanResult<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(PlanError::UnknownNode {
                hierarchy: self.name.clone(),
                node: parent.0,
            });
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id: Uuid::new_v4(),
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
            local,
            mesh,
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Get a node by index
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable node by index
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// All nodes in arena order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A hierarchy always has its root, so this only reports a bare root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Whether any node carries geometry
    pub fn has_geometry(&self) -> bool {
        self.nodes.iter().any(|n| n.mesh.is_some())
    }

    /// Local transform of the root
    pub fn root_transform(&self) -> Transform {
        self.nodes[0].local
    }

    /// Replace the root translation
    pub fn set_root_translation(&mut self, translation: Vec3) {
        self.nodes[0].local.translation = translation;
    }

    /// All descendants of `id` in depth-first pre-order (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let Some(node) = self.node(id) else {
            return result;
        };
        let mut stack: Vec<NodeId> = node.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(n) = self.node(current) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        result
    }

    /// Accumulated world matrix of a node
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.node(c)) {
            matrix = node.local.to_mat4() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Create a linked duplicate: fresh node handles, shared mesh records
    pub fn link_duplicate(&self) -> SceneHierarchy {
        let nodes = self
            .nodes
            .iter()
            .map(|node| Node {
                id: Uuid::new_v4(),
                name: node.name.clone(),
                parent: node.parent,
                children: node.children.clone(),
                local: node.local,
                mesh: node.mesh.clone(),
            })
            .collect();
        SceneHierarchy {
            name: self.name.clone(),
            nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_links_parent() {
        let mut h = SceneHierarchy::new("asset");
        let group = h
            .add_node(h.root(), "group", Transform::IDENTITY, None)
            .unwrap();
        let leaf = h.add_node(group, "leaf", Transform::IDENTITY, None).unwrap();

        assert_eq!(h.node(group).unwrap().parent, Some(h.root()));
        assert_eq!(h.node(group).unwrap().children, vec![leaf]);
        assert_eq!(h.descendants(h.root()), vec![group, leaf]);
    }

    #[test]
    fn test_add_node_unknown_parent() {
        let mut h = SceneHierarchy::new("asset");
        let err = h
            .add_node(NodeId(7), "orphan", Transform::IDENTITY, None)
            .unwrap_err();
        assert!(matches!(err, PlanError::UnknownNode { node: 7, .. }));
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let mut h = SceneHierarchy::new("asset");
        h.set_root_translation(Vec3::new(1.0, 0.0, 0.0));
        let child = h
            .add_node(
                h.root(),
                "child",
                Transform {
                    translation: Vec3::new(0.0, 2.0, 0.0),
                    rotation: Vec3::ZERO,
                    scale: Vec3::splat(2.0),
                },
                None,
            )
            .unwrap();
        let grandchild = h
            .add_node(
                child,
                "grandchild",
                Transform::from_translation(Vec3::new(0.0, 0.0, 1.0)),
                None,
            )
            .unwrap();

        let world = h.world_transform(grandchild);
        let p = world.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 2.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_link_duplicate_shares_mesh() {
        let mut h = SceneHierarchy::new("asset");
        let mesh = Arc::new(Mesh::new(
            "body",
            BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
        ));
        let body = h
            .add_node(h.root(), "body", Transform::IDENTITY, Some(mesh.clone()))
            .unwrap();

        let dup = h.link_duplicate();
        assert_ne!(dup.root_handle(), h.root_handle());
        let dup_mesh = dup.node(body).unwrap().mesh.as_ref().unwrap();
        assert!(Arc::ptr_eq(dup_mesh, &mesh));
        assert_eq!(Arc::strong_count(&mesh), 3);
    }
}

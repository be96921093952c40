//! Serializable scene descriptions exported from the host

use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

use super::bounds::BoundingBox;
use super::hierarchy::{Mesh, NodeId, SceneHierarchy, Transform};
use super::{HierarchyId, SceneSession};

/// Every asset found in the job's input directory, in render order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Assets in render order
    pub assets: Vec<AssetDescription>,
}

/// One imported asset file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescription {
    /// File stem of the asset
    pub name: String,
    /// Top-level imported objects; they are parented to an empty root
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
}

/// An imported object and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Object name
    pub name: String,
    /// Local translation
    #[serde(default)]
    pub translation: Vec3,
    /// XYZ Euler angles in radians
    #[serde(default)]
    pub rotation: Vec3,
    /// Local scale
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Local-space bounds for geometry nodes, None for empties
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
    /// Child objects
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl NodeDescription {
    fn transform(&self) -> Transform {
        Transform {
            translation: self.translation,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}

impl SceneDescription {
    /// Parse a RON scene description
    pub fn from_ron_str(content: &str) -> PlanResult<Self> {
        ron::from_str(content).map_err(|e| PlanError::Deserialize(e.to_string()))
    }

    /// Load a RON scene description from a file
    pub fn load(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlanError::Io(format!("{}: {e}", path.display())))?;
        Self::from_ron_str(&content)
    }

    /// Build every asset into a fresh session.
    ///
    /// An empty description is fatal.
    pub fn build_session(&self) -> PlanResult<(SceneSession, Vec<HierarchyId>)> {
        if self.assets.is_empty() {
            return Err(PlanError::NoAssets);
        }
        let mut session = SceneSession::new();
        let mut ids = Vec::with_capacity(self.assets.len());
        for asset in &self.assets {
            ids.push(session.add(asset.to_hierarchy()?));
        }
        Ok((session, ids))
    }
}

impl AssetDescription {
    /// Build the arena hierarchy: an empty root named after the asset that
    /// owns every top-level node.
    pub fn to_hierarchy(&self) -> PlanResult<SceneHierarchy> {
        let mut hierarchy = SceneHierarchy::new(&self.name);
        let root = hierarchy.root();
        for node in &self.nodes {
            add_recursive(&mut hierarchy, root, node)?;
        }
        Ok(hierarchy)
    }
}

fn add_recursive(
    hierarchy: &mut SceneHierarchy,
    parent: NodeId,
    desc: &NodeDescription,
) -> PlanResult<()> {
    let mesh = desc
        .bounds
        .map(|bounds| Arc::new(Mesh::new(desc.name.clone(), bounds)));
    let id = hierarchy.add_node(parent, desc.name.clone(), desc.transform(), mesh)?;
    for child in &desc.children {
        add_recursive(hierarchy, id, child)?;
    }
    Ok(())
}

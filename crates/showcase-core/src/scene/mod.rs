//! Scene session: the planner's owned copy of the host scene
//!
//! The host's live objects are read once into [`SceneHierarchy`] values that
//! the session owns. All planning works on these values; results are handed
//! back to the host in one batch as a stage plan.

mod bounds;
mod description;
mod hierarchy;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, PlanResult};

pub use bounds::BoundingBox;
pub use description::{AssetDescription, NodeDescription, SceneDescription};
pub use hierarchy::{Mesh, Node, NodeId, SceneHierarchy, Transform};

/// Index of a hierarchy inside a [`SceneSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyId(pub usize);

/// Exclusive owner of every hierarchy taking part in one planning pass
#[derive(Debug, Default)]
pub struct SceneSession {
    hierarchies: Vec<SceneHierarchy>,
}

impl SceneSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a hierarchy
    pub fn add(&mut self, hierarchy: SceneHierarchy) -> HierarchyId {
        let id = HierarchyId(self.hierarchies.len());
        debug!(asset = %hierarchy.name(), index = id.0, "Added hierarchy to session");
        self.hierarchies.push(hierarchy);
        id
    }

    /// Get a hierarchy
    pub fn get(&self, id: HierarchyId) -> PlanResult<&SceneHierarchy> {
        self.hierarchies
            .get(id.0)
            .ok_or(PlanError::UnknownHierarchy(id.0))
    }

    /// Get a mutable hierarchy
    pub fn get_mut(&mut self, id: HierarchyId) -> PlanResult<&mut SceneHierarchy> {
        self.hierarchies
            .get_mut(id.0)
            .ok_or(PlanError::UnknownHierarchy(id.0))
    }

    /// Ids of all hierarchies in insertion order
    pub fn ids(&self) -> Vec<HierarchyId> {
        (0..self.hierarchies.len()).map(HierarchyId).collect()
    }

    /// Number of hierarchies
    pub fn len(&self) -> usize {
        self.hierarchies.len()
    }

    /// Check if the session holds no hierarchies
    pub fn is_empty(&self) -> bool {
        self.hierarchies.is_empty()
    }

    /// Add a linked duplicate of `id` (independent transforms, shared meshes)
    pub fn link_duplicate(&mut self, id: HierarchyId) -> PlanResult<HierarchyId> {
        let duplicate = self.get(id)?.link_duplicate();
        Ok(self.add(duplicate))
    }

    /// Drop every hierarchy so the next asset starts from a clean scene.
    ///
    /// Previously issued [`HierarchyId`]s become invalid.
    pub fn reset(&mut self) {
        debug!(count = self.hierarchies.len(), "Resetting scene session");
        self.hierarchies.clear();
    }
}

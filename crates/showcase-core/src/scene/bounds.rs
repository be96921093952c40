//! World-space bounding boxes and centering

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::hierarchy::{NodeId, SceneHierarchy};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a new bounding box from min and max points.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an empty (inverted) bounding box, the identity for folding.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// The all-zero degenerate box reported for hierarchies without geometry.
    pub fn zero() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }

    /// Creates a bounding box from a center point and half-extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates a bounding box that contains all given points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox = bbox.expand_to_include(point);
        }
        bbox
    }

    /// Returns the center of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents of the bounding box.
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns the size (full extents) of the bounding box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns true if the point lies inside the box grown by `epsilon`.
    pub fn contains_point_approx(&self, point: Vec3, epsilon: f32) -> bool {
        let pad = Vec3::splat(epsilon);
        point.cmpge(self.min - pad).all() && point.cmple(self.max + pad).all()
    }

    /// Returns the union of two bounding boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns a new bounding box expanded to include the given point.
    pub fn expand_to_include(&self, point: Vec3) -> BoundingBox {
        BoundingBox {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// The eight corner points.
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Transforms the bounding box by the given matrix.
    ///
    /// Note: This returns an axis-aligned bounding box that contains
    /// the transformed corners, which may be larger than optimal.
    pub fn transform(&self, transform: &Mat4) -> BoundingBox {
        BoundingBox::from_points(self.corners().map(|c| transform.transform_point3(c)))
    }

    /// Zero size on every axis. Callers must fall back instead of dividing by it.
    pub fn is_degenerate(&self) -> bool {
        self.size() == Vec3::ZERO
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl SceneHierarchy {
    /// World bounds of the whole hierarchy
    pub fn world_bounds(&self) -> BoundingBox {
        self.compute_world_bounds(self.root())
    }

    /// World bounds of `node` and every descendant at any depth.
    ///
    /// Geometry nodes contribute their 8 transformed local corners, empties
    /// contribute their world origin. Returns [`BoundingBox::zero`] when the
    /// subtree carries no geometry at all.
    pub fn compute_world_bounds(&self, node: NodeId) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        let mut has_geometry = false;
        self.accumulate_bounds(
            node,
            self.world_transform(node),
            &mut bounds,
            &mut has_geometry,
        );
        if !has_geometry {
            return BoundingBox::zero();
        }
        bounds
    }

    fn accumulate_bounds(
        &self,
        id: NodeId,
        world: Mat4,
        bounds: &mut BoundingBox,
        has_geometry: &mut bool,
    ) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.mesh {
            Some(mesh) => {
                *bounds = bounds.union(&mesh.local_bounds.transform(&world));
                *has_geometry = true;
            }
            None => *bounds = bounds.expand_to_include(world.transform_point3(Vec3::ZERO)),
        }
        for &child in &node.children {
            if let Some(child_node) = self.node(child) {
                let child_world = world * child_node.local.to_mat4();
                self.accumulate_bounds(child, child_world, bounds, has_geometry);
            }
        }
    }

    /// Move the hierarchy so its world bounds are centered on the origin.
    ///
    /// Only the root translation changes; descendants inherit the shift.
    /// Returns the offset that was removed.
    pub fn center_at_origin(&mut self) -> Vec3 {
        let center = self.world_bounds().center();
        let root = self.root_transform();
        self.set_root_translation(root.translation - center);
        debug!(asset = %self.name(), ?center, "Centered hierarchy at origin");
        center
    }
}

//! Small math helpers shared by the planners

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World axis (Z is up)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    /// Left to right
    X,
    /// Away from the front camera
    #[default]
    Y,
    /// Up
    Z,
}

impl Axis {
    /// Unit vector pointing along the positive axis
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Component of `v` along this axis
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// The two axes perpendicular to this one
    pub fn perpendicular(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// Convert XYZ Euler angles (radians) to a quaternion.
///
/// X is applied first, then Y, then Z, matching the host's `rotation_euler`.
pub fn euler_to_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, rotation.z, rotation.y, rotation.x)
}

/// Rotate a point about the world Z axis
pub fn rotate_z(point: Vec3, yaw: f32) -> Vec3 {
    Quat::from_rotation_z(yaw) * point
}

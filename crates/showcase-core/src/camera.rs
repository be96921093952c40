//! Camera fit from subject bounds

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{
    CLIP_FAR_DISTANCE_FACTOR, CLIP_NEAR, DEFAULT_LENS_MM, DEFAULT_MARGIN,
    DEFAULT_SENSOR_WIDTH_MM, DEPTH_PUSH_BACK, FALLBACK_CAMERA_DISTANCE, MIN_CLIP_FAR,
};
use crate::math::{Axis, euler_to_quat, rotate_z};

/// Which side of the subject the camera looks from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraSide {
    /// On -Y looking along +Y
    #[default]
    Front,
    /// On -X looking along +X
    Left,
    /// On +X looking along -X
    Right,
}

impl CameraSide {
    /// Axis the camera looks along
    pub fn view_axis(self) -> Axis {
        match self {
            CameraSide::Front => Axis::Y,
            CameraSide::Left | CameraSide::Right => Axis::X,
        }
    }

    /// Yaw applied to the front placement to reach this side
    pub fn yaw(self) -> f32 {
        match self {
            CameraSide::Front => 0.0,
            CameraSide::Left => -FRAC_PI_2,
            CameraSide::Right => FRAC_PI_2,
        }
    }
}

/// Horizontal field of view of a lens on a sensor of the given width
pub fn fov_from_lens(lens_mm: f32, sensor_width_mm: f32) -> f32 {
    2.0 * (sensor_width_mm / (2.0 * lens_mm)).atan()
}

/// Fitted camera pose and projection settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPlan {
    /// Distance from the subject center (origin)
    pub distance: f32,
    /// World position
    pub position: Vec3,
    /// XYZ Euler angles in radians
    pub rotation: Vec3,
    /// Near clip distance
    pub clip_near: f32,
    /// Far clip distance
    pub clip_far: f32,
    /// Field of view in radians
    pub fov: f32,
    /// Side the camera looks from
    pub side: CameraSide,
    /// Set when the subject had no extent and the fixed distance was used
    pub fallback: bool,
}

impl CameraPlan {
    /// World direction the camera looks along
    pub fn forward(&self) -> Vec3 {
        euler_to_quat(self.rotation) * Vec3::NEG_Z
    }
}

/// Derives camera placement from a subject size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFitter {
    /// Field of view in radians
    pub fov: f32,
    /// Framing safety factor (>= 1.0)
    pub margin: f32,
    /// Side the camera looks from
    pub side: CameraSide,
}

impl Default for CameraFitter {
    fn default() -> Self {
        Self {
            fov: fov_from_lens(DEFAULT_LENS_MM, DEFAULT_SENSOR_WIDTH_MM),
            margin: DEFAULT_MARGIN,
            side: CameraSide::Front,
        }
    }
}

impl CameraFitter {
    /// Create a front-facing fitter
    pub fn new(fov: f32, margin: f32) -> Self {
        Self {
            fov,
            margin,
            side: CameraSide::Front,
        }
    }

    /// Use a different camera side
    pub fn with_side(mut self, side: CameraSide) -> Self {
        self.side = side;
        self
    }

    /// Half diagonal of the cross-section facing the camera, and the depth
    /// along the view axis
    pub fn cross_section(&self, size: Vec3) -> (f32, f32) {
        let view = self.side.view_axis();
        let (a, b) = view.perpendicular();
        let (a, b) = (a.component(size), b.component(size));
        let radius = 0.5 * (a * a + b * b).sqrt();
        (radius, view.component(size))
    }

    /// Camera distance for a subject of the given size, or `None` when the
    /// subject has no extent to frame
    pub fn fit_distance(&self, size: Vec3) -> Option<f32> {
        let (radius, depth) = self.cross_section(size);
        if radius == 0.0 && depth == 0.0 {
            return None;
        }
        Some((radius * self.margin) / (self.fov / 2.0).tan() + depth * DEPTH_PUSH_BACK)
    }

    /// Fit the camera to a subject of the given size centered on the origin
    pub fn fit(&self, size: Vec3) -> CameraPlan {
        let (distance, fallback) = match self.fit_distance(size) {
            Some(distance) => (distance, false),
            None => {
                warn!(
                    ?size,
                    distance = FALLBACK_CAMERA_DISTANCE,
                    "Subject has no extent, using fallback camera distance"
                );
                (FALLBACK_CAMERA_DISTANCE, true)
            }
        };

        let yaw = self.side.yaw();
        let plan = CameraPlan {
            distance,
            position: rotate_z(Vec3::new(0.0, -distance, 0.0), yaw),
            rotation: Vec3::new(FRAC_PI_2, 0.0, yaw),
            clip_near: CLIP_NEAR,
            clip_far: (distance * CLIP_FAR_DISTANCE_FACTOR).max(MIN_CLIP_FAR),
            fov: self.fov,
            side: self.side,
            fallback,
        };
        debug!(?size, distance, side = ?self.side, "Fitted camera");
        plan
    }
}

/// Fit a front camera to a subject of the given size
pub fn fit_camera(size: Vec3, fov: f32, margin: f32) -> CameraPlan {
    CameraFitter::new(fov, margin).fit(size)
}

/// How the camera is mounted for the job
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraRig {
    /// Camera stays put; the subject spins or moves
    Static,
    /// Camera parented to a pivot at the origin, tracking `target`.
    /// Only the pivot yaw is animated.
    Orbit {
        /// Pivot location, the world origin
        pivot: Vec3,
        /// Camera position relative to the pivot
        local_offset: Vec3,
        /// Point the camera tracks
        target: Vec3,
    },
}

impl CameraRig {
    /// Orbit rig around the origin for a fitted camera
    pub fn orbit(plan: &CameraPlan) -> Self {
        CameraRig::Orbit {
            pivot: Vec3::ZERO,
            local_offset: plan.position,
            target: Vec3::ZERO,
        }
    }

    /// Camera world position for a pivot yaw (radians)
    pub fn camera_position(&self, plan: &CameraPlan, pivot_yaw: f32) -> Vec3 {
        match self {
            CameraRig::Static => plan.position,
            CameraRig::Orbit {
                pivot,
                local_offset,
                ..
            } => *pivot + rotate_z(*local_offset, pivot_yaw),
        }
    }
}

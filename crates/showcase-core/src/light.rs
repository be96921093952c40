//! Area light rigs scaled from the camera distance
//!
//! Light positions are fractions of the camera distance and light extents
//! are derived from the same distance, so illumination stays consistent
//! across assets of very different scale.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{LIGHT_ASPECT, LIGHT_SPREAD_FACTOR, MIN_LIGHT_SPREAD};
use crate::math::rotate_z;

/// Role of a light in the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightRole {
    /// Main light, front left
    Key,
    /// Softer light opposite the key
    Fill,
    /// Back light outlining the subject
    Rim,
    /// Overhead light
    Top,
}

impl LightRole {
    /// Object name used in the host scene
    pub fn name(self) -> &'static str {
        match self {
            LightRole::Key => "Key",
            LightRole::Fill => "Fill",
            LightRole::Rim => "Rim",
            LightRole::Top => "Top",
        }
    }
}

/// Named light rig configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RigPreset {
    /// Key, fill, rim and top lights
    Studio,
    /// Single key light
    #[default]
    Key,
}

impl RigPreset {
    /// Canonical preset name
    pub fn name(self) -> &'static str {
        match self {
            RigPreset::Studio => "studio",
            RigPreset::Key => "key",
        }
    }

    /// Look up a preset by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "studio" | "four-point" => Some(RigPreset::Studio),
            "key" | "single" => Some(RigPreset::Key),
            _ => None,
        }
    }

    /// Roles in this preset, in creation order
    pub fn roles(self) -> &'static [LightRole] {
        match self {
            RigPreset::Studio => &[
                LightRole::Key,
                LightRole::Fill,
                LightRole::Rim,
                LightRole::Top,
            ],
            RigPreset::Key => &[LightRole::Key],
        }
    }
}

/// Fixed per-role placement, expressed relative to the camera distance
struct RoleLayout {
    /// Position as fractions of the camera distance
    offset: Vec3,
    /// Euler rotation in degrees
    rotation_deg: Vec3,
    energy: f32,
    size: f32,
}

fn role_layout(preset: RigPreset, role: LightRole) -> RoleLayout {
    match (preset, role) {
        (RigPreset::Key, _) => RoleLayout {
            offset: Vec3::new(0.5, -0.5, 0.8),
            rotation_deg: Vec3::new(60.0, 0.0, 30.0),
            energy: 1.0,
            size: 0.5,
        },
        (RigPreset::Studio, LightRole::Key) => RoleLayout {
            offset: Vec3::new(0.55, -0.6, 0.85),
            rotation_deg: Vec3::new(65.0, 0.0, 25.0),
            energy: 1.0,
            size: 0.5,
        },
        (RigPreset::Studio, LightRole::Fill) => RoleLayout {
            offset: Vec3::new(-0.45, -0.35, 0.45),
            rotation_deg: Vec3::new(55.0, 0.0, -30.0),
            energy: 0.38,
            size: 0.75,
        },
        (RigPreset::Studio, LightRole::Rim) => RoleLayout {
            offset: Vec3::new(0.0, 0.65, 0.35),
            rotation_deg: Vec3::new(115.0, 0.0, 0.0),
            energy: 0.55,
            size: 0.4,
        },
        (RigPreset::Studio, LightRole::Top) => RoleLayout {
            offset: Vec3::new(0.0, -0.05, 1.2),
            rotation_deg: Vec3::ZERO,
            energy: 0.32,
            size: 0.9,
        },
    }
}

/// A planned rectangular area light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDescriptor {
    /// Place in the rig
    pub role: LightRole,
    /// Object name in the host scene
    pub name: String,
    /// World position
    pub position: Vec3,
    /// XYZ Euler angles in radians
    pub rotation: Vec3,
    /// Power in watts
    pub energy: f32,
    /// Rectangle width
    pub size: f32,
    /// Rectangle height
    pub size_y: f32,
}

/// Ordered set of lights for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRigPlan {
    /// Preset the rig was built from
    pub preset: RigPreset,
    /// Lights in preset order
    pub lights: Vec<LightDescriptor>,
}

impl LightRigPlan {
    /// Find the light with the given role
    pub fn get(&self, role: LightRole) -> Option<&LightDescriptor> {
        self.lights.iter().find(|l| l.role == role)
    }

    /// Number of lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Check if the rig has no lights
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

/// Plans a light rig from the camera distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRigPlanner {
    /// Energy of the key light; other roles scale from it
    pub base_energy: f32,
    /// Lights to place
    pub preset: RigPreset,
    /// Yaw applied to the whole rig (follows the camera side)
    pub yaw: f32,
}

impl LightRigPlanner {
    /// Single key light planner
    pub fn new(base_energy: f32) -> Self {
        Self {
            base_energy,
            preset: RigPreset::Key,
            yaw: 0.0,
        }
    }

    /// Use a preset
    pub fn with_preset(mut self, preset: RigPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Use a preset by name, falling back to a single key light when the
    /// name is absent or unknown
    pub fn with_preset_name(self, name: Option<&str>) -> Self {
        let preset = match name {
            Some(name) => RigPreset::from_name(name).unwrap_or_else(|| {
                warn!(preset = name, "Unknown light rig preset, using a single key light");
                RigPreset::Key
            }),
            None => RigPreset::Key,
        };
        self.with_preset(preset)
    }

    /// Rotate the rig about the vertical axis
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Base rectangle extent for a camera distance
    pub fn spread(distance: f32) -> f32 {
        MIN_LIGHT_SPREAD.max(distance * LIGHT_SPREAD_FACTOR)
    }

    /// Plan every light of the preset for the given camera distance
    pub fn plan(&self, distance: f32) -> LightRigPlan {
        let spread = Self::spread(distance);
        let lights = self
            .preset
            .roles()
            .iter()
            .map(|&role| {
                let layout = role_layout(self.preset, role);
                let rotation = Vec3::new(
                    layout.rotation_deg.x.to_radians(),
                    layout.rotation_deg.y.to_radians(),
                    layout.rotation_deg.z.to_radians() + self.yaw,
                );
                let size = spread * layout.size;
                LightDescriptor {
                    role,
                    name: role.name().to_string(),
                    position: rotate_z(layout.offset * distance, self.yaw),
                    rotation,
                    energy: self.base_energy * layout.energy,
                    size,
                    size_y: size * LIGHT_ASPECT,
                }
            })
            .collect();
        LightRigPlan {
            preset: self.preset,
            lights,
        }
    }
}

/// Plan a single key light for the given camera distance
pub fn plan_lights(distance: f32, base_energy: f32) -> LightRigPlan {
    LightRigPlanner::new(base_energy).plan(distance)
}

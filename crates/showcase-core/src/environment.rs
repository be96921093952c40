//! World, film and color management settings per environment preset

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::ROOM_SCALE;

/// Background preset for a render job, stored by its kebab-case name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Environment {
    /// Transparent film over a plain white world
    Clean,
    /// Dark room sphere
    BlackRoom,
    /// Evenly lit white room sphere
    WhiteRoom,
    /// Deep blue background without an image
    NightSky,
    /// Snow field sky image
    SnowyField,
    /// Clear sky image
    Sky,
    /// Meadow sky image
    Meadow,
    /// Golf course sky image
    CountryClub,
    /// Desert ground and sky image
    Desert,
    /// Snowy forest sky image
    SnowyForest,
    /// Desert sky image without ground
    DesertSky,
}

impl Environment {
    /// All presets
    pub const ALL: [Environment; 11] = [
        Environment::Clean,
        Environment::BlackRoom,
        Environment::WhiteRoom,
        Environment::NightSky,
        Environment::SnowyField,
        Environment::Sky,
        Environment::Meadow,
        Environment::CountryClub,
        Environment::Desert,
        Environment::SnowyForest,
        Environment::DesertSky,
    ];

    /// Preset name as used in job files
    pub fn name(self) -> &'static str {
        match self {
            Environment::Clean => "clean",
            Environment::BlackRoom => "black-room",
            Environment::WhiteRoom => "white-room",
            Environment::NightSky => "night-sky",
            Environment::SnowyField => "snowy-field",
            Environment::Sky => "sky",
            Environment::Meadow => "meadow",
            Environment::CountryClub => "country-club",
            Environment::Desert => "desert",
            Environment::SnowyForest => "snowy-forest",
            Environment::DesertSky => "desert-sky",
        }
    }

    /// Parse a preset name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|env| env.name() == name)
    }

    /// Equirectangular sky image for the image-lit presets
    pub fn hdri_file(self) -> Option<&'static str> {
        match self {
            Environment::SnowyField => Some("snowy_field_4k.hdr"),
            Environment::Sky => Some("citrus_orchard_puresky_4k.hdr"),
            Environment::Meadow => Some("meadow_2_4k.hdr"),
            Environment::CountryClub => Some("country_club_4k.hdr"),
            Environment::Desert => Some("qwantani_moon_noon_4k.hdr"),
            Environment::SnowyForest => Some("snowy_forest_4k.hdr"),
            Environment::DesertSky => Some("qwantani_moon_noon_puresky_4k.hdr"),
            _ => None,
        }
    }

    /// Whether an inverted emissive sphere surrounds the stage
    pub fn has_room(self) -> bool {
        matches!(self, Environment::BlackRoom | Environment::WhiteRoom)
    }

    /// Only the clean preset renders with a transparent film
    pub fn is_transparent(self) -> bool {
        self == Environment::Clean
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.name().to_string()
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Environment::from_name(&name).ok_or_else(|| format!("unknown environment '{name}'"))
    }
}

/// Color management curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewTransform {
    /// High dynamic range curve
    #[default]
    Filmic,
    /// Display-referred sRGB
    Standard,
}

/// Infinite-room sphere around the stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomPlan {
    /// Sphere radius before scaling
    pub radius: f32,
    /// Negative Y flips the normals inward
    pub scale: Vec3,
    /// Linear RGB emission
    pub emission_color: Vec3,
    /// Emission strength
    pub emission_strength: f32,
    /// Whether the sphere blocks light
    pub casts_shadows: bool,
}

impl RoomPlan {
    fn with_color(emission_color: Vec3) -> Self {
        Self {
            radius: 1.0,
            scale: Vec3::new(ROOM_SCALE, -ROOM_SCALE, ROOM_SCALE),
            emission_color,
            emission_strength: 1.0,
            casts_shadows: false,
        }
    }
}

/// Resolved world settings for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentPlan {
    /// Preset the plan was resolved from
    pub environment: Environment,
    /// Render with alpha instead of the background
    pub film_transparent: bool,
    /// Linear RGB world color
    pub background_color: Vec3,
    /// World strength
    pub background_strength: f32,
    /// Color management curve
    pub view_transform: ViewTransform,
    /// Exposure in stops
    pub exposure: f32,
    /// Room sphere for the room presets
    pub room: Option<RoomPlan>,
    /// Sky image file for the image-lit presets
    pub hdri: Option<String>,
}

/// Resolve the world settings of a preset
pub fn plan_environment(environment: Environment, world_strength: f32, exposure: f32) -> EnvironmentPlan {
    let (background_color, background_strength) = match environment {
        Environment::WhiteRoom => (Vec3::ONE, 1.0),
        Environment::BlackRoom => (Vec3::ZERO, world_strength),
        Environment::NightSky => (Vec3::new(0.01, 0.015, 0.03), 0.8),
        env if env.hdri_file().is_some() => (Vec3::ONE, 1.0),
        _ => (Vec3::ONE, world_strength),
    };
    let (view_transform, exposure) = match environment {
        Environment::WhiteRoom => (ViewTransform::Standard, 0.0),
        Environment::NightSky => (ViewTransform::Filmic, 0.0),
        _ => (ViewTransform::Filmic, exposure),
    };
    let room = environment
        .has_room()
        .then(|| RoomPlan::with_color(background_color));

    let plan = EnvironmentPlan {
        environment,
        film_transparent: environment.is_transparent(),
        background_color,
        background_strength,
        view_transform,
        exposure,
        room,
        hdri: environment.hdri_file().map(str::to_string),
    };
    debug!(environment = environment.name(), ?view_transform, exposure, "Planned environment");
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for env in Environment::ALL {
            assert_eq!(Environment::from_name(env.name()), Some(env));
        }
        assert_eq!(Environment::from_name(" Night-Sky "), Some(Environment::NightSky));
        assert_eq!(Environment::from_name("moon"), None);
    }

    #[test]
    fn test_serde_uses_preset_name() {
        let text = ron::to_string(&Environment::CountryClub).unwrap();
        assert_eq!(text, "\"country-club\"");
        let parsed: Environment = ron::from_str("\"snowy-forest\"").unwrap();
        assert_eq!(parsed, Environment::SnowyForest);
        assert!(ron::from_str::<Environment>("\"moon\"").is_err());
    }

    #[test]
    fn test_only_clean_is_transparent() {
        for env in Environment::ALL {
            let plan = plan_environment(env, 0.42, -0.55);
            assert_eq!(plan.film_transparent, env == Environment::Clean, "{env:?}");
        }
    }

    #[test]
    fn test_white_room() {
        let plan = plan_environment(Environment::WhiteRoom, 0.42, -0.55);
        assert_eq!(plan.view_transform, ViewTransform::Standard);
        assert_eq!(plan.exposure, 0.0);
        assert_eq!(plan.background_strength, 1.0);
        let room = plan.room.unwrap();
        assert_eq!(room.scale, Vec3::new(100.0, -100.0, 100.0));
        assert_eq!(room.emission_color, Vec3::ONE);
    }

    #[test]
    fn test_black_room_keeps_exposure() {
        let plan = plan_environment(Environment::BlackRoom, 0.42, -0.55);
        assert_eq!(plan.view_transform, ViewTransform::Filmic);
        assert_eq!(plan.exposure, -0.55);
        assert_eq!(plan.background_color, Vec3::ZERO);
        assert_eq!(plan.background_strength, 0.42);
        assert_eq!(plan.room.unwrap().emission_color, Vec3::ZERO);
    }

    #[test]
    fn test_rooms_only_for_room_presets() {
        for env in Environment::ALL {
            let plan = plan_environment(env, 0.42, -0.55);
            assert_eq!(plan.room.is_some(), env.has_room(), "{env:?}");
        }
    }

    #[test]
    fn test_night_sky() {
        let plan = plan_environment(Environment::NightSky, 0.42, -0.55);
        assert_eq!(plan.exposure, 0.0);
        assert_eq!(plan.background_strength, 0.8);
        assert!(plan.room.is_none());
        assert!(plan.hdri.is_none());
    }

    #[test]
    fn test_image_lit_presets() {
        let plan = plan_environment(Environment::Meadow, 0.42, -0.55);
        assert_eq!(plan.hdri.as_deref(), Some("meadow_2_4k.hdr"));
        assert_eq!(plan.background_strength, 1.0);
        assert!(plan.room.is_none());

        let clean = plan_environment(Environment::Clean, 0.42, -0.55);
        assert!(clean.hdri.is_none());
        assert_eq!(clean.background_strength, 0.42);
    }
}

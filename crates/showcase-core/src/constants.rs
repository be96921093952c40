//! Global constants for showcase-core

/// Near clip plane distance for every planned camera
pub const CLIP_NEAR: f32 = 0.01;

/// Lower bound for the far clip plane (keeps room geometry visible)
pub const MIN_CLIP_FAR: f32 = 1000.0;

/// Far clip is at least this many camera distances away
pub const CLIP_FAR_DISTANCE_FACTOR: f32 = 4.0;

/// Camera distance used when the subject has no measurable extent
pub const FALLBACK_CAMERA_DISTANCE: f32 = 3.0;

/// Fraction of the subject depth added to the fitted camera distance
pub const DEPTH_PUSH_BACK: f32 = 0.25;

/// Default framing safety factor
pub const DEFAULT_MARGIN: f32 = 1.03;

/// Default lens focal length in millimeters
pub const DEFAULT_LENS_MM: f32 = 50.0;

/// Default sensor width in millimeters
pub const DEFAULT_SENSOR_WIDTH_MM: f32 = 36.0;

/// Minimum base extent of an area light
pub const MIN_LIGHT_SPREAD: f32 = 1.2;

/// Base area light extent as a fraction of the camera distance
pub const LIGHT_SPREAD_FACTOR: f32 = 0.35;

/// Height of a rectangular area light relative to its width
pub const LIGHT_ASPECT: f32 = 0.65;

/// Lower bound for the lineup spacing unit
pub const MIN_SPACING_UNIT: f32 = 1.0;

/// Scale of the infinite-room sphere
pub const ROOM_SCALE: f32 = 100.0;

/// First rendered frame of every job
pub const FRAME_START: u32 = 1;

/// Latest frame a job may render. About 92 hours at 30 fps.
pub const MAX_FRAME_END: u32 = 10_000_000;

/// Name of the empty that carries the whole lineup
pub const LINEUP_MASTER_NAME: &str = "LINEUP";

/// Name of the camera orbit pivot
pub const CAMERA_PIVOT_NAME: &str = "CamRig";

/// Name of the empty at the world origin that spins a turntable subject
pub const SPIN_PIVOT_NAME: &str = "SpinPivot";

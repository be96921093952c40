//! Stage plans: everything the renderer host applies for one clip
//!
//! A pipeline takes the session by exclusive reference, mutates it (centering,
//! lineup placement, padding duplicates) and returns a [`StagePlan`] the host
//! applies in one batch.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::animation::{FrameRange, Keyframe, LoopPlan, Track, plan_loop, plan_one_shot, plan_spin};
use crate::camera::{CameraFitter, CameraPlan, CameraRig, CameraSide};
use crate::config::{JobConfig, Pipeline};
use crate::constants::{CAMERA_PIVOT_NAME, LINEUP_MASTER_NAME, SPIN_PIVOT_NAME};
use crate::environment::{EnvironmentPlan, plan_environment};
use crate::error::{PlanError, PlanResult};
use crate::light::{LightRigPlan, LightRigPlanner};
use crate::lineup::{LineupArranger, LineupPlan, LineupSettings};
use crate::math::Axis;
use crate::scene::{AssetDescription, HierarchyId, SceneSession};

/// Image channel layout of rendered frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Opaque color
    Rgb,
    /// Color with alpha, for transparent film
    Rgba,
}

/// Render output settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Width in pixels
    pub resolution_x: u32,
    /// Height in pixels
    pub resolution_y: u32,
    /// Frames per second
    pub fps: u32,
    /// Rendered frames
    pub frames: FrameRange,
    /// Channel layout of each frame
    pub color_mode: ColorMode,
}

impl OutputSettings {
    /// Square output; alpha is kept only for a transparent film
    pub fn square(size: u32, fps: u32, frames: FrameRange, transparent: bool) -> Self {
        Self {
            resolution_x: size,
            resolution_y: size,
            fps,
            frames,
            color_mode: if transparent {
                ColorMode::Rgba
            } else {
                ColorMode::Rgb
            },
        }
    }
}

/// Final transform of one asset root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Root handle
    pub handle: Uuid,
    /// Asset name
    pub name: String,
    /// Hierarchy in the planning session
    pub hierarchy: HierarchyId,
    /// Root translation, local to `parent` when set
    pub translation: Vec3,
    /// Root XYZ Euler rotation in radians
    pub rotation: Vec3,
    /// Linked duplicate added for lineup padding
    pub is_padding: bool,
    /// Name of the empty this root is parented to
    pub parent: Option<String>,
}

/// Object an animation track drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackTarget {
    /// Camera orbit pivot
    CameraPivot,
    /// Empty at the world origin the turntable subject is parented to
    SpinPivot,
    /// Empty carrying the whole lineup
    LineupMaster,
}

impl TrackTarget {
    /// Scene object name of the target
    pub fn name(self) -> &'static str {
        match self {
            TrackTarget::CameraPivot => CAMERA_PIVOT_NAME,
            TrackTarget::SpinPivot => SPIN_PIVOT_NAME,
            TrackTarget::LineupMaster => LINEUP_MASTER_NAME,
        }
    }
}

/// Animated transform channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// Translation
    Location,
    /// XYZ Euler rotation in radians
    RotationEuler,
}

/// Keyed channel of one scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationTrack {
    /// Driven object
    pub target: TrackTarget,
    /// Scene object name of `target`
    pub target_name: String,
    /// Driven channel
    pub channel: Channel,
    /// Keys for the channel
    pub track: Track<Vec3>,
}

impl AnimationTrack {
    /// Track driving `channel` of `target`
    pub fn new(target: TrackTarget, channel: Channel, track: Track<Vec3>) -> Self {
        Self {
            target,
            target_name: target.name().to_string(),
            channel,
            track,
        }
    }
}

/// Lineup layout and travel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineupSummary {
    /// Distance between neighbouring slots
    pub spacing: f32,
    /// Axis the row extends along
    pub spacing_axis: Axis,
    /// Number of original assets
    pub instance_count: usize,
    /// Duplicates before the first original
    pub loop_pad: usize,
    /// Duplicates after the last original
    pub trailing: usize,
    /// Per-axis maximum asset size
    pub max_size: Vec3,
    /// Distance from the first to the last original
    pub total_length: f32,
    /// Set for looping lineups
    pub loop_plan: Option<LoopPlan>,
    /// Master offset along the spacing axis at the last key
    pub final_offset: f32,
}

/// Serialization format for plan files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFormat {
    /// Pretty RON
    #[default]
    Ron,
    /// Pretty JSON
    Json,
}

impl PlanFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            PlanFormat::Ron => "ron",
            PlanFormat::Json => "json",
        }
    }
}

/// Complete static and animated description of one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePlan {
    /// Clip name, the asset name for turntables
    pub name: String,
    /// Pipeline that produced the plan
    pub pipeline: Pipeline,
    /// Render output settings
    pub output: OutputSettings,
    /// World and color management
    pub environment: EnvironmentPlan,
    /// Fitted camera
    pub camera: CameraPlan,
    /// How the camera is mounted
    pub camera_rig: CameraRig,
    /// Lights, in world space
    pub lights: LightRigPlan,
    /// Final root transforms
    pub placements: Vec<Placement>,
    /// Animation applied on top of the placements
    pub tracks: Vec<AnimationTrack>,
    /// Lineup layout, for lineup clips
    pub lineup: Option<LineupSummary>,
}

impl StagePlan {
    /// Find the track driving a target
    pub fn track_for(&self, target: TrackTarget) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|t| t.target == target)
    }

    /// Pretty RON text
    pub fn to_ron(&self) -> PlanResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PlanError::Serialize(e.to_string()))
    }

    /// Pretty JSON text
    pub fn to_json(&self) -> PlanResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PlanError::Serialize(e.to_string()))
    }

    /// Parse a plan written by [`StagePlan::to_ron`]
    pub fn from_ron_str(content: &str) -> PlanResult<Self> {
        ron::from_str(content).map_err(|e| PlanError::Deserialize(e.to_string()))
    }

    /// Write the plan to a file
    pub fn save(&self, path: impl AsRef<Path>, format: PlanFormat) -> PlanResult<()> {
        let path = path.as_ref();
        let content = match format {
            PlanFormat::Ron => self.to_ron()?,
            PlanFormat::Json => self.to_json()?,
        };
        std::fs::write(path, content).map_err(|e| PlanError::Io(format!("{}: {e}", path.display())))
    }
}

fn fitter_for(config: &JobConfig, side: CameraSide) -> CameraFitter {
    CameraFitter::new(config.fov(), config.margin).with_side(side)
}

fn lights_for(config: &JobConfig, pipeline: Pipeline, camera: &CameraPlan) -> LightRigPlan {
    let preset = config.light_rig_for(pipeline);
    LightRigPlanner::new(config.light_energy)
        .with_preset_name(Some(&preset))
        .with_yaw(camera.side.yaw())
        .plan(camera.distance)
}

fn environment_for(config: &JobConfig, pipeline: Pipeline) -> EnvironmentPlan {
    plan_environment(
        config.environment_for(pipeline),
        config.world_strength,
        config.exposure,
    )
}

/// Spin angles as Euler rotations about Z
fn yaw_track(spin: Track<f32>) -> Track<Vec3> {
    Track {
        keys: spin
            .keys
            .into_iter()
            .map(|k| Keyframe::new(k.frame, Vec3::new(0.0, 0.0, k.value)))
            .collect(),
        interpolation: spin.interpolation,
    }
}

/// Plan a 360 degree turntable clip of one hierarchy.
///
/// The hierarchy is centered on the origin first. With `orbit_camera` the
/// camera pivot spins around the still subject; otherwise the subject is
/// parented to a spin pivot at the origin, which turns in front of a static
/// camera.
pub fn plan_turntable(
    session: &mut SceneSession,
    id: HierarchyId,
    config: &JobConfig,
) -> PlanResult<StagePlan> {
    let pipeline = Pipeline::Turntable;
    config.validate()?;
    let frames = config.frame_range(pipeline)?;

    let hierarchy = session.get_mut(id)?;
    hierarchy.center_at_origin();
    let size = hierarchy.world_bounds().size();
    let root = hierarchy.root_transform();
    let (target, parent) = if config.orbit_camera {
        (TrackTarget::CameraPivot, None)
    } else {
        (TrackTarget::SpinPivot, Some(SPIN_PIVOT_NAME.to_string()))
    };
    let placement = Placement {
        handle: hierarchy.root_handle(),
        name: hierarchy.name().to_string(),
        hierarchy: id,
        translation: root.translation,
        rotation: root.rotation,
        is_padding: false,
        parent,
    };

    let camera = fitter_for(config, config.camera_side).fit(size);
    let lights = lights_for(config, pipeline, &camera);
    let spin = yaw_track(plan_spin(frames)?);
    let camera_rig = if config.orbit_camera {
        CameraRig::orbit(&camera)
    } else {
        CameraRig::Static
    };

    let environment = environment_for(config, pipeline);
    let output = OutputSettings::square(
        config.effective_size(pipeline),
        config.fps,
        frames,
        environment.film_transparent,
    );

    info!(
        asset = %placement.name,
        distance = camera.distance,
        lights = lights.len(),
        frames = frames.frame_count(),
        "Planned turntable"
    );
    Ok(StagePlan {
        name: placement.name.clone(),
        pipeline,
        output,
        environment,
        camera,
        camera_rig,
        lights,
        placements: vec![placement],
        tracks: vec![AnimationTrack::new(target, Channel::RotationEuler, spin)],
        lineup: None,
    })
}

/// Plan one turntable per asset, resetting the session before each so no
/// state carries over between assets.
pub fn plan_turntable_batch(
    session: &mut SceneSession,
    assets: &[AssetDescription],
    config: &JobConfig,
) -> PlanResult<Vec<StagePlan>> {
    if assets.is_empty() {
        return Err(PlanError::NoAssets);
    }
    let mut plans = Vec::with_capacity(assets.len());
    for asset in assets {
        session.reset();
        let id = session.add(asset.to_hierarchy()?);
        plans.push(plan_turntable(session, id, config)?);
    }
    Ok(plans)
}

/// Plan a lineup clip: every hierarchy in a row along +Y, moving toward the
/// front camera.
///
/// With `loop_pad > 0` the row is padded with linked duplicates and the
/// travel is quantized to whole spacing units so the clip loops seamlessly.
/// The tail carries one extra duplicate per unit travelled, so every padded
/// slot is still occupied at the closing key. Otherwise the row travels once
/// until the last instance has left the frame.
pub fn plan_lineup(
    session: &mut SceneSession,
    ids: &[HierarchyId],
    config: &JobConfig,
) -> PlanResult<StagePlan> {
    let pipeline = Pipeline::Lineup;
    if ids.is_empty() {
        return Err(PlanError::NoAssets);
    }
    config.validate()?;
    let frames = config.frame_range(pipeline)?;
    if config.camera_side != CameraSide::Front {
        debug!(side = ?config.camera_side, "Lineups always use the front camera");
    }

    for &id in ids {
        session.get_mut(id)?.center_at_origin();
    }

    let mut arranger = LineupArranger::new(LineupSettings {
        spacing_axis: Axis::Y,
        gap_multiplier: config.gap_multiplier,
        loop_pad: config.loop_pad,
        tail_extension: 0,
    });
    let loop_plan = if config.loop_pad > 0 {
        let (_, spacing) = arranger.measure(session, ids)?;
        let plan = plan_loop(ids.len(), spacing, 0.0)?;
        arranger.settings.tail_extension = plan.cycle_count as usize;
        Some(plan)
    } else {
        None
    };
    let lineup = arranger.arrange(session, ids)?;
    lineup.apply(session)?;

    let camera = fitter_for(config, CameraSide::Front).fit(lineup.max_size);
    let lights = lights_for(config, pipeline, &camera);
    let (track, summary) = lineup_travel(&lineup, loop_plan, frames)?;

    let mut placements = Vec::with_capacity(lineup.len());
    for entry in &lineup.entries {
        let hierarchy = session.get(entry.hierarchy)?;
        placements.push(Placement {
            handle: entry.handle,
            name: hierarchy.name().to_string(),
            hierarchy: entry.hierarchy,
            translation: entry.root_translation(),
            rotation: hierarchy.root_transform().rotation,
            is_padding: entry.is_padding,
            parent: Some(LINEUP_MASTER_NAME.to_string()),
        });
    }

    let environment = environment_for(config, pipeline);
    let output = OutputSettings::square(
        config.effective_size(pipeline),
        config.fps,
        frames,
        environment.film_transparent,
    );

    info!(
        instances = summary.instance_count,
        placements = placements.len(),
        spacing = summary.spacing,
        looping = summary.loop_plan.is_some(),
        "Planned lineup"
    );
    Ok(StagePlan {
        name: "lineup".to_string(),
        pipeline,
        output,
        environment,
        camera,
        camera_rig: CameraRig::Static,
        lights,
        placements,
        tracks: vec![AnimationTrack::new(
            TrackTarget::LineupMaster,
            Channel::Location,
            track,
        )],
        lineup: Some(summary),
    })
}

/// Master location keys. Offsets are distances travelled toward the camera,
/// i.e. along the negative spacing axis.
fn lineup_travel(
    lineup: &LineupPlan,
    loop_plan: Option<LoopPlan>,
    frames: FrameRange,
) -> PlanResult<(Track<Vec3>, LineupSummary)> {
    let axis = lineup.spacing_axis.unit();
    let count = lineup.instance_count;

    let (end_frame, final_offset) = match loop_plan {
        Some(plan) => (frames.loop_close()?, -plan.end_offset),
        None => (frames.end, plan_one_shot(count, lineup.spacing)?),
    };
    let start_offset = loop_plan.map_or(0.0, |p| -p.start_offset);

    let track = Track::new(vec![
        Keyframe::new(frames.start, axis * start_offset),
        Keyframe::new(end_frame, axis * final_offset),
    ])?;
    let summary = LineupSummary {
        spacing: lineup.spacing,
        spacing_axis: lineup.spacing_axis,
        instance_count: count,
        loop_pad: lineup.loop_pad,
        trailing: lineup.trailing,
        max_size: lineup.max_size,
        total_length: lineup.total_length(),
        loop_plan,
        final_offset,
    };
    Ok((track, summary))
}

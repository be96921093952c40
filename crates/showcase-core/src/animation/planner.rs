//! Turntable spins and lineup travel planning

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, PlanResult};

use super::track::{FrameRange, Interpolation, Keyframe, Track};

/// Full turn about the vertical axis.
///
/// 0 at the first frame and a full turn one tick past the last frame, so the
/// last rendered frame never repeats the first when the clip loops. The
/// returned track holds the angle in radians.
pub fn plan_spin(frames: FrameRange) -> PlanResult<Track<f32>> {
    Ok(Track {
        keys: vec![
            Keyframe::new(frames.start, 0.0),
            Keyframe::new(frames.loop_close()?, TAU),
        ],
        interpolation: Interpolation::Linear,
    })
}

/// Quantized lineup travel, in distance units toward the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopPlan {
    /// Lineup offset at the first key
    pub start_offset: f32,
    /// Lineup offset at the closing key
    pub end_offset: f32,
    /// Whole spacing units travelled between the first and last key
    pub cycle_count: u32,
}

impl LoopPlan {
    /// Distance travelled between the keys
    pub fn travel(&self) -> f32 {
        self.end_offset - self.start_offset
    }

    /// Whether the travel is a whole number of spacing units
    pub fn is_seamless(&self, spacing: f32) -> bool {
        let units = self.travel() / spacing;
        (units - units.round()).abs() <= 1e-4 * units.abs().max(1.0)
    }
}

fn validate_lineup(instance_count: usize, spacing: f32) -> PlanResult<()> {
    if instance_count == 0 {
        return Err(PlanError::NoAssets);
    }
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(PlanError::InvalidSpacing(spacing));
    }
    Ok(())
}

/// Raw travel needed for the last instance to fully exit the frame
fn exit_travel(instance_count: usize, spacing: f32) -> f32 {
    let total_length = (instance_count - 1) as f32 * spacing;
    let exit_margin = spacing;
    total_length + exit_margin
}

/// Plan a seamless loop: the travel from `start_offset` is rounded to a
/// whole number (at least one) of spacing units, so the final arrangement
/// is identical to the first.
pub fn plan_loop(instance_count: usize, spacing: f32, start_offset: f32) -> PlanResult<LoopPlan> {
    validate_lineup(instance_count, spacing)?;
    if !start_offset.is_finite() {
        return Err(PlanError::invalid_config(format!(
            "loop start offset must be finite, got {start_offset}"
        )));
    }

    let desired = exit_travel(instance_count, spacing);
    let cycles = ((desired - start_offset) / spacing).round().max(1.0);
    if !cycles.is_finite() || cycles >= u32::MAX as f32 {
        return Err(PlanError::invalid_config(format!(
            "loop from {start_offset} in steps of {spacing} needs {cycles} cycles"
        )));
    }
    let plan = LoopPlan {
        start_offset,
        end_offset: start_offset + cycles * spacing,
        cycle_count: cycles as u32,
    };
    debug!(
        instance_count,
        spacing,
        desired,
        cycles = plan.cycle_count,
        end_offset = plan.end_offset,
        "Planned seamless lineup loop"
    );
    Ok(plan)
}

/// Final lineup offset for a clip that plays once: the lineup moves back
/// along the spacing axis until the last instance has left the frame.
pub fn plan_one_shot(instance_count: usize, spacing: f32) -> PlanResult<f32> {
    validate_lineup(instance_count, spacing)?;
    Ok(-exit_travel(instance_count, spacing))
}

//! Keyframe schedules and loop planning

mod planner;
mod track;

pub use planner::{LoopPlan, plan_loop, plan_one_shot, plan_spin};
pub use track::{FrameRange, Interpolation, Keyframe, Lerp, Track};

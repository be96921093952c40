//! Frame ranges and linear keyframe tracks

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{FRAME_START, MAX_FRAME_END};
use crate::error::{PlanError, PlanResult};

/// Inclusive range of rendered frames
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    /// First rendered frame
    pub start: u32,
    /// Last rendered frame
    pub end: u32, // inclusive
}

impl FrameRange {
    /// Range from `start` to `end`, both rendered
    pub fn new(start: u32, end: u32) -> PlanResult<Self> {
        if start > end {
            return Err(PlanError::invalid_config(format!(
                "frame range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Frames 1..=floor(seconds * fps)
    pub fn from_duration(seconds: f32, fps: u32) -> PlanResult<Self> {
        let end = (f64::from(seconds) * f64::from(fps)).floor();
        if !end.is_finite() || end < f64::from(FRAME_START) {
            return Err(PlanError::invalid_config(format!(
                "{seconds}s at {fps} fps renders no frames"
            )));
        }
        if end > f64::from(MAX_FRAME_END) {
            return Err(PlanError::invalid_config(format!(
                "{seconds}s at {fps} fps exceeds the {MAX_FRAME_END} frame limit"
            )));
        }
        Self::new(FRAME_START, end as u32)
    }

    /// Number of rendered frames
    pub fn frame_count(self) -> u32 {
        self.end - self.start + 1
    }

    /// One tick past the last rendered frame, where a looping key closes the cycle
    pub fn loop_close(self) -> PlanResult<u32> {
        self.end.checked_add(1).ok_or_else(|| {
            PlanError::invalid_config(format!("frame {} has no following frame", self.end))
        })
    }
}

/// Values that can be interpolated between two keys
pub trait Lerp: Sized {
    /// Value a fraction `t` of the way from `a` to `b`
    fn lerp(a: &Self, b: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a.lerp(*b, t)
    }
}

/// Interpolation between keys. Showcase animations never ease.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Straight line between neighbouring keys
    #[default]
    Linear,
}

/// A value pinned to a frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Frame the value applies at
    pub frame: u32,
    /// Keyed value
    pub value: T,
}

impl<T> Keyframe<T> {
    /// Key `value` at `frame`
    pub fn new(frame: u32, value: T) -> Self {
        Self { frame, value }
    }
}

/// Keys sorted by frame plus their interpolation mode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track<T> {
    /// Keys in strictly increasing frame order
    pub keys: Vec<Keyframe<T>>,
    /// How values between keys are produced
    pub interpolation: Interpolation,
}

impl<T> Track<T>
where
    T: Lerp + Clone,
{
    /// Linear track over `keys`, rejected unless they are non-empty and strictly increasing
    pub fn new(keys: Vec<Keyframe<T>>) -> PlanResult<Self> {
        let track = Self {
            keys,
            interpolation: Interpolation::Linear,
        };
        track.validate()?;
        Ok(track)
    }

    /// Check the key ordering after fields were edited in place
    pub fn validate(&self) -> PlanResult<()> {
        if self.keys.is_empty() {
            return Err(PlanError::InvalidKeyframes(
                "track must have at least one key".into(),
            ));
        }
        if !self.keys.windows(2).all(|w| w[0].frame < w[1].frame) {
            return Err(PlanError::InvalidKeyframes(
                "keys must be strictly increasing by frame".into(),
            ));
        }
        Ok(())
    }

    /// Value at a (possibly fractional) frame, held constant outside the keys
    pub fn sample(&self, frame: f32) -> Option<T> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if frame <= first.frame as f32 {
            return Some(first.value.clone());
        }
        if frame >= last.frame as f32 {
            return Some(last.value.clone());
        }

        let idx = self.keys.partition_point(|k| k.frame as f32 <= frame);
        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let t = (frame - a.frame as f32) / (b.frame - a.frame) as f32;
        match self.interpolation {
            Interpolation::Linear => Some(T::lerp(&a.value, &b.value, t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_range_from_duration() {
        let r = FrameRange::from_duration(5.0, 30).unwrap();
        assert_eq!(r, FrameRange { start: 1, end: 150 });
        assert_eq!(r.frame_count(), 150);
        assert_eq!(r.loop_close().unwrap(), 151);

        let r = FrameRange::from_duration(0.5, 25).unwrap();
        assert_eq!(r.end, 12);
    }

    #[test]
    fn frame_range_rejects_empty_duration() {
        assert!(FrameRange::from_duration(0.01, 30).is_err());
        assert!(FrameRange::new(10, 2).is_err());
    }

    #[test]
    fn frame_range_rejects_runaway_duration() {
        let err = FrameRange::from_duration(2.0e8, 30).unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(_)));
        assert!(FrameRange::from_duration(f32::MAX, 60).is_err());

        let r = FrameRange::from_duration(60.0, 30).unwrap();
        assert!(r.end <= MAX_FRAME_END);
    }

    #[test]
    fn loop_close_at_last_representable_frame() {
        let r = FrameRange::new(1, u32::MAX).unwrap();
        assert!(matches!(r.loop_close(), Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn track_rejects_unsorted_keys() {
        let err = Track::new(vec![Keyframe::new(5, 0.0_f32), Keyframe::new(5, 1.0)]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidKeyframes(_)));
        assert!(Track::<f32>::new(Vec::new()).is_err());
    }

    #[test]
    fn track_samples_linearly_and_holds_ends() {
        let track = Track::new(vec![Keyframe::new(10, 0.0_f32), Keyframe::new(20, 100.0)]).unwrap();
        assert_eq!(track.sample(0.0), Some(0.0));
        assert_eq!(track.sample(15.0), Some(50.0));
        assert_eq!(track.sample(12.5), Some(25.0));
        assert_eq!(track.sample(30.0), Some(100.0));
    }

    #[test]
    fn track_samples_vec3() {
        let track = Track::new(vec![
            Keyframe::new(0, Vec3::ZERO),
            Keyframe::new(4, Vec3::new(0.0, -8.0, 0.0)),
        ])
        .unwrap();
        assert_eq!(track.sample(1.0), Some(Vec3::new(0.0, -2.0, 0.0)));
    }
}

//! Job configuration
//!
//! Every field has a default so a job file only lists what it overrides.
//! `seconds`, `size`, `environment` and `light_rig` fall back to per-pipeline
//! defaults when absent.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::FrameRange;
use crate::camera::{CameraSide, fov_from_lens};
use crate::constants::{DEFAULT_LENS_MM, DEFAULT_MARGIN, DEFAULT_SENSOR_WIDTH_MM};
use crate::environment::Environment;
use crate::error::{PlanError, PlanResult};
use crate::light::RigPreset;

/// Which planning pipeline a job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    /// One clip per asset, spinning 360 degrees
    Turntable,
    /// One clip of every asset passing the camera in a row
    Lineup,
}

impl Pipeline {
    /// Lowercase name used in job files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Pipeline::Turntable => "turntable",
            Pipeline::Lineup => "lineup",
        }
    }

    /// Clip duration when the job sets none
    pub fn default_seconds(self) -> f32 {
        match self {
            Pipeline::Turntable => 5.0,
            Pipeline::Lineup => 15.0,
        }
    }

    /// Square output size when the job sets none
    pub fn default_size(self) -> u32 {
        match self {
            Pipeline::Turntable => 1024,
            Pipeline::Lineup => 350,
        }
    }

    /// World preset when the job sets none
    pub fn default_environment(self) -> Environment {
        match self {
            Pipeline::Turntable => Environment::BlackRoom,
            Pipeline::Lineup => Environment::Clean,
        }
    }

    /// Light rig when the job sets none
    pub fn default_light_rig(self) -> RigPreset {
        match self {
            Pipeline::Turntable => RigPreset::Studio,
            Pipeline::Lineup => RigPreset::Key,
        }
    }
}

/// Options of one render job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Pipeline to run, may be supplied on the command line instead
    pub pipeline: Option<Pipeline>,
    /// Clip duration in seconds
    pub seconds: Option<f32>,
    /// Frames per second
    pub fps: u32,
    /// Square output resolution in pixels
    pub size: Option<u32>,
    /// View exposure in stops
    pub exposure: f32,
    /// Background strength for non-image environments
    pub world_strength: f32,
    /// Energy of the key light
    pub light_energy: f32,
    /// Light rig preset name ("studio" or "key")
    pub light_rig: Option<String>,
    /// World preset
    pub environment: Option<Environment>,
    /// Lineup spacing as a multiple of the largest asset depth
    pub gap_multiplier: f32,
    /// Framing safety factor (>= 1.0)
    pub margin: f32,
    /// Focal length in millimetres
    pub lens_mm: f32,
    /// Sensor width in millimetres
    pub sensor_width_mm: f32,
    /// Orbit the camera around a still subject instead of spinning the subject
    pub orbit_camera: bool,
    /// Side the turntable camera looks from
    pub camera_side: CameraSide,
    /// Boundary instances duplicated at each lineup end; 0 plays the lineup once
    pub loop_pad: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            pipeline: None,
            seconds: None,
            fps: 30,
            size: None,
            exposure: -0.55,
            world_strength: 0.42,
            light_energy: 599.0,
            light_rig: None,
            environment: None,
            gap_multiplier: 1.25,
            margin: DEFAULT_MARGIN,
            lens_mm: DEFAULT_LENS_MM,
            sensor_width_mm: DEFAULT_SENSOR_WIDTH_MM,
            orbit_camera: true,
            camera_side: CameraSide::Front,
            loop_pad: 0,
        }
    }
}

impl JobConfig {
    /// Defaults for a pipeline, with the pipeline set
    pub fn for_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Some(pipeline),
            seconds: Some(pipeline.default_seconds()),
            size: Some(pipeline.default_size()),
            environment: Some(pipeline.default_environment()),
            light_rig: Some(pipeline.default_light_rig().name().to_string()),
            ..Self::default()
        }
    }

    /// Parse a RON job file
    pub fn from_ron_str(content: &str) -> PlanResult<Self> {
        ron::from_str(content).map_err(|e| PlanError::Deserialize(e.to_string()))
    }

    /// Serialize as pretty RON
    pub fn to_ron(&self) -> PlanResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PlanError::Serialize(e.to_string()))
    }

    /// Load a job file
    pub fn load(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlanError::Io(format!("{}: {e}", path.display())))?;
        Self::from_ron_str(&content)
    }

    /// Save as a job file
    pub fn save(&self, path: impl AsRef<Path>) -> PlanResult<()> {
        let path = path.as_ref();
        let content = self.to_ron()?;
        std::fs::write(path, content).map_err(|e| PlanError::Io(format!("{}: {e}", path.display())))
    }

    /// The pipeline to run; a job without one cannot be planned
    pub fn require_pipeline(&self) -> PlanResult<Pipeline> {
        self.pipeline
            .ok_or_else(|| PlanError::MissingConfig("pipeline".to_string()))
    }

    /// Clip duration, falling back to the pipeline default
    pub fn effective_seconds(&self, pipeline: Pipeline) -> f32 {
        self.seconds.unwrap_or(pipeline.default_seconds())
    }

    /// Output size, falling back to the pipeline default
    pub fn effective_size(&self, pipeline: Pipeline) -> u32 {
        self.size.unwrap_or(pipeline.default_size())
    }

    /// World preset, falling back to the pipeline default
    pub fn environment_for(&self, pipeline: Pipeline) -> Environment {
        self.environment.unwrap_or(pipeline.default_environment())
    }

    /// Preset name to hand to the light planner; unknown names are resolved there
    pub fn light_rig_for(&self, pipeline: Pipeline) -> String {
        self.light_rig
            .clone()
            .unwrap_or_else(|| pipeline.default_light_rig().name().to_string())
    }

    /// Horizontal field of view in radians
    pub fn fov(&self) -> f32 {
        fov_from_lens(self.lens_mm, self.sensor_width_mm)
    }

    /// Rendered frames for a pipeline
    pub fn frame_range(&self, pipeline: Pipeline) -> PlanResult<FrameRange> {
        FrameRange::from_duration(self.effective_seconds(pipeline), self.fps)
    }

    /// Reject values no job can be planned with
    pub fn validate(&self) -> PlanResult<()> {
        fn positive(name: &str, value: f32) -> PlanResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PlanError::invalid_config(format!("{name} must be > 0, got {value}")))
            }
        }

        if self.fps == 0 {
            return Err(PlanError::invalid_config("fps must be > 0"));
        }
        if let Some(seconds) = self.seconds {
            positive("seconds", seconds)?;
        }
        if self.size == Some(0) {
            return Err(PlanError::invalid_config("size must be > 0"));
        }
        positive("gap_multiplier", self.gap_multiplier)?;
        positive("lens_mm", self.lens_mm)?;
        positive("sensor_width_mm", self.sensor_width_mm)?;
        if !self.margin.is_finite() || self.margin < 1.0 {
            return Err(PlanError::invalid_config(format!(
                "margin must be >= 1.0, got {}",
                self.margin
            )));
        }
        if !self.light_energy.is_finite() || self.light_energy < 0.0 {
            return Err(PlanError::invalid_config(format!(
                "light_energy must be >= 0, got {}",
                self.light_energy
            )));
        }
        match (self.pipeline, self.seconds) {
            (Some(pipeline), _) => {
                self.frame_range(pipeline)?;
            }
            (None, Some(seconds)) => {
                FrameRange::from_duration(seconds, self.fps)?;
            }
            (None, None) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = JobConfig::default();
        assert_eq!(config.fps, 30);
        assert_eq!(config.light_energy, 599.0);
        assert_eq!(config.gap_multiplier, 1.25);
        assert!(config.orbit_camera);
        assert_eq!(config.loop_pad, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pipeline_defaults() {
        let config = JobConfig::default();
        assert_eq!(config.effective_seconds(Pipeline::Turntable), 5.0);
        assert_eq!(config.effective_size(Pipeline::Turntable), 1024);
        assert_eq!(config.environment_for(Pipeline::Turntable), Environment::BlackRoom);
        assert_eq!(config.light_rig_for(Pipeline::Turntable), "studio");

        assert_eq!(config.effective_seconds(Pipeline::Lineup), 15.0);
        assert_eq!(config.effective_size(Pipeline::Lineup), 350);
        assert_eq!(config.environment_for(Pipeline::Lineup), Environment::Clean);
        assert_eq!(config.light_rig_for(Pipeline::Lineup), "key");
    }

    #[test]
    fn test_missing_pipeline() {
        let err = JobConfig::default().require_pipeline().unwrap_err();
        assert_eq!(err, PlanError::MissingConfig("pipeline".to_string()));
        assert_eq!(
            JobConfig::for_pipeline(Pipeline::Lineup).require_pipeline(),
            Ok(Pipeline::Lineup)
        );
    }

    #[test]
    fn test_frame_range() {
        let config = JobConfig::for_pipeline(Pipeline::Turntable);
        let frames = config.frame_range(Pipeline::Turntable).unwrap();
        assert_eq!((frames.start, frames.end), (1, 150));
    }

    #[test]
    fn test_fov_from_default_lens() {
        assert_relative_eq!(JobConfig::default().fov().to_degrees(), 39.5978, epsilon = 1e-3);
    }

    #[test]
    fn test_partial_ron() {
        let config = JobConfig::from_ron_str(
            "(pipeline: Some(lineup), loop_pad: 2, environment: Some(\"night-sky\"), camera_side: left)",
        )
        .unwrap();
        assert_eq!(config.pipeline, Some(Pipeline::Lineup));
        assert_eq!(config.loop_pad, 2);
        assert_eq!(config.environment, Some(Environment::NightSky));
        assert_eq!(config.camera_side, CameraSide::Left);
        assert_eq!(config.fps, 30);
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            JobConfig { fps: 0, ..JobConfig::default() },
            JobConfig { seconds: Some(-1.0), ..JobConfig::default() },
            JobConfig { size: Some(0), ..JobConfig::default() },
            JobConfig { gap_multiplier: 0.0, ..JobConfig::default() },
            JobConfig { margin: 0.9, ..JobConfig::default() },
            JobConfig { lens_mm: f32::NAN, ..JobConfig::default() },
            JobConfig {
                pipeline: Some(Pipeline::Lineup),
                seconds: Some(0.01),
                ..JobConfig::default()
            },
            JobConfig { seconds: Some(0.01), ..JobConfig::default() },
            JobConfig { seconds: Some(2.0e8), ..JobConfig::default() },
            JobConfig {
                pipeline: Some(Pipeline::Turntable),
                seconds: Some(2.0e8),
                ..JobConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(PlanError::InvalidConfig(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.ron");
        let mut config = JobConfig::for_pipeline(Pipeline::Turntable);
        config.camera_side = CameraSide::Right;
        config.save(&path).unwrap();
        assert_eq!(JobConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = JobConfig::load(dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(err, PlanError::Io(_)));
    }
}
